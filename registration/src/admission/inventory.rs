//! Inventory counter.
//!
//! Reads pool occupancy from the store on every call. Nothing is cached, so a decision
//! always sees every registration committed before it started.

use fest_admission_core::pool::{Capacities, OccupancySnapshot, PoolKey};
use fest_admission_core::store::{RegistrationStore, StoreError};
use serde::Serialize;
use std::sync::Arc;

/// Slot statistics for one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    /// Pool name
    pub pool: PoolKey,
    /// Configured maximum
    pub capacity: u32,
    /// Seats held by non-rejected registrations
    pub occupied: u32,
    /// Seats left before the pool starts rejecting
    pub remaining: u32,
    /// Whether new teams are rejected for this pool
    pub full: bool,
}

impl PoolStatus {
    fn new(pool: PoolKey, capacity: u32, occupied: u32) -> Self {
        Self {
            pool,
            capacity,
            occupied,
            remaining: capacity.saturating_sub(occupied),
            full: occupied >= capacity,
        }
    }
}

/// Computes pool occupancy from committed registrations.
#[derive(Clone)]
pub struct InventoryCounter {
    store: Arc<dyn RegistrationStore>,
}

impl InventoryCounter {
    /// Create a counter over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RegistrationStore>) -> Self {
        Self { store }
    }

    /// Occupancy of one pool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read.
    pub async fn occupancy(&self, pool: PoolKey) -> Result<u32, StoreError> {
        let snapshot = self.store.occupancy(&[pool]).await?;
        Ok(snapshot.get(pool))
    }

    /// Occupancy of several pools, read together.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read.
    pub async fn snapshot(&self, pools: &[PoolKey]) -> Result<OccupancySnapshot, StoreError> {
        self.store.occupancy(pools).await
    }

    /// Slot statistics for every pool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read.
    pub async fn slot_statistics(
        &self,
        capacities: &Capacities,
    ) -> Result<Vec<PoolStatus>, StoreError> {
        let pools = PoolKey::all();
        let snapshot = self.store.occupancy(&pools).await?;
        Ok(pools
            .into_iter()
            .map(|pool| PoolStatus::new(pool, capacities.of(pool), snapshot.get(pool)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_never_negative() {
        let status = PoolStatus::new(PoolKey::Overall, 400, 403);
        assert_eq!(status.remaining, 0);
        assert!(status.full);
    }

    #[test]
    fn one_seat_left_is_not_full() {
        let status = PoolStatus::new(PoolKey::Overall, 400, 399);
        assert_eq!(status.remaining, 1);
        assert!(!status.full);
    }
}
