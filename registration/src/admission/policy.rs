//! Admission policy.
//!
//! A pure function of the team's normalized tracks and an occupancy snapshot. Each pool
//! rejects only when it is already at or over its capacity; the team's own size is never
//! compared against the remaining headroom. The team that takes the last seats of a
//! pool is therefore admitted in full, even when that pushes the pool past its maximum.

use fest_admission_core::category::NormalizedTracks;
use fest_admission_core::pool::{Capacities, OccupancySnapshot, PoolKey};
use serde::Serialize;
use std::fmt;

/// Machine-readable rejection reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// Overall event capacity reached
    EventFull,
    /// Requested workshop full
    WorkshopFull,
    /// Requested competition full
    CompetitionFull,
}

impl RejectReason {
    /// Wire code of the reason.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EventFull => "EVENT_FULL",
            Self::WorkshopFull => "WORKSHOP_FULL",
            Self::CompetitionFull => "COMPETITION_FULL",
        }
    }

    /// Reason for a full pool.
    #[must_use]
    pub const fn for_pool(pool: PoolKey) -> Self {
        match pool {
            PoolKey::Overall => Self::EventFull,
            PoolKey::Workshop(_) => Self::WorkshopFull,
            PoolKey::Competition(_) => Self::CompetitionFull,
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The pool that stopped a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityRejection {
    /// Full pool
    pub pool: PoolKey,
    /// Occupancy read for the pool
    pub occupied: u32,
    /// Configured maximum
    pub capacity: u32,
}

impl CapacityRejection {
    /// Reason code for this rejection.
    #[must_use]
    pub const fn reason(&self) -> RejectReason {
        RejectReason::for_pool(self.pool)
    }
}

/// Outcome of an admission decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Team admitted; it consumes `seats` in every listed pool.
    Accept {
        /// Pools the team now occupies
        pools_consumed: Vec<PoolKey>,
        /// Seats taken in each pool
        seats: u32,
    },
    /// Team rejected before any write.
    Reject(CapacityRejection),
}

/// Pools checked for a team, in evaluation order.
fn checked_pools(tracks: &NormalizedTracks) -> Vec<PoolKey> {
    let mut pools = vec![PoolKey::Overall];
    if tracks.category.checks_workshop_capacity() {
        pools.extend(tracks.workshop.map(PoolKey::Workshop));
    }
    if let Some(competition) = tracks.competition {
        pools.push(PoolKey::Competition(competition));
    }
    pools
}

/// Decide whether a team of `team_size` may be admitted.
///
/// Rules run in order (overall, workshop, competition) and the first pool that is
/// already at or over capacity rejects.
#[must_use]
pub fn decide(
    team_size: u32,
    tracks: &NormalizedTracks,
    occupancy: &OccupancySnapshot,
    capacities: &Capacities,
) -> Decision {
    for pool in checked_pools(tracks) {
        let occupied = occupancy.get(pool);
        let capacity = capacities.of(pool);
        if occupied >= capacity {
            return Decision::Reject(CapacityRejection {
                pool,
                occupied,
                capacity,
            });
        }
    }

    Decision::Accept {
        pools_consumed: PoolKey::touched_by(tracks),
        seats: team_size,
    }
}
