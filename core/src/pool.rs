//! Capacity pools.
//!
//! A pool is never persisted. Its occupancy is derived from committed registrations
//! every time an admission decision is made; only the capacities are configuration.

use crate::category::{CompetitionTrack, NormalizedTracks, WorkshopTrack};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A named scarce resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PoolKey {
    /// Whole-event capacity
    Overall,
    /// One workshop track
    Workshop(WorkshopTrack),
    /// One competition track
    Competition(CompetitionTrack),
}

impl PoolKey {
    /// Every pool, overall first.
    #[must_use]
    pub fn all() -> Vec<Self> {
        std::iter::once(Self::Overall)
            .chain(WorkshopTrack::ALL.into_iter().map(Self::Workshop))
            .chain(CompetitionTrack::ALL.into_iter().map(Self::Competition))
            .collect()
    }

    /// Pools a team with these tracks could touch.
    ///
    /// Always includes [`PoolKey::Overall`].
    #[must_use]
    pub fn touched_by(tracks: &NormalizedTracks) -> Vec<Self> {
        let mut pools = vec![Self::Overall];
        if let Some(workshop) = tracks.workshop {
            pools.push(Self::Workshop(workshop));
        }
        if let Some(competition) = tracks.competition {
            pools.push(Self::Competition(competition));
        }
        pools
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overall => f.write_str("overall"),
            Self::Workshop(track) => write!(f, "workshop:{track}"),
            Self::Competition(track) => write!(f, "competition:{track}"),
        }
    }
}

impl Serialize for PoolKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Fixed maximum of every pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacities {
    /// Whole-event maximum
    pub overall: u32,
    /// Cloud workshop maximum
    pub cloud: u32,
    /// AI workshop maximum
    pub ai: u32,
    /// Cybersecurity workshop maximum
    pub cybersecurity: u32,
    /// Hackathon maximum
    pub hackathon: u32,
    /// Startup pitch maximum
    pub pitch: u32,
}

impl Capacities {
    /// Maximum of one pool.
    #[must_use]
    pub const fn of(&self, pool: PoolKey) -> u32 {
        match pool {
            PoolKey::Overall => self.overall,
            PoolKey::Workshop(WorkshopTrack::Cloud) => self.cloud,
            PoolKey::Workshop(WorkshopTrack::Ai) => self.ai,
            PoolKey::Workshop(WorkshopTrack::Cybersecurity) => self.cybersecurity,
            PoolKey::Competition(CompetitionTrack::Hackathon) => self.hackathon,
            PoolKey::Competition(CompetitionTrack::Pitch) => self.pitch,
        }
    }
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            overall: 400,
            cloud: 200,
            ai: 200,
            cybersecurity: 100,
            hackathon: 250,
            pitch: 250,
        }
    }
}

/// Occupancy of a set of pools, read at one point in time.
///
/// Pools that were not read report zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OccupancySnapshot {
    occupied: BTreeMap<PoolKey, u32>,
}

impl OccupancySnapshot {
    /// Empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the occupancy of one pool.
    pub fn set(&mut self, pool: PoolKey, occupied: u32) {
        self.occupied.insert(pool, occupied);
    }

    /// Builder form of [`OccupancySnapshot::set`].
    #[must_use]
    pub fn with(mut self, pool: PoolKey, occupied: u32) -> Self {
        self.set(pool, occupied);
        self
    }

    /// Occupancy of one pool.
    #[must_use]
    pub fn get(&self, pool: PoolKey) -> u32 {
        self.occupied.get(&pool).copied().unwrap_or(0)
    }

    /// Pools present in the snapshot.
    pub fn iter(&self) -> impl Iterator<Item = (PoolKey, u32)> + '_ {
        self.occupied.iter().map(|(pool, occupied)| (*pool, *occupied))
    }
}
