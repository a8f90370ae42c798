//! Admission control.
//!
//! - [`inventory`]: current occupancy of every capacity pool
//! - [`policy`]: accept or reject a team against an occupancy snapshot
//! - [`duplicate_guard`]: reject teams whose emails are already registered

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod duplicate_guard;
pub mod inventory;
pub mod policy;

pub use duplicate_guard::{DuplicateGuard, GuardVerdict};
pub use inventory::{InventoryCounter, PoolStatus};
pub use policy::{CapacityRejection, Decision, RejectReason, decide};

/// How concurrent admissions are ordered within one process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdmissionMode {
    /// One decision at a time: occupancy read, policy and commit run under one lock.
    #[default]
    Serialized,
    /// No lock between read and commit; concurrent teams may jointly overshoot a cap.
    Concurrent,
}

impl AdmissionMode {
    /// Config name of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Serialized => "serialized",
            Self::Concurrent => "concurrent",
        }
    }
}

impl fmt::Display for AdmissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdmissionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serialized" => Ok(Self::Serialized),
            "concurrent" => Ok(Self::Concurrent),
            other => Err(format!("unknown admission mode: {other}")),
        }
    }
}
