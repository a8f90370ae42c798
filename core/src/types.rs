//! Registration records.
//!
//! One [`TeamRegistration`] owns `team_size` [`TeamMember`] records through their
//! `registration_id` back-reference. Both are written once, at admission time.

use crate::category::{CompetitionTrack, TicketCategory, WorkshopTrack};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a team registration.
///
/// Time-ordered (UUID v7), so ids sort by submission time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(Uuid);

impl TeamId {
    /// Creates a new time-derived `TeamId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a `TeamId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TeamId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a participant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// Creates a new random `ParticipantId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `ParticipantId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Enumerations
// ============================================================================

/// Lifecycle of a team registration.
///
/// Admission always creates `Pending`; the approval workflow moves it on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Awaiting payment verification
    Pending,
    /// Payment verified
    Confirmed,
    /// Rejected by an organizer; no longer occupies any pool
    Rejected,
}

impl RegistrationStatus {
    /// Storage name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
        }
    }

    /// Parse the storage name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Whether a registration in this state counts toward pool occupancy.
    #[must_use]
    pub const fn occupies_capacity(&self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meal preference of a participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodPreference {
    /// Vegetarian
    Veg,
    /// Non-vegetarian
    NonVeg,
}

impl FoodPreference {
    /// Storage name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Veg => "veg",
            Self::NonVeg => "non_veg",
        }
    }

    /// Parse the storage name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "veg" => Some(Self::Veg),
            "non_veg" => Some(Self::NonVeg),
            _ => None,
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// Payment evidence submitted with a registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// Transaction reference entered by the payer
    pub transaction_id: String,
    /// Location of the uploaded payment screenshot
    pub screenshot_url: Option<String>,
}

/// Startup details attached to a pitch-track participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupPitch {
    /// Startup name
    pub startup_name: String,
    /// One-paragraph idea summary
    pub idea_summary: String,
    /// Stage (idea, prototype, revenue, ...)
    pub stage: Option<String>,
}

/// Parent record for one team's submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRegistration {
    /// Team identifier
    pub id: TeamId,
    /// College or organization name
    pub organization: String,
    /// Declared team size; equals the number of member records once committed
    pub team_size: u32,
    /// Ticket category
    pub category: TicketCategory,
    /// Workshop pool the team consumes
    pub workshop_track: Option<WorkshopTrack>,
    /// Competition pool the team consumes
    pub competition_track: Option<CompetitionTrack>,
    /// Amount due, in whole currency units
    pub total_amount: u64,
    /// Payment evidence
    pub payment: PaymentDetails,
    /// Lifecycle status
    pub status: RegistrationStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// One participant, owned by exactly one [`TeamRegistration`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Participant identifier
    pub id: ParticipantId,
    /// Owning registration
    pub registration_id: TeamId,
    /// Full name
    pub name: String,
    /// Normalized (trimmed, lowercase) email; unique across all members
    pub email: String,
    /// Phone number
    pub phone: String,
    /// `WhatsApp` number, when different from phone
    pub whatsapp: Option<String>,
    /// Gender
    pub gender: Option<String>,
    /// Year of study
    pub college_year: Option<String>,
    /// Department or branch
    pub department: Option<String>,
    /// Meal preference
    pub food_preference: FoodPreference,
    /// Needs accommodation
    pub accommodation: bool,
    /// Workshop this member attends
    pub workshop_track: Option<WorkshopTrack>,
    /// Competition this member enters
    pub competition_track: Option<CompetitionTrack>,
    /// Pitch details, only for pitch-track members
    pub startup_pitch: Option<StartupPitch>,
    /// SHA-256 hex digest of the member's dashboard passkey
    #[serde(skip_serializing)]
    pub passkey_hash: String,
    /// Checked in at the gate
    pub attended: bool,
    /// Competition submission received
    pub submitted: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
