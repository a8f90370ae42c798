//! Registration request payload and validation.
//!
//! Validation runs before any store access. It normalizes emails, applies the ticket
//! category's track rules once, and resolves per-member track overrides, so later
//! stages only ever see a [`ValidatedRegistration`].

use fest_admission_core::category::{
    CompetitionTrack, NormalizedTracks, TicketCategory, TrackError, WorkshopTrack,
};
use fest_admission_core::types::{FoodPreference, PaymentDetails, StartupPitch};
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

/// Inbound registration payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationRequest {
    /// College or organization name
    pub organization: String,
    /// Ticket category
    pub ticket_category: TicketCategory,
    /// Requested workshop
    #[serde(default)]
    pub workshop_track: Option<WorkshopTrack>,
    /// Requested competition
    #[serde(default)]
    pub competition_track: Option<CompetitionTrack>,
    /// Declared team size; must match the member count when present
    #[serde(default)]
    pub team_size: Option<u32>,
    /// Amount due
    #[serde(default)]
    pub total_amount: u64,
    /// Payment transaction reference
    #[serde(default)]
    pub transaction_id: String,
    /// Uploaded payment screenshot location
    #[serde(default)]
    pub screenshot_url: Option<String>,
    /// Team members
    pub members: Vec<MemberRequest>,
}

/// One member in the inbound payload.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberRequest {
    /// Full name
    pub name: String,
    /// Email, any case
    pub email: String,
    /// Phone number
    #[serde(default)]
    pub phone: String,
    /// `WhatsApp` number
    #[serde(default)]
    pub whatsapp: Option<String>,
    /// Gender
    #[serde(default)]
    pub gender: Option<String>,
    /// Year of study
    #[serde(default)]
    pub college_year: Option<String>,
    /// Department
    #[serde(default)]
    pub department: Option<String>,
    /// Meal preference
    #[serde(default = "default_food")]
    pub food_preference: FoodPreference,
    /// Needs accommodation
    #[serde(default)]
    pub accommodation: bool,
    /// Per-member workshop override
    #[serde(default)]
    pub workshop_track: Option<WorkshopTrack>,
    /// Per-member competition override
    #[serde(default)]
    pub competition_track: Option<CompetitionTrack>,
    /// Startup details for pitch entrants
    #[serde(default)]
    pub startup_pitch: Option<StartupPitch>,
}

const fn default_food() -> FoodPreference {
    FoodPreference::Veg
}

/// Request rejected before admission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Organization name missing.
    #[error("organization name is required")]
    EmptyOrganization,

    /// No members supplied.
    #[error("a team needs at least one member")]
    NoMembers,

    /// More members than a team may have.
    #[error("a team may have at most {max} members, got {count}")]
    TooManyMembers {
        /// Members supplied
        count: usize,
        /// Configured maximum
        max: usize,
    },

    /// Declared team size disagrees with the member list.
    #[error("team_size is {declared} but {actual} members were supplied")]
    TeamSizeMismatch {
        /// Declared size
        declared: u32,
        /// Member count
        actual: usize,
    },

    /// A member field is empty.
    #[error("member {index}: {field} is required")]
    MissingMemberField {
        /// Position in the member list, from 1
        index: usize,
        /// Field name
        field: &'static str,
    },

    /// Email is not well formed.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// Same email used twice in one team.
    #[error("email {0} appears more than once in this team")]
    RepeatedEmail(String),

    /// Category requires a track the request left out.
    #[error(transparent)]
    MissingTrack(#[from] TrackError),
}

/// A member after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMember {
    /// Trimmed name
    pub name: String,
    /// Trimmed, lowercased email
    pub email: String,
    /// Phone number
    pub phone: String,
    /// `WhatsApp` number
    pub whatsapp: Option<String>,
    /// Gender
    pub gender: Option<String>,
    /// Year of study
    pub college_year: Option<String>,
    /// Department
    pub department: Option<String>,
    /// Meal preference
    pub food_preference: FoodPreference,
    /// Needs accommodation
    pub accommodation: bool,
    /// Resolved workshop
    pub workshop_track: Option<WorkshopTrack>,
    /// Resolved competition
    pub competition_track: Option<CompetitionTrack>,
    /// Kept only for pitch entrants
    pub startup_pitch: Option<StartupPitch>,
}

/// A registration ready for admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRegistration {
    /// Trimmed organization name
    pub organization: String,
    /// Team-level tracks after category rules
    pub tracks: NormalizedTracks,
    /// Amount due
    pub total_amount: u64,
    /// Payment evidence
    pub payment: PaymentDetails,
    /// Members in request order
    pub members: Vec<ValidatedMember>,
}

impl ValidatedRegistration {
    /// Number of members, which is also the team size.
    #[must_use]
    pub fn team_size(&self) -> u32 {
        u32::try_from(self.members.len()).unwrap_or(u32::MAX)
    }

    /// Normalized member emails in request order.
    #[must_use]
    pub fn emails(&self) -> Vec<String> {
        self.members.iter().map(|m| m.email.clone()).collect()
    }
}

/// Trim and lowercase an email.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Whether a normalized email is well formed enough to deliver to.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl RegistrationRequest {
    /// Validate and normalize the request.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(self, max_team_size: usize) -> Result<ValidatedRegistration, ValidationError> {
        let organization = self.organization.trim().to_string();
        if organization.is_empty() {
            return Err(ValidationError::EmptyOrganization);
        }
        if self.members.is_empty() {
            return Err(ValidationError::NoMembers);
        }
        if self.members.len() > max_team_size {
            return Err(ValidationError::TooManyMembers {
                count: self.members.len(),
                max: max_team_size,
            });
        }
        if let Some(declared) = self.team_size {
            if usize::try_from(declared).ok() != Some(self.members.len()) {
                return Err(ValidationError::TeamSizeMismatch {
                    declared,
                    actual: self.members.len(),
                });
            }
        }

        let tracks = self
            .ticket_category
            .normalize(self.workshop_track, self.competition_track)?;

        let mut seen = HashSet::new();
        let members = self
            .members
            .into_iter()
            .enumerate()
            .map(|(n, member)| {
                let index = n + 1;
                let name = member.name.trim().to_string();
                if name.is_empty() {
                    return Err(ValidationError::MissingMemberField { index, field: "name" });
                }
                let email = normalize_email(&member.email);
                if !is_valid_email(&email) {
                    return Err(ValidationError::InvalidEmail(member.email));
                }
                if !seen.insert(email.clone()) {
                    return Err(ValidationError::RepeatedEmail(email));
                }

                let competition_track = tracks.member_competition(member.competition_track);
                let startup_pitch = member
                    .startup_pitch
                    .filter(|_| competition_track == Some(CompetitionTrack::Pitch));

                Ok(ValidatedMember {
                    name,
                    email,
                    phone: member.phone.trim().to_string(),
                    whatsapp: trimmed(member.whatsapp),
                    gender: trimmed(member.gender),
                    college_year: trimmed(member.college_year),
                    department: trimmed(member.department),
                    food_preference: member.food_preference,
                    accommodation: member.accommodation,
                    workshop_track: tracks.member_workshop(member.workshop_track),
                    competition_track,
                    startup_pitch,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ValidatedRegistration {
            organization,
            tracks,
            total_amount: self.total_amount,
            payment: PaymentDetails {
                transaction_id: self.transaction_id.trim().to_string(),
                screenshot_url: trimmed(self.screenshot_url),
            },
            members,
        })
    }
}
