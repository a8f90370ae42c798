//! Ticket categories and the tracks they may request.
//!
//! Every category carries one rule per track kind. Normalization applies those rules
//! once, before admission, so neither the policy nor the committer has to look at the
//! category again.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Workshop tracks offered at the festival.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkshopTrack {
    /// Cloud computing workshop
    Cloud,
    /// Artificial intelligence workshop
    #[serde(rename = "AI")]
    Ai,
    /// Cybersecurity workshop
    Cybersecurity,
}

impl WorkshopTrack {
    /// Every workshop track, in display order.
    pub const ALL: [Self; 3] = [Self::Cloud, Self::Ai, Self::Cybersecurity];

    /// Wire name of the track.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cloud => "Cloud",
            Self::Ai => "AI",
            Self::Cybersecurity => "Cybersecurity",
        }
    }
}

impl fmt::Display for WorkshopTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkshopTrack {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|track| track.as_str() == s)
            .ok_or_else(|| format!("unknown workshop track: {s}"))
    }
}

/// Competition tracks offered at the festival.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CompetitionTrack {
    /// Hackathon
    Hackathon,
    /// Startup pitch
    Pitch,
}

impl CompetitionTrack {
    /// Every competition track, in display order.
    pub const ALL: [Self; 2] = [Self::Hackathon, Self::Pitch];

    /// Wire name of the track.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hackathon => "Hackathon",
            Self::Pitch => "Pitch",
        }
    }
}

impl fmt::Display for CompetitionTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompetitionTrack {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|track| track.as_str() == s)
            .ok_or_else(|| format!("unknown competition track: {s}"))
    }
}

/// What a ticket category does with one kind of track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackRule<T> {
    /// Always null; caller input is discarded.
    Forbidden,
    /// Caller may leave it null.
    Optional,
    /// Caller must supply it.
    Required,
    /// Always this value; caller input is discarded.
    Forced(T),
}

impl<T: Copy> TrackRule<T> {
    /// Apply the rule to caller input.
    ///
    /// Returns `Err(())` only when the rule is [`TrackRule::Required`] and nothing was supplied.
    #[allow(clippy::result_unit_err)]
    pub fn apply(self, requested: Option<T>) -> Result<Option<T>, ()> {
        match self {
            Self::Forbidden => Ok(None),
            Self::Optional => Ok(requested),
            Self::Required => match requested {
                Some(track) => Ok(Some(track)),
                None => Err(()),
            },
            Self::Forced(track) => Ok(Some(track)),
        }
    }

    /// Whether a member-level override may name this track.
    #[must_use]
    pub fn allows_override(self) -> bool {
        matches!(self, Self::Optional | Self::Required)
    }
}

/// Ticket categories sold for the festival.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketCategory {
    /// Entry pass plus one workshop, competition optional
    EntryWorkshop,
    /// Entry pass plus one competition
    EntryCompetition,
    /// Entry pass plus one workshop and one competition
    EntryCombo,
    /// Startup pitch only
    StartupOnly,
    /// Hackathon only
    HackathonOnly,
}

impl TicketCategory {
    /// Every category.
    pub const ALL: [Self; 5] = [
        Self::EntryWorkshop,
        Self::EntryCompetition,
        Self::EntryCombo,
        Self::StartupOnly,
        Self::HackathonOnly,
    ];

    /// Wire name of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EntryWorkshop => "entry_workshop",
            Self::EntryCompetition => "entry_competition",
            Self::EntryCombo => "entry_combo",
            Self::StartupOnly => "startup_only",
            Self::HackathonOnly => "hackathon_only",
        }
    }

    /// Workshop rule for this category.
    #[must_use]
    pub const fn workshop_rule(self) -> TrackRule<WorkshopTrack> {
        match self {
            Self::EntryWorkshop | Self::EntryCombo => TrackRule::Required,
            Self::EntryCompetition | Self::StartupOnly | Self::HackathonOnly => {
                TrackRule::Forbidden
            }
        }
    }

    /// Competition rule for this category.
    #[must_use]
    pub const fn competition_rule(self) -> TrackRule<CompetitionTrack> {
        match self {
            Self::EntryWorkshop => TrackRule::Optional,
            Self::EntryCompetition | Self::EntryCombo => TrackRule::Required,
            Self::StartupOnly => TrackRule::Forced(CompetitionTrack::Pitch),
            Self::HackathonOnly => TrackRule::Forced(CompetitionTrack::Hackathon),
        }
    }

    /// Whether admission must check the workshop pool for this category.
    #[must_use]
    pub const fn checks_workshop_capacity(self) -> bool {
        matches!(self, Self::EntryWorkshop | Self::EntryCombo)
    }

    /// Resolve the tracks a team actually gets for this category.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError`] when the category requires a track the caller left out.
    pub fn normalize(
        self,
        workshop: Option<WorkshopTrack>,
        competition: Option<CompetitionTrack>,
    ) -> Result<NormalizedTracks, TrackError> {
        let workshop = self
            .workshop_rule()
            .apply(workshop)
            .map_err(|()| TrackError::MissingWorkshop(self))?;
        let competition = self
            .competition_rule()
            .apply(competition)
            .map_err(|()| TrackError::MissingCompetition(self))?;

        Ok(NormalizedTracks {
            category: self,
            workshop,
            competition,
        })
    }
}

impl fmt::Display for TicketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("unknown ticket category: {s}"))
    }
}

/// Tracks after category rules have been applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NormalizedTracks {
    /// Category the rules came from
    pub category: TicketCategory,
    /// Workshop the team consumes, if any
    pub workshop: Option<WorkshopTrack>,
    /// Competition the team consumes, if any
    pub competition: Option<CompetitionTrack>,
}

impl NormalizedTracks {
    /// Resolve a member's workshop override against the team's tracks.
    ///
    /// Overrides are honoured only when the category lets the caller choose the track;
    /// otherwise the team track wins.
    #[must_use]
    pub fn member_workshop(&self, requested: Option<WorkshopTrack>) -> Option<WorkshopTrack> {
        if self.category.workshop_rule().allows_override() {
            requested.or(self.workshop)
        } else {
            self.workshop
        }
    }

    /// Resolve a member's competition override against the team's tracks.
    #[must_use]
    pub fn member_competition(
        &self,
        requested: Option<CompetitionTrack>,
    ) -> Option<CompetitionTrack> {
        if self.category.competition_rule().allows_override() {
            requested.or(self.competition)
        } else {
            self.competition
        }
    }
}

/// A category required a track that was not supplied.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackError {
    /// Workshop track missing.
    #[error("ticket category {0} requires a workshop track")]
    MissingWorkshop(TicketCategory),

    /// Competition track missing.
    #[error("ticket category {0} requires a competition track")]
    MissingCompetition(TicketCategory),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn startup_only_forces_pitch_and_drops_workshop() {
        let tracks = TicketCategory::StartupOnly
            .normalize(Some(WorkshopTrack::Cloud), Some(CompetitionTrack::Hackathon))
            .unwrap();

        assert_eq!(tracks.workshop, None);
        assert_eq!(tracks.competition, Some(CompetitionTrack::Pitch));
    }

    #[test]
    fn hackathon_only_forces_hackathon() {
        let tracks = TicketCategory::HackathonOnly.normalize(None, None).unwrap();
        assert_eq!(tracks.competition, Some(CompetitionTrack::Hackathon));
    }

    #[test]
    fn entry_workshop_requires_workshop() {
        let err = TicketCategory::EntryWorkshop.normalize(None, None).unwrap_err();
        assert_eq!(err, TrackError::MissingWorkshop(TicketCategory::EntryWorkshop));
    }

    #[test]
    fn entry_workshop_keeps_optional_competition() {
        let tracks = TicketCategory::EntryWorkshop
            .normalize(Some(WorkshopTrack::Ai), Some(CompetitionTrack::Pitch))
            .unwrap();
        assert_eq!(tracks.workshop, Some(WorkshopTrack::Ai));
        assert_eq!(tracks.competition, Some(CompetitionTrack::Pitch));
    }

    #[test]
    fn entry_combo_requires_both() {
        let err = TicketCategory::EntryCombo
            .normalize(Some(WorkshopTrack::Cloud), None)
            .unwrap_err();
        assert_eq!(err, TrackError::MissingCompetition(TicketCategory::EntryCombo));
    }

    #[test]
    fn entry_competition_discards_workshop() {
        let tracks = TicketCategory::EntryCompetition
            .normalize(Some(WorkshopTrack::Cybersecurity), Some(CompetitionTrack::Hackathon))
            .unwrap();
        assert_eq!(tracks.workshop, None);
    }

    #[test]
    fn only_workshop_categories_check_workshop_capacity() {
        let checked: Vec<_> = TicketCategory::ALL
            .into_iter()
            .filter(|c| c.checks_workshop_capacity())
            .collect();
        assert_eq!(
            checked,
            vec![TicketCategory::EntryWorkshop, TicketCategory::EntryCombo]
        );
    }

    #[test]
    fn member_override_ignored_when_track_is_forced() {
        let tracks = TicketCategory::StartupOnly.normalize(None, None).unwrap();
        assert_eq!(
            tracks.member_competition(Some(CompetitionTrack::Hackathon)),
            Some(CompetitionTrack::Pitch)
        );
        assert_eq!(tracks.member_workshop(Some(WorkshopTrack::Cloud)), None);
    }

    #[test]
    fn member_override_honoured_when_category_allows_choice() {
        let tracks = TicketCategory::EntryWorkshop
            .normalize(Some(WorkshopTrack::Cloud), None)
            .unwrap();
        assert_eq!(tracks.member_workshop(Some(WorkshopTrack::Ai)), Some(WorkshopTrack::Ai));
        assert_eq!(tracks.member_workshop(None), Some(WorkshopTrack::Cloud));
    }

    #[test]
    fn wire_names_round_trip() {
        for track in WorkshopTrack::ALL {
            assert_eq!(track.as_str().parse::<WorkshopTrack>().unwrap(), track);
        }
        let json = serde_json::to_string(&WorkshopTrack::Ai).unwrap();
        assert_eq!(json, "\"AI\"");
        let category: TicketCategory = serde_json::from_str("\"startup_only\"").unwrap();
        assert_eq!(category, TicketCategory::StartupOnly);
    }
}
