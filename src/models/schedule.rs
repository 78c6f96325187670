//! Schedule (output) model.
//!
//! A schedule is the chronologically ordered list of matches produced
//! at publish time, the initial standings table, the unresolved bracket,
//! and any soft constraint violations recorded along the way.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{Bracket, MatchUp, ParticipantRef, RefereeId, StandingsRow};

/// Tournament phase a match belongs to.
///
/// Variant order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    GroupStage,
    RoundOf16,
    Quarterfinal,
    /// Matches between quarterfinal losers deciding places 5-8.
    PlacementSemifinal,
    Semifinal,
    SeventhPlace,
    FifthPlace,
    ThirdPlace,
    Final,
}

impl Phase {
    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Phase::GroupStage => "Group stage",
            Phase::RoundOf16 => "Round of 16",
            Phase::Quarterfinal => "Quarterfinal",
            Phase::PlacementSemifinal => "Placement semifinal",
            Phase::Semifinal => "Semifinal",
            Phase::SeventhPlace => "Match for 7th place",
            Phase::FifthPlace => "Match for 5th place",
            Phase::ThirdPlace => "Match for 3rd place",
            Phase::Final => "Final",
        }
    }

    /// Whether this is a playoff phase.
    pub fn is_playoff(self) -> bool {
        self != Phase::GroupStage
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A fully timed match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMatch {
    /// Match ID. Playoff matches use their bracket node ID.
    pub id: String,
    /// Sequential match number (1-based, chronological).
    pub number: usize,
    /// Zero-based slot index.
    pub slot: usize,
    /// Zero-based field index.
    pub field: usize,
    /// Home participant.
    pub home: ParticipantRef,
    /// Away participant.
    pub away: ParticipantRef,
    /// Kick-off time.
    pub start: NaiveDateTime,
    /// End time.
    pub end: NaiveDateTime,
    /// Phase tag.
    pub phase: Phase,
    /// Group for group-stage matches.
    pub group: Option<String>,
    /// Assigned referee.
    pub referee: Option<RefereeId>,
}

impl ScheduledMatch {
    /// Whether both participants are concrete teams.
    pub fn is_resolved(&self) -> bool {
        self.home.is_resolved() && self.away.is_resolved()
    }

    /// Whether the given team plays in this match.
    pub fn involves(&self, team_id: &str) -> bool {
        self.home.team_id() == Some(team_id) || self.away.team_id() == Some(team_id)
    }

    /// The match-up, if both sides are concrete.
    pub fn matchup(&self) -> Option<MatchUp> {
        Some(MatchUp::new(self.home.team_id()?, self.away.team_id()?))
    }
}

/// Matches of one phase, for display.
#[derive(Debug, Clone)]
pub struct PhaseView<'a> {
    /// The phase.
    pub phase: Phase,
    /// Matches in chronological order.
    pub matches: Vec<&'a ScheduledMatch>,
}

/// A soft constraint violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity ID (team, match, or referee).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A team played with less rest than the configured minimum.
    InsufficientRest,
    /// A pairing could not be placed and was left out.
    Unplaced,
    /// No referee was free for a match.
    RefereeUnavailable,
}

impl Violation {
    /// Rest shortfall for a team.
    pub fn insufficient_rest(team_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::InsufficientRest,
            entity_id: team_id.into(),
            message: message.into(),
            severity: 40,
        }
    }

    /// Pairing left out of an incomplete schedule.
    pub fn unplaced(pairing: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::Unplaced,
            entity_id: pairing.into(),
            message: message.into(),
            severity: 90,
        }
    }

    /// Match without a referee.
    pub fn referee_unavailable(match_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::RefereeUnavailable,
            entity_id: match_id.into(),
            message: message.into(),
            severity: 30,
        }
    }
}

/// A complete tournament schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Matches in chronological order.
    pub matches: Vec<ScheduledMatch>,
    /// Initial standings per team.
    pub standings: Vec<StandingsRow>,
    /// Playoff bracket, if finals are configured.
    pub bracket: Option<Bracket>,
    /// Soft violations recorded while scheduling.
    pub violations: Vec<Violation>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no violations were recorded.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of matches.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Finds a match by ID.
    pub fn match_by_id(&self, id: &str) -> Option<&ScheduledMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    /// Matches involving a team.
    pub fn matches_for_team(&self, team_id: &str) -> Vec<&ScheduledMatch> {
        self.matches.iter().filter(|m| m.involves(team_id)).collect()
    }

    /// Matches in a slot.
    pub fn matches_in_slot(&self, slot: usize) -> Vec<&ScheduledMatch> {
        self.matches.iter().filter(|m| m.slot == slot).collect()
    }

    /// Number of slots spanned (highest slot + 1).
    pub fn slot_count(&self) -> usize {
        self.matches.iter().map(|m| m.slot + 1).max().unwrap_or(0)
    }

    /// End of the last match.
    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.matches.iter().map(|m| m.end).max()
    }

    /// Matches grouped by phase, in phase order.
    pub fn phases(&self) -> Vec<PhaseView<'_>> {
        let mut by_phase: BTreeMap<Phase, Vec<&ScheduledMatch>> = BTreeMap::new();
        for m in &self.matches {
            by_phase.entry(m.phase).or_default().push(m);
        }
        by_phase
            .into_iter()
            .map(|(phase, matches)| PhaseView { phase, matches })
            .collect()
    }

    /// Rewrites playoff participants from a bracket snapshot and stores it.
    ///
    /// Only participant references change; slots, fields and times set by
    /// an external editor are left untouched.
    pub fn refresh_playoffs(&mut self, bracket: &Bracket) {
        for node in &bracket.nodes {
            if let Some(m) = self.matches.iter_mut().find(|m| m.id == node.id) {
                m.home = node.home.current();
                m.away = node.away.current();
            }
        }
        self.bracket = Some(bracket.clone());
    }
}
