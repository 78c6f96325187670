//! Tournament configuration.
//!
//! Everything the scheduler consumes from the caller: teams, field count,
//! match timing, rest and search limits, referee mode, and the finals
//! layout. All types deserialize from JSON so configurations can be
//! loaded from a stored tournament definition.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Team;

/// How the rest constraint is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestPolicy {
    /// A pairing that cannot get the minimum rest makes the run unschedulable.
    Strict,
    /// When no rest-compliant cell exists in the search window, the best
    /// non-compliant cell is used and the shortfall is recorded.
    #[default]
    Relaxed,
}

/// Slot/field assigner parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignerConfig {
    /// Minimum idle slots between two matches of the same team.
    pub min_rest_slots: usize,
    /// Rest enforcement.
    pub rest_policy: RestPolicy,
    /// Hard cap on the number of slots. `None` = grown on demand.
    pub max_slots: Option<usize>,
    /// Outer iteration bound (one pending pairing per iteration).
    pub max_iterations: usize,
    /// Leave unplaceable pairings out instead of failing.
    pub accept_incomplete: bool,
}

impl Default for AssignerConfig {
    fn default() -> Self {
        Self {
            min_rest_slots: 1,
            rest_policy: RestPolicy::Relaxed,
            max_slots: None,
            max_iterations: 10_000,
            accept_incomplete: false,
        }
    }
}

impl AssignerConfig {
    /// Sets the minimum rest.
    pub fn with_min_rest(mut self, slots: usize) -> Self {
        self.min_rest_slots = slots;
        self
    }

    /// Sets the rest policy.
    pub fn with_rest_policy(mut self, policy: RestPolicy) -> Self {
        self.rest_policy = policy;
        self
    }

    /// Caps the number of slots.
    pub fn with_max_slots(mut self, slots: usize) -> Self {
        self.max_slots = Some(slots);
        self
    }

    /// Sets the iteration bound.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Accept schedules with unplaced pairings.
    pub fn accepting_incomplete(mut self) -> Self {
        self.accept_incomplete = true;
        self
    }
}

/// Match duration and break structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTiming {
    /// Kick-off of the first slot.
    pub start: NaiveDateTime,
    /// Number of periods per match.
    pub periods: u32,
    /// Length of one period (minutes).
    pub period_minutes: u32,
    /// Break between periods (minutes).
    #[serde(default)]
    pub period_break_minutes: u32,
    /// Break between consecutive slots (minutes).
    #[serde(default)]
    pub slot_break_minutes: u32,
    /// Extra break between the group stage and the playoffs (minutes).
    #[serde(default)]
    pub playoff_break_minutes: u32,
}

impl MatchTiming {
    /// Single-period matches of the given length.
    pub fn new(start: NaiveDateTime, match_minutes: u32) -> Self {
        Self {
            start,
            periods: 1,
            period_minutes: match_minutes,
            period_break_minutes: 0,
            slot_break_minutes: 0,
            playoff_break_minutes: 0,
        }
    }

    /// Sets multi-period structure.
    pub fn with_periods(mut self, periods: u32, period_minutes: u32, break_minutes: u32) -> Self {
        self.periods = periods;
        self.period_minutes = period_minutes;
        self.period_break_minutes = break_minutes;
        self
    }

    /// Sets the break between slots.
    pub fn with_slot_break(mut self, minutes: u32) -> Self {
        self.slot_break_minutes = minutes;
        self
    }

    /// Sets the break before the playoffs.
    pub fn with_playoff_break(mut self, minutes: u32) -> Self {
        self.playoff_break_minutes = minutes;
        self
    }

    /// Duration of one match: periods plus the breaks between them.
    pub fn match_duration(&self) -> Duration {
        let playing = i64::from(self.periods) * i64::from(self.period_minutes);
        let breaks = i64::from(self.periods.saturating_sub(1)) * i64::from(self.period_break_minutes);
        Duration::minutes(playing + breaks)
    }

    /// Distance between the starts of consecutive slots.
    pub fn slot_duration(&self) -> Duration {
        self.match_duration() + Duration::minutes(i64::from(self.slot_break_minutes))
    }
}

/// A referee identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RefereeId {
    /// Index into the organizer's referee roster.
    Official(usize),
    /// A participating team acting as referee.
    Team(String),
}

impl fmt::Display for RefereeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefereeId::Official(i) => write!(f, "referee #{}", i + 1),
            RefereeId::Team(id) => write!(f, "team {id}"),
        }
    }
}

/// Who referees the matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefereeMode {
    /// No referees are assigned.
    #[default]
    None,
    /// Organizer-provided referees, by name.
    Organizer { referees: Vec<String> },
    /// Teams not playing in a slot referee its matches.
    Teams,
}

/// Which playoff rounds exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalsPreset {
    /// Group stage only.
    #[default]
    None,
    /// Top two qualifiers meet in a final.
    FinalOnly,
    /// Four qualifiers: semifinals and final.
    Semifinals,
    /// Eight qualifiers: quarterfinals onward.
    Quarterfinals,
    /// Sixteen qualifiers: round of 16 onward.
    RoundOf16,
}

impl FinalsPreset {
    /// Number of qualifiers entering the bracket.
    pub fn qualifiers(self) -> usize {
        match self {
            FinalsPreset::None => 0,
            FinalsPreset::FinalOnly => 2,
            FinalsPreset::Semifinals => 4,
            FinalsPreset::Quarterfinals => 8,
            FinalsPreset::RoundOf16 => 16,
        }
    }
}

/// Finals configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalsConfig {
    /// Main bracket size.
    pub preset: FinalsPreset,
    /// Match for 3rd place.
    pub third_place: bool,
    /// Match for 5th place.
    pub fifth_sixth: bool,
    /// Match for 7th place (needs quarterfinals).
    pub seventh_eighth: bool,
}

impl FinalsConfig {
    /// Creates a configuration for a preset.
    pub fn new(preset: FinalsPreset) -> Self {
        Self {
            preset,
            ..Default::default()
        }
    }

    /// Adds a 3rd-place match.
    pub fn with_third_place(mut self) -> Self {
        self.third_place = true;
        self
    }

    /// Adds a 5th-place match.
    pub fn with_fifth_sixth(mut self) -> Self {
        self.fifth_sixth = true;
        self
    }

    /// Adds a 7th-place match.
    pub fn with_seventh_eighth(mut self) -> Self {
        self.seventh_eighth = true;
        self
    }
}

/// Complete input for one scheduling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Participating teams. Order defines rotation tie-breaks.
    pub teams: Vec<Team>,
    /// Number of fields played in parallel.
    pub fields: usize,
    /// Match timing.
    pub timing: MatchTiming,
    /// Assigner parameters.
    #[serde(default)]
    pub assigner: AssignerConfig,
    /// Referee mode.
    #[serde(default)]
    pub referees: RefereeMode,
    /// Finals layout.
    #[serde(default)]
    pub finals: FinalsConfig,
}

impl TournamentConfig {
    /// Creates a configuration with default assigner, no referees and no finals.
    pub fn new(teams: Vec<Team>, fields: usize, timing: MatchTiming) -> Self {
        Self {
            teams,
            fields,
            timing,
            assigner: AssignerConfig::default(),
            referees: RefereeMode::None,
            finals: FinalsConfig::default(),
        }
    }

    /// Sets assigner parameters.
    pub fn with_assigner(mut self, assigner: AssignerConfig) -> Self {
        self.assigner = assigner;
        self
    }

    /// Sets the referee mode.
    pub fn with_referees(mut self, mode: RefereeMode) -> Self {
        self.referees = mode;
        self
    }

    /// Sets the finals layout.
    pub fn with_finals(mut self, finals: FinalsConfig) -> Self {
        self.finals = finals;
        self
    }
}
