//! Tournament domain models.
//!
//! Provides the data types shared by the scheduling pipeline and the
//! bracket resolver: inputs (teams, configuration), intermediate values
//! (pairings, placements, per-team accumulators), and outputs (timed
//! matches, standings, bracket).
//!
//! # Lifecycle
//!
//! | Type | Created | Mutated |
//! |------|---------|---------|
//! | Team | by the caller | never |
//! | Pairing / Placement | once per scheduling run | never |
//! | ScheduledMatch | by the assembler | slot/field by an external editor |
//! | BracketNode | once by the bracket builder | each slot bound once by the resolver |

mod bracket;
mod config;
mod pairing;
mod placement;
mod schedule;
mod team;

pub use bracket::{
    Bracket, BracketNode, GroupLayout, Outcome, ParticipantRef, ParticipantSlot, Placeholder,
};
pub use config::{
    AssignerConfig, FinalsConfig, FinalsPreset, MatchTiming, RefereeId, RefereeMode, RestPolicy,
    TournamentConfig,
};
pub use pairing::{MatchUp, Pairing, PendingPairing, Round};
pub use placement::{GridState, Placement, TeamScheduleState};
pub(crate) use placement::variance;
pub use schedule::{PhaseView, Phase, Schedule, ScheduledMatch, Violation, ViolationType};
pub use team::{StandingsRow, Team};
