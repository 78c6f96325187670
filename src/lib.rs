//! Tournament scheduling core.
//!
//! Schedules round-robin group matches into time slots and fields, and
//! resolves elimination-bracket matches whose participants start out as
//! placeholders ("winner of group A", "loser of semifinal 1").
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Team`, `Pairing`, `Placement`,
//!   `ScheduledMatch`, `Schedule`, `BracketNode`, `Bracket`, configuration
//! - **`pairing`**: Circle-method round-robin generation
//! - **`scoring`**: Fairness rules and the weighted engine used to pick cells
//! - **`scheduler`**: Slot/field assignment, home/away balance, referees,
//!   assembly, KPIs, and the end-to-end `TournamentScheduler`
//! - **`bracket`**: Bracket definition builder and placeholder resolver
//! - **`validation`**: Input integrity checks (team counts, duplicate IDs,
//!   placeholder references, bracket cycles)
//! - **`error`**: Typed failures
//!
//! # Architecture
//!
//! Every component is a pure function over explicit values. The group
//! stage is generated once; the bracket resolver runs once per recorded
//! playoff result and returns a versioned delta instead of mutating the
//! bracket it was given. Logging goes through `tracing`; the crate never
//! installs a subscriber.
//!
//! # References
//!
//! - de Werra (1981), "Scheduling in sports"
//! - Rasmussen & Trick (2008), "Round robin scheduling – a survey"

pub mod bracket;
pub mod error;
pub mod models;
pub mod pairing;
pub mod scheduler;
pub mod scoring;
pub mod validation;

pub use bracket::{BracketBuilder, BracketResolver, ResolutionDelta, ResolutionInput};
pub use error::{SchedulingError, UnmetConstraint};
pub use models::{Bracket, Schedule, TournamentConfig};
pub use scheduler::{ScheduleKpi, TournamentScheduler};
