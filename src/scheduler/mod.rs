//! Group-stage scheduling and KPI evaluation.
//!
//! Places round-robin pairings into a slot × field grid, evens out
//! home/away orientation, assigns referees, and assembles the timed
//! schedule with the playoff bracket appended.
//!
//! # Stages
//!
//! | Stage | Type |
//! |-------|------|
//! | Slot/field placement | [`SlotAssigner`] |
//! | Home/away balance | [`HomeAwayBalancer`] |
//! | Referees | [`RefereeAssigner`] |
//! | Timing and numbering | [`ScheduleAssembler`] |
//! | All of the above | [`TournamentScheduler`] |
//!
//! # KPI
//!
//! `ScheduleKpi` reports slot count, rest violations, minimum observed
//! rest, home/away imbalance, referee spread, and field usage.
//!
//! # References
//!
//! - de Werra (1981), "Scheduling in sports"
//! - Kendall et al. (2010), "Scheduling in sports: An annotated bibliography"

mod assembler;
mod assigner;
mod balancer;
mod kpi;
mod referee;
mod tournament;

pub use assembler::ScheduleAssembler;
pub use assigner::{AssignmentOutcome, SlotAssigner};
pub use balancer::{imbalances, max_imbalance, HomeAwayBalancer};
pub use kpi::ScheduleKpi;
pub use referee::{workloads, RefereeAssigner, RefereeAssignment};
pub use tournament::TournamentScheduler;
