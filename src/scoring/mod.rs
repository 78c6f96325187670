//! Fairness scoring for slot/field placement.
//!
//! Provides placement rules (slot spread, field spread, rest deficit,
//! lateness) and a weighted engine combining them into one fairness
//! score per candidate cell.
//!
//! # Usage
//!
//! ```
//! use u_tournament::scoring::{FairnessEngine, rules};
//!
//! let engine = FairnessEngine::new()
//!     .with_weighted_rule(rules::SlotSpread, 1.0)
//!     .with_weighted_rule(rules::Lateness, 0.5);
//! ```
//!
//! # Score Convention
//! **Lower score = better cell.** Ties are broken by lowest slot, then
//! lowest field.

mod context;
mod engine;
pub mod rules;

pub use context::CandidateCell;
pub use engine::FairnessEngine;

use std::fmt::Debug;

/// Score returned by a placement rule. Lower is better.
pub type RuleScore = f64;

/// A rule that scores one candidate cell for a pairing.
pub trait PlacementRule: Send + Sync + Debug {
    /// Rule name (e.g., "SLOT_SPREAD").
    fn name(&self) -> &'static str;

    /// Scores the cell; lower = fairer.
    fn evaluate(&self, cell: &CandidateCell<'_>) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
