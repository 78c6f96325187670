//! Built-in placement rules.
//!
//! # Categories
//!
//! - **Spread**: SLOT_SPREAD, FIELD_SPREAD
//! - **Rest**: REST_DEFICIT
//! - **Compactness**: LATENESS
//!
//! # Score Convention
//! All rules return lower scores for fairer cells.

use super::{CandidateCell, PlacementRule, RuleScore};

/// Variance of each team's gaps between consecutive matches.
///
/// Prefers cells that keep a team's matches evenly spaced.
#[derive(Debug, Clone, Copy)]
pub struct SlotSpread;

impl PlacementRule for SlotSpread {
    fn name(&self) -> &'static str {
        "SLOT_SPREAD"
    }

    fn evaluate(&self, cell: &CandidateCell<'_>) -> RuleScore {
        cell.teams
            .iter()
            .map(|t| t.gap_variance_with(cell.slot))
            .sum()
    }

    fn description(&self) -> &'static str {
        "Variance of gaps between a team's matches"
    }
}

/// Variance of each team's per-field play counts.
///
/// Prefers cells that rotate teams across fields.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpread;

impl PlacementRule for FieldSpread {
    fn name(&self) -> &'static str {
        "FIELD_SPREAD"
    }

    fn evaluate(&self, cell: &CandidateCell<'_>) -> RuleScore {
        cell.teams
            .iter()
            .map(|t| t.field_variance_with(cell.field))
            .sum()
    }

    fn description(&self) -> &'static str {
        "Variance of a team's per-field match counts"
    }
}

/// Missing rest slots across both teams.
///
/// Zero for rest-compliant cells; only separates cells once the rest
/// constraint has been relaxed.
#[derive(Debug, Clone, Copy)]
pub struct RestDeficit;

impl PlacementRule for RestDeficit {
    fn name(&self) -> &'static str {
        "REST_DEFICIT"
    }

    fn evaluate(&self, cell: &CandidateCell<'_>) -> RuleScore {
        cell.rest_deficit() as f64
    }

    fn description(&self) -> &'static str {
        "Slots of rest missing below the minimum"
    }
}

/// Slot index.
///
/// Keeps the schedule compact by preferring earlier slots.
#[derive(Debug, Clone, Copy)]
pub struct Lateness;

impl PlacementRule for Lateness {
    fn name(&self) -> &'static str {
        "LATENESS"
    }

    fn evaluate(&self, cell: &CandidateCell<'_>) -> RuleScore {
        cell.slot as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamScheduleState;

    #[test]
    fn test_slot_spread_prefers_even_gaps() {
        let home = TeamScheduleState::new(1).record(0, 0, true).record(2, 0, true);
        let away = TeamScheduleState::new(1);

        let even = CandidateCell::new(4, 0, &home, &away, 1);
        let uneven = CandidateCell::new(7, 0, &home, &away, 1);
        assert!(SlotSpread.evaluate(&even) < SlotSpread.evaluate(&uneven));
    }

    #[test]
    fn test_field_spread_prefers_unused_field() {
        let home = TeamScheduleState::new(2).record(0, 0, true);
        let away = TeamScheduleState::new(2).record(0, 0, false);

        let same = CandidateCell::new(2, 0, &home, &away, 1);
        let other = CandidateCell::new(2, 1, &home, &away, 1);
        assert!(FieldSpread.evaluate(&other) < FieldSpread.evaluate(&same));
        assert!(FieldSpread.evaluate(&other).abs() < 1e-10);
    }

    #[test]
    fn test_rest_deficit() {
        let home = TeamScheduleState::new(1).record(3, 0, true);
        let away = TeamScheduleState::new(1).record(2, 0, false);

        // Slot 4: home rests 0 (deficit 2), away rests 1 (deficit 1)
        let cell = CandidateCell::new(4, 0, &home, &away, 2);
        assert_eq!(RestDeficit.evaluate(&cell), 3.0);
        assert!(!cell.is_rest_compliant());

        let later = CandidateCell::new(6, 0, &home, &away, 2);
        assert_eq!(RestDeficit.evaluate(&later), 0.0);
        assert!(later.is_rest_compliant());
    }

    #[test]
    fn test_lateness() {
        let t = TeamScheduleState::new(1);
        assert_eq!(Lateness.evaluate(&CandidateCell::new(5, 0, &t, &t, 0)), 5.0);
    }
}
