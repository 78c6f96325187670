//! Weighted fairness engine.
//!
//! Combines placement rules into one score per candidate cell and picks
//! the best cell deterministically.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, CandidateCell, PlacementRule, RuleScore};

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn PlacementRule>,
    weight: f64,
}

/// A weighted combination of placement rules.
///
/// # Example
/// ```
/// use u_tournament::scoring::{FairnessEngine, rules};
///
/// let engine = FairnessEngine::new()
///     .with_weighted_rule(rules::SlotSpread, 1.0)
///     .with_weighted_rule(rules::FieldSpread, 2.0);
/// ```
#[derive(Clone)]
pub struct FairnessEngine {
    rules: Vec<WeightedRule>,
    epsilon: f64,
}

impl FairnessEngine {
    /// Creates an empty engine (every cell scores 0).
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            epsilon: 1e-9,
        }
    }

    /// The default fairness heuristic: slot spread and field spread at
    /// weight 1, a heavy rest-deficit penalty, and a lateness term strong
    /// enough that spread only trades against a later slot when the
    /// variance gain is large.
    pub fn standard() -> Self {
        Self::new()
            .with_weighted_rule(rules::SlotSpread, 1.0)
            .with_weighted_rule(rules::FieldSpread, 1.0)
            .with_weighted_rule(rules::RestDeficit, 100.0)
            .with_weighted_rule(rules::Lateness, 4.0)
    }

    /// Adds a rule with weight 1.0.
    pub fn with_rule<R: PlacementRule + 'static>(self, rule: R) -> Self {
        self.with_weighted_rule(rule, 1.0)
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: PlacementRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Weighted score of a cell.
    pub fn score(&self, cell: &CandidateCell<'_>) -> RuleScore {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(cell) * wr.weight)
            .sum()
    }

    /// Weighted per-rule scores of a cell.
    pub fn evaluate(&self, cell: &CandidateCell<'_>) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(cell) * wr.weight)
            .collect()
    }

    /// Index of the best cell: lowest score, then lowest slot, then
    /// lowest field.
    pub fn select_best(&self, cells: &[CandidateCell<'_>]) -> Option<usize> {
        let scores: Vec<f64> = cells.iter().map(|c| self.score(c)).collect();
        (0..cells.len()).min_by(|&a, &b| self.compare(&cells[a], scores[a], &cells[b], scores[b]))
    }

    fn compare(
        &self,
        a: &CandidateCell<'_>,
        score_a: f64,
        b: &CandidateCell<'_>,
        score_b: f64,
    ) -> Ordering {
        if (score_a - score_b).abs() > self.epsilon {
            return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
        }
        (a.slot, a.field).cmp(&(b.slot, b.field))
    }
}

impl Default for FairnessEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for FairnessEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FairnessEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamScheduleState;

    #[test]
    fn test_empty_engine_ties_to_lowest_cell() {
        let t = TeamScheduleState::new(2);
        let cells = vec![
            CandidateCell::new(3, 0, &t, &t, 0),
            CandidateCell::new(1, 1, &t, &t, 0),
            CandidateCell::new(1, 0, &t, &t, 0),
        ];
        let engine = FairnessEngine::new();
        assert_eq!(engine.select_best(&cells), Some(2));
    }

    #[test]
    fn test_weighted_selection() {
        let home = TeamScheduleState::new(2).record(0, 0, true);
        let away = TeamScheduleState::new(2).record(0, 0, false);
        let cells = vec![
            CandidateCell::new(2, 0, &home, &away, 1),
            CandidateCell::new(2, 1, &home, &away, 1),
        ];
        let engine = FairnessEngine::new().with_rule(rules::FieldSpread);
        assert_eq!(engine.select_best(&cells), Some(1));
    }

    #[test]
    fn test_rest_penalty_dominates() {
        let home = TeamScheduleState::new(1).record(0, 0, true);
        let away = TeamScheduleState::new(1);
        let cells = vec![
            CandidateCell::new(1, 0, &home, &away, 1),
            CandidateCell::new(2, 0, &home, &away, 1),
        ];
        let engine = FairnessEngine::standard();
        assert_eq!(engine.select_best(&cells), Some(1));
        assert_eq!(engine.evaluate(&cells[0]).len(), 4);
    }

    #[test]
    fn test_select_best_empty() {
        assert_eq!(FairnessEngine::standard().select_best(&[]), None);
    }

    #[test]
    fn test_debug_lists_rules() {
        let debug = format!("{:?}", FairnessEngine::standard());
        assert!(debug.contains("SLOT_SPREAD(w=1)"));
        assert!(debug.contains("REST_DEFICIT(w=100)"));
    }
}
