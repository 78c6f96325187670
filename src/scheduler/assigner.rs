//! Slot/field assigner.
//!
//! # Algorithm
//!
//! 1. Take pending real pairings in round order, then pairing order.
//! 2. For each pairing, enumerate free cells in the search window
//!    `[0, frontier + min_rest + 1)` (capped by `max_slots`) where
//!    neither team already plays in the slot.
//! 3. Keep the rest-compliant cells; pick the one with the lowest
//!    fairness score (ties → lowest slot, then lowest field).
//! 4. If no compliant cell exists, either fail (`RestPolicy::Strict`) or
//!    take the best non-compliant cell and record the shortfall.
//! 5. Thread the grid state into the next step.
//!
//! Each outer iteration consumes exactly one pending pairing: it is
//! placed, recorded as unplaced (`accept_incomplete`), or the run ends
//! with `Unschedulable`. The window always reaches past the frontier by
//! `min_rest + 1` slots, so an uncapped grid always has a compliant cell.
//!
//! # Complexity
//! O(p * s * f) where p=pairings, s=window slots, f=fields.

use std::collections::VecDeque;
use tracing::{debug, warn};

use crate::error::{SchedulingError, UnmetConstraint};
use crate::models::{
    AssignerConfig, GridState, Pairing, PendingPairing, Placement, RestPolicy, Violation,
};
use crate::scoring::{CandidateCell, FairnessEngine};

/// Result of an assignment run.
#[derive(Debug, Clone, Default)]
pub struct AssignmentOutcome {
    /// Placements in placement order.
    pub placements: Vec<Placement>,
    /// Soft violations (relaxed rest, unplaced pairings).
    pub violations: Vec<Violation>,
    /// Pairings left out under `accept_incomplete`.
    pub unplaced: Vec<PendingPairing>,
}

impl AssignmentOutcome {
    /// Whether every pending pairing was placed.
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }

    /// Number of slots used.
    pub fn slot_count(&self) -> usize {
        self.placements.iter().map(|p| p.slot + 1).max().unwrap_or(0)
    }
}

/// Chosen cell for one pairing.
#[derive(Debug, Clone, Copy)]
struct Choice {
    slot: usize,
    field: usize,
    relaxed: bool,
}

/// Places real pairings into a slot × field grid.
#[derive(Debug, Clone)]
pub struct SlotAssigner {
    fields: usize,
    config: AssignerConfig,
    engine: FairnessEngine,
}

impl SlotAssigner {
    /// Creates an assigner with the standard fairness engine.
    pub fn new(fields: usize, config: AssignerConfig) -> Self {
        Self {
            fields,
            config,
            engine: FairnessEngine::standard(),
        }
    }

    /// Replaces the fairness engine.
    pub fn with_engine(mut self, engine: FairnessEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Places every pending pairing.
    ///
    /// # Errors
    /// `Unschedulable` if a pairing cannot be placed (and incomplete
    /// results are not accepted), or the iteration bound is hit.
    pub fn assign(&self, pending: &[PendingPairing]) -> Result<AssignmentOutcome, SchedulingError> {
        let mut queue: VecDeque<PendingPairing> = pending.iter().cloned().collect();
        let mut grid = GridState::new(self.fields);
        let mut violations = Vec::new();
        let mut unplaced = Vec::new();
        let mut iterations = 0usize;

        while let Some(next) = queue.pop_front() {
            iterations += 1;
            if iterations > self.config.max_iterations {
                return Err(SchedulingError::Unschedulable {
                    pairing: Pairing::Match(next.matchup),
                    constraint: UnmetConstraint::IterationLimit {
                        max_iterations: self.config.max_iterations,
                    },
                    placed: grid.placements().len(),
                });
            }

            match self.choose_cell(&grid, &next) {
                Ok(choice) => {
                    if choice.relaxed {
                        violations.extend(self.rest_violations(&grid, &next, choice.slot));
                    }
                    debug!(
                        pairing = %next.matchup,
                        slot = choice.slot,
                        field = choice.field,
                        relaxed = choice.relaxed,
                        "placed pairing"
                    );
                    let placement = Placement::new(next.matchup, choice.slot, choice.field)
                        .with_origin(next.group, next.round);
                    grid = grid.with_placement(placement);
                }
                Err(constraint) if self.config.accept_incomplete => {
                    warn!(pairing = %next.matchup, %constraint, "pairing left unplaced");
                    violations.push(Violation::unplaced(
                        next.matchup.to_string(),
                        format!("{} could not be placed: {constraint}", next.matchup),
                    ));
                    unplaced.push(next);
                }
                Err(constraint) => {
                    return Err(SchedulingError::Unschedulable {
                        pairing: Pairing::Match(next.matchup),
                        constraint,
                        placed: grid.placements().len(),
                    });
                }
            }
        }

        Ok(AssignmentOutcome {
            placements: grid.into_placements(),
            violations,
            unplaced,
        })
    }

    fn window_end(&self, grid: &GridState) -> usize {
        let end = grid.slot_count() + self.config.min_rest_slots + 1;
        match self.config.max_slots {
            Some(max) => end.min(max),
            None => end,
        }
    }

    fn choose_cell(
        &self,
        grid: &GridState,
        pending: &PendingPairing,
    ) -> Result<Choice, UnmetConstraint> {
        let home = grid.team_or_default(&pending.matchup.home);
        let away = grid.team_or_default(&pending.matchup.away);
        let min_rest = self.config.min_rest_slots;

        let mut cells = Vec::new();
        for slot in 0..self.window_end(grid) {
            if home.plays_in(slot) || away.plays_in(slot) {
                continue;
            }
            for field in 0..self.fields {
                if grid.is_free(slot, field) {
                    cells.push(CandidateCell::new(slot, field, &home, &away, min_rest));
                }
            }
        }

        if cells.is_empty() {
            return Err(UnmetConstraint::SlotCapacity {
                max_slots: self.config.max_slots.unwrap_or_else(|| self.window_end(grid)),
            });
        }

        let compliant: Vec<CandidateCell<'_>> = cells
            .iter()
            .copied()
            .filter(CandidateCell::is_rest_compliant)
            .collect();
        if let Some(best) = self.engine.select_best(&compliant) {
            let cell = compliant[best];
            return Ok(Choice {
                slot: cell.slot,
                field: cell.field,
                relaxed: false,
            });
        }

        match self.config.rest_policy {
            RestPolicy::Strict => Err(UnmetConstraint::MinimumRest {
                min_rest_slots: min_rest,
            }),
            RestPolicy::Relaxed => {
                let best = self.engine.select_best(&cells).ok_or(UnmetConstraint::MinimumRest {
                    min_rest_slots: min_rest,
                })?;
                let cell = cells[best];
                warn!(
                    pairing = %pending.matchup,
                    slot = cell.slot,
                    missing = cell.rest_deficit(),
                    "minimum rest relaxed"
                );
                Ok(Choice {
                    slot: cell.slot,
                    field: cell.field,
                    relaxed: true,
                })
            }
        }
    }

    fn rest_violations(&self, grid: &GridState, pending: &PendingPairing, slot: usize) -> Vec<Violation> {
        let min_rest = self.config.min_rest_slots;
        pending
            .matchup
            .teams()
            .into_iter()
            .filter_map(|team_id| {
                let state = grid.team(team_id)?;
                let rest = state.rest_around(slot)?;
                (rest < min_rest).then(|| {
                    Violation::insufficient_rest(
                        team_id,
                        format!("{team_id} rests {rest} slot(s) around slot {slot}, minimum is {min_rest}"),
                    )
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchUp, ViolationType};
    use crate::pairing::RoundRobin;
    use std::collections::{HashMap, HashSet};

    fn pending_for(n: usize) -> Vec<PendingPairing> {
        let ids: Vec<String> = (1..=n).map(|i| format!("T{i}")).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let mut groups = std::collections::BTreeMap::new();
        groups.insert(String::new(), RoundRobin::rounds(&refs, None));
        RoundRobin::pending(&groups)
    }

    fn assert_no_double_booking(placements: &[Placement]) {
        let mut cells = HashSet::new();
        let mut team_slots = HashSet::new();
        for p in placements {
            assert!(cells.insert((p.slot, p.field)), "cell ({}, {}) reused", p.slot, p.field);
            for team in p.matchup.teams() {
                assert!(
                    team_slots.insert((team.to_string(), p.slot)),
                    "{team} plays twice in slot {}",
                    p.slot
                );
            }
        }
    }

    fn min_rest_observed(placements: &[Placement]) -> Option<usize> {
        let mut slots: HashMap<&str, Vec<usize>> = HashMap::new();
        for p in placements {
            for team in p.matchup.teams() {
                slots.entry(team).or_default().push(p.slot);
            }
        }
        slots
            .values_mut()
            .filter_map(|s| {
                s.sort_unstable();
                s.windows(2).map(|w| w[1] - w[0] - 1).min()
            })
            .min()
    }

    #[test]
    fn test_five_teams_one_field() {
        let pending = pending_for(5);
        assert_eq!(pending.len(), 10);

        let assigner = SlotAssigner::new(1, AssignerConfig::default().with_min_rest(1));
        let outcome = assigner.assign(&pending).unwrap();

        assert_eq!(outcome.placements.len(), 10);
        assert!(outcome.is_complete());
        assert!(outcome.violations.is_empty());
        assert_no_double_booking(&outcome.placements);
        assert!(min_rest_observed(&outcome.placements).unwrap() >= 1);
    }

    #[test]
    fn test_multiple_fields_fill_in_parallel() {
        let pending = pending_for(8);
        let assigner = SlotAssigner::new(4, AssignerConfig::default().with_min_rest(0));
        let outcome = assigner.assign(&pending).unwrap();

        assert_eq!(outcome.placements.len(), 28);
        assert_no_double_booking(&outcome.placements);
        // 4 matches per round fit 4 fields
        assert_eq!(outcome.slot_count(), 7);
    }

    #[test]
    fn test_rest_respected_with_two_fields() {
        let pending = pending_for(6);
        let assigner = SlotAssigner::new(2, AssignerConfig::default().with_min_rest(2));
        let outcome = assigner.assign(&pending).unwrap();

        assert_eq!(outcome.placements.len(), 15);
        assert_no_double_booking(&outcome.placements);
        assert!(min_rest_observed(&outcome.placements).unwrap() >= 2);
    }

    #[test]
    fn test_deterministic() {
        let pending = pending_for(7);
        let assigner = SlotAssigner::new(2, AssignerConfig::default());
        let a = assigner.assign(&pending).unwrap();
        let b = assigner.assign(&pending).unwrap();
        assert_eq!(a.placements, b.placements);
    }

    #[test]
    fn test_strict_rest_unschedulable() {
        // 3 teams, 1 field, rest far beyond the 3 available slots
        let pending = pending_for(3);
        let config = AssignerConfig::default()
            .with_min_rest(5)
            .with_max_slots(3)
            .with_rest_policy(RestPolicy::Strict);
        let err = SlotAssigner::new(1, config).assign(&pending).unwrap_err();

        match err {
            SchedulingError::Unschedulable {
                constraint, placed, ..
            } => {
                assert_eq!(constraint, UnmetConstraint::MinimumRest { min_rest_slots: 5 });
                assert_eq!(placed, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_relaxed_rest_records_violations() {
        let pending = pending_for(3);
        let config = AssignerConfig::default().with_min_rest(5).with_max_slots(3);
        let outcome = SlotAssigner::new(1, config).assign(&pending).unwrap();

        assert_eq!(outcome.placements.len(), 3);
        assert!(!outcome.violations.is_empty());
        assert!(outcome
            .violations
            .iter()
            .all(|v| v.violation_type == ViolationType::InsufficientRest));
    }

    #[test]
    fn test_slot_capacity_unschedulable() {
        // 3 matches cannot fit into 2 slots on one field
        let pending = pending_for(3);
        let config = AssignerConfig::default().with_min_rest(0).with_max_slots(2);
        let err = SlotAssigner::new(1, config).assign(&pending).unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::Unschedulable {
                constraint: UnmetConstraint::SlotCapacity { max_slots: 2 },
                placed: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_accept_incomplete() {
        let pending = pending_for(3);
        let config = AssignerConfig::default()
            .with_min_rest(0)
            .with_max_slots(2)
            .accepting_incomplete();
        let outcome = SlotAssigner::new(1, config).assign(&pending).unwrap();

        assert_eq!(outcome.placements.len(), 2);
        assert_eq!(outcome.unplaced.len(), 1);
        assert!(!outcome.is_complete());
        assert_eq!(outcome.violations[0].violation_type, ViolationType::Unplaced);
    }

    #[test]
    fn test_iteration_limit() {
        let pending = pending_for(4);
        let config = AssignerConfig::default().with_max_iterations(3);
        let err = SlotAssigner::new(2, config).assign(&pending).unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::Unschedulable {
                constraint: UnmetConstraint::IterationLimit { max_iterations: 3 },
                placed: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_provenance_kept() {
        let pending = vec![PendingPairing {
            matchup: MatchUp::new("A", "B"),
            group: Some("G".into()),
            round: 2,
        }];
        let outcome = SlotAssigner::new(1, AssignerConfig::default())
            .assign(&pending)
            .unwrap();
        let p = &outcome.placements[0];
        assert_eq!(p.group.as_deref(), Some("G"));
        assert_eq!(p.round, 2);
        assert_eq!((p.slot, p.field), (0, 0));
    }
}
