//! Candidate cell passed to placement rules.

use crate::models::TeamScheduleState;

/// A (slot, field) cell under evaluation for one pairing, together with
/// both teams' accumulators as they stand before the placement.
#[derive(Debug, Clone, Copy)]
pub struct CandidateCell<'a> {
    /// Candidate slot.
    pub slot: usize,
    /// Candidate field.
    pub field: usize,
    /// Home and away accumulators.
    pub teams: [&'a TeamScheduleState; 2],
    /// Required idle slots between matches of a team.
    pub min_rest_slots: usize,
}

impl<'a> CandidateCell<'a> {
    /// Creates a candidate.
    pub fn new(
        slot: usize,
        field: usize,
        home: &'a TeamScheduleState,
        away: &'a TeamScheduleState,
        min_rest_slots: usize,
    ) -> Self {
        Self {
            slot,
            field,
            teams: [home, away],
            min_rest_slots,
        }
    }

    /// Total missing rest slots across both teams.
    pub fn rest_deficit(&self) -> usize {
        self.teams
            .iter()
            .map(|t| t.rest_deficit(self.slot, self.min_rest_slots))
            .sum()
    }

    /// Whether both teams get the minimum rest.
    pub fn is_rest_compliant(&self) -> bool {
        self.rest_deficit() == 0
    }
}
