//! Placement model and per-team accumulators.
//!
//! A placement binds a real match-up to a (slot, field) cell of the
//! schedule grid. `GridState` is the accumulator threaded through one
//! assignment run: each placement step consumes it and returns the
//! updated state, so independent runs never share counters.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::MatchUp;

/// A match-up bound to a grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// The placed match-up (home first).
    pub matchup: MatchUp,
    /// Source group.
    pub group: Option<String>,
    /// Source round index within the group.
    pub round: usize,
    /// Zero-based slot index.
    pub slot: usize,
    /// Zero-based field index.
    pub field: usize,
}

impl Placement {
    /// Creates a placement.
    pub fn new(matchup: MatchUp, slot: usize, field: usize) -> Self {
        Self {
            matchup,
            group: None,
            round: 0,
            slot,
            field,
        }
    }

    /// Sets the provenance (group and round).
    pub fn with_origin(mut self, group: Option<String>, round: usize) -> Self {
        self.group = group;
        self.round = round;
        self
    }
}

/// Per-team scheduling accumulator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamScheduleState {
    /// Slots played, ascending.
    pub slots: Vec<usize>,
    /// Matches played per field.
    pub field_counts: Vec<u32>,
    /// Latest slot played.
    pub last_slot: Option<usize>,
    /// Matches as home side.
    pub home_count: u32,
    /// Matches as away side.
    pub away_count: u32,
}

impl TeamScheduleState {
    /// Creates an empty accumulator for a grid with `fields` fields.
    pub fn new(fields: usize) -> Self {
        Self {
            field_counts: vec![0; fields],
            ..Default::default()
        }
    }

    /// Records a match and returns the updated accumulator.
    pub fn record(mut self, slot: usize, field: usize, home: bool) -> Self {
        let pos = self.slots.partition_point(|&s| s < slot);
        self.slots.insert(pos, slot);
        if field >= self.field_counts.len() {
            self.field_counts.resize(field + 1, 0);
        }
        self.field_counts[field] += 1;
        self.last_slot = Some(self.last_slot.map_or(slot, |last| last.max(slot)));
        if home {
            self.home_count += 1;
        } else {
            self.away_count += 1;
        }
        self
    }

    /// Number of matches recorded.
    pub fn matches_played(&self) -> usize {
        self.slots.len()
    }

    /// Whether the team already plays in `slot`.
    pub fn plays_in(&self, slot: usize) -> bool {
        self.slots.binary_search(&slot).is_ok()
    }

    /// Idle slots between `slot` and the nearest recorded match.
    ///
    /// `None` when no match is recorded yet.
    pub fn rest_around(&self, slot: usize) -> Option<usize> {
        let pos = self.slots.partition_point(|&s| s < slot);
        let before = pos
            .checked_sub(1)
            .map(|i| slot.saturating_sub(self.slots[i] + 1));
        let after = self
            .slots
            .get(pos)
            .map(|&s| s.saturating_sub(slot + 1));
        match (before, after) {
            (Some(b), Some(a)) => Some(b.min(a)),
            (b, a) => b.or(a),
        }
    }

    /// Missing rest slots if the team played in `slot`.
    pub fn rest_deficit(&self, slot: usize, min_rest: usize) -> usize {
        self.rest_around(slot)
            .map_or(0, |rest| min_rest.saturating_sub(rest))
    }

    /// Smallest idle gap between consecutive recorded matches.
    pub fn min_rest(&self) -> Option<usize> {
        self.slots.windows(2).map(|w| w[1] - w[0] - 1).min()
    }

    /// Variance of the gaps between consecutive matches if the team
    /// also played in `slot`.
    pub fn gap_variance_with(&self, slot: usize) -> f64 {
        let mut slots = self.slots.clone();
        let pos = slots.partition_point(|&s| s < slot);
        slots.insert(pos, slot);
        let gaps: Vec<f64> = slots.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
        variance(&gaps)
    }

    /// Variance of per-field play counts if the team also played on `field`.
    pub fn field_variance_with(&self, field: usize) -> f64 {
        let mut counts: Vec<f64> = self.field_counts.iter().map(|&c| f64::from(c)).collect();
        if field >= counts.len() {
            counts.resize(field + 1, 0.0);
        }
        counts[field] += 1.0;
        variance(&counts)
    }

    /// Home count minus away count.
    pub fn imbalance(&self) -> i64 {
        i64::from(self.home_count) - i64::from(self.away_count)
    }
}

/// Population variance. Zero for fewer than two values.
pub(crate) fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Grid occupancy and team accumulators for one assignment run.
#[derive(Debug, Clone, Default)]
pub struct GridState {
    fields: usize,
    cells: Vec<Vec<bool>>,
    teams: HashMap<String, TeamScheduleState>,
    placements: Vec<Placement>,
}

impl GridState {
    /// Creates an empty grid with a fixed number of fields.
    pub fn new(fields: usize) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    /// Number of fields.
    pub fn fields(&self) -> usize {
        self.fields
    }

    /// Number of slots touched so far (highest used slot + 1).
    pub fn slot_count(&self) -> usize {
        self.cells
            .iter()
            .rposition(|row| row.iter().any(|&used| used))
            .map_or(0, |i| i + 1)
    }

    /// Whether the cell is free. Cells beyond the current grid are free.
    pub fn is_free(&self, slot: usize, field: usize) -> bool {
        field < self.fields && !self.cells.get(slot).is_some_and(|row| row[field])
    }

    /// Accumulator for a team, if it has played.
    pub fn team(&self, team_id: &str) -> Option<&TeamScheduleState> {
        self.teams.get(team_id)
    }

    /// Accumulator for a team, or an empty one.
    pub fn team_or_default(&self, team_id: &str) -> TeamScheduleState {
        self.teams
            .get(team_id)
            .cloned()
            .unwrap_or_else(|| TeamScheduleState::new(self.fields))
    }

    /// Whether the team plays in `slot`.
    pub fn team_plays_in(&self, team_id: &str, slot: usize) -> bool {
        self.teams.get(team_id).is_some_and(|t| t.plays_in(slot))
    }

    /// Placements made so far, in placement order.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Records a placement and returns the updated state.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        let (slot, field) = (placement.slot, placement.field);
        let fields = self.fields;
        if self.cells.len() <= slot {
            self.cells.resize_with(slot + 1, || vec![false; fields]);
        }
        self.cells[slot][field] = true;

        for (team_id, home) in [
            (placement.matchup.home.clone(), true),
            (placement.matchup.away.clone(), false),
        ] {
            let state = self
                .teams
                .remove(&team_id)
                .unwrap_or_else(|| TeamScheduleState::new(fields));
            self.teams.insert(team_id, state.record(slot, field, home));
        }

        self.placements.push(placement);
        self
    }

    /// Consumes the state, returning its placements.
    pub fn into_placements(self) -> Vec<Placement> {
        self.placements
    }
}
