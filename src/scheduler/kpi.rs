//! Schedule quality metrics (KPIs).
//!
//! Computes fairness and density indicators from an assembled schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Slot count | Highest slot + 1 |
//! | Rest violations | Consecutive matches of a team closer than the minimum rest |
//! | Minimum rest | Smallest idle gap (slots) between two matches of any team |
//! | Home/away imbalance | Largest \|home − away\| in the group stage |
//! | Referee spread | Busiest minus least busy referee |
//! | Field utilization | Matches / (slots × fields) |
//!
//! Only matches with both participants known are counted for rest and
//! balance.

use std::collections::{BTreeMap, HashMap};

use crate::models::{Phase, RefereeId, Schedule};

/// Schedule quality indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleKpi {
    /// Number of matches.
    pub match_count: usize,
    /// Number of slots spanned.
    pub slot_count: usize,
    /// Pairs of consecutive matches below the minimum rest.
    pub rest_violations: usize,
    /// Smallest observed idle gap, if any team plays twice.
    pub min_observed_rest: Option<usize>,
    /// Largest |home − away| over group-stage matches.
    pub max_home_away_imbalance: u32,
    /// Matches per referee.
    pub referee_workloads: HashMap<RefereeId, usize>,
    /// Max − min referee workload.
    pub referee_spread: usize,
    /// Matches per field index.
    pub matches_per_field: Vec<usize>,
    /// Fraction of slot × field cells in use (0.0..1.0).
    pub field_utilization: f64,
    /// Playoff matches whose participants are not all known.
    pub unresolved_playoffs: usize,
}

impl ScheduleKpi {
    /// Computes KPIs for a schedule against a minimum rest (slots).
    pub fn calculate(schedule: &Schedule, min_rest_slots: usize) -> Self {
        let slot_count = schedule.slot_count();

        let mut slots_by_team: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        let mut balance: BTreeMap<&str, i64> = BTreeMap::new();
        for m in &schedule.matches {
            let (Some(home), Some(away)) = (m.home.team_id(), m.away.team_id()) else {
                continue;
            };
            slots_by_team.entry(home).or_default().push(m.slot);
            slots_by_team.entry(away).or_default().push(m.slot);
            if m.phase == Phase::GroupStage {
                *balance.entry(home).or_insert(0) += 1;
                *balance.entry(away).or_insert(0) -= 1;
            }
        }

        let mut rest_violations = 0;
        let mut min_observed_rest: Option<usize> = None;
        for slots in slots_by_team.values_mut() {
            slots.sort_unstable();
            for pair in slots.windows(2) {
                let gap = pair[1].saturating_sub(pair[0] + 1);
                if gap < min_rest_slots {
                    rest_violations += 1;
                }
                min_observed_rest = Some(min_observed_rest.map_or(gap, |m| m.min(gap)));
            }
        }

        let max_home_away_imbalance = balance
            .values()
            .map(|d| d.unsigned_abs() as u32)
            .max()
            .unwrap_or(0);

        let mut referee_workloads: HashMap<RefereeId, usize> = HashMap::new();
        for r in schedule.matches.iter().filter_map(|m| m.referee.as_ref()) {
            *referee_workloads.entry(r.clone()).or_insert(0) += 1;
        }
        let referee_spread = match (
            referee_workloads.values().max(),
            referee_workloads.values().min(),
        ) {
            (Some(max), Some(min)) => max - min,
            _ => 0,
        };

        let fields = schedule.matches.iter().map(|m| m.field + 1).max().unwrap_or(0);
        let mut matches_per_field = vec![0usize; fields];
        for m in &schedule.matches {
            matches_per_field[m.field] += 1;
        }

        let cells = slot_count * fields;
        let field_utilization = if cells == 0 {
            0.0
        } else {
            schedule.match_count() as f64 / cells as f64
        };

        let unresolved_playoffs = schedule
            .matches
            .iter()
            .filter(|m| m.phase.is_playoff() && !m.is_resolved())
            .count();

        Self {
            match_count: schedule.match_count(),
            slot_count,
            rest_violations,
            min_observed_rest,
            max_home_away_imbalance,
            referee_workloads,
            referee_spread,
            matches_per_field,
            field_utilization,
            unresolved_playoffs,
        }
    }

    /// Whether the schedule meets the given fairness thresholds.
    pub fn meets_thresholds(&self, max_imbalance: u32, max_rest_violations: usize) -> bool {
        self.max_home_away_imbalance <= max_imbalance && self.rest_violations <= max_rest_violations
    }
}
