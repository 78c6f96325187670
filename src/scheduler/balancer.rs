//! Home/away balancer.
//!
//! # Algorithm
//!
//! Treat each placement as a directed edge home → away and let
//! `d(t) = home(t) - away(t)`. While some team `u` can reach a team `w`
//! along home → away edges with `d(u) - d(w) > 2`, reverse every edge on
//! the shortest such path. Intermediate teams keep their balance; `u`
//! loses 2 and `w` gains 2, so the sum of squared imbalances strictly
//! drops and the loop terminates. At the fixed point every team in a
//! round-robin group satisfies `|d| <= 1`.
//!
//! Only orientation changes: pairs, slots and fields are untouched.
//!
//! # Reference
//! Hakimi (1965), "On the degrees of the vertices of a directed graph"

use std::collections::{BTreeMap, HashMap, VecDeque};
use tracing::debug;

use crate::models::Placement;

/// Evens out home/away counts by flipping orientation.
#[derive(Debug, Clone)]
pub struct HomeAwayBalancer {
    max_iterations: usize,
}

impl HomeAwayBalancer {
    /// Creates a balancer with the default iteration cap.
    pub fn new() -> Self {
        Self {
            max_iterations: 10_000,
        }
    }

    /// Sets the iteration cap (path reversals).
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Returns re-oriented copies of the placements.
    pub fn balance(&self, placements: &[Placement]) -> Vec<Placement> {
        let mut balanced = placements.to_vec();
        let mut flips = 0usize;

        for _ in 0..self.max_iterations {
            let Some(path) = Self::improving_path(&balanced) else {
                break;
            };
            for idx in path {
                let p = &mut balanced[idx];
                p.matchup = p.matchup.reversed();
                flips += 1;
            }
        }

        debug!(flips, max_imbalance = max_imbalance(&balanced), "home/away balanced");
        balanced
    }

    /// Finds a shortest home → away path whose reversal reduces the
    /// squared imbalance. Returns placement indices along the path.
    fn improving_path(placements: &[Placement]) -> Option<Vec<usize>> {
        let balance = imbalances(placements);
        let mut outgoing: HashMap<&str, Vec<(usize, &str)>> = HashMap::new();
        for (idx, p) in placements.iter().enumerate() {
            outgoing
                .entry(p.matchup.home.as_str())
                .or_default()
                .push((idx, p.matchup.away.as_str()));
        }

        let mut order: Vec<(&str, i64)> = balance.iter().map(|(t, &d)| (*t, d)).collect();
        order.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        for &(start, d_start) in &order {
            let mut came_from: HashMap<&str, usize> = HashMap::new();
            let mut queue = VecDeque::from([start]);

            while let Some(team) = queue.pop_front() {
                if team != start && d_start - balance[team] > 2 {
                    // Walk predecessors back to the start.
                    let mut path = Vec::new();
                    let mut cur = team;
                    while cur != start {
                        let idx = came_from[cur];
                        path.push(idx);
                        cur = placements[idx].matchup.home.as_str();
                    }
                    return Some(path);
                }
                for &(idx, next) in outgoing.get(team).map(Vec::as_slice).unwrap_or(&[]) {
                    if next != start && !came_from.contains_key(next) {
                        came_from.insert(next, idx);
                        queue.push_back(next);
                    }
                }
            }
        }

        None
    }
}

impl Default for HomeAwayBalancer {
    fn default() -> Self {
        Self::new()
    }
}

/// Home minus away per team.
pub fn imbalances(placements: &[Placement]) -> BTreeMap<&str, i64> {
    let mut balance: BTreeMap<&str, i64> = BTreeMap::new();
    for p in placements {
        *balance.entry(p.matchup.home.as_str()).or_insert(0) += 1;
        *balance.entry(p.matchup.away.as_str()).or_insert(0) -= 1;
    }
    balance
}

/// Largest |home - away| over all teams.
pub fn max_imbalance(placements: &[Placement]) -> u64 {
    imbalances(placements)
        .values()
        .map(|d| d.unsigned_abs())
        .max()
        .unwrap_or(0)
}
