//! Referee assignment.
//!
//! # Algorithm
//!
//! Matches are visited in (slot, field) order. The eligible referees for
//! a match are those not already refereeing in that slot and, in teams
//! mode, not playing in that slot. The eligible referee with the lowest
//! running count is chosen; ties go to the lowest roster index.
//!
//! `balance_workloads` is a separate pass over an existing assignment:
//! it moves matches from the busiest to the least busy referees while
//! the spread exceeds one and a conflict-free move exists.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::models::{Placement, RefereeId, RefereeMode, Team, Violation};

/// Referees per placement plus any matches left without one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefereeAssignment {
    /// Referee per placement, aligned with the input order.
    pub referees: Vec<Option<RefereeId>>,
    /// Matches for which no referee was free.
    pub violations: Vec<Violation>,
}

/// Assigns referees to placed matches.
#[derive(Debug, Clone)]
pub struct RefereeAssigner {
    pool: Vec<RefereeId>,
    teams_mode: bool,
}

impl RefereeAssigner {
    /// Creates an assigner for the given mode. `teams` supplies the pool
    /// in teams mode.
    pub fn new(mode: &RefereeMode, teams: &[Team]) -> Self {
        let (pool, teams_mode) = match mode {
            RefereeMode::None => (Vec::new(), false),
            RefereeMode::Organizer { referees } => {
                ((0..referees.len()).map(RefereeId::Official).collect(), false)
            }
            RefereeMode::Teams => (
                teams.iter().map(|t| RefereeId::Team(t.id.clone())).collect(),
                true,
            ),
        };
        Self { pool, teams_mode }
    }

    /// Whether any referees are assigned at all.
    pub fn is_enabled(&self) -> bool {
        !self.pool.is_empty()
    }

    /// The referee pool in tie-break order.
    pub fn pool(&self) -> &[RefereeId] {
        &self.pool
    }

    /// Assigns a referee to every placement.
    pub fn assign(&self, placements: &[Placement]) -> RefereeAssignment {
        let mut referees = vec![None; placements.len()];
        if !self.is_enabled() {
            return RefereeAssignment {
                referees,
                violations: Vec::new(),
            };
        }

        let mut order: Vec<usize> = (0..placements.len()).collect();
        order.sort_by_key(|&i| (placements[i].slot, placements[i].field));

        let mut counts = vec![0usize; self.pool.len()];
        let mut booked: HashSet<(usize, usize)> = HashSet::new(); // (slot, pool index)
        let playing = playing_by_slot(placements);
        let mut violations = Vec::new();

        for idx in order {
            let slot = placements[idx].slot;
            let best = (0..self.pool.len())
                .filter(|&r| !booked.contains(&(slot, r)))
                .filter(|&r| !self.plays_in(r, slot, &playing))
                .min_by_key(|&r| (counts[r], r));

            match best {
                Some(r) => {
                    counts[r] += 1;
                    booked.insert((slot, r));
                    referees[idx] = Some(self.pool[r].clone());
                }
                None => {
                    let p = &placements[idx];
                    warn!(matchup = %p.matchup, slot, "no referee available");
                    violations.push(Violation::referee_unavailable(
                        p.matchup.to_string(),
                        format!("No referee free for {} in slot {slot}", p.matchup),
                    ));
                }
            }
        }

        RefereeAssignment {
            referees,
            violations,
        }
    }

    /// Rebalances an existing assignment.
    ///
    /// Moves matches from overloaded to underloaded referees while the
    /// max-min spread exceeds one. A move is only made when the target
    /// referee is free in that slot (and, in teams mode, not playing).
    /// Referees outside the pool are left untouched.
    pub fn balance_workloads(
        &self,
        placements: &[Placement],
        referees: &[Option<RefereeId>],
    ) -> Vec<Option<RefereeId>> {
        let mut result = referees.to_vec();
        if !self.is_enabled() {
            return result;
        }

        let index_of: HashMap<&RefereeId, usize> =
            self.pool.iter().enumerate().map(|(i, r)| (r, i)).collect();
        let playing = playing_by_slot(placements);
        let mut moves = 0usize;

        // Each move lowers the sum of squared workloads, so this terminates.
        loop {
            let mut counts = vec![0usize; self.pool.len()];
            let mut booked: HashSet<(usize, usize)> = HashSet::new();
            for (p, r) in placements.iter().zip(&result) {
                if let Some(&ri) = r.as_ref().and_then(|r| index_of.get(r)) {
                    counts[ri] += 1;
                    booked.insert((p.slot, ri));
                }
            }

            let mut by_load: Vec<usize> = (0..self.pool.len()).collect();
            by_load.sort_by_key(|&r| (counts[r], r));

            let mut moved = false;
            'search: for &over in by_load.iter().rev() {
                for &under in &by_load {
                    if counts[over] < counts[under] + 2 {
                        break;
                    }
                    let candidate = placements.iter().zip(&result).position(|(p, r)| {
                        r.as_ref().and_then(|r| index_of.get(r)) == Some(&over)
                            && !booked.contains(&(p.slot, under))
                            && !self.plays_in(under, p.slot, &playing)
                    });
                    if let Some(idx) = candidate {
                        result[idx] = Some(self.pool[under].clone());
                        moves += 1;
                        moved = true;
                        break 'search;
                    }
                }
            }

            if !moved {
                break;
            }
        }

        debug!(moves, "referee workloads balanced");
        result
    }

    fn plays_in(&self, r: usize, slot: usize, playing: &HashMap<usize, HashSet<&str>>) -> bool {
        if !self.teams_mode {
            return false;
        }
        match &self.pool[r] {
            RefereeId::Team(id) => playing.get(&slot).is_some_and(|s| s.contains(id.as_str())),
            RefereeId::Official(_) => false,
        }
    }
}

fn playing_by_slot(placements: &[Placement]) -> HashMap<usize, HashSet<&str>> {
    let mut playing: HashMap<usize, HashSet<&str>> = HashMap::new();
    for p in placements {
        let teams = playing.entry(p.slot).or_default();
        teams.insert(&p.matchup.home);
        teams.insert(&p.matchup.away);
    }
    playing
}

/// Matches per referee.
pub fn workloads(referees: &[Option<RefereeId>]) -> HashMap<RefereeId, usize> {
    let mut counts = HashMap::new();
    for r in referees.iter().flatten() {
        *counts.entry(r.clone()).or_insert(0) += 1;
    }
    counts
}
