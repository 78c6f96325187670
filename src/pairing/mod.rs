//! Round-robin pairing generation.
//!
//! # Algorithm (circle method)
//!
//! 1. If the team count is odd, append a bye sentinel so `n` is even.
//! 2. Fix position 0; the other `n - 1` positions rotate one step per round.
//! 3. Each round pairs position 0 with position `n - 1`, and position `i`
//!    with position `n - 1 - i` for `0 < i < n / 2`.
//!
//! Over `n - 1` rounds every unordered pair meets exactly once. A team
//! paired with the sentinel gets a `Pairing::Bye` for that round, so with
//! an odd team count every team has exactly one bye.
//!
//! Orientation alternates with the round index; the home/away balancer
//! evens it out afterwards.
//!
//! # Reference
//! Kirkman (1847); Lucas (1883), "Récréations mathématiques", Vol. 2

use crate::models::{Pairing, PendingPairing, Round, Team};
use std::collections::BTreeMap;

/// Round-robin generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobin;

impl RoundRobin {
    /// Generates all rounds for one group.
    ///
    /// Team order defines the rotation. Returns no rounds for fewer
    /// than two teams.
    pub fn rounds(team_ids: &[&str], group: Option<&str>) -> Vec<Round> {
        if team_ids.len() < 2 {
            return Vec::new();
        }

        let mut positions: Vec<Option<&str>> = team_ids.iter().map(|&id| Some(id)).collect();
        if positions.len() % 2 == 1 {
            positions.push(None); // bye sentinel
        }
        let n = positions.len();

        (0..n - 1)
            .map(|index| {
                let mut pairings = Vec::with_capacity(n / 2);
                for i in 0..n / 2 {
                    let (a, b) = (positions[i], positions[n - 1 - i]);
                    // Alternate orientation per round for a rough initial balance.
                    let flip = if i == 0 { index % 2 == 1 } else { (index + i) % 2 == 1 };
                    let pairing = match (a, b) {
                        (Some(a), Some(b)) if flip => Pairing::real(b, a),
                        (Some(a), Some(b)) => Pairing::real(a, b),
                        (Some(t), None) | (None, Some(t)) => Pairing::bye(t),
                        // Only one sentinel is ever added.
                        (None, None) => continue,
                    };
                    pairings.push(pairing);
                }
                positions[1..].rotate_right(1);
                Round {
                    index,
                    group: group.map(str::to_string),
                    pairings,
                }
            })
            .collect()
    }

    /// Generates rounds for every group, keyed by group.
    ///
    /// Teams without a group form the implicit group `""` (reported as
    /// `group: None` on the rounds).
    pub fn group_rounds(teams: &[Team]) -> BTreeMap<String, Vec<Round>> {
        let mut members: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for team in teams {
            members.entry(team.group_key()).or_default().push(&team.id);
        }

        members
            .into_iter()
            .map(|(key, ids)| {
                let group = (!key.is_empty()).then_some(key);
                (key.to_string(), Self::rounds(&ids, group))
            })
            .collect()
    }

    /// Flattens group rounds into the placement order: round 0 of every
    /// group (in group order), then round 1, and so on. Byes are dropped
    /// by variant.
    pub fn pending(group_rounds: &BTreeMap<String, Vec<Round>>) -> Vec<PendingPairing> {
        let max_rounds = group_rounds.values().map(Vec::len).max().unwrap_or(0);
        let mut pending = Vec::new();

        for r in 0..max_rounds {
            for round in group_rounds.values().filter_map(|rounds| rounds.get(r)) {
                for matchup in round.matches() {
                    pending.push(PendingPairing {
                        matchup: matchup.clone(),
                        group: round.group.clone(),
                        round: round.index,
                    });
                }
            }
        }

        pending
    }
}
