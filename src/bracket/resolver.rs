//! Bracket resolver.
//!
//! # State machine
//!
//! Each participant slot moves `Unresolved(placeholder) → Resolved(team)`
//! exactly once:
//!
//! | Placeholder | Resolves when |
//! |-------------|---------------|
//! | `GroupRank(g, r)` | group `g` is complete |
//! | `BestRanked(gs, r, p)` | every group in `gs` is complete and a combined ranking for `(gs, r)` is known |
//! | `MatchOutcome(n, o)` | node `n` has both participants bound and a recorded result |
//!
//! `resolve_ready` repeats the scan on a working copy until no slot can
//! bind, so a single call cascades through every level that has become
//! decidable. Calling it again on the advanced bracket with the same input
//! yields an empty delta.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::{Resolution, ResolutionDelta, Side};
use crate::error::SchedulingError;
use crate::models::{Bracket, BracketNode, Outcome, ParticipantRef, Placeholder};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Final (or interim) order of one group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStanding {
    /// Whether every group match has a result.
    pub complete: bool,
    /// Team IDs, best first.
    pub ranking: Vec<String>,
}

/// Order of the teams finishing at `rank` across several groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedRanking {
    /// Groups compared.
    pub groups: Vec<String>,
    /// Group rank compared.
    pub rank: usize,
    /// Team IDs, best first.
    pub ranking: Vec<String>,
}

impl CombinedRanking {
    fn covers(&self, groups: &[String], rank: usize) -> bool {
        if self.rank != rank || self.groups.len() != groups.len() {
            return false;
        }
        let mut a: Vec<&String> = self.groups.iter().collect();
        let mut b: Vec<&String> = groups.iter().collect();
        a.sort();
        b.sort();
        a == b
    }
}

/// Result of a finished bracket match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: String,
    pub loser: String,
}

/// Everything the resolver reads: group standings, cross-group rankings,
/// and playoff results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionInput {
    /// Group key → standing.
    pub groups: HashMap<String, GroupStanding>,
    /// Cross-group rankings for best-ranked placeholders.
    pub combined: Vec<CombinedRanking>,
    /// Node ID → result.
    pub results: HashMap<String, MatchResult>,
}

impl ResolutionInput {
    /// Creates an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the final ranking of a completed group.
    pub fn with_group<S: Into<String>>(
        mut self,
        group: impl Into<String>,
        ranking: impl IntoIterator<Item = S>,
    ) -> Self {
        self.groups.insert(
            group.into(),
            GroupStanding {
                complete: true,
                ranking: ranking.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Records an interim ranking of a group still in play.
    pub fn with_interim_group<S: Into<String>>(
        mut self,
        group: impl Into<String>,
        ranking: impl IntoIterator<Item = S>,
    ) -> Self {
        self.groups.insert(
            group.into(),
            GroupStanding {
                complete: false,
                ranking: ranking.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Records a cross-group ranking.
    pub fn with_combined<G: Into<String>, S: Into<String>>(
        mut self,
        groups: impl IntoIterator<Item = G>,
        rank: usize,
        ranking: impl IntoIterator<Item = S>,
    ) -> Self {
        self.combined.push(CombinedRanking {
            groups: groups.into_iter().map(Into::into).collect(),
            rank,
            ranking: ranking.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Records a playoff result.
    pub fn with_result(
        mut self,
        node: impl Into<String>,
        winner: impl Into<String>,
        loser: impl Into<String>,
    ) -> Self {
        self.results.insert(
            node.into(),
            MatchResult {
                winner: winner.into(),
                loser: loser.into(),
            },
        );
        self
    }

    fn completed_group(&self, group: &str) -> Option<&GroupStanding> {
        self.groups.get(group).filter(|g| g.complete)
    }
}

/// Binds placeholders to teams.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketResolver;

impl BracketResolver {
    /// Computes every binding that the input makes decidable.
    ///
    /// The returned delta is tagged with `bracket.version`; the bracket
    /// itself is not modified.
    ///
    /// # Errors
    /// - `InconsistentResult` if a result names teams other than the
    ///   node's bound participants, or a node that does not exist
    /// - `InvalidPlaceholder` if a complete ranking is too short for a
    ///   referenced rank
    pub fn resolve_ready(
        bracket: &Bracket,
        input: &ResolutionInput,
    ) -> Result<ResolutionDelta, SchedulingError> {
        Self::check_bound_slots(bracket, input)?;

        let mut working = bracket.clone();
        let mut resolutions = Vec::new();
        let mut passes = 0usize;

        loop {
            passes += 1;
            let mut bound = Vec::new();
            for node in &working.nodes {
                for side in [Side::Home, Side::Away] {
                    let Some(placeholder) = node.slot(side).pending() else {
                        continue;
                    };
                    if let Some(team) = Self::resolve(placeholder, input, &working)? {
                        debug!(node = %node.id, ?side, %placeholder, %team, "slot resolved");
                        bound.push(Resolution {
                            node: node.id.clone(),
                            side,
                            team,
                            source: placeholder.clone(),
                        });
                    }
                }
            }

            if bound.is_empty() {
                break;
            }
            for r in &bound {
                if let Some(node) = working.nodes.iter_mut().find(|n| n.id == r.node) {
                    node.slot_mut(r.side).team = Some(r.team.clone());
                }
            }
            resolutions.extend(bound);
        }

        Self::check_results(&working, input)?;

        info!(
            version = bracket.version,
            resolved = resolutions.len(),
            passes,
            "bracket resolution pass"
        );
        Ok(ResolutionDelta {
            base_version: bracket.version,
            resolutions,
        })
    }

    /// Resolves and applies in one step, returning the next snapshot and
    /// the delta that produced it.
    pub fn advance(
        bracket: &Bracket,
        input: &ResolutionInput,
    ) -> Result<(Bracket, ResolutionDelta), SchedulingError> {
        let delta = Self::resolve_ready(bracket, input)?;
        let next = bracket.apply(&delta)?;
        Ok((next, delta))
    }

    fn resolve(
        placeholder: &Placeholder,
        input: &ResolutionInput,
        bracket: &Bracket,
    ) -> Result<Option<String>, SchedulingError> {
        match placeholder {
            Placeholder::GroupRank { group, rank } => match input.completed_group(group) {
                Some(standing) => pick(&standing.ranking, *rank, placeholder).map(Some),
                None => Ok(None),
            },
            Placeholder::BestRanked {
                groups,
                rank,
                position,
            } => {
                if !groups.iter().all(|g| input.completed_group(g).is_some()) {
                    return Ok(None);
                }
                match input.combined.iter().find(|c| c.covers(groups, *rank)) {
                    Some(combined) => pick(&combined.ranking, *position, placeholder).map(Some),
                    None => Ok(None),
                }
            }
            Placeholder::MatchOutcome { node, outcome } => {
                let (Some(target), Some(result)) = (bracket.node(node), input.results.get(node))
                else {
                    return Ok(None);
                };
                if !target.is_ready() {
                    return Ok(None);
                }
                check_result(target, result)?;
                Ok(Some(match outcome {
                    Outcome::Winner => result.winner.clone(),
                    Outcome::Loser => result.loser.clone(),
                }))
            }
        }
    }

    /// Bound slots never change; a disagreeing input is logged and ignored.
    fn check_bound_slots(bracket: &Bracket, input: &ResolutionInput) -> Result<(), SchedulingError> {
        for node in &bracket.nodes {
            for side in [Side::Home, Side::Away] {
                let slot = node.slot(side);
                let (Some(team), ParticipantRef::Placeholder(placeholder)) = (&slot.team, &slot.source)
                else {
                    continue;
                };
                if let Some(now) = Self::resolve(placeholder, input, bracket)? {
                    if &now != team {
                        warn!(
                            node = %node.id,
                            ?side,
                            bound = %team,
                            input = %now,
                            "input disagrees with bound participant, keeping binding"
                        );
                    }
                }
            }
        }
        Ok(())
    }

    fn check_results(bracket: &Bracket, input: &ResolutionInput) -> Result<(), SchedulingError> {
        let mut ids: Vec<&String> = input.results.keys().collect();
        ids.sort();
        for id in ids {
            let result = &input.results[id];
            match bracket.node(id) {
                None => {
                    return Err(SchedulingError::InconsistentResult {
                        node: id.clone(),
                        reason: "no such bracket node".into(),
                    })
                }
                Some(node) if node.is_ready() => check_result(node, result)?,
                Some(_) => {}
            }
        }
        Ok(())
    }
}

fn pick(ranking: &[String], position: usize, placeholder: &Placeholder) -> Result<String, SchedulingError> {
    position
        .checked_sub(1)
        .and_then(|i| ranking.get(i))
        .cloned()
        .ok_or_else(|| {
            SchedulingError::InvalidPlaceholder(vec![ValidationError::new(
                ValidationErrorKind::RankOutOfRange,
                format!("{placeholder} is beyond a ranking of {} team(s)", ranking.len()),
            )])
        })
}

fn check_result(node: &BracketNode, result: &MatchResult) -> Result<(), SchedulingError> {
    let home = node.home.team.as_deref();
    let away = node.away.team.as_deref();
    let (w, l) = (Some(result.winner.as_str()), Some(result.loser.as_str()));

    if (w, l) == (home, away) || (w, l) == (away, home) {
        Ok(())
    } else {
        Err(SchedulingError::InconsistentResult {
            node: node.id.clone(),
            reason: format!(
                "result {} beat {} does not match participants {} and {}",
                result.winner,
                result.loser,
                node.home.current(),
                node.away.current()
            ),
        })
    }
}
