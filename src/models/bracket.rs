//! Elimination bracket model.
//!
//! A bracket is a DAG of playoff nodes. Each node has two participant
//! slots whose source is either a concrete team or a structured
//! placeholder (group rank, cross-group rank, or another node's outcome).
//! A slot is bound to a concrete team exactly once; the binding never
//! reverts.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::{Phase, Team};
use crate::bracket::{ResolutionDelta, Side};
use crate::error::SchedulingError;
use crate::validation::validate_bracket;

/// Which side of a finished node a placeholder refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Winner,
    Loser,
}

/// An unresolved participant source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placeholder {
    /// Team finishing at `rank` (1-based) in `group`.
    GroupRank { group: String, rank: usize },
    /// The `position`-th best (1-based) among the teams finishing at
    /// `rank` in each of `groups` (e.g. best second-placed team).
    BestRanked {
        groups: Vec<String>,
        rank: usize,
        position: usize,
    },
    /// Winner or loser of another bracket node.
    MatchOutcome { node: String, outcome: Outcome },
}

impl Placeholder {
    /// Group-rank placeholder.
    pub fn group_rank(group: impl Into<String>, rank: usize) -> Self {
        Placeholder::GroupRank {
            group: group.into(),
            rank,
        }
    }

    /// Winner of a node.
    pub fn winner_of(node: impl Into<String>) -> Self {
        Placeholder::MatchOutcome {
            node: node.into(),
            outcome: Outcome::Winner,
        }
    }

    /// Loser of a node.
    pub fn loser_of(node: impl Into<String>) -> Self {
        Placeholder::MatchOutcome {
            node: node.into(),
            outcome: Outcome::Loser,
        }
    }

    /// Node this placeholder depends on, if any.
    pub fn depends_on(&self) -> Option<&str> {
        match self {
            Placeholder::MatchOutcome { node, .. } => Some(node),
            _ => None,
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::GroupRank { group, rank } if group.is_empty() => {
                write!(f, "#{rank}")
            }
            Placeholder::GroupRank { group, rank } => write!(f, "#{rank} {group}"),
            Placeholder::BestRanked {
                groups,
                rank,
                position,
            } => write!(f, "best #{rank} ({}) #{position}", groups.join("/")),
            Placeholder::MatchOutcome { node, outcome } => match outcome {
                Outcome::Winner => write!(f, "winner {node}"),
                Outcome::Loser => write!(f, "loser {node}"),
            },
        }
    }
}

/// A participant reference: a concrete team or a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantRef {
    Team(String),
    Placeholder(Placeholder),
}

impl ParticipantRef {
    /// Concrete team reference.
    pub fn team(id: impl Into<String>) -> Self {
        ParticipantRef::Team(id.into())
    }

    /// Team ID if concrete.
    pub fn team_id(&self) -> Option<&str> {
        match self {
            ParticipantRef::Team(id) => Some(id),
            ParticipantRef::Placeholder(_) => None,
        }
    }

    /// Whether this reference names a concrete team.
    pub fn is_resolved(&self) -> bool {
        matches!(self, ParticipantRef::Team(_))
    }
}

impl From<Placeholder> for ParticipantRef {
    fn from(p: Placeholder) -> Self {
        ParticipantRef::Placeholder(p)
    }
}

impl fmt::Display for ParticipantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantRef::Team(id) => f.write_str(id),
            ParticipantRef::Placeholder(p) => p.fmt(f),
        }
    }
}

/// One participant slot of a bracket node.
///
/// `source` is fixed at definition time; `team` is bound once by the
/// resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSlot {
    /// Where the participant comes from.
    pub source: ParticipantRef,
    /// Bound team, once resolved.
    pub team: Option<String>,
}

impl ParticipantSlot {
    /// Creates a slot from a source reference. Concrete sources start resolved.
    pub fn new(source: impl Into<ParticipantRef>) -> Self {
        let source = source.into();
        let team = source.team_id().map(str::to_string);
        Self { source, team }
    }

    /// Current reference: the bound team, or the unresolved source.
    pub fn current(&self) -> ParticipantRef {
        match &self.team {
            Some(id) => ParticipantRef::Team(id.clone()),
            None => self.source.clone(),
        }
    }

    /// Pending placeholder, if unresolved.
    pub fn pending(&self) -> Option<&Placeholder> {
        match (&self.team, &self.source) {
            (None, ParticipantRef::Placeholder(p)) => Some(p),
            _ => None,
        }
    }

    /// Whether a team is bound.
    pub fn is_resolved(&self) -> bool {
        self.team.is_some()
    }
}

/// A playoff match definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketNode {
    /// Unique node ID (also the playoff match ID).
    pub id: String,
    /// Playoff phase.
    pub phase: Phase,
    /// Home participant.
    pub home: ParticipantSlot,
    /// Away participant.
    pub away: ParticipantSlot,
}

impl BracketNode {
    /// Creates a node.
    pub fn new(
        id: impl Into<String>,
        phase: Phase,
        home: impl Into<ParticipantRef>,
        away: impl Into<ParticipantRef>,
    ) -> Self {
        Self {
            id: id.into(),
            phase,
            home: ParticipantSlot::new(home),
            away: ParticipantSlot::new(away),
        }
    }

    /// Participant slot by side.
    pub fn slot(&self, side: Side) -> &ParticipantSlot {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub(crate) fn slot_mut(&mut self, side: Side) -> &mut ParticipantSlot {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }

    /// Nodes this node depends on.
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        [&self.home, &self.away]
            .into_iter()
            .filter_map(|s| match &s.source {
                ParticipantRef::Placeholder(p) => p.depends_on(),
                ParticipantRef::Team(_) => None,
            })
    }

    /// Both participants bound.
    pub fn is_ready(&self) -> bool {
        self.home.is_resolved() && self.away.is_resolved()
    }
}

/// Team counts per group, used to check group-rank placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLayout {
    /// Group key → number of teams. The implicit group has the empty key.
    pub groups: BTreeMap<String, usize>,
}

impl GroupLayout {
    /// Derives the layout from team group membership.
    pub fn from_teams(teams: &[Team]) -> Self {
        let mut groups = BTreeMap::new();
        for team in teams {
            *groups.entry(team.group_key().to_string()).or_insert(0) += 1;
        }
        Self { groups }
    }

    /// Adds a group.
    pub fn with_group(mut self, group: impl Into<String>, size: usize) -> Self {
        self.groups.insert(group.into(), size);
        self
    }

    /// Team count of a group.
    pub fn size_of(&self, group: &str) -> Option<usize> {
        self.groups.get(group).copied()
    }

    /// Group keys in order.
    pub fn group_ids(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Total number of teams.
    pub fn team_count(&self) -> usize {
        self.groups.values().sum()
    }
}

/// An elimination bracket.
///
/// `version` counts applied resolution deltas; it lets callers detect a
/// delta computed against an outdated snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    /// Nodes in definition order.
    pub nodes: Vec<BracketNode>,
    /// Snapshot version.
    pub version: u64,
}

impl Bracket {
    /// Creates a bracket from hand-written nodes after validating every
    /// placeholder against the group layout.
    pub fn from_nodes(
        nodes: Vec<BracketNode>,
        layout: &GroupLayout,
    ) -> Result<Self, SchedulingError> {
        validate_bracket(&nodes, layout).map_err(SchedulingError::InvalidPlaceholder)?;
        Ok(Self { nodes, version: 0 })
    }

    /// Finds a node by ID.
    pub fn node(&self, id: &str) -> Option<&BracketNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the bracket has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// IDs of nodes with a slot fed by `id`'s outcome.
    pub fn dependents(&self, id: &str) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.dependencies().any(|d| d == id))
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Dependency depth per node: 0 for nodes fed only by groups or teams,
    /// otherwise one more than the deepest dependency.
    pub fn levels(&self) -> HashMap<&str, usize> {
        let mut levels: HashMap<&str, usize> = HashMap::new();
        // Validated brackets are acyclic, so len() passes reach the fixed point.
        for _ in 0..=self.nodes.len() {
            let mut changed = false;
            for node in &self.nodes {
                let level = node
                    .dependencies()
                    .map(|d| levels.get(d).map_or(1, |l| l + 1))
                    .max()
                    .unwrap_or(0);
                if levels.get(node.id.as_str()) != Some(&level) {
                    levels.insert(&node.id, level);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        levels
    }

    /// Number of unresolved participant slots.
    pub fn unresolved_count(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(|n| [&n.home, &n.away])
            .filter(|s| !s.is_resolved())
            .count()
    }

    /// Applies a resolution delta, returning the advanced snapshot.
    ///
    /// Fails with `StaleResolution` if the delta was computed against a
    /// different version. An empty delta leaves the version unchanged.
    /// Already-bound slots are never overwritten.
    pub fn apply(&self, delta: &ResolutionDelta) -> Result<Bracket, SchedulingError> {
        if delta.base_version != self.version {
            return Err(SchedulingError::StaleResolution {
                expected: delta.base_version,
                found: self.version,
            });
        }
        if delta.is_empty() {
            return Ok(self.clone());
        }

        let mut next = self.clone();
        for resolution in &delta.resolutions {
            if let Some(node) = next.nodes.iter_mut().find(|n| n.id == resolution.node) {
                let slot = node.slot_mut(resolution.side);
                if slot.team.is_none() {
                    slot.team = Some(resolution.team.clone());
                }
            }
        }
        next.version += 1;
        Ok(next)
    }
}
