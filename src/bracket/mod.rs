//! Playoff brackets.
//!
//! Two halves:
//!
//! - **Builder** ([`BracketBuilder`]): turns a finals preset into bracket
//!   nodes whose participants are placeholders.
//! - **Resolver** ([`BracketResolver`]): binds placeholders to concrete
//!   teams as group rankings and playoff results become available.
//!
//! Resolution never mutates a bracket in place. The resolver returns a
//! [`ResolutionDelta`] tagged with the snapshot version it was computed
//! against; [`Bracket::apply`](crate::models::Bracket::apply) produces
//! the next snapshot.

mod builder;
mod resolver;

pub use builder::{seeding_order, BracketBuilder};
pub use resolver::{BracketResolver, CombinedRanking, GroupStanding, MatchResult, ResolutionInput};

use serde::{Deserialize, Serialize};

use crate::models::Placeholder;

/// Participant side of a bracket node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

/// One slot binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Node whose slot is bound.
    pub node: String,
    /// Which slot.
    pub side: Side,
    /// Bound team.
    pub team: String,
    /// Placeholder that was resolved.
    pub source: Placeholder,
}

/// Slot bindings computed against one bracket version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionDelta {
    /// Version of the snapshot the delta was computed against.
    pub base_version: u64,
    /// New bindings, in the order they were derived.
    pub resolutions: Vec<Resolution>,
}

impl ResolutionDelta {
    /// A delta with no bindings.
    pub fn empty(base_version: u64) -> Self {
        Self {
            base_version,
            resolutions: Vec::new(),
        }
    }

    /// Whether nothing new was resolved.
    pub fn is_empty(&self) -> bool {
        self.resolutions.is_empty()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.resolutions.len()
    }

    /// Binding for a node slot, if present.
    pub fn binding(&self, node: &str, side: Side) -> Option<&str> {
        self.resolutions
            .iter()
            .find(|r| r.node == node && r.side == side)
            .map(|r| r.team.as_str())
    }
}
