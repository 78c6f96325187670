//! Pairing model.
//!
//! A pairing is either a real match between two teams or a bye for a
//! single team. The two cases are distinct variants so a bye can never
//! be mistaken for a placeable match.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Two teams meeting in a match. The first team is the home side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchUp {
    /// Home team ID.
    pub home: String,
    /// Away team ID.
    pub away: String,
}

impl MatchUp {
    /// Creates a match-up.
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
        }
    }

    /// Whether the given team plays in this match-up.
    pub fn involves(&self, team_id: &str) -> bool {
        self.home == team_id || self.away == team_id
    }

    /// Both team IDs, home first.
    pub fn teams(&self) -> [&str; 2] {
        [&self.home, &self.away]
    }

    /// The same match-up with home and away exchanged.
    pub fn reversed(&self) -> Self {
        Self {
            home: self.away.clone(),
            away: self.home.clone(),
        }
    }

    /// Order-independent key, used to check that each pair meets once.
    pub fn unordered_key(&self) -> (String, String) {
        if self.home <= self.away {
            (self.home.clone(), self.away.clone())
        } else {
            (self.away.clone(), self.home.clone())
        }
    }
}

impl fmt::Display for MatchUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.home, self.away)
    }
}

/// A round-robin pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pairing {
    /// A real match between two teams.
    Match(MatchUp),
    /// The team sits out this round.
    Bye(String),
}

impl Pairing {
    /// Creates a real pairing.
    pub fn real(home: impl Into<String>, away: impl Into<String>) -> Self {
        Pairing::Match(MatchUp::new(home, away))
    }

    /// Creates a bye pairing.
    pub fn bye(team: impl Into<String>) -> Self {
        Pairing::Bye(team.into())
    }

    /// The match-up if this is a real pairing.
    pub fn as_match(&self) -> Option<&MatchUp> {
        match self {
            Pairing::Match(m) => Some(m),
            Pairing::Bye(_) => None,
        }
    }

    /// Whether this is a bye.
    pub fn is_bye(&self) -> bool {
        matches!(self, Pairing::Bye(_))
    }

    /// Whether the given team appears in this pairing.
    pub fn involves(&self, team_id: &str) -> bool {
        match self {
            Pairing::Match(m) => m.involves(team_id),
            Pairing::Bye(t) => t == team_id,
        }
    }
}

impl fmt::Display for Pairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pairing::Match(m) => m.fmt(f),
            Pairing::Bye(t) => write!(f, "{t} (bye)"),
        }
    }
}

/// One round of a round-robin: every team of the group appears once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// Zero-based round index within the group.
    pub index: usize,
    /// Group the round belongs to.
    pub group: Option<String>,
    /// Pairings of the round, byes included.
    pub pairings: Vec<Pairing>,
}

impl Round {
    /// Real match-ups of the round, byes filtered out.
    pub fn matches(&self) -> impl Iterator<Item = &MatchUp> {
        self.pairings.iter().filter_map(Pairing::as_match)
    }

    /// Team with a bye this round, if any.
    pub fn bye(&self) -> Option<&str> {
        self.pairings.iter().find_map(|p| match p {
            Pairing::Bye(t) => Some(t.as_str()),
            Pairing::Match(_) => None,
        })
    }
}

/// A real pairing waiting to be placed, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPairing {
    /// The match-up to place.
    pub matchup: MatchUp,
    /// Source group.
    pub group: Option<String>,
    /// Source round index within the group.
    pub round: usize,
}
