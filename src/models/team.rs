//! Team model.
//!
//! A team is the unit that plays matches. Teams are immutable once
//! scheduling begins: the scheduler only reads their identifiers and
//! group membership.

use serde::{Deserialize, Serialize};

/// A participating team.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team {
    /// Unique team identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Group membership. `None` = the single implicit group.
    pub group: Option<String>,
}

impl Team {
    /// Creates a team with the given ID and no group.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            group: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Assigns the team to a group.
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Group key used for grouping. Ungrouped teams share the empty key.
    pub fn group_key(&self) -> &str {
        self.group.as_deref().unwrap_or("")
    }
}

/// One row of a standings table.
///
/// The scheduler only produces the initial all-zero table; results are
/// accumulated by an external standings calculator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    /// Team identifier.
    pub team_id: String,
    /// Group the row belongs to.
    pub group: Option<String>,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
}

impl StandingsRow {
    /// Creates an empty row for a team.
    pub fn empty(team: &Team) -> Self {
        Self {
            team_id: team.id.clone(),
            group: team.group.clone(),
            ..Default::default()
        }
    }

    /// Goal difference.
    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_builder() {
        let team = Team::new("T1").with_name("Falcons").in_group("A");
        assert_eq!(team.id, "T1");
        assert_eq!(team.name, "Falcons");
        assert_eq!(team.group.as_deref(), Some("A"));
        assert_eq!(team.group_key(), "A");
    }

    #[test]
    fn test_team_defaults_name_to_id() {
        let team = Team::new("T9");
        assert_eq!(team.name, "T9");
        assert_eq!(team.group_key(), "");
    }

    #[test]
    fn test_empty_standings_row() {
        let row = StandingsRow::empty(&Team::new("T1").in_group("B"));
        assert_eq!(row.team_id, "T1");
        assert_eq!(row.group.as_deref(), Some("B"));
        assert_eq!(row.played, 0);
        assert_eq!(row.points, 0);
        assert_eq!(row.goal_difference(), 0);
    }
}
