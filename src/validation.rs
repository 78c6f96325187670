//! Input validation for tournament scheduling.
//!
//! Checks structural integrity before any scheduling or bracket work.
//! Configuration checks detect:
//! - Fewer than two teams, duplicate team IDs, groups with a single team
//! - Zero fields, zero periods or period length
//! - Organizer referee mode with an empty roster
//! - A zero iteration bound
//!
//! Bracket checks detect:
//! - Duplicate node IDs
//! - Placeholders naming unknown groups, ranks beyond a group's size,
//!   or unknown nodes
//! - Circular outcome dependencies (DAG validation)
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use crate::models::{BracketNode, GroupLayout, ParticipantRef, Placeholder, RefereeMode, TournamentConfig};
use std::collections::{HashMap, HashSet};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Fewer than two teams.
    TooFewTeams,
    /// Two entities share the same ID.
    DuplicateId,
    /// A group has fewer than two teams.
    GroupTooSmall,
    /// Field count is zero.
    NoFields,
    /// A duration component is zero.
    NonPositiveDuration,
    /// Organizer referee mode without referees.
    EmptyRefereeRoster,
    /// Iteration bound is zero.
    InvalidIterationBound,
    /// A placeholder names a group that doesn't exist.
    UnknownGroup,
    /// A placeholder names a rank the group cannot produce.
    RankOutOfRange,
    /// A placeholder names a node that doesn't exist.
    UnknownNode,
    /// Outcome dependencies contain a cycle.
    CyclicDependency,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a tournament configuration.
///
/// Checks:
/// 1. At least two teams, no duplicate team IDs
/// 2. Every group has at least two teams
/// 3. At least one field
/// 4. Non-zero periods and period length
/// 5. Organizer mode has at least one referee
/// 6. Non-zero iteration bound
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_config(config: &TournamentConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.teams.len() < 2 {
        errors.push(ValidationError::new(
            ValidationErrorKind::TooFewTeams,
            format!("At least 2 teams required, got {}", config.teams.len()),
        ));
    }

    let mut team_ids = HashSet::new();
    for team in &config.teams {
        if !team_ids.insert(team.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate team ID: {}", team.id),
            ));
        }
    }

    if config.teams.len() >= 2 {
        let layout = GroupLayout::from_teams(&config.teams);
        for (group, &size) in &layout.groups {
            if size < 2 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::GroupTooSmall,
                    format!("Group '{group}' has {size} team(s), at least 2 required"),
                ));
            }
        }
    }

    if config.fields == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoFields,
            "At least 1 field required",
        ));
    }

    if config.timing.periods == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonPositiveDuration,
            "Match must have at least 1 period",
        ));
    }
    if config.timing.period_minutes == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonPositiveDuration,
            "Period length must be positive",
        ));
    }

    if let RefereeMode::Organizer { referees } = &config.referees {
        if referees.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyRefereeRoster,
                "Organizer referee mode requires at least 1 referee",
            ));
        }
    }

    if config.assigner.max_iterations == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidIterationBound,
            "Iteration bound must be positive",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates bracket nodes against a group layout.
///
/// Checks:
/// 1. No duplicate node IDs
/// 2. Group-rank placeholders name existing groups and ranks within size
/// 3. Cross-group placeholders name existing groups and a position within
///    the number of groups
/// 4. Outcome placeholders name existing nodes
/// 5. No circular outcome dependencies
pub fn validate_bracket(nodes: &[BracketNode], layout: &GroupLayout) -> ValidationResult {
    let mut errors = Vec::new();

    let mut node_ids = HashSet::new();
    for node in nodes {
        if !node_ids.insert(node.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate bracket node ID: {}", node.id),
            ));
        }
    }

    for node in nodes {
        for slot in [&node.home, &node.away] {
            if let ParticipantRef::Placeholder(p) = &slot.source {
                check_placeholder(&node.id, p, layout, &node_ids, &mut errors);
            }
        }
    }

    if let Some(cycle_err) = detect_cycles(nodes) {
        errors.push(cycle_err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_placeholder(
    node_id: &str,
    placeholder: &Placeholder,
    layout: &GroupLayout,
    node_ids: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    match placeholder {
        Placeholder::GroupRank { group, rank } => match layout.size_of(group) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownGroup,
                format!("Node '{node_id}' references unknown group '{group}'"),
            )),
            Some(size) if *rank == 0 || *rank > size => errors.push(ValidationError::new(
                ValidationErrorKind::RankOutOfRange,
                format!("Node '{node_id}' references rank {rank} of group '{group}' with {size} team(s)"),
            )),
            Some(_) => {}
        },
        Placeholder::BestRanked {
            groups,
            rank,
            position,
        } => {
            for group in groups {
                match layout.size_of(group) {
                    None => errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownGroup,
                        format!("Node '{node_id}' references unknown group '{group}'"),
                    )),
                    Some(size) if *rank == 0 || *rank > size => {
                        errors.push(ValidationError::new(
                            ValidationErrorKind::RankOutOfRange,
                            format!("Node '{node_id}' references rank {rank} of group '{group}' with {size} team(s)"),
                        ))
                    }
                    Some(_) => {}
                }
            }
            if *position == 0 || *position > groups.len() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::RankOutOfRange,
                    format!(
                        "Node '{node_id}' references position {position} among {} group(s)",
                        groups.len()
                    ),
                ));
            }
        }
        Placeholder::MatchOutcome { node, .. } => {
            if !node_ids.contains(node.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownNode,
                    format!("Node '{node_id}' references unknown node '{node}'"),
                ));
            }
        }
    }
}

/// Detects cycles in the outcome dependency graph using DFS.
///
/// # Algorithm
/// Topological sort via DFS. If a back-edge is found (visiting a node
/// currently in the recursion stack), a cycle exists.
///
/// # Reference
/// Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4
fn detect_cycles(nodes: &[BracketNode]) -> Option<ValidationError> {
    // Build adjacency list: node_id → dependents
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for node in nodes {
        for dep in node.dependencies() {
            adj.entry(dep).or_default().push(node.id.as_str());
        }
    }

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for node in nodes {
        let id = node.id.as_str();
        if !visited.contains(id) && has_cycle_dfs(id, &adj, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("Circular dependency detected involving node '{id}'"),
            ));
        }
    }

    None
}

fn has_cycle_dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    in_stack: &mut HashSet<&'a str>,
) -> bool {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(neighbors) = adj.get(node) {
        for &next in neighbors {
            if in_stack.contains(next) {
                return true; // Back edge → cycle
            }
            if !visited.contains(next) && has_cycle_dfs(next, adj, visited, in_stack) {
                return true;
            }
        }
    }

    in_stack.remove(node);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchTiming, Phase, Team};
    use chrono::NaiveDate;

    fn sample_config() -> TournamentConfig {
        let start = NaiveDate::from_ymd_opt(2024, 1, 20)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap();
        TournamentConfig::new(
            vec![
                Team::new("T1").in_group("A"),
                Team::new("T2").in_group("A"),
                Team::new("T3").in_group("B"),
                Team::new("T4").in_group("B"),
            ],
            2,
            MatchTiming::new(start, 10),
        )
    }

    fn sample_layout() -> GroupLayout {
        GroupLayout::default().with_group("A", 2).with_group("B", 2)
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&sample_config()).is_ok());
    }

    #[test]
    fn test_too_few_teams() {
        let mut config = sample_config();
        config.teams.truncate(1);
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::TooFewTeams));
    }

    #[test]
    fn test_duplicate_team_id() {
        let mut config = sample_config();
        config.teams.push(Team::new("T1").in_group("B"));
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_group_too_small() {
        let mut config = sample_config();
        config.teams.push(Team::new("T5").in_group("C"));
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::GroupTooSmall && e.message.contains("'C'")));
    }

    #[test]
    fn test_zero_fields_and_durations() {
        let mut config = sample_config();
        config.fields = 0;
        config.timing.period_minutes = 0;
        config.timing.periods = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::NoFields));
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::NonPositiveDuration)
                .count(),
            2
        );
    }

    #[test]
    fn test_empty_referee_roster() {
        let config = sample_config().with_referees(RefereeMode::Organizer {
            referees: Vec::new(),
        });
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::EmptyRefereeRoster));
    }

    #[test]
    fn test_valid_bracket() {
        let nodes = vec![
            BracketNode::new(
                "sf-1",
                Phase::Semifinal,
                Placeholder::group_rank("A", 1),
                Placeholder::group_rank("B", 2),
            ),
            BracketNode::new(
                "sf-2",
                Phase::Semifinal,
                Placeholder::group_rank("B", 1),
                Placeholder::group_rank("A", 2),
            ),
            BracketNode::new(
                "final",
                Phase::Final,
                Placeholder::winner_of("sf-1"),
                Placeholder::winner_of("sf-2"),
            ),
        ];
        assert!(validate_bracket(&nodes, &sample_layout()).is_ok());
    }

    #[test]
    fn test_unknown_group_and_rank() {
        let nodes = vec![BracketNode::new(
            "final",
            Phase::Final,
            Placeholder::group_rank("Z", 1),
            Placeholder::group_rank("A", 3),
        )];
        let errors = validate_bracket(&nodes, &sample_layout()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownGroup));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::RankOutOfRange));
    }

    #[test]
    fn test_best_ranked_position_out_of_range() {
        let nodes = vec![BracketNode::new(
            "final",
            Phase::Final,
            Placeholder::group_rank("A", 1),
            Placeholder::BestRanked {
                groups: vec!["A".into(), "B".into()],
                rank: 2,
                position: 3,
            },
        )];
        let errors = validate_bracket(&nodes, &sample_layout()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::RankOutOfRange));
    }

    #[test]
    fn test_unknown_node() {
        let nodes = vec![BracketNode::new(
            "final",
            Phase::Final,
            Placeholder::winner_of("sf-1"),
            Placeholder::winner_of("sf-2"),
        )];
        let errors = validate_bracket(&nodes, &sample_layout()).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::UnknownNode)
                .count(),
            2
        );
    }

    #[test]
    fn test_cyclic_dependency() {
        // x ← y ← x
        let nodes = vec![
            BracketNode::new(
                "x",
                Phase::Semifinal,
                Placeholder::winner_of("y"),
                Placeholder::group_rank("A", 1),
            ),
            BracketNode::new(
                "y",
                Phase::Final,
                Placeholder::winner_of("x"),
                Placeholder::group_rank("B", 1),
            ),
        ];
        let errors = validate_bracket(&nodes, &sample_layout()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::CyclicDependency));
    }

    #[test]
    fn test_duplicate_node_id() {
        let node = BracketNode::new(
            "final",
            Phase::Final,
            Placeholder::group_rank("A", 1),
            Placeholder::group_rank("B", 1),
        );
        let errors = validate_bracket(&[node.clone(), node], &sample_layout()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }
}
