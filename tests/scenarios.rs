//! End-to-end scheduling and bracket scenarios.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;

use u_tournament::bracket::{BracketBuilder, BracketResolver, ResolutionInput, Side};
use u_tournament::error::{SchedulingError, UnmetConstraint};
use u_tournament::models::{
    AssignerConfig, Bracket, BracketNode, FinalsConfig, FinalsPreset, GroupLayout, MatchTiming,
    Phase, Placeholder, RefereeMode, RestPolicy, Team, TournamentConfig,
};
use u_tournament::pairing::RoundRobin;
use u_tournament::scheduler::{ScheduleKpi, SlotAssigner, TournamentScheduler};

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 20)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap()
}

fn plain_teams(n: usize) -> Vec<Team> {
    (1..=n).map(|i| Team::new(format!("T{i}"))).collect()
}

#[test]
fn five_teams_one_field() {
    let teams = plain_teams(5);
    let rounds = RoundRobin::group_rounds(&teams);
    let rounds = &rounds[""];
    assert_eq!(rounds.len(), 5);
    assert!(rounds.iter().all(|r| r.bye().is_some()));

    let pending = RoundRobin::pending(&RoundRobin::group_rounds(&teams));
    assert_eq!(pending.len(), 10);

    let outcome = SlotAssigner::new(1, AssignerConfig::default().with_min_rest(1))
        .assign(&pending)
        .unwrap();
    assert_eq!(outcome.placements.len(), 10);
    assert!(outcome.is_complete());

    let cells: HashSet<(usize, usize)> = outcome.placements.iter().map(|p| (p.slot, p.field)).collect();
    assert_eq!(cells.len(), 10);
}

#[test]
fn three_teams_rest_too_long_is_unschedulable() {
    let pending = RoundRobin::pending(&RoundRobin::group_rounds(&plain_teams(3)));
    let config = AssignerConfig::default()
        .with_min_rest(5)
        .with_rest_policy(RestPolicy::Strict)
        .with_max_slots(3);

    let err = SlotAssigner::new(1, config).assign(&pending).unwrap_err();
    match err {
        SchedulingError::Unschedulable {
            constraint, placed, ..
        } => {
            assert!(matches!(
                constraint,
                UnmetConstraint::MinimumRest { min_rest_slots: 5 } | UnmetConstraint::SlotCapacity { .. }
            ));
            assert!(placed < 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn three_teams_relaxed_rest_records_violations() {
    let pending = RoundRobin::pending(&RoundRobin::group_rounds(&plain_teams(3)));
    let config = AssignerConfig::default().with_min_rest(5).with_max_slots(3);

    let outcome = SlotAssigner::new(1, config).assign(&pending).unwrap();
    assert_eq!(outcome.placements.len(), 3);
    assert!(!outcome.violations.is_empty());
}

#[test]
fn group_winners_resolve_in_one_call() {
    let layout = GroupLayout::default().with_group("A", 3).with_group("B", 3);
    let bracket = Bracket::from_nodes(
        vec![
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
        ],
        &layout,
    )
    .unwrap();

    let before = BracketResolver::resolve_ready(&bracket, &ResolutionInput::new()).unwrap();
    assert!(before.is_empty());

    let input = ResolutionInput::new()
        .with_group("A", ["A1", "A2", "A3"])
        .with_group("B", ["B1", "B2", "B3"]);
    let (next, delta) = BracketResolver::advance(&bracket, &input).unwrap();
    assert_eq!(delta.binding("sf-1", Side::Home), Some("A1"));
    assert_eq!(delta.binding("sf-2", Side::Home), Some("B1"));
    assert!(next.node("sf-1").unwrap().is_ready());
    assert!(next.node("sf-2").unwrap().is_ready());
}

#[test]
fn full_tournament_lifecycle() {
    let teams: Vec<Team> = ["A", "B"]
        .iter()
        .flat_map(|g| (1..=4).map(move |i| Team::new(format!("{g}{i}")).in_group(*g)))
        .collect();
    let config = TournamentConfig::new(
        teams,
        2,
        MatchTiming::new(start(), 10).with_periods(2, 5, 2).with_playoff_break(20),
    )
    .with_referees(RefereeMode::Organizer {
        referees: vec!["Ann".into(), "Bob".into(), "Cid".into()],
    })
    .with_finals(FinalsConfig::new(FinalsPreset::Semifinals).with_third_place());

    let mut schedule = TournamentScheduler::new(config).generate().unwrap();
    assert!(schedule.is_valid(), "{:?}", schedule.violations);

    let kpi = ScheduleKpi::calculate(&schedule, 1);
    assert!(kpi.max_home_away_imbalance <= 1);
    assert!(kpi.referee_spread <= 1);
    assert_eq!(kpi.unresolved_playoffs, 4);

    // Group stage done, semifinals known.
    let bracket = schedule.bracket.clone().unwrap();
    let standings = ResolutionInput::new()
        .with_group("A", ["A3", "A1", "A2", "A4"])
        .with_group("B", ["B2", "B4", "B1", "B3"]);
    let (bracket, _) = BracketResolver::advance(&bracket, &standings).unwrap();
    schedule.refresh_playoffs(&bracket);
    assert_eq!(
        schedule.match_by_id("sf-1").unwrap().home.team_id(),
        Some("A3")
    );

    // Semifinals played.
    let results = standings
        .with_result("sf-1", "B4", "A3")
        .with_result("sf-2", "B2", "A1");
    let (bracket, delta) = BracketResolver::advance(&bracket, &results).unwrap();
    assert_eq!(delta.len(), 4);
    schedule.refresh_playoffs(&bracket);

    let fin = schedule.match_by_id("final").unwrap();
    assert_eq!(fin.home.team_id(), Some("B4"));
    assert_eq!(fin.away.team_id(), Some("B2"));
    let third = schedule.match_by_id("third-place").unwrap();
    assert_eq!(third.home.team_id(), Some("A3"));
    assert_eq!(third.away.team_id(), Some("A1"));
    assert_eq!(schedule.bracket.as_ref().map(|b| b.version), Some(2));

    // Re-running with the same input changes nothing.
    let again = BracketResolver::resolve_ready(&bracket, &results).unwrap();
    assert!(again.is_empty());
}

#[test]
fn builder_rejects_unknown_group_in_custom_bracket() {
    let layout = GroupLayout::default().with_group("A", 4);
    let err = Bracket::from_nodes(
        vec![BracketNode::new(
            "final",
            Phase::Final,
            Placeholder::group_rank("A", 1),
            Placeholder::group_rank("Z", 1),
        )],
        &layout,
    )
    .unwrap_err();
    assert!(matches!(err, SchedulingError::InvalidPlaceholder(_)));

    let built = BracketBuilder::build(&FinalsConfig::new(FinalsPreset::FinalOnly), &layout).unwrap();
    assert_eq!(built.len(), 1);
}
