//! End-to-end tournament scheduling.
//!
//! # Pipeline
//!
//! 1. Validate the configuration.
//! 2. Build the playoff bracket (fails early on an impossible finals layout).
//! 3. Generate round-robin rounds per group and interleave them.
//! 4. Place pairings into slots and fields.
//! 5. Balance home/away orientation.
//! 6. Assign and rebalance referees.
//! 7. Assemble the timed schedule with the bracket appended.
//!
//! Each stage is a pure function of the previous stage's output.

use tracing::info;

use super::{HomeAwayBalancer, RefereeAssigner, ScheduleAssembler, SlotAssigner};
use crate::bracket::BracketBuilder;
use crate::error::SchedulingError;
use crate::models::{GroupLayout, Schedule, TournamentConfig};
use crate::pairing::RoundRobin;
use crate::scoring::FairnessEngine;
use crate::validation::validate_config;

/// Runs the full scheduling pipeline for one tournament.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_tournament::models::{MatchTiming, Team, TournamentConfig};
/// use u_tournament::scheduler::TournamentScheduler;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 20)
///     .and_then(|d| d.and_hms_opt(9, 0, 0))
///     .unwrap();
/// let teams = (1..=4).map(|i| Team::new(format!("T{i}"))).collect();
/// let config = TournamentConfig::new(teams, 2, MatchTiming::new(start, 10));
///
/// let schedule = TournamentScheduler::new(config).generate().unwrap();
/// assert_eq!(schedule.match_count(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct TournamentScheduler {
    config: TournamentConfig,
    engine: FairnessEngine,
}

impl TournamentScheduler {
    /// Creates a scheduler with the standard fairness engine.
    pub fn new(config: TournamentConfig) -> Self {
        Self {
            config,
            engine: FairnessEngine::standard(),
        }
    }

    /// Replaces the fairness engine used for slot/field placement.
    pub fn with_engine(mut self, engine: FairnessEngine) -> Self {
        self.engine = engine;
        self
    }

    /// The configuration being scheduled.
    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    /// Generates the schedule.
    ///
    /// # Errors
    /// - `InvalidConfiguration` for rejected input
    /// - `InvalidPlaceholder` if the groups cannot feed the finals layout
    /// - `Unschedulable` if the assigner cannot place a pairing
    pub fn generate(&self) -> Result<Schedule, SchedulingError> {
        let config = &self.config;
        validate_config(config).map_err(SchedulingError::InvalidConfiguration)?;

        let layout = GroupLayout::from_teams(&config.teams);
        let bracket = BracketBuilder::build(&config.finals, &layout)?;

        let rounds = RoundRobin::group_rounds(&config.teams);
        let pending = RoundRobin::pending(&rounds);
        info!(
            teams = config.teams.len(),
            groups = rounds.len(),
            pairings = pending.len(),
            fields = config.fields,
            "scheduling tournament"
        );

        let outcome = SlotAssigner::new(config.fields, config.assigner.clone())
            .with_engine(self.engine.clone())
            .assign(&pending)?;
        let placements = HomeAwayBalancer::new().balance(&outcome.placements);

        let referees = RefereeAssigner::new(&config.referees, &config.teams);
        let assignment = referees.assign(&placements);
        let balanced = referees.balance_workloads(&placements, &assignment.referees);

        let playoffs = (!bracket.is_empty()).then_some(&bracket);
        let mut schedule = ScheduleAssembler::new(config.timing.clone(), config.fields)
            .assemble(&config.teams, &placements, &balanced, playoffs);
        schedule.violations.extend(outcome.violations);
        schedule.violations.extend(assignment.violations);

        info!(
            matches = schedule.match_count(),
            slots = schedule.slot_count(),
            violations = schedule.violations.len(),
            unplaced = outcome.unplaced.len(),
            "tournament scheduled"
        );
        Ok(schedule)
    }
}
