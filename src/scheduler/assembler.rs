//! Schedule assembler.
//!
//! Turns slot indices into wall-clock times, numbers the matches, tags
//! phases, and appends the playoff bracket after the group stage.
//!
//! # Timing
//!
//! ```text
//! match    = periods × period + (periods − 1) × period break
//! slot(s)  = start + s × (match + slot break)
//!            + playoff break            (playoff slots only)
//! ```
//!
//! Playoff nodes are laid out one dependency level at a time: a level
//! starts in a fresh slot, so a node is always later than every node it
//! depends on.

use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::info;

use crate::models::{
    Bracket, MatchTiming, ParticipantRef, Phase, Placement, RefereeId, Schedule, ScheduledMatch,
    StandingsRow, Team,
};

/// Builds the timed, phase-tagged schedule.
#[derive(Debug, Clone)]
pub struct ScheduleAssembler {
    timing: MatchTiming,
    fields: usize,
}

impl ScheduleAssembler {
    /// Creates an assembler.
    pub fn new(timing: MatchTiming, fields: usize) -> Self {
        Self { timing, fields }
    }

    /// Kick-off time of a slot.
    pub fn slot_start(&self, slot: usize, playoff: bool) -> NaiveDateTime {
        let offset = self.timing.slot_duration().num_minutes() * slot as i64;
        let pause = if playoff {
            i64::from(self.timing.playoff_break_minutes)
        } else {
            0
        };
        self.timing.start + Duration::minutes(offset + pause)
    }

    /// Assembles the schedule.
    ///
    /// `referees` is aligned with `placements`. Playoff matches start in
    /// the slot after the last group match and carry no referee until
    /// their participants are known.
    pub fn assemble(
        &self,
        teams: &[Team],
        placements: &[Placement],
        referees: &[Option<RefereeId>],
        bracket: Option<&Bracket>,
    ) -> Schedule {
        let match_duration = self.timing.match_duration();

        let mut group_order: Vec<usize> = (0..placements.len()).collect();
        group_order.sort_by_key(|&i| (placements[i].slot, placements[i].field));

        let mut matches: Vec<ScheduledMatch> = group_order
            .into_iter()
            .map(|i| {
                let p = &placements[i];
                let start = self.slot_start(p.slot, false);
                ScheduledMatch {
                    id: String::new(),
                    number: 0,
                    slot: p.slot,
                    field: p.field,
                    home: ParticipantRef::team(&p.matchup.home),
                    away: ParticipantRef::team(&p.matchup.away),
                    start,
                    end: start + match_duration,
                    phase: Phase::GroupStage,
                    group: p.group.clone(),
                    referee: referees.get(i).cloned().flatten(),
                }
            })
            .collect();

        let first_playoff_slot = placements.iter().map(|p| p.slot + 1).max().unwrap_or(0);
        if let Some(bracket) = bracket {
            matches.extend(self.playoff_matches(bracket, first_playoff_slot));
        }

        for (i, m) in matches.iter_mut().enumerate() {
            m.number = i + 1;
            if m.id.is_empty() {
                m.id = format!("m{}", m.number);
            }
        }

        let schedule = Schedule {
            matches,
            standings: teams.iter().map(StandingsRow::empty).collect(),
            bracket: bracket.cloned(),
            violations: Vec::new(),
        };

        info!(
            matches = schedule.match_count(),
            slots = schedule.slot_count(),
            "schedule assembled"
        );
        schedule
    }

    fn playoff_matches(&self, bracket: &Bracket, first_slot: usize) -> Vec<ScheduledMatch> {
        let levels = bracket.levels();
        let mut by_level: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (idx, node) in bracket.nodes.iter().enumerate() {
            let level = levels.get(node.id.as_str()).copied().unwrap_or(0);
            by_level.entry(level).or_default().push(idx);
        }

        let fields = self.fields.max(1);
        let mut slot = first_slot;
        let mut matches = Vec::with_capacity(bracket.len());

        for nodes in by_level.values() {
            for chunk in nodes.chunks(fields) {
                for (field, &idx) in chunk.iter().enumerate() {
                    let node = &bracket.nodes[idx];
                    let start = self.slot_start(slot, true);
                    matches.push(ScheduledMatch {
                        id: node.id.clone(),
                        number: 0,
                        slot,
                        field,
                        home: node.home.current(),
                        away: node.away.current(),
                        start,
                        end: start + self.timing.match_duration(),
                        phase: node.phase,
                        group: None,
                        referee: None,
                    });
                }
                slot += 1;
            }
        }

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BracketNode, MatchUp, Placeholder};
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 20)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap()
    }

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 20)
            .and_then(|d| d.and_hms_opt(hour, min, 0))
            .unwrap()
    }

    fn timing() -> MatchTiming {
        // 2 × 5 min + 1 min break = 11 min, +4 min between slots
        MatchTiming::new(start(), 10)
            .with_periods(2, 5, 1)
            .with_slot_break(4)
            .with_playoff_break(30)
    }

    fn teams() -> Vec<Team> {
        ["A", "B", "C", "D"].iter().map(|&id| Team::new(id)).collect()
    }

    fn placements() -> Vec<Placement> {
        vec![
            Placement::new(MatchUp::new("C", "D"), 0, 1),
            Placement::new(MatchUp::new("A", "B"), 0, 0),
            Placement::new(MatchUp::new("A", "C"), 1, 0),
        ]
    }

    fn final_bracket() -> Bracket {
        Bracket {
            nodes: vec![
                BracketNode::new(
                    "third-place",
                    Phase::ThirdPlace,
                    Placeholder::group_rank("", 3),
                    Placeholder::group_rank("", 4),
                ),
                BracketNode::new(
                    "final",
                    Phase::Final,
                    Placeholder::group_rank("", 1),
                    Placeholder::group_rank("", 2),
                ),
            ],
            version: 0,
        }
    }

    #[test]
    fn test_times_and_numbering() {
        let assembler = ScheduleAssembler::new(timing(), 2);
        let schedule = assembler.assemble(&teams(), &placements(), &[], None);

        assert_eq!(schedule.match_count(), 3);
        let first = &schedule.matches[0];
        assert_eq!(first.number, 1);
        assert_eq!(first.id, "m1");
        assert_eq!(first.matchup(), Some(MatchUp::new("A", "B")));
        assert_eq!(first.start, at(9, 0));
        assert_eq!(first.end, at(9, 11));

        let third = &schedule.matches[2];
        assert_eq!(third.slot, 1);
        assert_eq!(third.start, at(9, 15));
        assert_eq!(third.phase, Phase::GroupStage);
    }

    #[test]
    fn test_referees_follow_placements() {
        let assembler = ScheduleAssembler::new(timing(), 2);
        let referees = vec![Some(RefereeId::Official(1)), Some(RefereeId::Official(0)), None];
        let schedule = assembler.assemble(&teams(), &placements(), &referees, None);

        // C-D (placement 0) sits on field 1 → second match
        assert_eq!(schedule.matches[1].referee, Some(RefereeId::Official(1)));
        assert_eq!(schedule.matches[0].referee, Some(RefereeId::Official(0)));
        assert_eq!(schedule.matches[2].referee, None);
    }

    #[test]
    fn test_playoffs_follow_group_stage() {
        let assembler = ScheduleAssembler::new(timing(), 1);
        let bracket = final_bracket();
        let schedule = assembler.assemble(&teams(), &placements(), &[], Some(&bracket));

        assert_eq!(schedule.match_count(), 5);
        let third = schedule.match_by_id("third-place").unwrap();
        let fin = schedule.match_by_id("final").unwrap();
        // one field: third place in slot 2, final in slot 3
        assert_eq!(third.slot, 2);
        assert_eq!(fin.slot, 3);
        assert_eq!(third.start, at(10, 0));
        assert_eq!(fin.number, 5);
        assert!(!fin.is_resolved());
        assert!(schedule.bracket.is_some());
    }

    #[test]
    fn test_dependent_levels_start_new_slot() {
        let bracket = Bracket {
            nodes: vec![
                BracketNode::new("sf-1", Phase::Semifinal, Placeholder::group_rank("", 1), Placeholder::group_rank("", 4)),
                BracketNode::new("sf-2", Phase::Semifinal, Placeholder::group_rank("", 2), Placeholder::group_rank("", 3)),
                BracketNode::new("final", Phase::Final, Placeholder::winner_of("sf-1"), Placeholder::winner_of("sf-2")),
            ],
            version: 0,
        };
        let assembler = ScheduleAssembler::new(timing(), 4);
        let schedule = assembler.assemble(&teams(), &placements(), &[], Some(&bracket));

        let sf1 = schedule.match_by_id("sf-1").unwrap();
        let sf2 = schedule.match_by_id("sf-2").unwrap();
        let fin = schedule.match_by_id("final").unwrap();
        assert_eq!(sf1.slot, sf2.slot);
        assert_eq!((sf1.field, sf2.field), (0, 1));
        assert_eq!(fin.slot, sf1.slot + 1);
    }

    #[test]
    fn test_initial_standings() {
        let assembler = ScheduleAssembler::new(timing(), 2);
        let schedule = assembler.assemble(&teams(), &placements(), &[], None);
        assert_eq!(schedule.standings.len(), 4);
        assert!(schedule.standings.iter().all(|r| r.played == 0 && r.points == 0));
    }
}
