//! Bracket definition builder.
//!
//! # Seeding
//!
//! Qualifiers are taken rank-major across groups: every group winner
//! (in group order), then every runner-up, and so on. When a rank level
//! only partially fits, the remaining seeds become cross-group
//! placeholders (best third-placed team, second-best third, ...).
//!
//! The first round pairs seeds in standard bracket order, so seed 1 and
//! seed 2 can only meet in the final:
//!
//! ```text
//! 2  → 1 2
//! 4  → 1 4 2 3
//! 8  → 1 8 4 5 2 7 3 6
//! ```
//!
//! # Placement matches
//!
//! | Match | With quarterfinals | Without |
//! |-------|--------------------|---------|
//! | 3rd   | losers of the semifinals | seeds 3 v 4 (final only) |
//! | 5th   | winners of the placement semifinals | seeds 5 v 6 |
//! | 7th   | losers of the placement semifinals | seeds 7 v 8 |
//!
//! Placement semifinals pair the quarterfinal losers (qf-1 v qf-2,
//! qf-3 v qf-4).

use tracing::{debug, info};

use crate::error::SchedulingError;
use crate::models::{
    Bracket, BracketNode, FinalsConfig, FinalsPreset, GroupLayout, Phase, Placeholder,
};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Builds bracket definitions from a finals configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketBuilder;

impl BracketBuilder {
    /// Builds the bracket for `finals` over the given group layout.
    ///
    /// Returns an empty bracket for `FinalsPreset::None`. Fails with
    /// `InvalidPlaceholder` when the groups cannot supply enough
    /// qualifiers.
    pub fn build(finals: &FinalsConfig, layout: &GroupLayout) -> Result<Bracket, SchedulingError> {
        let main = finals.preset.qualifiers();
        if main == 0 {
            return Ok(Bracket::default());
        }

        let with_quarterfinals = main >= 8;
        let needed = [
            main,
            if finals.third_place && main == 2 { 4 } else { 0 },
            if finals.fifth_sixth && !with_quarterfinals { 6 } else { 0 },
            if finals.seventh_eighth && !with_quarterfinals { 8 } else { 0 },
        ]
        .into_iter()
        .max()
        .unwrap_or(main);

        let seeds = qualifiers(layout, needed)?;
        debug!(qualifiers = seeds.len(), preset = ?finals.preset, "seeds derived");
        let seed = |n: usize| seeds[n - 1].clone();

        let order = seeding_order(main);
        let mut nodes = Vec::new();
        let mut quarterfinals = Vec::new();
        let mut semifinals = Vec::new();
        let mut previous: Vec<String> = Vec::new();

        for (round, (phase, prefix)) in main_rounds(finals.preset).into_iter().enumerate() {
            let count = if round == 0 { main / 2 } else { previous.len() / 2 };
            let mut ids = Vec::with_capacity(count);
            for i in 0..count {
                let id = node_id(prefix, i + 1, count);
                let (home, away) = if round == 0 {
                    (seed(order[2 * i]), seed(order[2 * i + 1]))
                } else {
                    (
                        Placeholder::winner_of(&previous[2 * i]),
                        Placeholder::winner_of(&previous[2 * i + 1]),
                    )
                };
                nodes.push(BracketNode::new(&id, phase, home, away));
                ids.push(id);
            }
            match phase {
                Phase::Quarterfinal => quarterfinals = ids.clone(),
                Phase::Semifinal => semifinals = ids.clone(),
                _ => {}
            }
            previous = ids;
        }
        // Placement matches go before the final.
        let final_node = nodes.pop();

        match quarterfinals.as_slice() {
            [q1, q2, q3, q4] if finals.fifth_sixth || finals.seventh_eighth => {
                nodes.push(BracketNode::new(
                    "placement-5-1",
                    Phase::PlacementSemifinal,
                    Placeholder::loser_of(q1),
                    Placeholder::loser_of(q2),
                ));
                nodes.push(BracketNode::new(
                    "placement-5-2",
                    Phase::PlacementSemifinal,
                    Placeholder::loser_of(q3),
                    Placeholder::loser_of(q4),
                ));
                if finals.seventh_eighth {
                    nodes.push(BracketNode::new(
                        "seventh-place",
                        Phase::SeventhPlace,
                        Placeholder::loser_of("placement-5-1"),
                        Placeholder::loser_of("placement-5-2"),
                    ));
                }
                if finals.fifth_sixth {
                    nodes.push(BracketNode::new(
                        "fifth-place",
                        Phase::FifthPlace,
                        Placeholder::winner_of("placement-5-1"),
                        Placeholder::winner_of("placement-5-2"),
                    ));
                }
            }
            [] => {
                if finals.seventh_eighth {
                    nodes.push(BracketNode::new("seventh-place", Phase::SeventhPlace, seed(7), seed(8)));
                }
                if finals.fifth_sixth {
                    nodes.push(BracketNode::new("fifth-place", Phase::FifthPlace, seed(5), seed(6)));
                }
            }
            _ => {}
        }

        if finals.third_place {
            let node = match semifinals.as_slice() {
                [s1, s2] => BracketNode::new(
                    "third-place",
                    Phase::ThirdPlace,
                    Placeholder::loser_of(s1),
                    Placeholder::loser_of(s2),
                ),
                _ => BracketNode::new("third-place", Phase::ThirdPlace, seed(3), seed(4)),
            };
            nodes.push(node);
        }

        nodes.extend(final_node);

        let bracket = Bracket::from_nodes(nodes, layout)?;
        info!(nodes = bracket.len(), preset = ?finals.preset, "bracket built");
        Ok(bracket)
    }
}

/// Rounds of the main bracket, first round first.
fn main_rounds(preset: FinalsPreset) -> Vec<(Phase, &'static str)> {
    let all = [
        (Phase::RoundOf16, "r16"),
        (Phase::Quarterfinal, "qf"),
        (Phase::Semifinal, "sf"),
        (Phase::Final, "final"),
    ];
    let skip = match preset {
        FinalsPreset::None | FinalsPreset::RoundOf16 => 0,
        FinalsPreset::Quarterfinals => 1,
        FinalsPreset::Semifinals => 2,
        FinalsPreset::FinalOnly => 3,
    };
    all[skip..].to_vec()
}

fn node_id(prefix: &str, index: usize, count: usize) -> String {
    if count <= 1 {
        prefix.to_string()
    } else {
        format!("{prefix}-{index}")
    }
}

/// Seeds (1-based positions) in standard bracket order for a power-of-two
/// field. `seeding_order(8)` is `[1, 8, 4, 5, 2, 7, 3, 6]`.
pub fn seeding_order(size: usize) -> Vec<usize> {
    if size < 2 {
        return (1..=size).collect();
    }
    let mut order = vec![1, 2];
    while order.len() < size {
        let next = order.len() * 2;
        order = order.iter().flat_map(|&s| [s, next + 1 - s]).collect();
    }
    order
}

/// The first `count` qualifiers in seed order.
fn qualifiers(layout: &GroupLayout, count: usize) -> Result<Vec<Placeholder>, SchedulingError> {
    let mut seeds = Vec::with_capacity(count);
    let deepest = layout.groups.values().copied().max().unwrap_or(0);

    for rank in 1..=deepest {
        let level: Vec<String> = layout
            .groups
            .iter()
            .filter(|&(_, &size)| size >= rank)
            .map(|(group, _)| group.clone())
            .collect();
        let remaining = count - seeds.len();

        if level.len() <= remaining {
            seeds.extend(level.iter().map(|g| Placeholder::group_rank(g, rank)));
        } else {
            seeds.extend((1..=remaining).map(|position| Placeholder::BestRanked {
                groups: level.clone(),
                rank,
                position,
            }));
        }
        if seeds.len() == count {
            return Ok(seeds);
        }
    }

    Err(SchedulingError::InvalidPlaceholder(vec![ValidationError::new(
        ValidationErrorKind::TooFewTeams,
        format!(
            "Finals need {count} qualifier(s) but the groups hold {} team(s)",
            layout.team_count()
        ),
    )]))
}
