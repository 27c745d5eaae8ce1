//! Fantasy point scoring and bonus allocation.
//!
//! All functions here are pure: the same statistics and position always give
//! the same total.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::cli::types::{PlayerId, Position};
use crate::fpl::types::{Element, Fixture, LiveStats, MatchStats, PlayerStatLine};


/// Minutes needed for the long appearance points and a clean sheet.
pub const LONG_PLAY_MINUTES: i64 = 60;

/// Bonus awarded to the first, second and third ranked bps slots.
pub const BONUS_SLOTS: [u8; 3] = [3, 2, 1];

/// Scoring parameters for one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRules {
    /// Appearance of at least [`LONG_PLAY_MINUTES`]
    pub long_play: i64,
    /// Appearance shorter than [`LONG_PLAY_MINUTES`]
    pub short_play: i64,
    pub goal: i64,
    pub assist: i64,
    /// Only when minutes >= [`LONG_PLAY_MINUTES`]
    pub clean_sheet: i64,
    /// Goals conceded per penalty step
    pub goals_conceded_step: i64,
    pub goals_conceded_points: i64,
    /// Saves per save-point step
    pub saves_step: i64,
    pub save_points: i64,
    /// Defensive contributions per award; 0 never awards
    pub defensive_threshold: i64,
    pub defensive_points: i64,
    pub penalty_saved: i64,
    pub penalty_missed: i64,
    pub yellow_card: i64,
    pub red_card: i64,
    pub own_goal: i64,
    pub bonus: i64,
}

impl PositionRules {
    /// Rules shared by every position; position-specific fields start at zero.
    const fn base() -> Self {
        Self {
            long_play: 2,
            short_play: 1,
            goal: 0,
            assist: 3,
            clean_sheet: 0,
            goals_conceded_step: 2,
            goals_conceded_points: 0,
            saves_step: 3,
            save_points: 0,
            defensive_threshold: 0,
            defensive_points: 2,
            penalty_saved: 5,
            penalty_missed: -2,
            yellow_card: -1,
            red_card: -3,
            own_goal: -2,
            bonus: 1,
        }
    }
}

/// Typed rule table, one [`PositionRules`] per position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    pub gkp: PositionRules,
    pub def: PositionRules,
    pub mid: PositionRules,
    pub fwd: PositionRules,
}

impl ScoringRules {
    /// The standard FPL rule set.
    pub const fn standard() -> Self {
        let base = PositionRules::base();
        Self {
            gkp: PositionRules {
                goal: 10,
                clean_sheet: 4,
                goals_conceded_points: -1,
                save_points: 1,
                ..base
            },
            def: PositionRules {
                goal: 6,
                clean_sheet: 4,
                goals_conceded_points: -1,
                defensive_threshold: 10,
                ..base
            },
            mid: PositionRules {
                goal: 5,
                clean_sheet: 1,
                defensive_threshold: 12,
                ..base
            },
            fwd: PositionRules {
                goal: 4,
                defensive_threshold: 12,
                ..base
            },
        }
    }

    pub fn for_position(&self, position: Position) -> &PositionRules {
        match position {
            Position::GKP => &self.gkp,
            Position::DEF => &self.def,
            Position::MID => &self.mid,
            Position::FWD => &self.fwd,
        }
    }

    /// Per-rule contributions for one player's fixture.
    pub fn breakdown(
        &self,
        stats: &MatchStats,
        position: Position,
        bonus_override: Option<i64>,
    ) -> ScoreBreakdown {
        let r = self.for_position(position);

        let minutes = if stats.minutes >= LONG_PLAY_MINUTES {
            r.long_play
        } else if stats.minutes > 0 {
            r.short_play
        } else {
            0
        };
        let clean_sheets = if stats.minutes >= LONG_PLAY_MINUTES && stats.clean_sheets > 0 {
            r.clean_sheet
        } else {
            0
        };

        ScoreBreakdown {
            minutes,
            goals_scored: stats.goals_scored.saturating_mul(r.goal),
            assists: stats.assists.saturating_mul(r.assist),
            clean_sheets,
            goals_conceded: per_step(stats.goals_conceded, r.goals_conceded_step)
                .saturating_mul(r.goals_conceded_points),
            saves: per_step(stats.saves, r.saves_step).saturating_mul(r.save_points),
            defensive_contribution: per_step(
                stats.defensive_contribution,
                r.defensive_threshold,
            )
            .saturating_mul(r.defensive_points),
            penalties_saved: stats.penalties_saved.saturating_mul(r.penalty_saved),
            penalties_missed: stats.penalties_missed.saturating_mul(r.penalty_missed),
            yellow_cards: stats.yellow_cards.saturating_mul(r.yellow_card),
            red_cards: stats.red_cards.saturating_mul(r.red_card),
            own_goals: stats.own_goals.saturating_mul(r.own_goal),
            bonus: bonus_override.unwrap_or(stats.bonus).saturating_mul(r.bonus),
        }
    }

    pub fn score(&self, stats: &MatchStats, position: Position, bonus_override: Option<i64>) -> i64 {
        self.breakdown(stats, position, bonus_override).total()
    }

    /// Score with a position given as text. Unrecognised codes score zero.
    pub fn score_code(&self, stats: &MatchStats, code: &str, bonus_override: Option<i64>) -> i64 {
        match code.parse::<Position>() {
            Ok(position) => self.score(stats, position, bonus_override),
            Err(_) => {
                debug!(code, "unrecognised position, scoring zero");
                0
            }
        }
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self::standard()
    }
}

/// Whole multiples of `step` in `value`; a non-positive step never awards.
fn per_step(value: i64, step: i64) -> i64 {
    if step <= 0 || value <= 0 {
        0
    } else {
        value / step
    }
}

/// Points contributed by each rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub minutes: i64,
    pub goals_scored: i64,
    pub assists: i64,
    pub clean_sheets: i64,
    pub goals_conceded: i64,
    pub saves: i64,
    pub defensive_contribution: i64,
    pub penalties_saved: i64,
    pub penalties_missed: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
    pub own_goals: i64,
    pub bonus: i64,
}

impl ScoreBreakdown {
    /// Sum of every contribution, saturating at the `i64` bounds.
    pub fn total(&self) -> i64 {
        [
            self.minutes,
            self.goals_scored,
            self.assists,
            self.clean_sheets,
            self.goals_conceded,
            self.saves,
            self.defensive_contribution,
            self.penalties_saved,
            self.penalties_missed,
            self.yellow_cards,
            self.red_cards,
            self.own_goals,
            self.bonus,
        ]
        .into_iter()
        .fold(0, i64::saturating_add)
    }
}

/// Points for one player's fixture under the standard rules.
pub fn compute_score(stats: &MatchStats, position: Position, bonus_override: Option<i64>) -> i64 {
    ScoringRules::standard().score(stats, position, bonus_override)
}

/// [`compute_score`] for a position given as text; unknown codes score zero.
pub fn compute_score_for_code(stats: &MatchStats, code: &str, bonus_override: Option<i64>) -> i64 {
    ScoringRules::standard().score_code(stats, code, bonus_override)
}

/// [`compute_score`] for a stat line.
pub fn compute_line_score(line: &PlayerStatLine, bonus_override: Option<i64>) -> i64 {
    compute_score(&line.stats, line.position, bonus_override)
}

/// Bonus points per player for one fixture. Players without an award are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BonusAllocation(pub HashMap<PlayerId, u8>);

impl BonusAllocation {
    pub fn bonus_for(&self, player: PlayerId) -> i64 {
        self.0.get(&player).copied().map(i64::from).unwrap_or(0)
    }

    pub fn total(&self) -> i64 {
        self.0.values().map(|b| i64::from(*b)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Allocate 3/2/1 bonus over a fixture's bps scores.
///
/// Players are ranked by bps, highest first. Equal bps form a cluster; a
/// cluster of `k` consumes `k` slots and every member receives the first of
/// them. Once the three slots are used up nobody else receives bonus.
///
/// ```rust
/// use fpl_draft::{fpl::compute::compute_bonus_for_fixture, PlayerId};
///
/// let p = PlayerId::new;
/// let bonus = compute_bonus_for_fixture(&[(p(1), 40), (p(2), 40), (p(3), 35), (p(4), 30)]);
/// assert_eq!(bonus.bonus_for(p(1)), 3);
/// assert_eq!(bonus.bonus_for(p(2)), 3);
/// assert_eq!(bonus.bonus_for(p(3)), 1);
/// assert_eq!(bonus.bonus_for(p(4)), 0);
/// ```
pub fn compute_bonus_for_fixture(players_with_bps: &[(PlayerId, i64)]) -> BonusAllocation {
    let mut ranked = players_with_bps.to_vec();
    // Stable: ties keep input order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut awarded = HashMap::new();
    let mut slot = 0;
    for cluster in ranked.chunk_by(|a, b| a.1 == b.1) {
        let Some(&value) = BONUS_SLOTS.get(slot) else {
            break;
        };
        for (player, _) in cluster {
            awarded.insert(*player, value);
        }
        slot += cluster.len();
    }
    BonusAllocation(awarded)
}

/// Bonus to show for a fixture that is under way but whose official bonus has
/// not been published yet.
///
/// Returns `None` before kickoff, or once any participant carries official
/// bonus. The pool is every player of either club with minutes on the pitch.
pub fn provisional_bonus(
    fixture: &Fixture,
    started: bool,
    elements: &[Element],
    live: &LiveStats,
) -> Option<BonusAllocation> {
    if !started {
        return None;
    }
    let pool: Vec<(PlayerId, i64)> = elements
        .iter()
        .filter(|e| fixture.involves(e.team))
        .filter_map(|e| live.get(&e.id).map(|s| (e.id, s)))
        .filter(|(_, s)| s.minutes > 0)
        .map(|(id, s)| (id, s.bps))
        .collect();

    if pool.is_empty() {
        return None;
    }
    let official_published = pool
        .iter()
        .any(|(id, _)| live.get(id).is_some_and(|s| s.bonus > 0));
    if official_published {
        return None;
    }
    Some(compute_bonus_for_fixture(&pool))
}
