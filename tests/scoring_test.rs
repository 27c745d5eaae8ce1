//! Scoring and bonus allocation through the public API

use fpl_draft::{
    fpl::{
        compute::{compute_line_score, provisional_bonus},
        compute_bonus_for_fixture, compute_score, compute_score_for_code,
        types::{decode_fixtures, decode_live, Bootstrap, MatchStats, PlayerStatLine},
        ScoringRules,
    },
    PlayerId, Position,
};
use serde_json::json;

fn p(id: u32) -> PlayerId {
    PlayerId::new(id)
}

#[test]
fn test_defender_full_match() {
    // 90 min, goal, clean sheet, one conceded, yellow
    let stats = MatchStats {
        minutes: 90,
        goals_scored: 1,
        clean_sheets: 1,
        goals_conceded: 1,
        yellow_cards: 1,
        bonus: 2,
        ..MatchStats::default()
    };
    assert_eq!(compute_score(&stats, Position::DEF, None), 2 + 6 + 4 - 1 + 2);
    assert_eq!(compute_score_for_code(&stats, "DEF", None), 13);
}

#[test]
fn test_goalkeeper_saves_and_conceded() {
    let stats = MatchStats {
        minutes: 90,
        saves: 7,
        goals_conceded: 5,
        penalties_saved: 1,
        ..MatchStats::default()
    };
    // 2 + 2 (saves) - 2 (conceded) + 5 (penalty save)
    assert_eq!(compute_score(&stats, Position::GKP, None), 7);
}

#[test]
fn test_cameo_forward_with_assist_and_override() {
    let stats = MatchStats {
        minutes: 20,
        assists: 1,
        bonus: 1,
        ..MatchStats::default()
    };
    assert_eq!(compute_score(&stats, Position::FWD, None), 1 + 3 + 1);
    assert_eq!(compute_score(&stats, Position::FWD, Some(3)), 1 + 3 + 3);
    assert_eq!(compute_score(&stats, Position::FWD, Some(0)), 1 + 3);
}

#[test]
fn test_unknown_position_scores_zero() {
    let stats = MatchStats {
        minutes: 90,
        goals_scored: 3,
        ..MatchStats::default()
    };
    assert_eq!(compute_score_for_code(&stats, "QB", None), 0);
}

#[test]
fn test_stat_line_matches_rules() {
    let line = PlayerStatLine {
        player: p(9),
        position: Position::MID,
        stats: MatchStats {
            minutes: 75,
            defensive_contribution: 12,
            ..MatchStats::default()
        },
    };
    assert_eq!(compute_line_score(&line, None), 2 + 2);
    assert_eq!(
        ScoringRules::default().score(&line.stats, line.position, None),
        compute_line_score(&line, None)
    );
}

#[test]
fn test_bonus_three_way_tie_for_first() {
    let bonus = compute_bonus_for_fixture(&[(p(1), 50), (p(2), 50), (p(3), 50), (p(4), 49)]);
    assert_eq!(bonus.bonus_for(p(1)), 3);
    assert_eq!(bonus.bonus_for(p(2)), 3);
    assert_eq!(bonus.bonus_for(p(3)), 3);
    assert_eq!(bonus.bonus_for(p(4)), 0);
    assert_eq!(bonus.total(), 9);
}

#[test]
fn test_bonus_tie_for_second() {
    let bonus = compute_bonus_for_fixture(&[(p(1), 20), (p(2), 40), (p(3), 20), (p(4), 10)]);
    assert_eq!(bonus.bonus_for(p(2)), 3);
    assert_eq!(bonus.bonus_for(p(1)), 2);
    assert_eq!(bonus.bonus_for(p(3)), 2);
    assert_eq!(bonus.bonus_for(p(4)), 0);
}

#[test]
fn test_bonus_empty_fixture() {
    assert!(compute_bonus_for_fixture(&[]).is_empty());
}

#[test]
fn test_provisional_bonus_from_live_feed() {
    let bootstrap = Bootstrap::from_value(&json!({
        "elements": [
            {"id": 1, "web_name": "A", "team": 1, "element_type": 3},
            {"id": 2, "web_name": "B", "team": 2, "element_type": 4},
            {"id": 3, "web_name": "C", "team": 2, "element_type": 2},
            {"id": 4, "web_name": "D", "team": 5, "element_type": 2}
        ]
    }));
    let fixture = decode_fixtures(&json!([{"id": 1, "team_h": 1, "team_a": 2}]))
        .pop()
        .unwrap();
    let live = decode_live(&json!({"elements": [
        {"id": 1, "stats": {"minutes": 60, "bps": 22}},
        {"id": 2, "stats": {"minutes": 60, "bps": 31}},
        {"id": 3, "stats": {"minutes": 0, "bps": 40}},
        {"id": 4, "stats": {"minutes": 90, "bps": 50}}
    ]}));

    assert!(provisional_bonus(&fixture, false, &bootstrap.elements, &live).is_none());

    let bonus = provisional_bonus(&fixture, true, &bootstrap.elements, &live).unwrap();
    assert_eq!(bonus.bonus_for(p(2)), 3);
    assert_eq!(bonus.bonus_for(p(1)), 2);
    // Unused sub and another fixture's player are outside the pool
    assert_eq!(bonus.bonus_for(p(3)), 0);
    assert_eq!(bonus.bonus_for(p(4)), 0);

    let published = decode_live(&json!({"elements": [
        {"id": 1, "stats": {"minutes": 90, "bps": 22, "bonus": 1}},
        {"id": 2, "stats": {"minutes": 90, "bps": 31, "bonus": 3}}
    ]}));
    assert!(provisional_bonus(&fixture, true, &bootstrap.elements, &published).is_none());
}
