//! League snapshot: header, head-to-head results, standings, waiver order

use serde::Serialize;
use std::cmp::Reverse;
use std::fmt;
use tracing::info;

use crate::{
    fpl::types::LeagueDetails,
    Gameweek, LeagueEntryId, Result,
};

use super::{cell, common::DashboardContext, print_json, render_table, EMPTY_CELL};

/// Head-to-head status from one side's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Draw,
    Leading,
    Level,
    Lost,
    Trailing,
    Won,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::Draw => "draw",
            MatchStatus::Leading => "leading",
            MatchStatus::Level => "level",
            MatchStatus::Lost => "lost",
            MatchStatus::Trailing => "trailing",
            MatchStatus::Won => "won",
        };
        write!(f, "{}", s)
    }
}

/// won/lost/draw once finished, leading/trailing/level while in progress.
pub fn match_status(own: i64, other: i64, finished: bool) -> MatchStatus {
    use std::cmp::Ordering::*;
    match (own.cmp(&other), finished) {
        (Greater, true) => MatchStatus::Won,
        (Less, true) => MatchStatus::Lost,
        (Equal, true) => MatchStatus::Draw,
        (Greater, false) => MatchStatus::Leading,
        (Less, false) => MatchStatus::Trailing,
        (Equal, false) => MatchStatus::Level,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRow {
    pub team_1: String,
    pub points_1: i64,
    pub team_2: String,
    pub points_2: i64,
    pub status: MatchStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamSnapshotRow {
    pub team: String,
    pub opponent: String,
    pub points: i64,
    pub status: MatchStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotCounts {
    pub leading: usize,
    pub trailing: usize,
    /// Level matches, not teams
    pub level: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingRow {
    pub team: String,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub points_for: i64,
    pub points_against: i64,
    pub total: i64,
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaiverRow {
    pub waiver_pick: u32,
    pub team: String,
}

/// Everything the `league` command shows
#[derive(Debug, Clone, Serialize)]
pub struct LeagueSnapshot {
    pub name: String,
    pub draft_status: Option<String>,
    pub max_entries: Option<u32>,
    pub scoring: Option<String>,
    pub waivers: bool,
    pub gameweek: Option<Gameweek>,
    pub matches: Vec<MatchRow>,
    pub teams: Vec<TeamSnapshotRow>,
    pub counts: SnapshotCounts,
    pub standings: Vec<StandingRow>,
    pub waiver_order: Vec<WaiverRow>,
}

/// Shape league details into the snapshot for `gameweek`, or for the earliest
/// gameweek with a started match when none is given.
pub fn build_league_snapshot(details: &LeagueDetails, gameweek: Option<Gameweek>) -> LeagueSnapshot {
    let names = details.names_by_league_entry();
    let name_of = |id: LeagueEntryId| {
        names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| EMPTY_CELL.to_string())
    };

    let gameweek = gameweek.or_else(|| details.active_gameweek());
    let this_week = gameweek
        .map(|gw| details.matches_for(gw))
        .unwrap_or_default();

    let mut matches: Vec<MatchRow> = this_week
        .iter()
        .map(|m| MatchRow {
            team_1: name_of(m.league_entry_1),
            points_1: m.league_entry_1_points,
            team_2: name_of(m.league_entry_2),
            points_2: m.league_entry_2_points,
            status: match_status(m.league_entry_1_points, m.league_entry_2_points, m.finished),
        })
        .collect();
    matches.sort_by_key(|m| Reverse(m.points_1.abs_diff(m.points_2)));

    let mut teams: Vec<TeamSnapshotRow> = this_week
        .iter()
        .flat_map(|m| {
            [
                (m.league_entry_1, m.league_entry_2),
                (m.league_entry_2, m.league_entry_1),
            ]
            .map(|(own, other)| {
                let (points, _, other_points) = m.from_side_of(own);
                TeamSnapshotRow {
                    team: name_of(own),
                    opponent: name_of(other),
                    points,
                    status: match_status(points, other_points, m.finished),
                }
            })
        })
        .collect();
    teams.sort_by(|a, b| {
        a.status
            .to_string()
            .cmp(&b.status.to_string())
            .then(b.points.cmp(&a.points))
    });

    let count = |status| teams.iter().filter(|t| t.status == status).count();
    let counts = SnapshotCounts {
        leading: count(MatchStatus::Leading),
        trailing: count(MatchStatus::Trailing),
        level: count(MatchStatus::Level) / 2,
    };

    let mut standings: Vec<StandingRow> = details
        .standings
        .iter()
        .map(|s| StandingRow {
            team: name_of(s.league_entry),
            won: s.matches_won,
            drawn: s.matches_drawn,
            lost: s.matches_lost,
            points_for: s.points_for,
            points_against: s.points_against,
            total: s.total,
            rank: s.rank,
        })
        .collect();
    standings.sort_by_key(|s| Reverse((s.total, s.points_for)));

    let mut waiver_order: Vec<WaiverRow> = details
        .league_entries
        .iter()
        .filter_map(|e| {
            Some(WaiverRow {
                waiver_pick: e.waiver_pick?,
                team: e.entry_name.clone()?,
            })
        })
        .collect();
    waiver_order.sort_by_key(|w| w.waiver_pick);

    let league = &details.league;
    LeagueSnapshot {
        name: league.name.clone(),
        draft_status: league.draft_status.clone(),
        max_entries: league.max_entries,
        scoring: league.scoring.clone(),
        waivers: league.trades.as_deref() == Some("y"),
        gameweek,
        matches,
        teams,
        counts,
        standings,
        waiver_order,
    }
}

/// Handle the `league` command
pub async fn handle_league(
    ctx: &DashboardContext,
    gameweek: Option<Gameweek>,
    as_json: bool,
) -> Result<()> {
    let details = ctx.client.league_details(ctx.league_id).await;
    let snapshot = build_league_snapshot(&details, gameweek);
    info!(league = %ctx.league_id, matches = snapshot.matches.len(), "league snapshot");

    if as_json {
        return print_json(&snapshot);
    }
    println!("{}", render_league(&snapshot)); // tarpaulin::skip
    Ok(())
}

pub fn render_league(s: &LeagueSnapshot) -> String {
    let mut out = Vec::new();
    out.push(s.name.clone());
    out.push(format!(
        "Draft status: {}  Max entries: {}  Scoring: {}  Waivers: {}",
        cell(s.draft_status.as_deref()),
        cell(s.max_entries),
        cell(s.scoring.as_deref()),
        if s.waivers { "Yes" } else { "No" }
    ));

    match s.gameweek {
        Some(gw) => {
            out.push(String::new());
            out.push(format!("Gameweek {gw}: live/latest fixtures"));
            let rows: Vec<Vec<String>> = s
                .matches
                .iter()
                .map(|m| {
                    vec![
                        m.team_1.clone(),
                        m.points_1.to_string(),
                        m.team_2.clone(),
                        m.points_2.to_string(),
                        m.status.to_string(),
                    ]
                })
                .collect();
            out.push(render_table(&["Team 1", "T1 pts", "Team 2", "T2 pts", "Status"], &rows));

            out.push(String::new());
            out.push("Team snapshot (this gameweek)".to_string());
            let rows: Vec<Vec<String>> = s
                .teams
                .iter()
                .map(|t| {
                    vec![
                        t.team.clone(),
                        t.opponent.clone(),
                        t.points.to_string(),
                        t.status.to_string(),
                    ]
                })
                .collect();
            out.push(render_table(&["Team", "Opponent", "Points", "Status"], &rows));
            out.push(format!(
                "Leading teams: {}  Trailing teams: {}  Level ties: {}",
                s.counts.leading, s.counts.trailing, s.counts.level
            ));
        }
        None => {
            out.push(String::new());
            out.push("No started fixtures yet.".to_string());
        }
    }

    out.push(String::new());
    out.push("Standings".to_string());
    if s.standings.is_empty() {
        out.push("No standings available yet.".to_string());
    } else {
        let rows: Vec<Vec<String>> = s
            .standings
            .iter()
            .map(|r| {
                vec![
                    r.team.clone(),
                    r.won.to_string(),
                    r.drawn.to_string(),
                    r.lost.to_string(),
                    r.points_for.to_string(),
                    r.points_against.to_string(),
                    r.total.to_string(),
                    cell(r.rank),
                ]
            })
            .collect();
        out.push(render_table(
            &["Team", "W", "D", "L", "PF", "PA", "Total", "Rank"],
            &rows,
        ));
    }

    if !s.waiver_order.is_empty() {
        out.push(String::new());
        out.push("Waiver order".to_string());
        let rows: Vec<Vec<String>> = s
            .waiver_order
            .iter()
            .map(|w| vec![w.waiver_pick.to_string(), w.team.clone()])
            .collect();
        out.push(render_table(&["Waiver #", "Team"], &rows));
    }
    out.join("\n")
}
