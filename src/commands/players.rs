//! Every player for a gameweek with raw stats, API points and computed points

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::{
    fpl::{
        compute::{compute_score_for_code, provisional_bonus},
        types::{Bootstrap, Fixture, FixtureStatus, LiveStats, MatchStats},
    },
    Gameweek, PlayerId, Position, Result, TeamId,
};

use super::{common::DashboardContext, print_json, render_table, EMPTY_CELL};

/// One row of the all-players table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRow {
    pub player_id: PlayerId,
    pub player: String,
    pub position: String,
    pub club: String,
    pub owner: String,
    pub fixture: String,
    pub fixture_status: String,
    pub stats: MatchStats,
    /// The API's own total
    pub api_points: i64,
    /// Computed from raw stats, with provisional bonus while official bonus is pending
    pub computed_points: i64,
    pub provisional_bonus: Option<i64>,
}

impl PlayerRow {
    pub fn is_owned(&self) -> bool {
        self.owner != EMPTY_CELL
    }
}

/// Optional narrowing of the table
#[derive(Debug, Clone, Default)]
pub struct PlayerFilters {
    pub owned_only: bool,
    pub positions: Option<Vec<Position>>,
    pub limit: Option<usize>,
}

/// Provisional bonus per player, for every fixture that has started and whose
/// official bonus has not been published.
pub fn provisional_overrides(
    bootstrap: &Bootstrap,
    fixtures: &[Fixture],
    live: &LiveStats,
    now: DateTime<Utc>,
) -> HashMap<PlayerId, i64> {
    let mut overrides = HashMap::new();
    for fixture in fixtures {
        let Some(allocation) =
            provisional_bonus(fixture, fixture.has_started(now), &bootstrap.elements, live)
        else {
            continue;
        };
        debug!(fixture = fixture.id, awarded = allocation.total(), "provisional bonus");
        // Double gameweeks: a player's override sums over both fixtures.
        for element in bootstrap.elements.iter().filter(|e| fixture.involves(e.team)) {
            *overrides.entry(element.id).or_insert(0) += allocation.bonus_for(element.id);
        }
    }
    overrides
}

fn fixture_rank(fixture: &Fixture, now: DateTime<Utc>) -> u8 {
    match fixture.status_at(now) {
        FixtureStatus::InPlay => 0,
        FixtureStatus::NotStarted => 1,
        FixtureStatus::Finished => 2,
        FixtureStatus::Unknown => 3,
    }
}

/// The fixture each club's rows describe. With several fixtures in a
/// gameweek: one in play, else the next to kick off, else the latest finished.
pub fn fixtures_by_team(fixtures: &[Fixture], now: DateTime<Utc>) -> HashMap<TeamId, &Fixture> {
    let preferred = |candidate: &Fixture, current: &Fixture| {
        let (a, b) = (fixture_rank(candidate, now), fixture_rank(current, now));
        if a != b {
            return a < b;
        }
        if a == 2 {
            candidate.kickoff() > current.kickoff()
        } else {
            candidate.kickoff() < current.kickoff()
        }
    };

    let mut by_team: HashMap<TeamId, &Fixture> = HashMap::new();
    for fixture in fixtures {
        for team in [fixture.team_h, fixture.team_a] {
            by_team
                .entry(team)
                .and_modify(|current| {
                    if preferred(fixture, *current) {
                        *current = fixture;
                    }
                })
                .or_insert(fixture);
        }
    }
    by_team
}

/// Score every player in parallel and sort: owned players first, then by API
/// points, highest first.
pub fn build_player_rows(
    bootstrap: &Bootstrap,
    fixtures: &[Fixture],
    owners: &HashMap<PlayerId, String>,
    live: &LiveStats,
    now: DateTime<Utc>,
) -> Vec<PlayerRow> {
    let fixture_by_team = fixtures_by_team(fixtures, now);
    let overrides = provisional_overrides(bootstrap, fixtures, live, now);

    let mut rows: Vec<PlayerRow> = bootstrap
        .elements
        .par_iter()
        .map(|e| {
            let stats = live.get(&e.id).copied().unwrap_or_default();
            let position = bootstrap.position_name(e.element_type);
            let bonus_override = overrides.get(&e.id).copied();
            let fixture = fixture_by_team.get(&e.team);

            PlayerRow {
                player_id: e.id,
                player: e.display_name(),
                club: bootstrap.team_short_name(e.team),
                owner: owners
                    .get(&e.id)
                    .cloned()
                    .unwrap_or_else(|| EMPTY_CELL.to_string()),
                fixture: fixture
                    .map(|f| format!("vs. {}", bootstrap.team_short_name(f.opponent_of(e.team))))
                    .unwrap_or_else(|| EMPTY_CELL.to_string()),
                fixture_status: fixture
                    .map(|f| f.status_at(now).to_string())
                    .unwrap_or_else(|| EMPTY_CELL.to_string()),
                api_points: stats.total_points,
                computed_points: compute_score_for_code(&stats, &position, bonus_override),
                provisional_bonus: bonus_override,
                position,
                stats,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.is_owned()
            .cmp(&a.is_owned())
            .then(b.api_points.cmp(&a.api_points))
    });
    rows
}

pub fn apply_filters(rows: Vec<PlayerRow>, filters: &PlayerFilters) -> Vec<PlayerRow> {
    let wanted: Option<Vec<String>> = filters
        .positions
        .as_ref()
        .map(|ps| ps.iter().map(Position::to_string).collect());

    let filtered = rows
        .into_iter()
        .filter(|r| !filters.owned_only || r.is_owned())
        .filter(|r| wanted.as_ref().map_or(true, |w| w.contains(&r.position)));
    match filters.limit {
        Some(n) => filtered.take(n).collect(),
        None => filtered.collect(),
    }
}

/// Handle the `players` command
pub async fn handle_players(
    ctx: &DashboardContext,
    gameweek: Option<Gameweek>,
    filters: &PlayerFilters,
    as_json: bool,
) -> Result<()> {
    let gw = ctx.gameweek(gameweek).await;
    let (bootstrap, fixtures, live, owners) = tokio::join!(
        ctx.client.bootstrap(),
        ctx.client.fixtures(gw),
        ctx.client.event_live(gw),
        ctx.owners(gw, false),
    );

    let rows = build_player_rows(&bootstrap, &fixtures, &owners, &live, Utc::now());
    info!(gw = %gw, players = rows.len(), "players view");
    let rows = apply_filters(rows, filters);
    ctx.log_cache_usage();

    if as_json {
        return print_json(&rows);
    }
    println!("All Players - GW{gw}"); // tarpaulin::skip
    println!("{}", render_players(&rows)); // tarpaulin::skip
    Ok(())
}

pub fn render_players(rows: &[PlayerRow]) -> String {
    if rows.is_empty() {
        return "No players found.".to_string();
    }
    let headers = [
        "Player", "Pos", "Club", "Owner", "Fixture", "Status", "Min", "G", "A", "CS", "GC", "YC",
        "RC", "OG", "PS", "PM", "SV", "B", "BPS", "DC", "API", "Comp",
    ];
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            let s = &r.stats;
            let mut cells = vec![
                r.player.clone(),
                r.position.clone(),
                r.club.clone(),
                r.owner.clone(),
                r.fixture.clone(),
                r.fixture_status.clone(),
            ];
            cells.extend(
                [
                    s.minutes,
                    s.goals_scored,
                    s.assists,
                    s.clean_sheets,
                    s.goals_conceded,
                    s.yellow_cards,
                    s.red_cards,
                    s.own_goals,
                    s.penalties_saved,
                    s.penalties_missed,
                    s.saves,
                    s.bonus,
                    s.bps,
                    s.defensive_contribution,
                    r.api_points,
                    r.computed_points,
                ]
                .map(|v| v.to_string()),
            );
            cells
        })
        .collect();
    render_table(&headers, &table)
}
