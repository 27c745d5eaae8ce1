//! Live fixtures with the league's owned players

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use crate::{
    fpl::types::{format_kickoff, Bootstrap, Fixture, FixtureStatus, LiveStats},
    Gameweek, PlayerId, Result,
};

use super::{cell, common::DashboardContext, print_json, render_table, EMPTY_CELL};

/// An owned player's line within a fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LivePlayerRow {
    pub player_id: PlayerId,
    pub player: String,
    pub club: String,
    pub owner: String,
    /// `None` until the player appears in the live feed
    pub minutes: Option<i64>,
    pub points: Option<i64>,
    pub contributions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveFixtureView {
    pub fixture_id: u32,
    pub home: String,
    pub away: String,
    pub kickoff: String,
    pub status: FixtureStatus,
    pub owned: Vec<LivePlayerRow>,
}

/// The `live` page for one gameweek
#[derive(Debug, Clone, Serialize)]
pub struct LiveView {
    pub gameweek: Gameweek,
    pub refreshed_at: String,
    pub fixtures: Vec<LiveFixtureView>,
}

/// One view per fixture, sorted by kickoff, each listing the owned players of
/// both clubs.
pub fn build_live_fixtures(
    bootstrap: &Bootstrap,
    fixtures: &[Fixture],
    owners: &HashMap<PlayerId, String>,
    live: &LiveStats,
    now: DateTime<Utc>,
) -> Vec<LiveFixtureView> {
    let mut fixtures: Vec<&Fixture> = fixtures.iter().collect();
    fixtures.sort_by(|a, b| {
        a.kickoff_time
            .as_deref()
            .unwrap_or("")
            .cmp(b.kickoff_time.as_deref().unwrap_or(""))
    });

    fixtures
        .into_iter()
        .map(|f| {
            let owned = bootstrap
                .elements
                .iter()
                .filter(|e| f.involves(e.team))
                .filter_map(|e| {
                    let owner = owners.get(&e.id)?;
                    let stats = live.get(&e.id);
                    Some(LivePlayerRow {
                        player_id: e.id,
                        player: e.display_name(),
                        club: bootstrap.team_short_name(e.team),
                        owner: owner.clone(),
                        minutes: stats.map(|s| s.minutes),
                        points: stats.map(|s| s.total_points),
                        contributions: stats.map(|s| s.contributions()).unwrap_or_default(),
                    })
                })
                .collect();

            LiveFixtureView {
                fixture_id: f.id,
                home: bootstrap.team_name(f.team_h),
                away: bootstrap.team_name(f.team_a),
                kickoff: format_kickoff(f.kickoff_time.as_deref()),
                status: f.status_at(now),
                owned,
            }
        })
        .collect()
}

/// Handle the `live` command
pub async fn handle_live(
    ctx: &DashboardContext,
    gameweek: Option<Gameweek>,
    as_json: bool,
) -> Result<()> {
    let gw = ctx.gameweek(gameweek).await;
    let (bootstrap, fixtures, live, owners) = tokio::join!(
        ctx.client.bootstrap(),
        ctx.client.fixtures(gw),
        ctx.client.event_live(gw),
        ctx.owners(gw, false),
    );

    let now = Utc::now();
    let view = LiveView {
        gameweek: gw,
        refreshed_at: now.format("%a %d %b %Y, %H:%M:%S UTC").to_string(),
        fixtures: build_live_fixtures(&bootstrap, &fixtures, &owners, &live, now),
    };
    info!(
        gw = %gw,
        fixtures = view.fixtures.len(),
        owned = owners.len(),
        live_players = live.len(),
        "live view"
    );
    ctx.log_cache_usage();

    if as_json {
        return print_json(&view);
    }
    println!("{}", render_live(&view)); // tarpaulin::skip
    Ok(())
}

pub fn render_live(view: &LiveView) -> String {
    let mut out = vec![
        format!("Fixtures for Gameweek {}", view.gameweek),
        format!("Last refresh: {}", view.refreshed_at),
    ];
    if view.fixtures.is_empty() {
        out.push("No fixtures found.".to_string());
        return out.join("\n");
    }

    for f in &view.fixtures {
        out.push(String::new());
        out.push(format!("{} vs {} - {} ({})", f.home, f.away, f.kickoff, f.status));
        if f.owned.is_empty() {
            out.push("No owned players in this fixture.".to_string());
            continue;
        }
        let rows: Vec<Vec<String>> = f
            .owned
            .iter()
            .map(|p| {
                let contributions = if p.contributions.is_empty() {
                    EMPTY_CELL.to_string()
                } else {
                    p.contributions.join(" ")
                };
                vec![
                    format!("{} [{}]", p.player, p.club),
                    p.owner.clone(),
                    cell(p.minutes),
                    cell(p.points),
                    contributions,
                ]
            })
            .collect();
        out.push(render_table(
            &["Player [Team]", "Owned by", "Minutes", "Points", "Contrib"],
            &rows,
        ));
    }
    out.join("\n")
}
