//! Gameweek preview: Premier League fixtures and the draft league's H2H matches

use serde::Serialize;
use tracing::info;

use crate::{
    fpl::types::{format_kickoff, Bootstrap, Fixture, LeagueDetails},
    Gameweek, LeagueEntryId, Result,
};

use super::{common::DashboardContext, print_json, render_table, EMPTY_CELL};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewFixture {
    pub home: String,
    pub away: String,
    pub kickoff: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewMatch {
    pub team_a: String,
    pub points_a: i64,
    pub points_b: i64,
    pub team_b: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameweekPreview {
    pub gameweek: Gameweek,
    pub fixtures: Vec<PreviewFixture>,
    pub matches: Vec<PreviewMatch>,
}

pub fn build_preview(
    gw: Gameweek,
    fixtures: &[Fixture],
    bootstrap: &Bootstrap,
    details: &LeagueDetails,
) -> GameweekPreview {
    let entries = details.league_entries.iter().filter(|e| e.entry_id.is_some());
    let name_of = |id: LeagueEntryId| {
        entries
            .clone()
            .find(|e| e.id == id)
            .and_then(|e| e.entry_name.clone())
            .unwrap_or_else(|| EMPTY_CELL.to_string())
    };

    GameweekPreview {
        gameweek: gw,
        fixtures: fixtures
            .iter()
            .map(|f| PreviewFixture {
                home: bootstrap.team_name(f.team_h),
                away: bootstrap.team_name(f.team_a),
                kickoff: format_kickoff(f.kickoff_time.as_deref()),
            })
            .collect(),
        matches: details
            .matches_for(gw)
            .into_iter()
            .map(|m| PreviewMatch {
                team_a: name_of(m.league_entry_1),
                points_a: m.league_entry_1_points,
                points_b: m.league_entry_2_points,
                team_b: name_of(m.league_entry_2),
            })
            .collect(),
    }
}

/// Handle the `preview` command: one gameweek, or the whole season with `all`
pub async fn handle_preview(
    ctx: &DashboardContext,
    gameweek: Option<Gameweek>,
    all: bool,
    as_json: bool,
) -> Result<()> {
    let current = ctx.client.current_gameweek().await;
    let weeks: Vec<Gameweek> = if all {
        Gameweek::season().collect()
    } else {
        vec![gameweek.unwrap_or(current)]
    };

    let (bootstrap, details) = tokio::join!(
        ctx.client.bootstrap(),
        ctx.client.league_details(ctx.league_id)
    );
    let mut previews = Vec::with_capacity(weeks.len());
    for gw in weeks {
        let fixtures = ctx.client.fixtures(gw).await;
        previews.push(build_preview(gw, &fixtures, &bootstrap, &details));
    }
    info!(current = %current, weeks = previews.len(), "gameweek preview");

    if as_json {
        return print_json(&previews);
    }
    println!("Gameweek Preview (current GW: {current})"); // tarpaulin::skip
    for preview in &previews {
        println!("{}", render_preview(preview)); // tarpaulin::skip
    }
    Ok(())
}

pub fn render_preview(p: &GameweekPreview) -> String {
    let mut out = vec![String::new(), format!("Gameweek {}", p.gameweek)];

    if p.fixtures.is_empty() {
        out.push("No PL fixtures available.".to_string());
    } else {
        out.push("Premier League fixtures".to_string());
        let rows: Vec<Vec<String>> = p
            .fixtures
            .iter()
            .map(|f| vec![f.home.clone(), f.away.clone(), f.kickoff.clone()])
            .collect();
        out.push(render_table(&["Home", "Away", "Kickoff"], &rows));
    }

    if p.matches.is_empty() {
        out.push("No Draft matches available for this GW.".to_string());
    } else {
        out.push("Draft League H2H".to_string());
        let rows: Vec<Vec<String>> = p
            .matches
            .iter()
            .map(|m| {
                vec![
                    m.team_a.clone(),
                    m.points_a.to_string(),
                    m.points_b.to_string(),
                    m.team_b.clone(),
                ]
            })
            .collect();
        out.push(render_table(&["Team A", "Pts A", "Pts B", "Team B"], &rows));
    }
    out.join("\n")
}
