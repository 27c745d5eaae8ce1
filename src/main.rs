//! Entry point: parse CLI and dispatch to command handlers.

use anyhow::Context;
use clap::Parser;
use fpl_draft::{
    cli::{Commands, FplDraft},
    commands::{
        common::{run_with_refresh, DashboardContext},
        league::handle_league,
        live::handle_live,
        ownership::handle_ownership,
        players::{handle_players, PlayerFilters},
        preview::handle_preview,
        resolve_league_id,
        teams::handle_teams,
    },
    config::DashboardConfig,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "fpl_draft=debug" } else { "fpl_draft=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = FplDraft::parse();
    init_tracing(app.common.verbose);

    let league_id = resolve_league_id(app.common.league_id)?;
    let ctx = DashboardContext::new(league_id, DashboardConfig::from_env())
        .context("failed to set up the FPL client")?;
    let gameweek = app.common.gameweek;
    let json = app.common.json;

    match app.command {
        Commands::League => handle_league(&ctx, gameweek, json).await?,

        Commands::Live { watch } => {
            run_with_refresh(watch.map(Duration::from_secs), || {
                handle_live(&ctx, gameweek, json)
            })
            .await?
        }

        Commands::Players {
            owned_only,
            positions,
            limit,
            watch,
        } => {
            let filters = PlayerFilters {
                owned_only,
                positions,
                limit,
            };
            run_with_refresh(watch.map(Duration::from_secs), || {
                handle_players(&ctx, gameweek, &filters, json)
            })
            .await?
        }

        Commands::Teams { team } => handle_teams(&ctx, gameweek, team.as_deref(), json).await?,

        Commands::Preview { all } => handle_preview(&ctx, gameweek, all, json).await?,

        Commands::Ownership { starters_only } => {
            handle_ownership(&ctx, gameweek, starters_only, json).await?
        }
    }

    Ok(())
}
