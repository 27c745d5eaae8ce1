//! CLI argument definitions and parsing.

pub mod types;

use clap::{Args, Parser, Subcommand};
use types::{Gameweek, LeagueId, Position};

/// Arguments shared by every view
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Draft league ID (or set `FPL_DRAFT_LEAGUE_ID` env var).
    #[clap(long, short, global = true)]
    pub league_id: Option<LeagueId>,

    /// Gameweek, e.g. `7` or `GW7`. Defaults to the current gameweek.
    #[clap(long, short, global = true)]
    pub gameweek: Option<Gameweek>,

    /// Output results as JSON instead of tables.
    #[clap(long, global = true)]
    pub json: bool,

    /// Debug logging on stderr (`RUST_LOG` takes precedence).
    #[clap(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Standings, this gameweek's H2H matches and recent waivers
    League,

    /// Live fixtures with the league's owned players
    Live {
        /// Refresh every N seconds until Ctrl-C.
        #[clap(long, value_name = "SECS")]
        watch: Option<u64>,
    },

    /// Player points for a gameweek, owned players first
    Players {
        /// Only players currently on a league squad.
        #[clap(long)]
        owned_only: bool,

        /// Filter by position (repeatable): `-p DEF -p MID`.
        #[clap(short = 'p', long = "position")]
        positions: Option<Vec<Position>>,

        /// Show at most N players.
        #[clap(long)]
        limit: Option<usize>,

        /// Refresh every N seconds until Ctrl-C.
        #[clap(long, value_name = "SECS")]
        watch: Option<u64>,
    },

    /// Squads with live scores, grouped by league team
    Teams {
        /// Only the team whose name contains this text.
        #[clap(long, short)]
        team: Option<String>,
    },

    /// Premier League fixtures and H2H matches for a gameweek
    Preview {
        /// Every gameweek of the season.
        #[clap(long)]
        all: bool,
    },

    /// Raw player -> owner map for a gameweek
    Ownership {
        /// Count only starting XI picks.
        #[clap(long)]
        starters_only: bool,
    },
}

#[derive(Debug, Parser)]
#[clap(name = "fpl-draft", about = "FPL Draft league dashboard", version)]
pub struct FplDraft {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[clap(subcommand)]
    pub command: Commands,
}
