//! FPL Draft League Dashboard Library
//!
//! Fetches public Fantasy Premier League Draft data and turns it into the
//! views a draft league cares about: standings and H2H results, live
//! fixtures with owned players, per-player scoring with provisional bonus,
//! and squads grouped by owner.
//!
//! ## Features
//!
//! - **TTL Fetch Cache**: per-endpoint freshness with stale fallback when the API fails
//! - **Ownership Resolution**: player -> owner map built from every squad in the league
//! - **Scoring Engine**: FPL points rules by position, plus bonus allocation from BPS
//! - **Views**: league, live, players, teams, preview and ownership, as tables or JSON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fpl_draft::{commands::common::DashboardContext, config::DashboardConfig, LeagueId};
//!
//! # async fn example() -> fpl_draft::Result<()> {
//! let ctx = DashboardContext::new(LeagueId::new(12345), DashboardConfig::from_env())?;
//! let gw = ctx.gameweek(None).await;
//! let owners = ctx.owners(gw, false).await;
//! println!("{} owned players in GW{gw}", owners.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! Set your draft league ID to avoid passing it in every command:
//! ```bash
//! export FPL_DRAFT_LEAGUE_ID=12345
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod fpl;

// Re-export commonly used types
pub use cli::types::{EntryId, Gameweek, LeagueEntryId, LeagueId, PlayerId, Position, TeamId};
pub use error::{FplError, Result};

pub const LEAGUE_ID_ENV_VAR: &str = "FPL_DRAFT_LEAGUE_ID";
