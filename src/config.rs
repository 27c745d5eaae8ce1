//! Runtime configuration: upstream endpoints, request limits and cache ttls.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// FPL Draft API base
pub const DRAFT_BASE_URL: &str = "https://draft.premierleague.com/api";

/// Main FPL API base (fixtures live here)
pub const FANTASY_BASE_URL: &str = "https://fantasy.premierleague.com/api";

pub const DRAFT_BASE_URL_ENV_VAR: &str = "FPL_DRAFT_BASE_URL";
pub const FANTASY_BASE_URL_ENV_VAR: &str = "FPL_FANTASY_BASE_URL";

/// Configuration for one dashboard session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Draft API base URL
    pub draft_base_url: String,

    /// Fantasy API base URL
    pub fantasy_base_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Cap on simultaneous outbound calls during a fan-out
    pub max_concurrent_requests: usize,

    /// Maximum number of cached responses kept in memory
    pub cache_capacity: usize,

    /// Freshness policy per dataset
    pub ttl: TtlPolicy,
}

/// How long each dataset stays fresh.
///
/// Slowly changing data (season metadata, league configuration) is kept for
/// minutes; squads and ownership are refreshed within a couple of minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtlPolicy {
    pub game_status: Duration,
    pub bootstrap: Duration,
    pub fixtures: Duration,
    pub league_details: Duration,
    pub draft_choices: Duration,
    pub event_live: Duration,
    pub entry_picks: Duration,
    pub ownership: Duration,
    pub squad_table: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            game_status: Duration::from_secs(300),
            bootstrap: Duration::from_secs(300),
            fixtures: Duration::from_secs(300),
            league_details: Duration::from_secs(300),
            draft_choices: Duration::from_secs(300),
            event_live: Duration::from_secs(300),
            entry_picks: Duration::from_secs(120),
            ownership: Duration::from_secs(60),
            squad_table: Duration::from_secs(30),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            draft_base_url: DRAFT_BASE_URL.to_string(),
            fantasy_base_url: FANTASY_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            max_concurrent_requests: 8,
            cache_capacity: 512,
            ttl: TtlPolicy::default(),
        }
    }
}

impl DashboardConfig {
    /// Defaults, with base URLs overridable through the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(DRAFT_BASE_URL_ENV_VAR) {
            config.draft_base_url = url;
        }
        if let Ok(url) = std::env::var(FANTASY_BASE_URL_ENV_VAR) {
            config.fantasy_base_url = url;
        }
        config
    }

    /// Point both APIs at one host, e.g. a mock server.
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.draft_base_url = format!("{base}/api");
        self.fantasy_base_url = format!("{base}/fantasy/api");
        self
    }
}
