//! Shared state for the dashboard views.
//!
//! One [`DashboardContext`] lives for the whole process, so repeated renders
//! (`--watch`) reuse the response, ownership and squad caches.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    config::DashboardConfig,
    core::{Clock, SystemClock, TtlCache},
    fpl::{http::FplClient, ownership::OwnershipResolver},
    Gameweek, LeagueId, PlayerId, Result,
};

use super::teams::SquadRow;

/// Context containing the resources every view needs
#[derive(Clone)]
pub struct DashboardContext {
    pub league_id: LeagueId,
    pub client: FplClient,
    pub ownership: OwnershipResolver,
    pub squads: TtlCache<(LeagueId, Gameweek), Vec<SquadRow>>,
}

impl DashboardContext {
    pub fn new(league_id: LeagueId, config: DashboardConfig) -> Result<Self> {
        let client = FplClient::new(config)?;
        Ok(Self::with_client(league_id, client, Arc::new(SystemClock)))
    }

    /// Build every cache on top of `client`, timed by `clock`.
    pub fn with_client(league_id: LeagueId, client: FplClient, clock: Arc<dyn Clock>) -> Self {
        let capacity = client.config().cache_capacity;
        let ownership =
            OwnershipResolver::with_cache(client.clone(), TtlCache::with_clock(capacity, clock.clone()));
        Self {
            league_id,
            client,
            ownership,
            squads: TtlCache::with_clock(capacity, clock),
        }
    }

    /// The requested gameweek, else the game's current one.
    pub async fn gameweek(&self, requested: Option<Gameweek>) -> Gameweek {
        match requested {
            Some(gw) => gw,
            None => {
                let gw = self.client.current_gameweek().await;
                debug!(gw = %gw, "using current gameweek");
                gw
            }
        }
    }

    /// player -> owner name for `gw`.
    pub async fn owners(&self, gw: Gameweek, starters_only: bool) -> HashMap<PlayerId, String> {
        self.ownership
            .build_current_ownership_names(self.league_id, gw, starters_only)
            .await
    }

    pub fn log_cache_usage(&self) {
        let (responses, capacity) = self.client.cache().stats();
        info!(responses, capacity, squads = self.squads.len(), "cache usage");
    }
}

/// Re-run `render` every `interval` until interrupted. A single pass when
/// `interval` is `None`.
pub async fn run_with_refresh<F, Fut>(interval: Option<Duration>, mut render: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<()>>,
{
    let Some(interval) = interval else {
        return render().await;
    };
    let interval = interval.max(Duration::from_secs(1));
    loop {
        render().await?;
        info!(secs = interval.as_secs(), "waiting for next refresh");
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}
