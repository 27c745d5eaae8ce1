//! FPL API client
//!
//! Every read goes through one [`TtlCache`] keyed by [`Endpoint`]. A failed or
//! timed-out request never surfaces as an error: the caller gets the last good
//! response or the endpoint's empty fallback.

use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::{
    cli::types::{EntryId, Gameweek, LeagueId},
    config::{DashboardConfig, TtlPolicy},
    core::{build_client, CacheStatus, TtlCache},
    fpl::types::{
        decode_draft_choices, decode_fixtures, decode_live, decode_picks, Bootstrap, DraftChoice,
        Fixture, GameStatus, LeagueDetails, LiveStats, Pick,
    },
    FplError, Result,
};

/// An upstream read, identified by endpoint and arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    GameStatus,
    Bootstrap,
    Fixtures(Gameweek),
    LeagueDetails(LeagueId),
    DraftChoices(LeagueId),
    EntryEvent(EntryId, Gameweek),
    EventLive(Gameweek),
}

impl Endpoint {
    pub fn url(&self, config: &DashboardConfig) -> String {
        let draft = config.draft_base_url.trim_end_matches('/');
        let fantasy = config.fantasy_base_url.trim_end_matches('/');
        match self {
            Endpoint::GameStatus => format!("{draft}/game"),
            Endpoint::Bootstrap => format!("{draft}/bootstrap-static"),
            Endpoint::Fixtures(gw) => format!("{fantasy}/fixtures?event={gw}"),
            Endpoint::LeagueDetails(id) => format!("{draft}/league/{id}/details"),
            Endpoint::DraftChoices(id) => format!("{draft}/draft/league/{id}/choices"),
            Endpoint::EntryEvent(entry, gw) => format!("{draft}/entry/{entry}/event/{gw}"),
            Endpoint::EventLive(gw) => format!("{draft}/event/{gw}/live"),
        }
    }

    pub fn ttl(&self, policy: &TtlPolicy) -> Duration {
        match self {
            Endpoint::GameStatus => policy.game_status,
            Endpoint::Bootstrap => policy.bootstrap,
            Endpoint::Fixtures(_) => policy.fixtures,
            Endpoint::LeagueDetails(_) => policy.league_details,
            Endpoint::DraftChoices(_) => policy.draft_choices,
            Endpoint::EntryEvent(..) => policy.entry_picks,
            Endpoint::EventLive(_) => policy.event_live,
        }
    }

    /// What to hand back when the endpoint has never answered.
    pub fn fallback(&self) -> Value {
        match self {
            Endpoint::Fixtures(_) => json!([]),
            Endpoint::DraftChoices(_) => json!({ "choices": [] }),
            _ => json!({}),
        }
    }
}

/// Cached, fail-soft client for the Draft and Fantasy APIs.
#[derive(Clone)]
pub struct FplClient {
    http: Client,
    config: Arc<DashboardConfig>,
    responses: TtlCache<Endpoint, Value>,
}

impl FplClient {
    pub fn new(config: DashboardConfig) -> Result<Self> {
        let http = build_client(config.request_timeout)?;
        let responses = TtlCache::new(config.cache_capacity);
        Ok(Self::with_parts(http, config, responses))
    }

    /// Assemble a client from existing parts, e.g. a cache driven by a manual clock.
    pub fn with_parts(
        http: Client,
        config: DashboardConfig,
        responses: TtlCache<Endpoint, Value>,
    ) -> Self {
        Self {
            http,
            config: Arc::new(config),
            responses,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn cache(&self) -> &TtlCache<Endpoint, Value> {
        &self.responses
    }

    /// One uncached request, bounded by the configured timeout.
    pub async fn fetch_json(&self, endpoint: &Endpoint) -> Result<Value> {
        let url = endpoint.url(&self.config);
        let limit = self.config.request_timeout;
        debug!(%url, "GET");

        let request = async {
            self.http
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await
        };
        let value = tokio::time::timeout(limit, request)
            .await
            .map_err(|_| FplError::Timeout {
                url: url.clone(),
                secs: limit.as_secs(),
            })??;
        Ok(value)
    }

    /// Cached read of `endpoint`, with how it was served.
    pub async fn get_with_status(&self, endpoint: Endpoint) -> (Value, CacheStatus) {
        let ttl = endpoint.ttl(&self.config.ttl);
        let fallback = endpoint.fallback();
        self.responses
            .cached_call_with_status(endpoint.clone(), ttl, fallback, || {
                self.fetch_json(&endpoint)
            })
            .await
    }

    /// Cached read of `endpoint`.
    pub async fn get(&self, endpoint: Endpoint) -> Value {
        self.get_with_status(endpoint).await.0
    }

    pub async fn game_status(&self) -> GameStatus {
        GameStatus::from_value(&self.get(Endpoint::GameStatus).await)
    }

    /// The gameweek in progress according to `/game`, GW1 when unknown.
    pub async fn current_gameweek(&self) -> Gameweek {
        self.game_status().await.current_gameweek()
    }

    pub async fn bootstrap(&self) -> Bootstrap {
        Bootstrap::from_value(&self.get(Endpoint::Bootstrap).await)
    }

    pub async fn fixtures(&self, gw: Gameweek) -> Vec<Fixture> {
        decode_fixtures(&self.get(Endpoint::Fixtures(gw)).await)
    }

    pub async fn league_details(&self, league_id: LeagueId) -> LeagueDetails {
        LeagueDetails::from_value(&self.get(Endpoint::LeagueDetails(league_id)).await)
    }

    /// Legacy draft picks. Used for draft rank only; ownership comes from
    /// [`entry_picks`](Self::entry_picks).
    pub async fn draft_choices(&self, league_id: LeagueId, n_teams: usize) -> Vec<DraftChoice> {
        decode_draft_choices(&self.get(Endpoint::DraftChoices(league_id)).await, n_teams)
    }

    pub async fn entry_picks(&self, entry: EntryId, gw: Gameweek) -> Vec<Pick> {
        decode_picks(&self.get(Endpoint::EntryEvent(entry, gw)).await)
    }

    pub async fn event_live(&self, gw: Gameweek) -> LiveStats {
        decode_live(&self.get(Endpoint::EventLive(gw)).await)
    }
}
