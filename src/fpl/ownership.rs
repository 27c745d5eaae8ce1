//! Who owns which player in a gameweek.
//!
//! Ownership is read from each entry's gameweek picks
//! (`/entry/{id}/event/{gw}`), fetched concurrently with a bounded number of
//! requests in flight. The draft-choices endpoint is not consulted here.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

use crate::{
    cli::types::{EntryId, Gameweek, LeagueId, PlayerId},
    core::TtlCache,
    fpl::{
        http::FplClient,
        types::{LeagueDetails, Pick},
    },
    FplError,
};

#[cfg(test)]
mod tests;

/// player -> owning entry
pub type OwnershipMap = HashMap<PlayerId, EntryId>;

/// (league, gameweek, starters only)
pub type OwnershipKey = (LeagueId, Gameweek, bool);

/// Shown when a player's owner has no known name.
pub const UNKNOWN_OWNER: &str = "—";

/// Resolves gameweek ownership for a league, caching each map for the
/// ownership ttl.
#[derive(Clone)]
pub struct OwnershipResolver {
    client: FplClient,
    maps: TtlCache<OwnershipKey, OwnershipMap>,
}

impl OwnershipResolver {
    pub fn new(client: FplClient) -> Self {
        let maps = TtlCache::new(client.config().cache_capacity);
        Self { client, maps }
    }

    /// Use an existing cache, e.g. one driven by a manual clock.
    pub fn with_cache(client: FplClient, maps: TtlCache<OwnershipKey, OwnershipMap>) -> Self {
        Self { client, maps }
    }

    pub fn client(&self) -> &FplClient {
        &self.client
    }

    /// player -> entry id for `gw`. With `starters_only`, benched picks
    /// (multiplier <= 0) are left out.
    ///
    /// Entries whose picks cannot be fetched contribute nothing. When the
    /// league itself has no entries the empty map is returned without being
    /// cached.
    pub async fn build_current_ownership(
        &self,
        league_id: LeagueId,
        gw: Gameweek,
        starters_only: bool,
    ) -> OwnershipMap {
        let ttl = self.client.config().ttl.ownership;
        self.maps
            .cached_call(
                (league_id, gw, starters_only),
                ttl,
                OwnershipMap::new(),
                || self.resolve(league_id, gw, starters_only),
            )
            .await
    }

    /// player -> owning entry's name, [`UNKNOWN_OWNER`] when the entry has none.
    pub async fn build_current_ownership_names(
        &self,
        league_id: LeagueId,
        gw: Gameweek,
        starters_only: bool,
    ) -> HashMap<PlayerId, String> {
        let ids = self
            .build_current_ownership(league_id, gw, starters_only)
            .await;
        let details = self.client.league_details(league_id).await;
        owner_names(&ids, &details)
    }

    async fn resolve(
        &self,
        league_id: LeagueId,
        gw: Gameweek,
        starters_only: bool,
    ) -> Result<OwnershipMap, FplError> {
        let details = self.client.league_details(league_id).await;
        let entries: Vec<EntryId> = details
            .league_entries
            .iter()
            .filter_map(|e| e.entry_id)
            .collect();
        if entries.is_empty() {
            return Err(FplError::NoData);
        }

        let squads = self.fetch_squads(&entries, gw).await;
        let map = collect_ownership(squads, starters_only);
        info!(
            league = %league_id,
            gw = %gw,
            entries = entries.len(),
            owned = map.len(),
            "resolved ownership"
        );
        Ok(map)
    }

    /// Every entry's picks for `gw`, at most `max_concurrent_requests` in flight.
    pub async fn fetch_squads(&self, entries: &[EntryId], gw: Gameweek) -> Vec<(EntryId, Vec<Pick>)> {
        let limit = self.client.config().request_timeout;
        let max_concurrent = self.client.config().max_concurrent_requests.max(1);

        stream::iter(entries.iter().copied())
            .map(|entry| {
                let client = self.client.clone();
                async move {
                    match tokio::time::timeout(limit, client.entry_picks(entry, gw)).await {
                        Ok(picks) => (entry, picks),
                        Err(_) => {
                            warn!(%entry, gw = %gw, "picks request timed out");
                            (entry, Vec::new())
                        }
                    }
                }
            })
            .buffer_unordered(max_concurrent)
            .collect()
            .await
    }
}

/// Merge per-entry picks into one ownership map.
///
/// Picks without an integer multiplier are skipped, as are benched picks when
/// `starters_only` is set. Entries are applied in id order so a player listed
/// by two entries always resolves to the higher id.
pub fn collect_ownership(mut squads: Vec<(EntryId, Vec<Pick>)>, starters_only: bool) -> OwnershipMap {
    squads.sort_by_key(|(entry, _)| *entry);

    let mut map = OwnershipMap::new();
    for (entry, picks) in squads {
        for pick in picks {
            let Some(multiplier) = pick.multiplier else {
                debug!(%entry, player = %pick.element, "skipping pick without multiplier");
                continue;
            };
            if starters_only && multiplier <= 0 {
                continue;
            }
            map.insert(pick.element, entry);
        }
    }
    map
}

/// Attach entry names to an ownership map.
pub fn owner_names(ownership: &OwnershipMap, details: &LeagueDetails) -> HashMap<PlayerId, String> {
    let entries = details.entries_by_entry_id();
    ownership
        .iter()
        .map(|(player, entry)| {
            let name = entries
                .get(entry)
                .and_then(|e| e.entry_name.clone())
                .unwrap_or_else(|| UNKNOWN_OWNER.to_string());
            (*player, name)
        })
        .collect()
}

/// Where a pick sits in its entry's lineup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineupSlot {
    Starting,
    /// Bench order 1..=4
    Bench(u8),
    /// Benched, order unknown
    BenchUnordered,
    Unknown,
}

impl LineupSlot {
    /// Sort key: starters first, then bench order, unknown last.
    pub fn rank(&self) -> u8 {
        match self {
            LineupSlot::Starting => 0,
            LineupSlot::Bench(n) => *n,
            LineupSlot::BenchUnordered | LineupSlot::Unknown => 9,
        }
    }
}

impl fmt::Display for LineupSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineupSlot::Starting => write!(f, "XI"),
            LineupSlot::Bench(n) => write!(f, "Bench {n}"),
            LineupSlot::BenchUnordered => write!(f, "Bench ?"),
            LineupSlot::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Classify a pick from its multiplier and lineup position. The position wins
/// when it is in range; otherwise the multiplier decides.
pub fn compute_slot(multiplier: Option<i64>, position: Option<i64>) -> LineupSlot {
    match position {
        Some(1..=11) => return LineupSlot::Starting,
        Some(p @ 12..=15) => return LineupSlot::Bench((p - 11) as u8),
        _ => {}
    }
    match multiplier {
        Some(m) if m > 0 => LineupSlot::Starting,
        Some(0) => LineupSlot::BenchUnordered,
        _ => LineupSlot::Unknown,
    }
}
