//! Raw ownership dump

use serde::Serialize;
use tracing::info;

use crate::{
    fpl::{
        ownership::{owner_names, OwnershipMap},
        types::{Bootstrap, LeagueDetails},
    },
    EntryId, Gameweek, PlayerId, Result,
};

use super::{common::DashboardContext, print_json, render_table, EMPTY_CELL};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipRow {
    pub player_id: PlayerId,
    pub player: String,
    pub entry_id: EntryId,
    pub owner: String,
}

/// One row per owned player, grouped by owner then player name.
pub fn ownership_rows(
    ownership: &OwnershipMap,
    details: &LeagueDetails,
    bootstrap: &Bootstrap,
) -> Vec<OwnershipRow> {
    let names = owner_names(ownership, details);
    let elements = bootstrap.elements_by_id();

    let mut rows: Vec<OwnershipRow> = ownership
        .iter()
        .map(|(player, entry)| OwnershipRow {
            player_id: *player,
            player: elements
                .get(player)
                .map(|e| e.display_name())
                .unwrap_or_else(|| format!("Player {player}")),
            entry_id: *entry,
            owner: names
                .get(player)
                .cloned()
                .unwrap_or_else(|| EMPTY_CELL.to_string()),
        })
        .collect();
    rows.sort_by(|a, b| a.owner.cmp(&b.owner).then(a.player.cmp(&b.player)));
    rows
}

/// Handle the `ownership` command
pub async fn handle_ownership(
    ctx: &DashboardContext,
    gameweek: Option<Gameweek>,
    starters_only: bool,
    as_json: bool,
) -> Result<()> {
    let gw = ctx.gameweek(gameweek).await;
    let ownership = ctx
        .ownership
        .build_current_ownership(ctx.league_id, gw, starters_only)
        .await;
    let (details, bootstrap) = tokio::join!(
        ctx.client.league_details(ctx.league_id),
        ctx.client.bootstrap()
    );
    let rows = ownership_rows(&ownership, &details, &bootstrap);
    info!(gw = %gw, starters_only, owned = rows.len(), "ownership");

    if as_json {
        return print_json(&rows);
    }
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.player_id.to_string(),
                r.player.clone(),
                r.owner.clone(),
                r.entry_id.to_string(),
            ]
        })
        .collect();
    println!("{}", render_table(&["ID", "Player", "Owner", "Entry"], &table)); // tarpaulin::skip
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_sorted_by_owner_then_player() {
        let details = LeagueDetails::from_value(&json!({
            "league_entries": [
                {"id": 1, "entry_id": 101, "entry_name": "Bravo"},
                {"id": 2, "entry_id": 102, "entry_name": "Alpha"}
            ]
        }));
        let bootstrap = Bootstrap::from_value(&json!({
            "elements": [
                {"id": 1, "web_name": "Saka", "team": 1, "element_type": 3},
                {"id": 2, "web_name": "Rice", "team": 1, "element_type": 3},
                {"id": 3, "web_name": "Isak", "team": 2, "element_type": 4}
            ]
        }));
        let ownership: OwnershipMap = [
            (PlayerId::new(1), EntryId::new(101)),
            (PlayerId::new(2), EntryId::new(102)),
            (PlayerId::new(3), EntryId::new(102)),
            (PlayerId::new(4), EntryId::new(101)),
        ]
        .into_iter()
        .collect();

        let rows = ownership_rows(&ownership, &details, &bootstrap);
        let got: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.owner.as_str(), r.player.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Alpha", "Isak"),
                ("Alpha", "Rice"),
                ("Bravo", "Player 4"),
                ("Bravo", "Saka")
            ]
        );
    }
}
