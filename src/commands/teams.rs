//! Per-entry squads for a gameweek

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::{
    fpl::{
        ownership::{compute_slot, LineupSlot},
        types::{Bootstrap, DraftChoice, LeagueDetails, LiveStats, Pick},
    },
    EntryId, FplError, Gameweek, LeagueEntryId, PlayerId, Position, Result,
};

use super::{cell, common::DashboardContext, print_json, render_table, EMPTY_CELL};

/// One owned player in an entry's squad
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SquadRow {
    pub player_id: PlayerId,
    pub name: String,
    pub position: String,
    pub club: String,
    pub draft_rank: Option<u32>,
    pub owner: String,
    pub entry_id: EntryId,
    pub slot: LineupSlot,
    pub minutes: i64,
    pub points: i64,
    pub contributions: String,
}

impl SquadRow {
    fn position_order(&self) -> u8 {
        self.position
            .parse::<Position>()
            .map(|p| p.sort_order())
            .unwrap_or(99)
    }
}

/// Head-to-head line with the entry always on the left
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreLine {
    pub team: String,
    pub score: i64,
    pub opponent_score: i64,
    pub opponent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamView {
    pub name: String,
    pub gw_points: Option<i64>,
    pub score_line: Option<ScoreLine>,
    pub players: Vec<SquadRow>,
}

/// One row per pick of every entry, with draft rank, lineup slot and live
/// minutes/points.
pub fn build_squad_table(
    details: &LeagueDetails,
    bootstrap: &Bootstrap,
    choices: &[DraftChoice],
    squads: &[(EntryId, Vec<Pick>)],
    live: &LiveStats,
) -> Vec<SquadRow> {
    let entries = details.entries_by_entry_id();
    let elements = bootstrap.elements_by_id();
    let draft_rank: HashMap<PlayerId, u32> = choices
        .iter()
        .filter_map(|c| c.rank.map(|r| (c.element, r)))
        .collect();

    squads
        .iter()
        .flat_map(|(entry_id, picks)| {
            let owner = entries
                .get(entry_id)
                .map(|e| e.name())
                .unwrap_or_else(|| EMPTY_CELL.to_string());
            picks.iter().map(move |pick| (*entry_id, owner.clone(), *pick))
        })
        .map(|(entry_id, owner, pick)| {
            let element = elements.get(&pick.element);
            let stats = live.get(&pick.element);
            SquadRow {
                player_id: pick.element,
                name: element
                    .map(|e| e.display_name())
                    .unwrap_or_else(|| format!("Player {}", pick.element)),
                position: element
                    .map(|e| bootstrap.position_name(e.element_type))
                    .unwrap_or_default(),
                club: element
                    .map(|e| bootstrap.team_short_name(e.team))
                    .unwrap_or_default(),
                draft_rank: draft_rank.get(&pick.element).copied(),
                owner,
                entry_id,
                slot: compute_slot(pick.multiplier, pick.position),
                minutes: stats.map(|s| s.minutes).unwrap_or(0),
                points: stats.map(|s| s.total_points).unwrap_or(0),
                contributions: stats
                    .map(|s| s.contributions().join(" "))
                    .unwrap_or_else(|| EMPTY_CELL.to_string()),
            }
        })
        .collect()
}

/// Group squad rows by owner (alphabetical), each sorted by lineup slot, then
/// position, then name, and attach the owner's head-to-head line for `gw`.
pub fn group_by_team(rows: &[SquadRow], details: &LeagueDetails, gw: Gameweek) -> Vec<TeamView> {
    let names = details.names_by_league_entry();
    let league_entry_of: HashMap<&str, LeagueEntryId> = details
        .league_entries
        .iter()
        .filter_map(|e| e.entry_name.as_deref().map(|n| (n, e.id)))
        .collect();
    let matches = details.matches_for(gw);

    let mut owners: Vec<&str> = rows.iter().map(|r| r.owner.as_str()).collect();
    owners.sort_unstable();
    owners.dedup();

    owners
        .into_iter()
        .map(|owner| {
            let mut players: Vec<SquadRow> =
                rows.iter().filter(|r| r.owner == owner).cloned().collect();
            players.sort_by(|a, b| {
                a.slot
                    .rank()
                    .cmp(&b.slot.rank())
                    .then(a.position_order().cmp(&b.position_order()))
                    .then(a.name.cmp(&b.name))
            });

            let fixture = league_entry_of
                .get(owner)
                .and_then(|id| matches.iter().find(|m| m.involves(*id)).map(|m| (*id, m)));
            let score_line = fixture.map(|(id, m)| {
                let (score, opponent, opponent_score) = m.from_side_of(id);
                ScoreLine {
                    team: owner.to_string(),
                    score,
                    opponent_score,
                    opponent: names
                        .get(&opponent)
                        .cloned()
                        .unwrap_or_else(|| EMPTY_CELL.to_string()),
                }
            });

            TeamView {
                name: owner.to_string(),
                gw_points: score_line.as_ref().map(|s| s.score),
                score_line,
                players,
            }
        })
        .collect()
}

impl DashboardContext {
    /// The squad table for `gw`, cached for the squad-table ttl.
    pub async fn squad_table(&self, gw: Gameweek) -> Vec<SquadRow> {
        let ttl = self.client.config().ttl.squad_table;
        self.squads
            .cached_call((self.league_id, gw), ttl, Vec::new(), move || async move {
                let details = self.client.league_details(self.league_id).await;
                let entries: Vec<EntryId> = details
                    .league_entries
                    .iter()
                    .filter_map(|e| e.entry_id)
                    .collect();
                if entries.is_empty() {
                    return Err(FplError::NoData);
                }
                let (bootstrap, choices, live, squads) = tokio::join!(
                    self.client.bootstrap(),
                    self.client.draft_choices(self.league_id, entries.len()),
                    self.client.event_live(gw),
                    self.ownership.fetch_squads(&entries, gw),
                );
                let rows = build_squad_table(&details, &bootstrap, &choices, &squads, &live);
                debug!(gw = %gw, rows = rows.len(), "built squad table");
                Ok(rows)
            })
            .await
    }
}

/// Handle the `teams` command
pub async fn handle_teams(
    ctx: &DashboardContext,
    gameweek: Option<Gameweek>,
    team: Option<&str>,
    as_json: bool,
) -> Result<()> {
    let gw = ctx.gameweek(gameweek).await;
    let rows = ctx.squad_table(gw).await;
    let details = ctx.client.league_details(ctx.league_id).await;

    let mut views = group_by_team(&rows, &details, gw);
    if let Some(wanted) = team {
        let wanted = wanted.to_lowercase();
        views.retain(|v| v.name.to_lowercase().contains(&wanted));
    }
    info!(gw = %gw, teams = views.len(), "teams view");

    if as_json {
        return print_json(&views);
    }
    println!("Teams - GW{gw}"); // tarpaulin::skip
    println!("{}", render_teams(&views)); // tarpaulin::skip
    Ok(())
}

pub fn render_teams(views: &[TeamView]) -> String {
    if views.is_empty() {
        return "No data.".to_string();
    }
    let mut out = Vec::new();
    for v in views {
        out.push(String::new());
        out.push(format!("{} - GW Points: {}", v.name, cell(v.gw_points)));
        if let Some(s) = &v.score_line {
            out.push(format!(
                "{} {} - {} {}",
                s.team, s.score, s.opponent_score, s.opponent
            ));
        }
        let rows: Vec<Vec<String>> = v
            .players
            .iter()
            .map(|p| {
                vec![
                    p.name.clone(),
                    p.position.clone(),
                    p.club.clone(),
                    cell(p.draft_rank),
                    p.owner.clone(),
                    p.slot.to_string(),
                    p.minutes.to_string(),
                    p.points.to_string(),
                    p.contributions.clone(),
                ]
            })
            .collect();
        out.push(render_table(
            &[
                "Player", "Pos", "Club", "Draft Rank", "Owner", "Slot", "Minutes", "GW Pts",
                "Contribs",
            ],
            &rows,
        ));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fpl::types::MatchStats;
    use serde_json::json;

    fn details() -> LeagueDetails {
        LeagueDetails::from_value(&json!({
            "league_entries": [
                {"id": 1, "entry_id": 101, "entry_name": "Alpha"},
                {"id": 2, "entry_id": 102, "entry_name": "Bravo"}
            ],
            "matches": [
                {"event": 3, "league_entry_1": 1, "league_entry_1_points": 41,
                 "league_entry_2": 2, "league_entry_2_points": 38, "started": true}
            ]
        }))
    }

    fn bootstrap() -> Bootstrap {
        Bootstrap::from_value(&json!({
            "elements": [
                {"id": 1, "web_name": "Raya", "team": 1, "element_type": 1},
                {"id": 2, "web_name": "Saliba", "team": 1, "element_type": 2},
                {"id": 3, "web_name": "Saka", "team": 1, "element_type": 3},
                {"id": 4, "web_name": "Haaland", "team": 2, "element_type": 4},
                {"id": 5, "web_name": "Gabriel", "team": 1, "element_type": 2}
            ],
            "teams": [
                {"id": 1, "name": "Arsenal", "short_name": "ARS"},
                {"id": 2, "name": "Man City", "short_name": "MCI"}
            ],
            "element_types": [
                {"id": 1, "singular_name_short": "GKP"},
                {"id": 2, "singular_name_short": "DEF"},
                {"id": 3, "singular_name_short": "MID"},
                {"id": 4, "singular_name_short": "FWD"}
            ]
        }))
    }

    fn pick(element: u32, position: i64, multiplier: i64) -> Pick {
        Pick {
            element: PlayerId::new(element),
            position: Some(position),
            multiplier: Some(multiplier),
        }
    }

    fn squads() -> Vec<(EntryId, Vec<Pick>)> {
        vec![
            (
                EntryId::new(101),
                vec![pick(4, 1, 1), pick(3, 12, 0), pick(5, 2, 1), pick(2, 3, 1), pick(1, 4, 1)],
            ),
            (EntryId::new(102), vec![pick(99, 1, 1)]),
        ]
    }

    #[test]
    fn test_squad_rows() {
        let choices = vec![DraftChoice {
            element: PlayerId::new(4),
            rank: Some(1),
        }];
        let live: LiveStats = [(
            PlayerId::new(4),
            MatchStats {
                minutes: 90,
                goals_scored: 2,
                total_points: 13,
                ..MatchStats::default()
            },
        )]
        .into_iter()
        .collect();

        let rows = build_squad_table(&details(), &bootstrap(), &choices, &squads(), &live);
        assert_eq!(rows.len(), 6);

        let haaland = &rows[0];
        assert_eq!(haaland.owner, "Alpha");
        assert_eq!(haaland.draft_rank, Some(1));
        assert_eq!(haaland.slot, LineupSlot::Starting);
        assert_eq!(haaland.points, 13);
        assert_eq!(haaland.contributions, "min+90 g+2");

        let saka = &rows[1];
        assert_eq!(saka.slot, LineupSlot::Bench(1));
        assert_eq!(saka.contributions, EMPTY_CELL);
        assert_eq!(saka.draft_rank, None);

        let unknown = &rows[5];
        assert_eq!(unknown.name, "Player 99");
        assert_eq!(unknown.owner, "Bravo");
        assert_eq!(unknown.position, "");
    }

    #[test]
    fn test_group_sorts_slot_position_name() {
        let rows = build_squad_table(&details(), &bootstrap(), &[], &squads(), &LiveStats::new());
        let views = group_by_team(&rows, &details(), Gameweek::new(3));

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].name, "Alpha");
        let order: Vec<&str> = views[0].players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(order, vec!["Raya", "Gabriel", "Saliba", "Haaland", "Saka"]);

        assert_eq!(views[0].gw_points, Some(41));
        let line = views[1].score_line.as_ref().unwrap();
        assert_eq!(line.team, "Bravo");
        assert_eq!(line.score, 38);
        assert_eq!(line.opponent_score, 41);
        assert_eq!(line.opponent, "Alpha");
    }

    #[test]
    fn test_no_match_this_week() {
        let rows = build_squad_table(&details(), &bootstrap(), &[], &squads(), &LiveStats::new());
        let views = group_by_team(&rows, &details(), Gameweek::new(4));
        assert!(views.iter().all(|v| v.score_line.is_none() && v.gw_points.is_none()));

        let text = render_teams(&views);
        assert!(text.contains("Alpha - GW Points: —"));
        assert_eq!(render_teams(&[]), "No data.");
    }
}
