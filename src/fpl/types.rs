//! Shapes of the FPL Draft and FPL API responses.
//!
//! Everything is decoded one record at a time from `serde_json::Value`, so a
//! single malformed player, pick or fixture is dropped (with a `debug!` event)
//! without losing the rest of the response.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::cli::types::{EntryId, Gameweek, LeagueEntryId, PlayerId, Position, TeamId};


/// Decode every element of a JSON array that fits `T`, skipping the rest.
pub fn decode_list<T: DeserializeOwned>(value: Option<&Value>, what: &str) -> Vec<T> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                debug!(what, error = %e, "skipping malformed record");
                None
            }
        })
        .collect()
}

/// Read an integer that may arrive as a number or a numeric string.
pub fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a statistic; anything missing or non-numeric counts as zero.
pub fn stat_value(stats: &Map<String, Value>, key: &str) -> i64 {
    match stats.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(|f| f.trunc() as i64).unwrap_or(0),
        _ => 0,
    }
}

/// `/game`: season progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameStatus {
    pub current_event: Option<u16>,
    pub current_event_finished: Option<bool>,
    pub next_event: Option<u16>,
    pub processing_status: Option<String>,
    pub waivers_processed: Option<bool>,
}

impl GameStatus {
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_else(|e| {
            debug!(error = %e, "unreadable game status");
            Self::default()
        })
    }

    /// The gameweek in progress, or GW1 before the season starts.
    pub fn current_gameweek(&self) -> Gameweek {
        self.current_event.map(Gameweek::new).unwrap_or_default()
    }
}

/// A Premier League club
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Team {
    pub id: TeamId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_name: String,
}

/// Position metadata (`element_types`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ElementType {
    pub id: u8,
    #[serde(default)]
    pub singular_name_short: String,
}

/// A player (`elements`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Element {
    pub id: PlayerId,
    #[serde(default)]
    pub web_name: String,
    pub team: TeamId,
    pub element_type: u8,
}

impl Element {
    pub fn position(&self) -> Option<Position> {
        Position::from_element_type(self.element_type).ok()
    }

    pub fn display_name(&self) -> String {
        if self.web_name.is_empty() {
            format!("Player {}", self.id)
        } else {
            self.web_name.clone()
        }
    }
}

/// `/bootstrap-static`: players, clubs, positions.
#[derive(Debug, Clone, Default)]
pub struct Bootstrap {
    pub elements: Vec<Element>,
    pub teams: Vec<Team>,
    pub element_types: Vec<ElementType>,
}

impl Bootstrap {
    pub fn from_value(value: &Value) -> Self {
        Self {
            elements: decode_list(value.get("elements"), "element"),
            teams: decode_list(value.get("teams"), "team"),
            element_types: decode_list(value.get("element_types"), "element_type"),
        }
    }

    pub fn elements_by_id(&self) -> HashMap<PlayerId, &Element> {
        self.elements.iter().map(|e| (e.id, e)).collect()
    }

    pub fn teams_by_id(&self) -> HashMap<TeamId, &Team> {
        self.teams.iter().map(|t| (t.id, t)).collect()
    }

    pub fn team_short_name(&self, id: TeamId) -> String {
        self.teams
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.short_name.clone())
            .unwrap_or_default()
    }

    pub fn team_name(&self, id: TeamId) -> String {
        self.teams
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Team {id}"))
    }

    /// Short position label for an `element_type`, "" when unknown.
    pub fn position_name(&self, element_type: u8) -> String {
        self.element_types
            .iter()
            .find(|et| et.id == element_type)
            .map(|et| et.singular_name_short.clone())
            .unwrap_or_default()
    }
}

/// Where a fixture stands relative to now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FixtureStatus {
    Finished,
    InPlay,
    NotStarted,
    Unknown,
}

impl std::fmt::Display for FixtureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FixtureStatus::Finished => "Finished",
            FixtureStatus::InPlay => "In play",
            FixtureStatus::NotStarted => "Not started",
            FixtureStatus::Unknown => "—",
        };
        write!(f, "{}", s)
    }
}

/// A Premier League fixture (`/fixtures?event=N`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Fixture {
    pub id: u32,
    #[serde(default)]
    pub event: Option<u16>,
    pub team_h: TeamId,
    pub team_a: TeamId,
    #[serde(default)]
    pub team_h_score: Option<u32>,
    #[serde(default)]
    pub team_a_score: Option<u32>,
    #[serde(default)]
    pub kickoff_time: Option<String>,
    #[serde(default)]
    pub started: Option<bool>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub finished_provisional: bool,
}

impl Fixture {
    pub fn kickoff(&self) -> Option<DateTime<Utc>> {
        let raw = self.kickoff_time.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.team_h == team || self.team_a == team
    }

    pub fn opponent_of(&self, team: TeamId) -> TeamId {
        if self.team_h == team {
            self.team_a
        } else {
            self.team_h
        }
    }

    /// Whether play has begun, falling back to the kickoff time when the
    /// `started` flag is absent.
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        match self.started {
            Some(started) => started,
            None => self.kickoff().is_some_and(|k| now >= k),
        }
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> FixtureStatus {
        if self.finished {
            return FixtureStatus::Finished;
        }
        match self.kickoff() {
            Some(kickoff) if now < kickoff => FixtureStatus::NotStarted,
            Some(_) => FixtureStatus::InPlay,
            None => FixtureStatus::Unknown,
        }
    }
}

/// Human kickoff time, e.g. `Sat 16 Aug, 15:00 UTC`. Unparseable input is
/// returned unchanged.
pub fn format_kickoff(iso_utc: Option<&str>) -> String {
    let Some(raw) = iso_utc.filter(|s| !s.is_empty()) else {
        return String::new();
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt
            .with_timezone(&Utc)
            .format("%a %d %b, %H:%M UTC")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn decode_fixtures(value: &Value) -> Vec<Fixture> {
    decode_list(Some(value), "fixture")
}

/// League header inside `/league/{id}/details`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct League {
    pub id: Option<u32>,
    pub name: String,
    pub draft_status: Option<String>,
    pub max_entries: Option<u32>,
    pub scoring: Option<String>,
    pub trades: Option<String>,
}

/// One team in the league
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LeagueEntry {
    pub id: LeagueEntryId,
    #[serde(default)]
    pub entry_id: Option<EntryId>,
    #[serde(default)]
    pub entry_name: Option<String>,
    #[serde(default)]
    pub waiver_pick: Option<u32>,
}

impl LeagueEntry {
    pub fn name(&self) -> String {
        self.entry_name.clone().unwrap_or_else(|| "(TBD)".to_string())
    }
}

/// A head-to-head match between two league entries
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct H2hMatch {
    pub event: u16,
    pub league_entry_1: LeagueEntryId,
    #[serde(default)]
    pub league_entry_1_points: i64,
    pub league_entry_2: LeagueEntryId,
    #[serde(default)]
    pub league_entry_2_points: i64,
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub finished: bool,
}

impl H2hMatch {
    pub fn involves(&self, entry: LeagueEntryId) -> bool {
        self.league_entry_1 == entry || self.league_entry_2 == entry
    }

    /// (own points, opponent, opponent points) from `entry`'s side.
    pub fn from_side_of(&self, entry: LeagueEntryId) -> (i64, LeagueEntryId, i64) {
        if self.league_entry_1 == entry {
            (
                self.league_entry_1_points,
                self.league_entry_2,
                self.league_entry_2_points,
            )
        } else {
            (
                self.league_entry_2_points,
                self.league_entry_1,
                self.league_entry_1_points,
            )
        }
    }
}

/// A standings row
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Standing {
    pub league_entry: LeagueEntryId,
    #[serde(default)]
    pub matches_won: u32,
    #[serde(default)]
    pub matches_drawn: u32,
    #[serde(default)]
    pub matches_lost: u32,
    #[serde(default)]
    pub points_for: i64,
    #[serde(default)]
    pub points_against: i64,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub rank: Option<u32>,
}

/// `/league/{id}/details`
#[derive(Debug, Clone, Default)]
pub struct LeagueDetails {
    pub league: League,
    pub league_entries: Vec<LeagueEntry>,
    pub matches: Vec<H2hMatch>,
    pub standings: Vec<Standing>,
}

impl LeagueDetails {
    pub fn from_value(value: &Value) -> Self {
        let league = value
            .get("league")
            .and_then(|v| League::deserialize(v).ok())
            .unwrap_or_default();
        Self {
            league,
            league_entries: decode_list(value.get("league_entries"), "league_entry"),
            matches: decode_list(value.get("matches"), "match"),
            standings: decode_list(value.get("standings"), "standing"),
        }
    }

    /// entry id -> league entry, for entries that have joined.
    pub fn entries_by_entry_id(&self) -> HashMap<EntryId, &LeagueEntry> {
        self.league_entries
            .iter()
            .filter_map(|e| e.entry_id.map(|id| (id, e)))
            .collect()
    }

    /// league-local id -> display name
    pub fn names_by_league_entry(&self) -> HashMap<LeagueEntryId, String> {
        self.league_entries
            .iter()
            .map(|e| (e.id, e.name()))
            .collect()
    }

    pub fn matches_for(&self, gw: Gameweek) -> Vec<&H2hMatch> {
        self.matches
            .iter()
            .filter(|m| m.event == gw.as_u16())
            .collect()
    }

    /// The earliest gameweek with a started match, if any.
    pub fn active_gameweek(&self) -> Option<Gameweek> {
        self.matches
            .iter()
            .filter(|m| m.started)
            .map(|m| m.event)
            .min()
            .map(Gameweek::new)
    }
}

/// One player in an entry's squad for a gameweek
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pick {
    pub element: PlayerId,
    /// Lineup position, 1..=11 starting, 12..=15 bench
    pub position: Option<i64>,
    /// 0 benched, >0 scoring
    pub multiplier: Option<i64>,
}

impl Pick {
    /// A pick needs an integer element id; position and multiplier are kept
    /// only when they are integers.
    pub fn from_value(value: &Value) -> Option<Self> {
        let element = value
            .get("element")
            .and_then(as_int)
            .and_then(|id| u32::try_from(id).ok())
            .map(PlayerId::new)?;
        Some(Self {
            element,
            position: value.get("position").and_then(as_int),
            multiplier: value.get("multiplier").and_then(as_int),
        })
    }
}

/// Picks out of `/entry/{id}/event/{gw}`
pub fn decode_picks(value: &Value) -> Vec<Pick> {
    let Some(items) = value.get("picks").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let pick = Pick::from_value(item);
            if pick.is_none() {
                debug!(?item, "skipping pick without integer element id");
            }
            pick
        })
        .collect()
}

/// One row of the legacy draft-choices endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DraftChoice {
    pub element: PlayerId,
    /// Overall pick number, when derivable
    pub rank: Option<u32>,
}

/// Decode `/draft/league/{id}/choices`, deriving each player's overall pick
/// number from `choice`/`pick`/`draft_number`, or from round and pick within
/// the round when only those are present.
pub fn decode_draft_choices(value: &Value, n_teams: usize) -> Vec<DraftChoice> {
    let Some(items) = value.get("choices").and_then(Value::as_array) else {
        return Vec::new();
    };
    let n_teams = n_teams.max(1) as i64;
    let positive = |key: &str, item: &Value| item.get(key).and_then(as_int).filter(|v| *v > 0);

    items
        .iter()
        .filter_map(|item| {
            let element = item
                .get("element")
                .and_then(as_int)
                .and_then(|id| u32::try_from(id).ok())
                .map(PlayerId::new)?;
            let explicit = positive("choice", item)
                .or_else(|| positive("pick", item))
                .or_else(|| positive("draft_number", item));
            let derived = || {
                let round = positive("round", item)?;
                let in_round = positive("pick", item)
                    .or_else(|| positive("selection", item))
                    .or_else(|| positive("overall_pick", item))?;
                (round - 1).checked_mul(n_teams)?.checked_add(in_round)
            };
            let rank = explicit
                .or_else(derived)
                .and_then(|r| u32::try_from(r).ok());
            Some(DraftChoice { element, rank })
        })
        .collect()
}

/// Raw per-fixture statistics for one player. Missing or non-numeric values
/// read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    pub minutes: i64,
    pub goals_scored: i64,
    pub assists: i64,
    pub clean_sheets: i64,
    pub goals_conceded: i64,
    pub own_goals: i64,
    pub penalties_saved: i64,
    pub penalties_missed: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
    pub saves: i64,
    pub bonus: i64,
    pub bps: i64,
    pub defensive_contribution: i64,
    pub total_points: i64,
}

/// Display order and short labels for contribution summaries.
const CONTRIBUTION_LABELS: [(&str, &str); 13] = [
    ("goals_scored", "g"),
    ("assists", "a"),
    ("clean_sheets", "cs"),
    ("goals_conceded", "gc"),
    ("yellow_cards", "yc"),
    ("red_cards", "rc"),
    ("saves", "saves"),
    ("bonus", "b"),
    ("bps", "bps"),
    ("defensive_contribution", "def"),
    ("penalties_saved", "ps"),
    ("penalties_missed", "pm"),
    ("own_goals", "og"),
];

impl MatchStats {
    pub fn from_map(stats: &Map<String, Value>) -> Self {
        Self {
            minutes: stat_value(stats, "minutes"),
            goals_scored: stat_value(stats, "goals_scored"),
            assists: stat_value(stats, "assists"),
            clean_sheets: stat_value(stats, "clean_sheets"),
            goals_conceded: stat_value(stats, "goals_conceded"),
            own_goals: stat_value(stats, "own_goals"),
            penalties_saved: stat_value(stats, "penalties_saved"),
            penalties_missed: stat_value(stats, "penalties_missed"),
            yellow_cards: stat_value(stats, "yellow_cards"),
            red_cards: stat_value(stats, "red_cards"),
            saves: stat_value(stats, "saves"),
            bonus: stat_value(stats, "bonus"),
            bps: stat_value(stats, "bps"),
            defensive_contribution: stat_value(stats, "defensive_contribution"),
            total_points: stat_value(stats, "total_points"),
        }
    }

    pub fn from_value(value: &Value) -> Self {
        value.as_object().map(Self::from_map).unwrap_or_default()
    }

    fn by_key(&self, key: &str) -> i64 {
        match key {
            "minutes" => self.minutes,
            "goals_scored" => self.goals_scored,
            "assists" => self.assists,
            "clean_sheets" => self.clean_sheets,
            "goals_conceded" => self.goals_conceded,
            "own_goals" => self.own_goals,
            "penalties_saved" => self.penalties_saved,
            "penalties_missed" => self.penalties_missed,
            "yellow_cards" => self.yellow_cards,
            "red_cards" => self.red_cards,
            "saves" => self.saves,
            "bonus" => self.bonus,
            "bps" => self.bps,
            "defensive_contribution" => self.defensive_contribution,
            "total_points" => self.total_points,
            _ => 0,
        }
    }

    /// `min+90 g+1 a+1 ...`: minutes first, then every non-zero stat.
    pub fn contributions(&self) -> Vec<String> {
        let mut out = vec![format!("min+{}", self.minutes)];
        out.extend(
            CONTRIBUTION_LABELS
                .iter()
                .filter_map(|(key, label)| match self.by_key(key) {
                    0 => None,
                    v => Some(format!("{label}+{v}")),
                }),
        );
        out
    }
}

/// One player's statistics for one gameweek, tied to a known position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerStatLine {
    pub player: PlayerId,
    pub position: Position,
    pub stats: MatchStats,
}

/// Live statistics for a gameweek, keyed by player
pub type LiveStats = HashMap<PlayerId, MatchStats>;

/// Decode `/event/{gw}/live`. `elements` arrives either as an object keyed by
/// player id or as a list of `{id, stats}` objects.
pub fn decode_live(value: &Value) -> LiveStats {
    let mut out = LiveStats::new();
    match value.get("elements") {
        Some(Value::Object(by_id)) => {
            for (key, entry) in by_id {
                let Ok(id) = key.parse::<PlayerId>() else {
                    debug!(key, "skipping live element with non-integer id");
                    continue;
                };
                out.insert(id, entry.get("stats").map(MatchStats::from_value).unwrap_or_default());
            }
        }
        Some(Value::Array(items)) => {
            for entry in items {
                let Some(id) = entry
                    .get("id")
                    .and_then(as_int)
                    .and_then(|id| u32::try_from(id).ok())
                else {
                    continue;
                };
                out.insert(
                    PlayerId::new(id),
                    entry.get("stats").map(MatchStats::from_value).unwrap_or_default(),
                );
            }
        }
        _ => {}
    }
    out
}
