//! ID types for FPL Draft leagues, entries, players and clubs.

use crate::error::{FplError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe wrapper for FPL Draft league IDs.
///
/// Keeps league IDs from being mixed up with the many other integer IDs the
/// API hands back (entries, league entries, elements, clubs).
///
/// # Examples
///
/// ```rust
/// use fpl_draft::LeagueId;
///
/// let league_id = LeagueId::new(12260);
/// assert_eq!(league_id.as_u32(), 12260);
/// assert_eq!(league_id.to_string(), "12260");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeagueId(pub u32);

impl LeagueId {
    /// Create a new LeagueId from a u32 value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the underlying u32 value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LeagueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LeagueId {
    type Err = FplError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.parse()?))
    }
}

/// Global entry (team) ID, as used by `/entry/{id}/event/{gw}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl EntryId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = FplError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.parse()?))
    }
}

/// League-local entry ID. Matches and standings refer to entries by this id,
/// not by the global [`EntryId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeagueEntryId(pub u64);

impl LeagueEntryId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LeagueEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type-safe wrapper for player (element) IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl PlayerId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = FplError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Premier League club ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub u32);

impl TeamId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_league_id_from_str() {
        let id: LeagueId = "12260".parse().unwrap();
        assert_eq!(id, LeagueId::new(12260));
        assert!("abc".parse::<LeagueId>().is_err());
        assert!("-1".parse::<LeagueId>().is_err());
    }

    #[test]
    fn test_player_id_trims_whitespace() {
        let id: PlayerId = " 82 ".parse().unwrap();
        assert_eq!(id.as_u32(), 82);
    }

    #[test]
    fn test_ids_display() {
        assert_eq!(EntryId::new(177491).to_string(), "177491");
        assert_eq!(LeagueEntryId::new(7).to_string(), "7");
        assert_eq!(TeamId::new(14).to_string(), "14");
    }

    #[test]
    fn test_ids_serialize_transparently_as_numbers() {
        let json = serde_json::to_string(&PlayerId::new(5)).unwrap();
        assert_eq!(json, "5");
        let back: EntryId = serde_json::from_str("42").unwrap();
        assert_eq!(back, EntryId::new(42));
    }
}
