//! Gameweek type for the Premier League season.

use crate::error::{FplError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of gameweeks in a Premier League season
pub const GAMEWEEKS_PER_SEASON: u16 = 38;

/// Type-safe wrapper for gameweek (event) numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Gameweek(pub u16);

impl Gameweek {
    pub fn new(gw: u16) -> Self {
        Self(gw)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// All gameweeks of a season, 1 through 38.
    pub fn season() -> impl Iterator<Item = Gameweek> {
        (1..=GAMEWEEKS_PER_SEASON).map(Gameweek)
    }
}

impl Default for Gameweek {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Gameweek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Gameweek {
    type Err = FplError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        let raw = raw
            .strip_prefix("GW")
            .or_else(|| raw.strip_prefix("gw"))
            .unwrap_or(raw);
        Ok(Self(raw.parse()?))
    }
}
