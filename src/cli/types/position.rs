//! Player position types.

use crate::error::FplError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// FPL player positions.
///
/// The API reports positions as `element_type` ids (1..=4) in bootstrap data and
/// as the short names `GKP`/`DEF`/`MID`/`FWD` in `element_types`. Anything else
/// is rejected at parse time.
///
/// # Examples
///
/// ```rust
/// use fpl_draft::Position;
///
/// let pos: Position = "def".parse().unwrap();
/// assert_eq!(pos, Position::DEF);
/// assert_eq!(pos.to_string(), "DEF");
/// assert!("SUB".parse::<Position>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    GKP,
    DEF,
    MID,
    FWD,
}

impl Position {
    pub const ALL: [Position; 4] = [Position::GKP, Position::DEF, Position::MID, Position::FWD];

    /// Convert an `element_type` id to a Position.
    pub fn from_element_type(id: u8) -> Result<Self, FplError> {
        match id {
            1 => Ok(Position::GKP),
            2 => Ok(Position::DEF),
            3 => Ok(Position::MID),
            4 => Ok(Position::FWD),
            _ => Err(FplError::InvalidPosition {
                position: id.to_string(),
            }),
        }
    }

    /// The `element_type` id for this position.
    pub fn element_type(&self) -> u8 {
        match self {
            Position::GKP => 1,
            Position::DEF => 2,
            Position::MID => 3,
            Position::FWD => 4,
        }
    }

    /// Sort order used by squad tables: GKP, DEF, MID, FWD.
    pub fn sort_order(&self) -> u8 {
        self.element_type()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Position::GKP => "GKP",
            Position::DEF => "DEF",
            Position::MID => "MID",
            Position::FWD => "FWD",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Position {
    type Err = FplError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GKP" | "GK" | "GOALKEEPER" => Ok(Position::GKP),
            "DEF" | "DEFENDER" => Ok(Position::DEF),
            "MID" | "MIDFIELDER" => Ok(Position::MID),
            "FWD" | "FW" | "FORWARD" => Ok(Position::FWD),
            _ => Err(FplError::InvalidPosition {
                position: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type_mappings() {
        assert_eq!(Position::from_element_type(1).unwrap(), Position::GKP);
        assert_eq!(Position::from_element_type(2).unwrap(), Position::DEF);
        assert_eq!(Position::from_element_type(3).unwrap(), Position::MID);
        assert_eq!(Position::from_element_type(4).unwrap(), Position::FWD);
        assert!(Position::from_element_type(0).is_err());
        assert!(Position::from_element_type(5).is_err());

        for pos in Position::ALL {
            assert_eq!(Position::from_element_type(pos.element_type()).unwrap(), pos);
        }
    }

    #[test]
    fn test_position_string_conversion() {
        assert_eq!(Position::GKP.to_string(), "GKP");
        assert_eq!(Position::DEF.to_string(), "DEF");
        assert_eq!(Position::MID.to_string(), "MID");
        assert_eq!(Position::FWD.to_string(), "FWD");

        assert_eq!("gkp".parse::<Position>().unwrap(), Position::GKP);
        assert_eq!(" Fwd ".parse::<Position>().unwrap(), Position::FWD);
        assert_eq!("Midfielder".parse::<Position>().unwrap(), Position::MID);
    }

    #[test]
    fn test_unknown_position_is_rejected() {
        match "BENCH".parse::<Position>() {
            Err(FplError::InvalidPosition { position }) => assert_eq!(position, "BENCH"),
            other => panic!("Expected InvalidPosition, got {other:?}"),
        }
    }

    #[test]
    fn test_sort_order() {
        let mut positions = vec![Position::FWD, Position::GKP, Position::MID, Position::DEF];
        positions.sort_by_key(|p| p.sort_order());
        assert_eq!(positions, Position::ALL.to_vec());
    }
}
