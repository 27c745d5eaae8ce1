//! Type-safe wrappers and enums for FPL Draft data.

pub mod ids;
pub mod position;
pub mod time;

pub use ids::{EntryId, LeagueEntryId, LeagueId, PlayerId, TeamId};
pub use position::Position;
pub use time::Gameweek;
