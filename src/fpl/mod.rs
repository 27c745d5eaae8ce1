//! FPL Draft API integration
//!
//! - `http`: cached, fail-soft client for the Draft and Fantasy endpoints
//! - `types`: lenient decoding of the response shapes
//! - `ownership`: gameweek ownership from entry picks
//! - `compute`: fantasy scoring and bonus allocation

pub mod compute;
pub mod http;
pub mod ownership;
pub mod types;

pub use compute::{
    compute_bonus_for_fixture, compute_score, compute_score_for_code, BonusAllocation,
    ScoringRules,
};
pub use http::{Endpoint, FplClient};
pub use ownership::{compute_slot, LineupSlot, OwnershipMap, OwnershipResolver};
