//! Core utilities for the FPL Draft dashboard
//!
//! - `cache`: ttl memo cache used for every upstream read
//! - `clock`: injectable time source for the cache
//! - `http`: shared reqwest client and headers

pub mod cache;
pub mod clock;
pub mod http;

pub use cache::{CacheStatus, TtlCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use http::{build_client, default_headers};
