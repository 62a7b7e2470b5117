//! Player Statistics
//!
//! Named statistics over a player's match history, each one a
//! specialization of the generic pipeline:
//!
//! - **queries**: Pure pipeline builders for the seven operations
//! - **service**: Runs the operations against a [`crate::store::MatchStore`]
//! - **result**: Decoded result rows
//! - **error**: Error types

pub mod error;
pub mod queries;
pub mod result;
pub mod service;

pub use error::{StatsError, StatsResult};
pub use queries::{
    champion_class_stats, champion_complete_stats, champion_stats, gamemode_stats, global_stats,
    mates, role_stats, Operation, StatsQuery, DEFAULT_LIMIT, MATES_LIMIT, MATES_MIN_GAMES,
};
pub use result::GroupedResult;
pub use service::StatsService;
