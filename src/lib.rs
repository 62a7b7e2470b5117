//! # matchstats
//!
//! Player match statistics over per-match performance records. Every
//! statistic is a typed aggregation pipeline composed from one template:
//! base filter, optional pre-group stages, a group with the mandatory
//! `count`/`wins`/`losses` counters, optional post-group stages.
//!
//! ## Modules
//!
//! - [`record`]: Match record model and field paths
//! - [`pipeline`]: Typed pipeline stages, the composer and an in-memory evaluator
//! - [`store`]: The `MatchStore` seam (in-memory, MongoDB)
//! - [`stats`]: The seven named statistics operations
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use matchstats::record::{Champion, MatchRecord};
//! use matchstats::stats::StatsService;
//! use matchstats::store::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::from_records(vec![
//!         MatchRecord::new("puuid-1", Champion::new(22, &["Marksman"])),
//!     ])?;
//!     let service = StatsService::new(Arc::new(store));
//!
//!     for row in service.champion_stats("puuid-1", Some(5)).await? {
//!         println!("{} played {} times, {} wins", row.id, row.count, row.wins);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod pipeline;
pub mod record;
pub mod stats;
pub mod store;

// Re-export top-level types for convenience
pub use config::{Config, ConfigError, LoggingConfig, QueryConfig, StoreBackend, StoreConfig};

pub use pipeline::{
    Accumulator, BasePredicate, Document, Expr, FieldPath, GroupKey, PipelineBuilder,
    PipelineError, PipelineSpec, Predicate, Stage,
};

pub use record::{Ally, Champion, MatchOutcome, MatchRecord, PlayerStats};

pub use stats::{GroupedResult, Operation, StatsError, StatsQuery, StatsResult, StatsService};

pub use store::{MatchStore, MemoryStore, StoreError, StoreResult};

#[cfg(feature = "mongodb")]
pub use store::MongoStore;
