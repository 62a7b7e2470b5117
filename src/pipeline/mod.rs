//! Aggregation Pipelines
//!
//! Typed composition of the statistics pipelines:
//!
//! - **stage**: Stage, predicate, expression and accumulator types
//! - **composer**: The generic four-phase pipeline template
//! - **eval**: In-memory evaluation of a composed pipeline
//!
//! # Example
//!
//! ```rust
//! use matchstats::pipeline::{Accumulator, GroupKey, PipelineSpec, Stage};
//! use matchstats::record::fields;
//!
//! let spec = PipelineSpec::builder("puuid-1")
//!     .group_by(GroupKey::Field(fields::CHAMPION_ID))
//!     .accumulate("kills", Accumulator::sum(fields::KILLS))
//!     .then(Stage::sort_desc("count"))
//!     .then(Stage::Limit(5))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(spec.len(), 4);
//! ```

pub mod composer;
pub mod error;
pub mod eval;
pub mod stage;

pub use composer::{
    mandatory_accumulators, BasePredicate, PipelineBuilder, PipelineSpec, COUNT, LOSSES,
    RESERVED_ACCUMULATORS, WINS,
};
pub use error::{PipelineError, PipelineResult};
pub use eval::{evaluate, Document};
pub use stage::{
    Accumulator, Expr, FieldPath, Group, GroupKey, Operator, Predicate, ProjectField, SortOrder,
    Stage,
};
