//! Match Stores
//!
//! The single seam between the statistics queries and the data store:
//! run an aggregation pipeline against the match-record collection.
//!
//! - **memory**: In-process store evaluating pipelines over loaded records
//! - **mongo**: MongoDB collection (cargo feature `mongodb`)
//! - **error**: Error types

pub mod error;
pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoStore;

use crate::pipeline::{Document, PipelineSpec};
use async_trait::async_trait;

/// A collection of match records that can run aggregation pipelines
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Run `pipeline` against the match-record collection
    async fn aggregate(&self, pipeline: &PipelineSpec) -> StoreResult<Vec<Document>>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}

