//! MongoDB match store
//!
//! Sends the rendered pipeline to a MongoDB collection through the official
//! driver. Connection pooling, timeouts and retries are the driver's
//! concern and come from the connection string.

use crate::pipeline::{Document, PipelineSpec};
use crate::store::error::{StoreError, StoreResult};
use crate::store::MatchStore;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{self, Bson};
use mongodb::{Client, Collection};
use serde_json::Value;

/// Match store backed by a MongoDB collection
#[derive(Debug, Clone)]
pub struct MongoStore {
    collection: Collection<bson::Document>,
}

impl MongoStore {
    /// Connect to `uri` and use `database.collection`
    pub async fn connect(uri: &str, database: &str, collection: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri).await?;
        tracing::info!(database, collection, "Connected to MongoDB");
        Ok(Self::with_collection(
            client.database(database).collection(collection),
        ))
    }

    /// Use an already configured collection handle
    pub fn with_collection(collection: Collection<bson::Document>) -> Self {
        Self { collection }
    }
}

fn to_bson_stage(stage: &Value) -> StoreResult<bson::Document> {
    bson::to_document(stage).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn from_bson_document(doc: bson::Document) -> StoreResult<Document> {
    match Bson::Document(doc).into_relaxed_extjson() {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Backend(format!(
            "aggregate returned a non-document value: {}",
            other
        ))),
    }
}

#[async_trait]
impl MatchStore for MongoStore {
    async fn aggregate(&self, pipeline: &PipelineSpec) -> StoreResult<Vec<Document>> {
        let stages = pipeline
            .to_mql()
            .iter()
            .map(to_bson_stage)
            .collect::<StoreResult<Vec<_>>>()?;

        let cursor = self.collection.aggregate(stages, None).await?;
        let docs: Vec<bson::Document> = cursor.try_collect().await?;

        docs.into_iter().map(from_bson_document).collect()
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}
