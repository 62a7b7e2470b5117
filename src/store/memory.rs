//! In-memory match store
//!
//! Holds match documents in process and evaluates pipelines with
//! [`crate::pipeline::eval`]. Records are loaded from a JSON array or a
//! JSON-lines file, or pushed directly (fixtures, tests).

use crate::pipeline::eval::{apply_stage, matches};
use crate::pipeline::{Document, PipelineSpec, Stage};
use crate::record::MatchRecord;
use crate::store::error::{StoreError, StoreResult};
use crate::store::MatchStore;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::time::Instant;
use tokio::sync::RwLock;

/// Match store backed by a vector of documents
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Document>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given documents
    pub fn from_documents(docs: Vec<Document>) -> Self {
        Self {
            records: RwLock::new(docs),
        }
    }

    /// Create a store holding the given typed records
    pub fn from_records(records: impl IntoIterator<Item = MatchRecord>) -> StoreResult<Self> {
        let docs = records
            .into_iter()
            .map(|record| to_document(&record))
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Self::from_documents(docs))
    }

    /// Load documents from a JSON array or JSON-lines file
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let docs = parse_documents(&content)?;
        tracing::info!(path = ?path, records = docs.len(), "Loaded match records");
        Ok(Self::from_documents(docs))
    }

    /// Add a raw document
    pub async fn insert_document(&self, doc: Document) {
        self.records.write().await.push(doc);
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no documents
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn to_document(record: &MatchRecord) -> StoreResult<Document> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::Serialization(
            "match record did not serialize to an object".to_string(),
        )),
    }
}

/// Parse a JSON array of objects, or one object per line
pub fn parse_documents(content: &str) -> StoreResult<Vec<Document>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(trimmed)?;
        return values
            .into_iter()
            .enumerate()
            .map(|(i, value)| match value {
                Value::Object(map) => Ok(map),
                _ => Err(StoreError::Serialization(format!(
                    "element {}: expected a JSON object",
                    i
                ))),
            })
            .collect();
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::Serialization(format!(
                "line {}: expected a JSON object",
                i + 1
            ))),
            Err(e) => Err(StoreError::Serialization(format!("line {}: {}", i + 1, e))),
        })
        .collect()
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn aggregate(&self, pipeline: &PipelineSpec) -> StoreResult<Vec<Document>> {
        let start = Instant::now();
        let records = self.records.read().await;
        let stages = pipeline.stages();

        // Filter on the borrowed records so only matching documents are cloned
        let (mut docs, rest) = match stages.split_first() {
            Some((Stage::Match(predicate), rest)) => (
                records
                    .iter()
                    .filter(|doc| matches(predicate, doc))
                    .cloned()
                    .collect::<Vec<_>>(),
                rest,
            ),
            _ => (records.clone(), stages),
        };
        let matched = docs.len();

        for stage in rest {
            docs = apply_stage(stage, docs)?;
        }

        tracing::trace!(
            scanned = records.len(),
            matched,
            rows = docs.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Evaluated pipeline in memory"
        );
        Ok(docs)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
