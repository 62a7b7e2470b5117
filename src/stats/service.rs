//! Statistics Service
//!
//! Runs the named statistics queries against a [`MatchStore`]:
//! 1. Validate arguments and compose the pipeline
//! 2. Submit it to the store (the only suspension point)
//! 3. Decode the grouped documents
//!
//! The service holds no mutable state; clones share the store.

use crate::pipeline::PipelineSpec;
use crate::stats::error::{StatsError, StatsResult};
use crate::stats::queries::{Operation, StatsQuery, DEFAULT_LIMIT};
use crate::stats::result::GroupedResult;
use crate::store::MatchStore;
use std::sync::Arc;
use std::time::Instant;

/// Entry point for the seven statistics operations
pub struct StatsService<S: ?Sized = dyn MatchStore> {
    store: Arc<S>,
    default_limit: u64,
}

impl<S: ?Sized> Clone for StatsService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            default_limit: self.default_limit,
        }
    }
}

impl<S: MatchStore + ?Sized> StatsService<S> {
    /// Create a service over a store
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Override the champion stats limit used when callers pass none
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit;
        self
    }

    /// The N most played champions, sorted by match count
    pub async fn champion_stats(
        &self,
        puuid: &str,
        limit: Option<u64>,
    ) -> StatsResult<Vec<GroupedResult>> {
        self.run(puuid, StatsQuery::ChampionStats { limit }).await
    }

    /// Counters per primary champion class, unsorted
    pub async fn champion_class_stats(&self, puuid: &str) -> StatsResult<Vec<GroupedResult>> {
        self.run(puuid, StatsQuery::ChampionClassStats).await
    }

    /// Full per-champion breakdown, optionally for one queue
    pub async fn champion_complete_stats(
        &self,
        puuid: &str,
        queue: Option<i64>,
    ) -> StatsResult<Vec<GroupedResult>> {
        self.run(puuid, StatsQuery::ChampionCompleteStats { queue })
            .await
    }

    /// Counters per game mode
    pub async fn gamemode_stats(&self, puuid: &str) -> StatsResult<Vec<GroupedResult>> {
        self.run(puuid, StatsQuery::GamemodeStats).await
    }

    /// Totals over all qualifying matches; `None` when there are none
    pub async fn global_stats(&self, puuid: &str) -> StatsResult<Option<GroupedResult>> {
        let mut rows = self.run(puuid, StatsQuery::GlobalStats).await?;
        Ok(rows.pop())
    }

    /// Counters per lane, excluding matches without one
    pub async fn role_stats(&self, puuid: &str) -> StatsResult<Vec<GroupedResult>> {
        self.run(puuid, StatsQuery::RoleStats).await
    }

    /// Most frequent teammates
    pub async fn mates(&self, puuid: &str) -> StatsResult<Vec<GroupedResult>> {
        self.run(puuid, StatsQuery::Mates).await
    }

    /// Compose and run a request
    pub async fn run(&self, puuid: &str, query: StatsQuery) -> StatsResult<Vec<GroupedResult>> {
        let operation = query.operation();
        let pipeline = self.pipeline(puuid, query).map_err(|e| {
            tracing::debug!(%operation, puuid, error = %e, "Rejected statistics request");
            e
        })?;
        self.execute(operation, &pipeline).await
    }

    /// Compose a request without running it
    pub fn pipeline(&self, puuid: &str, query: StatsQuery) -> StatsResult<PipelineSpec> {
        query.pipeline(puuid, self.default_limit)
    }

    /// Submit a composed pipeline and decode the grouped rows
    pub async fn execute(
        &self,
        operation: Operation,
        pipeline: &PipelineSpec,
    ) -> StatsResult<Vec<GroupedResult>> {
        let start = Instant::now();
        let rendered = serde_json::Value::Array(pipeline.to_mql()).to_string();
        tracing::debug!(
            %operation,
            backend = self.store.backend(),
            stages = pipeline.len(),
            pipeline = %rendered,
            "Running statistics pipeline"
        );

        let docs = match self.store.aggregate(pipeline).await {
            Ok(docs) => docs,
            Err(source) => {
                tracing::warn!(%operation, error = %source, "Statistics query failed");
                return Err(StatsError::Query { operation, source });
            }
        };

        let rows = docs
            .into_iter()
            .map(GroupedResult::from_document)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| StatsError::Decode { operation, source })?;

        tracing::debug!(
            %operation,
            rows = rows.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Statistics query complete"
        );
        Ok(rows)
    }
}
