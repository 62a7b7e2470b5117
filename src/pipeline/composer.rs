//! Generic Pipeline Composer
//!
//! Assembles the canonical four-phase statistics pipeline:
//!
//! ```text
//! Match(base AND caller) → Intermediate* → Group(key, count/wins/losses + extra) → Final*
//! ```
//!
//! The base predicate (player, no remakes, no excluded game modes) is a
//! separate struct combined with the caller's predicate through `$and`, so
//! a caller filter can only narrow the base filter, never replace it.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::stage::{Accumulator, Expr, Group, GroupKey, Predicate, Stage};
use crate::record::{fields, MatchOutcome, EXCLUDED_GAMEMODES};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashSet;

/// Output name of the match counter
pub const COUNT: &str = "count";
/// Output name of the win counter
pub const WINS: &str = "wins";
/// Output name of the loss counter
pub const LOSSES: &str = "losses";

/// Accumulator names every group carries and no query may redefine
pub const RESERVED_ACCUMULATORS: [&str; 3] = [COUNT, WINS, LOSSES];

/// The filter every statistics pipeline starts with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePredicate {
    player_id: String,
}

impl BasePredicate {
    /// Create the base predicate for a player
    pub fn new(player_id: impl Into<String>) -> PipelineResult<Self> {
        let player_id = player_id.into();
        if player_id.trim().is_empty() {
            return Err(PipelineError::EmptyPlayerId);
        }
        Ok(Self { player_id })
    }

    /// The three baked-in clauses
    pub fn clauses(&self) -> Vec<Predicate> {
        vec![
            Predicate::eq(fields::SUMMONER_PUUID, self.player_id.as_str()),
            Predicate::ne(fields::RESULT, MatchOutcome::Remake.as_str()),
            Predicate::not_in(fields::GAMEMODE, EXCLUDED_GAMEMODES),
        ]
    }

    /// Base clauses as one conjunction
    pub fn to_predicate(&self) -> Predicate {
        Predicate::And(self.clauses())
    }
}

/// `count`, `wins` and `losses`, in that order
pub fn mandatory_accumulators() -> Vec<(String, Accumulator)> {
    vec![
        (COUNT.to_string(), Accumulator::count()),
        (
            WINS.to_string(),
            Accumulator::Sum(Expr::indicator(fields::RESULT, MatchOutcome::Win.as_str())),
        ),
        (
            LOSSES.to_string(),
            Accumulator::Sum(Expr::indicator(fields::RESULT, MatchOutcome::Fail.as_str())),
        ),
    ]
}

/// A composed pipeline, built fresh for each query
///
/// Only [`PipelineBuilder::build`] creates one, so every spec starts with
/// exactly one match stage and holds exactly one group stage carrying the
/// mandatory accumulators.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSpec {
    stages: Vec<Stage>,
}

impl PipelineSpec {
    /// Start composing a pipeline for a player
    pub fn builder(player_id: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder::new(player_id)
    }

    /// Stages in execution order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether there are no stages; never true for a built spec
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The group stage
    pub fn group(&self) -> Option<&Group> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::Group(group) => Some(group),
            _ => None,
        })
    }

    /// Render every stage as MQL
    pub fn to_mql(&self) -> Vec<Value> {
        self.stages.iter().map(Stage::to_mql).collect()
    }
}

impl Serialize for PipelineSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.stages.iter().map(Stage::to_mql))
    }
}

/// Builder for the four variable parts of a pipeline
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    player_id: String,
    filter: Option<Predicate>,
    intermediate: Vec<Stage>,
    key: GroupKey,
    accumulators: Vec<(String, Accumulator)>,
    final_stages: Vec<Stage>,
}

impl PipelineBuilder {
    /// Create a builder grouping everything into one bucket
    pub fn new(player_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            filter: None,
            intermediate: Vec::new(),
            key: GroupKey::None,
            accumulators: Vec::new(),
            final_stages: Vec::new(),
        }
    }

    /// Add a caller predicate, ANDed with the base filter and any earlier one
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    /// Add a caller predicate when present
    pub fn filter_opt(self, predicate: Option<Predicate>) -> Self {
        match predicate {
            Some(p) => self.filter(p),
            None => self,
        }
    }

    /// Append a reshaping stage run before grouping
    pub fn intermediate(mut self, stage: Stage) -> Self {
        self.intermediate.push(stage);
        self
    }

    /// Set the grouping key
    pub fn group_by(mut self, key: GroupKey) -> Self {
        self.key = key;
        self
    }

    /// Add a query-specific accumulator
    pub fn accumulate(mut self, name: impl Into<String>, accumulator: Accumulator) -> Self {
        self.accumulators.push((name.into(), accumulator));
        self
    }

    /// Append a post-processing stage run after grouping
    pub fn then(mut self, stage: Stage) -> Self {
        self.final_stages.push(stage);
        self
    }

    /// Validate and assemble the pipeline
    pub fn build(self) -> PipelineResult<PipelineSpec> {
        let base = BasePredicate::new(self.player_id)?;

        for stage in &self.intermediate {
            if matches!(stage, Stage::Group(_) | Stage::Match(_)) {
                return Err(PipelineError::MisplacedStage {
                    stage: stage.name(),
                    phase: "intermediate",
                });
            }
        }
        for stage in &self.final_stages {
            if matches!(stage, Stage::Group(_)) {
                return Err(PipelineError::MisplacedStage {
                    stage: stage.name(),
                    phase: "final",
                });
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for (name, _) in &self.accumulators {
            if RESERVED_ACCUMULATORS.contains(&name.as_str()) {
                return Err(PipelineError::ReservedAccumulator(name.clone()));
            }
            if !seen.insert(name.as_str()) {
                return Err(PipelineError::DuplicateAccumulator(name.clone()));
            }
        }

        let predicate = match self.filter {
            Some(caller) => base.to_predicate().and(caller),
            None => base.to_predicate(),
        };

        let mut accumulators = mandatory_accumulators();
        accumulators.extend(self.accumulators);

        let mut stages = Vec::with_capacity(2 + self.intermediate.len() + self.final_stages.len());
        stages.push(Stage::Match(predicate));
        stages.extend(self.intermediate);
        stages.push(Stage::Group(Group {
            key: self.key,
            accumulators,
        }));
        stages.extend(self.final_stages);

        Ok(PipelineSpec { stages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stage::FieldPath;
    use serde_json::json;

    #[test]
    fn test_minimal_pipeline_shape() {
        let spec = PipelineSpec::builder("p1").build().unwrap();

        assert_eq!(spec.len(), 2);
        assert!(matches!(spec.stages()[0], Stage::Match(_)));
        let group = spec.group().unwrap();
        assert_eq!(group.key, GroupKey::None);
        let names: Vec<&str> = group.accumulators.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["count", "wins", "losses"]);
    }

    #[test]
    fn test_base_filter_rendering() {
        let spec = PipelineSpec::builder("p1").build().unwrap();
        assert_eq!(
            spec.to_mql()[0],
            json!({"$match": {"$and": [
                {"summoner_puuid": {"$eq": "p1"}},
                {"result": {"$ne": "Remake"}},
                {"gamemode": {"$nin": [800, 810, 820, 830, 840, 850]}}
            ]}})
        );
    }

    #[test]
    fn test_caller_filter_cannot_replace_base() {
        let spec = PipelineSpec::builder("p1")
            .filter(Predicate::eq("summoner_puuid", "someone-else"))
            .filter(Predicate::eq("gamemode", 420))
            .build()
            .unwrap();

        match &spec.stages()[0] {
            Stage::Match(Predicate::And(clauses)) => {
                assert_eq!(clauses.len(), 5);
                assert_eq!(clauses[0], Predicate::eq("summoner_puuid", "p1"));
                assert_eq!(clauses[3], Predicate::eq("summoner_puuid", "someone-else"));
            }
            other => panic!("unexpected match stage: {:?}", other),
        }
    }

    #[test]
    fn test_stage_order() {
        let spec = PipelineSpec::builder("p1")
            .intermediate(Stage::Unwind(FieldPath::from_static("allyTeam")))
            .group_by(GroupKey::Field(fields::ALLY_ACCOUNT_ID))
            .then(Stage::sort_desc("count"))
            .then(Stage::Limit(3))
            .build()
            .unwrap();

        let names: Vec<&str> = spec.stages().iter().map(Stage::name).collect();
        assert_eq!(names, vec!["$match", "$unwind", "$group", "$sort", "$limit"]);
    }

    #[test]
    fn test_empty_player_rejected() {
        assert_eq!(
            PipelineSpec::builder("").build(),
            Err(PipelineError::EmptyPlayerId)
        );
        assert_eq!(
            PipelineSpec::builder("   ").build(),
            Err(PipelineError::EmptyPlayerId)
        );
    }

    #[test]
    fn test_reserved_and_duplicate_accumulators_rejected() {
        let err = PipelineSpec::builder("p1")
            .accumulate("wins", Accumulator::count())
            .build()
            .unwrap_err();
        assert_eq!(err, PipelineError::ReservedAccumulator("wins".to_string()));

        let err = PipelineSpec::builder("p1")
            .accumulate("kills", Accumulator::sum(fields::KILLS))
            .accumulate("kills", Accumulator::sum(fields::KILLS))
            .build()
            .unwrap_err();
        assert_eq!(err, PipelineError::DuplicateAccumulator("kills".to_string()));
    }

    #[test]
    fn test_misplaced_stages_rejected() {
        let group = Stage::Group(Group {
            key: GroupKey::None,
            accumulators: vec![],
        });

        let err = PipelineSpec::builder("p1")
            .then(group.clone())
            .build()
            .unwrap_err();
        assert!(matches!(err, PipelineError::MisplacedStage { phase: "final", .. }));

        let err = PipelineSpec::builder("p1")
            .intermediate(Stage::Match(Predicate::eq("role", "TOP")))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MisplacedStage {
                stage: "$match",
                phase: "intermediate"
            }
        ));
    }

    #[test]
    fn test_serializes_as_stage_array() {
        let spec = PipelineSpec::builder("p1")
            .then(Stage::Limit(1))
            .build()
            .unwrap();
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 3);
        assert_eq!(value[2], json!({"$limit": 1}));
    }
}
