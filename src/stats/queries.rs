//! Statistics Query Definitions
//!
//! The seven named specializations of the generic pipeline. Each builder
//! is pure: it validates its arguments and returns the composed
//! [`PipelineSpec`] without touching a store.
//!
//! | Query | Group key | Extra accumulators | Final stages |
//! |---|---|---|---|
//! | champion stats | `champion.id` | champion, kills, deaths, assists | sort count desc, limit |
//! | champion class stats | `champion.roles[0]` | none | none |
//! | champion complete stats | `champion.id` | time, gameLength, date, champion, K/D/A, averages | sort count desc |
//! | gamemode stats | `gamemode` | none | none |
//! | global stats | none | time, K/D/A, minions, vision, kp | none |
//! | role stats | `role` | none | project `_id` as `role` |
//! | mates | `allyTeam.account_id` | account_id, name, mateId | idEq, filter, sort, limit 15 |

use crate::pipeline::{
    Accumulator, Expr, GroupKey, PipelineSpec, Predicate, ProjectField, Stage, COUNT, LOSSES,
    WINS,
};
use crate::record::{fields, NO_ROLE};
use crate::stats::error::{StatsError, StatsResult};
use serde::Serialize;

/// Champions returned by champion stats when no limit is given
pub const DEFAULT_LIMIT: u64 = 5;
/// Teammates returned by the mates query
pub const MATES_LIMIT: u64 = 15;
/// Matches a teammate must share with the player to count as a mate
pub const MATES_MIN_GAMES: i64 = 2;

/// The named statistics operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ChampionStats,
    ChampionClassStats,
    ChampionCompleteStats,
    GamemodeStats,
    GlobalStats,
    RoleStats,
    Mates,
}

impl Operation {
    /// Every operation, in declaration order
    pub fn all() -> &'static [Operation] {
        &[
            Operation::ChampionStats,
            Operation::ChampionClassStats,
            Operation::ChampionCompleteStats,
            Operation::GamemodeStats,
            Operation::GlobalStats,
            Operation::RoleStats,
            Operation::Mates,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ChampionStats => "champion_stats",
            Self::ChampionClassStats => "champion_class_stats",
            Self::ChampionCompleteStats => "champion_complete_stats",
            Self::GamemodeStats => "gamemode_stats",
            Self::GlobalStats => "global_stats",
            Self::RoleStats => "role_stats",
            Self::Mates => "mates",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A statistics request with its operation-specific parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsQuery {
    /// Most played champions; `None` uses the service default limit
    ChampionStats { limit: Option<u64> },
    ChampionClassStats,
    /// Per-champion breakdown, optionally restricted to one queue
    ChampionCompleteStats { queue: Option<i64> },
    GamemodeStats,
    GlobalStats,
    RoleStats,
    Mates,
}

impl StatsQuery {
    pub fn operation(&self) -> Operation {
        match self {
            Self::ChampionStats { .. } => Operation::ChampionStats,
            Self::ChampionClassStats => Operation::ChampionClassStats,
            Self::ChampionCompleteStats { .. } => Operation::ChampionCompleteStats,
            Self::GamemodeStats => Operation::GamemodeStats,
            Self::GlobalStats => Operation::GlobalStats,
            Self::RoleStats => Operation::RoleStats,
            Self::Mates => Operation::Mates,
        }
    }

    /// Compose the pipeline for this request
    pub fn pipeline(&self, puuid: &str, default_limit: u64) -> StatsResult<PipelineSpec> {
        match *self {
            Self::ChampionStats { limit } => {
                champion_stats(puuid, limit.unwrap_or(default_limit))
            }
            Self::ChampionClassStats => champion_class_stats(puuid),
            Self::ChampionCompleteStats { queue } => champion_complete_stats(puuid, queue),
            Self::GamemodeStats => gamemode_stats(puuid),
            Self::GlobalStats => global_stats(puuid),
            Self::RoleStats => role_stats(puuid),
            Self::Mates => mates(puuid),
        }
    }
}

/// Most played champions, top `limit` by match count
pub fn champion_stats(puuid: &str, limit: u64) -> StatsResult<PipelineSpec> {
    if limit == 0 {
        return Err(StatsError::InvalidArgument(
            "limit must be a positive integer".to_string(),
        ));
    }

    Ok(PipelineSpec::builder(puuid)
        .group_by(GroupKey::Field(fields::CHAMPION_ID))
        .accumulate("champion", Accumulator::first(fields::CHAMPION))
        .accumulate("kills", Accumulator::sum(fields::KILLS))
        .accumulate("deaths", Accumulator::sum(fields::DEATHS))
        .accumulate("assists", Accumulator::sum(fields::ASSISTS))
        .then(Stage::sort_desc(COUNT))
        .then(Stage::Limit(limit))
        .build()?)
}

/// Counters per primary champion class
pub fn champion_class_stats(puuid: &str) -> StatsResult<PipelineSpec> {
    Ok(PipelineSpec::builder(puuid)
        .group_by(GroupKey::Computed(Expr::array_elem_at(
            Expr::field(fields::CHAMPION_ROLES),
            0,
        )))
        .build()?)
}

/// Full per-champion breakdown, optionally for a single queue
pub fn champion_complete_stats(puuid: &str, queue: Option<i64>) -> StatsResult<PipelineSpec> {
    Ok(PipelineSpec::builder(puuid)
        .filter_opt(queue.map(|q| Predicate::eq(fields::GAMEMODE, q)))
        .group_by(GroupKey::Field(fields::CHAMPION_ID))
        .accumulate("time", Accumulator::sum(fields::TIME))
        .accumulate("gameLength", Accumulator::avg(fields::TIME))
        .accumulate("date", Accumulator::max(fields::DATE))
        .accumulate("champion", Accumulator::first(fields::CHAMPION))
        .accumulate("kills", Accumulator::sum(fields::KILLS))
        .accumulate("deaths", Accumulator::sum(fields::DEATHS))
        .accumulate("assists", Accumulator::sum(fields::ASSISTS))
        .accumulate("minions", Accumulator::avg(fields::MINIONS))
        .accumulate("gold", Accumulator::avg(fields::GOLD))
        .accumulate("dmgChamp", Accumulator::avg(fields::DMG_CHAMP))
        .accumulate("dmgTaken", Accumulator::avg(fields::DMG_TAKEN))
        .accumulate("kp", Accumulator::avg(fields::KP))
        .then(Stage::sort_desc(COUNT))
        .build()?)
}

/// Counters per game mode
pub fn gamemode_stats(puuid: &str) -> StatsResult<PipelineSpec> {
    Ok(PipelineSpec::builder(puuid)
        .group_by(GroupKey::Field(fields::GAMEMODE))
        .build()?)
}

/// Totals over every qualifying match, in a single row
pub fn global_stats(puuid: &str) -> StatsResult<PipelineSpec> {
    Ok(PipelineSpec::builder(puuid)
        .group_by(GroupKey::None)
        .accumulate("time", Accumulator::sum(fields::TIME))
        .accumulate("kills", Accumulator::sum(fields::KILLS))
        .accumulate("deaths", Accumulator::sum(fields::DEATHS))
        .accumulate("assists", Accumulator::sum(fields::ASSISTS))
        .accumulate("minions", Accumulator::sum(fields::MINIONS))
        .accumulate("vision", Accumulator::sum(fields::VISION))
        .accumulate("kp", Accumulator::avg(fields::KP))
        .build()?)
}

/// Counters per lane, with the lane exposed as `role`
pub fn role_stats(puuid: &str) -> StatsResult<PipelineSpec> {
    Ok(PipelineSpec::builder(puuid)
        .filter(Predicate::ne(fields::ROLE, NO_ROLE))
        .group_by(GroupKey::Field(fields::ROLE))
        .then(Stage::Project(vec![
            ("_id".to_string(), ProjectField::Exclude),
            ("role".to_string(), ProjectField::Computed(Expr::field("_id"))),
            (COUNT.to_string(), ProjectField::Include),
            (WINS.to_string(), ProjectField::Include),
            (LOSSES.to_string(), ProjectField::Include),
        ]))
        .build()?)
}

/// Most frequent teammates with at least two shared matches
pub fn mates(puuid: &str) -> StatsResult<PipelineSpec> {
    Ok(PipelineSpec::builder(puuid)
        .intermediate(Stage::Unwind(fields::ALLY_TEAM))
        .group_by(GroupKey::Field(fields::ALLY_ACCOUNT_ID))
        .accumulate("account_id", Accumulator::first(fields::ACCOUNT_ID))
        .accumulate("name", Accumulator::first(fields::ALLY_NAME))
        .accumulate("mateId", Accumulator::first(fields::ALLY_ACCOUNT_ID))
        .then(Stage::AddFields(vec![(
            "idEq".to_string(),
            Expr::eq(Expr::field("mateId"), Expr::field("account_id")),
        )]))
        .then(Stage::Match(
            Predicate::eq("idEq", false).and(Predicate::gte(COUNT, MATES_MIN_GAMES)),
        ))
        .then(Stage::sort_desc(COUNT))
        .then(Stage::Limit(MATES_LIMIT))
        .build()?)
}
