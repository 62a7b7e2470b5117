//! Match record types
//!
//! This module defines the shape of the per-match documents the pipelines
//! run against:
//! - `MatchRecord`: one player's performance in one match
//! - `MatchOutcome`: the `result` field
//! - `Champion`, `PlayerStats`, `Ally`: nested sub-documents
//!
//! Records are owned by the data store. The crate only reads them, so the
//! types here exist for loading fixtures and for typed callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Game mode codes that never contribute to statistics (arena and other
/// non-standard queues).
pub const EXCLUDED_GAMEMODES: [i64; 6] = [800, 810, 820, 830, 840, 850];

/// Role value stored when the game assigned no lane
pub const NO_ROLE: &str = "NONE";

/// Outcome of a match from the player's point of view
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MatchOutcome {
    /// The player's team won
    Win,
    /// The player's team lost
    Fail,
    /// The match was voided early
    Remake,
    /// Any outcome the pipelines count as neither win nor loss
    Other(String),
}

impl MatchOutcome {
    /// The raw value stored in the `result` field
    pub fn as_str(&self) -> &str {
        match self {
            Self::Win => "Win",
            Self::Fail => "Fail",
            Self::Remake => "Remake",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for MatchOutcome {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Win" => Self::Win,
            "Fail" => Self::Fail,
            "Remake" => Self::Remake,
            _ => Self::Other(s),
        }
    }
}

impl From<MatchOutcome> for String {
    fn from(outcome: MatchOutcome) -> Self {
        match outcome {
            MatchOutcome::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Champion played in a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    /// Champion identifier
    pub id: i64,
    /// Class tags, primary class first
    #[serde(default)]
    pub roles: Vec<String>,
    /// Any other champion attributes carried by the record
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Champion {
    /// Create a champion with the given id and class tags
    pub fn new(id: i64, roles: &[&str]) -> Self {
        Self {
            id,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            extra: Map::new(),
        }
    }

    /// Builder method: attach an extra attribute (e.g. `name`)
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Primary class, if any
    pub fn primary_class(&self) -> Option<&str> {
        self.roles.first().map(String::as_str)
    }
}

/// Per-match numeric performance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerStats {
    pub kills: f64,
    pub deaths: f64,
    pub assists: f64,
    pub minions: f64,
    pub gold: f64,
    pub dmg_champ: f64,
    pub dmg_taken: f64,
    /// Kill participation
    pub kp: f64,
    pub vision: f64,
}

/// A teammate in the player's team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ally {
    pub name: String,
    pub account_id: String,
}

impl Ally {
    pub fn new(name: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            account_id: account_id.into(),
        }
    }
}

/// One player's record for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Player identifier used as the primary filter key
    pub summoner_puuid: String,
    pub result: MatchOutcome,
    /// Queue code
    pub gamemode: i64,
    pub champion: Champion,
    pub role: String,
    #[serde(default)]
    pub stats: PlayerStats,
    /// Match duration
    pub time: f64,
    pub date: DateTime<Utc>,
    /// Account identifier, distinct from the puuid
    pub account_id: String,
    #[serde(rename = "allyTeam", default)]
    pub ally_team: Vec<Ally>,
}

impl MatchRecord {
    /// Create a won ranked-solo record for the given player and champion
    pub fn new(puuid: impl Into<String>, champion: Champion) -> Self {
        let puuid = puuid.into();
        Self {
            account_id: format!("acc-{}", puuid),
            summoner_puuid: puuid,
            result: MatchOutcome::Win,
            gamemode: 420,
            champion,
            role: NO_ROLE.to_string(),
            stats: PlayerStats::default(),
            time: 0.0,
            date: Utc::now(),
            ally_team: Vec::new(),
        }
    }

    /// Builder method: set the outcome
    pub fn result(mut self, result: MatchOutcome) -> Self {
        self.result = result;
        self
    }

    /// Builder method: set the queue code
    pub fn gamemode(mut self, gamemode: i64) -> Self {
        self.gamemode = gamemode;
        self
    }

    /// Builder method: set the lane
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Builder method: set the performance numbers
    pub fn stats(mut self, stats: PlayerStats) -> Self {
        self.stats = stats;
        self
    }

    /// Builder method: set the match duration
    pub fn time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    /// Builder method: set the match date
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// Builder method: set the player's account id
    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = account_id.into();
        self
    }

    /// Builder method: add a teammate
    pub fn ally(mut self, ally: Ally) -> Self {
        self.ally_team.push(ally);
        self
    }

    /// Whether this record is eligible for statistics at all
    pub fn is_countable(&self) -> bool {
        self.result != MatchOutcome::Remake && !EXCLUDED_GAMEMODES.contains(&self.gamemode)
    }
}
