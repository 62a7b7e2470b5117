//! Field paths into a match record document

use crate::pipeline::FieldPath;

pub const SUMMONER_PUUID: FieldPath = FieldPath::from_static("summoner_puuid");
pub const RESULT: FieldPath = FieldPath::from_static("result");
pub const GAMEMODE: FieldPath = FieldPath::from_static("gamemode");
pub const ROLE: FieldPath = FieldPath::from_static("role");
pub const TIME: FieldPath = FieldPath::from_static("time");
pub const DATE: FieldPath = FieldPath::from_static("date");
pub const ACCOUNT_ID: FieldPath = FieldPath::from_static("account_id");

pub const CHAMPION: FieldPath = FieldPath::from_static("champion");
pub const CHAMPION_ID: FieldPath = FieldPath::from_static("champion.id");
pub const CHAMPION_ROLES: FieldPath = FieldPath::from_static("champion.roles");

pub const ALLY_TEAM: FieldPath = FieldPath::from_static("allyTeam");
pub const ALLY_NAME: FieldPath = FieldPath::from_static("allyTeam.name");
pub const ALLY_ACCOUNT_ID: FieldPath = FieldPath::from_static("allyTeam.account_id");

pub const KILLS: FieldPath = FieldPath::from_static("stats.kills");
pub const DEATHS: FieldPath = FieldPath::from_static("stats.deaths");
pub const ASSISTS: FieldPath = FieldPath::from_static("stats.assists");
pub const MINIONS: FieldPath = FieldPath::from_static("stats.minions");
pub const GOLD: FieldPath = FieldPath::from_static("stats.gold");
pub const DMG_CHAMP: FieldPath = FieldPath::from_static("stats.dmgChamp");
pub const DMG_TAKEN: FieldPath = FieldPath::from_static("stats.dmgTaken");
pub const KP: FieldPath = FieldPath::from_static("stats.kp");
pub const VISION: FieldPath = FieldPath::from_static("stats.vision");
