//! Match Records
//!
//! The per-match documents every statistics pipeline reads:
//!
//! - **types**: `MatchRecord` and its nested sub-documents
//! - **fields**: typed field paths into the stored document
//!
//! Records are read-only input. The store owns them and validates their
//! schema; this crate never writes them back.

pub mod fields;
pub mod types;

pub use types::{
    Ally, Champion, MatchOutcome, MatchRecord, PlayerStats, EXCLUDED_GAMEMODES, NO_ROLE,
};
