//! Grouped query results

use crate::pipeline::Document;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of a statistics query: a group key plus its accumulated fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedResult {
    /// Group key; `null` for single-bucket queries, absent after a
    /// projection that renamed it
    #[serde(rename = "_id", default, skip_serializing_if = "Value::is_null")]
    pub id: Value,
    /// Matches in the group
    pub count: u64,
    /// Matches won
    pub wins: u64,
    /// Matches lost
    pub losses: u64,
    /// Query-specific accumulated fields, in pipeline order
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl GroupedResult {
    /// Decode a document returned by a store
    pub fn from_document(doc: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(doc))
    }

    /// Flatten back into a single document (`_id` first when present)
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        if !self.id.is_null() {
            doc.insert("_id".to_string(), self.id.clone());
        }
        doc.insert("count".to_string(), Value::from(self.count));
        doc.insert("wins".to_string(), Value::from(self.wins));
        doc.insert("losses".to_string(), Value::from(self.losses));
        for (name, value) in &self.fields {
            doc.insert(name.clone(), value.clone());
        }
        doc
    }

    /// Look up an accumulated field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Look up a numeric accumulated field
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Look up a string accumulated field
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Matches that were neither won nor lost
    pub fn others(&self) -> u64 {
        self.count.saturating_sub(self.wins + self.losses)
    }

    /// Share of matches won, if any were played
    pub fn win_rate(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.wins as f64 / self.count as f64)
        }
    }
}
