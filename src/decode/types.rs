//! Decoder types and traits
//!
//! Defines the core decoder abstractions.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Layout of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DecoderFormat {
    /// JSON Lines, one object per line (default)
    #[default]
    Jsonl,
    /// A single JSON document: an array of objects, or one object
    Json,
}

/// Trait for decoding an input body into records
pub trait RecordDecoder: Send + Sync {
    /// Decode the body into a list of records
    fn decode(&self, body: &str) -> Result<Vec<Value>>;
}
