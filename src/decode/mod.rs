//! Input decoder module
//!
//! Supports: JSONL, JSON
//!
//! # Overview
//!
//! Reads input files into records ready for ingestion. JSON Lines input skips
//! blank lines; any malformed line fails the whole load.

mod decoders;
mod loader;
mod types;

pub use decoders::{decoder_for, JsonDecoder, JsonlDecoder};
pub use loader::{load_json, read_records};
pub use types::{DecoderFormat, RecordDecoder};

#[cfg(test)]
mod tests;
