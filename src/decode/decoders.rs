//! Decoder implementations

use super::types::{DecoderFormat, RecordDecoder};
use crate::error::{Error, Result};
use serde_json::Value;

// ============================================================================
// JSONL Decoder
// ============================================================================

/// JSON Lines decoder (one JSON object per line)
///
/// Blank lines are skipped. A malformed line fails the whole body.
#[derive(Debug, Clone, Default)]
pub struct JsonlDecoder;

impl JsonlDecoder {
    /// Create a new JSONL decoder
    pub fn new() -> Self {
        Self
    }
}

impl RecordDecoder for JsonlDecoder {
    fn decode(&self, body: &str) -> Result<Vec<Value>> {
        let mut records = Vec::new();

        for (line_num, line) in body.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let value: Value = serde_json::from_str(line).map_err(|e| Error::Decode {
                message: format!("Failed to parse JSONL at line {}: {e}", line_num + 1),
            })?;

            records.push(value);
        }

        Ok(records)
    }
}

// ============================================================================
// JSON Decoder
// ============================================================================

/// Whole-document JSON decoder
///
/// An array yields its elements; any other value is a single record.
#[derive(Debug, Clone, Default)]
pub struct JsonDecoder;

impl JsonDecoder {
    /// Create a new JSON decoder
    pub fn new() -> Self {
        Self
    }
}

impl RecordDecoder for JsonDecoder {
    fn decode(&self, body: &str) -> Result<Vec<Value>> {
        let value: Value = serde_json::from_str(body).map_err(|e| Error::Decode {
            message: format!("Failed to parse JSON: {e}"),
        })?;
        match value {
            Value::Array(arr) => Ok(arr),
            other => Ok(vec![other]),
        }
    }
}

/// Decoder for a given input format
pub fn decoder_for(format: DecoderFormat) -> Box<dyn RecordDecoder> {
    match format {
        DecoderFormat::Jsonl => Box::new(JsonlDecoder::new()),
        DecoderFormat::Json => Box::new(JsonDecoder::new()),
    }
}
