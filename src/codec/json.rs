//! JSON codec
//!
//! A single JSON object keyed by record id, pretty-printed with a
//! four-space indent.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::config::Format;
use crate::error::{Result, StockError};
use crate::record::{Record, RecordMap};

use super::{Codec, Decoded};

const INDENT: &[u8] = b"    ";

/// Whole-document codec
#[derive(Debug, Clone, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for JsonCodec {
    fn format(&self) -> Format {
        Format::Json
    }

    // JSON has no literal for NaN or infinity; serde_json would write `null`
    // and the file would no longer decode.
    fn check(&self, record: &Record) -> Result<()> {
        if !record.price.is_finite() {
            return Err(StockError::Serialization(format!(
                "record '{}' has a non-finite price ({})",
                record.id, record.price
            )));
        }
        Ok(())
    }

    fn encode(&self, records: &RecordMap) -> Result<Vec<u8>> {
        for record in records.values() {
            self.check(record)?;
        }

        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
        records
            .serialize(&mut ser)
            .map_err(|e| StockError::Serialization(e.to_string()))?;
        buf.push(b'\n');
        Ok(buf)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Decoded> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Decoded::default());
        }

        let parsed: RecordMap = serde_json::from_slice(bytes).map_err(|e| StockError::Decode {
            reason: format!("invalid JSON: {}", e),
            recoverable: true,
        })?;

        // The inner id is authoritative; re-key anything that disagrees.
        let mut decoded = Decoded::default();
        for (key, record) in parsed {
            if key != record.id {
                tracing::warn!(key = %key, id = %record.id, "JSON key does not match record id, using id");
            }
            decoded.records.insert(record.id.clone(), record);
        }
        Ok(decoded)
    }
}
