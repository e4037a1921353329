//! Pipe-delimited codec
//!
//! One record per line, `id|name|quantity|price`.
//!
//! Ids and names cannot contain `|` or line breaks. Whitespace inside a
//! line is kept as-is, so `" P1"` stays `" P1"`; only whitespace-only lines
//! are ignored.

use std::io::BufRead;

use crate::config::{Format, MalformedLinePolicy};
use crate::error::{Result, StockError};
use crate::record::{Record, RecordMap};

use super::{Codec, Decoded};

/// Field separator
pub const SEPARATOR: char = '|';

/// Fields per line
const FIELD_COUNT: usize = 4;

/// Line-oriented codec
#[derive(Debug, Clone)]
pub struct DelimitedCodec {
    on_malformed_line: MalformedLinePolicy,
}

impl DelimitedCodec {
    pub fn new(on_malformed_line: MalformedLinePolicy) -> Self {
        Self { on_malformed_line }
    }

    /// Parse one non-blank line
    fn parse_line(line_no: usize, line: &str) -> Result<Record> {
        let malformed = |reason: String| StockError::MalformedRecord {
            line: line_no,
            reason,
        };

        let fields: Vec<&str> = line.split(SEPARATOR).collect();
        let &[id, name, quantity, price] = fields.as_slice() else {
            return Err(malformed(format!(
                "expected {} fields, found {}",
                FIELD_COUNT,
                fields.len()
            )));
        };

        let quantity = quantity
            .parse::<u64>()
            .map_err(|e| malformed(format!("bad quantity '{}': {}", quantity, e)))?;
        let price = price
            .parse::<f64>()
            .map_err(|e| malformed(format!("bad price '{}': {}", price, e)))?;

        Ok(Record::new(id, name, quantity, price))
    }

    /// A text field the line format cannot carry
    fn check_field(record: &Record, field: &str, value: &str) -> Result<()> {
        if value.contains(SEPARATOR) || value.contains(['\n', '\r']) {
            return Err(StockError::Serialization(format!(
                "record '{}' has a {} containing '{}' or a line break",
                record.id, field, SEPARATOR
            )));
        }
        Ok(())
    }
}

impl Codec for DelimitedCodec {
    fn format(&self) -> Format {
        Format::Delimited
    }

    fn check(&self, record: &Record) -> Result<()> {
        Self::check_field(record, "id", &record.id)?;
        Self::check_field(record, "name", &record.name)
    }

    fn encode(&self, records: &RecordMap) -> Result<Vec<u8>> {
        let mut out = String::new();
        for record in records.values() {
            self.check(record)?;
            // Price uses the shortest round-trip form, not fixed precision
            out.push_str(&format!(
                "{}{sep}{}{sep}{}{sep}{}\n",
                record.id,
                record.name,
                record.quantity,
                record.price,
                sep = SEPARATOR
            ));
        }
        Ok(out.into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Decoded> {
        let mut decoded = Decoded::default();

        for (idx, line) in bytes.lines().enumerate() {
            let line_no = idx + 1;
            let parsed = match line {
                Ok(line) => {
                    // `lines` already drops "\n" / "\r\n"; fields keep their spaces
                    if line.trim().is_empty() {
                        continue;
                    }
                    Self::parse_line(line_no, &line)
                }
                Err(e) => Err(StockError::MalformedRecord {
                    line: line_no,
                    reason: e.to_string(),
                }),
            };

            match parsed {
                Ok(record) => {
                    if decoded.records.contains_key(&record.id) {
                        tracing::warn!(line = line_no, id = %record.id, "Duplicate id, later line wins");
                    }
                    decoded.records.insert(record.id.clone(), record);
                }
                Err(e) => match self.on_malformed_line {
                    MalformedLinePolicy::Skip => {
                        tracing::warn!("{}; skipping line", e);
                        decoded.lines_skipped += 1;
                    }
                    MalformedLinePolicy::Stop => {
                        tracing::warn!(
                            "{}; stopping load with {} records read",
                            e,
                            decoded.records.len()
                        );
                        decoded.stopped_early = true;
                        break;
                    }
                },
            }
        }

        Ok(decoded)
    }
}
