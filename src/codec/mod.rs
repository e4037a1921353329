//! Codec Module
//!
//! Converts a whole inventory to and from the bytes of its backing file.
//!
//! ## Responsibilities
//! - Encode every record into one file image
//! - Decode a file image back into records, best-effort where the format allows
//! - Stay out of file handling (the store's loader and writer own that)
//!
//! ## Formats
//! ```text
//! delimited:                      json:
//! ┌───────────────────────────┐   ┌──────────────────────────────────┐
//! │ P1|Bolt|10|0.5            │   │ {                                │
//! │ P2|Nut|200|0.05           │   │     "P1": {                      │
//! │ ...                       │   │         "id": "P1",              │
//! └───────────────────────────┘   │         "name": "Bolt",          │
//!                                 │         "quantity": 10,          │
//!                                 │         "price": 0.5             │
//!                                 │     }, ...                       │
//!                                 │ }                                │
//!                                 └──────────────────────────────────┘
//! ```

mod delimited;
mod json;

pub use delimited::DelimitedCodec;
pub use json::JsonCodec;

use crate::config::{Config, Format};
use crate::error::Result;
use crate::record::{Record, RecordMap};

/// Output of a decode
#[derive(Debug, Default)]
pub struct Decoded {
    /// Records that parsed
    pub records: RecordMap,

    /// Malformed lines dropped under the skip policy
    pub lines_skipped: usize,

    /// True when a malformed line ended decoding under the stop policy
    pub stopped_early: bool,
}

/// A serialization strategy for the backing file
pub trait Codec {
    /// The format this codec reads and writes
    fn format(&self) -> Format;

    /// Refuse a record this format cannot store faithfully
    ///
    /// `encode` applies this to every record; the store calls it before
    /// changing anything in memory.
    fn check(&self, record: &Record) -> Result<()>;

    /// Encode all records into a complete file image
    fn encode(&self, records: &RecordMap) -> Result<Vec<u8>>;

    /// Decode a complete file image
    ///
    /// An `Err` means nothing usable could be recovered from the bytes.
    fn decode(&self, bytes: &[u8]) -> Result<Decoded>;
}

/// Build the codec selected by the config
pub fn for_config(config: &Config) -> Box<dyn Codec> {
    match config.format {
        Format::Delimited => Box::new(DelimitedCodec::new(config.on_malformed_line)),
        Format::Json => Box::new(JsonCodec::new()),
    }
}
