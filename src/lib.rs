//! # Stockpile
//!
//! A single-user inventory manager with:
//! - A keyed in-memory record store persisted after every mutation
//! - Two backing formats: pipe-delimited lines and a JSON object
//! - Atomic saves (temp file + rename) with recovery of interrupted saves
//! - Best-effort loading that never aborts startup
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Console driver / CLI                         │
//! │          (validates input, renders records)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ add / remove / update / find / list
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Store                                  │
//! │             (BTreeMap<id, Record>)                           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────┐
//!   │    Codec    │          │    Writer    │
//!   │ delim / json│          │direct/atomic │
//!   └─────────────┘          └──────┬───────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │ backing file│
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod codec;
pub mod console;
pub mod record;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, Format, MalformedLinePolicy, SaveFailurePolicy, WriteMode};
pub use console::Console;
pub use error::{Result, StockError};
pub use record::{Record, RecordMap};
pub use store::{LoadReport, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Stockpile
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
