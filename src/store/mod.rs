//! Store Module
//!
//! The persistent record store.
//!
//! ## Responsibilities
//! - Own the in-memory records, keyed by id
//! - Load the backing file on open, never failing
//! - Persist the whole inventory after every successful mutation
//! - Answer id lookups and case-insensitive name searches
//!
//! ## Save Path
//! ```text
//!   add / remove / update
//!            │
//!            ▼
//!   ┌─────────────────┐     ┌─────────────┐     ┌──────────────────────────┐
//!   │ RecordMap (mem) │ ──▶ │ Codec       │ ──▶ │ Writer                   │
//!   └─────────────────┘     │ encode      │     │ direct: truncate + write │
//!                           └─────────────┘     │ atomic: .tmp → rename    │
//!                                               └──────────────────────────┘
//! ```
//!
//! ## Load Path
//! ```text
//!   leftover .tmp? ──▶ recover or discard ──▶ read file ──▶ Codec decode
//!                                                │               │
//!                                          missing/unreadable    corrupt
//!                                                └──▶ empty ◀────┘
//! ```

mod inventory;
mod loader;
mod writer;

pub use inventory::Store;
pub use loader::{load, LoadReport};
pub use writer::{temp_path, write, write_atomic, write_direct, StagedWrite};
