//! Store implementation
//!
//! A `BTreeMap` of records with a full save after every mutation.

use std::path::{Path, PathBuf};

use crate::codec::{self, Codec};
use crate::config::{Config, SaveFailurePolicy};
use crate::error::{Result, StockError};
use crate::record::{Record, RecordMap};

use super::loader::{self, LoadReport};
use super::writer;

/// The inventory
///
/// Mutations take `&mut self`; there is exactly one writer.
/// If a save fails after a mutation, the mutation stays in memory and memory
/// is ahead of disk until the next successful save.
pub struct Store {
    /// Store configuration
    config: Config,

    /// Encoder/decoder for `config.format`
    codec: Box<dyn Codec>,

    /// All records by id
    records: RecordMap,

    /// Outcome of the load done by `open`
    load_report: LoadReport,
}

impl Store {
    /// Open a store, loading whatever the backing file holds
    ///
    /// Never fails; see [`LoadReport`] for what the load found.
    pub fn open(config: Config) -> Self {
        let codec = codec::for_config(&config);
        let (records, load_report) = loader::load(&config.backing_path, codec.as_ref());

        Self {
            config,
            codec,
            records,
            load_report,
        }
    }

    /// Open with a path (convenience method)
    ///
    /// Uses the default (JSON) config with the specified backing file
    pub fn open_path(path: impl Into<PathBuf>) -> Self {
        Self::open(Config::builder().backing_path(path).build())
    }

    /// Add a new record
    ///
    /// Returns `Ok(false)` without touching anything if the id is taken.
    /// A record the codec cannot store is refused with `Serialization`,
    /// also without touching anything.
    pub fn add(&mut self, record: Record) -> Result<bool> {
        if self.records.contains_key(&record.id) {
            tracing::debug!(id = %record.id, "Add rejected, id already present");
            return Ok(false);
        }
        self.codec.check(&record)?;

        tracing::debug!(id = %record.id, "Adding record");
        self.records.insert(record.id.clone(), record);
        self.persist_after_mutation()?;
        Ok(true)
    }

    /// Remove a record by id
    ///
    /// Returns `Ok(false)` if there was nothing to remove.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        if self.records.remove(id).is_none() {
            tracing::debug!(id = %id, "Remove skipped, id not present");
            return Ok(false);
        }

        tracing::debug!(id = %id, "Removed record");
        self.persist_after_mutation()?;
        Ok(true)
    }

    /// Change quantity and/or price of an existing record
    ///
    /// Fields passed as `None` keep their value. Returns `Ok(false)`, and
    /// writes nothing, if the id is unknown. Values the codec cannot store
    /// are refused before the record changes.
    pub fn update(&mut self, id: &str, quantity: Option<u64>, price: Option<f64>) -> Result<bool> {
        let Some(current) = self.records.get(id) else {
            tracing::debug!(id = %id, "Update skipped, id not present");
            return Ok(false);
        };

        let mut updated = current.clone();
        if let Some(quantity) = quantity {
            updated.quantity = quantity;
        }
        if let Some(price) = price {
            updated.price = price;
        }
        self.codec.check(&updated)?;
        self.records.insert(updated.id.clone(), updated);

        tracing::debug!(id = %id, ?quantity, ?price, "Updated record");
        self.persist_after_mutation()?;
        Ok(true)
    }

    /// Exact id lookup
    pub fn find_by_id(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    /// All records whose name contains `term`, ignoring case, in id order
    pub fn find_by_name(&self, term: &str) -> Vec<&Record> {
        let needle = term.to_lowercase();
        self.records
            .values()
            .filter(|record| record.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// All records in id order
    pub fn list_all(&self) -> Vec<&Record> {
        self.records.values().collect()
    }

    /// Write the whole inventory to the backing file now
    ///
    /// Always returns the failure, whatever the save failure policy says.
    /// Use this to retry after a mutation whose save failed.
    pub fn persist(&self) -> Result<()> {
        let path = &self.config.backing_path;
        let bytes = self.codec.encode(&self.records)?;

        writer::write(self.config.write_mode, path, &bytes).map_err(|source| {
            StockError::Persistence {
                path: path.clone(),
                source,
            }
        })?;

        tracing::debug!(
            path = %path.display(),
            mode = %self.config.write_mode,
            records = self.records.len(),
            bytes = bytes.len(),
            "Saved inventory"
        );
        Ok(())
    }

    /// Save after a mutation, applying the save failure policy
    ///
    /// The policy covers I/O failures only. An encode failure would repeat
    /// on every later save, so it is always returned.
    fn persist_after_mutation(&self) -> Result<()> {
        let Err(e) = self.persist() else {
            return Ok(());
        };
        if matches!(e, StockError::Serialization(_)) {
            return Err(e);
        }

        tracing::error!(
            path = %self.config.backing_path.display(),
            "{}; in-memory inventory is ahead of the file",
            e
        );
        match self.config.on_save_failure {
            SaveFailurePolicy::Log => Ok(()),
            SaveFailurePolicy::Propagate => Err(e),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.config.backing_path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// What the initial load found
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }
}
