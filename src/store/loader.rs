//! Backing file loader
//!
//! Turns whatever is on disk into records. Loading never fails: a missing,
//! unreadable or corrupt file yields an empty inventory and a report saying
//! why.

use std::fs;
use std::io;
use std::path::Path;

use crate::codec::Codec;
use crate::error::StockError;
use crate::record::RecordMap;

use super::writer::temp_path;

/// What happened while loading
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Number of records now in memory
    pub records_loaded: usize,

    /// Malformed delimited lines that were dropped
    pub lines_skipped: usize,

    /// A malformed delimited line ended the load early
    pub stopped_early: bool,

    /// Why the inventory started empty, if the file could not be used at all
    pub load_error: Option<StockError>,

    /// The target was missing and a complete temp file was moved into place
    pub recovered_from_temp: bool,

    /// A stale temp file next to an intact target was deleted
    pub discarded_temp: bool,
}

/// Load the records stored at `path`
///
/// Steps:
/// 1. Settle any save interrupted between staging and rename
/// 2. Read the file (missing is fine)
/// 3. Decode; on failure start empty
pub fn load(path: &Path, codec: &dyn Codec) -> (RecordMap, LoadReport) {
    let mut report = LoadReport::default();

    recover_interrupted_save(path, &mut report);

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No backing file, starting empty");
            return (RecordMap::new(), report);
        }
        Err(e) => {
            let err = StockError::Decode {
                reason: format!("cannot read {}: {}", path.display(), e),
                recoverable: false,
            };
            return start_empty(path, report, err);
        }
    };

    match codec.decode(&bytes) {
        Ok(decoded) => {
            report.records_loaded = decoded.records.len();
            report.lines_skipped = decoded.lines_skipped;
            report.stopped_early = decoded.stopped_early;
            tracing::debug!(
                path = %path.display(),
                format = %codec.format(),
                records = report.records_loaded,
                skipped = report.lines_skipped,
                "Loaded inventory"
            );
            (decoded.records, report)
        }
        Err(e) => start_empty(path, report, e),
    }
}

fn start_empty(path: &Path, mut report: LoadReport, err: StockError) -> (RecordMap, LoadReport) {
    if err.is_recoverable() {
        tracing::warn!(path = %path.display(), "{}; file is corrupt, starting empty", err);
    } else {
        tracing::error!(path = %path.display(), "{}; starting empty", err);
    }
    report.load_error = Some(err);
    (RecordMap::new(), report)
}

/// An atomic save syncs its temp file before removing the target, so:
/// - temp without target: crash after the remove, the temp is complete
/// - temp beside target: crash before the remove, the temp may be partial
fn recover_interrupted_save(path: &Path, report: &mut LoadReport) {
    let temp = temp_path(path);
    if !temp.exists() {
        return;
    }

    if path.exists() {
        match fs::remove_file(&temp) {
            Ok(()) => {
                tracing::warn!(temp = %temp.display(), "Discarded temp file from an interrupted save");
                report.discarded_temp = true;
            }
            Err(e) => {
                tracing::warn!(temp = %temp.display(), "Could not remove stale temp file: {}", e)
            }
        }
    } else {
        match fs::rename(&temp, path) {
            Ok(()) => {
                tracing::warn!(
                    path = %path.display(),
                    "Restored backing file from an interrupted save"
                );
                report.recovered_from_temp = true;
            }
            Err(e) => tracing::error!(
                temp = %temp.display(),
                "Could not restore backing file from temp: {}",
                e
            ),
        }
    }
}
