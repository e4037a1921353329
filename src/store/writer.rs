//! Backing file writer
//!
//! Replaces the backing file either in place or through a temp file.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::WriteMode;

/// Temp sibling used by atomic saves: `{path}.tmp`
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write `contents` to `path` with the given mode
pub fn write(mode: WriteMode, path: &Path, contents: &[u8]) -> io::Result<()> {
    match mode {
        WriteMode::Direct => write_direct(path, contents),
        WriteMode::Atomic => write_atomic(path, contents),
    }
}

/// Truncate `path` and write `contents` into it.
///
/// Not crash safe: an interrupted write leaves a truncated or partial file.
pub fn write_direct(path: &Path, contents: &[u8]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(contents)?;
    writer.flush()?;
    Ok(())
}

/// Replace `path` with `contents` so that it is either fully old or fully new.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    StagedWrite::stage(path, contents)?.commit()
}

/// A fully written and synced temp file waiting to replace its target
///
/// Dropping an uncommitted stage deletes the temp file (best effort), so a
/// failure at any step leaves only the untouched destination behind.
#[derive(Debug)]
pub struct StagedWrite {
    target: PathBuf,
    temp: PathBuf,
    committed: bool,
}

impl StagedWrite {
    /// Write `contents` to `{target}.tmp` and fsync it
    pub fn stage(target: &Path, contents: &[u8]) -> io::Result<Self> {
        // Built first so an early return cleans up a partial temp
        let staged = Self {
            target: target.to_path_buf(),
            temp: temp_path(target),
            committed: false,
        };

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&staged.temp)?;
        {
            let mut writer = BufWriter::new(&mut file);
            writer.write_all(contents)?;
            writer.flush()?;
        }
        file.sync_all()?;

        tracing::trace!(temp = %staged.temp.display(), bytes = contents.len(), "Staged write");
        Ok(staged)
    }

    /// Remove the existing target (if any) and rename the temp onto it
    pub fn commit(mut self) -> io::Result<()> {
        match fs::remove_file(&self.target) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        fs::rename(&self.temp, &self.target)?;
        self.committed = true;
        Ok(())
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn temp(&self) -> &Path {
        &self.temp
    }
}

impl Drop for StagedWrite {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match fs::remove_file(&self.temp) {
            Ok(()) => {
                tracing::debug!(temp = %self.temp.display(), "Removed uncommitted temp file")
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                temp = %self.temp.display(),
                "Could not remove uncommitted temp file: {}",
                e
            ),
        }
    }
}
