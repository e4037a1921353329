//! Configuration for Stockpile
//!
//! Centralized configuration with per-format defaults.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::StockError;

/// Main configuration for a Store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// The one file holding the whole inventory.
    /// Atomic saves also use a sibling `{backing_path}.tmp`.
    pub backing_path: PathBuf,

    /// On-disk representation of the records
    pub format: Format,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// How the backing file is replaced on save
    pub write_mode: WriteMode,

    /// What a mutation does when its save fails
    pub on_save_failure: SaveFailurePolicy,

    /// What loading does with an unparseable delimited line
    pub on_malformed_line: MalformedLinePolicy,
}

/// Backing file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `id|name|quantity|price`, one record per line
    Delimited,

    /// JSON object keyed by id
    Json,
}

/// How the backing file is rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate the destination and write into it (a crash can leave it half written)
    Direct,

    /// Write `{path}.tmp`, remove the destination, rename the temp into place
    Atomic,
}

/// Behaviour when persisting after a mutation fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFailurePolicy {
    /// Log the failure and report the mutation as successful
    Log,

    /// Return the failure to the caller
    Propagate,
}

/// Behaviour when a delimited line cannot be parsed during load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedLinePolicy {
    /// Drop the line and keep reading
    Skip,

    /// Keep what was read so far and stop
    Stop,
}

impl Format {
    /// Default file name when no path is configured
    pub fn default_file_name(self) -> &'static str {
        match self {
            Format::Delimited => "inventory.txt",
            Format::Json => "inventory.json",
        }
    }

    pub fn default_write_mode(self) -> WriteMode {
        match self {
            Format::Delimited => WriteMode::Direct,
            Format::Json => WriteMode::Atomic,
        }
    }

    pub fn default_save_failure_policy(self) -> SaveFailurePolicy {
        match self {
            Format::Delimited => SaveFailurePolicy::Log,
            Format::Json => SaveFailurePolicy::Propagate,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        ConfigBuilder::default().build()
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
///
/// Anything left unset is derived from the format when `build` is called.
#[derive(Debug)]
pub struct ConfigBuilder {
    backing_path: Option<PathBuf>,
    format: Format,
    write_mode: Option<WriteMode>,
    on_save_failure: Option<SaveFailurePolicy>,
    on_malformed_line: MalformedLinePolicy,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            backing_path: None,
            format: Format::Json,
            write_mode: None,
            on_save_failure: None,
            on_malformed_line: MalformedLinePolicy::Skip,
        }
    }
}

impl ConfigBuilder {
    /// Set the backing file path
    pub fn backing_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.backing_path = Some(path.into());
        self
    }

    /// Set the file format
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Override the format's default write mode
    pub fn write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = Some(mode);
        self
    }

    /// Override the format's default save failure policy
    pub fn on_save_failure(mut self, policy: SaveFailurePolicy) -> Self {
        self.on_save_failure = Some(policy);
        self
    }

    /// Set the malformed line policy (delimited format only)
    pub fn on_malformed_line(mut self, policy: MalformedLinePolicy) -> Self {
        self.on_malformed_line = policy;
        self
    }

    pub fn build(self) -> Config {
        let format = self.format;
        Config {
            backing_path: self
                .backing_path
                .unwrap_or_else(|| PathBuf::from(format.default_file_name())),
            format,
            write_mode: self.write_mode.unwrap_or(format.default_write_mode()),
            on_save_failure: self
                .on_save_failure
                .unwrap_or(format.default_save_failure_policy()),
            on_malformed_line: self.on_malformed_line,
        }
    }
}

// =============================================================================
// Text forms (used by the CLI)
// =============================================================================

macro_rules! text_enum {
    ($ty:ident, $what:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = StockError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($ty::$variant),)+
                    other => Err(StockError::Config(format!(
                        concat!("unknown ", $what, " '{}', expected one of: {}"),
                        other,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let text = match self {
                    $($ty::$variant => $text,)+
                };
                f.write_str(text)
            }
        }
    };
}

text_enum!(Format, "format", { Delimited => "delimited", Json => "json" });
text_enum!(WriteMode, "write mode", { Direct => "direct", Atomic => "atomic" });
text_enum!(SaveFailurePolicy, "save failure policy", { Log => "log", Propagate => "propagate" });
text_enum!(MalformedLinePolicy, "malformed line policy", { Skip => "skip", Stop => "stop" });
