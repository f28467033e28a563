#![forbid(unsafe_code)]

//! Persistent boolean flags, used for the "don't start the tour
//! automatically" preference.
//!
//! # Backends
//!
//! - [`MemoryFlags`]: in-memory (tests, ephemeral sessions).
//! - `FileFlags`: a JSON file written with the write-rename pattern
//!   (requires the `flag-persistence` feature).
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StoreError::Io` | File I/O failure | Returns error, flag unchanged |
//! | `StoreError::Serialization` | JSON encode/decode | Returns error |
//! | `StoreError::Corruption` | Unknown `format_version` | Returns error, file untouched |
//!
//! The runner treats every failure as "flag not set" and logs it; a broken
//! store never stops a tour.

use std::collections::BTreeMap;
use std::fmt;

/// Key under which the runner records that auto-start is disabled.
pub const NO_AUTO_TOUR_KEY: &str = "guidepost-noautotour";

/// Errors from a flag store.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    #[cfg(feature = "flag-persistence")]
    Serialization(String),
    /// Stored data is unusable (written by an unknown format version).
    #[cfg(feature = "flag-persistence")]
    Corruption(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "flag-persistence")]
            StoreError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            #[cfg(feature = "flag-persistence")]
            StoreError::Corruption(msg) => write!(f, "flag store corruption: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            #[cfg(feature = "flag-persistence")]
            StoreError::Serialization(_) | StoreError::Corruption(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// Result type for flag store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Named boolean flags that survive the session.
pub trait FlagStore {
    /// Human-readable backend name for logging.
    fn name(&self) -> &str;

    /// Read a flag; `None` if never set.
    fn get(&self, key: &str) -> StoreResult<Option<bool>>;

    /// Write a flag.
    fn set(&mut self, key: &str, value: bool) -> StoreResult<()>;

    /// Forget a flag.
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

/// In-memory flag store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryFlags {
    flags: BTreeMap<String, bool>,
}

impl MemoryFlags {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with one flag already set.
    #[must_use]
    pub fn with_flag(mut self, key: impl Into<String>, value: bool) -> Self {
        self.flags.insert(key.into(), value);
        self
    }
}

impl FlagStore for MemoryFlags {
    fn name(&self) -> &str {
        "MemoryFlags"
    }

    fn get(&self, key: &str) -> StoreResult<Option<bool>> {
        Ok(self.flags.get(key).copied())
    }

    fn set(&mut self, key: &str, value: bool) -> StoreResult<()> {
        self.flags.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.flags.remove(key);
        Ok(())
    }
}

#[cfg(feature = "flag-persistence")]
mod file_flags {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// On-disk layout.
    #[derive(Serialize, Deserialize)]
    struct FlagFile {
        format_version: u32,
        flags: BTreeMap<String, bool>,
    }

    impl FlagFile {
        const FORMAT_VERSION: u32 = 1;
    }

    /// JSON-file flag store.
    ///
    /// ```json
    /// { "format_version": 1, "flags": { "guidepost-noautotour": true } }
    /// ```
    ///
    /// Every write goes to `{path}.tmp` first and is renamed over `{path}`.
    #[derive(Debug, Clone)]
    pub struct FileFlags {
        path: PathBuf,
    }

    impl FileFlags {
        /// Store at `path`; the file is created on first write.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        /// Backing file.
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }

        fn load(&self) -> StoreResult<BTreeMap<String, bool>> {
            if !self.path.exists() {
                return Ok(BTreeMap::new());
            }
            let reader = BufReader::new(File::open(&self.path)?);
            let file: FlagFile = serde_json::from_reader(reader).map_err(|e| {
                StoreError::Serialization(format!("failed to parse flag file: {e}"))
            })?;
            if file.format_version != FlagFile::FORMAT_VERSION {
                tracing::warn!(
                    stored = file.format_version,
                    expected = FlagFile::FORMAT_VERSION,
                    "flag file format version mismatch"
                );
                return Err(StoreError::Corruption(format!(
                    "format version {} (expected {})",
                    file.format_version,
                    FlagFile::FORMAT_VERSION
                )));
            }
            Ok(file.flags)
        }

        fn save(&self, flags: BTreeMap<String, bool>) -> StoreResult<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = FlagFile {
                format_version: FlagFile::FORMAT_VERSION,
                flags,
            };
            let tmp_path = self.temp_path();
            {
                let mut writer = BufWriter::new(File::create(&tmp_path)?);
                serde_json::to_writer_pretty(&mut writer, &file).map_err(|e| {
                    StoreError::Serialization(format!("failed to serialize flags: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }
            fs::rename(&tmp_path, &self.path)?;
            tracing::debug!(path = %self.path.display(), "flags saved");
            Ok(())
        }
    }

    impl FlagStore for FileFlags {
        fn name(&self) -> &str {
            "FileFlags"
        }

        fn get(&self, key: &str) -> StoreResult<Option<bool>> {
            Ok(self.load()?.get(key).copied())
        }

        fn set(&mut self, key: &str, value: bool) -> StoreResult<()> {
            let mut flags = self.load()?;
            flags.insert(key.to_string(), value);
            self.save(flags)
        }

        fn remove(&mut self, key: &str) -> StoreResult<()> {
            let mut flags = self.load()?;
            if flags.remove(key).is_some() {
                self.save(flags)?;
            }
            Ok(())
        }
    }
}

#[cfg(feature = "flag-persistence")]
pub use file_flags::FileFlags;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_flags_basic_operations() {
        let mut store = MemoryFlags::new();
        assert_eq!(store.get(NO_AUTO_TOUR_KEY).ok(), Some(None));
        assert!(store.set(NO_AUTO_TOUR_KEY, true).is_ok());
        assert_eq!(store.get(NO_AUTO_TOUR_KEY).ok(), Some(Some(true)));
        assert!(store.remove(NO_AUTO_TOUR_KEY).is_ok());
        assert_eq!(store.get(NO_AUTO_TOUR_KEY).ok(), Some(None));
        assert_eq!(store.name(), "MemoryFlags");
    }

    #[test]
    fn memory_flags_prepopulated() {
        let store = MemoryFlags::new().with_flag("a", false);
        assert_eq!(store.get("a").ok(), Some(Some(false)));
    }

    #[test]
    fn store_error_display() {
        let io: StoreError = std::io::Error::other("disk").into();
        assert!(io.to_string().starts_with("I/O error"));
        assert!(std::error::Error::source(&io).is_some());
    }
}
