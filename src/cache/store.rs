//! A single cache file holding verbatim feed payloads
//!
//! A `CacheStore` is bound to one directory and, once named, one file. The
//! name can be supplied up front or bound later, exactly once, through
//! [`CacheStore::set_name`]. Later attempts to rename are ignored so a cache
//! target can never be redirected mid-life.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{QuakeError, Result};

/// Extension used when none is given
pub const DEFAULT_EXTENSION: &str = ".json";

/// Naming state of a cache file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheName {
    /// No name yet; writes fail until one is bound
    Unnamed,
    /// Final on-disk file name, including timestamp and extension
    Named(String),
}

impl CacheName {
    /// Applies a bind request and returns the next state
    ///
    /// `Unnamed` moves to `Named(file_name)`. `Named` stays as it is.
    pub fn bind(self, file_name: String) -> CacheName {
        match self {
            CacheName::Unnamed => CacheName::Named(file_name),
            named @ CacheName::Named(_) => named,
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, CacheName::Named(_))
    }
}

/// One cache file in one directory
#[derive(Debug, Clone)]
pub struct CacheStore {
    state: CacheName,
    directory: String,
    extension: String,
    append_timestamp: bool,
    /// Epoch millis captured at construction, used when `append_timestamp` is set
    created_at: i64,
}

impl CacheStore {
    /// Creates a store with the default extension and no timestamp
    ///
    /// See [`CacheStore::with_options`].
    pub fn new(name: Option<&str>, directory: &str) -> Result<Self> {
        Self::with_options(name, directory, DEFAULT_EXTENSION, false)
    }

    /// Creates a store, ensuring its directory exists
    ///
    /// # Arguments
    /// * `name` - Base file name; `None` or empty leaves the store unnamed
    /// * `directory` - Target directory; must be non-empty and end with a path separator
    /// * `extension` - File extension, with or without the leading dot
    /// * `append_timestamp` - Whether to insert epoch millis between name and extension
    ///
    /// # Returns
    /// * `Err(QuakeError::InvalidConfig)` for a bad directory or extension
    /// * `Err(QuakeError::CacheIo)` if the directory cannot be created
    pub fn with_options(
        name: Option<&str>,
        directory: &str,
        extension: &str,
        append_timestamp: bool,
    ) -> Result<Self> {
        if directory.is_empty() {
            return Err(QuakeError::InvalidConfig(
                "cache directory cannot be empty".to_string(),
            ));
        }
        if !ends_with_separator(directory) {
            return Err(QuakeError::InvalidConfig(format!(
                "cache directory '{}' must end with '{}'",
                directory, MAIN_SEPARATOR
            )));
        }

        let mut store = Self {
            state: CacheName::Unnamed,
            directory: directory.to_string(),
            extension: normalize_extension(extension)?,
            append_timestamp,
            created_at: Utc::now().timestamp_millis(),
        };

        if let Some(name) = name.filter(|n| !n.is_empty()) {
            store.state = store.state.clone().bind(store.file_name(name));
        }

        store.ensure_dir()?;
        Ok(store)
    }

    /// Creates another store in the same directory with the same extension
    ///
    /// The sibling is always named `{name}{extension}`, without a timestamp.
    pub fn sibling(&self, name: &str) -> Result<Self> {
        Self::with_options(Some(name), &self.directory, &self.extension, false)
    }

    /// Binds a name to an unnamed store
    ///
    /// # Returns
    /// * `Ok(true)` if the store moved from unnamed to named
    /// * `Ok(false)` if it was already named; the path is unchanged
    /// * `Err(QuakeError::InvalidConfig)` for an empty name
    pub fn set_name(&mut self, name: &str) -> Result<bool> {
        if name.is_empty() {
            return Err(QuakeError::InvalidConfig(
                "cache name cannot be empty".to_string(),
            ));
        }

        let was_named = self.state.is_named();
        let file_name = self.file_name(name);
        self.state = std::mem::replace(&mut self.state, CacheName::Unnamed).bind(file_name);

        if was_named {
            debug!(name, current = ?self.name(), "cache already named, ignoring rename");
        }
        Ok(!was_named)
    }

    /// Final file name, or `None` while unnamed
    pub fn name(&self) -> Option<&str> {
        match &self.state {
            CacheName::Named(name) => Some(name),
            CacheName::Unnamed => None,
        }
    }

    pub fn state(&self) -> &CacheName {
        &self.state
    }

    pub fn is_named(&self) -> bool {
        self.state.is_named()
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Normalized extension, always starting with `.`
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_append_timestamp(&self) -> bool {
        self.append_timestamp
    }

    /// Full path of the cache file, or `None` while unnamed
    pub fn path(&self) -> Option<PathBuf> {
        self.name().map(|name| Path::new(&self.directory).join(name))
    }

    /// Appends content, creating the file if it does not exist yet
    ///
    /// Empty content is a no-op.
    pub fn append(&self, content: &[u8]) -> Result<()> {
        if content.is_empty() {
            return Ok(());
        }
        let path = self.resolved_path()?;

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| file.write_all(content))
            .map_err(|source| cache_io(&path, source))?;

        info!(path = %path.display(), bytes = content.len(), "appended to cache");
        Ok(())
    }

    /// Replaces the file's content, creating it if needed
    ///
    /// Empty content is a no-op.
    pub fn create(&self, content: &[u8]) -> Result<()> {
        if content.is_empty() {
            return Ok(());
        }
        let path = self.resolved_path()?;

        fs::write(&path, content).map_err(|source| cache_io(&path, source))?;

        info!(path = %path.display(), bytes = content.len(), "wrote cache");
        Ok(())
    }

    /// Removes the file if present
    ///
    /// # Returns
    /// * `Ok(true)` if a file was removed
    /// * `Ok(false)` if there was nothing to remove, including while unnamed
    pub fn delete(&self) -> Result<bool> {
        let Some(path) = self.path() else {
            return Ok(false);
        };

        match fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "deleted cache");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(cache_io(&path, source)),
        }
    }

    fn file_name(&self, name: &str) -> String {
        if self.append_timestamp {
            format!("{}{}{}", name, self.created_at, self.extension)
        } else {
            format!("{}{}", name, self.extension)
        }
    }

    fn resolved_path(&self) -> Result<PathBuf> {
        self.path().ok_or_else(|| QuakeError::CacheIo {
            path: PathBuf::from(&self.directory),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                "cache file name has not been set",
            ),
        })
    }

    /// Creates the directory (one level only) if it is missing
    fn ensure_dir(&self) -> Result<()> {
        let dir = Path::new(&self.directory);
        if dir.is_dir() {
            return Ok(());
        }
        match fs::create_dir(dir) {
            Ok(()) => {
                debug!(directory = %self.directory, "created cache directory");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(source) => Err(cache_io(dir, source)),
        }
    }
}

fn cache_io(path: &Path, source: io::Error) -> QuakeError {
    QuakeError::CacheIo {
        path: path.to_path_buf(),
        source,
    }
}

fn ends_with_separator(directory: &str) -> bool {
    directory.ends_with('/') || directory.ends_with(MAIN_SEPARATOR)
}

/// Checks an extension against `\.?\w+` and gives it a leading dot
fn normalize_extension(extension: &str) -> Result<String> {
    let body = extension.strip_prefix('.').unwrap_or(extension);
    let valid = !body.is_empty() && body.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(QuakeError::InvalidConfig(format!(
            "invalid cache extension '{}'",
            extension
        )));
    }
    Ok(format!(".{}", body))
}
