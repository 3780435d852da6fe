//! Flat-file page storage
//!
//! Maps page titles to files under a fixed data directory. One file per
//! page, named `<title>.txt`, holding the exact byte body with no metadata.
//! A page exists exactly when its file exists.

use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default data directory, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// File extension for stored pages
pub const PAGE_EXT: &str = "txt";

/// A titled unit of wiki content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Unique page identifier, also the filename stem
    pub title: String,
    /// Raw page content
    pub body: Vec<u8>,
}

impl Page {
    /// Create a page with the given title and body
    pub fn new(title: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            title: title.into(),
            body,
        }
    }

    /// Create an empty page with only the title set
    pub fn blank(title: impl Into<String>) -> Self {
        Self::new(title, Vec::new())
    }

    /// Body as text for display, lossy on invalid UTF-8
    pub fn body_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Store error type
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no page named {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// File-based page store
///
/// All operations are plain blocking file I/O. Concurrent saves to the
/// same title are unsynchronized; last write wins.
#[derive(Debug, Clone)]
pub struct PageStore {
    data_dir: PathBuf,
}

impl PageStore {
    /// Create a store rooted at the given data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Get the data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Create the data directory if it does not exist
    pub fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    fn page_path(&self, title: &str) -> PathBuf {
        self.data_dir.join(format!("{title}.{PAGE_EXT}"))
    }

    /// Load the page with the given title
    ///
    /// Any read failure, a missing file included, is reported as
    /// [`StoreError::NotFound`].
    pub fn load(&self, title: &str) -> Result<Page, StoreError> {
        let body = fs::read(self.page_path(title))
            .map_err(|_| StoreError::NotFound(title.to_string()))?;
        Ok(Page::new(title, body))
    }

    /// Persist a page, creating or truncating its file
    ///
    /// The file is created with owner-only permission. An existing file
    /// keeps its mode and is overwritten in place.
    pub fn save(&self, page: &Page) -> Result<(), StoreError> {
        let mut file = open_owner_only(&self.page_path(&page.title))?;
        file.write_all(&page.body)?;
        Ok(())
    }

    /// List the titles of all stored pages, sorted
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut titles = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(PAGE_EXT) {
                continue;
            }
            if let Some(title) = path.file_stem().and_then(|s| s.to_str()) {
                tracing::debug!(page = title, "listing page");
                titles.push(title.to_string());
            }
        }
        titles.sort();
        Ok(titles)
    }
}

#[cfg(unix)]
fn open_owner_only(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_owner_only(path: &Path) -> std::io::Result<fs::File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
