//! Byte sources for reference data.

use flate2::read::GzDecoder;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::Path;
use std::sync::Arc;

/// Opens the reference data named by a key.
pub trait TableSource: Send + Sync {
    /// Open the data for `key` for reading.
    fn open(&self, key: &str) -> io::Result<Box<dyn Read + Send>>;
}

/// Reads reference files from the local file system.
///
/// Keys are file paths. Paths ending in `.gz` are decompressed on the fly.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl TableSource for FileSource {
    fn open(&self, key: &str) -> io::Result<Box<dyn Read + Send>> {
        let path = Path::new(key);
        let file = File::open(path)?;

        if path.extension().is_some_and(|ext| ext == "gz") {
            Ok(Box::new(GzDecoder::new(file)))
        } else {
            Ok(Box::new(file))
        }
    }
}

/// In-memory reference data keyed by name.
///
/// Useful for embedding a table in a binary or for tests. Contents can be
/// replaced at any time; a [`TableCache`](crate::TableCache) only sees the
/// new data on its next build.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: RwLock<HashMap<String, Arc<[u8]>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace the data for `key`.
    pub fn insert(&self, key: impl Into<String>, data: impl AsRef<[u8]>) {
        self.files
            .write()
            .insert(key.into(), Arc::from(data.as_ref()));
    }

    /// Remove the data for `key`, returning whether it existed.
    pub fn remove(&self, key: &str) -> bool {
        self.files.write().remove(key).is_some()
    }
}

impl TableSource for MemorySource {
    fn open(&self, key: &str) -> io::Result<Box<dyn Read + Send>> {
        let data = self.files.read().get(key).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no data for {}", key))
        })?;
        Ok(Box::new(Cursor::new(data)))
    }
}
