//! Archive capability consumed by the import engine.
//!
//! The import engine never opens a bundle itself; it is handed something
//! that can enumerate entries and read them. [`Archive`] is that seam, with
//! the text and byte reads as the only suspension points. [`MemoryArchive`]
//! is the bundled implementation for callers (and tests) that already hold
//! the unpacked entries in memory; a zip-backed implementation lives with
//! whatever code owns the actual file format.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::{ChatmergeError, Result};

/// Metadata for one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Full entry name, `/`-separated.
    pub name: String,
    /// `true` for directory entries; these are never read.
    pub is_dir: bool,
}

/// Read access to an archive snapshot.
#[async_trait]
pub trait Archive: Send + Sync {
    /// Enumerates every entry, in a stable order.
    fn entries(&self) -> Vec<ArchiveEntry>;

    /// Reads an entry and decodes it as UTF-8 text.
    async fn read_text(&self, name: &str) -> Result<String>;

    /// Reads an entry's raw bytes.
    async fn read_bytes(&self, name: &str) -> Result<Vec<u8>>;
}

/// An archive whose entries are already unpacked into memory.
///
/// # Example
///
/// ```
/// use chatmerge::archive::MemoryArchive;
///
/// let archive = MemoryArchive::new()
///     .with_entry("_chat.txt", "1/1/25, 9:00 AM - Alice: hi")
///     .with_entry("photo.jpg", vec![0xff, 0xd8]);
/// assert_eq!(archive.len(), 2);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryArchive {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryArchive {
    /// Creates an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. Names ending in `/` are treated as directories.
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), bytes.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_entry(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the archive holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Archive for MemoryArchive {
    fn entries(&self) -> Vec<ArchiveEntry> {
        self.entries
            .keys()
            .map(|name| ArchiveEntry {
                name: name.clone(),
                is_dir: name.ends_with('/'),
            })
            .collect()
    }

    async fn read_text(&self, name: &str) -> Result<String> {
        let bytes = self.read_bytes(name).await?;
        String::from_utf8(bytes).map_err(|source| ChatmergeError::utf8(name, source))
    }

    async fn read_bytes(&self, name: &str) -> Result<Vec<u8>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| ChatmergeError::entry_not_found(name))
    }
}
