//! Unified error types for chatmerge.
//!
//! This module provides a single [`ChatmergeError`] enum covering every
//! error case in the library. Parsing itself is total and never produces an
//! error; everything here originates from the archive boundary, except for
//! [`ChatmergeError::NoTranscript`], which is the one import-level failure.

use std::io;

use thiserror::Error;

/// A specialized [`Result`] type for chatmerge operations.
pub type Result<T> = std::result::Result<T, ChatmergeError>;

/// The error type for all chatmerge operations.
///
/// An import call fails as a whole only for [`NoTranscript`]. All other
/// anomalies (unresolved attachments, unparseable lines, duplicate
/// transcripts) degrade gracefully and are reported through the data model
/// and the import summary instead.
///
/// [`NoTranscript`]: ChatmergeError::NoTranscript
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatmergeError {
    /// The archive contains no transcript entry.
    ///
    /// This is the only terminal failure of an import call: the chat
    /// collection is left untouched when it is returned.
    #[error("no transcript entry found in archive")]
    NoTranscript,

    /// An archive read referenced an entry that does not exist.
    #[error("archive entry not found: {name}")]
    EntryNotFound {
        /// Name of the missing entry.
        name: String,
    },

    /// An I/O error from an archive-backed read.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// An entry read as text was not valid UTF-8.
    #[error("entry '{name}' is not valid UTF-8: {source}")]
    Utf8 {
        /// Name of the offending entry.
        name: String,
        /// The underlying UTF-8 error.
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl ChatmergeError {
    /// Creates an [`EntryNotFound`](Self::EntryNotFound) error.
    pub fn entry_not_found(name: impl Into<String>) -> Self {
        ChatmergeError::EntryNotFound { name: name.into() }
    }

    /// Creates a [`Utf8`](Self::Utf8) error for the named entry.
    pub fn utf8(name: impl Into<String>, source: std::string::FromUtf8Error) -> Self {
        ChatmergeError::Utf8 {
            name: name.into(),
            source,
        }
    }

    /// Returns `true` if this is the terminal "no transcript" failure.
    pub fn is_no_transcript(&self) -> bool {
        matches!(self, ChatmergeError::NoTranscript)
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatmergeError::Io(_))
    }

    /// Returns `true` if this is a missing-entry error.
    pub fn is_entry_not_found(&self) -> bool {
        matches!(self, ChatmergeError::EntryNotFound { .. })
    }
}
