//! # Chatmerge
//!
//! A Rust library for turning archived WhatsApp-style chat exports into a
//! structured, incrementally-merged chat collection.
//!
//! ## Overview
//!
//! An export bundle holds one or more plain-text transcripts plus the media
//! files they reference. Chatmerge:
//!
//! - parses each transcript into an ordered sequence of timestamped
//!   messages (multiple locale formats, multiline continuation handling),
//! - links messages to the media entries their content references,
//! - recognizes which conversation each transcript belongs to by its
//!   participant set, independent of filename,
//! - merges new imports into the in-memory [`ChatStore`] without
//!   duplicating previously-seen messages, reporting
//!   added/updated/skipped counts.
//!
//! Reading the bundle itself (zip decoding, filesystem access) is the
//! caller's concern, supplied through the [`Archive`] trait.
//!
//! ## Quick Start
//!
//! ```
//! use chatmerge::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> chatmerge::Result<()> {
//! let archive = MemoryArchive::new().with_entry(
//!     "_chat.txt",
//!     "12/31/24, 9:41 PM - John Doe: Hello\n12/31/24, 9:42 PM - Jane Doe: Hi!",
//! );
//!
//! let mut store = ChatStore::new();
//! let importer = Importer::new();
//!
//! let summary = importer.import(&archive, &mut store).await?;
//! assert_eq!(summary.added, 1);
//!
//! // Importing the same archive again changes nothing.
//! let summary = importer.import(&archive, &mut store).await?;
//! assert_eq!(summary.skipped, 1);
//! assert_eq!(store.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - [`transcript`] — the pure transcript parser
//! - [`import`] — the import/merge engine and its configuration
//! - [`archive`] — the archive-reading capability and an in-memory impl
//! - [`store`] — [`Chat`] and the process-wide [`ChatStore`]
//! - [`message`] / [`media`] — the shared data model
//! - [`error`] — [`ChatmergeError`] and the crate [`Result`]

pub mod archive;
pub mod error;
pub mod import;
pub mod media;
pub mod message;
pub mod store;
pub mod transcript;

pub use archive::{Archive, ArchiveEntry, MemoryArchive};
pub use error::{ChatmergeError, Result};
pub use import::{ImportConfig, ImportSummary, Importer};
pub use media::{MediaAttachment, MediaKind, MediaResource};
pub use message::{Message, MessageKey};
pub use store::{Chat, ChatStore};
pub use transcript::TranscriptParser;

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::archive::{Archive, ArchiveEntry, MemoryArchive};
    pub use crate::error::{ChatmergeError, Result};
    pub use crate::import::{ImportConfig, ImportSummary, Importer};
    pub use crate::media::{MediaAttachment, MediaKind, MediaResource};
    pub use crate::message::{Message, MessageKey};
    pub use crate::store::{Chat, ChatStore};
    pub use crate::transcript::TranscriptParser;
}
