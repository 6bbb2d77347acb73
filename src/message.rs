//! Message data model.
//!
//! [`Message`] is one utterance in a transcript. The parser assigns ids and
//! keeps the timestamp exactly as it was rendered in the export; different
//! export settings use different date conventions and the original rendering
//! is preserved rather than normalized to a calendar type.

use serde::{Deserialize, Serialize};

use crate::media::MediaAttachment;

/// One utterance in a transcript.
///
/// # Fields
///
/// | Field | Description |
/// |-------|-------------|
/// | `id` | Parse-pass ordinal, stable only within one parse |
/// | `timestamp` | Verbatim `<date> <time>` string from the transcript |
/// | `author` | Display name exactly as it appears before the separator |
/// | `content` | Message body, may contain embedded newlines from continuation lines |
/// | `media` | At most one linked attachment |
///
/// # Serialization
///
/// Implements `Serialize` and `Deserialize`; `media` is omitted from JSON
/// when `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Ordinal assigned at parse time. Not a content hash; two parses of the
    /// same text assign the same ids, but ids are not unique across chats.
    pub id: u64,

    /// The verbatim date+time string as it appeared in the transcript.
    pub timestamp: String,

    /// Free-text display name of the message author.
    pub author: String,

    /// Message body. Continuation lines are appended with an embedded `\n`.
    pub content: String,

    /// Linked attachment, if the content referenced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub media: Option<MediaAttachment>,
}

impl Message {
    /// Creates a message without media.
    pub fn new(
        id: u64,
        timestamp: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            timestamp: timestamp.into(),
            author: author.into(),
            content: content.into(),
            media: None,
        }
    }

    /// Builder method to attach media.
    #[must_use]
    pub fn with_media(mut self, media: MediaAttachment) -> Self {
        self.media = Some(media);
        self
    }

    /// Returns the structural identity key used for deduplication.
    pub fn key(&self) -> MessageKey<'_> {
        MessageKey {
            author: &self.author,
            content: &self.content,
            timestamp: &self.timestamp,
        }
    }

    /// Returns `true` if an attachment is linked.
    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }
}

/// Composite identity key for a message, compared by structural equality.
///
/// Used by the merge engine to recognize already-imported messages. An
/// explicit struct avoids the collisions a separator-joined string key would
/// allow when the separator appears in the content itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageKey<'a> {
    /// Author exactly as parsed.
    pub author: &'a str,
    /// Full content, including folded continuation lines.
    pub content: &'a str,
    /// Verbatim timestamp string.
    pub timestamp: &'a str,
}
