//! Media attachment model and filename scanning.
//!
//! Transcripts reference their attachments by filename inside the message
//! text, either in an explicit `<attached: photo.jpg>` marker or as a bare
//! filename-like token. This module classifies filenames into a media kind
//! and extracts candidate filenames from message content; resolving them
//! against the archive happens in the import engine.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// MIME type forced onto resolved `.pdf` payloads.
///
/// Document previews require a typed payload even when the archive stored
/// the bytes untyped.
pub const PDF_MIME: &str = "application/pdf";

/// Filename-like token carrying a known media extension.
static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[\w\s()\-.,@!$%#&+~=^`'\[\]]+\.(?:png|jpe?g|gif|webp|mp4|webm|mov|m4v|mp3|wav|ogg|m4a|pdf)",
    )
    .unwrap()
});

/// Explicit attachment declaration: `<attached: photo.jpg>`.
static ATTACHED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<\s*attached:\s*([^>]+)\s*>").unwrap());

/// Marker left behind when the export excluded the binary.
static OMITTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<attachment omitted>").unwrap());

/// Media classification, inferred purely from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// `png`, `jpg`, `jpeg`, `gif`, `webp`
    Image,
    /// `mp4`, `webm`, `mov`, `m4v`
    Video,
    /// `mp3`, `wav`, `ogg`, `m4a`
    Audio,
    /// `pdf`, classified ahead of the generic file fallback
    Pdf,
    /// Anything else referenced as an attachment
    File,
}

impl MediaKind {
    /// Infers the media kind from a filename's extension.
    ///
    /// Unmatched extensions (and extension-less names) default to
    /// [`MediaKind::File`].
    pub fn from_filename(name: &str) -> Self {
        let lower = name.to_lowercase();
        let ext = lower.rsplit('.').next().unwrap_or(&lower);
        match ext {
            "png" | "jpg" | "jpeg" | "gif" | "webp" => MediaKind::Image,
            "mp4" | "webm" | "mov" | "m4v" => MediaKind::Video,
            "mp3" | "wav" | "ogg" | "m4a" => MediaKind::Audio,
            "pdf" => MediaKind::Pdf,
            _ => MediaKind::File,
        }
    }
}

/// Attachment descriptor on a message.
///
/// `resource` is populated only when the referenced binary was found inside
/// the archive; otherwise the name is still exposed so a UI can render a
/// dangling-reference placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAttachment {
    /// Kind inferred from the filename extension.
    pub kind: MediaKind,
    /// Basename of the referenced file.
    pub name: String,
    /// Resolved payload, `None` for dangling references.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub resource: Option<MediaResource>,
}

impl MediaAttachment {
    /// Creates a resolved attachment carrying its payload.
    pub fn resolved(name: impl Into<String>, resource: MediaResource) -> Self {
        let name = name.into();
        Self {
            kind: MediaKind::from_filename(&name),
            name,
            resource: Some(resource),
        }
    }

    /// Creates a dangling reference: the filename was mentioned but the
    /// binary is not in the archive.
    pub fn dangling(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: MediaKind::from_filename(&name),
            name,
            resource: None,
        }
    }

    /// Generic placeholder for an `<attachment omitted>` marker with no
    /// recoverable filename.
    pub fn placeholder() -> Self {
        Self {
            kind: MediaKind::File,
            name: "attachment".to_string(),
            resource: None,
        }
    }

    /// Returns `true` if the payload could not be located in the archive.
    pub fn is_dangling(&self) -> bool {
        self.resource.is_none()
    }
}

/// Resolved attachment payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaResource {
    /// Raw bytes read from the archive entry.
    pub bytes: Vec<u8>,
    /// Forced MIME type; only `.pdf` payloads are re-tagged, everything else
    /// keeps whatever typing the archive had.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub mime: Option<String>,
}

/// Extracts filename candidates from message content, in resolution order.
///
/// Tokens inside an explicit `<attached: …>` marker come first; they are
/// unambiguous attachment declarations. Any remaining filename-like token in
/// the rest of the content follows, skipping duplicates.
pub fn filename_candidates(content: &str) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();

    if let Some(caps) = ATTACHED_RE.captures(content) {
        let block = caps.get(1).map_or("", |m| m.as_str());
        for m in FILENAME_RE.find_iter(block) {
            let name = m.as_str().to_string();
            if !candidates.contains(&name) {
                candidates.push(name);
            }
        }
    }

    for m in FILENAME_RE.find_iter(content) {
        let name = m.as_str().to_string();
        if !candidates.contains(&name) {
            candidates.push(name);
        }
    }

    candidates
}

/// Returns `true` if the content carries an `<attachment omitted>` marker.
pub fn mentions_omitted_attachment(content: &str) -> bool {
    OMITTED_RE.is_match(content)
}

/// Returns the final path segment of an entry name.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
