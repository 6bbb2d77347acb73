//! Archive import and incremental merge.
//!
//! One import call walks every transcript in an archive snapshot, in
//! discovery order: parse, link attachments, resolve chat identity, then
//! merge. The chat collection is only written after every transcript has
//! been resolved, so a caller never observes a half-applied import.
//! Transcripts are handled one at a time because identity resolution and
//! generic-name disambiguation for later transcripts depend on chats
//! already produced earlier in the same call.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::archive::{Archive, ArchiveEntry};
use crate::error::{ChatmergeError, Result};
use crate::media::{self, MediaAttachment, MediaResource, PDF_MIME};
use crate::message::{Message, MessageKey};
use crate::store::{Chat, ChatStore};
use crate::transcript::TranscriptParser;

/// Outcome counts for one import call, covering every transcript processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Chats created.
    pub added: usize,
    /// Existing chats that received new messages.
    pub updated: usize,
    /// Transcripts whose messages were all already present.
    pub skipped: usize,
}

/// Configuration for the import engine.
///
/// # Example
///
/// ```
/// use chatmerge::import::ImportConfig;
///
/// let config = ImportConfig::new()
///     .with_local_display_name("Me")
///     .with_participant_display_cap(5);
/// ```
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// The local user's display name, excluded when naming a two-party chat
    /// after "the other person" (default: none).
    pub local_display_name: Option<String>,

    /// Maximum participants kept on a chat for display (default: 5).
    pub participant_display_cap: usize,

    /// Bound on the numeric-suffix loop when deduplicating chat names
    /// (default: 1000).
    pub name_collision_limit: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            local_display_name: None,
            participant_display_cap: 5,
            name_collision_limit: 1000,
        }
    }
}

impl ImportConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the local user's display name.
    #[must_use]
    pub fn with_local_display_name(mut self, name: impl Into<String>) -> Self {
        self.local_display_name = Some(name.into());
        self
    }

    /// Sets the participant display cap.
    #[must_use]
    pub fn with_participant_display_cap(mut self, cap: usize) -> Self {
        self.participant_display_cap = cap;
        self
    }

    /// Sets the name-collision loop bound.
    #[must_use]
    pub fn with_name_collision_limit(mut self, limit: usize) -> Self {
        self.name_collision_limit = limit;
        self
    }
}

/// The import/merge engine.
///
/// # Example
///
/// ```
/// use chatmerge::archive::MemoryArchive;
/// use chatmerge::import::Importer;
/// use chatmerge::store::ChatStore;
///
/// # async fn example() -> chatmerge::Result<()> {
/// let archive = MemoryArchive::new()
///     .with_entry("_chat.txt", "12/31/24, 9:41 PM - John Doe: Hello");
///
/// let mut store = ChatStore::new();
/// let summary = Importer::new().import(&archive, &mut store).await?;
/// assert_eq!(summary.added, 1);
/// # Ok(())
/// # }
/// ```
pub struct Importer {
    config: ImportConfig,
    parser: TranscriptParser,
}

impl Importer {
    /// Creates an importer with default configuration.
    pub fn new() -> Self {
        Self::with_config(ImportConfig::default())
    }

    /// Creates an importer with custom configuration.
    pub fn with_config(config: ImportConfig) -> Self {
        Self {
            config,
            parser: TranscriptParser::new(),
        }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Imports every transcript in `archive` into `store`.
    ///
    /// Fails only when the archive holds no transcript entry, leaving the
    /// store untouched. Every other anomaly degrades: unresolved attachment
    /// references become dangling descriptors, unparseable lines fold into
    /// the previous message, and pure-duplicate transcripts count as
    /// `skipped`.
    pub async fn import(
        &self,
        archive: &dyn Archive,
        store: &mut ChatStore,
    ) -> Result<ImportSummary> {
        let entries = archive.entries();
        let transcripts: Vec<String> = entries
            .iter()
            .filter(|e| is_transcript(e))
            .map(|e| e.name.clone())
            .collect();
        if transcripts.is_empty() {
            return Err(ChatmergeError::NoTranscript);
        }
        debug!(transcripts = transcripts.len(), "discovered transcript entries");

        let media_index = build_media_index(&entries);

        let mut summary = ImportSummary::default();
        let mut updated: Vec<Chat> = Vec::new();
        let mut created: Vec<Chat> = Vec::new();

        for transcript_name in &transcripts {
            let text = archive.read_text(transcript_name).await?;
            let mut messages = self.parser.parse(&text);
            self.link_attachments(archive, &media_index, &mut messages)
                .await?;

            let key = participant_key(&messages);

            // Identity resolution sees chats produced earlier in this call
            // before it consults the pre-import store snapshot.
            if let Some(i) = created.iter().position(|c| c.identity_key == key) {
                if self.merge_into(&mut created[i], &messages) {
                    summary.updated += 1;
                } else {
                    summary.skipped += 1;
                }
            } else if let Some(i) = updated.iter().position(|c| c.identity_key == key) {
                if self.merge_into(&mut updated[i], &messages) {
                    summary.updated += 1;
                } else {
                    summary.skipped += 1;
                }
            } else if let Some(existing) = store
                .iter()
                .find(|c| c.identity_key == key && !updated.iter().any(|u| u.id == c.id))
            {
                let mut chat = existing.clone();
                if self.merge_into(&mut chat, &messages) {
                    updated.push(chat);
                    summary.updated += 1;
                } else {
                    summary.skipped += 1;
                }
            } else {
                let taken = |name: &str| {
                    store.iter().any(|c| c.name == name)
                        || created.iter().any(|c| c.name == name)
                        || updated.iter().any(|c| c.name == name)
                };
                let name = self.derive_name(transcript_name, &key, &taken);

                let mut participants: Vec<String> = Vec::new();
                for msg in &messages {
                    if !participants.contains(&msg.author) {
                        participants.push(msg.author.clone());
                    }
                }
                participants.truncate(self.config.participant_display_cap);

                let chat = Chat::new(name, participants, key, messages);
                debug!(chat = %chat.name, messages = chat.message_count(), "created chat");
                created.push(chat);
                summary.added += 1;
            }
        }

        // Commit: updates applied in place by id, new chats prepended in
        // discovery order. Nothing was written before this point.
        for chat in updated {
            store.upsert(chat);
        }
        for chat in created.into_iter().rev() {
            store.upsert(chat);
        }

        debug!(
            added = summary.added,
            updated = summary.updated,
            skipped = summary.skipped,
            "import committed"
        );
        Ok(summary)
    }

    /// Binds each message to the archive entry its content references.
    async fn link_attachments(
        &self,
        archive: &dyn Archive,
        index: &HashMap<String, String>,
        messages: &mut [Message],
    ) -> Result<()> {
        for msg in messages.iter_mut() {
            let candidates = media::filename_candidates(&msg.content);

            // First hit wins: exact basename before the lowercase fallback.
            let mut hit: Option<(String, String)> = None;
            for candidate in &candidates {
                let base = media::basename(candidate);
                if let Some(entry) = index.get(base) {
                    hit = Some((base.to_string(), entry.clone()));
                    break;
                }
                let lower = base.to_lowercase();
                if let Some(entry) = index.get(&lower) {
                    hit = Some((lower, entry.clone()));
                    break;
                }
            }

            if let Some((base, entry_name)) = hit {
                let bytes = archive.read_bytes(&entry_name).await?;
                let mime = base
                    .to_lowercase()
                    .ends_with(".pdf")
                    .then(|| PDF_MIME.to_string());
                msg.media = Some(MediaAttachment::resolved(base, MediaResource { bytes, mime }));
            } else if let Some(first) = candidates.first() {
                let fallback = media::basename(first).to_string();
                warn!(name = %fallback, "attachment referenced but missing from archive");
                msg.media = Some(MediaAttachment::dangling(fallback));
            } else if media::mentions_omitted_attachment(&msg.content) {
                msg.media = Some(MediaAttachment::placeholder());
            }
        }
        Ok(())
    }

    /// Appends a parsed transcript's new messages to `chat`.
    ///
    /// Returns `false` when the transcript is a pure duplicate; the chat is
    /// left untouched in that case. Identity and display name are never
    /// altered here.
    fn merge_into(&self, chat: &mut Chat, parsed: &[Message]) -> bool {
        let fresh = merge_messages(&chat.messages, parsed);
        if fresh.is_empty() {
            debug!(chat = %chat.name, "duplicate transcript, nothing to merge");
            return false;
        }

        for msg in parsed {
            if !chat.participants.contains(&msg.author) {
                chat.participants.push(msg.author.clone());
            }
        }
        chat.participants
            .truncate(self.config.participant_display_cap);

        let mut key: BTreeSet<String> = chat.identity_key.iter().cloned().collect();
        key.extend(parsed.iter().map(|m| m.author.clone()));
        chat.identity_key = key.into_iter().collect();

        debug!(chat = %chat.name, appended = fresh.len(), "merged transcript");
        chat.messages.extend(fresh);
        true
    }

    /// Derives a unique display name for a new chat.
    ///
    /// Generic transcript basenames carry no identity, so the name is
    /// synthesized from the participant set instead: the other party for a
    /// two-person chat, the first few names for a group. Collisions get an
    /// incrementing ` (N)` suffix, bounded so pathological inputs cannot
    /// spin forever.
    fn derive_name(
        &self,
        entry_name: &str,
        identity_key: &[String],
        is_taken: &dyn Fn(&str) -> bool,
    ) -> String {
        let base = media::basename(entry_name);
        let stem = if base.to_lowercase().ends_with(".txt") {
            &base[..base.len() - 4]
        } else {
            base
        };

        let mut name = stem.to_string();
        if matches!(stem, "_chat" | "chat" | "Chat") {
            if identity_key.len() == 2 {
                let local = self.config.local_display_name.as_deref();
                name = identity_key
                    .iter()
                    .find(|p| Some(p.as_str()) != local)
                    .unwrap_or(&identity_key[0])
                    .clone();
            } else if identity_key.len() > 2 {
                let head = identity_key[..3].join(", ");
                name = if identity_key.len() > 3 {
                    format!("{head}...")
                } else {
                    head
                };
            }
        }

        if !is_taken(&name) {
            return name;
        }
        for counter in 1..=self.config.name_collision_limit {
            let candidate = format!("{name} ({counter})");
            if !is_taken(&candidate) {
                return candidate;
            }
        }
        // Bound exhausted; a fresh v4 id cannot collide.
        format!("{name} ({})", Uuid::new_v4())
    }
}

impl Default for Importer {
    fn default() -> Self {
        Self::new()
    }
}

/// Transcript entries: any `.txt`, or the default export basename `_chat`.
fn is_transcript(entry: &ArchiveEntry) -> bool {
    if entry.is_dir {
        return false;
    }
    entry.name.to_lowercase().ends_with(".txt")
        || media::basename(&entry.name).eq_ignore_ascii_case("_chat")
}

/// Basename (and lowercased basename) to entry name, over every
/// non-transcript file, for case-insensitive attachment resolution.
fn build_media_index(entries: &[ArchiveEntry]) -> HashMap<String, String> {
    let mut index = HashMap::new();
    for entry in entries {
        if entry.is_dir || is_transcript(entry) {
            continue;
        }
        let base = media::basename(&entry.name).to_string();
        index.insert(base.to_lowercase(), entry.name.clone());
        index.insert(base, entry.name.clone());
    }
    index
}

/// Sorted, deduplicated author set of a parsed transcript.
fn participant_key(messages: &[Message]) -> Vec<String> {
    let set: BTreeSet<&str> = messages.iter().map(|m| m.author.as_str()).collect();
    set.into_iter().map(str::to_string).collect()
}

/// Messages from `parsed` that are not already in `existing`.
///
/// Fast path: locate the last stored message inside the parsed sequence and
/// take everything after it, one O(n) pass. When the anchor is missing (a
/// previously truncated chat, reordered export) or yields nothing, fall
/// back to a full set difference on the structural message key.
fn merge_messages(existing: &[Message], parsed: &[Message]) -> Vec<Message> {
    let mut fresh: Vec<Message> = Vec::new();

    if let Some(last) = existing.last() {
        if let Some(pos) = parsed.iter().position(|m| m.key() == last.key()) {
            fresh = parsed[pos + 1..].to_vec();
        }
    }

    if fresh.is_empty() {
        let seen: HashSet<MessageKey<'_>> = existing.iter().map(Message::key).collect();
        fresh = parsed
            .iter()
            .filter(|m| !seen.contains(&m.key()))
            .cloned()
            .collect();
    }

    fresh
}
