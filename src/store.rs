//! Chat collection owned by the running process.
//!
//! [`ChatStore`] is the single mutable collection the import engine commits
//! into and the presentation layer reads from. It lives only for the
//! lifetime of the process; persisting it is the surrounding system's
//! concern. Mutation goes through [`ChatStore::upsert`] (the merge commit
//! step) and the explicit removal operations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::media::MediaAttachment;
use crate::message::Message;

/// One conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    /// Assigned once at creation, stable across later merges.
    pub id: Uuid,

    /// Derived display label; never altered by a merge, deduplicated
    /// against sibling names at creation.
    pub name: String,

    /// Author names in order of first appearance, capped at a small
    /// display count.
    pub participants: Vec<String>,

    /// Sorted, deduplicated, uncapped set of every author ever merged into
    /// this chat. Two transcripts are the same conversation when this key
    /// matches, independent of filename.
    pub identity_key: Vec<String>,

    /// Ordered message sequence, append-only across imports.
    pub messages: Vec<Message>,
}

impl Chat {
    /// Creates a chat with a fresh identifier.
    pub fn new(
        name: impl Into<String>,
        participants: Vec<String>,
        identity_key: Vec<String>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            participants,
            identity_key,
            messages,
        }
    }

    /// Number of messages in the chat.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Attachments whose bytes were resolved, in message order.
    ///
    /// This is the list a media lightbox steps through.
    pub fn resolved_media(&self) -> Vec<&MediaAttachment> {
        self.messages
            .iter()
            .filter_map(|m| m.media.as_ref())
            .filter(|a| !a.is_dangling())
            .collect()
    }
}

/// The full set of chats held by the running process.
#[derive(Debug, Default, Clone)]
pub struct ChatStore {
    chats: Vec<Chat>,
}

impl ChatStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a chat by identifier.
    pub fn get(&self, id: Uuid) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == id)
    }

    /// Replaces the chat with a matching id in place, or prepends the chat
    /// as new. This is the only write path the import engine uses.
    pub fn upsert(&mut self, chat: Chat) {
        match self.chats.iter_mut().find(|c| c.id == chat.id) {
            Some(existing) => *existing = chat,
            None => self.chats.insert(0, chat),
        }
    }

    /// Removes a chat, returning it if it existed.
    pub fn remove(&mut self, id: Uuid) -> Option<Chat> {
        let idx = self.chats.iter().position(|c| c.id == id)?;
        Some(self.chats.remove(idx))
    }

    /// Removes every chat.
    pub fn clear(&mut self) {
        self.chats.clear();
    }

    /// Iterates chats in display order (most recently added first).
    pub fn iter(&self) -> impl Iterator<Item = &Chat> {
        self.chats.iter()
    }

    /// Number of chats.
    pub fn len(&self) -> usize {
        self.chats.len()
    }

    /// Returns `true` if the store holds no chats.
    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }
}
