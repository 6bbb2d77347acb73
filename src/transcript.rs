//! Transcript parser for WhatsApp-style text exports.
//!
//! Exports vary by locale and platform. Three header shapes are recognized,
//! tried in priority order:
//!
//! - `12/31/24, 9:41 PM - John Doe: Message` (short date, hyphen separator)
//! - `[12/31/24, 9:41:09 PM] John Doe: Message` (bracketed date-time)
//! - `2024-12-31, 21:41 - John Doe: Message` (ISO date, 24-hour time)
//!
//! Parsing is total: a line matching no pattern either folds into the
//! previous message's content (multiline messages, system lines) or, before
//! the first header, is dropped.

use regex::Regex;

use crate::message::Message;

/// Header patterns in priority order; each captures
/// `(date, time, author, content)`.
const HEADER_PATTERNS: [&str; 3] = [
    // 12/31/24, 9:41 PM - John Doe: Message
    r"(?i)^(\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}),?\s+(\d{1,2}:\d{2}(?::\d{2})?(?:\s?[AP]M)?)\s+-\s+([^:]+):\s+(.*)$",
    // [12/31/24, 9:41:09 PM] John Doe: Message
    r"(?i)^\[(\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}),\s+(\d{1,2}:\d{2}(?::\d{2})?(?:\s?[AP]M)?)\]\s+([^:]+):\s+(.*)$",
    // 2024-12-31, 21:41 - John Doe: Message
    r"^(\d{4}[/\-.]\d{1,2}[/\-.]\d{1,2}),?\s+(\d{1,2}:\d{2}(?::\d{2})?)\s+-\s+([^:]+):\s+(.*)$",
];

/// Parser for WhatsApp-style transcript text.
///
/// # Example
///
/// ```
/// use chatmerge::transcript::TranscriptParser;
///
/// let parser = TranscriptParser::new();
/// let messages = parser.parse("12/31/24, 9:41 PM - John Doe: Hello");
///
/// assert_eq!(messages.len(), 1);
/// assert_eq!(messages[0].author, "John Doe");
/// assert_eq!(messages[0].timestamp, "12/31/24 9:41 PM");
/// ```
pub struct TranscriptParser {
    patterns: Vec<Regex>,
}

impl TranscriptParser {
    /// Creates a parser with the header patterns compiled.
    pub fn new() -> Self {
        Self {
            patterns: HEADER_PATTERNS
                .iter()
                .map(|p| Regex::new(p).unwrap())
                .collect(),
        }
    }

    /// Strips artifacts the exporting application injects across locales.
    ///
    /// Directional marks are removed, non-breaking and narrow-no-break
    /// spaces become ordinary spaces, and en/em dashes become hyphens.
    /// Without this pass the date/time tokens in many locales never match.
    fn normalize(text: &str) -> String {
        text.chars()
            .filter_map(|c| match c {
                '\u{200e}' | '\u{200f}' => None,
                '\u{00a0}' | '\u{202f}' => Some(' '),
                '\u{2013}' | '\u{2014}' => Some('-'),
                other => Some(other),
            })
            .collect()
    }

    /// Parses transcript text into an ordered message sequence.
    ///
    /// Total and pure: malformed lines never fail the parse. A line that
    /// matches no header pattern is appended to the most recently parsed
    /// message with an embedded newline; if no message exists yet it is
    /// discarded. Blank lines are dropped, not folded.
    pub fn parse(&self, text: &str) -> Vec<Message> {
        let normalized = Self::normalize(text);
        let mut messages: Vec<Message> = Vec::new();

        for raw in normalized.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = self.patterns.iter().find_map(|p| p.captures(line)) {
                let date = caps.get(1).map_or("", |m| m.as_str());
                let time = caps.get(2).map_or("", |m| m.as_str());
                let author = caps.get(3).map_or("", |m| m.as_str());
                let content = caps.get(4).map_or("", |m| m.as_str());

                messages.push(Message::new(
                    messages.len() as u64,
                    format!("{date} {time}"),
                    author,
                    content,
                ));
            } else if let Some(last) = messages.last_mut() {
                // Continuation line: extends the previous message.
                last.content.push('\n');
                last.content.push_str(line);
            }
            // No message started yet: nothing to fold into, drop the line.
        }

        messages
    }
}

impl Default for TranscriptParser {
    fn default() -> Self {
        Self::new()
    }
}
