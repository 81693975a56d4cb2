//! Conversion of raw mail-source messages into [`MessageRecord`]s

use crate::error::FieldError;
use crate::types::{DateWindow, Direction, MessageRecord};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Maximum number of characters kept from a message body
pub const BODY_EXCERPT_CHARS: usize = 500;

/// Result of reading one field from a raw message
pub type FieldResult<T> = std::result::Result<T, FieldError>;

/// Field accessors a mail source exposes for one message.
///
/// Every accessor may fail independently; the normalizer treats a failure
/// as the field's zero value.
pub trait RawMessage {
    fn subject(&self) -> FieldResult<String>;
    fn sender_address(&self) -> FieldResult<String>;
    fn sender_name(&self) -> FieldResult<String>;
    fn received_at(&self) -> FieldResult<DateTime<Utc>>;
    fn sent_at(&self) -> FieldResult<DateTime<Utc>>;
    fn is_unread(&self) -> FieldResult<bool>;

    /// Primary recipients, `;`-delimited
    fn to(&self) -> FieldResult<String>;

    /// CC recipients, `;`-delimited
    fn cc(&self) -> FieldResult<String>;

    fn body(&self) -> FieldResult<String>;
}

/// Build a record from a raw message, or `None` when its timestamp falls
/// outside `window`.
///
/// Only the timestamp is a hard filter. A timestamp that cannot be read at
/// all leaves the record in place with no time set.
pub fn normalize<M>(raw: &M, direction: Direction, window: &DateWindow) -> Option<MessageRecord>
where
    M: RawMessage + ?Sized,
{
    let mut record = MessageRecord {
        subject: field_or_default(raw.subject()),
        ..MessageRecord::default()
    };

    match direction {
        Direction::Received => {
            if let Some(at) = timestamp(raw.received_at()) {
                if !window.contains(at) {
                    return None;
                }
                record.received_at = Some(at);
            }
            record.is_read = field_or_default(raw.is_unread().map(|unread| !unread));
            record.sender_address = field_or_default(raw.sender_address());
            record.sender_name = field_or_default(raw.sender_name());
        }
        Direction::Sent => {
            if let Some(at) = timestamp(raw.sent_at()) {
                if !window.contains(at) {
                    return None;
                }
                record.sent_at = Some(at);
            }
            record.to = split_recipients(&field_or_default(raw.to()));
            record.cc = split_recipients(&field_or_default(raw.cc()));
        }
    }

    record.body_excerpt = truncate_chars(&field_or_default(raw.body()), BODY_EXCERPT_CHARS).to_string();

    Some(record)
}

/// Normalize a batch of raw messages, dropping those outside the window.
pub fn normalize_all<'a, M, I>(messages: I, direction: Direction, window: &DateWindow) -> Vec<MessageRecord>
where
    M: RawMessage + ?Sized + 'a,
    I: IntoIterator<Item = &'a M>,
{
    messages
        .into_iter()
        .filter_map(|raw| normalize(raw, direction, window))
        .collect()
}

/// Split a `;`-delimited recipient string into trimmed, non-empty entries.
#[must_use]
pub fn split_recipients(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// First `max_chars` characters of `text`, never splitting a character.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(idx, _)| &text[..idx])
}

fn field_or_default<T: Default>(value: FieldResult<T>) -> T {
    value.unwrap_or_else(|e| {
        debug!("{e}");
        T::default()
    })
}

fn timestamp(value: FieldResult<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    value.map_err(|e| debug!("{e}")).ok()
}
