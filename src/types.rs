//! Core types shared by the normalizer, the statistics engine and the reporter

use crate::error::{Result, StatsError};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format accepted from the user (`DD-MM-YYYY`)
pub const DATE_INPUT_FORMAT: &str = "%d-%m-%Y";

/// Whether a message was received into the mailbox or sent from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Received,
    Sent,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Received => write!(f, "received"),
            Self::Sent => write!(f, "sent"),
        }
    }
}

/// Normalized, immutable snapshot of one message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Subject line, may be empty
    pub subject: String,

    /// Sender address (received messages only)
    pub sender_address: String,

    /// Sender display name (received messages only)
    pub sender_name: String,

    /// When the message arrived (received messages only)
    pub received_at: Option<DateTime<Utc>>,

    /// When the message was sent (sent messages only)
    pub sent_at: Option<DateTime<Utc>>,

    /// Read flag, meaningful only for received messages
    pub is_read: bool,

    /// Primary recipients (sent messages only)
    pub to: Vec<String>,

    /// CC recipients (sent messages only)
    pub cc: Vec<String>,

    /// First characters of the body
    pub body_excerpt: String,
}

impl MessageRecord {
    /// Records with an empty subject take no part in any aggregate.
    #[must_use]
    pub fn is_countable(&self) -> bool {
        !self.subject.is_empty()
    }

    /// Key used for sender ranking: address, else display name.
    #[must_use]
    pub fn sender_key(&self) -> Option<&str> {
        if !self.sender_address.is_empty() {
            Some(&self.sender_address)
        } else if !self.sender_name.is_empty() {
            Some(&self.sender_name)
        } else {
            None
        }
    }

    /// All recipients in `to` then `cc` order, duplicates kept.
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.to
            .iter()
            .chain(self.cc.iter())
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
    }
}

/// Half-open time window `[first_day 00:00, last_day + 1 day 00:00)` in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    first_day: NaiveDate,
    last_day: NaiveDate,
    start: DateTime<Utc>,
    end_exclusive: DateTime<Utc>,
}

impl DateWindow {
    /// Build a window covering both calendar days inclusively.
    pub fn new(first_day: NaiveDate, last_day: NaiveDate) -> Result<Self> {
        if last_day < first_day {
            return Err(StatsError::InvalidRange {
                start: first_day,
                end: last_day,
            });
        }

        let day_after = last_day
            .checked_add_days(Days::new(1))
            .ok_or(StatsError::InvalidRange {
                start: first_day,
                end: last_day,
            })?;

        Ok(Self {
            first_day,
            last_day,
            start: first_day.and_time(NaiveTime::default()).and_utc(),
            end_exclusive: day_after.and_time(NaiveTime::default()).and_utc(),
        })
    }

    /// Parse two `DD-MM-YYYY` strings into a window.
    pub fn parse(first_day: &str, last_day: &str) -> Result<Self> {
        Self::new(parse_date(first_day)?, parse_date(last_day)?)
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end_exclusive
    }

    #[must_use]
    pub const fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    #[must_use]
    pub const fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end_exclusive(&self) -> DateTime<Utc> {
        self.end_exclusive
    }

    /// Number of days between the first and last day (0 for a single day).
    #[must_use]
    pub fn span_days(&self) -> i64 {
        (self.last_day - self.first_day).num_days()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.first_day.format("%Y-%m-%d"),
            self.last_day.format("%Y-%m-%d")
        )
    }
}

/// Parse a user-entered `DD-MM-YYYY` date
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_INPUT_FORMAT).map_err(|_| StatsError::InvalidDate {
        input: trimmed.to_string(),
    })
}

/// Address or name with its number of occurrences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderCount {
    pub key: String,
    pub count: usize,
}

impl fmt::Display for SenderCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.count)
    }
}
