//! Statistics over normalized message records
//!
//! Every computation here is a pure read over already-collected records:
//! empty input yields zero-valued results, never an error.

use crate::classify::{CategoryCounts, classify};
use crate::types::{MessageRecord, SenderCount};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Length of the top senders / top recipients lists
pub const TOP_N: usize = 5;

// Leading reply marker, English and Chinese forms
static REPLY_PREFIX_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^(re:|回复:|回覆:)\s*").unwrap());

/// Read/unread tally over received messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadStatus {
    pub read: usize,
    pub unread: usize,
    pub read_percentage: f64,
    pub unread_percentage: f64,
}

impl ReadStatus {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.read + self.unread
    }
}

/// Replied and same-day-replied counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyStats {
    pub replied: usize,
    pub same_day: usize,
}

impl ReplyStats {
    /// Share of replies sent on the day the message arrived, if any replies.
    #[must_use]
    pub fn same_day_rate(&self) -> Option<f64> {
        (self.replied > 0).then(|| percentage(self.same_day, self.replied))
    }
}

/// Outcome of reply correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReplyOutcome {
    Computed(ReplyStats),
    /// No sent messages were available to correlate against
    Skipped,
}

impl ReplyOutcome {
    /// Counts, with a skipped correlation reported as zero/zero.
    #[must_use]
    pub fn stats(&self) -> ReplyStats {
        match self {
            Self::Computed(stats) => *stats,
            Self::Skipped => ReplyStats::default(),
        }
    }

    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

/// Everything the reporter needs from one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub total_received: usize,
    pub total_sent: usize,
    pub read_status: ReadStatus,
    pub replies: ReplyOutcome,
    pub top_senders: Vec<SenderCount>,
    pub top_recipients: Vec<SenderCount>,
    pub categories: CategoryCounts,
}

impl Analysis {
    /// Run all four computations over the two record sequences.
    #[must_use]
    pub fn compute(received: &[MessageRecord], sent: &[MessageRecord]) -> Self {
        let analysis = Self {
            total_received: countable(received).count(),
            total_sent: countable(sent).count(),
            read_status: read_status(received),
            replies: reply_stats(received, sent),
            top_senders: top_senders(received),
            top_recipients: top_recipients(sent),
            categories: classify(received),
        };

        info!(
            "Analyzed {} received and {} sent messages",
            analysis.total_received, analysis.total_sent
        );

        analysis
    }

    /// Share of received messages in a bucket, 0 when nothing was received.
    #[must_use]
    pub fn category_percentage(&self, count: usize) -> f64 {
        percentage(count, self.total_received)
    }
}

/// Count read versus unread received messages.
#[must_use]
pub fn read_status(received: &[MessageRecord]) -> ReadStatus {
    let (read, unread) = countable(received).fold((0, 0), |(read, unread), r| {
        if r.is_read {
            (read + 1, unread)
        } else {
            (read, unread + 1)
        }
    });

    let total = read + unread;
    ReadStatus {
        read,
        unread,
        read_percentage: percentage(read, total),
        unread_percentage: percentage(unread, total),
    }
}

/// Correlate read received messages with sent messages by subject.
///
/// A read message counts as replied when a sent message shares its
/// normalized subject, and as a same-day reply when one of those sent
/// messages went out on the message's received date (UTC).
#[must_use]
pub fn reply_stats(received: &[MessageRecord], sent: &[MessageRecord]) -> ReplyOutcome {
    let mut sent_days: HashMap<String, BTreeSet<NaiveDate>> = HashMap::new();
    for record in countable(sent) {
        let days = sent_days.entry(normalize_subject(&record.subject)).or_default();
        if let Some(at) = record.sent_at {
            days.insert(at.date_naive());
        }
    }

    if sent_days.is_empty() {
        debug!("No sent messages, skipping reply correlation");
        return ReplyOutcome::Skipped;
    }

    let mut stats = ReplyStats::default();
    for record in countable(received).filter(|r| r.is_read) {
        let Some(days) = sent_days.get(&normalize_subject(&record.subject)) else {
            continue;
        };

        stats.replied += 1;
        if record
            .received_at
            .is_some_and(|at| days.contains(&at.date_naive()))
        {
            stats.same_day += 1;
        }
    }

    ReplyOutcome::Computed(stats)
}

/// Most frequent senders of received messages.
#[must_use]
pub fn top_senders(received: &[MessageRecord]) -> Vec<SenderCount> {
    rank(countable(received).filter_map(MessageRecord::sender_key), TOP_N)
}

/// Most frequent recipients of sent messages, To and CC combined.
///
/// An address present in both fields of one message counts twice.
#[must_use]
pub fn top_recipients(sent: &[MessageRecord]) -> Vec<SenderCount> {
    rank(countable(sent).flat_map(MessageRecord::recipients), TOP_N)
}

/// Lowercase a subject and strip one leading reply marker.
#[must_use]
pub fn normalize_subject(subject: &str) -> String {
    let lower = subject.to_lowercase();
    REPLY_PREFIX_REGEX.replace(&lower, "").into_owned()
}

/// Count keys and keep the `limit` most frequent.
///
/// Equal counts keep first-seen order: the sort is stable over insertion
/// order.
fn rank<'a>(keys: impl Iterator<Item = &'a str>, limit: usize) -> Vec<SenderCount> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<SenderCount> = Vec::new();

    for key in keys {
        if key.is_empty() {
            continue;
        }
        if let Some(&idx) = positions.get(key) {
            counts[idx].count += 1;
        } else {
            positions.insert(key, counts.len());
            counts.push(SenderCount {
                key: key.to_string(),
                count: 1,
            });
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

fn countable(records: &[MessageRecord]) -> impl Iterator<Item = &MessageRecord> {
    records.iter().filter(|r| r.is_countable())
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
