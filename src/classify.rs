//! Keyword-based message classification

use crate::types::MessageRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Announcements, newsletters and other read-only mail
pub const INFORMATIONAL_KEYWORDS: &[&str] = &[
    "通知",
    "信息",
    "更新",
    "公告",
    "新闻",
    "newsletter",
    "notification",
    "update",
    "info",
    "通告",
];

/// Mail asking the reader to sign off on something
pub const APPROVAL_KEYWORDS: &[&str] = &[
    "批准",
    "审批",
    "确认",
    "同意",
    "授权",
    "approve",
    "approval",
    "authorize",
    "confirm",
    "核准",
    "签核",
];

/// Mail expecting an answer
pub const RESPONSE_KEYWORDS: &[&str] = &[
    "回复",
    "回应",
    "反馈",
    "意见",
    "建议",
    "reply",
    "response",
    "feedback",
    "urgent",
    "紧急",
    "请回复",
    "请回覆",
];

/// Classification bucket, exactly one per message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Informational,
    ApprovalRequired,
    ResponseRequired,
}

impl Category {
    /// Classify one record. Approval wins over response; anything else is
    /// informational.
    #[must_use]
    pub fn of(record: &MessageRecord) -> Self {
        let subject = record.subject.to_lowercase();
        let body = record.body_excerpt.to_lowercase();
        let mentions = |keywords: &[&str]| {
            keywords
                .iter()
                .any(|k| subject.contains(k) || body.contains(k))
        };

        if mentions(APPROVAL_KEYWORDS) {
            Self::ApprovalRequired
        } else if mentions(RESPONSE_KEYWORDS) {
            Self::ResponseRequired
        } else {
            Self::Informational
        }
    }

    /// Keyword list associated with the bucket.
    ///
    /// The informational list is descriptive only: informational is the
    /// fallback and is never matched directly.
    #[must_use]
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Informational => INFORMATIONAL_KEYWORDS,
            Self::ApprovalRequired => APPROVAL_KEYWORDS,
            Self::ResponseRequired => RESPONSE_KEYWORDS,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Informational => write!(f, "informational"),
            Self::ApprovalRequired => write!(f, "approval required"),
            Self::ResponseRequired => write!(f, "response required"),
        }
    }
}

/// Number of messages per classification bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub informational: usize,
    pub approval_required: usize,
    pub response_required: usize,
}

impl CategoryCounts {
    #[must_use]
    pub const fn get(&self, category: Category) -> usize {
        match category {
            Category::Informational => self.informational,
            Category::ApprovalRequired => self.approval_required,
            Category::ResponseRequired => self.response_required,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.informational + self.approval_required + self.response_required
    }

    fn record(&mut self, category: Category) {
        match category {
            Category::Informational => self.informational += 1,
            Category::ApprovalRequired => self.approval_required += 1,
            Category::ResponseRequired => self.response_required += 1,
        }
    }
}

/// Classify every countable received record.
#[must_use]
pub fn classify(received: &[MessageRecord]) -> CategoryCounts {
    received
        .iter()
        .filter(|r| r.is_countable())
        .map(Category::of)
        .fold(CategoryCounts::default(), |mut counts, category| {
            counts.record(category);
            counts
        })
}
