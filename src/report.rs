//! Text and JSON rendering of an [`Analysis`]

use crate::classify::Category;
use crate::stats::Analysis;
use crate::types::SenderCount;
use std::fmt;

/// Unread share above which the reader is nudged to catch up
pub const UNREAD_WARNING_PERCENTAGE: f64 = 20.0;

const RULE_WIDTH: usize = 60;

/// Plain-text report, rendered through `Display`
#[derive(Debug, Clone, Copy)]
pub struct TextReport<'a> {
    analysis: &'a Analysis,
}

impl<'a> TextReport<'a> {
    #[must_use]
    pub const fn new(analysis: &'a Analysis) -> Self {
        Self { analysis }
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.analysis;
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(f, "{rule}")?;
        writeln!(f, "Mailbox analysis")?;
        writeln!(f, "{rule}")?;

        writeln!(f, "\n1. Received mail")?;
        writeln!(f, "   Total received: {}", a.total_received)?;

        let status = &a.read_status;
        writeln!(f, "\n2. Read status")?;
        writeln!(f, "   Read:   {} ({:.1}%)", status.read, status.read_percentage)?;
        writeln!(f, "   Unread: {} ({:.1}%)", status.unread, status.unread_percentage)?;

        let replies = a.replies.stats();
        writeln!(f, "\n3. Replies")?;
        if a.replies.is_skipped() {
            writeln!(f, "   No sent mail available, reply analysis skipped")?;
        }
        writeln!(f, "   Replied:          {}", replies.replied)?;
        writeln!(f, "   Replied same day: {}", replies.same_day)?;
        if let Some(rate) = replies.same_day_rate() {
            writeln!(f, "   Same-day rate:    {rate:.1}%")?;
        }

        writeln!(f, "\n4. Top senders")?;
        write_ranking(f, &a.top_senders, "No data")?;

        writeln!(f, "\n5. Top recipients")?;
        write_ranking(f, &a.top_recipients, "No sent mail data")?;

        writeln!(f, "\n6. Categories")?;
        for (label, category) in [
            ("a", Category::Informational),
            ("b", Category::ApprovalRequired),
            ("c", Category::ResponseRequired),
        ] {
            let count = a.categories.get(category);
            writeln!(
                f,
                "   {label}. {category}: {count} ({:.1}%)",
                a.category_percentage(count)
            )?;
        }

        writeln!(f, "\n{rule}")?;

        let advice = advice(a);
        if !advice.is_empty() {
            writeln!(f, "Suggestions:")?;
            for line in advice {
                writeln!(f, "   - {line}")?;
            }
        }

        Ok(())
    }
}

fn write_ranking(f: &mut fmt::Formatter<'_>, ranking: &[SenderCount], empty: &str) -> fmt::Result {
    if ranking.is_empty() {
        return writeln!(f, "   {empty}");
    }
    for (idx, entry) in ranking.iter().enumerate() {
        writeln!(f, "   {}. {}: {} messages", idx + 1, entry.key, entry.count)?;
    }
    Ok(())
}

/// Follow-up suggestions derived from the figures
#[must_use]
pub fn advice(analysis: &Analysis) -> Vec<String> {
    let mut lines = Vec::new();
    let replies = analysis.replies.stats();

    if analysis.read_status.unread_percentage > UNREAD_WARNING_PERCENTAGE {
        lines.push("Many messages are unread, consider working through the important ones".to_string());
    }
    if replies.replied > 0 && replies.same_day < replies.replied / 2 {
        lines.push("Consider replying sooner: fewer than half of replies go out the same day".to_string());
    }
    if analysis.categories.response_required > 0 {
        lines.push(format!(
            "{} messages may need your reply",
            analysis.categories.response_required
        ));
    }
    if analysis.categories.approval_required > 0 {
        lines.push(format!(
            "{} messages may need your approval",
            analysis.categories.approval_required
        ));
    }

    lines
}

/// Pretty-printed JSON form of the analysis
pub fn to_json(analysis: &Analysis) -> serde_json::Result<String> {
    serde_json::to_string_pretty(analysis)
}
