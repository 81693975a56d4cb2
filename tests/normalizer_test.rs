use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use mail_stats::*;

/// In-memory raw message with per-field failures
#[derive(Default)]
struct FakeMessage {
    subject: Option<String>,
    sender_address: Option<String>,
    sender_name: Option<String>,
    received_at: Option<DateTime<Utc>>,
    sent_at: Option<DateTime<Utc>>,
    unread: Option<bool>,
    to: Option<String>,
    cc: Option<String>,
    body: Option<String>,
}

fn field<T: Clone>(value: Option<&T>, name: &'static str) -> FieldResult<T> {
    value.cloned().ok_or_else(|| FieldError::missing(name))
}

impl RawMessage for FakeMessage {
    fn subject(&self) -> FieldResult<String> {
        field(self.subject.as_ref(), "subject")
    }
    fn sender_address(&self) -> FieldResult<String> {
        field(self.sender_address.as_ref(), "sender")
    }
    fn sender_name(&self) -> FieldResult<String> {
        field(self.sender_name.as_ref(), "sender name")
    }
    fn received_at(&self) -> FieldResult<DateTime<Utc>> {
        field(self.received_at.as_ref(), "received time")
    }
    fn sent_at(&self) -> FieldResult<DateTime<Utc>> {
        field(self.sent_at.as_ref(), "sent time")
    }
    fn is_unread(&self) -> FieldResult<bool> {
        field(self.unread.as_ref(), "unread")
    }
    fn to(&self) -> FieldResult<String> {
        field(self.to.as_ref(), "to")
    }
    fn cc(&self) -> FieldResult<String> {
        field(self.cc.as_ref(), "cc")
    }
    fn body(&self) -> FieldResult<String> {
        field(self.body.as_ref(), "body")
    }
}

fn january() -> DateWindow {
    DateWindow::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    )
    .unwrap()
}

#[test]
fn test_received_message_in_window() {
    let raw = FakeMessage {
        subject: Some("Hello".into()),
        sender_address: Some("a@example.com".into()),
        sender_name: Some("Alice".into()),
        received_at: Some(Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap()),
        unread: Some(false),
        to: Some("ignored@example.com".into()),
        body: Some("Body".into()),
        ..FakeMessage::default()
    };

    let record = normalize(&raw, Direction::Received, &january()).unwrap();

    assert_eq!(record.subject, "Hello");
    assert_eq!(record.sender_address, "a@example.com");
    assert_eq!(record.sender_name, "Alice");
    assert!(record.is_read);
    assert!(record.to.is_empty());
    assert!(record.sent_at.is_none());
    assert_eq!(record.body_excerpt, "Body");
}

#[test]
fn test_received_message_outside_window() {
    let before = FakeMessage {
        subject: Some("Old".into()),
        received_at: Some(Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap()),
        ..FakeMessage::default()
    };
    let after = FakeMessage {
        subject: Some("New".into()),
        received_at: Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
        ..FakeMessage::default()
    };

    assert!(normalize(&before, Direction::Received, &january()).is_none());
    assert!(normalize(&after, Direction::Received, &january()).is_none());
}

#[test]
fn test_sent_message_uses_sent_time_and_recipients() {
    let raw = FakeMessage {
        subject: Some("Re: Budget".into()),
        sender_address: Some("me@example.com".into()),
        received_at: Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
        sent_at: Some(Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap()),
        to: Some("a@x.com; b@x.com;".into()),
        cc: Some(" a@x.com ".into()),
        ..FakeMessage::default()
    };

    let record = normalize(&raw, Direction::Sent, &january()).unwrap();

    assert_eq!(record.to, ["a@x.com", "b@x.com"]);
    assert_eq!(record.cc, ["a@x.com"]);
    assert!(record.sender_address.is_empty());
    assert!(record.received_at.is_none());
    assert!(!record.is_read);
}

#[test]
fn test_missing_fields_default_to_zero_values() {
    let raw = FakeMessage {
        received_at: Some(Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap()),
        ..FakeMessage::default()
    };

    let record = normalize(&raw, Direction::Received, &january()).unwrap();

    assert_eq!(record.subject, "");
    assert!(!record.is_read);
    assert!(!record.is_countable());
}

#[test]
fn test_missing_timestamp_keeps_record() {
    let raw = FakeMessage {
        subject: Some("Undated".into()),
        ..FakeMessage::default()
    };

    let record = normalize(&raw, Direction::Received, &january()).unwrap();

    assert_eq!(record.subject, "Undated");
    assert!(record.received_at.is_none());
}

#[test]
fn test_body_truncated_by_characters() {
    let body = "测".repeat(BODY_EXCERPT_CHARS + 20);
    let raw = FakeMessage {
        subject: Some("Long".into()),
        received_at: Some(Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap()),
        body: Some(body),
        ..FakeMessage::default()
    };

    let record = normalize(&raw, Direction::Received, &january()).unwrap();

    assert_eq!(record.body_excerpt.chars().count(), BODY_EXCERPT_CHARS);
}

#[test]
fn test_truncate_chars() {
    assert_eq!(truncate_chars("héllo", 2), "hé");
    assert_eq!(truncate_chars("short", 10), "short");
    assert_eq!(truncate_chars("", 3), "");
}

#[test]
fn test_split_recipients() {
    assert_eq!(split_recipients(" a@x.com ;; b@x.com ; "), ["a@x.com", "b@x.com"]);
    assert!(split_recipients("").is_empty());
}

#[test]
fn test_normalize_all_drops_out_of_window() {
    let messages = vec![
        FakeMessage {
            subject: Some("In".into()),
            received_at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()),
            ..FakeMessage::default()
        },
        FakeMessage {
            subject: Some("Out".into()),
            received_at: Some(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()),
            ..FakeMessage::default()
        },
    ];

    let records = normalize_all(&messages, Direction::Received, &january());

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].subject, "In");
}
