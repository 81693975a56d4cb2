use chrono::{NaiveDate, TimeZone, Utc};
use mail_stats::*;

// --- Dates ---

#[test]
fn test_parse_date() {
    assert_eq!(
        parse_date("01-03-2025").unwrap(),
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    );
    assert_eq!(
        parse_date(" 31-12-2024\n").unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
    );
}

#[test]
fn test_parse_date_rejects_other_formats() {
    for input in ["2025-03-01", "32-01-2025", "", "tomorrow"] {
        assert!(matches!(
            parse_date(input),
            Err(StatsError::InvalidDate { .. })
        ));
    }
}

// --- DateWindow ---

#[test]
fn test_window_includes_whole_last_day() {
    let window = DateWindow::parse("05-01-2024", "05-01-2024").unwrap();

    assert!(window.contains(Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap()));
    assert!(window.contains(Utc.with_ymd_and_hms(2024, 1, 5, 23, 59, 59).unwrap()));
    assert!(!window.contains(Utc.with_ymd_and_hms(2024, 1, 6, 0, 0, 0).unwrap()));
    assert!(!window.contains(Utc.with_ymd_and_hms(2024, 1, 4, 23, 59, 59).unwrap()));
    assert_eq!(window.span_days(), 0);
}

#[test]
fn test_window_rejects_reversed_range() {
    let err = DateWindow::parse("10-01-2024", "09-01-2024").unwrap_err();
    assert!(matches!(err, StatsError::InvalidRange { .. }));
}

#[test]
fn test_window_display_and_bounds() {
    let window = DateWindow::parse("01-01-2024", "31-12-2024").unwrap();

    assert_eq!(window.to_string(), "2024-01-01 to 2024-12-31");
    assert_eq!(window.span_days(), 365);
    assert_eq!(window.start(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(
        window.end_exclusive(),
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(window.first_day(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(window.last_day(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
}

// --- MessageRecord ---

#[test]
fn test_sender_key_prefers_address() {
    let record = MessageRecord {
        sender_address: "a@example.com".into(),
        sender_name: "Alice".into(),
        ..MessageRecord::default()
    };
    assert_eq!(record.sender_key(), Some("a@example.com"));

    let name_only = MessageRecord {
        sender_name: "Alice".into(),
        ..MessageRecord::default()
    };
    assert_eq!(name_only.sender_key(), Some("Alice"));

    assert_eq!(MessageRecord::default().sender_key(), None);
}

#[test]
fn test_recipients_keep_duplicates() {
    let record = MessageRecord {
        to: vec!["a@x.com".into(), "b@x.com".into()],
        cc: vec!["a@x.com".into(), " ".into()],
        ..MessageRecord::default()
    };

    let recipients: Vec<&str> = record.recipients().collect();
    assert_eq!(recipients, ["a@x.com", "b@x.com", "a@x.com"]);
}

#[test]
fn test_countable_requires_subject() {
    assert!(!MessageRecord::default().is_countable());
    assert!(
        MessageRecord {
            subject: "x".into(),
            ..MessageRecord::default()
        }
        .is_countable()
    );
}

#[test]
fn test_display_impls() {
    assert_eq!(Direction::Sent.to_string(), "sent");
    assert_eq!(Category::ApprovalRequired.to_string(), "approval required");
    assert_eq!(
        SenderCount {
            key: "a@x.com".into(),
            count: 3
        }
        .to_string(),
        "a@x.com: 3"
    );
    assert_eq!(
        AccountInfo {
            name: "work".into(),
            address: Some("me@work.example".into())
        }
        .to_string(),
        "work (me@work.example)"
    );
}
