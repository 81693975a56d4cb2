use mail_stats::*;

fn sample() -> Analysis {
    Analysis {
        total_received: 10,
        total_sent: 4,
        read_status: ReadStatus {
            read: 7,
            unread: 3,
            read_percentage: 70.0,
            unread_percentage: 30.0,
        },
        replies: ReplyOutcome::Computed(ReplyStats {
            replied: 4,
            same_day: 1,
        }),
        top_senders: vec![
            SenderCount {
                key: "boss@example.com".into(),
                count: 5,
            },
            SenderCount {
                key: "cfo@example.com".into(),
                count: 2,
            },
        ],
        top_recipients: Vec::new(),
        categories: CategoryCounts {
            informational: 5,
            approval_required: 2,
            response_required: 3,
        },
    }
}

#[test]
fn test_text_report_sections() {
    let text = TextReport::new(&sample()).to_string();

    assert!(text.contains("Total received: 10"));
    assert!(text.contains("Read:   7 (70.0%)"));
    assert!(text.contains("Unread: 3 (30.0%)"));
    assert!(text.contains("Replied:          4"));
    assert!(text.contains("Same-day rate:    25.0%"));
    assert!(text.contains("1. boss@example.com: 5 messages"));
    assert!(text.contains("2. cfo@example.com: 2 messages"));
    assert!(text.contains("No sent mail data"));
    assert!(text.contains("b. approval required: 2 (20.0%)"));
    assert!(text.contains("c. response required: 3 (30.0%)"));
}

#[test]
fn test_text_report_for_empty_analysis() {
    let analysis = Analysis::compute(&[], &[]);
    let text = TextReport::new(&analysis).to_string();

    assert!(text.contains("Total received: 0"));
    assert!(text.contains("reply analysis skipped"));
    assert!(text.contains("a. informational: 0 (0.0%)"));
    assert!(!text.contains("NaN"));
    assert!(!text.contains("Same-day rate"));
    assert!(!text.contains("Suggestions"));
}

#[test]
fn test_advice() {
    let advice = advice(&sample());

    assert_eq!(advice.len(), 4);
    assert!(advice[0].contains("unread"));
    assert!(advice[1].contains("same day"));
    assert_eq!(advice[2], "3 messages may need your reply");
    assert_eq!(advice[3], "2 messages may need your approval");
}

#[test]
fn test_json_report() {
    let json = to_json(&sample()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["total_received"], 10);
    assert_eq!(value["replies"]["status"], "computed");
    assert_eq!(value["replies"]["replied"], 4);
    assert_eq!(value["top_senders"][0]["key"], "boss@example.com");
    assert_eq!(value["categories"]["approval_required"], 2);

    let skipped = to_json(&Analysis::compute(&[], &[])).unwrap();
    let value: serde_json::Value = serde_json::from_str(&skipped).unwrap();
    assert_eq!(value["replies"]["status"], "skipped");
}
