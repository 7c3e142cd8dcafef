use brandpulse_core::{AnnotatedRecord, PostRecord, Summary, Topic, TopicCount};
use report::{post_period, write_charts, write_report, REPORT_FILE, SUMMARY_FILE};
use std::fs;
use std::path::PathBuf;

fn record(created_utc: f64, sentiment: f64, topic: Topic) -> AnnotatedRecord {
    AnnotatedRecord {
        post: PostRecord {
            id: format!("{}", created_utc),
            source_group: "boating".to_string(),
            title: String::new(),
            text: "long enough for the table".to_string(),
            created_utc,
            score: 0,
            num_comments: 0,
            url: String::new(),
        },
        sentiment,
        topic,
        is_question: false,
    }
}

fn summary() -> Summary {
    Summary {
        total: 2,
        mean_sentiment: Some(0.1),
        questions: 0,
        topic_frequencies: vec![
            TopicCount {
                topic: Topic::Battery,
                count: 1,
            },
            TopicCount {
                topic: Topic::Noise,
                count: 1,
            },
        ],
    }
}

fn dirs(base: &std::path::Path) -> (PathBuf, PathBuf) {
    let charts = base.join("outputs").join("charts");
    let reports = base.join("outputs").join("reports");
    fs::create_dir_all(&charts).unwrap();
    fs::create_dir_all(&reports).unwrap();
    (charts, reports)
}

#[test]
fn test_report_links_existing_charts() {
    let base = tempfile::tempdir().unwrap();
    let (charts, reports) = dirs(base.path());
    let records = vec![
        record(1_700_000_000.0, 0.5, Topic::Battery),
        record(1_600_000_000.0, -0.3, Topic::Noise),
    ];

    let written = write_charts(&charts, &summary(), &records).unwrap();
    assert_eq!(written.len(), 2);
    assert!(written.iter().all(|p| p.is_file()));

    let path = write_report(&reports, &charts, "E-Propulsion", 5, &summary(), &records).unwrap();
    assert_eq!(path, reports.join(REPORT_FILE));

    let report = fs::read_to_string(&path).unwrap();
    assert!(report.contains("(../charts/topics.txt)"));
    assert!(report.contains("(../charts/sentiment_distribution.txt)"));
    assert!(report.contains("- Posts dated 2020-09-13 to 2023-11-14"));
}

#[test]
fn test_report_without_charts() {
    let base = tempfile::tempdir().unwrap();
    let (charts, reports) = dirs(base.path());

    let path = write_report(&reports, &charts, "E-Propulsion", 5, &summary(), &[]).unwrap();
    let report = fs::read_to_string(path).unwrap();
    assert!(!report.contains("## Charts"));
}

#[test]
fn test_summary_json() {
    let base = tempfile::tempdir().unwrap();
    let (charts, reports) = dirs(base.path());

    let empty = Summary {
        total: 0,
        mean_sentiment: None,
        questions: 0,
        topic_frequencies: Vec::new(),
    };
    write_report(&reports, &charts, "E-Propulsion", 5, &empty, &[]).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(reports.join(SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(json["brand"], "E-Propulsion");
    assert_eq!(json["total"], 0);
    assert!(json["mean_sentiment"].is_null());
    assert!(json["topic_frequencies"].as_array().unwrap().is_empty());
    assert!(json["generated_at"].is_string());
}

#[test]
fn test_post_period_bounds() {
    let records = vec![
        record(1_700_000_000.9, 0.0, Topic::Other),
        record(1_500_000_000.0, 0.0, Topic::Other),
    ];
    let (first, last) = post_period(&records).unwrap();
    assert_eq!(first.timestamp(), 1_500_000_000);
    assert_eq!(last.timestamp(), 1_700_000_000);
}
