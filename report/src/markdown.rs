use brandpulse_core::{AnnotatedRecord, Summary, Topic};
use chrono::{DateTime, Utc};
use std::fmt;

pub const REPORT_FILE: &str = "brand_report.md";

/// Mean sentiment at or beyond this magnitude is called positive/negative.
const TONE_THRESHOLD: f64 = 0.05;

/// A chart to link from the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLink {
    pub title: String,
    /// Relative to the report file.
    pub href: String,
}

pub struct ReportInput<'a> {
    pub brand: &'a str,
    pub summary: &'a Summary,
    pub top_topics: usize,
    pub period: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub charts: &'a [ChartLink],
    pub generated_at: DateTime<Utc>,
}

/// Earliest and latest post creation time.
pub fn post_period(records: &[AnnotatedRecord]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let timestamps: Vec<DateTime<Utc>> = records
        .iter()
        .filter_map(|r| DateTime::from_timestamp(r.post.created_utc.floor() as i64, 0))
        .collect();
    let first = timestamps.iter().min()?;
    let last = timestamps.iter().max()?;
    Some((*first, *last))
}

pub fn format_mean(mean: Option<f64>) -> String {
    match mean {
        Some(value) => format!("{:.3}", value),
        None => "n/a".to_string(),
    }
}

fn tone(mean: f64) -> &'static str {
    if mean >= TONE_THRESHOLD {
        "positive"
    } else if mean <= -TONE_THRESHOLD {
        "negative"
    } else {
        "neutral"
    }
}

fn join_labels(topics: &[Topic]) -> String {
    let labels: Vec<&str> = topics.iter().map(|t| t.label()).collect();
    match labels.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Closing paragraph naming the dominant topics.
pub fn closing_summary(brand: &str, summary: &Summary) -> String {
    let Some(mean) = summary.mean_sentiment else {
        return format!(
            "No posts about {} were available for this run, so there is no customer feedback to summarise yet.",
            brand
        );
    };

    let dominant: Vec<Topic> = summary.top_topics(3).iter().map(|c| c.topic).collect();
    format!(
        "Across {} posts, conversation about {} centres on {}. Overall sentiment is {} ({:.3}). \
         {} posts ask questions, which points at information customers are still looking for.",
        summary.total,
        brand,
        join_labels(&dominant),
        tone(mean),
        mean,
        summary.questions
    )
}

pub fn render_report(input: &ReportInput<'_>) -> String {
    input.to_string()
}

impl fmt::Display for ReportInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary;

        writeln!(f, "# {} Customer Feedback Report", self.brand)?;
        writeln!(f)?;
        writeln!(
            f,
            "Generated {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(f)?;

        writeln!(f, "## Overview")?;
        writeln!(f)?;
        writeln!(f, "- Total posts analysed: {}", summary.total)?;
        writeln!(
            f,
            "- Average sentiment: {}",
            format_mean(summary.mean_sentiment)
        )?;
        writeln!(f, "- Questions identified: {}", summary.questions)?;
        if let Some((first, last)) = self.period {
            writeln!(
                f,
                "- Posts dated {} to {}",
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            )?;
        }
        writeln!(f)?;

        writeln!(f, "## Top Topics")?;
        writeln!(f)?;
        let top = summary.top_topics(self.top_topics);
        if top.is_empty() {
            writeln!(f, "No topics to report.")?;
        }
        for (rank, entry) in top.iter().enumerate() {
            writeln!(f, "{}. {}: {}", rank + 1, entry.topic, entry.count)?;
        }
        writeln!(f)?;

        if !self.charts.is_empty() {
            writeln!(f, "## Charts")?;
            writeln!(f)?;
            for chart in self.charts {
                writeln!(f, "- [{}]({})", chart.title, chart.href)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "## Summary")?;
        writeln!(f)?;
        writeln!(f, "{}", closing_summary(self.brand, summary))
    }
}
