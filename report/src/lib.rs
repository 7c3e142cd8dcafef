//! # Report
//!
//! Turns one run's annotated table and [`Summary`] into files under
//! `outputs/`: two text charts, a Markdown report and a JSON summary.

pub mod charts;
pub mod markdown;

use brandpulse_core::{AnnotatedRecord, CoreError, Summary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use charts::{
    render_histogram, render_topic_chart, sentiment_histogram, Histogram, SENTIMENT_BINS,
    SENTIMENT_CHART_FILE, TOPIC_CHART_FILE,
};
pub use markdown::{
    closing_summary, format_mean, post_period, render_report, ChartLink, ReportInput, REPORT_FILE,
};

pub const SUMMARY_FILE: &str = "summary.json";

/// Chart files in the order the report links them.
const CHARTS: [(&str, &str); 2] = [
    (TOPIC_CHART_FILE, "Topic frequency"),
    (SENTIMENT_CHART_FILE, "Sentiment distribution"),
];

#[derive(Serialize)]
struct SummaryDocument<'a> {
    brand: &'a str,
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    summary: &'a Summary,
}

fn write_file(path: &Path, contents: &str) -> Result<(), CoreError> {
    fs::write(path, contents)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Writes both charts into `charts_dir` and returns their paths.
pub fn write_charts(
    charts_dir: &Path,
    summary: &Summary,
    records: &[AnnotatedRecord],
) -> Result<Vec<PathBuf>, CoreError> {
    let topic_path = charts_dir.join(TOPIC_CHART_FILE);
    write_file(&topic_path, &render_topic_chart(&summary.topic_frequencies))?;

    let scores: Vec<f64> = records.iter().map(|r| r.sentiment).collect();
    let sentiment_path = charts_dir.join(SENTIMENT_CHART_FILE);
    write_file(
        &sentiment_path,
        &render_histogram("Sentiment Distribution", &sentiment_histogram(&scores)),
    )?;

    info!("Charts written to {}", charts_dir.display());
    Ok(vec![topic_path, sentiment_path])
}

/// Links for the chart files that currently exist in `charts_dir`.
pub fn existing_chart_links(charts_dir: &Path, reports_dir: &Path) -> Vec<ChartLink> {
    // Layout keeps charts and reports as siblings.
    let prefix = match (charts_dir.parent(), reports_dir.parent()) {
        (Some(a), Some(b)) if a == b => charts_dir
            .file_name()
            .map(|name| format!("../{}", name.to_string_lossy()))
            .unwrap_or_else(|| charts_dir.display().to_string()),
        _ => charts_dir.display().to_string(),
    };

    CHARTS
        .iter()
        .filter(|(file, _)| charts_dir.join(file).is_file())
        .map(|(file, title)| ChartLink {
            title: title.to_string(),
            href: format!("{}/{}", prefix, file),
        })
        .collect()
}

/// Renders the Markdown report and the JSON summary into `reports_dir`.
pub fn write_report(
    reports_dir: &Path,
    charts_dir: &Path,
    brand: &str,
    top_topics: usize,
    summary: &Summary,
    records: &[AnnotatedRecord],
) -> Result<PathBuf, CoreError> {
    let generated_at = Utc::now();
    let charts = existing_chart_links(charts_dir, reports_dir);
    if charts.is_empty() {
        debug!("No charts found in {}, report will not link any", charts_dir.display());
    }

    let report = render_report(&ReportInput {
        brand,
        summary,
        top_topics,
        period: post_period(records),
        charts: &charts,
        generated_at,
    });
    let report_path = reports_dir.join(REPORT_FILE);
    write_file(&report_path, &report)?;

    write_summary_json(reports_dir, brand, summary, generated_at)?;
    info!("Report written to {}", report_path.display());
    Ok(report_path)
}

pub fn write_summary_json(
    reports_dir: &Path,
    brand: &str,
    summary: &Summary,
    generated_at: DateTime<Utc>,
) -> Result<PathBuf, CoreError> {
    let document = SummaryDocument {
        brand,
        generated_at,
        summary,
    };
    let path = reports_dir.join(SUMMARY_FILE);
    write_file(&path, &serde_json::to_string_pretty(&document)?)?;
    Ok(path)
}
