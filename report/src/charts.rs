//! Plain-text charts: a topic bar chart and a sentiment histogram.

use brandpulse_core::TopicCount;

pub const SENTIMENT_BINS: usize = 30;
pub const BAR_WIDTH: usize = 40;

pub const TOPIC_CHART_FILE: &str = "topics.txt";
pub const SENTIMENT_CHART_FILE: &str = "sentiment_distribution.txt";

/// Equal-width histogram over a fixed range.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Bin edges, `counts.len() + 1` of them.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Values outside `[min, max]` are clamped into the outer bins; `max`
    /// itself lands in the last bin.
    pub fn with_range(values: &[f64], min: f64, max: f64, n_bins: usize) -> Self {
        let n_bins = n_bins.max(1);
        let width = (max - min) / n_bins as f64;
        let edges = (0..=n_bins).map(|i| min + i as f64 * width).collect();

        let mut counts = vec![0usize; n_bins];
        for &value in values.iter().filter(|v| v.is_finite()) {
            let position = ((value - min) / (max - min) * n_bins as f64).floor();
            let index = if position < 0.0 {
                0
            } else {
                (position as usize).min(n_bins - 1)
            };
            counts[index] += 1;
        }

        Self { edges, counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

pub fn sentiment_histogram(scores: &[f64]) -> Histogram {
    Histogram::with_range(scores, -1.0, 1.0, SENTIMENT_BINS)
}

fn bar(value: usize, max: usize, width: usize) -> String {
    let filled = if max == 0 {
        0
    } else {
        ((value as f64 / max as f64) * width as f64).round() as usize
    };
    // Never hide a non-zero count entirely.
    let filled = if value > 0 { filled.max(1) } else { 0 };
    "█".repeat(filled.min(width))
}

/// One line per topic, in the given (already sorted) order.
pub fn render_topic_chart(frequencies: &[TopicCount]) -> String {
    let mut out = String::from("Topic Frequency\n\n");
    if frequencies.is_empty() {
        out.push_str("(no posts)\n");
        return out;
    }

    let max = frequencies.iter().map(|c| c.count).max().unwrap_or(0);
    let label_width = frequencies
        .iter()
        .map(|c| c.topic.label().len())
        .max()
        .unwrap_or(0);

    for entry in frequencies {
        out.push_str(&format!(
            "{:<width$} | {} {}\n",
            entry.topic.label(),
            bar(entry.count, max, BAR_WIDTH),
            entry.count,
            width = label_width
        ));
    }
    out
}

pub fn render_histogram(title: &str, histogram: &Histogram) -> String {
    let mut out = format!("{}\n\n", title);
    let max = histogram.counts.iter().copied().max().unwrap_or(0);

    for (i, count) in histogram.counts.iter().enumerate() {
        out.push_str(&format!(
            "[{:>6.3}, {:>6.3}{} | {} {}\n",
            histogram.edges[i],
            histogram.edges[i + 1],
            if i + 1 == histogram.counts.len() { "]" } else { ")" },
            bar(*count, max, BAR_WIDTH),
            count
        ));
    }
    out.push_str(&format!("\n{} posts\n", histogram.total()));
    out
}
