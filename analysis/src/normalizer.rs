//! Raw post -> [`PostRecord`] with a non-empty combined text.

use brandpulse_core::{PostRecord, RawPost};
use tracing::debug;

pub const DEFAULT_MIN_TEXT_LENGTH: usize = 15;

/// `trim(title + " " + body)`, with missing parts treated as empty.
pub fn combined_text(title: Option<&str>, body: Option<&str>) -> String {
    format!("{} {}", title.unwrap_or_default(), body.unwrap_or_default())
        .trim()
        .to_string()
}

/// Converts a single payload, or returns `None` when its combined text is
/// shorter than `min_text_length` characters.
pub fn normalize_post(raw: RawPost, min_text_length: usize) -> Option<PostRecord> {
    let text = combined_text(raw.title.as_deref(), raw.body.as_deref());
    if text.chars().count() < min_text_length {
        return None;
    }

    Some(PostRecord {
        id: raw.id,
        source_group: raw.source_group,
        title: raw.title.unwrap_or_default(),
        text,
        created_utc: raw.created_utc,
        score: raw.score,
        num_comments: raw.num_comments,
        url: raw.url,
    })
}

/// Normalizes payloads in order. Records are not deduplicated: a post found
/// by two keyword searches appears twice.
pub fn normalize<I>(payloads: I, min_text_length: usize) -> Vec<PostRecord>
where
    I: IntoIterator<Item = RawPost>,
{
    let mut dropped = 0usize;
    let records: Vec<PostRecord> = payloads
        .into_iter()
        .filter_map(|raw| {
            let record = normalize_post(raw, min_text_length);
            if record.is_none() {
                dropped += 1;
            }
            record
        })
        .collect();

    debug!(
        "Normalized {} posts, dropped {} shorter than {} characters",
        records.len(),
        dropped,
        min_text_length
    );
    records
}
