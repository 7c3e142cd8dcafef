use brandpulse_core::{AnnotatedRecord, PostRecord, StorageError, Topic};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

pub const RAW_COLUMNS: [&str; 8] = [
    "id",
    "subreddit",
    "title",
    "text",
    "created_utc",
    "score",
    "num_comments",
    "url",
];

pub const PROCESSED_COLUMNS: [&str; 11] = [
    "id",
    "subreddit",
    "title",
    "text",
    "created_utc",
    "score",
    "num_comments",
    "url",
    "sentiment",
    "topic",
    "is_question",
];

/// One row of the processed table. Kept flat so the header is exactly
/// [`PROCESSED_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ProcessedRow {
    id: String,
    subreddit: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    text: String,
    created_utc: f64,
    score: i64,
    num_comments: i64,
    #[serde(default)]
    url: String,
    sentiment: f64,
    topic: Topic,
    is_question: bool,
}

impl From<&AnnotatedRecord> for ProcessedRow {
    fn from(record: &AnnotatedRecord) -> Self {
        let post = &record.post;
        Self {
            id: post.id.clone(),
            subreddit: post.source_group.clone(),
            title: post.title.clone(),
            text: post.text.clone(),
            created_utc: post.created_utc,
            score: post.score,
            num_comments: post.num_comments,
            url: post.url.clone(),
            sentiment: record.sentiment,
            topic: record.topic,
            is_question: record.is_question,
        }
    }
}

impl From<ProcessedRow> for AnnotatedRecord {
    fn from(row: ProcessedRow) -> Self {
        AnnotatedRecord {
            post: PostRecord {
                id: row.id,
                source_group: row.subreddit,
                title: row.title,
                text: row.text,
                created_utc: row.created_utc,
                score: row.score,
                num_comments: row.num_comments,
                url: row.url,
            },
            sentiment: row.sentiment,
            topic: row.topic,
            is_question: row.is_question,
        }
    }
}

fn write_rows<T: Serialize>(
    path: &Path,
    columns: &[&str],
    rows: impl Iterator<Item = T>,
) -> Result<usize, StorageError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    // Explicit header so an empty table still carries its columns.
    writer.write_record(columns)?;

    let mut written = 0;
    for row in rows {
        writer.serialize(row)?;
        written += 1;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(written)
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    if !path.exists() {
        return Err(StorageError::TableNotFound {
            path: path.display().to_string(),
        });
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for (index, result) in reader.deserialize().enumerate() {
        let row = result.map_err(|e| StorageError::MalformedRow {
            path: path.display().to_string(),
            // Header is line 1
            row: index as u64 + 2,
            reason: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn write_raw_table(path: &Path, records: &[PostRecord]) -> Result<(), StorageError> {
    let written = write_rows(path, &RAW_COLUMNS, records.iter())?;
    info!("Wrote {} posts to {}", written, path.display());
    Ok(())
}

pub fn read_raw_table(path: &Path) -> Result<Vec<PostRecord>, StorageError> {
    let records: Vec<PostRecord> = read_rows(path)?;
    debug!("Read {} posts from {}", records.len(), path.display());
    Ok(records)
}

pub fn write_processed_table(path: &Path, records: &[AnnotatedRecord]) -> Result<(), StorageError> {
    let written = write_rows(
        path,
        &PROCESSED_COLUMNS,
        records.iter().map(ProcessedRow::from),
    )?;
    info!("Wrote {} annotated records to {}", written, path.display());
    Ok(())
}

pub fn read_processed_table(path: &Path) -> Result<Vec<AnnotatedRecord>, StorageError> {
    let rows: Vec<ProcessedRow> = read_rows(path)?;
    debug!("Read {} annotated records from {}", rows.len(), path.display());
    Ok(rows.into_iter().map(AnnotatedRecord::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn post(id: &str) -> PostRecord {
        PostRecord {
            id: id.to_string(),
            source_group: "boating".to_string(),
            title: "Navy 6.0, first season".to_string(),
            text: "Navy 6.0, first season \"quiet\" and\nreliable".to_string(),
            created_utc: 1_695_000_000.0,
            score: -2,
            num_comments: 7,
            url: String::new(),
        }
    }

    #[test]
    fn test_raw_header_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        write_raw_table(&path, &[post("a")]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().next().unwrap(), RAW_COLUMNS.join(","));
    }

    #[test]
    fn test_raw_table_preserves_text_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        let records = vec![post("b"), post("a"), post("b")];
        write_raw_table(&path, &records).unwrap();

        assert_eq!(read_raw_table(&path).unwrap(), records);
    }

    #[test]
    fn test_empty_table_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.csv");
        write_processed_table(&path, &[]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim_end(), PROCESSED_COLUMNS.join(","));
        assert!(read_processed_table(&path).unwrap().is_empty());
    }

    #[test]
    fn test_processed_columns_and_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.csv");
        let record = AnnotatedRecord {
            post: post("a"),
            sentiment: 0.6249,
            topic: Topic::CustomerService,
            is_question: true,
        };
        write_processed_table(&path, std::slice::from_ref(&record)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().next().unwrap(), PROCESSED_COLUMNS.join(","));
        assert!(contents.contains("Customer Service,true"));
        assert_eq!(read_processed_table(&path).unwrap(), vec![record]);
    }

    #[test]
    fn test_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_processed_table(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, StorageError::TableNotFound { .. }));
    }

    #[test]
    fn test_empty_fields_read_as_empty_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        fs::write(
            &path,
            "id,subreddit,title,text,created_utc,score,num_comments,url\n\
             x1,sailing,,long enough text here,1700000000.0,3,0,\n",
        )
        .unwrap();

        let records = read_raw_table(&path).unwrap();
        assert_eq!(records[0].title, "");
        assert_eq!(records[0].url, "");
        assert_eq!(records[0].text, "long enough text here");
    }

    #[test]
    fn test_malformed_row_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        fs::write(
            &path,
            "id,subreddit,title,text,created_utc,score,num_comments,url\n\
             x1,sailing,t,text,not-a-time,3,0,u\n",
        )
        .unwrap();

        match read_raw_table(&path).unwrap_err() {
            StorageError::MalformedRow { row, .. } => assert_eq!(row, 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
