use brandpulse_core::StorageError;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const RAW_TABLE_FILE: &str = "reddit_raw.csv";
pub const PROCESSED_TABLE_FILE: &str = "reddit_cleaned.csv";

/// Directory layout of one project, rooted at `base`.
///
/// ```text
/// base/
///   data/raw/reddit_raw.csv
///   data/processed/reddit_cleaned.csv
///   outputs/charts/
///   outputs/reports/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    base: PathBuf,
}

impl ProjectLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.base.join("data").join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.base.join("data").join("processed")
    }

    pub fn charts_dir(&self) -> PathBuf {
        self.base.join("outputs").join("charts")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.base.join("outputs").join("reports")
    }

    pub fn raw_table_path(&self) -> PathBuf {
        self.raw_dir().join(RAW_TABLE_FILE)
    }

    pub fn processed_table_path(&self) -> PathBuf {
        self.processed_dir().join(PROCESSED_TABLE_FILE)
    }

    pub fn directories(&self) -> [PathBuf; 4] {
        [
            self.raw_dir(),
            self.processed_dir(),
            self.charts_dir(),
            self.reports_dir(),
        ]
    }

    /// Creates every directory of the layout. Safe to call repeatedly.
    pub fn ensure(&self) -> Result<(), StorageError> {
        for dir in self.directories() {
            std::fs::create_dir_all(&dir).map_err(|_| StorageError::DirectoryCreation {
                path: dir.display().to_string(),
            })?;
            debug!("Ensured directory {}", dir.display());
        }
        Ok(())
    }
}
