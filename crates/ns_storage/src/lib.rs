use std::path::Path;

use ns_core::{
    CleanArticle, RawMetadataRow, Result, ScoredArticle, SectionSummary, TimeSummary,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod backends;

pub use backends::*;

/// A row type that can be written to and read from a table file.
///
/// `HEADERS` is written explicitly so that an empty table still carries its
/// header row; it must list the struct fields in declaration order.
pub trait TabularRecord: Serialize + DeserializeOwned {
    const HEADERS: &'static [&'static str];
}

/// A table file owned by one pipeline stage.
pub trait RecordStore<T: TabularRecord> {
    fn path(&self) -> &Path;

    /// Replaces the whole table with `rows`.
    fn save(&self, rows: &[T]) -> Result<()>;

    /// Reads every row, skipping (and logging) rows that fail to parse.
    /// Fails with `MissingInput` when the file does not exist.
    fn load(&self) -> Result<Vec<T>>;
}

impl TabularRecord for RawMetadataRow {
    const HEADERS: &'static [&'static str] =
        &["identifier", "path", "section", "url", "fetch_timestamp"];
}

impl TabularRecord for CleanArticle {
    const HEADERS: &'static [&'static str] =
        &["identifier", "section", "headline", "body", "published_at"];
}

impl TabularRecord for ScoredArticle {
    const HEADERS: &'static [&'static str] = &[
        "identifier",
        "section",
        "headline",
        "body",
        "published_at",
        "headline_sentiment_score",
        "headline_sentiment_label",
        "body_sentiment_score",
        "body_sentiment_label",
    ];
}

impl TabularRecord for SectionSummary {
    const HEADERS: &'static [&'static str] = &[
        "section",
        "n_articles",
        "mean_headline",
        "median_headline",
        "mean_body",
        "median_body",
        "mean_delta",
        "std_headline",
        "std_body",
    ];
}

impl TabularRecord for TimeSummary {
    const HEADERS: &'static [&'static str] = &[
        "date",
        "scope",
        "n_articles",
        "mean_headline",
        "mean_body",
        "mean_delta",
        "headline_roll7",
        "body_roll7",
    ];
}

pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
