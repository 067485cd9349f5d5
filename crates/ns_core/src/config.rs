//! Pipeline configuration shared by every stage.
//!
//! All file locations hang off a single project root; the remaining knobs
//! default to the values the analysis was run with and can be overridden
//! from a JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Section;
use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    #[serde(skip)]
    pub root: PathBuf,
    pub window: EventWindow,
    pub collector: CollectorConfig,
    pub cleaner: CleanerConfig,
    pub analyzer: AnalyzerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            window: EventWindow::default(),
            collector: CollectorConfig::default(),
            cleaner: CleanerConfig::default(),
            analyzer: AnalyzerConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Builds the configuration for `root`, layering an optional JSON file
    /// over the defaults.
    pub fn load(root: impl Into<PathBuf>, config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                serde_json::from_str::<PipelineConfig>(&raw)?
            }
            None => PipelineConfig::default(),
        };
        config.root = root.into();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.start > self.window.end {
            return Err(Error::Config(format!(
                "Event window starts after it ends: {} > {}",
                self.window.start, self.window.end
            )));
        }
        if self.collector.sections.is_empty() {
            return Err(Error::Config("No collector sections configured".to_string()));
        }
        if self.analyzer.rolling_window_days == 0
            || self.analyzer.rolling_window_days > MAX_ROLLING_WINDOW_DAYS
        {
            return Err(Error::Config(format!(
                "Rolling window must span 1 to {} days, got {}",
                MAX_ROLLING_WINDOW_DAYS, self.analyzer.rolling_window_days
            )));
        }
        if let Some((word, valence)) = self
            .analyzer
            .lexicon_overrides
            .iter()
            .find(|(_, v)| !v.is_finite() || v.abs() > 4.0)
        {
            return Err(Error::Config(format!(
                "Lexicon override for '{}' must lie in [-4, 4], got {}",
                word, valence
            )));
        }
        Ok(())
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("data").join("raw")
    }

    pub fn html_dir(&self) -> PathBuf {
        self.raw_dir().join("html")
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.raw_dir().join("metadata.csv")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("data").join("processed")
    }

    pub fn clean_csv_path(&self) -> PathBuf {
        self.processed_dir().join("articles_clean.csv")
    }

    pub fn clean_jsonl_path(&self) -> PathBuf {
        self.processed_dir().join("articles_clean.jsonl")
    }

    pub fn scored_path(&self) -> PathBuf {
        self.processed_dir().join("articles_with_sentiment.csv")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.root.join("results")
    }

    pub fn section_summary_path(&self) -> PathBuf {
        self.results_dir().join("summary_section.csv")
    }

    pub fn time_summary_path(&self) -> PathBuf {
        self.results_dir().join("summary_time.csv")
    }

    /// Resolves a path stored in the metadata table (relative to the root).
    pub fn resolve(&self, relative: &str) -> PathBuf {
        let path = Path::new(relative);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Inverse of [`resolve`](Self::resolve): expresses `path` relative to
    /// the root when it lives under it.
    pub fn relativize(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// Inclusive date range of articles kept for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for EventWindow {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2024, 11, 5).expect("valid window start"),
            end: NaiveDate::from_ymd_opt(2025, 12, 15).expect("valid window end"),
        }
    }
}

impl EventWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSource {
    pub section: Section,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub base_url: String,
    pub sections: Vec<SectionSource>,
    pub articles_per_section: usize,
    pub max_pages_per_section: usize,
    /// Consecutive listing pages without unseen links before a section stops.
    pub stale_page_limit: usize,
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub min_words: usize,
    pub user_agent: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        let base_url = "https://www.bbc.com".to_string();
        let sections = [Section::World, Section::Business, Section::Technology]
            .into_iter()
            .map(|section| SectionSource {
                section,
                url: format!("{}/news/{}", base_url, section),
            })
            .collect();
        Self {
            base_url,
            sections,
            articles_per_section: 50,
            max_pages_per_section: 60,
            stale_page_limit: 3,
            request_delay_ms: 1000,
            request_timeout_secs: 15,
            min_words: 80,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupStrategy {
    /// Same identifier.
    #[default]
    Identifier,
    /// Same identifier, same section and headline, or same normalized
    /// headline and body.
    IdentifierOrContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    pub min_headline_chars: usize,
    pub min_body_words: usize,
    pub dedup: DedupStrategy,
    pub max_per_section: Option<usize>,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            min_headline_chars: 8,
            min_body_words: 1,
            dedup: DedupStrategy::Identifier,
            max_per_section: Some(120),
        }
    }
}

/// Longest rolling window accepted, one leap year.
pub const MAX_ROLLING_WINDOW_DAYS: u32 = 366;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub model: String,
    pub rolling_window_days: u32,
    pub rolling_min_periods: usize,
    /// Valences layered over the stock VADER lexicon for news vocabulary it
    /// leaves unscored. An empty map scores with the stock lexicon only.
    pub lexicon_overrides: BTreeMap<String, f64>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: "vader".to_string(),
            rolling_window_days: 7,
            rolling_min_periods: 3,
            lexicon_overrides: BTreeMap::from([("surge".to_string(), 1.2)]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_window_is_inclusive() {
        let window = EventWindow::new(
            NaiveDate::from_ymd_opt(2024, 11, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 11, 30).unwrap(),
        );
        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 11, 5).unwrap()));
        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 11, 30).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 11, 4).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()));
    }

    #[test]
    fn test_default_paths() {
        let config = PipelineConfig::with_root("/project");
        assert_eq!(config.metadata_path(), PathBuf::from("/project/data/raw/metadata.csv"));
        assert_eq!(
            config.clean_jsonl_path(),
            PathBuf::from("/project/data/processed/articles_clean.jsonl")
        );
        assert_eq!(
            config.time_summary_path(),
            PathBuf::from("/project/results/summary_time.csv")
        );
        assert_eq!(config.collector.sections[0].url, "https://www.bbc.com/news/world");
    }

    #[test]
    fn test_relativize_and_resolve() {
        let config = PipelineConfig::with_root("/project");
        let file = config.html_dir().join("world_abc.html");
        let relative = config.relativize(&file);
        assert_eq!(relative, "data/raw/html/world_abc.html");
        assert_eq!(config.resolve(&relative), file);
    }

    #[test]
    fn test_load_overrides_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"window": {{"start": "2024-11-01", "end": "2024-11-30"}}, "cleaner": {{"dedup": "identifier_or_content"}}}}"#
        )
        .unwrap();

        let config = PipelineConfig::load("/tmp/root", Some(file.path())).unwrap();
        assert_eq!(config.root, PathBuf::from("/tmp/root"));
        assert_eq!(config.window.start, NaiveDate::from_ymd_opt(2024, 11, 1).unwrap());
        assert_eq!(config.cleaner.dedup, DedupStrategy::IdentifierOrContent);
        assert_eq!(config.cleaner.min_headline_chars, 8);
        assert_eq!(config.analyzer.rolling_window_days, 7);
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let mut config = PipelineConfig::default();
        config.window = EventWindow::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_bounds_rolling_window() {
        let mut config = PipelineConfig::default();
        config.analyzer.rolling_window_days = MAX_ROLLING_WINDOW_DAYS;
        assert!(config.validate().is_ok());

        config.analyzer.rolling_window_days = u32::MAX;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        config.analyzer.rolling_window_days = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_lexicon_overrides() {
        let config = PipelineConfig::default();
        assert_eq!(config.analyzer.lexicon_overrides.get("surge"), Some(&1.2));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"analyzer": {{"lexicon_overrides": {{}}}}}}"#).unwrap();
        let config = PipelineConfig::load("/tmp/root", Some(file.path())).unwrap();
        assert!(config.analyzer.lexicon_overrides.is_empty());

        let mut config = PipelineConfig::default();
        config.analyzer.lexicon_overrides.insert("boom".to_string(), 9.0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
