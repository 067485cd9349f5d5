use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ns_core::{
    CleanArticle, PipelineConfig, Result, ScoredArticle, SectionSummary, SentimentLabel, TimeSummary,
};
use ns_storage::{CsvStore, RecordStore};
use tracing::info;

use crate::models::{create_model, SentimentModel};

pub mod summary;

pub use summary::{section_summary, time_summary};

#[derive(Debug, Default, Clone)]
pub struct AnalysisReport {
    pub scored: usize,
    pub section_rows: usize,
    pub time_rows: usize,
    pub headline_labels: BTreeMap<SentimentLabel, usize>,
    pub body_labels: BTreeMap<SentimentLabel, usize>,
}

pub struct Analyzer {
    config: PipelineConfig,
    model: Arc<dyn SentimentModel>,
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("model", &self.model.name())
            .finish()
    }
}

impl Analyzer {
    /// Analyzer using the model named in the configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let model = create_model(&config.analyzer)?;
        Ok(Self::with_model(config, model))
    }

    pub fn with_model(config: PipelineConfig, model: Arc<dyn SentimentModel>) -> Self {
        Self { config, model }
    }

    /// Scores headline and body of every article independently.
    pub fn score(&self, articles: Vec<CleanArticle>) -> Vec<ScoredArticle> {
        articles
            .into_iter()
            .map(|article| {
                let headline = self.model.compound(&article.headline);
                let body = self.model.compound(&article.body);
                ScoredArticle::new(article, headline, body)
            })
            .collect()
    }

    pub fn run(&self) -> Result<AnalysisReport> {
        let clean: Vec<CleanArticle> = CsvStore::new(self.config.clean_csv_path()).load()?;
        info!("🧠 Scoring {} articles with {}", clean.len(), self.model.name());

        let scored = self.score(clean);
        CsvStore::new(self.config.scored_path()).save(&scored)?;

        let sections: Vec<SectionSummary> = section_summary(&scored);
        CsvStore::new(self.config.section_summary_path()).save(&sections)?;

        let settings = &self.config.analyzer;
        let trend: Vec<TimeSummary> =
            time_summary(&scored, settings.rolling_window_days, settings.rolling_min_periods);
        CsvStore::new(self.config.time_summary_path()).save(&trend)?;

        let report = AnalysisReport {
            scored: scored.len(),
            section_rows: sections.len(),
            time_rows: trend.len(),
            headline_labels: label_counts(scored.iter().map(|a| a.headline_sentiment_label)),
            body_labels: label_counts(scored.iter().map(|a| a.body_sentiment_label)),
        };
        log_distribution("headline", &report.headline_labels, report.scored);
        log_distribution("body", &report.body_labels, report.scored);
        info!(
            "✅ Wrote {}, {} and {}",
            self.config.scored_path().display(),
            self.config.section_summary_path().display(),
            self.config.time_summary_path().display()
        );
        Ok(report)
    }
}

fn label_counts(labels: impl Iterator<Item = SentimentLabel>) -> BTreeMap<SentimentLabel, usize> {
    let mut counts: BTreeMap<SentimentLabel, usize> = SentimentLabel::ALL.iter().map(|&l| (l, 0)).collect();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    counts
}

fn log_distribution(field: &str, counts: &BTreeMap<SentimentLabel, usize>, total: usize) {
    let parts: Vec<String> = counts
        .iter()
        .map(|(label, n)| {
            let share = if total == 0 { 0.0 } else { *n as f64 * 100.0 / total as f64 };
            format!("{} {} ({:.1}%)", label, n, share)
        })
        .collect();
    info!("📊 {} labels: {}", field, parts.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ns_core::{Error, Section};

    fn clean(id: &str, section: Section, day: u32, headline: &str, body: &str) -> CleanArticle {
        CleanArticle {
            identifier: id.to_string(),
            section,
            headline: headline.to_string(),
            body: body.to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 11, day, 9, 0, 0).unwrap(),
        }
    }

    fn write_clean(config: &PipelineConfig, rows: &[CleanArticle]) {
        CsvStore::new(config.clean_csv_path()).save(rows).unwrap();
    }

    #[test]
    fn test_run_writes_scored_table_and_summaries() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::with_root(dir.path());
        write_clean(
            &config,
            &[
                clean("a", Section::World, 6, "Markets surge after election", "Investors cheered the outcome."),
                clean("b", Section::Business, 7, "Economy faces uncertainty", "Analysts warned of volatility."),
            ],
        );

        let report = Analyzer::new(config.clone()).unwrap().run().unwrap();
        assert_eq!(report.scored, 2);
        assert_eq!(report.section_rows, 2);
        assert_eq!(report.headline_labels[&SentimentLabel::Positive], 1);
        assert_eq!(report.headline_labels[&SentimentLabel::Negative], 1);

        let scored: Vec<ScoredArticle> = CsvStore::new(config.scored_path()).load().unwrap();
        for row in &scored {
            assert_eq!(row.headline_sentiment_label, SentimentLabel::from_score(row.headline_sentiment_score));
            assert_eq!(row.body_sentiment_label, SentimentLabel::from_score(row.body_sentiment_score));
        }
        assert_eq!(scored[0].headline_sentiment_label, SentimentLabel::Positive);

        let sections: Vec<SectionSummary> = CsvStore::new(config.section_summary_path()).load().unwrap();
        assert!(sections.iter().all(|s| s.n_articles == 1));

        let trend: Vec<TimeSummary> = CsvStore::new(config.time_summary_path()).load().unwrap();
        assert_eq!(trend.len(), 4);
        assert!(trend.iter().all(|t| t.headline_roll7.is_none()));
    }

    #[test]
    fn test_empty_input_writes_headers_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::with_root(dir.path());
        write_clean(&config, &[]);

        let report = Analyzer::new(config.clone()).unwrap().run().unwrap();
        assert_eq!(report.scored, 0);

        for path in [config.scored_path(), config.section_summary_path(), config.time_summary_path()] {
            let content = std::fs::read_to_string(&path).unwrap();
            assert_eq!(content.lines().count(), 1, "{} should hold only a header", path.display());
        }
    }

    #[test]
    fn test_missing_clean_table_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = Analyzer::new(PipelineConfig::with_root(dir.path())).unwrap().run();
        assert!(matches!(result, Err(Error::MissingInput(_))));
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let mut config = PipelineConfig::default();
        config.analyzer.model = "bert".to_string();
        assert!(Analyzer::new(config).is_err());
    }
}
