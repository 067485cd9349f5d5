//! Renders the result charts from the analyzer's tables.

use std::path::{Path, PathBuf};

use ns_core::{Error, PipelineConfig, Result, ScoredArticle, SectionSummary, TimeSummary};
use ns_storage::{CsvStore, RecordStore, TabularRecord};
use tracing::{info, warn};

pub mod charts;

pub const ARTICLES_PER_SECTION: &str = "fig1_articles_per_section.svg";
pub const HEADLINE_VS_BODY: &str = "fig2_headline_vs_body_by_section.svg";
pub const DELTA_DISTRIBUTION: &str = "fig3_headline_minus_body_distribution.svg";
pub const LABEL_PROPORTIONS: &str = "fig4_label_proportions_headline_vs_body.svg";
pub const ROLLING_TREND: &str = "fig5_time_series_headline_vs_body_rolling7d.svg";

#[derive(Debug, Default, Clone)]
pub struct RenderReport {
    pub written: Vec<PathBuf>,
    /// Charts whose input table is missing or empty.
    pub skipped: Vec<&'static str>,
    /// Charts that failed to render; the others are still drawn.
    pub failed: Vec<&'static str>,
}

pub struct Visualizer {
    config: PipelineConfig,
}

/// A table that is absent or has no rows.
enum Table<T> {
    Missing,
    Empty,
    Rows(Vec<T>),
}

impl<T> Table<T> {
    fn rows(&self) -> Option<&[T]> {
        match self {
            Table::Rows(rows) => Some(rows.as_slice()),
            _ => None,
        }
    }
}

fn load_table<T: TabularRecord>(path: &Path) -> Result<Table<T>> {
    match RecordStore::<T>::load(&CsvStore::new(path)) {
        Ok(rows) if rows.is_empty() => Ok(Table::Empty),
        Ok(rows) => Ok(Table::Rows(rows)),
        Err(Error::MissingInput(_)) => Ok(Table::Missing),
        Err(e) => Err(e),
    }
}

impl Visualizer {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<RenderReport> {
        let scored_path = self.config.scored_path();
        let scored: Table<ScoredArticle> = load_table(&scored_path)?;
        let sections: Table<SectionSummary> = load_table(&self.config.section_summary_path())?;
        let trend: Table<TimeSummary> = load_table(&self.config.time_summary_path())?;

        if matches!((&scored, &sections, &trend), (Table::Missing, Table::Missing, Table::Missing)) {
            return Err(Error::MissingInput(scored_path));
        }
        std::fs::create_dir_all(self.config.results_dir())?;

        let mut report = RenderReport::default();
        let rolling_days = self.config.analyzer.rolling_window_days;
        let scored = scored.rows();
        self.render(&mut report, ARTICLES_PER_SECTION, scored, charts::articles_per_section);
        self.render(&mut report, HEADLINE_VS_BODY, sections.rows(), charts::headline_vs_body_by_section);
        self.render(&mut report, DELTA_DISTRIBUTION, scored, charts::headline_minus_body_distribution);
        self.render(&mut report, LABEL_PROPORTIONS, scored, charts::label_proportions);
        self.render(&mut report, ROLLING_TREND, trend.rows(), |rows, path| {
            charts::rolling_trend(rows, rolling_days, path)
        });

        info!(
            "🎨 Rendered {} charts into {} ({} skipped, {} failed)",
            report.written.len(),
            self.config.results_dir().display(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }

    fn render<T>(
        &self,
        report: &mut RenderReport,
        file_name: &'static str,
        rows: Option<&[T]>,
        draw: impl Fn(&[T], &Path) -> Result<()>,
    ) {
        let Some(rows) = rows else {
            warn!("⚠️ Skipping {}: input table is missing or empty", file_name);
            report.skipped.push(file_name);
            return;
        };
        let path = self.config.results_dir().join(file_name);
        match draw(rows, &path) {
            Ok(()) => {
                info!("Saved {}", path.display());
                report.written.push(path);
            }
            Err(e) => {
                warn!("⚠️ Failed to render {}: {}", file_name, e);
                report.failed.push(file_name);
            }
        }
    }
}
