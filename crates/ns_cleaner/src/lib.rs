//! Turns the collector's raw HTML snapshots into one clean, deduplicated
//! table of articles inside the configured event window.

use std::collections::HashMap;

use ns_core::{CleanArticle, Logger, PipelineConfig, RawMetadataRow, Result, Section};
use ns_scrappers::scrapers::bbc::parse_article;
use ns_storage::{CsvStore, JsonLinesStore, RecordStore};
use tracing::info;

pub mod dedup;
pub mod normalize;

pub use dedup::Deduplicator;
use normalize::{is_generic_headline, normalize_body, normalize_text, parse_published};

/// Why a metadata row did not make it into the clean table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    UnreadableHtml,
    BadDate,
    EmptyBody,
    LowQuality,
    OutsideWindow,
    Duplicate,
    SectionCap,
}

#[derive(Debug, Default, Clone)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub kept: usize,
    pub dropped: HashMap<DropReason, usize>,
}

impl CleaningReport {
    fn record(&mut self, reason: DropReason, count: usize) {
        if count > 0 {
            *self.dropped.entry(reason).or_default() += count;
        }
    }

    pub fn dropped(&self, reason: DropReason) -> usize {
        self.dropped.get(&reason).copied().unwrap_or(0)
    }
}

pub struct Cleaner {
    config: PipelineConfig,
    logger: Logger,
}

impl Cleaner {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            logger: Logger::new().with_prefix("[clean]".to_string()),
        }
    }

    pub fn run(&self) -> Result<CleaningReport> {
        let metadata: Vec<RawMetadataRow> = CsvStore::new(self.config.metadata_path()).load()?;
        let mut report = CleaningReport {
            input_rows: metadata.len(),
            ..CleaningReport::default()
        };
        info!("🧹 Cleaning {} raw articles", metadata.len());

        let settings = &self.config.cleaner;
        let mut dedup = Deduplicator::new(settings.dedup);
        let mut articles = Vec::new();
        for row in &metadata {
            let article = match self.clean_row(row) {
                Ok(article) => article,
                Err(reason) => {
                    report.record(reason, 1);
                    continue;
                }
            };
            if !self.config.window.contains(article.published_date()) {
                report.record(DropReason::OutsideWindow, 1);
                continue;
            }
            if !dedup.admit(&article) {
                report.record(DropReason::Duplicate, 1);
                continue;
            }
            articles.push(article);
        }

        sort_articles(&mut articles);
        if let Some(cap) = settings.max_per_section {
            let before = articles.len();
            articles = cap_per_section(articles, cap);
            report.record(DropReason::SectionCap, before - articles.len());
        }
        report.kept = articles.len();

        CsvStore::new(self.config.clean_csv_path()).save(&articles)?;
        JsonLinesStore::new(self.config.clean_jsonl_path()).save(&articles)?;

        info!(
            "✅ Kept {} of {} articles ({} outside window, {} duplicates) -> {}",
            report.kept,
            report.input_rows,
            report.dropped(DropReason::OutsideWindow),
            report.dropped(DropReason::Duplicate),
            self.config.clean_csv_path().display()
        );
        Ok(report)
    }

    fn clean_row(&self, row: &RawMetadataRow) -> std::result::Result<CleanArticle, DropReason> {
        let path = self.config.resolve(&row.path);
        let html = std::fs::read_to_string(&path).map_err(|e| {
            self.logger.warn(&format!("⚠️ Cannot read {}: {}", path.display(), e));
            DropReason::UnreadableHtml
        })?;

        let page = parse_article(&html);
        let headline = normalize_text(&page.headline);
        let body = normalize_body(&page.body);

        let published_at = page.published.as_deref().and_then(parse_published).ok_or_else(|| {
            self.logger.warn(&format!(
                "⚠️ Dropping {}: unparseable publish date {:?}",
                row.identifier, page.published
            ));
            DropReason::BadDate
        })?;
        if body.is_empty() {
            self.logger.warn(&format!("⚠️ Dropping {}: empty body", row.identifier));
            return Err(DropReason::EmptyBody);
        }

        let settings = &self.config.cleaner;
        if is_generic_headline(&headline)
            || headline.chars().count() < settings.min_headline_chars
            || body.split_whitespace().count() < settings.min_body_words
        {
            self.logger.debug(&format!("Dropping low-quality article {}", row.identifier));
            return Err(DropReason::LowQuality);
        }

        Ok(CleanArticle {
            identifier: row.identifier.clone(),
            section: row.section,
            headline,
            body,
            published_at,
        })
    }
}

/// Section, then newest first, then identifier.
pub fn sort_articles(articles: &mut [CleanArticle]) {
    articles.sort_by(|a, b| {
        a.section
            .cmp(&b.section)
            .then_with(|| b.published_at.cmp(&a.published_at))
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
}

/// Keeps the first `cap` articles of each section; expects sorted input.
pub fn cap_per_section(articles: Vec<CleanArticle>, cap: usize) -> Vec<CleanArticle> {
    let mut counts: HashMap<Section, usize> = HashMap::new();
    articles
        .into_iter()
        .filter(|article| {
            let count = counts.entry(article.section).or_default();
            *count += 1;
            *count <= cap
        })
        .collect()
}
