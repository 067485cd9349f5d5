use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ns_core::{Article, Logger, PipelineConfig, RawMetadataRow, Result, Section, SectionSource};
use ns_storage::CsvStore;
use tokio::time::sleep;
use tracing::info;

use crate::scrapers::bbc::derive_article_id;
use crate::scrapers::{BbcScraper, HttpFetcher, PageFetcher, ScrapedPage, Scraper};

type BoxedScraper = Box<dyn Scraper + Send + Sync>;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CollectionReport {
    pub per_section: Vec<(Section, usize)>,
}

impl CollectionReport {
    pub fn total(&self) -> usize {
        self.per_section.iter().map(|(_, n)| n).sum()
    }
}

/// Walks the configured section listings and stores every valid article as
/// a raw HTML file plus one metadata row.
pub struct Collector {
    config: PipelineConfig,
    scraper: BoxedScraper,
    metadata: CsvStore,
    logger: Logger,
}

impl Collector {
    pub fn new(config: PipelineConfig, scraper: BoxedScraper) -> Self {
        let metadata = CsvStore::new(config.metadata_path());
        Self {
            config,
            scraper,
            metadata,
            logger: Logger::new().with_prefix("[collect]".to_string()),
        }
    }

    /// Collector backed by a live HTTP client.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config.collector)?);
        let scraper = BbcScraper::with_base_url(fetcher, &config.collector.base_url);
        Ok(Self::new(config, Box::new(scraper)))
    }

    pub fn sources(&self) -> &[SectionSource] {
        &self.config.collector.sections
    }

    pub async fn run(&self) -> Result<CollectionReport> {
        std::fs::create_dir_all(self.config.html_dir())?;
        self.metadata.ensure_header::<RawMetadataRow>()?;

        info!("🦗 Collecting from {} ({} sections)", self.scraper.source(), self.sources().len());
        let mut report = CollectionReport::default();
        for source in self.sources() {
            let collected = self.collect_section(source).await?;
            report.per_section.push((source.section, collected));
        }

        info!(
            "✅ Collected {} articles in total; metadata at {}",
            report.total(),
            self.metadata_path().display()
        );
        Ok(report)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.config.metadata_path()
    }

    async fn collect_section(&self, source: &SectionSource) -> Result<usize> {
        let settings = &self.config.collector;
        let logger = self.logger.clone().with_prefix(format!("[{}]", source.section));
        let target = settings.articles_per_section;

        logger.info(&format!("📰 Scraping section {}", source.url));
        let mut collected = 0;
        let mut seen: HashSet<String> = HashSet::new();
        let mut stale_pages = 0;

        for page in 0..settings.max_pages_per_section {
            let listing_url = if page == 0 {
                source.url.clone()
            } else {
                format!("{}?page={}", source.url, page)
            };

            let candidates = match self.scraper.get_article_urls(&listing_url).await {
                Ok(urls) => urls,
                Err(e) => {
                    logger.warn(&format!("⚠️ Failed to load listing {}: {}; stopping section", listing_url, e));
                    break;
                }
            };
            logger.info(&format!("Page {}: found {} candidate article URLs", page, candidates.len()));

            let new_urls: Vec<String> = candidates.into_iter().filter(|u| !seen.contains(u)).collect();
            if new_urls.is_empty() {
                stale_pages += 1;
            } else {
                stale_pages = 0;
            }
            if stale_pages >= settings.stale_page_limit {
                logger.info(&format!("No new URLs for {} pages; stopping section", stale_pages));
                break;
            }

            for url in new_urls {
                if collected >= target {
                    break;
                }
                seen.insert(url.clone());

                if let Some(article) = self.collect_url(source.section, &url, &logger).await? {
                    collected += 1;
                    logger.info(&format!("🆕 {} ({}/{})", article.headline, collected, target));
                    self.pause().await;
                }
            }

            self.pause().await;
            if collected >= target {
                break;
            }
        }

        logger.info(&format!("Done: {} valid articles", collected));
        Ok(collected)
    }

    /// Fetches and stores one article. Fetch and validation failures are
    /// logged and yield `Ok(None)`; only local I/O errors are returned.
    pub async fn collect_url(&self, section: Section, url: &str, logger: &Logger) -> Result<Option<Article>> {
        let scraped = match self.scraper.scrape_article(url).await {
            Ok(scraped) => scraped,
            Err(e) => {
                logger.warn(&format!("⚠️ Failed to fetch {}: {}", url, e));
                return Ok(None);
            }
        };

        let word_count = scraped.page.word_count();
        if scraped.page.headline.is_empty() {
            logger.info(&format!("⏭️ Skipping article without headline: {}", url));
            return Ok(None);
        }
        if word_count < self.config.collector.min_words {
            logger.info(&format!("⏭️ Skipping very short article ({} words): {}", word_count, url));
            return Ok(None);
        }

        let article = Article {
            identifier: derive_article_id(url),
            url: url.to_string(),
            section,
            headline: scraped.page.headline.clone(),
            body: scraped.page.body.clone(),
            published: scraped.page.published.clone().unwrap_or_default(),
            fetched_at: Utc::now(),
        };
        self.store(&article, &scraped)?;
        Ok(Some(article))
    }

    fn store(&self, article: &Article, scraped: &ScrapedPage) -> Result<RawMetadataRow> {
        let html_path = self
            .config
            .html_dir()
            .join(format!("{}_{}.html", article.section, article.identifier));
        if let Some(parent) = html_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&html_path, &scraped.html)?;

        let row = RawMetadataRow {
            identifier: article.identifier.clone(),
            path: self.config.relativize(&html_path),
            section: article.section,
            url: article.url.clone(),
            fetch_timestamp: article.fetched_at,
        };
        self.metadata.append(&row)?;
        Ok(row)
    }

    async fn pause(&self) {
        let delay = self.config.collector.request_delay_ms;
        if delay > 0 {
            sleep(Duration::from_millis(delay)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::testing::StaticFetcher;
    use ns_storage::RecordStore;

    fn article_html(headline: &str, words: usize) -> String {
        let sentence = "The vote count continued overnight in several key states today. ";
        let body = sentence.repeat(words / 10 + 1);
        format!(
            r#"<main><h1>{}</h1><time datetime="2024-11-06T10:00:00Z"></time><p>{}</p></main>"#,
            headline, body
        )
    }

    fn config(root: &std::path::Path) -> PipelineConfig {
        let mut config = PipelineConfig::with_root(root);
        config.collector.sections = vec![SectionSource {
            section: Section::World,
            url: "https://www.bbc.com/news/world".to_string(),
        }];
        config.collector.request_delay_ms = 0;
        config.collector.max_pages_per_section = 5;
        config.collector.min_words = 20;
        config
    }

    fn listing() -> &'static str {
        r#"
            <a href="/news/articles/c1">One</a>
            <a href="/news/articles/c2">Two</a>
            <a href="/news/articles/c3">Three</a>
            <a href="/news/articles/c4">Four</a>
            <a href="/news/live/c5">Live</a>
        "#
    }

    fn fetcher() -> StaticFetcher {
        StaticFetcher::default()
            .with_page("https://www.bbc.com/news/world", listing())
            .with_page("https://www.bbc.com/news/world?page=1", listing())
            .with_page("https://www.bbc.com/news/articles/c1", &article_html("Election result declared", 40))
            .with_page("https://www.bbc.com/news/articles/c2", &article_html("Too short", 0).replace("<p>", "<p>tiny "))
            .with_page("https://www.bbc.com/news/articles/c3", &article_html("", 40))
        // c4 is missing and fails like a 404
    }

    #[tokio::test]
    async fn test_run_skips_failures_and_writes_raw_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let fetcher = Arc::new(fetcher());
        let scraper = BbcScraper::new(fetcher.clone());
        let collector = Collector::new(config.clone(), Box::new(scraper));

        let report = collector.run().await.unwrap();
        assert_eq!(report.per_section, vec![(Section::World, 1)]);

        let rows: Vec<RawMetadataRow> = CsvStore::new(config.metadata_path()).load().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].identifier, "c1");
        assert_eq!(rows[0].path, "data/raw/html/world_c1.html");
        assert_eq!(rows[0].url, "https://www.bbc.com/news/articles/c1");

        let html = std::fs::read_to_string(config.resolve(&rows[0].path)).unwrap();
        assert!(html.contains("Election result declared"));

        // Page 0 brings four new links, page 1 none; the live page is never requested.
        let requests = fetcher.requests.lock().unwrap();
        assert!(!requests.iter().any(|u| u.contains("/live/")));
        assert_eq!(requests.iter().filter(|u| u.ends_with("/articles/c1")).count(), 1);
    }

    #[tokio::test]
    async fn test_stops_after_stale_pages() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.collector.stale_page_limit = 1;
        let fetcher = Arc::new(fetcher());
        let collector = Collector::new(config, Box::new(BbcScraper::new(fetcher.clone())));

        collector.run().await.unwrap();

        let requests = fetcher.requests.lock().unwrap();
        assert!(requests.contains(&"https://www.bbc.com/news/world?page=1".to_string()));
        assert!(!requests.iter().any(|u| u.ends_with("?page=2")));
    }

    #[tokio::test]
    async fn test_target_count_limits_articles() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.collector.articles_per_section = 1;
        let fetcher = Arc::new(
            fetcher().with_page("https://www.bbc.com/news/articles/c2", &article_html("Second story", 40)),
        );
        let collector = Collector::new(config.clone(), Box::new(BbcScraper::new(fetcher)));

        let report = collector.run().await.unwrap();
        assert_eq!(report.total(), 1);
    }

    #[tokio::test]
    async fn test_rerun_appends_duplicate_rows() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        for _ in 0..2 {
            let collector = Collector::new(config.clone(), Box::new(BbcScraper::new(Arc::new(fetcher()))));
            collector.run().await.unwrap();
        }

        let rows: Vec<RawMetadataRow> = CsvStore::new(config.metadata_path()).load().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].identifier, rows[1].identifier);
    }
}
