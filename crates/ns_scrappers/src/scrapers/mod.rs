use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use ns_core::{CollectorConfig, Error, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

pub mod bbc;
pub mod jsonld;

pub use bbc::BbcScraper;

/// Article fields extracted from one HTML page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    pub headline: String,
    pub body: String,
    /// Raw publish date as found in the markup, if any.
    pub published: Option<String>,
}

impl ParsedPage {
    pub fn word_count(&self) -> usize {
        self.body.split_whitespace().count()
    }
}

/// A fetched article page: its raw HTML and what was extracted from it.
#[derive(Debug, Clone)]
pub struct ScrapedPage {
    pub url: String,
    pub html: String,
    pub page: ParsedPage,
}

/// Retrieves the body of a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP; non-2xx statuses are errors.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

impl fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("client", &"<reqwest::Client>")
            .finish()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!("[GET] {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Returns the name of the news source
    fn source(&self) -> &str;

    /// Returns true if this scraper can handle the given URL
    fn can_handle(&self, url: &str) -> bool;

    /// Returns the article URLs linked from a listing page
    async fn get_article_urls(&self, listing_url: &str) -> Result<Vec<String>>;

    /// Fetches an article page and extracts its fields
    async fn scrape_article(&self, url: &str) -> Result<ScrapedPage>;
}

/// Common utilities for scrapers
pub mod utils {
    use super::*;

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
    }

    pub fn selector(css: &str) -> Result<Selector> {
        Selector::parse(css).map_err(|e| Error::Scraping(format!("Invalid selector {}: {:?}", css, e)))
    }

    /// Text of the first element matching `css`, whitespace-collapsed.
    pub fn extract_text(document: &Html, css: &str) -> Result<String> {
        let selector = selector(css)?;
        document
            .select(&selector)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .ok_or_else(|| Error::Scraping(format!("No element found for selector: {}", css)))
    }

    pub fn extract_texts(document: &Html, css: &str) -> Result<Vec<String>> {
        let selector = selector(css)?;
        Ok(document
            .select(&selector)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .collect())
    }

    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
