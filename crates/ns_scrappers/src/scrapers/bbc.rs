use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use ns_core::Result;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::utils::{collapse_whitespace, parse_url};
use super::{jsonld, PageFetcher, ParsedPage, ScrapedPage, Scraper};

pub const BASE_URL: &str = "https://www.bbc.com";

/// Paragraphs shorter than this (in characters) are navigation or captions.
const MIN_PARAGRAPH_CHARS: usize = 20;

const EXCLUDED_PATHS: [&str; 8] = [
    "/live/",
    "/av/",
    "/video/",
    "/tv/",
    "/sounds/",
    "/topics/",
    "/in_pictures",
    "/special/",
];

lazy_static! {
    static ref LINK: Selector = Selector::parse("a[href]").unwrap();
    static ref H1: Selector = Selector::parse("h1").unwrap();
    static ref TIME: Selector = Selector::parse("time[datetime]").unwrap();
    static ref MAIN: Selector = Selector::parse("main").unwrap();
    static ref PARAGRAPH: Selector = Selector::parse("p").unwrap();
}

pub struct BbcScraper {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
}

impl BbcScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::with_base_url(fetcher, BASE_URL)
    }

    pub fn with_base_url(fetcher: Arc<dyn PageFetcher>, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Scraper for BbcScraper {
    fn source(&self) -> &str {
        "BBC News"
    }

    fn can_handle(&self, url: &str) -> bool {
        is_article_url(url, &self.base_url)
    }

    async fn get_article_urls(&self, listing_url: &str) -> Result<Vec<String>> {
        let html = self.fetcher.fetch(listing_url).await?;
        extract_article_links(&html, &self.base_url)
    }

    async fn scrape_article(&self, url: &str) -> Result<ScrapedPage> {
        let html = self.fetcher.fetch(url).await?;
        let page = parse_article(&html);
        Ok(ScrapedPage {
            url: url.to_string(),
            html,
            page,
        })
    }
}

/// True for `/news/articles/<id>` and `/news/<slug>-<digits>` pages under
/// `base_url`, excluding live pages, video, audio and topic indexes.
pub fn is_article_url(url: &str, base_url: &str) -> bool {
    if !url.starts_with(&format!("{}/news", base_url)) {
        return false;
    }
    if EXCLUDED_PATHS.iter().any(|p| url.contains(p)) {
        return false;
    }
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let path = parsed.path();

    if let Some(id) = path.strip_prefix("/news/articles/") {
        return !id.trim_matches('/').is_empty();
    }
    numbered_slug_id(path).is_some()
}

/// Trailing digits of a `/news/<slug>-<digits>` path.
fn numbered_slug_id(path: &str) -> Option<&str> {
    let rest = path.strip_prefix("/news/")?;
    if rest.contains('/') {
        return None;
    }
    let (slug, digits) = rest.rsplit_once('-')?;
    if slug.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits)
}

/// Absolute, deduplicated and sorted article links of a listing page.
pub fn extract_article_links(html: &str, base_url: &str) -> Result<Vec<String>> {
    let base = parse_url(base_url)?;
    let document = Html::parse_document(html);

    let mut urls: Vec<String> = document
        .select(&LINK)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| base.join(href.trim()).ok())
        .map(|url| url.to_string())
        .filter(|url| is_article_url(url, base_url))
        .collect();

    urls.sort();
    urls.dedup();
    Ok(urls)
}

/// Stable identifier for an article URL.
pub fn derive_article_id(url: &str) -> String {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());

    if let Some(id) = path.strip_prefix("/news/articles/") {
        return id.trim_matches('/').to_string();
    }
    if let Some(digits) = numbered_slug_id(&path) {
        return digits.to_string();
    }
    path.trim_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("article")
        .to_string()
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Extracts headline, body paragraphs and publish date from an article page.
pub fn parse_article(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    let headline = document
        .select(&H1)
        .map(element_text)
        .find(|text| !text.is_empty())
        .or_else(|| jsonld::extract_headline(&document))
        .unwrap_or_default();

    let published = document
        .select(&TIME)
        .filter_map(|el| el.value().attr("datetime"))
        .map(|dt| dt.trim().to_string())
        .find(|dt| !dt.is_empty())
        .or_else(|| jsonld::extract_date_published(&document));

    let paragraphs: Vec<ElementRef<'_>> = match document.select(&MAIN).next() {
        Some(main) => main.select(&PARAGRAPH).collect(),
        None => document.select(&PARAGRAPH).collect(),
    };

    let mut body: Vec<String> = Vec::new();
    for text in paragraphs.into_iter().map(element_text) {
        if text.chars().count() < MIN_PARAGRAPH_CHARS {
            continue;
        }
        // Pages sometimes repeat a paragraph back to back.
        if body.last() == Some(&text) {
            continue;
        }
        body.push(text);
    }

    ParsedPage {
        headline,
        body: body.join("\n"),
        published,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::testing::StaticFetcher;

    const ARTICLE: &str = r#"
        <html><head>
            <script type="application/ld+json">{"datePublished": "2024-11-06T07:00:00Z"}</script>
        </head><body>
            <nav><p>Home News Sport Business Innovation Culture</p></nav>
            <main>
                <h1>Markets   surge after election</h1>
                <time datetime="2024-11-06T10:30:00.000Z">6 November 2024</time>
                <p>Investors cheered the outcome as stocks rallied across Asia.</p>
                <p>Short caption</p>
                <p>Investors cheered the outcome as stocks rallied across Asia.</p>
                <p>Analysts said the rally could continue <a href="/x">into next week</a>.</p>
            </main>
        </body></html>
    "#;

    #[test]
    fn test_article_url_patterns() {
        assert!(is_article_url("https://www.bbc.com/news/articles/c62v7n9wzkyo", BASE_URL));
        assert!(is_article_url("https://www.bbc.com/news/world-europe-12345678", BASE_URL));
        assert!(!is_article_url("https://www.bbc.com/news/world", BASE_URL));
        assert!(!is_article_url("https://www.bbc.com/news/war-in-ukraine", BASE_URL));
        assert!(!is_article_url("https://www.bbc.com/news/live/c1234567", BASE_URL));
        assert!(!is_article_url("https://www.bbc.com/news/av/world-12345678", BASE_URL));
        assert!(!is_article_url("https://www.bbc.com/sport/football-12345678", BASE_URL));
        assert!(!is_article_url("https://www.bbc.com/news/articles/", BASE_URL));
        assert!(!is_article_url("https://example.com/news/articles/c1", BASE_URL));
    }

    #[test]
    fn test_extract_article_links() {
        let html = r#"
            <a href="/news/articles/c2">Second</a>
            <a href="/news/articles/c1">First</a>
            <a href="https://www.bbc.com/news/articles/c1">First again</a>
            <a href="/news/business-68000001">Numbered</a>
            <a href="/news/business">Section landing</a>
            <a href="/news/videos/c3">Video</a>
            <a href="https://www.bbc.co.uk/news/articles/c9">Other host</a>
        "#;
        let links = extract_article_links(html, BASE_URL).unwrap();
        assert_eq!(
            links,
            vec![
                "https://www.bbc.com/news/articles/c1",
                "https://www.bbc.com/news/articles/c2",
                "https://www.bbc.com/news/business-68000001",
            ]
        );
    }

    #[test]
    fn test_derive_article_id() {
        assert_eq!(derive_article_id("https://www.bbc.com/news/articles/c62v7n9wzkyo"), "c62v7n9wzkyo");
        assert_eq!(derive_article_id("https://www.bbc.com/news/world-europe-12345678"), "12345678");
        assert_eq!(derive_article_id("https://www.bbc.com/news/in-depth/some-story/"), "some-story");
        assert_eq!(derive_article_id("https://www.bbc.com/"), "article");
    }

    #[test]
    fn test_parse_article() {
        let page = parse_article(ARTICLE);
        assert_eq!(page.headline, "Markets surge after election");
        assert_eq!(page.published.as_deref(), Some("2024-11-06T10:30:00.000Z"));
        assert_eq!(
            page.body,
            "Investors cheered the outcome as stocks rallied across Asia.\n\
             Analysts said the rally could continue into next week."
        );
    }

    #[test]
    fn test_parse_article_falls_back_to_json_ld_date() {
        let html = r#"<script type="application/ld+json">{"datePublished": "2024-11-07"}</script>
                      <h1>Economy faces uncertainty</h1>"#;
        let page = parse_article(html);
        assert_eq!(page.published.as_deref(), Some("2024-11-07"));
        assert!(page.body.is_empty());
    }

    #[tokio::test]
    async fn test_scrape_article_through_fetcher() {
        let url = "https://www.bbc.com/news/articles/c1";
        let fetcher = Arc::new(StaticFetcher::default().with_page(url, ARTICLE));
        let scraper = BbcScraper::new(fetcher);

        assert!(scraper.can_handle(url));
        let scraped = scraper.scrape_article(url).await.unwrap();
        assert_eq!(scraped.url, url);
        assert_eq!(scraped.page.headline, "Markets surge after election");
        assert!(scraped.html.contains("<main>"));

        assert!(scraper.scrape_article("https://www.bbc.com/news/articles/missing").await.is_err());
    }
}
