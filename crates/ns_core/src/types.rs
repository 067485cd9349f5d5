use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// News category used as the grouping key across the pipeline.
///
/// Variants are declared in alphabetical order so that the derived `Ord`
/// matches the lexical order of the serialized names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Business,
    Entertainment,
    Health,
    Politics,
    Science,
    Technology,
    Uk,
    World,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Business,
        Section::Entertainment,
        Section::Health,
        Section::Politics,
        Section::Science,
        Section::Technology,
        Section::Uk,
        Section::World,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Business => "business",
            Section::Entertainment => "entertainment",
            Section::Health => "health",
            Section::Politics => "politics",
            Section::Science => "science",
            Section::Technology => "technology",
            Section::Uk => "uk",
            Section::World => "world",
        }
    }

    /// Human readable name for chart labels.
    pub fn title(&self) -> &'static str {
        match self {
            Section::Business => "Business",
            Section::Entertainment => "Entertainment",
            Section::Health => "Health",
            Section::Politics => "Politics",
            Section::Science => "Science",
            Section::Technology => "Technology",
            Section::Uk => "UK",
            Section::World => "World",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Section::ALL
            .iter()
            .copied()
            .find(|section| section.as_str() == wanted)
            .ok_or_else(|| Error::Parse(format!("Unknown section: {}", s)))
    }
}

pub const POSITIVE_THRESHOLD: f64 = 0.05;
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];

    /// Standard compound-score calibration: `>= 0.05` positive, `<= -0.05`
    /// negative, neutral in between.
    pub fn from_score(score: f64) -> Self {
        if score >= POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if score <= NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An article as scraped, before any cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub identifier: String,
    pub url: String,
    pub section: Section,
    pub headline: String,
    pub body: String,
    /// Publish date exactly as found on the page; parsed by the cleaner.
    pub published: String,
    pub fetched_at: DateTime<Utc>,
}

/// One row of the raw metadata table written by the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMetadataRow {
    pub identifier: String,
    /// HTML file location, relative to the project root.
    pub path: String,
    pub section: Section,
    pub url: String,
    pub fetch_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanArticle {
    pub identifier: String,
    pub section: Section,
    pub headline: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
}

impl CleanArticle {
    pub fn published_date(&self) -> NaiveDate {
        self.published_at.date_naive()
    }
}

/// A clean article with headline and body sentiment attached.
///
/// Fields are spelled out rather than flattened so the CSV writer can
/// serialize the row directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredArticle {
    pub identifier: String,
    pub section: Section,
    pub headline: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
    pub headline_sentiment_score: f64,
    pub headline_sentiment_label: SentimentLabel,
    pub body_sentiment_score: f64,
    pub body_sentiment_label: SentimentLabel,
}

impl ScoredArticle {
    pub fn new(article: CleanArticle, headline_score: f64, body_score: f64) -> Self {
        Self {
            identifier: article.identifier,
            section: article.section,
            headline: article.headline,
            body: article.body,
            published_at: article.published_at,
            headline_sentiment_score: headline_score,
            headline_sentiment_label: SentimentLabel::from_score(headline_score),
            body_sentiment_score: body_score,
            body_sentiment_label: SentimentLabel::from_score(body_score),
        }
    }

    pub fn headline_minus_body(&self) -> f64 {
        self.headline_sentiment_score - self.body_sentiment_score
    }

    pub fn published_date(&self) -> NaiveDate {
        self.published_at.date_naive()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub section: Section,
    pub n_articles: usize,
    pub mean_headline: f64,
    pub median_headline: f64,
    pub mean_body: f64,
    pub median_body: f64,
    pub mean_delta: f64,
    pub std_headline: Option<f64>,
    pub std_body: Option<f64>,
}

/// Grouping scope of a time summary row: every section together, or one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TrendScope {
    All,
    Section(Section),
}

impl fmt::Display for TrendScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendScope::All => f.write_str("all"),
            TrendScope::Section(section) => section.fmt(f),
        }
    }
}

impl From<TrendScope> for String {
    fn from(scope: TrendScope) -> Self {
        scope.to_string()
    }
}

impl TryFrom<String> for TrendScope {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case("all") {
            Ok(TrendScope::All)
        } else {
            value.parse().map(TrendScope::Section)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSummary {
    pub date: NaiveDate,
    pub scope: TrendScope,
    pub n_articles: usize,
    pub mean_headline: f64,
    pub mean_body: f64,
    pub mean_delta: f64,
    pub headline_roll7: Option<f64>,
    pub body_roll7: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_thresholds() {
        assert_eq!(SentimentLabel::from_score(0.05), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(0.0499), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(0.0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.0499), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.05), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_score(1.0), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(-1.0), SentimentLabel::Negative);
    }

    #[test]
    fn test_section_parsing() {
        assert_eq!("World".parse::<Section>().unwrap(), Section::World);
        assert_eq!(" technology ".parse::<Section>().unwrap(), Section::Technology);
        assert!("sport".parse::<Section>().is_err());
    }

    #[test]
    fn test_section_order_is_lexical() {
        let mut names: Vec<&str> = Section::ALL.iter().map(|s| s.as_str()).collect();
        names.sort();
        let ordered: Vec<&str> = {
            let mut sections = Section::ALL.to_vec();
            sections.sort();
            sections.iter().map(|s| s.as_str()).collect()
        };
        assert_eq!(names, ordered);
    }

    #[test]
    fn test_trend_scope_round_trips_through_strings() {
        assert_eq!(TrendScope::try_from("all".to_string()).unwrap(), TrendScope::All);
        assert_eq!(
            TrendScope::try_from("business".to_string()).unwrap(),
            TrendScope::Section(Section::Business)
        );
        assert_eq!(String::from(TrendScope::Section(Section::Uk)), "uk");
        assert!(TrendScope::All < TrendScope::Section(Section::Business));
    }

    #[test]
    fn test_scored_article_labels_follow_scores() {
        let clean = CleanArticle {
            identifier: "a1".to_string(),
            section: Section::World,
            headline: "Markets surge".to_string(),
            body: "Investors cheered.".to_string(),
            published_at: Utc::now(),
        };
        let scored = ScoredArticle::new(clean, 0.3, -0.2);
        assert_eq!(scored.headline_sentiment_label, SentimentLabel::Positive);
        assert_eq!(scored.body_sentiment_label, SentimentLabel::Negative);
        assert!((scored.headline_minus_body() - 0.5).abs() < 1e-12);
    }
}
