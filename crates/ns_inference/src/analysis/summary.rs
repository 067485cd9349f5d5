use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use ns_core::{ScoredArticle, Section, SectionSummary, TimeSummary, TrendScope};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation; undefined below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// One row per section, largest sections first.
pub fn section_summary(articles: &[ScoredArticle]) -> Vec<SectionSummary> {
    let mut groups: BTreeMap<Section, Vec<&ScoredArticle>> = BTreeMap::new();
    for article in articles {
        groups.entry(article.section).or_default().push(article);
    }

    let mut rows: Vec<SectionSummary> = groups
        .into_iter()
        .map(|(section, group)| {
            let headline: Vec<f64> = group.iter().map(|a| a.headline_sentiment_score).collect();
            let body: Vec<f64> = group.iter().map(|a| a.body_sentiment_score).collect();
            let delta: Vec<f64> = group.iter().map(|a| a.headline_minus_body()).collect();
            SectionSummary {
                section,
                n_articles: group.len(),
                mean_headline: mean(&headline),
                median_headline: median(&headline),
                mean_body: mean(&body),
                median_body: median(&body),
                mean_delta: mean(&delta),
                std_headline: sample_std(&headline),
                std_body: sample_std(&body),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.n_articles.cmp(&a.n_articles).then(a.section.cmp(&b.section)));
    rows
}

#[derive(Default)]
struct DayBucket {
    headline: Vec<f64>,
    body: Vec<f64>,
}

/// Daily means per scope (all sections, then each section) with a trailing
/// rolling mean over `window_days` calendar days.
///
/// The rolling value averages the daily means observed inside the window
/// and is `None` until at least `min_periods` days have observations.
pub fn time_summary(articles: &[ScoredArticle], window_days: u32, min_periods: usize) -> Vec<TimeSummary> {
    let mut buckets: BTreeMap<(TrendScope, NaiveDate), DayBucket> = BTreeMap::new();
    for article in articles {
        let date = article.published_date();
        for scope in [TrendScope::All, TrendScope::Section(article.section)] {
            let bucket = buckets.entry((scope, date)).or_default();
            bucket.headline.push(article.headline_sentiment_score);
            bucket.body.push(article.body_sentiment_score);
        }
    }

    let mut rows: Vec<TimeSummary> = buckets
        .into_iter()
        .map(|((scope, date), bucket)| {
            let mean_headline = mean(&bucket.headline);
            let mean_body = mean(&bucket.body);
            TimeSummary {
                date,
                scope,
                n_articles: bucket.headline.len(),
                mean_headline,
                mean_body,
                mean_delta: mean_headline - mean_body,
                headline_roll7: None,
                body_roll7: None,
            }
        })
        .collect();

    // Rows are ordered by scope then date, so each scope is a contiguous run.
    let span = Duration::days(i64::from(window_days.max(1)) - 1);
    let mut start = 0;
    while start < rows.len() {
        let scope = rows[start].scope;
        let end = rows[start..]
            .iter()
            .position(|row| row.scope != scope)
            .map_or(rows.len(), |offset| start + offset);

        for i in start..end {
            let first_day = rows[i].date.checked_sub_signed(span).unwrap_or(NaiveDate::MIN);
            let window: Vec<&TimeSummary> = rows[start..=i].iter().filter(|r| r.date >= first_day).collect();
            if window.len() >= min_periods.max(1) {
                let headline: Vec<f64> = window.iter().map(|r| r.mean_headline).collect();
                let body: Vec<f64> = window.iter().map(|r| r.mean_body).collect();
                rows[i].headline_roll7 = Some(mean(&headline));
                rows[i].body_roll7 = Some(mean(&body));
            }
        }
        start = end;
    }

    rows
}
