//! The five result charts, rendered as SVG.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use ns_core::{Error, Result, ScoredArticle, Section, SectionSummary, SentimentLabel, TimeSummary, TrendScope};
use plotters::prelude::*;

const SIZE: (u32, u32) = (1000, 600);
const FONT: &str = "sans-serif";

const HEADLINE_COLOR: RGBColor = RGBColor(31, 119, 180);
const BODY_COLOR: RGBColor = RGBColor(255, 127, 14);
const POSITIVE_COLOR: RGBColor = RGBColor(44, 160, 44);
const NEUTRAL_COLOR: RGBColor = RGBColor(127, 127, 127);
const NEGATIVE_COLOR: RGBColor = RGBColor(214, 39, 40);

/// Width of one headline-minus-body histogram bin.
pub const DELTA_BIN_WIDTH: f64 = 0.1;

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

fn label_color(label: SentimentLabel) -> RGBColor {
    match label {
        SentimentLabel::Positive => POSITIVE_COLOR,
        SentimentLabel::Neutral => NEUTRAL_COLOR,
        SentimentLabel::Negative => NEGATIVE_COLOR,
    }
}

/// Label for a position on a segmented section axis.
fn segment_label(names: &[&str], value: &SegmentValue<i32>) -> String {
    match value {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| names.get(i))
            .map(|name| name.to_string())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    }
}

/// Corners of a bar between `x0` and `x1` rising (or falling) from zero.
fn bar<X>(x0: X, x1: X, value: f64) -> [(X, f64); 2] {
    [(x0, value.max(0.0)), (x1, value.min(0.0))]
}

fn section_counts(articles: &[ScoredArticle]) -> BTreeMap<Section, usize> {
    let mut counts = BTreeMap::new();
    for article in articles {
        *counts.entry(article.section).or_insert(0) += 1;
    }
    counts
}

/// (a) Number of articles per section.
pub fn articles_per_section(articles: &[ScoredArticle], path: &Path) -> Result<()> {
    let counts = section_counts(articles);
    let names: Vec<&str> = counts.keys().map(Section::title).collect();
    let max = counts.values().copied().max().unwrap_or(0) as f64;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Articles per section", (FONT, 26))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..names.len() as i32).into_segmented(), 0.0..(max * 1.1).max(1.0))
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(names.len())
        .x_label_formatter(&|v| segment_label(&names, v))
        .y_desc("Articles")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(counts.values().enumerate().map(|(i, &count)| {
            let i = i as i32;
            let mut rect = Rectangle::new(
                bar(SegmentValue::Exact(i), SegmentValue::Exact(i + 1), count as f64),
                HEADLINE_COLOR.filled(),
            );
            rect.set_margin(0, 0, 12, 12);
            rect
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// (b) Mean headline and body score per section, side by side.
pub fn headline_vs_body_by_section(summary: &[SectionSummary], path: &Path) -> Result<()> {
    let mut rows: Vec<&SectionSummary> = summary.iter().collect();
    rows.sort_by_key(|row| row.section);
    let names: Vec<&str> = rows.iter().map(|row| row.section.title()).collect();
    let extent = rows
        .iter()
        .flat_map(|row| [row.mean_headline.abs(), row.mean_body.abs()])
        .fold(0.1_f64, f64::max)
        .min(1.0)
        * 1.15;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Mean sentiment per section: headline vs body", (FONT, 26))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..names.len() as i32).into_segmented(), -extent..extent)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(names.len())
        .x_label_formatter(&|v| segment_label(&names, v))
        .y_desc("Mean compound score")
        .draw()
        .map_err(render_err)?;

    let series = [(HEADLINE_COLOR, "Headline", true), (BODY_COLOR, "Body", false)];
    for (color, name, is_headline) in series {
        chart
            .draw_series(rows.iter().enumerate().map(|(i, row)| {
                let i = i as i32;
                let (x0, x1, value) = if is_headline {
                    (SegmentValue::Exact(i), SegmentValue::CenterOf(i), row.mean_headline)
                } else {
                    (SegmentValue::CenterOf(i), SegmentValue::Exact(i + 1), row.mean_body)
                };
                let mut rect = Rectangle::new(bar(x0, x1, value), color.filled());
                rect.set_margin(0, 0, 4, 4);
                rect
            }))
            .map_err(render_err)?
            .label(name)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Bin counts of headline minus body over [-2, 2].
pub fn delta_histogram(articles: &[ScoredArticle]) -> Vec<(f64, usize)> {
    let bins = (4.0 / DELTA_BIN_WIDTH).round() as usize;
    let mut counts = vec![0usize; bins];
    for article in articles {
        let offset = (article.headline_minus_body() + 2.0) / DELTA_BIN_WIDTH;
        let index = (offset.floor().max(0.0) as usize).min(bins - 1);
        counts[index] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, n)| (-2.0 + i as f64 * DELTA_BIN_WIDTH, n))
        .collect()
}

/// (c) Distribution of headline minus body score.
pub fn headline_minus_body_distribution(articles: &[ScoredArticle], path: &Path) -> Result<()> {
    let histogram = delta_histogram(articles);
    let max = histogram.iter().map(|&(_, n)| n).max().unwrap_or(0) as f64;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Headline minus body sentiment", (FONT, 26))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-2.0..2.0, 0.0..(max * 1.1).max(1.0))
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Headline score - body score")
        .y_desc("Articles")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(histogram.iter().filter(|&&(_, n)| n > 0).map(|&(start, n)| {
            let mut rect = Rectangle::new(
                bar(start, start + DELTA_BIN_WIDTH, n as f64),
                HEADLINE_COLOR.mix(0.8).filled(),
            );
            rect.set_margin(0, 0, 1, 1);
            rect
        }))
        .map_err(render_err)?;

    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(0.0, 0.0), (0.0, (max * 1.1).max(1.0))],
            BLACK.stroke_width(1),
        )))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Share of each label among headline and body scores, per section.
pub fn label_shares(articles: &[ScoredArticle]) -> BTreeMap<Section, [[f64; 3]; 2]> {
    let mut counts: BTreeMap<Section, [[usize; 3]; 2]> = BTreeMap::new();
    for article in articles {
        let entry = counts.entry(article.section).or_insert([[0; 3]; 2]);
        for (field, label) in [article.headline_sentiment_label, article.body_sentiment_label]
            .into_iter()
            .enumerate()
        {
            let slot = SentimentLabel::ALL.iter().position(|&l| l == label).unwrap_or(0);
            entry[field][slot] += 1;
        }
    }

    counts
        .into_iter()
        .map(|(section, fields)| {
            let shares = fields.map(|slots| {
                let total = slots.iter().sum::<usize>().max(1) as f64;
                slots.map(|n| n as f64 / total)
            });
            (section, shares)
        })
        .collect()
}

/// (d) Label proportions per section; left bar headline, right bar body.
pub fn label_proportions(articles: &[ScoredArticle], path: &Path) -> Result<()> {
    let shares = label_shares(articles);
    let names: Vec<&str> = shares.keys().map(Section::title).collect();

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Sentiment labels per section (left: headline, right: body)", (FONT, 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..names.len() as i32).into_segmented(), 0.0..1.0)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(names.len())
        .x_label_formatter(&|v| segment_label(&names, v))
        .y_label_formatter(&|v| format!("{:.0}%", v * 100.0))
        .y_desc("Share of articles")
        .draw()
        .map_err(render_err)?;

    for (slot, label) in SentimentLabel::ALL.iter().enumerate() {
        let color = label_color(*label);
        let bars = shares.values().enumerate().flat_map(|(i, fields)| {
            let i = i as i32;
            fields.iter().enumerate().map(move |(field, slots)| {
                let below: f64 = slots[..slot].iter().sum();
                let (x0, x1) = if field == 0 {
                    (SegmentValue::Exact(i), SegmentValue::CenterOf(i))
                } else {
                    (SegmentValue::CenterOf(i), SegmentValue::Exact(i + 1))
                };
                let mut rect = Rectangle::new([(x0, below + slots[slot]), (x1, below)], color.filled());
                rect.set_margin(0, 0, 4, 4);
                rect
            })
        });
        chart
            .draw_series(bars)
            .map_err(render_err)?
            .label(label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// (e) Daily and rolling mean sentiment over all sections.
pub fn rolling_trend(trend: &[TimeSummary], rolling_days: u32, path: &Path) -> Result<()> {
    let rows: Vec<&TimeSummary> = trend.iter().filter(|row| row.scope == TrendScope::All).collect();
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return Err(Error::Render("No overall time summary rows to plot".to_string()));
    };
    let start: NaiveDate = first.date;
    let span = (last.date - start).num_days().max(1);
    let offset = |date: NaiveDate| (date - start).num_days();

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Headline vs body sentiment, {}-day rolling mean", rolling_days),
            (FONT, 26),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0..span, -1.0..1.0)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|d| (start + Duration::days(*d)).format("%Y-%m-%d").to_string())
        .y_desc("Compound score")
        .draw()
        .map_err(render_err)?;

    let series: [(&str, RGBColor, fn(&TimeSummary) -> f64, fn(&TimeSummary) -> Option<f64>); 2] = [
        ("Headline", HEADLINE_COLOR, |r| r.mean_headline, |r| r.headline_roll7),
        ("Body", BODY_COLOR, |r| r.mean_body, |r| r.body_roll7),
    ];
    for (name, color, daily, rolling) in series {
        chart
            .draw_series(LineSeries::new(
                rows.iter().map(|r| (offset(r.date), daily(r))),
                color.mix(0.3).stroke_width(1),
            ))
            .map_err(render_err)?;
        chart
            .draw_series(LineSeries::new(
                rows.iter().filter_map(|r| rolling(r).map(|v| (offset(r.date), v))),
                color.stroke_width(3),
            ))
            .map_err(render_err)?
            .label(format!("{} ({}-day)", name, rolling_days))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(3)));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}
