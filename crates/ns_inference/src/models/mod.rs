use std::fmt;
use std::sync::Arc;

use ns_core::{AnalyzerConfig, Error, Result};
use serde::Serialize;

pub mod vader;

pub use vader::VaderModel;

/// Proportions of positive, neutral and negative content plus the
/// normalized compound score in [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PolarityScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

pub trait SentimentModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn polarity_scores(&self, text: &str) -> PolarityScores;

    /// Compound score of `text`; blank text scores 0.0.
    fn compound(&self, text: &str) -> f64 {
        self.polarity_scores(text).compound
    }
}

/// Builds the sentiment model named in the analyzer settings.
pub fn create_model(settings: &AnalyzerConfig) -> Result<Arc<dyn SentimentModel>> {
    match settings.model.trim().to_lowercase().as_str() {
        "vader" => Ok(Arc::new(VaderModel::with_overrides(&settings.lexicon_overrides))),
        other => Err(Error::Inference(format!("Unknown sentiment model: {}", other))),
    }
}
