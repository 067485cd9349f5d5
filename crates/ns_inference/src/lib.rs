pub mod analysis;
pub mod models;

pub use analysis::{AnalysisReport, Analyzer};
pub use models::{create_model, PolarityScores, SentimentModel, VaderModel};
