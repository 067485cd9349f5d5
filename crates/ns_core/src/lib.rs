pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{
    AnalyzerConfig, CleanerConfig, CollectorConfig, DedupStrategy, EventWindow, PipelineConfig,
    SectionSource,
};
pub use error::{require_input, Error, Result};
pub use logging::{init_logging, Logger};
pub use types::{
    Article, CleanArticle, RawMetadataRow, ScoredArticle, Section, SectionSummary, SentimentLabel,
    TimeSummary, TrendScope,
};
