pub mod cli;
pub mod manager;
pub mod scrapers;

pub use cli::{handle_command, CollectArgs, CollectCommands};
pub use manager::{CollectionReport, Collector};
pub use scrapers::{HttpFetcher, PageFetcher, Scraper};
