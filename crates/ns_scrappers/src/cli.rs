use clap::{Args, Subcommand};
use ns_core::{Error, Logger, PipelineConfig, Result, Section};

use crate::manager::{CollectionReport, Collector};
use crate::scrapers::bbc::is_article_url;

#[derive(Args, Debug, Clone, Default)]
pub struct CollectArgs {
    #[command(subcommand)]
    pub command: Option<CollectCommands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CollectCommands {
    /// Scrape every configured section (the default)
    Sections,
    /// List the configured section listing pages
    List,
    /// Scrape a single article URL into the raw data directory
    Url {
        /// Section the article is filed under (e.g. world)
        section: String,
        url: String,
    },
}

pub async fn handle_command(args: CollectArgs, config: PipelineConfig) -> Result<CollectionReport> {
    match args.command.unwrap_or(CollectCommands::Sections) {
        CollectCommands::Sections => Collector::from_config(config)?.run().await,
        CollectCommands::List => {
            println!("Configured sections:");
            for source in &config.collector.sections {
                println!("  {:<12} {}", source.section, source.url);
            }
            Ok(CollectionReport::default())
        }
        CollectCommands::Url { section, url } => {
            let section: Section = section.parse()?;
            if !is_article_url(&url, config.collector.base_url.trim_end_matches('/')) {
                return Err(Error::Scraping(format!("Not a BBC article URL: {}", url)));
            }
            let collector = Collector::from_config(config)?;
            let logger = Logger::new().with_prefix("[collect]".to_string());
            let collected = collector.collect_url(section, &url, &logger).await?;
            Ok(CollectionReport {
                per_section: vec![(section, usize::from(collected.is_some()))],
            })
        }
    }
}
