use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ns_cleaner::Cleaner;
use ns_core::{PipelineConfig, Result};
use ns_inference::Analyzer;
use ns_plots::Visualizer;
use ns_scrappers::{handle_command, CollectArgs};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "BBC News headline vs body sentiment pipeline", long_about = None)]
pub struct Cli {
    /// Project root; data/ and results/ live under it
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,
    /// JSON file overriding the default configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Scrape the configured BBC sections into data/raw
    Collect(CollectArgs),
    /// Parse, filter and deduplicate the raw articles
    Clean,
    /// Score sentiment and write the summary tables
    Analyze,
    /// Render the charts into results/
    Visualize,
    /// Run every stage in order
    All {
        /// Reuse the raw data already on disk
        #[arg(long)]
        skip_collect: bool,
    },
}

impl Cli {
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        PipelineConfig::load(self.root.clone(), self.config.as_deref())
    }
}

pub async fn run(command: Commands, config: PipelineConfig) -> Result<()> {
    match command {
        Commands::Collect(args) => {
            handle_command(args, config).await?;
        }
        Commands::Clean => {
            Cleaner::new(config).run()?;
        }
        Commands::Analyze => {
            Analyzer::new(config)?.run()?;
        }
        Commands::Visualize => {
            Visualizer::new(config).run()?;
        }
        Commands::All { skip_collect } => {
            if !skip_collect {
                info!("▶️ collect");
                handle_command(CollectArgs::default(), config.clone()).await?;
            }
            info!("▶️ clean");
            Cleaner::new(config.clone()).run()?;
            info!("▶️ analyze");
            Analyzer::new(config.clone())?.run()?;
            info!("▶️ visualize");
            Visualizer::new(config).run()?;
        }
    }
    Ok(())
}
