use clap::Parser;
use ns_cli::{run, Cli};
use ns_core::init_logging;
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.pipeline_config() {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("❌ {}", e);
        std::process::exit(1);
    }
}
