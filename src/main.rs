use clap::Parser;
use tracing_subscriber::EnvFilter;

use slidesmith::cli::{Cli, run_command};
use slidesmith::config::{self, Config, ToolSettings};
use slidesmith::google::GoogleServices;
use slidesmith::tools::ToolRegistry;
use slidesmith::tools::slides::register_slides_tools;

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("slidesmith=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config::log_json()? {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();
    init_tracing()?;

    let config = Config::resolve()?;
    let services = GoogleServices::from_config(&config)?;
    let registry = ToolRegistry::new();
    register_slides_tools(&registry, services, ToolSettings::from(&config)).await;

    if let Err(e) = run_command(cli.command, &registry).await {
        tracing::debug!("Command failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
