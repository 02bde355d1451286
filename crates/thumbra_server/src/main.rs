use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use thumbra_server::{ObservabilityConfig, ThumbraConfig, init_observability, run};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "thumbra", version, about = "Thumbra media and thumbnail server", long_about = None)]
struct Args {
    /// TOML configuration file layered over the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ThumbraConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config = config.with_port(port);
    }

    let level = if args.verbose {
        "debug".to_string()
    } else {
        config.logging().level().clone()
    };
    init_observability(
        &ObservabilityConfig::default()
            .with_log_level(level)
            .with_json_logs(args.json_logs || *config.logging().json()),
    )?;

    info!(
        backend = %config.storage().backend(),
        port = config.server().port(),
        "Starting Thumbra"
    );

    run(config).await?;
    Ok(())
}
