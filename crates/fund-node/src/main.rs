//! Fund Node - treasury API server and liquidation keeper.

use clap::{Parser, Subcommand};
use fund_node::{config::NodeConfig, runner, telemetry};
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "fund-node")]
#[command(about = "Pooled treasury with weighted spending votes")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Config file path
    #[arg(short, long, value_name = "FILE", env = "FUND_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (overrides the config file)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deploy the fund and serve the HTTP API
    Serve {
        /// API listen address
        #[arg(long)]
        addr: Option<std::net::SocketAddr>,

        /// Also run the liquidation keeper
        #[arg(long)]
        keeper: bool,
    },
    /// Run only the liquidation keeper
    Keeper {
        /// Seconds between passes
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Write the default configuration to a file
    InitConfig {
        /// Output path
        #[arg(default_value = "fund.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Command::InitConfig { output } = &args.command {
        NodeConfig::default().to_file(output)?;
        println!("Wrote default configuration to {}", output.display());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => NodeConfig::from_file(path)?,
        None => NodeConfig::default(),
    };

    // Override with CLI args
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }
    match &args.command {
        Command::Serve { addr, keeper } => {
            if let Some(addr) = addr {
                config.api.addr = *addr;
            }
            config.keeper.enabled |= *keeper;
        }
        Command::Keeper { interval } => {
            if let Some(secs) = interval {
                config.keeper.interval_secs = *secs;
            }
        }
        Command::InitConfig { .. } => {}
    }

    config.validate()?;

    let json = config.logging.format == "json";
    match &config.logging.log_file {
        Some(file) => telemetry::init_telemetry_with_file(&config.logging.level, json, file)?,
        None => telemetry::init_telemetry(&config.logging.level, json)?,
    }

    match &args.config {
        Some(path) => info!("Loaded configuration from {:?}", path),
        None => info!("Using default configuration"),
    }
    info!("  Name: {}", config.name);
    info!("  Fund: {}", config.fund.address);
    info!("  Admin: {}", config.fund.admin);
    info!("  Quorum: {}%", config.fund.quorum_percent);

    match args.command {
        Command::Serve { .. } => runner::serve(config).await,
        Command::Keeper { .. } => runner::run_keeper(config).await,
        Command::InitConfig { .. } => Ok(()),
    }
}
