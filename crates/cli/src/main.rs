mod args;
mod output;
mod runner;

use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use args::{Cli, Commands};
use runner::{run_scan, ScanConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Scan {
            start,
            end,
            ports,
            iface,
            concurrency,
            knock_delay,
            guard_timeout,
            dest_mac,
            output_format,
        } => {
            let config = ScanConfig {
                start,
                end,
                ports,
                iface,
                concurrency,
                knock_delay: Duration::from_millis(knock_delay),
                guard_timeout: Duration::from_millis(guard_timeout),
                dest_mac,
                output_format,
            };
            run_scan(config).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}
