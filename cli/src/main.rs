//! FleetRate CLI
//!
//! Fetch the USD/BRL rate, convert prices, and exercise the rate cache.

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleetrate_common::now;
use fleetrate_fx::{
    ConversionDirection, ConversionRequest, FxConfig, InMemoryRateStore, PriceConverter,
};

mod burst;

/// FleetRate CLI
#[derive(Parser, Debug)]
#[command(name = "fleetrate")]
#[command(about = "USD/BRL exchange rates for vehicle prices")]
struct Args {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current BRL per USD rate
    Rate,

    /// Convert a single amount
    Convert {
        /// Currency to convert into
        #[arg(long, value_enum)]
        to: Target,

        /// Amount in the other currency
        amount: Decimal,
    },

    /// Fire concurrent lookups at a cold cache and report how many fetches ran
    Burst {
        /// Number of concurrent callers
        #[arg(short, long, default_value = "100")]
        callers: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Usd,
    Brl,
}

impl From<Target> for ConversionDirection {
    fn from(target: Target) -> Self {
        match target {
            Target::Usd => ConversionDirection::BrlToUsd,
            Target::Brl => ConversionDirection::UsdToBrl,
        }
    }
}

fn init_logging(json: bool, default_level: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = FxConfig::from_env();
    init_logging(args.json, &config.log_level);

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    info!(
        primary = %config.primary_url,
        secondary = %config.secondary_url,
        ttl_secs = config.cache_ttl.num_seconds(),
        "Starting FleetRate"
    );

    let converter = PriceConverter::from_config(&config, Some(Arc::new(InMemoryRateStore::new())))?;

    match args.command {
        Command::Rate => {
            let snapshot = converter.current_rate().await?;
            println!(
                "1 USD = {} BRL (fetched {}, {}s ago)",
                snapshot.rate,
                snapshot.fetched_at,
                snapshot.age(now()).num_seconds()
            );
        }
        Command::Convert { to, amount } => {
            let conversion = converter
                .convert(ConversionRequest::new(amount, to.into()))
                .await?;
            println!("{} = {}", conversion.input, conversion.output);
            println!("{}", serde_json::to_string_pretty(&conversion)?);
        }
        Command::Burst { callers } => {
            let report = burst::run(&converter, callers).await;
            report.print();
        }
    }

    Ok(())
}
