use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use log::info;

use order_load_test::configure::{self, DEFAULT_CONFIG_PATH};
use order_load_test::{load_test, logger, OrderPairGenerator};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Fires matching buy/sell orders at a place_order endpoint",
    long_about = None
)]
struct Args {
    /// Config file (yaml), optional
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Target place_order URL
    #[arg(long)]
    url: Option<String>,

    /// Worker pool width and orders per round
    #[arg(long)]
    concurrent_requests: Option<usize>,

    /// Number of rounds
    #[arg(long)]
    iterations: Option<usize>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let config = configure::load_config_from(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config))?;
    logger::setup_logger(&config)?;

    let generator = OrderPairGenerator::new(config.generator_settings())?;

    let mut settings = config.load_test_settings();
    if let Some(url) = args.url {
        settings.target_url = url;
    }
    if let Some(n) = args.concurrent_requests {
        settings.concurrent_requests = n;
    }
    if let Some(n) = args.iterations {
        settings.iterations = n;
    }
    if let Some(ms) = args.timeout_ms {
        settings.request_timeout = Some(Duration::from_millis(ms));
    }

    info!(">>> Starting order load test");
    info!(
        ">>> Target: {} ({} concurrent x {} iterations)",
        settings.target_url, settings.concurrent_requests, settings.iterations
    );

    let report = load_test(&generator, &settings).await?;

    if config.print_summary {
        info!(">>> Total Time: {:.2?}", report.elapsed);
        info!(
            ">>> Total Requests: {} (ok {}, rejected {}, errors {})",
            report.totals.sent,
            report.totals.succeeded,
            report.totals.rejected,
            report.totals.errored
        );
        info!(">>> Throughput: {:.2} req/sec", report.throughput());
    }

    Ok(())
}
