use clap::Parser;
use clap::ValueEnum;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

use throttled_client::loggers::debug_logger::DebugLogger;
use throttled_client::observers::throttle_event_observer::ThrottleEventObserver;
use throttled_client::{HttpClientTrait, ThrottleConfig, ThrottledClient};

#[derive(Parser)]
#[command(version, about = "Issue requests against a URL through a throttled client", long_about = None)]
struct Cli {
    url: String,
    #[arg(long, value_enum, default_value = "get")]
    method: Method,
    #[clap(short = 'n', long, default_value = "10")]
    count: usize,
    // Falls back to THROTTLE_CAPACITY, then the library default
    #[clap(short, long)]
    capacity: Option<usize>,
    // Falls back to THROTTLE_PERIOD_MS, then the library default
    #[clap(short, long)]
    period_ms: Option<u64>,
    #[clap(long, action)]
    debug_logging: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Method {
    Get,
    Head,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let default_filter = if cli.debug_logging { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if cli.debug_logging {
        ThrottleEventObserver::add_observer(Arc::new(DebugLogger::new()));
    }

    let mut config = ThrottleConfig::from_env()?;
    if let Some(capacity) = cli.capacity {
        config.capacity = capacity;
    }
    if let Some(period_ms) = cli.period_ms {
        config.period = Duration::from_millis(period_ms);
    }

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    let client = Arc::new(ThrottledClient::from_config(http_client, &config)?);

    let start_time = Instant::now();
    let requests = (0..cli.count).map(|i| {
        let client = Arc::clone(&client);
        let url = cli.url.clone();
        let method = cli.method;
        async move {
            let result = match method {
                Method::Get => client.get(&url).await,
                Method::Head => client.head(&url).await,
            };
            let elapsed_ms = start_time.elapsed().as_millis();
            match result {
                Ok(response) => println!("#{:<4} {} after {}ms", i, response.status(), elapsed_ms),
                Err(err) => eprintln!("#{:<4} failed after {}ms: {}", i, elapsed_ms, err),
            }
        }
    });
    futures::future::join_all(requests).await;

    client.shutdown();
    Ok(())
}
