//! History Engine Binary
//!
//! Runs one history query through the configured data vendor and prints
//! the resulting bars as JSON lines.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin history-engine -- 000001.SZSE d 2020-01-01 2020-01-10
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `JQDATA_USERNAME` / `JQDATA_PASSWORD` (JQData) or `TUSHARE_TOKEN` (Tushare)
//!
//! ## Optional
//! - `HISTORY_VENDOR`: jqdata | tushare (default: jqdata)
//! - `HISTORY_WORKERS`: Worker pool size (default: 4)
//! - `HISTORY_QUEUE_CAPACITY`: Pending query limit (default: 256)
//! - `HISTORY_VENDOR_TIMEOUT_SECS`: Vendor HTTP timeout (default: 30)
//! - `HISTORY_METRICS_PORT`: Prometheus metrics port (default: disabled)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: true)
//! - `RUST_LOG`: Log level (default: info)

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use history_engine::{
    ContractData, HistoryConfig, HistoryEngine, InMemoryContractDirectory, Interval,
    NoGatewayHistory, init_metrics, init_telemetry, split_instrument_id,
};
use tokio::sync::broadcast::error::RecvError;

const USAGE: &str = "usage: history-engine <symbol.EXCHANGE> <interval> <start> <end>";

/// Upper bound on how long one query may take end to end.
const RESULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Parsed command line.
struct QueryArgs {
    instrument_id: String,
    interval: Interval,
    start: NaiveDate,
    end: NaiveDate,
}

impl QueryArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let (Some(instrument_id), Some(interval), Some(start), Some(end), None) =
            (args.next(), args.next(), args.next(), args.next(), args.next())
        else {
            bail!(USAGE);
        };

        split_instrument_id(&instrument_id)?;
        let interval = Interval::from_str(&interval)?;
        let start = parse_date(&start)?;
        let end = parse_date(&end)?;
        if end < start {
            bail!("end date {end} is before start date {start}");
        }

        Ok(Self {
            instrument_id,
            interval,
            start,
            end,
        })
    }
}

fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let _telemetry_guard = init_telemetry();

    let args = QueryArgs::parse(std::env::args().skip(1))?;
    let config = HistoryConfig::from_env()?;
    log_config(&config);

    let _metrics_handle = init_metrics(config.server.metrics_port())?;

    let (symbol, exchange) = split_instrument_id(&args.instrument_id)?;
    let contracts = Arc::new(InMemoryContractDirectory::with_contracts([ContractData::new(
        symbol, exchange, "CLI", false,
    )]));

    let engine = HistoryEngine::build(&config, contracts, Arc::new(NoGatewayHistory))?;
    let mut results = engine.events.subscribe();

    let request_id =
        engine
            .dispatcher
            .query_history(&args.instrument_id, args.interval, args.start, args.end);
    tracing::info!(%request_id, instrument_id = %args.instrument_id, "Query dispatched");

    let event = tokio::time::timeout(RESULT_TIMEOUT, async {
        loop {
            match results.recv().await {
                Ok(event) if event.request_id == request_id => return Ok(event),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Result receiver lagged");
                }
                Err(RecvError::Closed) => bail!("result channel closed"),
            }
        }
    })
    .await
    .context("timed out waiting for history result")??;

    engine.dispatcher.shutdown().await;

    let bars = event.outcome?;
    tracing::info!(bars = bars.len(), "Query complete");
    for bar in &bars {
        println!("{}", serde_json::to_string(bar)?);
    }

    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &HistoryConfig) {
    tracing::info!(
        vendor = %config.vendor.vendor,
        workers = config.dispatcher.workers,
        queue_capacity = config.dispatcher.queue_capacity,
        metrics_port = ?config.server.metrics_port(),
        "Configuration loaded"
    );
}

/// Load .env file from current directory, falling back to ancestors.
fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        load_dotenv_from_ancestors();
    }
}

/// Load .env file from any ancestor directory.
fn load_dotenv_from_ancestors() {
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
