//! Fraud analyzer binary
//!
//! Reads one JSON transaction per line from stdin and writes one JSON result
//! per line to stdout. Usage: `fraud-analyzer [config.toml]`.

use fraud_engine::{Config, EngineMetrics, Error, FraudEngine, Transaction};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    init_tracing(&config);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        "Starting fraud analyzer"
    );

    let engine = FraudEngine::from_config(&config).with_metrics(EngineMetrics::new()?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Transaction>(&line) {
            Ok(transaction) => match engine.analyze(transaction) {
                Ok(result) => serde_json::to_value(&result)?,
                Err(Error::Validation(e)) => json!({
                    "error": "VALIDATION_ERROR",
                    "field": e.field,
                    "message": e.message,
                }),
                Err(e) => return Err(e.into()),
            },
            Err(e) => {
                tracing::warn!("Invalid request body: {}", e);
                json!({
                    "error": "INVALID_REQUEST",
                    "message": e.to_string(),
                })
            }
        };

        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
    }
    stdout.flush().await?;

    if let Some(metrics) = engine.metrics() {
        tracing::debug!("Final metrics:\n{}", metrics.gather_text());
    }
    tracing::info!(
        accounts = engine.store().tracked_accounts(),
        "Input exhausted, shutting down"
    );
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log.level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
