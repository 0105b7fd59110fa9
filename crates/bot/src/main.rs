use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use trend_sentinel::config;
use trend_sentinel::core::clock::SystemClock;
use trend_sentinel::core::scanner::{run_supervised, Scanner};
use trend_sentinel::exchange::bybit::BybitClient;
use trend_sentinel::logging;
use trend_sentinel::notify;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignore if missing).
    let _ = dotenvy::dotenv();

    let config_dir = std::env::var("SENTINEL_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    let config = config::load_config(&config_dir)?;

    // Hold the guard for the process lifetime.
    let _guard = logging::init_tracing(&config.app.logging)?;

    info!(
        exchange = %config.exchange.base_url,
        category = %config.exchange.category,
        min_volume = %config.scanner.min_quote_volume_usdt,
        max_symbols = ?config.scanner.max_symbols,
        "trend sentinel starting"
    );

    // -----------------------------------------------------------------------
    // Collaborators
    // -----------------------------------------------------------------------

    let gateway = Arc::new(
        BybitClient::new(config.exchange.clone()).context("failed to build Bybit client")?,
    );
    let notifier = notify::build_notifier(&config.notifier);
    let shutdown = CancellationToken::new();

    let scanner = Scanner::new(
        gateway,
        notifier.clone(),
        Arc::new(SystemClock),
        config.scanner.clone(),
        config.strategy.clone(),
        shutdown.clone(),
    );

    let mut scan_handle = tokio::spawn(run_supervised(scanner, notifier));

    info!("scanner running, press Ctrl+C to shutdown");

    // -----------------------------------------------------------------------
    // Wait for shutdown signal or loop termination
    // -----------------------------------------------------------------------

    let finished = tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res.context("failed to listen for Ctrl+C")?;
            None
        }
        res = &mut scan_handle => Some(res),
    };

    let outcome = match finished {
        Some(res) => res,
        None => {
            info!("shutdown signal received, stopping gracefully...");
            shutdown.cancel();
            scan_handle.await
        }
    };

    match outcome {
        Ok(Ok(())) => {
            info!("shutdown complete");
            Ok(())
        }
        Ok(Err(e)) => {
            error!(error = %e, "trend sentinel stopped on error");
            Err(e)
        }
        Err(e) => {
            error!(error = %e, "supervisor task panicked");
            Err(e).context("supervisor task panicked")
        }
    }
}
