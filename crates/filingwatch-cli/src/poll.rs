//! The polling loop around [`ResolutionEngine`].

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use anyhow::anyhow;
use filingwatch_core::{ProviderError, ResolutionEngine};
use tracing::{error, info, warn};

use crate::display::write_record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub once: bool,
    pub json_only: bool,
    pub fail_fast_on_auth: bool,
}

/// Run cycles until `shutdown` completes (or once, with `--once`).
///
/// A cycle in flight always runs to completion; shutdown is honoured
/// before a cycle starts and during the sleep. Cycle errors and failed
/// record writes are logged and the loop carries on. With `once`, either is
/// returned; with `fail_fast_on_auth`, auth errors are too.
pub async fn run(
    engine: &mut ResolutionEngine,
    options: &PollOptions,
    out: &mut dyn Write,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    tokio::pin!(shutdown);
    let mut cycle: u64 = 0;

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!(cycle, "shutdown requested, stopping");
                return Ok(());
            }
            _ = std::future::ready(()) => {}
        }

        cycle += 1;
        let result = engine.check_once().await;

        match result {
            Ok(outcome) => {
                info!(cycle, provider = engine.provider_name(), status = outcome.status(), "{outcome}");
                if let Some(record) = outcome.record()
                    && let Err(err) = write_record(out, record, options.json_only)
                {
                    error!(cycle, filing_id = %record.filing.filing_id, error = %err, "writing resolution record failed");
                    if options.once {
                        return Err(err.context(format!("cycle {cycle} failed")));
                    }
                }
            }
            Err(err) => {
                log_cycle_error(cycle, &err);
                if options.once || (err.is_auth() && options.fail_fast_on_auth) {
                    return Err(anyhow!(err).context(format!("cycle {cycle} failed")));
                }
            }
        }

        if options.once {
            return Ok(());
        }

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!(cycle, "shutdown requested, stopping");
                return Ok(());
            }
            _ = tokio::time::sleep(options.interval) => {}
        }
    }
}

fn log_cycle_error(cycle: u64, err: &ProviderError) {
    if err.is_auth() {
        error!(cycle, retryable = false, error = %err, "cycle failed");
    } else {
        warn!(cycle, retryable = err.is_retryable(), error = %err, "cycle failed");
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Shutdown signal received (SIGINT/Ctrl+C)"),
                    _ = sigterm.recv() => info!("Shutdown signal received (SIGTERM)"),
                }
            }
            Err(err) => {
                warn!(error = %err, "SIGTERM handler unavailable, listening for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutdown signal received (SIGINT/Ctrl+C)");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received (SIGINT/Ctrl+C)");
    }
}
