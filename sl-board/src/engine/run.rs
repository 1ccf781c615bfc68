//! The tick driver.

use std::future::Future;
use std::time::Duration;

use chrono::Local;
use tokio::signal;
use tokio::time::{self, MissedTickBehavior};

use crate::fetch::FetchStatus;
use crate::sl::DepartureFeed;

use super::{Engine, SiteReport, SiteTick};

/// Tick the engine every `tick_interval` until Ctrl+C.
pub async fn run<F: DepartureFeed>(engine: &mut Engine<F>, tick_interval: Duration) {
    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Cannot listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };
    run_until(engine, tick_interval, shutdown).await;
}

/// Tick the engine every `tick_interval` until `shutdown` completes.
///
/// The first tick happens immediately. A slow tick delays the next one
/// rather than bunching ticks up.
pub async fn run_until<F, S>(engine: &mut Engine<F>, tick_interval: Duration, shutdown: S)
where
    F: DepartureFeed,
    S: Future<Output = ()>,
{
    let mut interval = time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    tracing::info!(
        sites = engine.site_count(),
        "Board refresh started (interval: {}s)",
        tick_interval.as_secs()
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let reports = engine.tick(Local::now()).await;
                log_summary(&reports);
            }

            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received. Stopping board refresh.");
                break;
            }
        }
    }

    tracing::info!("Board refresh stopped cleanly");
}

fn log_summary(reports: &[SiteReport]) {
    let mut fresh = 0;
    let mut throttled = 0;
    let mut failed = 0;
    let mut skipped = 0;

    for report in reports {
        match &report.tick {
            SiteTick::Fetched { status, .. } => match status {
                FetchStatus::Fresh => fresh += 1,
                FetchStatus::Throttled => throttled += 1,
                FetchStatus::Failed(_) => failed += 1,
            },
            SiteTick::Disabled | SiteTick::GateUnavailable => skipped += 1,
        }
    }

    tracing::debug!(fresh, throttled, failed, skipped, "tick complete");
}
