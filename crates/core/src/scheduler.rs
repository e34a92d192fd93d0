//! Background refresh loops (native only).
//!
//! Three independent periodic tasks drive the tracker while a frontend
//! holds it behind a shared lock: price refresh every 5 minutes, the
//! interest check hourly, and exchange rates every 4 hours. Each tick
//! locks the tracker only for the duration of its own step, so the UI
//! never starves behind a slow network call from another loop.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::MoneyTrack;

/// How often live prices are refreshed.
pub const PRICE_REFRESH_INTERVAL: Duration = Duration::from_secs(300);
/// How often the monthly-interest gate is checked. The gate itself is
/// idempotent, so hourly is purely about crediting promptly after a
/// month rolls over.
pub const INTEREST_CHECK_INTERVAL: Duration = Duration::from_secs(3600);
/// How often the exchange-rate snapshot is considered for refresh.
pub const RATE_REFRESH_INTERVAL: Duration = Duration::from_secs(4 * 3600);

/// Handle to the running background loops. Dropping it does not stop
/// them; call `shutdown` for an orderly stop.
pub struct Scheduler {
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn the three refresh loops on the current tokio runtime.
    pub fn start(tracker: Arc<Mutex<MoneyTrack>>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handles = vec![
            spawn_loop(
                "price-refresh",
                PRICE_REFRESH_INTERVAL,
                tracker.clone(),
                shutdown_rx.clone(),
                |tracker| async move {
                    let updated = tracker.lock().await.refresh_prices().await;
                    debug!("Price refresh tick: {updated} positions updated");
                },
            ),
            spawn_loop(
                "interest-check",
                INTEREST_CHECK_INTERVAL,
                tracker.clone(),
                shutdown_rx.clone(),
                |tracker| async move {
                    match tracker.lock().await.process_interest() {
                        Ok(receipts) if !receipts.is_empty() => {
                            info!("Credited interest on {} positions", receipts.len());
                        }
                        Ok(_) => {}
                        Err(e) => warn!("Interest check failed: {e}"),
                    }
                },
            ),
            spawn_loop(
                "rate-refresh",
                RATE_REFRESH_INTERVAL,
                tracker,
                shutdown_rx,
                |tracker| async move {
                    if tracker.lock().await.refresh_exchange_rates().await {
                        debug!("Exchange rates refreshed");
                    }
                },
            ),
        ];

        Self {
            shutdown_tx,
            handles,
        }
    }

    /// Signal every loop to stop and wait for them to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

fn spawn_loop<F, Fut>(
    name: &'static str,
    interval: Duration,
    tracker: Arc<Mutex<MoneyTrack>>,
    mut shutdown_rx: watch::Receiver<bool>,
    tick: F,
) -> JoinHandle<()>
where
    F: Fn(Arc<Mutex<MoneyTrack>>) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        // First tick runs immediately so a fresh launch is not stale for
        // a whole interval.
        let mut timer = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = timer.tick() => {
                    tick(tracker.clone()).await;
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        debug!("Background loop '{name}' shutting down");
                        return;
                    }
                }
            }
        }
    })
}
