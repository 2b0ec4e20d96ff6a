//! Periodic stats reporter.
//!
//! Logs inventory counters on a fixed interval. It only takes the ledger lock
//! to read, so it never races a save.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::gateway::PersistenceGateway;
use crate::service::LedgerService;

/// Handle to stop the reporter and wait for it to exit.
pub struct ReporterHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ReporterHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.join.await {
            warn!(error = %e, "stats reporter ended abnormally");
        }
    }
}

pub fn spawn_stats_reporter<G>(service: Arc<LedgerService<G>>, every: Duration) -> ReporterHandle
where
    G: PersistenceGateway + 'static,
{
    let (shutdown, mut stop) = watch::channel(false);

    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let (stats, alerts) = service
                        .read(|l| (l.stats(), l.low_stock_alerts().len()))
                        .await;
                    info!(
                        products = stats.total_products,
                        total_stock = stats.total_stock,
                        low_stock = stats.low_stock,
                        out_of_stock = stats.out_of_stock,
                        movements = stats.total_movements,
                        alerts,
                        "inventory stats"
                    );
                }
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }
    });

    ReporterHandle { shutdown, join }
}
