//! Connectivity monitoring.
//!
//! The [`ConnectivityMonitor`] turns offline→online transitions into sync
//! passes. Hosts feed it from whatever reachability signal they have; the
//! [`ReachabilityProbe`] provides one by polling the reporting endpoint.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::sync::{HttpReportDelivery, ReportDelivery, SyncEngine};

/// Network reachability as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    pub const fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Online => "Connected",
            Self::Offline => "Offline Mode",
        }
    }
}

/// Triggers exactly one sync pass per offline→online transition.
///
/// Repeated `Online` signals without an intervening `Offline` are ignored,
/// and going offline takes no action on the queue. The monitor stops when
/// every signal sender has been dropped.
pub struct ConnectivityMonitor {
    handle: JoinHandle<()>,
    triggers: Arc<AtomicUsize>,
}

impl ConnectivityMonitor {
    /// Start watching `signals`. `initial` is the state the host last
    /// acted on; a signal source that already moved past it before the
    /// task runs still counts as a transition.
    pub fn spawn<D: ReportDelivery>(
        engine: Arc<SyncEngine<D>>,
        mut signals: watch::Receiver<Connectivity>,
        initial: Connectivity,
    ) -> Self {
        let triggers = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&triggers);

        let handle = tokio::spawn(async move {
            tracing::debug!(?initial, "Connectivity monitor started");
            let mut last = initial;
            let mut current = *signals.borrow_and_update();

            loop {
                if last == Connectivity::Offline && current == Connectivity::Online {
                    counter.fetch_add(1, Ordering::Relaxed);
                    tracing::info!("Connection restored; syncing queued reports");
                    spawn_sync(Arc::clone(&engine));
                } else if current != last {
                    tracing::info!("Connection lost; reports will stay queued");
                }
                last = current;

                if signals.changed().await.is_err() {
                    break;
                }
                current = *signals.borrow_and_update();
            }

            tracing::debug!("Connectivity monitor stopped");
        });

        Self { handle, triggers }
    }

    /// Number of sync passes triggered so far.
    pub fn trigger_count(&self) -> usize {
        self.triggers.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the monitor to stop (after its signal source closes).
    pub async fn join(self) {
        if let Err(error) = self.handle.await {
            tracing::error!("Connectivity monitor task failed: {error}");
        }
    }

    pub fn abort(&self) {
        self.handle.abort();
    }
}

fn spawn_sync<D: ReportDelivery>(engine: Arc<SyncEngine<D>>) {
    tokio::spawn(async move {
        match engine.sync_pending().await {
            Ok(delivered) => tracing::info!(delivered, "Background sync finished"),
            Err(error) => tracing::error!("Background sync failed: {error}"),
        }
    });
}

/// Something that can tell whether the reporting endpoint is reachable.
pub trait ReachabilityCheck: Send + Sync + 'static {
    fn is_reachable(&self) -> impl Future<Output = bool> + Send;
}

impl ReachabilityCheck for HttpReportDelivery {
    async fn is_reachable(&self) -> bool {
        self.probe().await
    }
}

/// Polls a [`ReachabilityCheck`] and publishes changes as connectivity
/// signals. Unchanged results are not re-published.
pub struct ReachabilityProbe {
    handle: JoinHandle<()>,
}

impl ReachabilityProbe {
    /// Start polling. The returned receiver starts at `initial`; the probe
    /// stops once every receiver has been dropped.
    pub fn spawn<C: ReachabilityCheck>(
        check: C,
        interval: Duration,
        initial: Connectivity,
    ) -> (Self, watch::Receiver<Connectivity>) {
        let (sender, receiver) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = sender.closed() => break,
                    _ = ticker.tick() => {}
                }

                let observed = if check.is_reachable().await {
                    Connectivity::Online
                } else {
                    Connectivity::Offline
                };
                sender.send_if_modified(|current| {
                    if *current == observed {
                        false
                    } else {
                        tracing::debug!(?observed, "Reachability changed");
                        *current = observed;
                        true
                    }
                });
            }
        });

        (Self { handle }, receiver)
    }

    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Drop for ReachabilityProbe {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
