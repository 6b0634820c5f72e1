//! Periodic job-status reconciliation.
//!
//! One task per tracker fetches the server status of every pollable job,
//! waits for all fetches to settle, and merges the successes into the store
//! as a single write. While nothing is pollable the task parks on store
//! change notifications instead of ticking.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use log::{debug, error, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::Instrument;

use crate::api::JobApi;
use crate::job::{JobPatch, JobStore};

/// What one polling tick did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Jobs a status fetch was issued for.
    pub polled: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Whether the merge wrote to the store.
    pub changed: bool,
}

/// Reconciles pollable jobs against the server.
#[derive(Clone)]
pub struct StatusPoller {
    store: Arc<JobStore>,
    api: Arc<dyn JobApi>,
    interval: Duration,
}

impl StatusPoller {
    /// Creates a new poller.
    pub fn new(store: Arc<JobStore>, api: Arc<dyn JobApi>, interval: Duration) -> Self {
        Self {
            store,
            api,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs one reconciliation pass.
    ///
    /// The pollable set is read fresh. Every fetch settles before the merge,
    /// a failed fetch leaves its job untouched, and a merge that changes
    /// nothing does not write.
    pub async fn tick(&self) -> TickReport {
        let ids = self.store.eligible_ids();
        if ids.is_empty() {
            return TickReport::default();
        }

        let span = tracing::info_span!("poller.tick", jobs = ids.len());
        let results = join_all(ids.iter().map(|&id| {
            let api = Arc::clone(&self.api);
            async move { (id, api.fetch_job(id).await) }
        }))
        .instrument(span)
        .await;

        let mut report = TickReport {
            polled: ids.len(),
            ..TickReport::default()
        };
        let mut patches: HashMap<u64, JobPatch> = HashMap::with_capacity(results.len());
        for (id, result) in results {
            match result {
                Ok(resp) => {
                    report.succeeded += 1;
                    patches.insert(id, JobPatch::from(resp));
                }
                Err(e) if e.is_retryable() => {
                    report.failed += 1;
                    debug!("Status check for job {} failed, will retry: {}", id, e);
                }
                Err(e) => {
                    report.failed += 1;
                    warn!("Status check for job {} failed: {}", id, e);
                }
            }
        }

        report.changed = self.store.merge_batch(&patches);
        if report.changed {
            debug!(
                "Poll tick: {} polled, {} ok, {} failed, store updated",
                report.polled, report.succeeded, report.failed
            );
        }
        report
    }

    /// Starts the polling loop on the current Tokio runtime.
    ///
    /// The first tick runs as soon as a pollable job exists, then every
    /// `interval` while any remain. Dropping the handle stops the loop.
    pub fn start(self) -> PollerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (trigger_tx, trigger_rx) = mpsc::channel(1);
        let task = tokio::spawn(self.run(shutdown_rx, trigger_rx));

        PollerHandle {
            shutdown: shutdown_tx,
            trigger: trigger_tx,
            task: Some(task),
        }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>, mut trigger: mpsc::Receiver<()>) {
        let mut changes = self.store.subscribe();

        loop {
            // Park until something is pollable.
            loop {
                let _ = changes.borrow_and_update();
                if self.store.has_eligible() {
                    break;
                }
                tokio::select! {
                    biased;
                    _ = shutdown.changed() => return,
                    res = changes.changed() => {
                        if res.is_err() {
                            return;
                        }
                    }
                }
            }

            // The first tick below already covers refreshes requested while parked.
            while trigger.try_recv().is_ok() {}

            debug!("Pollable jobs present, polling every {:?}", self.interval);
            let mut timer = tokio::time::interval(self.interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut polled: HashSet<u64> = HashSet::new();

            loop {
                let newly_eligible = tokio::select! {
                    biased;
                    _ = shutdown.changed() => return,
                    _ = timer.tick() => false,
                    Some(()) = trigger.recv() => {
                        info!("Manual status poll triggered");
                        false
                    },
                    res = changes.changed() => {
                        if res.is_err() {
                            return;
                        }
                        let fresh = self
                            .store
                            .eligible_ids()
                            .into_iter()
                            .any(|id| !polled.contains(&id));
                        if !fresh {
                            continue;
                        }
                        true
                    }
                };

                if newly_eligible {
                    debug!("New pollable job, polling now");
                    timer.reset();
                }
                polled = self.store.eligible_ids().into_iter().collect();

                tokio::select! {
                    biased;
                    _ = shutdown.changed() => return,
                    _ = self.tick() => {},
                }

                if !self.store.has_eligible() {
                    debug!("No pollable jobs left, pausing poller");
                    break;
                }
            }
        }
    }
}

/// Handle to a running poller task.
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    trigger: mpsc::Sender<()>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Requests an immediate tick. Coalesces with an already pending request.
    /// A request made while nothing is pollable is absorbed by the first tick
    /// once a job becomes pollable.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Returns true once the polling task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    /// Signals the loop to stop and waits for it to exit.
    pub async fn stop(mut self) {
        self.shutdown.send_replace(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    error!("Status poller task panicked: {}", e);
                }
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
