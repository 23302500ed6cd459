//! The refresh coordinator: timer, single-writer refresh cycle, publishing.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::inventory::{ErrorKind, FetchError, InventorySource, select_and_map};
use crate::station::{StationRecord, StationSnapshot};

use super::state::{Phase, RefreshState, SnapshotReader, UpdateFailed};

/// Capacity of the failure broadcast; slow subscribers lose the oldest.
const FAILURE_CHANNEL_CAPACITY: usize = 16;

/// Result of a refresh cycle that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot with this many stations was published.
    Published { stations: usize },
    /// Another cycle was already in flight; nothing was done.
    Skipped,
}

/// What to do when a refresh is already running.
#[derive(Debug, Clone, Copy)]
enum Overlap {
    Skip,
    Wait,
}

/// Periodically fetches the inventory and publishes the requested stations.
///
/// There is a single writer: at most one refresh cycle runs at a time and
/// only that cycle publishes. Readers (see [`SnapshotReader`]) always get
/// the last complete state without waiting.
pub struct RefreshCoordinator<S> {
    inner: Arc<Inner<S>>,
    task: Mutex<Option<RefreshTask>>,
}

struct Inner<S> {
    source: Arc<S>,
    fetch_timeout: Duration,
    state: watch::Sender<Arc<RefreshState>>,
    failures: broadcast::Sender<UpdateFailed>,
    in_flight: tokio::sync::Mutex<()>,
}

/// The running background loop.
struct RefreshTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl<S: InventorySource> RefreshCoordinator<S> {
    /// Create an idle coordinator with an empty snapshot.
    ///
    /// `fetch_timeout` bounds each fetch-and-map step.
    pub fn new(source: S, fetch_timeout: Duration) -> Self {
        let (state, _) = watch::channel(Arc::new(RefreshState::initial()));
        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                source: Arc::new(source),
                fetch_timeout,
                state,
                failures,
                in_flight: tokio::sync::Mutex::new(()),
            }),
            task: Mutex::new(None),
        }
    }

    /// Refresh once, then keep refreshing every `interval` in the background.
    ///
    /// The first refresh is awaited. If it fails, the error is returned and
    /// no timer is started, so a setup that cannot reach the upstream fails
    /// visibly. Starting an already running coordinator restarts it with the
    /// new interval and stations once that refresh succeeds; on failure the
    /// running timer is left as it was.
    pub async fn start(
        &self,
        interval: Duration,
        stations: HashSet<String>,
    ) -> Result<RefreshOutcome, UpdateFailed> {
        if interval.is_zero() {
            return Err(UpdateFailed::new(
                ErrorKind::Unexpected,
                "refresh interval must be greater than zero",
            ));
        }
        let stations = Arc::new(stations);
        let outcome = self.inner.refresh(&stations, Overlap::Wait).await?;
        self.stop();

        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(
            Arc::clone(&self.inner),
            Arc::clone(&stations),
            interval,
            shutdown_rx,
        ));

        info!(
            interval_secs = interval.as_secs(),
            stations = stations.len(),
            "refresh coordinator started"
        );
        *self.lock_task() = Some(RefreshTask { shutdown, handle });

        Ok(outcome)
    }

    /// Run one refresh cycle now, outside the timer.
    ///
    /// Skipped if a cycle is already in flight. Failures are recorded and
    /// broadcast exactly as for scheduled cycles.
    pub async fn refresh(
        &self,
        stations: &HashSet<String>,
    ) -> Result<RefreshOutcome, UpdateFailed> {
        let stations = Arc::new(stations.clone());
        self.inner.refresh(&stations, Overlap::Skip).await
    }
}

impl<S> RefreshCoordinator<S> {
    /// Stop the background timer. Does nothing if it is not running.
    ///
    /// A refresh in flight is cancelled without publishing.
    pub fn stop(&self) {
        if let Some(task) = self.lock_task().take() {
            let _ = task.shutdown.send(true);
            debug!("refresh coordinator stopping");
        }
    }

    /// Stop the background timer and wait for the loop to exit.
    pub async fn shutdown(&self) {
        let task = self.lock_task().take();
        if let Some(task) = task {
            let _ = task.shutdown.send(true);
            if let Err(e) = task.handle.await {
                warn!("refresh loop ended abnormally: {e}");
            }
            info!("refresh coordinator stopped");
        }
    }

    /// Whether the background timer is running.
    pub fn is_running(&self) -> bool {
        self.lock_task().is_some()
    }

    /// A read handle that can be cloned into other tasks.
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader::new(self.inner.state.subscribe())
    }

    /// The last good snapshot. Never waits for a refresh in flight.
    pub fn snapshot(&self) -> Arc<StationSnapshot> {
        Arc::clone(&self.inner.state.borrow().snapshot)
    }

    /// One station from the last good snapshot, `None` if unknown.
    pub fn station(&self, name: &str) -> Option<StationRecord> {
        self.inner.state.borrow().snapshot.get(name).cloned()
    }

    /// The full published state.
    pub fn state(&self) -> Arc<RefreshState> {
        Arc::clone(&self.inner.state.borrow())
    }

    pub fn last_error(&self) -> Option<UpdateFailed> {
        self.inner.state.borrow().last_error.clone()
    }

    /// Receive every failed cycle from now on.
    pub fn subscribe_failures(&self) -> broadcast::Receiver<UpdateFailed> {
        self.inner.failures.subscribe()
    }

    fn lock_task(&self) -> std::sync::MutexGuard<'_, Option<RefreshTask>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> Drop for RefreshCoordinator<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<S: InventorySource> Inner<S> {
    /// One fetch+map+publish cycle.
    async fn refresh(
        &self,
        stations: &Arc<HashSet<String>>,
        overlap: Overlap,
    ) -> Result<RefreshOutcome, UpdateFailed> {
        let _guard = match overlap {
            Overlap::Wait => self.in_flight.lock().await,
            Overlap::Skip => match self.in_flight.try_lock() {
                Ok(guard) => guard,
                Err(_) => {
                    debug!("refresh already in flight, skipping");
                    return Ok(RefreshOutcome::Skipped);
                }
            },
        };

        let mut phase = PhaseGuard::enter(&self.state);
        let result = self.fetch_snapshot(stations).await;
        phase.disarm();

        match result {
            Ok(snapshot) => {
                let count = snapshot.len();
                self.state
                    .send_replace(Arc::new(RefreshState::succeeded(snapshot)));
                info!(
                    stations = count,
                    requested = stations.len(),
                    "published station snapshot"
                );
                Ok(RefreshOutcome::Published { stations: count })
            }
            Err(failure) => {
                self.state
                    .send_modify(|state| *state = Arc::new(state.failed(failure.clone())));
                warn!(kind = %failure.kind, "station refresh failed: {}", failure.message);
                // No subscribers is fine.
                let _ = self.failures.send(failure.clone());
                Err(failure)
            }
        }
    }

    /// Fetch and map on a separate task, bounded by the fetch timeout.
    async fn fetch_snapshot(
        &self,
        stations: &Arc<HashSet<String>>,
    ) -> Result<StationSnapshot, UpdateFailed> {
        let source = Arc::clone(&self.source);
        let wanted = Arc::clone(stations);
        let mut task = AbortOnDrop(tokio::spawn(async move {
            let raw = source.fetch_inventory().await?;
            Ok::<_, FetchError>(select_and_map(&raw, &wanted))
        }));

        match time::timeout(self.fetch_timeout, &mut task.0).await {
            Ok(Ok(Ok(snapshot))) => Ok(snapshot),
            Ok(Ok(Err(e))) => Err(UpdateFailed::new(e.kind(), e.to_string())),
            Ok(Err(e)) if e.is_panic() => Err(UpdateFailed::new(
                ErrorKind::Unexpected,
                "inventory fetch panicked",
            )),
            Ok(Err(_)) => Err(UpdateFailed::new(
                ErrorKind::Unexpected,
                "inventory fetch was cancelled",
            )),
            Err(_) => Err(UpdateFailed::new(
                ErrorKind::ConnectTimeout,
                format!(
                    "no inventory within the {:?} fetch timeout",
                    self.fetch_timeout
                ),
            )),
        }
    }
}

/// Background loop: wait for a tick, refresh, repeat until shut down.
async fn run<S: InventorySource>(
    inner: Arc<Inner<S>>,
    stations: Arc<HashSet<String>>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    // The first refresh already ran in `start`.
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }
        // Failures are logged, recorded and broadcast by `refresh`.
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = inner.refresh(&stations, Overlap::Skip) => {}
        }
    }
    debug!("refresh loop exited");
}

/// Aborts the spawned fetch if the cycle is dropped or times out.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Publishes `Refreshing` on entry and restores `Idle` if the cycle is
/// cancelled before it publishes its own result.
struct PhaseGuard<'a> {
    state: &'a watch::Sender<Arc<RefreshState>>,
    armed: bool,
}

impl<'a> PhaseGuard<'a> {
    fn enter(state: &'a watch::Sender<Arc<RefreshState>>) -> Self {
        state.send_modify(|s| *s = Arc::new(s.with_phase(Phase::Refreshing)));
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state
                .send_modify(|s| *s = Arc::new(s.with_phase(Phase::Idle)));
        }
    }
}
