use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::config::MonitorConfig;
use crate::fetch::Fetcher;
use crate::monitor::error::SchedulerError;
use crate::monitor::fanout::run_cycle;
use crate::monitor::snapshot::SnapshotStore;
use crate::monitor::state::{CycleResult, MonitorState};

/// Runs a probe cycle every `config.interval` and publishes each completed
/// cycle to a [`SnapshotStore`].
///
/// Cycles never overlap: one that overruns the interval delays the next.
/// The first cycle fires one interval after [`Monitor::start`].
pub struct Monitor {
    config: Arc<MonitorConfig>,
    fetcher: Arc<dyn Fetcher>,
    snapshots: SnapshotStore,
    state: Arc<RwLock<MonitorState>>,
    cycles_completed: Arc<AtomicU64>,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
    created_at: chrono::DateTime<Utc>,
}

impl Monitor {
    pub fn new(config: MonitorConfig, fetcher: Arc<dyn Fetcher>, snapshots: SnapshotStore) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config: Arc::new(config),
            fetcher,
            snapshots,
            state: Arc::new(RwLock::new(MonitorState::Idle)),
            cycles_completed: Arc::new(AtomicU64::new(0)),
            shutdown,
            task: Mutex::new(None),
            created_at: Utc::now(),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn created_at(&self) -> chrono::DateTime<Utc> {
        self.created_at
    }

    pub async fn state(&self) -> MonitorState {
        *self.state.read().await
    }

    /// Number of cycles published since the monitor was created.
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed.load(Ordering::Relaxed)
    }

    pub async fn start(&self) -> Result<(), SchedulerError> {
        if self.config.interval.is_zero() {
            return Err(SchedulerError::ZeroInterval);
        }

        // held until the task handle is stored; stop() must find it
        let mut state = self.state.write().await;
        if !state.can_transition_to(MonitorState::Running) {
            return Err(SchedulerError::InvalidState(*state));
        }
        *state = MonitorState::Running;

        info!(
            interval_secs = self.config.interval.as_secs(),
            sites = self.config.sites.len(),
            concurrency = self.config.max_concurrent_probes,
            "Starting monitor"
        );

        let config = Arc::clone(&self.config);
        let fetcher = Arc::clone(&self.fetcher);
        let snapshots = self.snapshots.clone();
        let cycles = Arc::clone(&self.cycles_completed);
        let mut shutdown = self.shutdown.subscribe();

        let handle = tokio::spawn(async move {
            let period = config.interval;
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                if *shutdown.borrow_and_update() {
                    break;
                }
                tokio::select! {
                    biased;
                    _ = shutdown.changed() => break,
                    _ = ticker.tick() => {}
                }

                let cycle = run_cycle(&config, fetcher.as_ref()).await;
                snapshots.publish(cycle).await;
                cycles.fetch_add(1, Ordering::Relaxed);
            }

            info!("Monitor loop exited");
        });

        *self.task.lock().await = Some(handle);
        drop(state);
        Ok(())
    }

    /// Stop triggering cycles. An in-flight cycle finishes and is published
    /// before this returns. Has no effect unless the monitor is running.
    pub async fn stop(&self) {
        {
            let mut state = self.state.write().await;
            if !state.can_transition_to(MonitorState::Stopped) {
                return;
            }
            *state = MonitorState::Stopped;
        }

        info!("Stopping monitor");
        self.shutdown.send_replace(true);

        if let Some(handle) = self.task.lock().await.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Monitor task ended abnormally");
            }
        }
    }

    /// Run one cycle immediately and publish it, independent of the schedule.
    pub async fn run_once(&self) -> CycleResult {
        let cycle = run_cycle(&self.config, self.fetcher.as_ref()).await;
        self.snapshots.publish(cycle.clone()).await;
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
        cycle
    }
}
