use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::source::{DiskDataSource, PollError};
use crate::store::SnapshotStore;

/// Cadence used until the source has reported one.
pub const DEFAULT_POLL_INTERVAL_MINUTES: u64 = 60;

/// Minimum time the loading flag stays visible, so a fast round trip
/// still gives the operator feedback that a refresh happened.
pub const MIN_VISIBLE_REFRESH: Duration = Duration::from_millis(500);

/// Owns a spawned timer task and aborts it on drop, so replacing the
/// handle can never leave a stale schedule ticking in the background.
struct ScheduleHandle(JoinHandle<()>);

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

enum PollerState {
    /// No timer armed yet.
    Idle,
    /// Recurring polling at `interval_minutes`. The handle is `None` only
    /// when the interval is zero: nothing ticks, manual refreshes still
    /// fetch.
    Scheduled {
        interval_minutes: u64,
        timer: Option<ScheduleHandle>,
    },
    /// Terminal. A cycle already in flight may still finish and commit.
    Stopped,
}

/// Counters over the poller's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerStats {
    pub completed_cycles: u64,
    pub failed_cycles: u64,
}

struct PollerInner<S> {
    source: S,
    store: SnapshotStore,
    state: Mutex<PollerState>,
    in_flight: AtomicBool,
    completed_cycles: AtomicU64,
    failed_cycles: AtomicU64,
}

/// Self-rescheduling fetch loop.
///
/// Drives fetch cycles against a [`DiskDataSource`], commits results to a
/// [`SnapshotStore`], and re-arms its own timer whenever the source
/// reports a different cadence than the one currently scheduled. At most
/// one fetch is ever in flight and at most one timer is ever armed.
pub struct AdaptivePoller<S: DiskDataSource + 'static> {
    inner: Arc<PollerInner<S>>,
}

impl<S: DiskDataSource + 'static> AdaptivePoller<S> {
    pub fn new(source: S, store: SnapshotStore) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                source,
                store,
                state: Mutex::new(PollerState::Idle),
                in_flight: AtomicBool::new(false),
                completed_cycles: AtomicU64::new(0),
                failed_cycles: AtomicU64::new(0),
            }),
        }
    }

    /// Begin polling: one immediate fetch cycle, then a recurring timer at
    /// the default cadence until the source reports otherwise.
    ///
    /// Idempotent: calling this on an already scheduled or stopped poller
    /// does nothing.
    pub async fn start(&self) {
        {
            let mut state = self.inner.state.lock().await;
            match *state {
                PollerState::Idle => {}
                PollerState::Scheduled { .. } | PollerState::Stopped => return,
            }
            let timer = PollerInner::arm(&self.inner, DEFAULT_POLL_INTERVAL_MINUTES);
            *state = PollerState::Scheduled {
                interval_minutes: DEFAULT_POLL_INTERVAL_MINUTES,
                timer: Some(timer),
            };
        }
        info!(
            interval_minutes = DEFAULT_POLL_INTERVAL_MINUTES,
            "Polling started"
        );
        PollerInner::spawn_cycle(&self.inner);
    }

    /// Fetch outside the timer cadence, e.g. for an operator-initiated
    /// refresh. Coalesced into any cycle already in flight.
    pub async fn refresh_now(&self) {
        if matches!(*self.inner.state.lock().await, PollerState::Stopped) {
            return;
        }
        debug!("Manual refresh requested");
        PollerInner::spawn_cycle(&self.inner);
    }

    /// Cancel the armed timer and refuse any further scheduling.
    ///
    /// Idempotent. A cycle already in flight finishes and commits its
    /// snapshot; nothing is scheduled after it.
    pub async fn stop(&self) {
        let mut state = self.inner.state.lock().await;
        if matches!(*state, PollerState::Stopped) {
            return;
        }
        // Dropping the Scheduled state aborts the timer task.
        *state = PollerState::Stopped;
        info!("Polling stopped");
    }

    /// Cadence the poller is presently scheduled at. `Some(0)` means the
    /// source disabled recurring polls; `None` means not started or
    /// stopped.
    pub async fn interval_minutes(&self) -> Option<u64> {
        match *self.inner.state.lock().await {
            PollerState::Scheduled {
                interval_minutes, ..
            } => Some(interval_minutes),
            PollerState::Idle | PollerState::Stopped => None,
        }
    }

    pub fn stats(&self) -> PollerStats {
        PollerStats {
            completed_cycles: self.inner.completed_cycles.load(Ordering::Relaxed),
            failed_cycles: self.inner.failed_cycles.load(Ordering::Relaxed),
        }
    }

    /// The store this poller writes to.
    pub fn store(&self) -> &SnapshotStore {
        &self.inner.store
    }
}

impl<S: DiskDataSource + 'static> PollerInner<S> {
    /// Arm a recurring timer. Each tick spawns a cycle; ticks that land
    /// while one is still running are coalesced by the in-flight guard.
    ///
    /// Callers guarantee `interval_minutes > 0`.
    fn arm(inner: &Arc<Self>, interval_minutes: u64) -> ScheduleHandle {
        let inner = Arc::clone(inner);
        let period = Duration::from_secs(interval_minutes.saturating_mul(60));
        ScheduleHandle(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await; // skip the immediate first tick
            loop {
                ticker.tick().await;
                Self::spawn_cycle(&inner);
            }
        }))
    }

    /// Run one fetch cycle on its own task, so neither a timer tick nor a
    /// manual refresh blocks its caller.
    fn spawn_cycle(inner: &Arc<Self>) {
        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            Self::run_cycle(&inner).await;
        });
    }

    async fn run_cycle(inner: &Arc<Self>) {
        // A cycle task spawned just before teardown must not start a
        // fetch after it.
        if matches!(*inner.state.lock().await, PollerState::Stopped) {
            return;
        }

        // Single-flight: whoever loses the swap rides on the outcome of
        // the cycle already running.
        if inner
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Fetch cycle already in flight, coalescing");
            return;
        }

        let started = Instant::now();
        inner.store.begin_load().await;

        match inner.source.fetch_disks().await {
            Ok(disks) => {
                debug!(count = disks.len(), "Disk fetch complete");
                inner.hold_loading_visible(started).await;
                inner.store.complete_load(disks).await;
                inner.completed_cycles.fetch_add(1, Ordering::Relaxed);

                match inner.source.fetch_poll_interval_minutes().await {
                    Ok(reported) => Self::reconcile(inner, reported).await,
                    Err(e) => {
                        // The snapshot stays committed; only the cadence
                        // check is skipped this cycle.
                        warn!("{}", PollError::FetchIntervalFailed(e));
                    }
                }
            }
            Err(e) => {
                error!("{}", PollError::FetchDisksFailed(e));
                inner.failed_cycles.fetch_add(1, Ordering::Relaxed);
                inner.hold_loading_visible(started).await;
                inner.store.fail_load().await;
            }
        }

        inner.in_flight.store(false, Ordering::Release);
    }

    /// Hold the loading flag for at least [`MIN_VISIBLE_REFRESH`] from
    /// cycle start. Only the store update is deferred, never a fetch.
    async fn hold_loading_visible(&self, started: Instant) {
        let elapsed = started.elapsed();
        if elapsed < MIN_VISIBLE_REFRESH {
            tokio::time::sleep(MIN_VISIBLE_REFRESH - elapsed).await;
        }
    }

    /// Compare the reported cadence against the scheduled one and re-arm
    /// if they differ.
    ///
    /// Cancel-then-rearm: assigning the new handle drops the old one,
    /// aborting its task, so two live timers cannot coexist. Adjusting
    /// the existing timer instead would accumulate drift.
    async fn reconcile(inner: &Arc<Self>, reported: i64) {
        if reported < 0 {
            warn!(reported, "Ignoring negative poll interval from source");
            return;
        }
        let reported = reported as u64;

        let mut state = inner.state.lock().await;
        match &mut *state {
            PollerState::Scheduled {
                interval_minutes,
                timer,
            } => {
                if *interval_minutes == reported {
                    return;
                }
                if reported == 0 {
                    *timer = None;
                    info!("Recurring polling disabled by source, manual refresh only");
                } else {
                    *timer = Some(Self::arm(inner, reported));
                    info!(
                        from = *interval_minutes,
                        to = reported,
                        "Poll interval changed, timer re-armed"
                    );
                }
                *interval_minutes = reported;
            }
            // A manual refresh before start() or after stop() never arms
            // a timer on its own.
            PollerState::Idle | PollerState::Stopped => {}
        }
    }
}
