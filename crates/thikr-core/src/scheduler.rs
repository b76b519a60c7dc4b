//! The scheduler loop.
//!
//! One long-lived tokio task per engine instance. Each cycle reads the
//! settings fresh, decides whether to emit, sends the emission over the
//! channel, then sleeps for the configured interval. Stop and pause are
//! watch channels: stop interrupts any sleep immediately, pause only gates
//! the emission decision while the sleep/wake cadence continues, so a
//! resume takes effect within one interval.
//!
//! Transient cycle errors are retried after a short backoff; after
//! `MAX_CYCLE_ERRORS` consecutive failures the task exits cleanly and the
//! health monitor replaces it with a fresh instance.

use std::time::Duration;

use chrono::{Local, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::events::{Emission, EmissionSource};
use crate::quiet;
use crate::selector;
use crate::storage::SettingsStore;

/// Delay before the first possible emission of a fresh loop instance, so
/// a user restarting the engine sees prompt confirmation it is alive.
/// Materially shorter than any legal interval.
pub const WARMUP_DELAY: Duration = Duration::from_secs(3);

/// Backoff between retries of a failed cycle.
pub const ERROR_BACKOFF: Duration = Duration::from_secs(2);

/// Consecutive cycle failures tolerated before the loop gives up and
/// leaves recovery to the health monitor.
pub const MAX_CYCLE_ERRORS: u32 = 5;

/// Mutable loop state, owned exclusively by the loop task. A replacement
/// instance starts from scratch; nothing is inherited from a dead loop.
struct ScheduleState {
    is_first_cycle: bool,
    consecutive_errors: u32,
    /// Count of ordinary emissions, drives sequential selection.
    ordinary_emissions: u64,
}

impl ScheduleState {
    fn fresh() -> Self {
        Self {
            is_first_cycle: true,
            consecutive_errors: 0,
            ordinary_emissions: 0,
        }
    }
}

/// Handle to a running scheduler loop.
///
/// `stop()` signals termination without blocking; the bounded
/// [`join_timeout`](SchedulerHandle::join_timeout) covers shutdown waits.
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    pause_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal the loop to terminate. Idempotent; safe to call at any time,
    /// including mid-sleep or after the loop already exited.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Suppress emissions without stopping the cadence.
    pub fn pause(&self) {
        let _ = self.pause_tx.send(true);
    }

    /// Re-enable emissions; takes effect at the next cycle.
    pub fn resume(&self) {
        let _ = self.pause_tx.send(false);
    }

    pub fn is_paused(&self) -> bool {
        *self.pause_tx.borrow()
    }

    /// Liveness probe for the health monitor.
    pub fn is_alive(&self) -> bool {
        !self.task.is_finished()
    }

    /// Wait for the loop task to finish, up to `limit`. Returns false on
    /// timeout; the caller logs and moves on rather than hanging shutdown.
    pub async fn join_timeout(&mut self, limit: Duration) -> bool {
        tokio::time::timeout(limit, &mut self.task).await.is_ok()
    }
}

/// Spawn a fresh scheduler loop feeding `tx`.
///
/// Every fresh instance takes the warm-up path before its first possible
/// emission, so neither a cold start nor a watchdog respawn emits
/// immediately.
pub fn spawn(store: SettingsStore, tx: mpsc::Sender<Emission>) -> SchedulerHandle {
    let (stop_tx, stop_rx) = watch::channel(false);
    let (pause_tx, pause_rx) = watch::channel(false);
    let task = tokio::spawn(run(store, tx, stop_rx, pause_rx));
    SchedulerHandle {
        stop_tx,
        pause_tx,
        task,
    }
}

async fn run(
    store: SettingsStore,
    tx: mpsc::Sender<Emission>,
    mut stop_rx: watch::Receiver<bool>,
    pause_rx: watch::Receiver<bool>,
) {
    let mut state = ScheduleState::fresh();
    info!("scheduler loop started");

    loop {
        if *stop_rx.borrow() {
            break;
        }

        if state.is_first_cycle {
            if sleep_or_stop(WARMUP_DELAY, &mut stop_rx).await {
                break;
            }
            state.is_first_cycle = false;
        }

        let paused = *pause_rx.borrow();
        let interval = match cycle(&store, &tx, paused, &mut state).await {
            Ok(interval) => interval,
            Err(CoreError::ChannelClosed) => {
                info!("emission channel closed, scheduler loop exiting");
                break;
            }
            Err(err) => {
                state.consecutive_errors += 1;
                warn!(
                    error = %err,
                    consecutive = state.consecutive_errors,
                    "reminder cycle failed"
                );
                if state.consecutive_errors > MAX_CYCLE_ERRORS {
                    warn!("cycle error budget exhausted, leaving recovery to the health monitor");
                    return;
                }
                if sleep_or_stop(ERROR_BACKOFF, &mut stop_rx).await {
                    break;
                }
                continue;
            }
        };

        if sleep_or_stop(interval, &mut stop_rx).await {
            break;
        }
    }

    info!("scheduler loop stopped");
}

/// One decision cycle. Returns the interval to sleep before the next one.
async fn cycle(
    store: &SettingsStore,
    tx: &mpsc::Sender<Emission>,
    paused: bool,
    state: &mut ScheduleState,
) -> Result<Duration, CoreError> {
    let cfg = store.load()?.reminder_config();

    if !paused && cfg.enabled && !quiet::is_quiet(Local::now().time(), &cfg.quiet) {
        let now = Utc::now();
        let content = selector::pick_content(&cfg, state.ordinary_emissions, now);
        let is_surah = content.is_surah();

        tx.send(Emission::new(content, EmissionSource::Scheduler, now))
            .await
            .map_err(|_| CoreError::ChannelClosed)?;
        state.consecutive_errors = 0;

        // Bookkeeping strictly after the emission went out: a failed send
        // retries the same decision next cycle instead of burning a
        // cooldown period.
        if is_surah {
            store.record_surah_shown(now)?;
        } else {
            state.ordinary_emissions += 1;
        }
    }

    Ok(cfg.interval)
}

/// Sleep for `dur`, returning early (true) when stop is signalled. The
/// stop channel only ever carries `true`.
async fn sleep_or_stop(dur: Duration, stop_rx: &mut watch::Receiver<bool>) -> bool {
    if *stop_rx.borrow() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(dur) => false,
        changed = stop_rx.changed() => match changed {
            Ok(()) => *stop_rx.borrow(),
            // Sender gone means the handle was dropped; treat as stop.
            Err(_) => true,
        },
    }
}
