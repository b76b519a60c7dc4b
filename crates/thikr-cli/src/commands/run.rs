//! The `thikr run` daemon: the owning process of the engine.
//!
//! Acquires the single-instance lock, spawns the scheduler loop, and then
//! serves a single select loop that consumes emissions and drives the two
//! supervision ticks. The health monitor and backup guard are plain
//! periodic callbacks here, not separate workers; the scheduler loop is
//! the only long-lived task.

use std::error::Error;
use std::time::Duration;

use chrono::{Local, Utc};
use clap::Args;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use thikr_core::guard::GUARD_PERIOD;
use thikr_core::watchdog::{MAX_RESTARTS, WATCHDOG_PERIOD};
use thikr_core::{
    scheduler, BackupGuard, Emission, HealthMonitor, InstanceLock, LockError, SettingsStore,
    WatchdogVerdict,
};

use crate::presenter::{DisplayOutcome, Presenter};

/// Bounded wait for the loop task on shutdown; exceeding it is logged,
/// not fatal.
const SHUTDOWN_WAIT: Duration = Duration::from_secs(2);

/// Emission channel capacity: single producer, shallow FIFO.
const CHANNEL_CAPACITY: usize = 8;

#[derive(Args)]
pub struct RunArgs {
    /// Silent background mode: skip the startup summary, keep running
    #[arg(long)]
    pub background: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(daemon(args))
}

async fn daemon(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let lock = match InstanceLock::acquire() {
        Ok(lock) => lock,
        Err(LockError::AlreadyRunning { pid }) => {
            eprintln!("thikr is already running (pid {pid})");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let store = SettingsStore::open_default()?;

    if !args.background {
        let settings = store.load()?;
        println!(
            "thikr engine starting (reminder every {} min, surah every {} days)",
            settings.reminder.interval_minutes, settings.surah.interval_days
        );
        println!("press Ctrl-C to stop");
    }
    info!(background = args.background, "engine running");

    let (tx, mut rx) = mpsc::channel::<Emission>(CHANNEL_CAPACITY);
    let mut loop_handle = scheduler::spawn(store.clone(), tx.clone());
    let mut monitor = HealthMonitor::new(MAX_RESTARTS);
    let mut guard = BackupGuard::new(Utc::now());
    let mut presenter = Presenter::new();

    let mut watchdog_timer = tokio::time::interval(WATCHDOG_PERIOD);
    let mut guard_timer = tokio::time::interval(GUARD_PERIOD);
    let mut exhaustion_reported = false;

    loop {
        tokio::select! {
            maybe = rx.recv() => match maybe {
                Some(emission) => {
                    deliver(&store, &mut presenter, &mut guard, &emission);
                }
                // Unreachable while we hold a sender clone ourselves, but
                // a closed channel still means there is nothing left to
                // serve.
                None => break,
            },

            _ = watchdog_timer.tick() => {
                let respawn_store = store.clone();
                let respawn_tx = tx.clone();
                let verdict = monitor.tick(&mut loop_handle, Utc::now(), move || {
                    scheduler::spawn(respawn_store, respawn_tx)
                });
                if verdict == WatchdogVerdict::Exhausted && !exhaustion_reported {
                    exhaustion_reported = true;
                    // The monitor already logged the terminal diagnostic;
                    // in foreground mode also tell the user directly.
                    if !args.background {
                        eprintln!("thikr: reminder loop failed repeatedly and will not be restarted");
                    }
                }
            },

            _ = guard_timer.tick() => {
                match store.load() {
                    Ok(settings) => {
                        let cfg = settings.reminder_config();
                        if let Some(forced) =
                            guard.tick(&cfg, loop_handle.is_paused(), Utc::now())
                        {
                            deliver(&store, &mut presenter, &mut guard, &forced);
                        }
                    }
                    // The scheduler will hit the same error and count it;
                    // the guard just skips this tick.
                    Err(e) => debug!(error = %e, "guard tick skipped, settings unreadable"),
                }
            },

            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            },
        }
    }

    loop_handle.stop();
    if !loop_handle.join_timeout(SHUTDOWN_WAIT).await {
        warn!(
            wait_secs = SHUTDOWN_WAIT.as_secs(),
            "scheduler loop did not stop in time, abandoning it"
        );
    }
    lock.release();

    if !args.background {
        if let Ok(settings) = store.load() {
            println!(
                "stopped. reminders today: {}, total: {}",
                settings.stats.daily_count, settings.stats.total_count
            );
        }
    }
    Ok(())
}

/// Hand one emission to the presentation side. Display problems and
/// bookkeeping failures stay here; nothing propagates back into the
/// scheduling path.
fn deliver(
    store: &SettingsStore,
    presenter: &mut Presenter,
    guard: &mut BackupGuard,
    emission: &Emission,
) {
    guard.observe(emission.at);

    let show_virtue = store
        .load()
        .map(|s| s.reminder.show_virtue)
        .unwrap_or(true);
    if presenter.show(emission, show_virtue, Utc::now()) == DisplayOutcome::SupersededPrevious {
        debug!("previous reminder superseded");
    }

    if let Err(e) = store.increment_counters(Local::now()) {
        warn!(error = %e, "failed to update statistics");
    }
}
