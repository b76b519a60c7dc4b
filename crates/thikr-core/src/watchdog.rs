//! Scheduler liveness supervision.
//!
//! The monitor does not run its own task; the owning context calls
//! `tick()` from a periodic timer, in the same caller-drives-the-clock
//! style as the rest of the engine. A dead loop is replaced by a fresh
//! instance while the restart budget lasts; afterwards the monitor stops
//! restarting for the lifetime of the process, a deliberate fail-stop so
//! an infinite restart storm cannot mask a systemic bug.

use chrono::{DateTime, Utc};
use tracing::{error, warn};

use crate::scheduler::SchedulerHandle;

/// How often the owning context should call [`HealthMonitor::tick`].
pub const WATCHDOG_PERIOD: std::time::Duration = std::time::Duration::from_secs(30);

/// Restarts attempted within one process lifetime.
pub const MAX_RESTARTS: u32 = 3;

/// Supervision bookkeeping. Owned by the monitor, never inherited from or
/// shared with a loop instance, so a crashed loop's state cannot leak
/// into its replacement.
#[derive(Debug, Clone)]
pub struct WatchdogRecord {
    pub restart_count: u32,
    pub max_restarts: u32,
    pub last_observed_alive_at: DateTime<Utc>,
}

/// Outcome of one supervision tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogVerdict {
    /// The loop is alive; nothing to do.
    Alive,
    /// The loop was dead and a fresh instance now runs in its place.
    Restarted,
    /// The loop is dead and the restart budget is spent. The reminder
    /// stream stays down until the process is relaunched.
    Exhausted,
}

pub struct HealthMonitor {
    record: WatchdogRecord,
    exhaustion_logged: bool,
}

impl HealthMonitor {
    pub fn new(max_restarts: u32) -> Self {
        Self {
            record: WatchdogRecord {
                restart_count: 0,
                max_restarts,
                last_observed_alive_at: Utc::now(),
            },
            exhaustion_logged: false,
        }
    }

    pub fn record(&self) -> &WatchdogRecord {
        &self.record
    }

    /// One supervision tick.
    ///
    /// `respawn` must produce a brand-new loop instance; it is only
    /// invoked when the current one is dead and budget remains. The dead
    /// handle is overwritten, its state discarded.
    pub fn tick(
        &mut self,
        current: &mut SchedulerHandle,
        now: DateTime<Utc>,
        respawn: impl FnOnce() -> SchedulerHandle,
    ) -> WatchdogVerdict {
        if current.is_alive() {
            self.record.last_observed_alive_at = now;
            return WatchdogVerdict::Alive;
        }

        if self.record.restart_count >= self.record.max_restarts {
            if !self.exhaustion_logged {
                error!(
                    restarts = self.record.restart_count,
                    "scheduler loop dead and restart budget spent, giving up"
                );
                self.exhaustion_logged = true;
            }
            return WatchdogVerdict::Exhausted;
        }

        self.record.restart_count += 1;
        warn!(
            restart = self.record.restart_count,
            max = self.record.max_restarts,
            "scheduler loop dead, spawning a fresh instance"
        );
        *current = respawn();
        WatchdogVerdict::Restarted
    }
}
