//! Backup delivery guard.
//!
//! A deliberately redundant second path: if no emission has been observed
//! for materially longer than the configured interval, the guard
//! manufactures one itself. This covers a loop that is alive enough to
//! pass the watchdog's liveness probe but stuck never reaching its
//! emission step. Like the health monitor it is tick-driven from the
//! owning context's timer.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::catalog;
use crate::events::{Emission, EmissionSource, ReminderContent};
use crate::storage::ReminderConfig;

/// How often the owning context should call [`BackupGuard::tick`].
/// Coarser than the watchdog, much finer than any interval.
pub const GUARD_PERIOD: std::time::Duration = std::time::Duration::from_secs(60);

/// The guard fires once the silence exceeds this many intervals.
pub const STALL_FACTOR: i32 = 2;

pub struct BackupGuard {
    last_observed: DateTime<Utc>,
}

impl BackupGuard {
    /// The observation clock starts at construction, so a freshly started
    /// engine is never flagged inside its first interval.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { last_observed: now }
    }

    /// Record an emission seen on the stream, whatever produced it.
    pub fn observe(&mut self, at: DateTime<Utc>) {
        self.last_observed = self.last_observed.max(at);
    }

    pub fn last_observed(&self) -> DateTime<Utc> {
        self.last_observed
    }

    /// One guard tick. Returns a manufactured emission when the primary
    /// path has been silent too long; the guard's own emission counts as
    /// an observation, so it will not repeat every tick.
    ///
    /// The guard only emits ordinary items: passage bookkeeping belongs to
    /// the scheduler loop, and a forced delivery must not touch it.
    pub fn tick(
        &mut self,
        cfg: &ReminderConfig,
        paused: bool,
        now: DateTime<Utc>,
    ) -> Option<Emission> {
        if !cfg.enabled || paused {
            return None;
        }

        let threshold = Duration::from_std(cfg.interval).ok()? * STALL_FACTOR;
        let silence = now - self.last_observed;
        if silence <= threshold {
            return None;
        }

        warn!(
            silent_secs = silence.num_seconds(),
            "no reminder observed, forcing backup delivery"
        );
        self.last_observed = now;
        Some(Emission::new(
            ReminderContent::Thikr(catalog::pick_thikr(&cfg.custom_athkar)),
            EmissionSource::BackupGuard,
            now,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Settings;
    use chrono::TimeZone;

    fn cfg() -> ReminderConfig {
        // Default interval is 60 minutes, so the stall threshold is 2 h.
        Settings::default().reminder_config()
    }

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, min, 0).unwrap()
    }

    #[test]
    fn silent_while_emissions_arrive_on_schedule() {
        let cfg = cfg();
        let mut guard = BackupGuard::new(at(0, 0));

        // Healthy operation: one emission per interval. The elapsed time
        // at any tick never exceeds 2 × interval, so the guard never fires.
        for hour in 1..=12 {
            assert!(guard.tick(&cfg, false, at(hour, 0)).is_none());
            guard.observe(at(hour, 0));
        }
    }

    #[test]
    fn fires_once_after_prolonged_silence() {
        let cfg = cfg();
        let mut guard = BackupGuard::new(at(0, 0));

        // Exactly at the threshold it still holds.
        assert!(guard.tick(&cfg, false, at(2, 0)).is_none());

        let forced = guard.tick(&cfg, false, at(2, 1)).expect("guard fires");
        assert_eq!(forced.source, EmissionSource::BackupGuard);
        assert!(matches!(forced.content, ReminderContent::Thikr(_)));

        // Its own emission reset the clock: the next tick is silent again.
        assert!(guard.tick(&cfg, false, at(2, 2)).is_none());
    }

    #[test]
    fn holds_while_paused_or_disabled() {
        let mut cfg = cfg();
        let mut guard = BackupGuard::new(at(0, 0));

        assert!(guard.tick(&cfg, true, at(6, 0)).is_none());

        cfg.enabled = false;
        assert!(guard.tick(&cfg, false, at(6, 0)).is_none());
    }

    #[test]
    fn observation_time_is_monotonic() {
        let mut guard = BackupGuard::new(at(5, 0));
        guard.observe(at(4, 0));
        assert_eq!(guard.last_observed(), at(5, 0));
        guard.observe(at(6, 0));
        assert_eq!(guard.last_observed(), at(6, 0));
    }
}
