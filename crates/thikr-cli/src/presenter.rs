//! Terminal presentation of reminders.
//!
//! The engine is fire-and-forget toward display; this presenter is the
//! receiving end. It enforces the single-notification rule: an emission
//! arriving while a prior one is still within its display window replaces
//! it rather than queuing behind it.

use chrono::{DateTime, Duration, Utc};

use thikr_core::{Emission, ReminderContent};

/// How long a rendered reminder counts as "on screen". Matches the
/// original popup duration.
pub const DISPLAY_WINDOW_SECS: i64 = 8;

/// Outcome of showing one emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOutcome {
    Shown,
    /// A previous reminder was still visible and has been replaced.
    SupersededPrevious,
}

struct ActiveNotification {
    shown_at: DateTime<Utc>,
}

pub struct Presenter {
    active: Option<ActiveNotification>,
    display_window: Duration,
}

impl Presenter {
    pub fn new() -> Self {
        Self {
            active: None,
            display_window: Duration::seconds(DISPLAY_WINDOW_SECS),
        }
    }

    /// True when a reminder shown earlier would still be visible at `now`.
    pub fn has_active(&self, now: DateTime<Utc>) -> bool {
        matches!(&self.active, Some(a) if now - a.shown_at < self.display_window)
    }

    /// Render an emission to stdout, superseding any still-visible one.
    pub fn show(&mut self, emission: &Emission, show_virtue: bool, now: DateTime<Utc>) -> DisplayOutcome {
        let outcome = if self.has_active(now) {
            DisplayOutcome::SupersededPrevious
        } else {
            DisplayOutcome::Shown
        };

        println!("{}", render(emission, show_virtue));
        self.active = Some(ActiveNotification { shown_at: now });
        outcome
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure rendering, kept apart from the supersede bookkeeping so it can be
/// checked without capturing stdout.
pub fn render(emission: &Emission, show_virtue: bool) -> String {
    let mut out = String::new();
    match &emission.content {
        ReminderContent::Thikr(item) => {
            out.push_str("── ذِكْر ──\n");
            out.push_str(&item.text);
            out.push('\n');
            if show_virtue && !item.virtue.is_empty() {
                out.push_str(&item.virtue);
                out.push('\n');
            }
        }
        ReminderContent::Surah(surah) => {
            out.push_str(&format!("── 📖 {} ──\n", surah.name));
            for verse in &surah.verses {
                out.push_str(verse);
                out.push('\n');
            }
            if show_virtue && !surah.virtue.is_empty() {
                out.push_str(&surah.virtue);
                out.push('\n');
            }
        }
    }
    out
}
