use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{SurahPassage, ThikrItem};

/// Which path produced an emission. The backup guard stamps its own
/// emissions so the owning context can tell a forced delivery apart from
/// the primary stream in its logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionSource {
    Scheduler,
    BackupGuard,
    Manual,
}

/// The reminder content carried by an emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReminderContent {
    Thikr(ThikrItem),
    Surah(SurahPassage),
}

impl ReminderContent {
    pub fn is_surah(&self) -> bool {
        matches!(self, ReminderContent::Surah(_))
    }
}

/// A single "show this reminder" message, passed once from the scheduler
/// loop (or backup guard) to the owning context. Not persisted; carries no
/// identity beyond its timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emission {
    pub content: ReminderContent,
    pub source: EmissionSource,
    pub at: DateTime<Utc>,
}

impl Emission {
    pub fn new(content: ReminderContent, source: EmissionSource, at: DateTime<Utc>) -> Self {
        Self {
            content,
            source,
            at,
        }
    }
}
