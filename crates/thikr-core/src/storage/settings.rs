//! JSON-based user settings.
//!
//! Stores scheduling parameters, surah rotation bookkeeping, statistics
//! counters and user-added remembrance items at
//! `~/.config/thikr/settings.json`.
//!
//! On load the persisted JSON is deep-merged over the hardcoded defaults:
//! object-valued keys merge recursively, scalars and arrays are replaced
//! wholesale. The engine re-reads the file at every decision cycle, so a
//! `thikr config set` from another process is observed at the next cycle
//! without any hot-reload machinery.

use chrono::{DateTime, Local, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::catalog::ThikrItem;
use crate::error::SettingsError;

/// Reminder scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    #[serde(default = "default_true")]
    pub random_order: bool,
    #[serde(default = "default_true")]
    pub show_virtue: bool,
    #[serde(default)]
    pub quiet_hours: QuietHoursSettings,
}

/// Quiet-window settings, stored as "HH:MM" strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuietHoursSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_quiet_start")]
    pub start: String,
    #[serde(default = "default_quiet_end")]
    pub end: String,
}

/// Surah rotation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurahSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_surah_interval_days")]
    pub interval_days: u64,
    /// RFC 3339 timestamp of the last passage emission. Written only after
    /// a successful emission; an unparsable value reads as "never shown".
    #[serde(default)]
    pub last_shown: Option<String>,
}

/// Statistics counters, reset daily by calendar date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsSettings {
    #[serde(default)]
    pub daily_count: u64,
    #[serde(default)]
    pub total_count: u64,
    /// "YYYY-MM-DD" of the day `daily_count` belongs to.
    #[serde(default)]
    pub last_reset: Option<String>,
}

/// User settings.
///
/// Serialized to/from JSON at `~/.config/thikr/settings.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub reminder: ReminderSettings,
    #[serde(default)]
    pub surah: SurahSettings,
    #[serde(default)]
    pub stats: StatsSettings,
    #[serde(default)]
    pub custom_athkar: Vec<ThikrItem>,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_interval_minutes() -> u64 {
    60
}
fn default_surah_interval_days() -> u64 {
    3
}
fn default_quiet_start() -> String {
    "23:00".into()
}
fn default_quiet_end() -> String {
    "06:00".into()
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: default_interval_minutes(),
            random_order: true,
            show_virtue: true,
            quiet_hours: QuietHoursSettings::default(),
        }
    }
}

impl Default for QuietHoursSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            start: default_quiet_start(),
            end: default_quiet_end(),
        }
    }
}

impl Default for SurahSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_days: default_surah_interval_days(),
            last_shown: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reminder: ReminderSettings::default(),
            surah: SurahSettings::default(),
            stats: StatsSettings::default(),
            custom_athkar: Vec::new(),
        }
    }
}

/// Time-of-day window during which emissions are suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietWindow {
    pub enabled: bool,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Immutable per-cycle snapshot of everything one scheduling decision
/// needs. Assembled fresh from the settings store at the start of each
/// cycle; never cached across an interval.
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    pub enabled: bool,
    pub interval: Duration,
    pub random_order: bool,
    pub show_virtue: bool,
    pub quiet: QuietWindow,
    pub surah_enabled: bool,
    pub surah_cooldown: chrono::Duration,
    /// `None` when never shown or when the stored value fails to parse
    /// (fail open toward showing content).
    pub surah_last_shown: Option<DateTime<Utc>>,
    pub custom_athkar: Vec<ThikrItem>,
}

fn parse_clock(s: &str, fallback: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(fallback, "%H:%M"))
        .unwrap_or_else(|_| NaiveTime::MIN)
}

impl Settings {
    /// Build the per-cycle scheduling snapshot.
    pub fn reminder_config(&self) -> ReminderConfig {
        let q = &self.reminder.quiet_hours;
        ReminderConfig {
            enabled: self.reminder.enabled,
            interval: Duration::from_secs(self.reminder.interval_minutes.max(1) * 60),
            random_order: self.reminder.random_order,
            show_virtue: self.reminder.show_virtue,
            quiet: QuietWindow {
                enabled: q.enabled,
                start: parse_clock(&q.start, "23:00"),
                end: parse_clock(&q.end, "06:00"),
            },
            surah_enabled: self.surah.enabled,
            surah_cooldown: chrono::Duration::days(self.surah.interval_days.max(1) as i64),
            surah_last_shown: self
                .surah
                .last_shown
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            custom_athkar: self.custom_athkar.clone(),
        }
    }
}

/// Handle to the settings file. Cheap to clone; every component receives
/// its own handle at construction instead of reaching for a global.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at the default per-user location.
    pub fn open_default() -> Result<Self, SettingsError> {
        Ok(Self {
            path: data_dir()?.join("settings.json"),
        })
    }

    /// Store at an explicit path (tests, portable installs).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load from disk, deep-merging the persisted JSON over the defaults.
    ///
    /// A missing file yields the defaults. An unreadable or unparsable file
    /// is an error so the scheduler can treat it as a transient cycle
    /// failure rather than silently reverting the user's configuration.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        let saved = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Settings::default());
            }
            Err(e) => {
                return Err(SettingsError::LoadFailed {
                    path: self.path.clone(),
                    message: e.to_string(),
                });
            }
        };

        let saved: serde_json::Value =
            serde_json::from_str(&saved).map_err(|e| SettingsError::LoadFailed {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        let mut merged = serde_json::to_value(Settings::default()).map_err(|e| {
            SettingsError::LoadFailed {
                path: self.path.clone(),
                message: e.to_string(),
            }
        })?;
        deep_merge(&mut merged, saved);

        serde_json::from_value(merged).map_err(|e| SettingsError::LoadFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Persist to disk.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let content =
            serde_json::to_string_pretty(settings).map_err(|e| SettingsError::SaveFailed {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::SaveFailed {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        }
        std::fs::write(&self.path, content).map_err(|e| SettingsError::SaveFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Get a value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        let settings = self.load()?;
        let json = serde_json::to_value(&settings).map_err(|e| SettingsError::LoadFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        Ok(get_json_value_by_path(&json, key).map(|val| match val {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    /// Set a value by dot-separated key, persisting immediately.
    ///
    /// The new value is coerced to the existing field's type; unknown keys
    /// are rejected so a typo cannot grow the settings file.
    pub fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let settings = self.load()?;
        let mut json = serde_json::to_value(&settings).map_err(|e| SettingsError::LoadFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        set_json_value_by_path(&mut json, key, value)?;
        let settings: Settings =
            serde_json::from_value(json).map_err(|e| SettingsError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        self.save(&settings)
    }

    /// Record a successful surah emission. Called by the scheduler *after*
    /// the emission went out, never before, so a failed cycle retries
    /// instead of silently burning a cooldown period.
    pub fn record_surah_shown(&self, at: DateTime<Utc>) -> Result<(), SettingsError> {
        let mut settings = self.load()?;
        settings.surah.last_shown = Some(at.to_rfc3339());
        self.save(&settings)
    }

    /// Bump the statistics counters for one displayed reminder, resetting
    /// the daily counter when the calendar date has rolled over. Returns
    /// `(daily, total)`.
    pub fn increment_counters(&self, now: DateTime<Local>) -> Result<(u64, u64), SettingsError> {
        let mut settings = self.load()?;
        let today = now.format("%Y-%m-%d").to_string();
        if settings.stats.last_reset.as_deref() != Some(today.as_str()) {
            settings.stats.daily_count = 0;
            settings.stats.last_reset = Some(today);
        }
        settings.stats.daily_count += 1;
        settings.stats.total_count += 1;
        let counts = (settings.stats.daily_count, settings.stats.total_count);
        self.save(&settings)?;
        Ok(counts)
    }
}

/// Deep-merge `saved` into `base`: objects merge recursively, everything
/// else (scalars, arrays) replaces wholesale.
fn deep_merge(base: &mut serde_json::Value, saved: serde_json::Value) {
    match (base, saved) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(saved_map)) => {
            for (key, value) in saved_map {
                match base_map.get_mut(&key) {
                    Some(slot) if slot.is_object() && value.is_object() => {
                        deep_merge(slot, value);
                    }
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn get_json_value_by_path<'a>(
    root: &'a serde_json::Value,
    key: &str,
) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }

    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn set_json_value_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), SettingsError> {
    let unknown = || SettingsError::UnknownKey(key.to_string());
    let invalid = |message: String| SettingsError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let mut parts = key.split('.').peekable();
    if parts.peek().is_none() {
        return Err(unknown());
    }

    let mut current = root;
    while let Some(part) = parts.next() {
        let is_leaf = parts.peek().is_none();
        if is_leaf {
            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                // Null slots hold optional strings (timestamps, date keys).
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        current = current.get_mut(part).ok_or_else(unknown)?;
    }

    Err(unknown())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store_in(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::at(dir.path().join("settings.json"))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = store_in(&dir).load().unwrap();
        assert!(settings.reminder.enabled);
        assert_eq!(settings.reminder.interval_minutes, 60);
        assert_eq!(settings.surah.interval_days, 3);
        assert!(settings.custom_athkar.is_empty());
    }

    #[test]
    fn deep_merge_keeps_unsaved_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        // A partial file from an older version: only one nested key.
        std::fs::write(
            store.path(),
            r#"{"reminder": {"interval_minutes": 15}, "stats": {"total_count": 7}}"#,
        )
        .unwrap();

        let settings = store.load().unwrap();
        assert_eq!(settings.reminder.interval_minutes, 15);
        // Sibling keys of the merged objects keep their defaults.
        assert!(settings.reminder.enabled);
        assert_eq!(settings.reminder.quiet_hours.start, "23:00");
        assert_eq!(settings.stats.total_count, 7);
    }

    #[test]
    fn arrays_replace_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"custom_athkar": [{"text": "ذكر", "category": "مخصص", "virtue": ""}]}"#,
        )
        .unwrap();

        let settings = store.load().unwrap();
        assert_eq!(settings.custom_athkar.len(), 1);
        assert_eq!(settings.custom_athkar[0].text, "ذكر");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(
            store.get("reminder.enabled").unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(
            store.get("reminder.quiet_hours.start").unwrap().as_deref(),
            Some("23:00")
        );
        assert!(store.get("reminder.missing_key").unwrap().is_none());
    }

    #[test]
    fn set_persists_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.set("reminder.interval_minutes", "5").unwrap();

        // A second handle sees the change.
        let again = SettingsStore::at(store.path());
        assert_eq!(
            again.get("reminder.interval_minutes").unwrap().as_deref(),
            Some("5")
        );
    }

    #[test]
    fn set_rejects_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(matches!(
            store.set("reminder.nonexistent", "1"),
            Err(SettingsError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(matches!(
            store.set("reminder.enabled", "definitely"),
            Err(SettingsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn reminder_config_parses_quiet_window() {
        let mut settings = Settings::default();
        settings.reminder.quiet_hours.enabled = true;
        settings.reminder.quiet_hours.start = "22:30".into();
        settings.reminder.quiet_hours.end = "05:15".into();

        let cfg = settings.reminder_config();
        assert!(cfg.quiet.enabled);
        assert_eq!(cfg.quiet.start, NaiveTime::from_hms_opt(22, 30, 0).unwrap());
        assert_eq!(cfg.quiet.end, NaiveTime::from_hms_opt(5, 15, 0).unwrap());
    }

    #[test]
    fn malformed_quiet_clock_falls_back_to_default() {
        let mut settings = Settings::default();
        settings.reminder.quiet_hours.start = "25:99".into();
        let cfg = settings.reminder_config();
        assert_eq!(cfg.quiet.start, NaiveTime::from_hms_opt(23, 0, 0).unwrap());
    }

    #[test]
    fn malformed_last_shown_reads_as_never_shown() {
        let mut settings = Settings::default();
        settings.surah.last_shown = Some("not a timestamp".into());
        assert!(settings.reminder_config().surah_last_shown.is_none());
    }

    #[test]
    fn record_surah_shown_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        store.record_surah_shown(at).unwrap();
        let cfg = store.load().unwrap().reminder_config();
        assert_eq!(cfg.surah_last_shown, Some(at));
    }

    #[test]
    fn counters_reset_on_new_day() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let day1 = Local.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let day2 = Local.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();

        assert_eq!(store.increment_counters(day1).unwrap(), (1, 1));
        assert_eq!(store.increment_counters(day1).unwrap(), (2, 2));
        // New date: daily resets, total keeps counting.
        assert_eq!(store.increment_counters(day2).unwrap(), (1, 3));
    }

    #[test]
    fn interval_floor_is_one_minute() {
        let mut settings = Settings::default();
        settings.reminder.interval_minutes = 0;
        let cfg = settings.reminder_config();
        assert_eq!(cfg.interval, Duration::from_secs(60));
    }
}
