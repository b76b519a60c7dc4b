//! # Thikr Core Library
//!
//! This library provides the reminder scheduling and reliability engine
//! behind Thikr. All operations are available via the standalone CLI
//! binary (`thikr-cli`), which acts as the owning process: it subscribes
//! to the emission channel, renders reminders, and drives the periodic
//! supervision ticks.
//!
//! ## Architecture
//!
//! - **Scheduler loop**: a long-lived tokio task that re-reads settings
//!   every cycle, picks content, and emits over a bounded channel
//! - **Health monitor**: tick-driven liveness supervision with a bounded
//!   restart budget
//! - **Backup guard**: tick-driven redundant delivery path for a stalled
//!   primary stream
//! - **Storage**: JSON settings with deep-merge-on-load defaults and
//!   dotted-path access
//! - **Catalog**: builtin remembrance items, surah passages and the
//!   morning/evening sequences
//!
//! ## Key Components
//!
//! - [`SchedulerHandle`]: control surface of the running loop
//! - [`HealthMonitor`]: watchdog with bounded restarts
//! - [`BackupGuard`]: forced delivery after prolonged silence
//! - [`SettingsStore`]: persisted configuration and statistics
//! - [`InstanceLock`]: machine-wide single-instance guard

pub mod catalog;
pub mod error;
pub mod events;
pub mod guard;
pub mod instance;
pub mod quiet;
pub mod scheduler;
pub mod selector;
pub mod storage;
pub mod watchdog;

pub use error::{CoreError, LockError, SettingsError};
pub use events::{Emission, EmissionSource, ReminderContent};
pub use guard::BackupGuard;
pub use instance::InstanceLock;
pub use scheduler::SchedulerHandle;
pub use storage::{QuietWindow, ReminderConfig, Settings, SettingsStore};
pub use watchdog::{HealthMonitor, WatchdogRecord, WatchdogVerdict};
