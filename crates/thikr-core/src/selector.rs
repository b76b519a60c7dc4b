//! Content selection.
//!
//! Decides whether a cycle surfaces the rotating surah passage or an
//! ordinary remembrance item, and draws the payload from the catalog.

use chrono::{DateTime, Utc};

use crate::catalog;
use crate::events::ReminderContent;
use crate::storage::ReminderConfig;

/// True when this cycle should surface a surah passage instead of an
/// ordinary item.
///
/// The passage rotation fires on its first-ever opportunity and then
/// again once the cooldown has fully elapsed. The caller records the
/// shown timestamp only after a successful emission, so a failed cycle
/// retries here instead of losing a cooldown period.
pub fn should_show_surah(cfg: &ReminderConfig, now: DateTime<Utc>) -> bool {
    if !cfg.surah_enabled {
        return false;
    }
    match cfg.surah_last_shown {
        None => true,
        Some(last) => now - last >= cfg.surah_cooldown,
    }
}

/// Choose the content for one emission.
///
/// `ordinary_cursor` drives sequential selection when `random_order` is
/// off; it is the count of ordinary emissions so far, so the pool is
/// walked in order and wraps around. The payload is returned un-mutated
/// from the catalog.
pub fn pick_content(cfg: &ReminderConfig, ordinary_cursor: u64, now: DateTime<Utc>) -> ReminderContent {
    if should_show_surah(cfg, now) {
        return ReminderContent::Surah(catalog::pick_surah());
    }

    if cfg.random_order {
        ReminderContent::Thikr(catalog::pick_thikr(&cfg.custom_athkar))
    } else {
        let mut pool = catalog::builtin_athkar();
        pool.extend_from_slice(&cfg.custom_athkar);
        let idx = (ordinary_cursor % pool.len() as u64) as usize;
        ReminderContent::Thikr(pool.swap_remove(idx))
    }
}
