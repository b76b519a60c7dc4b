//! Read-only content catalog.
//!
//! The catalog holds the builtin remembrance items, the rotating surah
//! passages, and the morning/evening sequences. User-added items live in
//! the settings store and are merged in at selection time; an empty custom
//! list degrades to the builtin tables, so the pickers are total.

mod data;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// A single remembrance item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThikrItem {
    pub text: String,
    pub category: String,
    /// Virtue line shown under the item. May be empty.
    #[serde(default)]
    pub virtue: String,
}

/// A short surah passage shown on the rotating cooldown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurahPassage {
    pub name: String,
    /// Surah number in the mushaf ordering (ayat al-kursi uses its verse
    /// number, matching the source data).
    pub number: u32,
    pub verses: Vec<String>,
    #[serde(default)]
    pub virtue: String,
}

/// An entry of the morning/evening sequences, carrying a repeat count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatedThikr {
    pub text: String,
    pub repeat: u32,
    #[serde(default)]
    pub virtue: String,
}

/// Category marker for user-added items.
pub const CUSTOM_CATEGORY: &str = "مخصص";

/// The builtin remembrance items.
pub fn builtin_athkar() -> Vec<ThikrItem> {
    data::ATHKAR
        .iter()
        .map(|&(text, category, virtue)| ThikrItem {
            text: text.to_string(),
            category: category.to_string(),
            virtue: virtue.to_string(),
        })
        .collect()
}

/// The builtin surah passages.
pub fn builtin_surahs() -> Vec<SurahPassage> {
    data::SURAHS
        .iter()
        .map(|&(name, number, verses, virtue)| SurahPassage {
            name: name.to_string(),
            number,
            verses: verses.iter().map(|v| v.to_string()).collect(),
            virtue: virtue.to_string(),
        })
        .collect()
}

fn sequence(table: &[(&str, u32, &str)]) -> Vec<RepeatedThikr> {
    table
        .iter()
        .map(|&(text, repeat, virtue)| RepeatedThikr {
            text: text.to_string(),
            repeat,
            virtue: virtue.to_string(),
        })
        .collect()
}

/// The morning sequence, in recitation order.
pub fn morning_athkar() -> Vec<RepeatedThikr> {
    sequence(data::MORNING)
}

/// The evening sequence, in recitation order.
pub fn evening_athkar() -> Vec<RepeatedThikr> {
    sequence(data::EVENING)
}

/// Pick a random remembrance item from builtin ∪ custom.
///
/// Never fails: the builtin table is non-empty, and custom items only add
/// to the pool.
pub fn pick_thikr(custom: &[ThikrItem]) -> ThikrItem {
    let mut pool = builtin_athkar();
    pool.extend_from_slice(custom);
    let mut rng = rand::thread_rng();
    pool.choose(&mut rng)
        .cloned()
        .unwrap_or_else(|| builtin_athkar().swap_remove(0))
}

/// Pick a random surah passage from the builtin table.
pub fn pick_surah() -> SurahPassage {
    let mut rng = rand::thread_rng();
    builtin_surahs()
        .choose(&mut rng)
        .cloned()
        .unwrap_or_else(|| builtin_surahs().swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_are_populated() {
        assert_eq!(builtin_athkar().len(), 20);
        assert_eq!(builtin_surahs().len(), 7);
        assert_eq!(morning_athkar().len(), 13);
        assert_eq!(evening_athkar().len(), 14);
    }

    #[test]
    fn every_surah_has_verses() {
        for surah in builtin_surahs() {
            assert!(!surah.verses.is_empty(), "{} has no verses", surah.name);
        }
    }

    #[test]
    fn pick_thikr_degrades_to_builtin_on_empty_custom_list() {
        let item = pick_thikr(&[]);
        assert!(builtin_athkar().contains(&item));
    }

    #[test]
    fn pick_thikr_can_draw_from_custom_items() {
        let custom = vec![ThikrItem {
            text: "ذكر مخصص".into(),
            category: CUSTOM_CATEGORY.into(),
            virtue: String::new(),
        }];
        // The pool is builtin + 1; drawing enough times must eventually hit
        // the custom item. 500 draws misses with probability (20/21)^500.
        let hit = (0..500).any(|_| pick_thikr(&custom).category == CUSTOM_CATEGORY);
        assert!(hit);
    }

    #[test]
    fn repeat_counts_survive_the_table_mapping() {
        let morning = morning_athkar();
        assert_eq!(morning[10].repeat, 100);
        let evening = evening_athkar();
        assert_eq!(evening[11].repeat, 100);
    }
}
