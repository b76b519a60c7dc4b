//! Custom remembrance items and the morning/evening sequences.

use std::error::Error;

use clap::Subcommand;

use thikr_core::catalog::{self, RepeatedThikr, ThikrItem, CUSTOM_CATEGORY};
use thikr_core::SettingsStore;

#[derive(Subcommand)]
pub enum AthkarAction {
    /// List user-added items
    List,
    /// Add a custom item
    Add {
        /// The remembrance text
        text: String,
        /// Optional virtue line
        #[arg(long, default_value = "")]
        virtue: String,
    },
    /// Remove a custom item by its list position (1-based)
    Remove { position: usize },
    /// Print the morning sequence
    Morning,
    /// Print the evening sequence
    Evening,
}

pub fn run(action: AthkarAction) -> Result<(), Box<dyn Error>> {
    let store = SettingsStore::open_default()?;
    match action {
        AthkarAction::List => {
            let settings = store.load()?;
            if settings.custom_athkar.is_empty() {
                println!("no custom items");
            }
            for (i, item) in settings.custom_athkar.iter().enumerate() {
                println!("{}. {}", i + 1, item.text);
            }
        }
        AthkarAction::Add { text, virtue } => {
            let text = text.trim().to_string();
            if text.is_empty() {
                eprintln!("empty text");
                std::process::exit(1);
            }
            let mut settings = store.load()?;
            settings.custom_athkar.push(ThikrItem {
                text,
                category: CUSTOM_CATEGORY.to_string(),
                virtue: virtue.trim().to_string(),
            });
            store.save(&settings)?;
            println!("added ({} custom items)", settings.custom_athkar.len());
        }
        AthkarAction::Remove { position } => {
            let mut settings = store.load()?;
            if position == 0 || position > settings.custom_athkar.len() {
                eprintln!("no item at position {position}");
                std::process::exit(1);
            }
            let removed = settings.custom_athkar.remove(position - 1);
            store.save(&settings)?;
            println!("removed: {}", removed.text);
        }
        AthkarAction::Morning => print_sequence("🌅 أذكار الصباح", &catalog::morning_athkar()),
        AthkarAction::Evening => print_sequence("🌙 أذكار المساء", &catalog::evening_athkar()),
    }
    Ok(())
}

fn print_sequence(title: &str, sequence: &[RepeatedThikr]) {
    let total = sequence.len();
    for (i, entry) in sequence.iter().enumerate() {
        println!("{title} [{}/{total}]", i + 1);
        println!("{}", entry.text);
        if entry.repeat > 1 {
            println!("(تكرر {} مرة)", entry.repeat);
        }
        if !entry.virtue.is_empty() {
            println!("{}", entry.virtue);
        }
        println!();
    }
}
