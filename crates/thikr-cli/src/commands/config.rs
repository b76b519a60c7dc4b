use std::error::Error;

use clap::Subcommand;

use thikr_core::{Settings, SettingsStore};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "reminder.interval_minutes")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults (statistics included)
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn Error>> {
    let store = SettingsStore::open_default()?;
    match action {
        ConfigAction::Get { key } => match store.get(&key)? {
            Some(value) => println!("{value}"),
            None => {
                eprintln!("unknown key: {key}");
                std::process::exit(1);
            }
        },
        ConfigAction::Set { key, value } => {
            store.set(&key, &value)?;
            println!("ok");
        }
        ConfigAction::List => {
            let settings = store.load()?;
            let json = serde_json::to_string_pretty(&settings)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            store.save(&Settings::default())?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
