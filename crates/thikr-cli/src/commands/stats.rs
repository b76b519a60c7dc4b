use std::error::Error;

use clap::Subcommand;

use thikr_core::SettingsStore;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Show reminder counters
    Show,
    /// Reset counters to zero
    Reset,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn Error>> {
    let store = SettingsStore::open_default()?;
    match action {
        StatsAction::Show => {
            let settings = store.load()?;
            println!("today: {}", settings.stats.daily_count);
            println!("total: {}", settings.stats.total_count);
        }
        StatsAction::Reset => {
            let mut settings = store.load()?;
            settings.stats.daily_count = 0;
            settings.stats.total_count = 0;
            settings.stats.last_reset = None;
            store.save(&settings)?;
            println!("statistics reset");
        }
    }
    Ok(())
}
