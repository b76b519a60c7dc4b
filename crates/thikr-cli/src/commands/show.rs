//! One-off reminder, independent of the daemon.

use std::error::Error;

use chrono::{Local, Utc};
use clap::Args;

use thikr_core::{catalog, Emission, EmissionSource, ReminderContent, SettingsStore};

use crate::presenter::Presenter;

#[derive(Args)]
pub struct ShowArgs {
    /// Show a surah passage instead of an ordinary item
    #[arg(long)]
    pub surah: bool,
}

pub fn run(args: ShowArgs) -> Result<(), Box<dyn Error>> {
    let store = SettingsStore::open_default()?;
    let settings = store.load()?;

    let content = if args.surah {
        ReminderContent::Surah(catalog::pick_surah())
    } else {
        ReminderContent::Thikr(catalog::pick_thikr(&settings.custom_athkar))
    };
    let emission = Emission::new(content, EmissionSource::Manual, Utc::now());

    let mut presenter = Presenter::new();
    presenter.show(&emission, settings.reminder.show_virtue, Utc::now());
    store.increment_counters(Local::now())?;
    Ok(())
}
