pub mod athkar;
pub mod config;
pub mod run;
pub mod show;
pub mod stats;
