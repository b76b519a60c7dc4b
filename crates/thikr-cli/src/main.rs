use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod presenter;

#[derive(Parser)]
#[command(name = "thikr", version, about = "Thikr reminder engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reminder engine
    Run(commands::run::RunArgs),
    /// Show one reminder immediately
    Show(commands::show::ShowArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Reminder statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Remembrance items and sequences
    Athkar {
        #[command(subcommand)]
        action: commands::athkar::AthkarAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Show(args) => commands::show::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Athkar { action } => commands::athkar::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
