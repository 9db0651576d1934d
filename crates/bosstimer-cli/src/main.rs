use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

/// Log filter directives, e.g. `BOSSTIMER_LOG=bosstimer_core=debug`.
const LOG_ENV: &str = "BOSSTIMER_LOG";

#[derive(Parser)]
#[command(name = "bosstimer", version, about = "Field boss respawn tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Boss reference data
    Boss {
        #[command(subcommand)]
        action: commands::boss::BossAction,
    },
    /// Record a boss cut
    Cut {
        #[command(subcommand)]
        action: commands::cut::CutAction,
    },
    /// Show the respawn board
    Board {
        /// Print the board as JSON
        #[arg(long)]
        json: bool,
    },
    /// Redraw the board on the refresh cadence
    Watch(commands::watch::WatchArgs),
    /// Event mode
    Mode {
        #[command(subcommand)]
        action: commands::mode::ModeAction,
    },
    /// Delete every cut record and switch event mode
    Reset(commands::reset::ResetArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Boss { action } => commands::boss::run(action),
        Commands::Cut { action } => commands::cut::run(action),
        Commands::Board { json } => commands::board::run(json),
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Mode { action } => commands::mode::run(action),
        Commands::Reset(args) => commands::reset::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
