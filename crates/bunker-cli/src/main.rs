//! Bunker CLI - play or watch a game at the terminal
//!
//! # Usage
//!
//! ```bash
//! # Take a seat against five agents
//! bunker play --name Ann --bots 5
//!
//! # Watch an all-agent game with a fixed seed
//! bunker play --bots 6 --seed 42
//!
//! # List playable games
//! bunker games
//!
//! # Show the rules and the active configuration
//! bunker rules --config bunker.toml
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;

use commands::{games, play, rules};

/// Bunker - argue for a place in the shelter
///
/// A social-deduction party game: humans and LLM agents argue, a hidden judge
/// keeps score of everyone's suspicion, and each round the table votes one
/// survivor out.
#[derive(Parser)]
#[command(
    name = "bunker",
    version,
    about = "Bunker - social deduction against LLM agents",
    long_about = "The surface is lost and the bunker has too few beds.\n\n\
                  Present yourself, argue, vote. The last survivors win."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play or watch one game
    #[command(name = "play")]
    Play(play::PlayArgs),

    /// List playable games
    #[command(name = "games")]
    Games(games::GamesArgs),

    /// Show rules and configuration
    #[command(name = "rules")]
    Rules(rules::RulesArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Play(args) => play::run(args).await,
        Commands::Games(args) => games::run(args),
        Commands::Rules(args) => rules::run(args),
    }
}

/// Setup logging based on verbosity level
fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();
}

/// Print a success message with a checkmark
pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print an error message with an X
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Print an info message
pub fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}
