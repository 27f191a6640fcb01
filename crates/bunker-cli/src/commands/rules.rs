//! Rules command - Show how a game plays under the active configuration
//!
//! Usage:
//! ```bash
//! bunker rules
//! bunker rules --config bunker.toml
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use bunker_core::GameConfig;

/// Arguments for the rules command
#[derive(Args)]
pub struct RulesArgs {
    /// TOML file layered over the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Run the rules command
pub fn run(args: RulesArgs) -> Result<()> {
    let config = GameConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let version = env!("CARGO_PKG_VERSION");

    println!("{}", "Bunker".bold().cyan());
    println!("{}", "═".repeat(50).cyan());
    println!("  {} {}", "Version:".dimmed(), version.green());
    println!();

    println!("{}", "How a round plays:".bold());
    println!("  {} Presentation: everyone introduces themselves", "1.".cyan());
    println!("  {} Discussion: the round's crisis is argued", "2.".cyan());
    println!("  {} Voting: one survivor is voted out", "3.".cyan());
    println!(
        "  {} A tie sends the leaders to a runoff ({} allowed), then the lot decides",
        "4.".cyan(),
        config.voting.max_runoffs
    );
    println!();

    println!("{}", "Winning:".bold());
    println!(
        "  {} The game ends when {} or fewer remain",
        "•".cyan(),
        config.session.target_survivors
    );
    println!("  {} Humans lose once none of them is left", "•".cyan());
    println!();

    println!("{}", "Visibility:".bold());
    println!(
        "  {} Traits are public from round {}",
        "•".cyan(),
        config.visibility.reveal_trait_from
    );
    println!(
        "  {} Statuses are public from round {}",
        "•".cyan(),
        config.visibility.reveal_status_from
    );
    println!();

    println!("{}", "Judge violations:".bold());
    for tag in config.suspicion.known_tags() {
        let weight = config.suspicion.weight(tag).unwrap_or_default();
        println!("  {} {:<14} {}", "•".cyan(), tag.green(), format!("+{}", weight).yellow());
    }
    println!();

    println!("{}", "Scenarios:".bold());
    for scenario in &config.catalog.scenarios {
        println!("  {} {}", "•".cyan(), scenario.title.green());
    }
    println!();

    println!("{}", "Commands during play:".bold());
    println!("  {} {}", "/vote <name>".green(), "cast your ballot".dimmed());
    println!("  {} {}", "/view".green(), "show your card and the table".dimmed());
    println!("  {} {}", "/quit".green(), "leave the game".dimmed());

    Ok(())
}
