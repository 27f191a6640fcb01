//! Games command - List playable game variants
//!
//! Usage:
//! ```bash
//! bunker games
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

use bunker_runtime::GameRegistry;

/// Arguments for the games command
#[derive(Args)]
pub struct GamesArgs;

/// Run the games command
pub fn run(_args: GamesArgs) -> Result<()> {
    let registry = GameRegistry::builtin();

    println!("{}", "Playable games".bold().cyan());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Key").fg(Color::Cyan),
            Cell::new("Title").fg(Color::Cyan),
            Cell::new("Summary").fg(Color::Cyan),
        ]);

    for game in registry.list() {
        table.add_row(vec![
            Cell::new(game.key).fg(Color::Green),
            Cell::new(game.title),
            Cell::new(game.summary),
        ]);
    }

    println!("{table}");
    println!();
    println!("Start one: {}", "bunker play --name <you> --bots 5".green());

    Ok(())
}
