//! Play command - Run one game at the terminal
//!
//! Usage:
//! ```bash
//! bunker play --name Ann --bots 5
//! bunker play --bots 6 --seed 42 --journal game.jsonl
//! bunker play --name Ann --provider openai
//! ```

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use bunker_core::GameConfig;
use bunker_llm::{
    Generator, LlmConfig, LlmProvider, MockProvider, OpenAiCompatProvider, RetryConfig,
    RetryingProvider,
};
use bunker_runtime::{
    EventKind, EventLog, FileJournal, GameContext, GameEvent, GameRegistry, MemoryJournal,
    Notifier, NotifyError, PlayerView, SessionManager, GAME_KEY,
};

use crate::{print_error, print_info, print_success};

/// User id of the person at the keyboard
const LOCAL_USER: &str = "local";

/// Arguments for the play command
#[derive(Args)]
pub struct PlayArgs {
    /// Your name at the table; omit to watch an all-agent game
    #[arg(short, long)]
    name: Option<String>,

    /// Number of agent players (default from configuration)
    #[arg(short, long)]
    bots: Option<usize>,

    /// Fixed RNG seed for a reproducible deal
    #[arg(long)]
    seed: Option<u64>,

    /// Generation provider: mock or openai
    #[arg(long, env = "BUNKER_LLM_PROVIDER", default_value = "mock")]
    provider: String,

    /// TOML file layered over the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Append the session journal to this JSONL file
    #[arg(long)]
    journal: Option<PathBuf>,

    /// Ask the model for a fresh scenario instead of a preset
    #[arg(long)]
    generate_scenario: bool,

    /// Pause between agent turns, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

/// Prints the events addressed to the local player
#[derive(Debug)]
struct TerminalNotifier;

#[async_trait]
impl Notifier for TerminalNotifier {
    fn name(&self) -> &str {
        "terminal"
    }

    async fn deliver(&self, _session: &str, event: &GameEvent) -> Result<(), NotifyError> {
        if !event.reaches(LOCAL_USER) {
            return Ok(());
        }
        match event.kind {
            EventKind::Message => println!("{}", event.content),
            EventKind::EditMessage | EventKind::CallbackAnswer => {
                println!("{}", event.content.dimmed())
            }
            EventKind::UpdateDashboard => println!("\n{}\n", event.content.cyan()),
            EventKind::SwitchTurn => println!("{}", event.content.yellow()),
            EventKind::GameOver => println!("\n{}", event.content.bold().green()),
        }
        if !event.buttons.is_empty() {
            let options: Vec<String> = event.buttons.iter().map(|b| format!("[{}]", b.label)).collect();
            println!("  {} {}", options.join(" ").green(), "(answer with /vote <name>)".dimmed());
        }
        Ok(())
    }
}

fn build_provider(kind: &str) -> Result<Arc<dyn LlmProvider>> {
    let mut llm = LlmConfig::from_env();
    llm.provider = kind.to_string();

    if llm.is_remote() {
        let retry = RetryConfig {
            max_retries: llm.max_retries,
            ..RetryConfig::default()
        };
        return Ok(Arc::new(RetryingProvider::new(
            OpenAiCompatProvider::from_config(&llm),
            retry,
        )));
    }
    if kind.eq_ignore_ascii_case("mock") {
        return Ok(Arc::new(MockProvider::tabletop()));
    }
    bail!("Unknown provider '{}': use mock or openai", kind)
}

fn print_view(view: &PlayerView) {
    println!(
        "{} round {}, {}",
        "▸".cyan(),
        view.round.to_string().bold(),
        view.phase
    );
    println!("  {}", view.topic.dimmed());
    if let Some(own) = &view.own {
        let a = &own.attributes;
        println!(
            "  {} {} | {} | {} | {}",
            "You:".bold(),
            own.name.green(),
            a.profession,
            a.personal_trait,
            a.personality.name
        );
    }
    for seat in &view.table {
        println!("  {} {}", "•".cyan(), seat);
    }
    if let Some(active) = &view.active {
        println!("  {} {}", "Speaking:".dimmed(), active.yellow());
    }
}

/// Run the play command
pub async fn run(args: PlayArgs) -> Result<()> {
    let mut config = GameConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(seed) = args.seed {
        config.session.seed = Some(seed);
    }
    if let Some(delay) = args.delay_ms {
        config.pacing.bot_turn_delay_ms = delay;
    }
    if args.generate_scenario {
        config.session.generate_scenario = true;
    }
    let bots = args.bots.unwrap_or(config.session.default_bots);

    let provider = build_provider(&args.provider)?;
    let journal: Arc<dyn EventLog> = match &args.journal {
        Some(path) => Arc::new(FileJournal::new(path)),
        None => Arc::new(MemoryJournal::new()),
    };
    print_info(&format!("Generation provider: {}", provider.name()));

    let ctx = GameContext::new(Arc::new(config), Generator::new(provider), journal);
    let sessions = SessionManager::new(ctx, Arc::new(GameRegistry::builtin()), Arc::new(TerminalNotifier));

    let lobby = sessions
        .create_lobby(GAME_KEY, LOCAL_USER, args.name.as_deref())
        .await?;
    let seated = sessions.add_bots(&lobby, LOCAL_USER, bots).await?;
    print_success(&format!("Agents at the table: {}", seated.join(", ")));
    tracing::debug!(lobby = %lobby, bots = seated.len(), human = args.name.is_some(), "Table ready");

    sessions.start(&lobby, LOCAL_USER).await?;
    if args.name.is_none() {
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let result = match line {
            "" => continue,
            "/quit" => {
                sessions.leave(LOCAL_USER).await?;
                break;
            }
            "/view" => {
                match sessions.view(LOCAL_USER).await {
                    Some(view) => print_view(&view),
                    None => print_error("No game in progress"),
                }
                continue;
            }
            text => sessions.route_message(LOCAL_USER, text).await,
        };
        if let Err(e) = result {
            print_error(&e.to_string());
        }

        if sessions.view(LOCAL_USER).await.map_or(true, |v| v.finished) {
            break;
        }
    }

    if let Some(path) = &args.journal {
        print_info(&format!("Journal written to {}", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_terminal_notifier_accepts_everything() {
        let notifier = TerminalNotifier;
        let private = GameEvent::to("someone-else", EventKind::Message, "hidden");
        assert!(notifier.deliver("s1", &private).await.is_ok());
        let public = GameEvent::broadcast(EventKind::GameOver, "done");
        assert!(notifier.deliver("s1", &public).await.is_ok());
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        assert!(build_provider("mock").is_ok());
        assert!(build_provider("carrier-pigeon").is_err());
    }
}
