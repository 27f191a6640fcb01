//! Static table of playable games
//!
//! Built once at startup and handed to the session manager. There is no
//! discovery: a variant is playable when it is listed here.

use crate::bunker::{BunkerGame, GAME_KEY};
use crate::engine::GameEngine;

/// Builds a fresh engine for a session id
pub type EngineFactory = fn(&str) -> Box<dyn GameEngine>;

#[derive(Debug, Clone)]
pub struct GameDescriptor {
    pub key: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
    pub factory: EngineFactory,
}

#[derive(Debug, Clone, Default)]
pub struct GameRegistry {
    games: Vec<GameDescriptor>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every game shipped with the runtime
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(GameDescriptor {
            key: GAME_KEY,
            title: "Bunker",
            summary: "Argue for a place in the shelter. Each round the table votes one survivor out.",
            factory: BunkerGame::boxed,
        });
        registry
    }

    /// Add a variant; returns false if the key is taken
    pub fn register(&mut self, descriptor: GameDescriptor) -> bool {
        if self.get(descriptor.key).is_some() {
            tracing::warn!(key = descriptor.key, "Game already registered");
            return false;
        }
        self.games.push(descriptor);
        true
    }

    pub fn get(&self, key: &str) -> Option<&GameDescriptor> {
        self.games.iter().find(|g| g.key.eq_ignore_ascii_case(key))
    }

    pub fn list(&self) -> &[GameDescriptor] {
        &self.games
    }
}
