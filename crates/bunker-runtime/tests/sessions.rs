//! Lobby lifecycle and concurrent access through the session manager

use std::sync::Arc;

use bunker_core::GameConfig;
use bunker_llm::{Generator, MockProvider};
use bunker_runtime::{
    EngineError, EventKind, GameContext, GameRegistry, LobbyError, LobbyStatus, MemoryJournal,
    RecordingNotifier, SessionManager,
};

struct Harness {
    sessions: SessionManager,
    journal: Arc<MemoryJournal>,
    notifier: Arc<RecordingNotifier>,
}

fn harness_with(config: GameConfig, provider: MockProvider) -> Harness {
    let journal = Arc::new(MemoryJournal::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let ctx = GameContext::new(
        Arc::new(config),
        Generator::new(Arc::new(provider)),
        journal.clone(),
    );
    let sessions = SessionManager::new(ctx, Arc::new(GameRegistry::builtin()), notifier.clone());
    Harness {
        sessions,
        journal,
        notifier,
    }
}

fn config() -> GameConfig {
    let mut config = GameConfig::default();
    config.pacing.bot_turn_delay_ms = 0;
    config.session.seed = Some(11);
    config.director.presentation_probability = 0.0;
    config.director.discussion_probability = 0.0;
    config
}

fn harness(provider: MockProvider) -> Harness {
    harness_with(config(), provider)
}

#[tokio::test]
async fn test_lobby_rules() {
    let h = harness(MockProvider::tabletop());
    let s = &h.sessions;

    assert!(matches!(
        s.create_lobby("chess", "u1", Some("Ann")).await,
        Err(LobbyError::UnknownGame(_))
    ));

    let lobby = s.create_lobby("Bunker", "u1", Some("Ann")).await.unwrap();
    assert!(matches!(
        s.create_lobby("bunker", "u1", Some("Ann")).await,
        Err(LobbyError::AlreadySeated(_))
    ));
    assert!(matches!(
        s.join(&lobby, "u2", "ann").await,
        Err(LobbyError::DuplicateName(_))
    ));

    let summary = s.join(&lobby, "u2", "Vera").await.unwrap();
    assert_eq!(summary.seats, vec!["Ann".to_string(), "Vera".to_string()]);
    assert_eq!(summary.status, LobbyStatus::Open);

    assert!(matches!(s.add_bots(&lobby, "u2", 1).await, Err(LobbyError::NotHost)));
    assert!(matches!(
        s.start(&lobby, "u1").await,
        Err(LobbyError::NotEnoughSeats { have: 2, need: 3 })
    ));
    assert!(matches!(s.add_bots(&lobby, "u1", 9).await, Err(LobbyError::Full { max: 10 })));

    // the human already called Vera keeps the name
    let bots = s.add_bots(&lobby, "u1", 2).await.unwrap();
    assert_eq!(bots, vec!["Oleg".to_string(), "Mira".to_string()]);

    assert!(matches!(
        s.route_message("u1", "hello").await,
        Err(LobbyError::NotRunning)
    ));
    assert!(matches!(
        s.route_message("u7", "hello").await,
        Err(LobbyError::NotSeated(_))
    ));

    // a guest leaving frees their seat
    s.leave("u2").await.unwrap();
    assert_eq!(s.summary(&lobby).await.unwrap().seats.len(), 3);

    // the host leaving closes the lobby
    s.leave("u1").await.unwrap();
    assert_eq!(s.lobby_count().await, 0);
    assert!(s.create_lobby("bunker", "u1", None).await.is_ok());
}

#[tokio::test]
async fn test_bot_only_session_finishes_and_is_closed() {
    let h = harness(MockProvider::tabletop());
    let s = &h.sessions;

    let lobby = s.create_lobby("bunker", "host", None).await.unwrap();
    s.add_bots(&lobby, "host", 4).await.unwrap();
    let events = s.start(&lobby, "host").await.unwrap();

    assert_eq!(events.iter().filter(|e| e.kind == EventKind::GameOver).count(), 1);
    assert_eq!(s.summary(&lobby).await.unwrap().status, LobbyStatus::Finished);
    assert!(matches!(s.route_message("host", "hi").await, Err(LobbyError::NotRunning)));

    // spectators see the table but hold no card
    let view = s.view("host").await.unwrap();
    assert!(view.finished);
    assert!(view.own.is_none());

    assert_eq!(s.close_finished().await, 1);
    assert_eq!(s.lobby_count().await, 0);
    assert!(s.view("host").await.is_none());

    // delivered events match the returned ones
    assert_eq!(h.notifier.delivered().await.len(), events.len());
}

#[tokio::test]
async fn test_failed_scenario_aborts_session() {
    let mut config = config();
    config.session.generate_scenario = true;
    let h = harness_with(config, MockProvider::failing());
    let s = &h.sessions;

    let lobby = s.create_lobby("bunker", "u1", Some("Ann")).await.unwrap();
    s.add_bots(&lobby, "u1", 3).await.unwrap();

    let result = s.start(&lobby, "u1").await;
    assert!(matches!(
        result,
        Err(LobbyError::Engine(EngineError::ScenarioGeneration(_)))
    ));
    assert_eq!(s.lobby_count().await, 0);
    assert!(h
        .notifier
        .seen_by(&lobby, "u1")
        .await
        .iter()
        .any(|e| e.content.contains("could not start")));

    // the host is free to open a new lobby
    assert!(s.create_lobby("bunker", "u1", Some("Ann")).await.is_ok());
}

#[tokio::test]
async fn test_concurrent_final_votes_eliminate_once() {
    let provider = MockProvider::scripted("I stay.")
        .rule("You are Vera. Choose", "{\"target\": \"Oleg\"}")
        .rule("You are Oleg. Choose", "{\"target\": \"Vera\"}")
        .rule("You are Mira. Choose", "{\"target\": \"Oleg\"}");
    let h = harness(provider);
    let s = &h.sessions;

    let lobby = s.create_lobby("bunker", "u1", Some("Ann")).await.unwrap();
    s.join(&lobby, "u2", "Boris").await.unwrap();
    s.add_bots(&lobby, "u1", 3).await.unwrap();
    s.start(&lobby, "u1").await.unwrap();

    // humans speak whenever the turn reaches them
    loop {
        let view = s.view("u1").await.unwrap();
        if view.phase == "voting" {
            break;
        }
        let user = match view.active.as_deref() {
            Some("Ann") => "u1",
            Some("Boris") => "u2",
            other => panic!("turn stopped at {:?}", other),
        };
        s.route_message(user, "I know how to purify water.").await.unwrap();
    }

    let (a, b) = tokio::join!(
        s.route_action("u1", "vote:1:0:Oleg"),
        s.route_action("u2", "vote:1:0:Oleg"),
    );
    a.unwrap();
    b.unwrap();

    let eliminations: Vec<_> = h
        .journal
        .entries(&lobby)
        .await
        .into_iter()
        .filter(|e| e.event_type == "elimination")
        .collect();
    assert_eq!(eliminations.len(), 1);
    assert_eq!(eliminations[0].message, "Oleg");

    let view = s.view("u2").await.unwrap();
    assert_eq!(view.round, 2);
    assert!(!view.table.iter().find(|v| v.name == "Oleg").unwrap().alive);
}

#[tokio::test]
async fn test_leaving_running_game() {
    let h = harness(MockProvider::tabletop());
    let s = &h.sessions;

    let lobby = s.create_lobby("bunker", "u1", Some("Ann")).await.unwrap();
    s.add_bots(&lobby, "u1", 3).await.unwrap();
    s.start(&lobby, "u1").await.unwrap();

    let events = s.leave("u1").await.unwrap();
    assert!(events.iter().any(|e| e.kind == EventKind::GameOver));
    assert_eq!(s.summary(&lobby).await.unwrap().status, LobbyStatus::Finished);
    assert!(matches!(s.leave("u1").await, Err(LobbyError::NotSeated(_))));
}
