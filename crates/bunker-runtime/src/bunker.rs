//! The Bunker game
//!
//! Phase state machine: presentation -> discussion -> voting, then either the
//! next round or a runoff among tied leaders followed by another vote. The
//! loop in [`BunkerGame::process_turn`] keeps driving agent turns until a human
//! must act or the game ends; no phase calls into the next one recursively.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::json;

use bunker_core::{
    ParticipantId, ParticipantRegistry, PublicView, RegistryError, Scenario, SeatRequest,
};
use bunker_vote::{resolve, BallotBox, CastOutcome, Resolution, VoteScope};

use crate::agent::{AgentFacade, Scene};
use crate::context::GameContext;
use crate::engine::{EngineError, GameEngine, PlayerView, Rejection};
use crate::events::{EventKind, GameEvent, ReplyButton, DASHBOARD_TOKEN};
use crate::journal::LogEntry;
use crate::notify::Outbox;
use crate::phase::{GameState, Outcome, Phase};
use crate::scheduler::{current_active_list, TurnCursor};

pub const GAME_KEY: &str = "bunker";

/// Owned snapshot of what agents see; borrowed as a [`Scene`]
struct SceneData {
    round: u32,
    phase: Phase,
    topic: String,
    catastrophe: String,
    table: Vec<PublicView>,
    transcript: String,
    runoff_candidates: Vec<String>,
}

impl SceneData {
    fn scene(&self) -> Scene<'_> {
        Scene {
            round: self.round,
            phase: self.phase,
            topic: &self.topic,
            catastrophe: &self.catastrophe,
            table: &self.table,
            transcript: &self.transcript,
            runoff_candidates: &self.runoff_candidates,
        }
    }
}

/// Target named by a `/vote <name>` message. `/voter` and the like are speech.
fn vote_command(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("/vote")?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then(|| rest.trim())
}

#[derive(Debug)]
pub struct BunkerGame {
    session: String,
    registry: ParticipantRegistry,
    state: GameState,
    ballots: BallotBox,
    cursor: TurnCursor,
    rng: StdRng,
    /// Human who has been told it is their turn
    awaiting: Option<ParticipantId>,
    started_with_humans: bool,
    initialized: bool,
}

impl BunkerGame {
    pub fn new(session: &str) -> Self {
        Self {
            session: session.to_string(),
            registry: ParticipantRegistry::default(),
            state: GameState::new(Scenario::new("", "", &[])),
            ballots: BallotBox::new(),
            cursor: TurnCursor::default(),
            rng: StdRng::from_entropy(),
            awaiting: None,
            started_with_humans: false,
            initialized: false,
        }
    }

    /// Registry factory
    pub fn boxed(session: &str) -> Box<dyn GameEngine> {
        Box::new(Self::new(session))
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn participants(&self) -> &ParticipantRegistry {
        &self.registry
    }

    pub fn ballots(&self) -> &BallotBox {
        &self.ballots
    }

    pub fn cursor(&self) -> &TurnCursor {
        &self.cursor
    }

    fn name_of(&self, id: ParticipantId) -> Result<String, EngineError> {
        self.registry
            .get(id)
            .map(|p| p.name.clone())
            .ok_or_else(|| RegistryError::NotFound(id.to_string()).into())
    }

    fn scene_data(&self, ctx: &GameContext) -> SceneData {
        SceneData {
            round: self.state.round,
            phase: self.state.phase,
            topic: self.state.topic().to_string(),
            catastrophe: self.state.scenario.catastrophe.clone(),
            table: self.registry.public_table(self.state.round, &ctx.config.visibility),
            transcript: self
                .state
                .transcript
                .render_window(ctx.config.pacing.transcript_window),
            runoff_candidates: self.state.runoff.candidates.clone(),
        }
    }

    /// Voters are alive participants with at least one valid target
    fn vote_scope(&self, ctx: &GameContext) -> VoteScope {
        let alive: Vec<String> = self.registry.alive().map(|p| p.name.clone()).collect();
        let targets = if self.state.runoff.is_active() {
            self.state.runoff.candidates.clone()
        } else {
            alive.clone()
        };
        let mut scope = VoteScope::new(Vec::new(), targets, ctx.config.voting.allow_self_vote);
        let voters: Vec<String> = alive
            .into_iter()
            .filter(|v| !scope.targets_for(v).is_empty())
            .collect();
        scope.voters = voters;
        scope
    }

    fn ballot_token(&self) -> String {
        format!("vote:{}:{}", self.state.round, self.state.runoff.count)
    }

    /// Most suspicious other participant, if anyone crossed the clear-target threshold
    fn clear_target(&self, ctx: &GameContext, observer: ParticipantId) -> Option<String> {
        self.registry
            .most_suspicious(observer, ctx.config.director.clear_target_threshold)
            .map(str::to_string)
    }

    fn restart_cursor(&mut self) {
        self.cursor = TurnCursor::start(current_active_list(&self.state, &self.registry));
        self.awaiting = None;
    }

    async fn announce(&self, out: &mut Outbox, text: impl Into<String>) {
        out.emit(GameEvent::broadcast(EventKind::Message, text)).await;
    }

    async fn dashboard(&self, ctx: &GameContext, out: &mut Outbox) {
        let mut lines = vec![
            format!("Round {} - {}", self.state.round, self.state.phase),
            self.state.topic().to_string(),
        ];
        lines.extend(
            self.registry
                .public_table(self.state.round, &ctx.config.visibility)
                .iter()
                .map(|v| v.to_string()),
        );
        out.emit(
            GameEvent::broadcast(EventKind::UpdateDashboard, lines.join("\n")).with_token(DASHBOARD_TOKEN),
        )
        .await;
    }

    async fn send_ballot(&self, out: &mut Outbox, scope: &VoteScope, user_id: &str, name: &str) {
        let token = self.ballot_token();
        let buttons = scope
            .targets_for(name)
            .iter()
            .map(|t| ReplyButton::new(t, &format!("{}:{}", token, t)))
            .collect();
        out.emit(
            GameEvent::to(user_id, EventKind::Message, "Who should leave the bunker?")
                .with_buttons(buttons)
                .with_token(token),
        )
        .await;
    }

    async fn begin_voting(&mut self, ctx: &GameContext, out: &mut Outbox) {
        self.state.phase = Phase::Voting;
        self.ballots.clear();
        self.cursor = TurnCursor::default();
        self.awaiting = None;

        let scope = self.vote_scope(ctx);
        self.state
            .transcript
            .system(self.state.round, &format!("Voting. On the ballot: {}", scope.targets.join(", ")));
        self.announce(out, format!("Voting begins. On the ballot: {}", scope.targets.join(", ")))
            .await;

        let humans: Vec<(String, String)> = self
            .registry
            .alive()
            .filter_map(|p| p.user_id().map(|u| (u.to_string(), p.name.clone())))
            .filter(|(_, name)| scope.voter(name).is_some())
            .collect();
        for (user_id, name) in humans {
            self.send_ballot(out, &scope, &user_id, &name).await;
        }
    }

    /// A speaking phase ran out of speakers
    async fn advance_phase(&mut self, ctx: &GameContext, out: &mut Outbox) {
        match self.state.phase {
            Phase::Presentation => {
                self.state.phase = Phase::Discussion;
                self.restart_cursor();
                let topic = self.state.topic().to_string();
                self.state
                    .transcript
                    .system(self.state.round, &format!("Discussion: {}", topic));
                self.announce(out, format!("Discussion. {}", topic)).await;
            }
            Phase::Discussion | Phase::Runoff => self.begin_voting(ctx, out).await,
            Phase::Voting => return,
        }

        tracing::info!(session = %self.session, round = self.state.round, phase = %self.state.phase, "Phase started");
        ctx.record(
            &self.session,
            LogEntry::new("phase", self.state.phase.to_string()).with_details(json!({ "round": self.state.round })),
        )
        .await;
        self.dashboard(ctx, out).await;
    }

    async fn start_runoff(&mut self, ctx: &GameContext, out: &mut Outbox, candidates: Vec<String>) {
        self.state.runoff.begin(candidates);
        self.state.phase = Phase::Runoff;
        self.ballots.clear();
        self.restart_cursor();

        let names = self.state.runoff.candidates.join(" and ");
        self.state
            .transcript
            .system(self.state.round, &format!("Tie between {}. Runoff.", names));
        self.announce(out, format!("Tie between {}. Each of them speaks once more, then we vote again.", names))
            .await;

        tracing::info!(session = %self.session, round = self.state.round, candidates = %names, "Runoff started");
        ctx.record(
            &self.session,
            LogEntry::new("runoff", names).with_details(json!({ "attempt": self.state.runoff.count })),
        )
        .await;
        self.dashboard(ctx, out).await;
    }

    async fn next_round(&mut self, ctx: &GameContext, out: &mut Outbox) {
        self.state.round += 1;
        self.state.phase = Phase::Presentation;
        self.state.runoff.reset();
        self.ballots.clear();
        self.restart_cursor();

        let topic = self.state.topic().to_string();
        self.state
            .transcript
            .system(self.state.round, &format!("Round {}: {}", self.state.round, topic));
        self.announce(out, format!("Round {}. {}", self.state.round, topic)).await;

        tracing::info!(session = %self.session, round = self.state.round, "Round started");
        ctx.record(&self.session, LogEntry::new("round", topic)).await;
        self.dashboard(ctx, out).await;
    }

    /// Ends the game when a terminal condition holds; defeat wins over victory
    async fn check_terminal(&mut self, ctx: &GameContext, out: &mut Outbox) -> bool {
        if self.state.is_over() {
            return true;
        }
        let outcome = if self.started_with_humans && self.registry.alive_humans() == 0 {
            Outcome::Defeat
        } else if self.registry.alive_count() <= ctx.config.session.target_survivors {
            Outcome::Victory
        } else {
            return false;
        };

        self.state.outcome = Some(outcome);
        self.awaiting = None;
        let survivors: Vec<String> = self.registry.alive().map(|p| p.name.clone()).collect();
        let text = format!("{}\nSurvivors: {}", outcome.headline(), survivors.join(", "));
        self.state.transcript.system(self.state.round, outcome.headline());

        tracing::info!(session = %self.session, round = self.state.round, outcome = ?outcome, "Game over");
        ctx.record(
            &self.session,
            LogEntry::new("game_over", outcome.headline()).with_details(json!({ "survivors": survivors })),
        )
        .await;
        out.emit(GameEvent::broadcast(EventKind::GameOver, text)).await;
        true
    }

    async fn eliminate(
        &mut self,
        ctx: &GameContext,
        out: &mut Outbox,
        name: &str,
        votes: usize,
        forced: bool,
    ) -> Result<(), EngineError> {
        let id = self
            .registry
            .by_name(name)
            .map(|p| p.id)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        self.registry.eliminate(id)?;
        self.state.transcript.mark_eliminated(id, name);
        self.state
            .transcript
            .system(self.state.round, &format!("{} was voted out of the bunker.", name));

        let how = if forced { " The tie was broken by lot." } else { "" };
        self.announce(out, format!("{} is out with {} vote(s).{}", name, votes, how)).await;
        ctx.record(
            &self.session,
            LogEntry::new("elimination", name).with_details(json!({ "votes": votes, "forced": forced })),
        )
        .await;
        self.dashboard(ctx, out).await;

        if !self.check_terminal(ctx, out).await {
            self.next_round(ctx, out).await;
        }
        Ok(())
    }

    async fn cast_agent_votes(&mut self, ctx: &GameContext, out: &mut Outbox) -> Result<(), EngineError> {
        let scope = self.vote_scope(ctx);
        let pending: Vec<(ParticipantId, String)> = self
            .registry
            .alive()
            .filter(|p| !p.is_human() && scope.voter(&p.name).is_some() && !self.ballots.has_voted(&p.name))
            .map(|p| (p.id, p.name.clone()))
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        let data = self.scene_data(ctx);
        let agents = AgentFacade::new(ctx);
        for (id, name) in pending {
            let candidates = scope.targets_for(&name);
            let ranking = self.registry.threat_ranking(id, &candidates)?;
            let me = self
                .registry
                .own_card(id)
                .ok_or_else(|| RegistryError::NotFound(name.clone()))?;

            let Some(choice) = agents
                .vote(&me, &data.scene(), &candidates, &ranking, &mut self.rng)
                .await
            else {
                continue;
            };
            if self.ballots.cast(&scope, &name, &choice.target).is_accepted() {
                self.announce(out, format!("{} has voted.", name)).await;
                ctx.record(
                    &self.session,
                    LogEntry::new("vote", format!("{} -> {}", name, choice.target))
                        .with_details(json!({ "source": choice.source })),
                )
                .await;
            }
        }
        Ok(())
    }

    /// Resolve once the quota is met; returns whether the state moved on
    async fn try_resolve(&mut self, ctx: &GameContext, out: &mut Outbox) -> Result<bool, EngineError> {
        let scope = self.vote_scope(ctx);
        let Some(resolution) = resolve(
            &self.ballots,
            scope.quota(),
            &self.state.runoff,
            &ctx.config.voting,
            &mut self.rng,
        ) else {
            return Ok(false);
        };

        let tally = self
            .ballots
            .tally()
            .iter()
            .map(|(t, n)| format!("{} {}", t, n))
            .collect::<Vec<_>>()
            .join(", ");
        self.announce(out, format!("Votes: {}", tally)).await;

        match resolution {
            Resolution::Runoff { candidates } => self.start_runoff(ctx, out, candidates).await,
            Resolution::Eliminate { name, votes, forced } => {
                self.eliminate(ctx, out, &name, votes, forced).await?
            }
        }
        Ok(true)
    }

    /// Record an utterance, judge it and pass the turn on
    async fn deliver_speech(
        &mut self,
        ctx: &GameContext,
        out: &mut Outbox,
        id: ParticipantId,
        text: &str,
    ) -> Result<(), EngineError> {
        let name = self.name_of(id)?;
        self.registry.record_speech(id, text)?;
        self.state.transcript.speech(self.state.round, id, &name, text);
        self.announce(out, format!("{}: {}", name, text)).await;

        let card = self
            .registry
            .own_card(id)
            .ok_or_else(|| RegistryError::NotFound(name.clone()))?;
        let verdict = AgentFacade::new(ctx)
            .judge(&card, text, self.state.topic(), self.state.round)
            .await;
        let status = self.registry.apply_verdict(id, &verdict, &ctx.config.suspicion)?;
        if status != card.status {
            tracing::info!(session = %self.session, participant = %name, from = %card.status, to = %status, "Status changed");
        }
        ctx.record(
            &self.session,
            LogEntry::new("judge", format!("{}: {}", name, verdict.violation_tag)).with_details(json!({
                "argument_quality": verdict.argument_quality,
                "commentary": verdict.commentary,
                "status": status,
            })),
        )
        .await;

        self.cursor.advance();
        self.awaiting = None;
        Ok(())
    }

    /// Seated, alive participant behind `user_id`
    fn actor(&self, user_id: &str) -> Result<(ParticipantId, String), Rejection> {
        let participant = self.registry.by_user(user_id).ok_or(Rejection::NotSeated)?;
        if self.state.is_over() {
            return Err(Rejection::GameOver);
        }
        if !participant.alive {
            return Err(Rejection::Eliminated);
        }
        Ok((participant.id, participant.name.clone()))
    }

    async fn human_vote(
        &mut self,
        ctx: &GameContext,
        out: &mut Outbox,
        user_id: &str,
        target: &str,
        reply_kind: EventKind,
    ) -> Result<(), EngineError> {
        let name = match self.actor(user_id) {
            Ok((_, name)) => name,
            Err(rejection) => {
                out.emit(rejection.event(user_id, reply_kind)).await;
                return Ok(());
            }
        };
        if self.state.phase != Phase::Voting {
            out.emit(Rejection::NotVoting.event(user_id, reply_kind)).await;
            return Ok(());
        }

        let scope = self.vote_scope(ctx);
        let outcome = self.ballots.cast(&scope, &name, target);
        if outcome != CastOutcome::Accepted {
            out.emit(Rejection::Ballot(outcome).event(user_id, reply_kind)).await;
            return Ok(());
        }

        let target = scope.target(target).unwrap_or(target).to_string();
        out.emit(GameEvent::to(user_id, EventKind::CallbackAnswer, outcome.notice())).await;
        out.emit(
            GameEvent::to(user_id, EventKind::EditMessage, format!("You voted for {}.", target))
                .with_token(self.ballot_token()),
        )
        .await;
        self.announce(out, format!("{} has voted.", name)).await;
        ctx.record(&self.session, LogEntry::new("vote", format!("{} -> {}", name, target)))
            .await;

        self.process_turn(ctx, out).await
    }
}

#[async_trait]
impl GameEngine for BunkerGame {
    fn key(&self) -> &'static str {
        GAME_KEY
    }

    async fn init(
        &mut self,
        ctx: &GameContext,
        seats: &[SeatRequest],
        out: &mut Outbox,
    ) -> Result<(), EngineError> {
        let config = &ctx.config;
        if seats.len() < config.session.min_seats {
            return Err(EngineError::NotEnoughParticipants {
                have: seats.len(),
                need: config.session.min_seats,
            });
        }
        if let Some(seed) = config.session.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }

        let scenario = if config.session.generate_scenario {
            AgentFacade::new(ctx).scenario(&config.catalog).await?
        } else {
            config
                .catalog
                .scenarios
                .choose(&mut self.rng)
                .cloned()
                .ok_or_else(|| EngineError::ScenarioGeneration("scenario catalog is empty".into()))?
        };

        self.registry = ParticipantRegistry::deal(seats, &config.catalog, &mut self.rng)?;
        self.started_with_humans = self.registry.has_humans();
        self.state = GameState::new(scenario);
        self.ballots.clear();
        self.restart_cursor();
        self.initialized = true;

        let topic = self.state.topic().to_string();
        self.state.transcript.system(1, &format!("Round 1: {}", topic));
        tracing::info!(
            session = %self.session,
            scenario = %self.state.scenario.title,
            seats = self.registry.len(),
            humans = self.started_with_humans,
            "Session started"
        );
        ctx.record(
            &self.session,
            LogEntry::new("session_start", self.state.scenario.title.clone()).with_details(json!({
                "seats": self.registry.all().iter().map(|p| p.name.clone()).collect::<Vec<_>>(),
            })),
        )
        .await;

        self.announce(
            out,
            format!("{}\n\nRound 1. {}", self.state.scenario.catastrophe, topic),
        )
        .await;
        let cards: Vec<(String, String)> = self
            .registry
            .all()
            .iter()
            .filter_map(|p| Some((p.user_id()?.to_string(), self.registry.own_card(p.id)?)))
            .map(|(user_id, card)| {
                let a = &card.attributes;
                (
                    user_id,
                    format!(
                        "Your card, {}:\nProfession: {}\nTrait: {}\nPersonality: {}",
                        card.name, a.profession, a.personal_trait, a.personality.name
                    ),
                )
            })
            .collect();
        for (user_id, card) in cards {
            out.emit(GameEvent::to(&user_id, EventKind::Message, card)).await;
        }
        self.dashboard(ctx, out).await;
        Ok(())
    }

    async fn process_turn(&mut self, ctx: &GameContext, out: &mut Outbox) -> Result<(), EngineError> {
        if !self.initialized {
            return Err(EngineError::NotStarted);
        }

        while !self.state.is_over() {
            if self.state.phase == Phase::Voting {
                self.cast_agent_votes(ctx, out).await?;
                if !self.try_resolve(ctx, out).await? {
                    // waiting on human ballots
                    break;
                }
                continue;
            }

            let Some(current) = self.cursor.current() else {
                self.advance_phase(ctx, out).await;
                continue;
            };
            let Some(participant) = self.registry.get(current).filter(|p| p.alive) else {
                self.cursor.advance();
                continue;
            };

            if let Some(user_id) = participant.user_id() {
                if self.awaiting != Some(current) {
                    let user_id = user_id.to_string();
                    let name = participant.name.clone();
                    self.awaiting = Some(current);
                    out.emit(GameEvent::broadcast(
                        EventKind::SwitchTurn,
                        format!("It is {}'s turn to speak.", name),
                    ))
                    .await;
                    out.emit(GameEvent::to(
                        &user_id,
                        EventKind::Message,
                        format!("Your turn, {}. {}", name, self.state.topic()),
                    ))
                    .await;
                }
                break;
            }

            self.execute_bot_turn(ctx, current, out).await?;
            let delay = ctx.config.pacing.bot_turn_delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(())
    }

    async fn execute_bot_turn(
        &mut self,
        ctx: &GameContext,
        participant: ParticipantId,
        out: &mut Outbox,
    ) -> Result<(), EngineError> {
        let (me, last_speech) = match self.registry.get(participant) {
            Some(p) if p.alive && !p.is_human() => (
                self.registry
                    .own_card(participant)
                    .ok_or_else(|| RegistryError::NotFound(p.name.clone()))?,
                p.last_speech().map(str::to_string),
            ),
            Some(p) => {
                tracing::warn!(session = %self.session, participant = %p.name, "Not an active agent, skipping turn");
                return Ok(());
            }
            None => return Err(RegistryError::NotFound(participant.to_string()).into()),
        };

        let data = self.scene_data(ctx);
        let clear_target = self.clear_target(ctx, participant);
        let agents = AgentFacade::new(ctx);

        let nudge = if agents.wants_nudge(data.phase, clear_target.is_some(), &mut self.rng) {
            agents
                .director_nudge(&me, &data.scene(), clear_target.as_deref())
                .await
        } else {
            None
        };
        if let Some(nudge) = &nudge {
            ctx.record(
                &self.session,
                LogEntry::new("director", format!("{}: {}", me.name, nudge)),
            )
            .await;
        }

        let text = agents
            .speech(&me, last_speech.as_deref(), &data.scene(), nudge.as_deref())
            .await;
        self.deliver_speech(ctx, out, participant, &text).await
    }

    async fn process_message(
        &mut self,
        ctx: &GameContext,
        user_id: &str,
        text: &str,
        out: &mut Outbox,
    ) -> Result<(), EngineError> {
        if !self.initialized {
            return Err(EngineError::NotStarted);
        }
        let text = text.trim();
        if let Some(target) = vote_command(text) {
            return self
                .human_vote(ctx, out, user_id, target, EventKind::Message)
                .await;
        }

        let id = match self.actor(user_id) {
            Ok((id, _)) => id,
            Err(rejection) => {
                out.emit(rejection.event(user_id, EventKind::Message)).await;
                return Ok(());
            }
        };
        let rejection = if self.state.phase == Phase::Voting {
            Some(Rejection::VotingInProgress)
        } else if self.cursor.current() != Some(id) {
            Some(Rejection::NotYourTurn)
        } else if text.is_empty() {
            Some(Rejection::EmptyMessage)
        } else {
            None
        };
        if let Some(rejection) = rejection {
            out.emit(rejection.event(user_id, EventKind::Message)).await;
            return Ok(());
        }

        self.deliver_speech(ctx, out, id, text).await?;
        self.process_turn(ctx, out).await
    }

    async fn handle_action(
        &mut self,
        ctx: &GameContext,
        user_id: &str,
        data: &str,
        out: &mut Outbox,
    ) -> Result<(), EngineError> {
        if !self.initialized {
            return Err(EngineError::NotStarted);
        }
        let parts: Vec<&str> = data.splitn(4, ':').collect();
        let [kind, round, attempt, target] = parts.as_slice() else {
            out.emit(Rejection::UnknownAction.event(user_id, EventKind::CallbackAnswer))
                .await;
            return Ok(());
        };
        if *kind != "vote" {
            out.emit(Rejection::UnknownAction.event(user_id, EventKind::CallbackAnswer))
                .await;
            return Ok(());
        }

        let current = self.state.phase == Phase::Voting
            && round.parse::<u32>().ok() == Some(self.state.round)
            && attempt.parse::<u32>().ok() == Some(self.state.runoff.count);
        if !current {
            out.emit(Rejection::ExpiredBallot.event(user_id, EventKind::CallbackAnswer))
                .await;
            return Ok(());
        }

        self.human_vote(ctx, out, user_id, target, EventKind::CallbackAnswer)
            .await
    }

    async fn player_leave(
        &mut self,
        ctx: &GameContext,
        user_id: &str,
        out: &mut Outbox,
    ) -> Result<(), EngineError> {
        if !self.initialized {
            return Err(EngineError::NotStarted);
        }
        let Some((id, name)) = self
            .registry
            .by_user(user_id)
            .filter(|p| p.alive)
            .map(|p| (p.id, p.name.clone()))
        else {
            return Ok(());
        };
        if self.state.is_over() {
            return Ok(());
        }

        self.registry.eliminate(id)?;
        self.state
            .transcript
            .system(self.state.round, &format!("{} left the bunker.", name));
        self.announce(out, format!("{} left the game.", name)).await;
        tracing::info!(session = %self.session, participant = %name, "Player left");
        ctx.record(&self.session, LogEntry::new("leave", name.clone())).await;

        if self.cursor.current() == Some(id) {
            self.cursor.advance();
        }
        if self.awaiting == Some(id) {
            self.awaiting = None;
        }

        if self.state.runoff.is_active() {
            self.state.runoff.withdraw(&name);
            if self.state.phase == Phase::Runoff && !self.state.runoff.is_active() {
                self.begin_voting(ctx, out).await;
            }
        }
        if self.state.phase == Phase::Voting {
            let revoters = self.ballots.discard_involving(&name);
            let scope = self.vote_scope(ctx);
            let humans: Vec<(String, String)> = revoters
                .iter()
                .filter_map(|v| self.registry.by_name(v))
                .filter_map(|p| p.user_id().map(|u| (u.to_string(), p.name.clone())))
                .collect();
            for (user_id, voter) in humans {
                self.send_ballot(out, &scope, &user_id, &voter).await;
            }
        }

        self.dashboard(ctx, out).await;
        if self.check_terminal(ctx, out).await {
            return Ok(());
        }
        self.process_turn(ctx, out).await
    }

    fn player_view(&self, ctx: &GameContext, user_id: &str) -> Option<PlayerView> {
        if !self.initialized {
            return None;
        }
        let own = self
            .registry
            .by_user(user_id)
            .and_then(|p| self.registry.own_card(p.id));
        let active = if self.state.is_over() || !self.state.phase.is_speaking() {
            None
        } else {
            self.cursor
                .current()
                .and_then(|id| self.registry.get(id))
                .map(|p| p.name.clone())
        };

        Some(PlayerView {
            game: GAME_KEY.to_string(),
            round: self.state.round,
            phase: self.state.phase.to_string(),
            topic: self.state.topic().to_string(),
            catastrophe: self.state.scenario.catastrophe.clone(),
            active,
            own,
            table: self
                .registry
                .public_table(self.state.round, &ctx.config.visibility),
            finished: self.state.is_over(),
        })
    }

    fn is_over(&self) -> bool {
        self.state.is_over()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_command_needs_a_word_boundary() {
        assert_eq!(vote_command("/vote Oleg"), Some("Oleg"));
        assert_eq!(vote_command("/vote   oleg  "), Some("oleg"));
        assert_eq!(vote_command("/vote"), Some(""));
        assert_eq!(vote_command("/voter Ann"), None);
        assert_eq!(vote_command("/votex"), None);
        assert_eq!(vote_command("I vote Oleg"), None);
    }
}
