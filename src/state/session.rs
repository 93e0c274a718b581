//! Game session state management.
//!
//! A `GameSession` owns the full lifecycle of one game: roster, phase, and
//! whose turn it is. Every operation takes the caller's identity explicitly
//! and either applies completely or fails leaving the session untouched.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::{ConfigError, SessionConfig, MAX_PLAYERS, MIN_PLAYERS};
use super::dice::{Dice, RandomDice};
use super::phase::{InvalidTransition, Phase, PhaseEvent};
use super::player::{PlayerId, Roster, RosterError};
use super::rules::{NoWinCondition, WinCondition, WinContext};

/// One successful roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRecord {
    pub player: PlayerId,
    /// Seat of the roller
    pub turn_index: usize,
    pub value: u8,
    /// Round the roll was made in (1-indexed)
    pub round: u32,
    /// Whether the roller kept the turn
    pub extra_turn: bool,
    pub rolled_at: DateTime<Utc>,
}

/// Result returned to the caller of `roll_dice`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOutcome {
    pub player: PlayerId,
    pub value: u8,
    pub next_turn_index: usize,
    pub extra_turn: bool,
    pub round: u32,
    /// Set when this roll finished the game
    pub winner: Option<PlayerId>,
}

/// Read-only snapshot of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Players in join (= turn) order
    pub player_addresses: Vec<PlayerId>,
    pub is_game_in_progress: bool,
    pub current_turn_index: usize,
    pub phase: Phase,
    pub round: u32,
    pub last_roll: Option<u8>,
    pub winner: Option<PlayerId>,
}

/// Game session state.
#[derive(Debug)]
pub struct GameSession {
    /// Rules this session was created with
    config: SessionConfig,

    /// Current phase
    phase: Phase,

    /// Players in turn order
    roster: Roster,

    /// Seat whose turn it is; meaningful only while in progress
    current_turn_index: usize,

    /// Current round (1-indexed)
    round: u32,

    /// Every successful roll
    history: Vec<RollRecord>,

    /// Set when the session finishes
    winner: Option<PlayerId>,

    dice: Box<dyn Dice>,

    win_condition: Arc<dyn WinCondition>,

    /// When session was created
    pub created_at: DateTime<Utc>,

    /// When session started (phase -> InProgress)
    pub started_at: Option<DateTime<Utc>>,

    /// When session finished
    pub finished_at: Option<DateTime<Utc>>,
}

impl GameSession {
    /// Create a new session in the lobby phase.
    ///
    /// Roster capacity never exceeds `MAX_PLAYERS`, even for an unvalidated
    /// config.
    pub fn new(config: SessionConfig) -> Self {
        let roster = Roster::new(config.max_players.min(MAX_PLAYERS));
        Self {
            config,
            phase: Phase::Lobby,
            roster,
            current_turn_index: 0,
            round: 1,
            history: Vec::new(),
            winner: None,
            dice: Box::new(RandomDice::default()),
            win_condition: Arc::new(NoWinCondition),
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Create a new session after validating `config`.
    pub fn try_new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn with_dice(mut self, dice: impl Dice + 'static) -> Self {
        self.dice = Box::new(dice);
        self
    }

    pub fn with_win_condition(mut self, condition: impl WinCondition + 'static) -> Self {
        self.win_condition = Arc::new(condition);
        self
    }

    /// Add the caller to the roster, returning their seat.
    pub fn join_game(&mut self, caller: PlayerId) -> Result<usize, GameError> {
        self.try_join(caller)
            .inspect_err(|e| log::debug!("join by {} rejected: {}", caller, e))
    }

    fn try_join(&mut self, caller: PlayerId) -> Result<usize, GameError> {
        if !self.phase.is_open() {
            return Err(GameError::GameAlreadyStarted);
        }

        let seat = self.roster.push(caller)?;
        log::debug!(
            "player {} joined at seat {} ({}/{})",
            caller,
            seat,
            self.roster.len(),
            self.roster.capacity()
        );
        Ok(seat)
    }

    /// Start the game. The first player to join moves first.
    pub fn start_game(&mut self, caller: PlayerId) -> Result<(), GameError> {
        self.try_start(caller)
            .inspect_err(|e| log::debug!("start by {} rejected: {}", caller, e))
    }

    fn try_start(&mut self, caller: PlayerId) -> Result<(), GameError> {
        let next = self.phase.transition(PhaseEvent::Start)?;

        if !self.config.start_policy.permits(&caller, &self.roster) {
            return Err(GameError::NotAuthorized);
        }

        if self.roster.len() < self.min_players() {
            return Err(GameError::InsufficientPlayers);
        }

        self.phase = next;
        self.current_turn_index = 0;
        self.started_at = Some(Utc::now());

        log::info!(
            "game started by {} with {} players",
            caller,
            self.roster.len()
        );
        Ok(())
    }

    /// Roll the die for the player whose turn it is.
    pub fn roll_dice(&mut self, caller: PlayerId) -> Result<RollOutcome, GameError> {
        self.try_roll(caller)
            .inspect_err(|e| log::debug!("roll by {} rejected: {}", caller, e))
    }

    fn try_roll(&mut self, caller: PlayerId) -> Result<RollOutcome, GameError> {
        if !self.phase.is_active() {
            return Err(GameError::GameNotInProgress);
        }

        if !self.is_player_turn(&caller) {
            return Err(GameError::NotYourTurn);
        }

        let faces = self.config.die_faces;
        let turn_index = self.current_turn_index;
        let value = self.dice.roll(faces);
        let advance = self
            .config
            .turn_rule
            .advance(turn_index, value, faces, self.roster.len());

        let record = RollRecord {
            player: caller,
            turn_index,
            value,
            round: self.round,
            extra_turn: advance.extra_turn,
            rolled_at: Utc::now(),
        };
        let round = record.round;
        self.history.push(record);

        self.current_turn_index = advance.next_index;
        if !advance.extra_turn && advance.next_index == 0 {
            self.round += 1;
        }

        log::debug!(
            "{} rolled {} (round {}), next seat {}",
            caller,
            value,
            round,
            self.current_turn_index
        );

        let winner = self.check_winner();
        if let Some(winner) = winner {
            self.finish(winner);
        }

        Ok(RollOutcome {
            player: caller,
            value,
            next_turn_index: self.current_turn_index,
            extra_turn: advance.extra_turn,
            round,
            winner,
        })
    }

    fn check_winner(&self) -> Option<PlayerId> {
        let last = self.history.last()?;
        let ctx = WinContext {
            players: self.roster.as_slice(),
            history: &self.history,
            last,
        };

        let winner = self.win_condition.winner(&ctx)?;
        if !self.roster.contains(&winner) {
            log::warn!("win condition named {} who is not in this game", winner);
            return None;
        }
        Some(winner)
    }

    fn finish(&mut self, winner: PlayerId) {
        match self.phase.transition(PhaseEvent::Finish) {
            Ok(next) => {
                self.phase = next;
                self.winner = Some(winner);
                self.finished_at = Some(Utc::now());
                log::info!("game finished, winner {}", winner);
            }
            Err(e) => log::warn!("{}", e),
        }
    }

    /// Snapshot of the observable state.
    pub fn get_game_state(&self) -> GameState {
        GameState {
            player_addresses: self.roster.as_slice().to_vec(),
            is_game_in_progress: self.phase.is_active(),
            current_turn_index: self.current_turn_index,
            phase: self.phase,
            round: self.round,
            last_roll: self.history.last().map(|r| r.value),
            winner: self.winner,
        }
    }

    fn min_players(&self) -> usize {
        self.config.min_players.max(MIN_PLAYERS)
    }

    /// Get the player whose turn it is.
    pub fn current_player(&self) -> Option<PlayerId> {
        if !self.phase.is_active() {
            return None;
        }
        self.roster.get(self.current_turn_index)
    }

    /// Check if it's a player's turn.
    pub fn is_player_turn(&self, player: &PlayerId) -> bool {
        self.current_player().as_ref() == Some(player)
    }

    /// Check if player is in the game.
    pub fn has_player(&self, player: &PlayerId) -> bool {
        self.roster.contains(player)
    }

    /// Get player IDs in turn order.
    pub fn players(&self) -> &[PlayerId] {
        self.roster.as_slice()
    }

    pub fn player_count(&self) -> usize {
        self.roster.len()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_turn_index(&self) -> usize {
        self.current_turn_index
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn history(&self) -> &[RollRecord] {
        &self.history
    }

    pub fn last_roll(&self) -> Option<&RollRecord> {
        self.history.last()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Convert full session state to JSON.
    pub fn to_json(&self) -> serde_json::Value {
        let players: Vec<String> = self.roster.as_slice().iter().map(|p| p.to_string()).collect();

        let history: Vec<serde_json::Value> = self
            .history
            .iter()
            .map(|r| {
                serde_json::json!({
                    "player": r.player.to_string(),
                    "turn_index": r.turn_index,
                    "value": r.value,
                    "round": r.round,
                    "extra_turn": r.extra_turn,
                    "rolled_at": r.rolled_at.to_rfc3339()
                })
            })
            .collect();

        serde_json::json!({
            "phase": self.phase.as_str(),
            "players": players,
            "current_turn": self.current_player().map(|p| p.to_string()),
            "current_turn_index": self.current_turn_index,
            "round": self.round,
            "winner": self.winner.map(|p| p.to_string()),
            "config": self.config.to_json(),
            "history": history,
            "created_at": self.created_at.to_rfc3339(),
            "started_at": self.started_at.map(|t| t.to_rfc3339()),
            "finished_at": self.finished_at.map(|t| t.to_rfc3339())
        })
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Game errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    GameFull,
    InsufficientPlayers,
    NotYourTurn,
    AlreadyJoined,
    GameAlreadyStarted,
    GameNotInProgress,
    NotAuthorized,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GameFull => write!(f, "Game is full"),
            Self::InsufficientPlayers => write!(f, "Not enough players"),
            Self::NotYourTurn => write!(f, "Not your turn"),
            Self::AlreadyJoined => write!(f, "Already joined this game"),
            Self::GameAlreadyStarted => write!(f, "Game has already started"),
            Self::GameNotInProgress => write!(f, "Game is not in progress"),
            Self::NotAuthorized => write!(f, "Not allowed to start this game"),
        }
    }
}

impl std::error::Error for GameError {}

impl From<RosterError> for GameError {
    fn from(e: RosterError) -> Self {
        match e {
            RosterError::Full => Self::GameFull,
            RosterError::AlreadyPresent => Self::AlreadyJoined,
        }
    }
}

impl From<InvalidTransition> for GameError {
    fn from(e: InvalidTransition) -> Self {
        match e.event {
            PhaseEvent::Start => Self::GameAlreadyStarted,
            PhaseEvent::Finish => Self::GameNotInProgress,
        }
    }
}
