//! Session registry - tracks many independent sessions.
//!
//! Each session sits behind its own mutex, so operations on one session are
//! fully serialized while distinct sessions proceed without contending. The
//! map lock is only held long enough to clone session handles or to insert
//! and remove entries; it is never held while waiting on a session.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::config::{ConfigError, SessionConfig};
use super::player::PlayerId;
use super::session::{GameError, GameSession, GameState, RollOutcome};

/// Registry key for a session (`session-<n>`).
pub type SessionId = String;

/// A session guarded by its own lock.
pub type SharedSession = Arc<Mutex<GameSession>>;

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    UnknownSession(SessionId),
    Config(ConfigError),
    Game(GameError),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSession(id) => write!(f, "Unknown session: {}", id),
            Self::Config(e) => write!(f, "{}", e),
            Self::Game(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownSession(_) => None,
            Self::Config(e) => Some(e),
            Self::Game(e) => Some(e),
        }
    }
}

impl From<GameError> for RegistryError {
    fn from(e: GameError) -> Self {
        Self::Game(e)
    }
}

impl From<ConfigError> for RegistryError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SharedSession>>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh session in the lobby phase.
    pub fn create(&self, config: SessionConfig) -> Result<SessionId, RegistryError> {
        let session = GameSession::try_new(config)?;
        Ok(self.insert(session))
    }

    /// Register an already-built session.
    pub fn insert(&self, session: GameSession) -> SessionId {
        let id = format!("session-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.sessions
            .write()
            .insert(id.clone(), Arc::new(Mutex::new(session)));

        log::info!("session {} created", id);
        id
    }

    /// Get a handle to a session.
    pub fn get(&self, id: &str) -> Option<SharedSession> {
        self.sessions.read().get(id).cloned()
    }

    /// Run `f` with exclusive access to one session.
    pub fn with_session<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut GameSession) -> R,
    ) -> Result<R, RegistryError> {
        let session = self
            .get(id)
            .ok_or_else(|| RegistryError::UnknownSession(id.to_string()))?;
        let mut guard = session.lock();
        Ok(f(&mut *guard))
    }

    pub fn join_game(&self, id: &str, caller: PlayerId) -> Result<usize, RegistryError> {
        Ok(self.with_session(id, |s| s.join_game(caller))??)
    }

    pub fn start_game(&self, id: &str, caller: PlayerId) -> Result<(), RegistryError> {
        Ok(self.with_session(id, |s| s.start_game(caller))??)
    }

    pub fn roll_dice(&self, id: &str, caller: PlayerId) -> Result<RollOutcome, RegistryError> {
        Ok(self.with_session(id, |s| s.roll_dice(caller))??)
    }

    pub fn game_state(&self, id: &str) -> Result<GameState, RegistryError> {
        self.with_session(id, |s| s.get_game_state())
    }

    /// Remove a session.
    pub fn remove(&self, id: &str) -> Option<SharedSession> {
        let removed = self.sessions.write().remove(id);
        if removed.is_some() {
            log::debug!("session {} removed", id);
        }
        removed
    }

    /// Clone every session handle so callers can inspect sessions without
    /// holding the map lock.
    fn handles(&self) -> Vec<(SessionId, SharedSession)> {
        self.sessions
            .read()
            .iter()
            .map(|(id, s)| (id.clone(), Arc::clone(s)))
            .collect()
    }

    /// Remove finished sessions, returning their IDs.
    pub fn cleanup_finished(&self) -> Vec<SessionId> {
        let finished: Vec<(SessionId, SharedSession)> = self
            .handles()
            .into_iter()
            .filter(|(_, s)| s.lock().phase().is_terminal())
            .collect();

        if finished.is_empty() {
            return Vec::new();
        }

        let mut sessions = self.sessions.write();
        let removed: Vec<SessionId> = finished
            .into_iter()
            .filter(|(id, handle)| {
                // Skip entries replaced since the snapshot
                let same = sessions
                    .get(id)
                    .is_some_and(|current| Arc::ptr_eq(current, handle));
                if same {
                    sessions.remove(id);
                }
                same
            })
            .map(|(id, _)| id)
            .collect();
        drop(sessions);

        log::info!("cleaned up {} finished sessions", removed.len());
        removed
    }

    /// Count sessions with turns being played.
    pub fn active_count(&self) -> usize {
        self.handles()
            .iter()
            .filter(|(_, s)| s.lock().phase().is_active())
            .count()
    }

    /// Total session count.
    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::dice::ScriptedDice;
    use crate::state::rules::{WinCondition, WinContext};
    use pretty_assertions::assert_eq;

    fn player(n: u64) -> PlayerId {
        PlayerId::from_low_u64(n)
    }

    #[test]
    fn test_create_and_get() {
        let registry = SessionRegistry::new();
        let id = registry.create(SessionConfig::default()).unwrap();

        assert_eq!(id, "session-1");
        assert!(registry.get(&id).is_some());
        assert_eq!(registry.count(), 1);

        let id2 = registry.create(SessionConfig::default()).unwrap();
        assert_eq!(id2, "session-2");
    }

    #[test]
    fn test_create_rejects_bad_config() {
        let registry = SessionRegistry::new();
        let config = SessionConfig {
            die_faces: 0,
            ..SessionConfig::default()
        };

        assert_eq!(
            registry.create(config),
            Err(RegistryError::Config(ConfigError::TooFewFaces(0)))
        );
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_unknown_session() {
        let registry = SessionRegistry::new();
        assert_eq!(
            registry.join_game("session-9", player(1)),
            Err(RegistryError::UnknownSession("session-9".to_string()))
        );
    }

    #[test]
    fn test_operations_pass_through() {
        let registry = SessionRegistry::new();
        let id = registry.insert(GameSession::default().with_dice(ScriptedDice::new(vec![5])));

        registry.join_game(&id, player(1)).unwrap();
        registry.join_game(&id, player(2)).unwrap();
        registry.start_game(&id, player(1)).unwrap();

        assert_eq!(
            registry.roll_dice(&id, player(2)),
            Err(RegistryError::Game(GameError::NotYourTurn))
        );
        assert_eq!(registry.roll_dice(&id, player(1)).unwrap().value, 5);

        let state = registry.game_state(&id).unwrap();
        assert_eq!(state.current_turn_index, 1);
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let registry = SessionRegistry::new();
        let a = registry.create(SessionConfig::default()).unwrap();
        let b = registry.create(SessionConfig::default()).unwrap();

        registry.join_game(&a, player(1)).unwrap();

        // Same identity may sit in two different sessions
        registry.join_game(&b, player(1)).unwrap();
        registry.join_game(&b, player(2)).unwrap();

        assert_eq!(registry.game_state(&a).unwrap().player_addresses.len(), 1);
        assert_eq!(registry.game_state(&b).unwrap().player_addresses.len(), 2);
    }

    #[test]
    fn test_concurrent_joins_respect_capacity() {
        let registry = SessionRegistry::new();
        let id = registry.create(SessionConfig::default()).unwrap();

        let results: Vec<Result<usize, RegistryError>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (1..=8u64)
                .map(|n| {
                    let registry = &registry;
                    let id = &id;
                    scope.spawn(move || registry.join_game(id, player(n)))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("join thread panicked"))
                .collect()
        });

        let joined = results.iter().filter(|r| r.is_ok()).count();
        let full = results
            .iter()
            .filter(|r| **r == Err(RegistryError::Game(GameError::GameFull)))
            .count();
        assert_eq!(joined, 4);
        assert_eq!(full, 4);

        // Seats handed out exactly once each
        let mut seats: Vec<usize> = results.into_iter().filter_map(Result::ok).collect();
        seats.sort_unstable();
        assert_eq!(seats, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_cleanup_finished() {
        #[derive(Debug)]
        struct FirstRollWins;

        impl WinCondition for FirstRollWins {
            fn winner(&self, ctx: &WinContext<'_>) -> Option<PlayerId> {
                Some(ctx.last.player)
            }
        }

        let registry = SessionRegistry::new();
        let done = registry.insert(GameSession::default().with_win_condition(FirstRollWins));
        let open = registry.create(SessionConfig::default()).unwrap();

        registry.join_game(&done, player(1)).unwrap();
        registry.join_game(&done, player(2)).unwrap();
        registry.start_game(&done, player(1)).unwrap();
        let outcome = registry.roll_dice(&done, player(1)).unwrap();
        assert_eq!(outcome.winner, Some(player(1)));

        assert_eq!(registry.cleanup_finished(), vec![done.clone()]);
        assert!(registry.get(&done).is_none());
        assert!(registry.get(&open).is_some());
        assert!(registry.cleanup_finished().is_empty());
    }

    #[test]
    fn test_cleanup_does_not_block_registry_on_busy_session() {
        let registry = SessionRegistry::new();
        let busy = registry.create(SessionConfig::default()).unwrap();
        let handle = registry.get(&busy).unwrap();

        // Hold the session lock as a long-running operation would
        let guard = handle.lock();

        std::thread::scope(|scope| {
            let cleanup = scope.spawn(|| registry.cleanup_finished());

            // Map operations still go through while cleanup waits on the session
            let other = registry.create(SessionConfig::default()).unwrap();
            registry.join_game(&other, player(1)).unwrap();
            assert_eq!(registry.count(), 2);

            drop(guard);
            assert!(cleanup.join().expect("cleanup thread panicked").is_empty());
        });
    }

    #[test]
    fn test_remove() {
        let registry = SessionRegistry::new();
        let id = registry.create(SessionConfig::default()).unwrap();

        assert!(registry.remove(&id).is_some());
        assert!(registry.remove(&id).is_none());
        assert_eq!(registry.count(), 0);
    }
}
