//! Property tests over arbitrary operation sequences.

use ludo_state::{
    GameError, GameSession, Phase, PlayerId, RandomDice, SessionConfig, WinCondition, WinContext,
    MAX_PLAYERS,
};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Join(u64),
    Start(u64),
    Roll(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u64..8).prop_map(Op::Join),
        1 => (0u64..8).prop_map(Op::Start),
        4 => (0u64..8).prop_map(Op::Roll),
    ]
}

/// The roller wins on rolling `target`.
#[derive(Debug)]
struct WinsOnRoll(u8);

impl WinCondition for WinsOnRoll {
    fn winner(&self, ctx: &WinContext<'_>) -> Option<PlayerId> {
        (ctx.last.value == self.0).then_some(ctx.last.player)
    }
}

fn apply(session: &mut GameSession, op: Op) -> bool {
    match op {
        Op::Join(n) => session.join_game(PlayerId::from_low_u64(n)).is_err(),
        Op::Start(n) => session.start_game(PlayerId::from_low_u64(n)).is_err(),
        Op::Roll(n) => session.roll_dice(PlayerId::from_low_u64(n)).is_err(),
    }
}

fn phase_rank(phase: Phase) -> u8 {
    match phase {
        Phase::Lobby => 0,
        Phase::InProgress => 1,
        Phase::Finished => 2,
    }
}

proptest! {
    #[test]
    fn roster_never_exceeds_capacity(ids in prop::collection::vec(0u64..10, 0..16)) {
        let mut session = GameSession::default();
        let mut expected: Vec<PlayerId> = Vec::new();

        for n in ids {
            let id = PlayerId::from_low_u64(n);
            let result = session.join_game(id);

            if expected.len() == MAX_PLAYERS {
                prop_assert_eq!(result, Err(GameError::GameFull));
            } else if expected.contains(&id) {
                prop_assert_eq!(result, Err(GameError::AlreadyJoined));
            } else {
                prop_assert_eq!(result, Ok(expected.len()));
                expected.push(id);
            }

            prop_assert!(session.player_count() <= MAX_PLAYERS);
        }

        // Join order is preserved
        prop_assert_eq!(session.get_game_state().player_addresses, expected);
    }

    #[test]
    fn start_succeeds_iff_two_or_more(n_players in 0u64..=4) {
        let mut session = GameSession::default();
        for n in 0..n_players {
            session.join_game(PlayerId::from_low_u64(n)).unwrap();
        }

        let result = session.start_game(PlayerId::from_low_u64(0));
        if n_players >= 2 {
            prop_assert!(result.is_ok());
            prop_assert!(session.get_game_state().is_game_in_progress);
            prop_assert_eq!(session.get_game_state().current_turn_index, 0);
        } else {
            prop_assert_eq!(result, Err(GameError::InsufficientPlayers));
        }
    }

    #[test]
    fn failed_ops_do_not_mutate(
        seed in any::<u64>(),
        ops in prop::collection::vec(op_strategy(), 0..64),
    ) {
        let mut session =
            GameSession::new(SessionConfig::default()).with_dice(RandomDice::new(Some(seed)));

        for op in ops {
            let before = session.get_game_state();
            let history_len = session.history().len();

            let failed = match op {
                Op::Join(n) => session.join_game(PlayerId::from_low_u64(n)).is_err(),
                Op::Start(n) => session.start_game(PlayerId::from_low_u64(n)).is_err(),
                Op::Roll(n) => {
                    let caller = PlayerId::from_low_u64(n);
                    let on_turn = session.is_player_turn(&caller);
                    let result = session.roll_dice(caller);
                    if before.is_game_in_progress && !on_turn {
                        prop_assert_eq!(result.clone(), Err(GameError::NotYourTurn));
                    }
                    result.is_err()
                }
            };

            let after = session.get_game_state();
            if failed {
                prop_assert_eq!(&after, &before);
                prop_assert_eq!(session.history().len(), history_len);
            }

            // Phase never moves backwards
            prop_assert!(phase_rank(after.phase) >= phase_rank(before.phase));
            prop_assert!(after.player_addresses.len() <= MAX_PLAYERS);
            if after.is_game_in_progress {
                prop_assert!(after.current_turn_index < after.player_addresses.len());
            }
        }
    }

    #[test]
    fn phase_monotonic_through_finish(
        seed in any::<u64>(),
        target in 1u8..=6,
        ops in prop::collection::vec(op_strategy(), 0..96),
    ) {
        let mut session = GameSession::new(SessionConfig::default())
            .with_dice(RandomDice::new(Some(seed)))
            .with_win_condition(WinsOnRoll(target));

        // Seat two players and start so most sequences reach the finish
        let setup = [Op::Join(0), Op::Join(1), Op::Start(0)];

        for op in setup.into_iter().chain(ops) {
            let before = session.get_game_state();
            let history_len = session.history().len();
            let failed = apply(&mut session, op);
            let after = session.get_game_state();

            prop_assert!(phase_rank(after.phase) >= phase_rank(before.phase));

            if before.phase == Phase::Finished {
                // Terminal: every mutating call is rejected and nothing changes
                prop_assert!(failed);
                prop_assert_eq!(&after, &before);
                prop_assert_eq!(session.history().len(), history_len);
            }

            if after.phase == Phase::Finished {
                prop_assert!(!after.is_game_in_progress);
                let last = session.last_roll().map(|r| (r.player, r.value));
                prop_assert!(after.winner.is_some());
                prop_assert_eq!(last.map(|(_, v)| v), Some(target));
                if before.phase == Phase::InProgress {
                    prop_assert_eq!(after.winner, last.map(|(p, _)| p));
                }
            } else {
                prop_assert_eq!(after.winner, None);
            }
        }
    }
}
