/// Property-based tests for claim ordering and turn rotation using proptest
///
/// Random claim attempts are thrown at a session. Whatever gets accepted must
/// form a strictly increasing sequence, and the turn must have moved once per
/// accepted claim.
use liars_dice::{GameSession, GameStatus, PlayerId};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

// Strategy for a claim attempt that is usually, but not always, well formed
fn claim_strategy() -> impl Strategy<Value = (u32, u8)> {
    (0u32..=12, 0u8..=7)
}

fn started_session(players: usize, seed: u64) -> (GameSession, Vec<PlayerId>) {
    let ids: Vec<PlayerId> = (0..players)
        .map(|i| PlayerId::new(&format!("player{i}")))
        .collect();
    let mut session = GameSession::new(1);
    for id in &ids {
        session.add_player(id).unwrap();
    }
    session.start().unwrap();

    let mut rng = StdRng::seed_from_u64(seed);
    for id in &ids {
        session.roll_dice_with(id, &mut rng).unwrap();
    }
    (session, ids)
}

proptest! {
    #[test]
    fn test_accepted_claims_strictly_increase(
        players in 2usize..=6,
        seed in any::<u64>(),
        attempts in prop::collection::vec(claim_strategy(), 1..40),
    ) {
        let (mut session, _) = started_session(players, seed);

        for (number, suit) in attempts {
            let Some(current) = session.current_player().cloned() else {
                break;
            };
            let before = session.claims().len();
            let result = session.claim(&current, number, suit);
            if result.is_err() {
                prop_assert_eq!(session.claims().len(), before, "rejected claim must not be recorded");
            }
        }

        for pair in session.claims().windows(2) {
            prop_assert!(
                pair[1].exceeds(pair[0].number, pair[0].suit),
                "{} does not beat {}",
                pair[1],
                pair[0]
            );
        }
    }

    #[test]
    fn test_turn_moves_once_per_accepted_claim(
        players in 2usize..=6,
        seed in any::<u64>(),
        attempts in prop::collection::vec(claim_strategy(), 1..40),
    ) {
        let (mut session, ids) = started_session(players, seed);

        for (number, suit) in attempts {
            let turn = session.turn_index();
            let result = session.claim(&ids[turn], number, suit);
            let expected = if result.is_ok() { (turn + 1) % players } else { turn };
            prop_assert_eq!(session.turn_index(), expected);
        }

        prop_assert_eq!(session.turn_index(), session.claims().len() % players);
        prop_assert_eq!(session.status(), GameStatus::Playing);
    }

    #[test]
    fn test_tally_matches_dice(
        players in 2usize..=6,
        seed in any::<u64>(),
    ) {
        let (session, _) = started_session(players, seed);
        let tally = liars_dice::DiceTally::from_cups(session.players());

        prop_assert_eq!(tally.total() as usize, players * liars_dice::DICE_PER_CUP);
        for face in 1u8..=6 {
            let expected = session
                .players()
                .iter()
                .flat_map(|cup| cup.dice.iter())
                .filter(|&&d| d == face)
                .count();
            prop_assert_eq!(tally.count(face) as usize, expected);
        }
    }
}
