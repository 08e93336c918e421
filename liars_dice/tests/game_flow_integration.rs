//! End-to-end game flows through the engine.
//!
//! Covers the three-player opening round, a full game down to settlement,
//! event tags seen by a relay, and concurrent callers.

use liars_dice::{
    EngineConfig, EngineError, ErrorKind, EventHub, GameEngine, GameError, GameStatus,
    LedgerSettlement, PlayerId, RoundResult, Settlement, settlement::HOUSE_ACCOUNT,
};
use std::sync::Arc;

fn id(s: &str) -> PlayerId {
    PlayerId::new(s)
}

fn setup(fee: u64) -> (Arc<GameEngine>, Arc<LedgerSettlement>) {
    let config = EngineConfig {
        game_fee: fee,
        ..EngineConfig::default()
    };
    let hub = Arc::new(EventHub::new(config.subscriber_capacity));
    let ledger = Arc::new(LedgerSettlement::new());
    let engine = Arc::new(GameEngine::new(config, hub, ledger.clone()));
    (engine, ledger)
}

fn drain(sub: &liars_dice::Subscription) -> Vec<String> {
    let mut tags = Vec::new();
    while let Some(tag) = sub.try_recv() {
        tags.push(tag);
    }
    tags
}

#[tokio::test]
async fn test_three_player_opening_round() {
    let (engine, _) = setup(0);
    let (a, b, c) = (id("A"), id("B"), id("C"));

    engine.new_game(5).await;
    for player in [&a, &b, &c] {
        engine.add_player(player).await.unwrap();
    }
    engine.start_game().await.unwrap();
    for player in [&a, &b, &c] {
        assert_eq!(engine.roll_dice(player).await.unwrap().len(), 5);
    }

    engine.claim(&a, 2, 3).await.unwrap();
    engine.claim(&b, 2, 4).await.unwrap();

    let err = engine.claim(&c, 1, 5).await.unwrap_err();
    assert!(matches!(err, EngineError::Game(GameError::ClaimTooLow { .. })));
    assert_eq!(err.kind(), ErrorKind::Validation);

    let status = engine.status().await.unwrap();
    assert_eq!(status.current_player, Some(c.clone()));
    assert_eq!(status.claims.len(), 2);

    let fours = status
        .cups
        .iter()
        .flat_map(|cup| cup.dice.iter())
        .filter(|&&face| face == 4)
        .count() as u32;

    let outcome = engine.call_liar(&c).await.unwrap();
    assert_eq!(outcome.tally.count(4), fours);
    if fours < 2 {
        assert_eq!(outcome.winner, c);
        assert_eq!(outcome.loser, b);
    } else {
        assert_eq!(outcome.winner, b);
        assert_eq!(outcome.loser, c);
    }

    let status = engine.status().await.unwrap();
    assert_eq!(status.status, GameStatus::RoundOver);
    assert_eq!(status.last_winner, Some(outcome.winner.clone()));
    let loser_cup = status
        .cups
        .iter()
        .find(|cup| cup.player == outcome.loser)
        .unwrap();
    assert_eq!(loser_cup.outs, 1);
}

#[tokio::test]
async fn test_full_game_settles_with_ledger() {
    let (engine, ledger) = setup(1);
    let (alice, bob, carol) = (id("alice"), id("bob"), id("carol"));
    for player in [&alice, &bob, &carol] {
        ledger.deposit(player, 100).await.unwrap();
    }

    engine.new_game(5).await;
    for player in [&alice, &bob, &carol] {
        engine.add_player(player).await.unwrap();
    }
    engine.start_game().await.unwrap();
    engine.roll_dice(&alice).await.unwrap();
    engine.claim(&alice, 1, 2).await.unwrap();
    engine.call_liar(&bob).await.unwrap();

    // A timeout controller knocks bob and carol out.
    engine.apply_out(&bob, 3).await.unwrap();
    engine.apply_out(&carol, 3).await.unwrap();
    engine.apply_out(&alice, 0).await.unwrap();

    let result = engine.new_round().await.unwrap();
    assert_eq!(
        result,
        RoundResult::GameComplete {
            winner: alice.clone()
        }
    );

    let err = engine.reconcile(&bob).await.unwrap_err();
    assert!(matches!(err, EngineError::NotWinner(_)));

    let request = engine.reconcile(&alice).await.unwrap();
    assert_eq!(request.winner, alice);
    assert_eq!(request.losers, vec![bob.clone(), carol.clone()]);
    assert_eq!(request.pot(), 10);

    assert_eq!(engine.player_balance(&alice).await.unwrap(), 109);
    assert_eq!(engine.player_balance(&bob).await.unwrap(), 95);
    assert_eq!(engine.player_balance(&carol).await.unwrap(), 95);
    assert_eq!(ledger.balance(&id(HOUSE_ACCOUNT)).await.unwrap(), 1);

    // Settling again is a no-op on the ledger.
    engine.reconcile(&alice).await.unwrap();
    assert_eq!(engine.player_balance(&alice).await.unwrap(), 109);
}

#[tokio::test]
async fn test_relay_sees_every_tag() {
    let (engine, _) = setup(0);
    let relay = engine.hub().acquire("relay").await.unwrap();
    let (a, b) = (id("a"), id("b"));

    engine.new_game(1).await;
    engine.add_player(&a).await.unwrap();
    engine.add_player(&b).await.unwrap();
    engine.add_player(&id("c")).await.unwrap();
    engine.remove_player(&id("c")).await.unwrap();
    engine.start_game().await.unwrap();
    engine.roll_dice(&a).await.unwrap();
    engine.claim(&a, 1, 6).await.unwrap();
    engine.call_liar(&b).await.unwrap();
    engine.apply_out(&b, 3).await.unwrap();
    engine.apply_out(&a, 0).await.unwrap();
    engine.new_round().await.unwrap();

    assert_eq!(
        drain(&relay),
        vec![
            "newgame",
            "join:a",
            "join:b",
            "join:c",
            "leave:c",
            "start",
            "rolldice:a",
            "claim:a",
            "callliar:b",
            "outs:b",
            "outs:a",
            "gameover:a",
        ]
    );
}

#[tokio::test]
async fn test_round_continues_with_loser_first() {
    let (engine, _) = setup(0);
    let (a, b, c) = (id("a"), id("b"), id("c"));

    engine.new_game(1).await;
    for player in [&a, &b, &c] {
        engine.add_player(player).await.unwrap();
    }
    engine.start_game().await.unwrap();
    engine.roll_dice(&a).await.unwrap();
    engine.claim(&a, 1, 1).await.unwrap();
    let outcome = engine.call_liar(&b).await.unwrap();

    let result = engine.new_round().await.unwrap();
    assert_eq!(result, RoundResult::Continue { players_left: 3 });

    let status = engine.status().await.unwrap();
    assert_eq!(status.status, GameStatus::Playing);
    assert_eq!(status.round, 2);
    assert!(status.claims.is_empty());
    assert!(status.cups.iter().all(|cup| cup.dice.is_empty()));
    assert_eq!(status.current_player, Some(outcome.loser));
}

#[tokio::test]
async fn test_concurrent_joins_are_serialized() {
    let (engine, _) = setup(0);
    engine.new_game(1).await;
    let relay = engine.hub().acquire("relay").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine.add_player(&PlayerId::new(&format!("p{i}"))).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Everybody tries to join again at once; every attempt is a duplicate.
    let mut handles = Vec::new();
    for i in 0..20 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine.add_player(&PlayerId::new(&format!("p{i}"))).await
        }));
    }
    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            EngineError::Game(GameError::DuplicatePlayer(_))
        ));
    }

    let status = engine.status().await.unwrap();
    assert_eq!(status.player_order.len(), 20);
    assert_eq!(drain(&relay).len(), 20);
}

#[tokio::test]
async fn test_status_readers_run_alongside_writers() {
    let (engine, _) = setup(0);
    engine.new_game(1).await;
    engine.add_player(&id("a")).await.unwrap();
    engine.add_player(&id("b")).await.unwrap();
    engine.start_game().await.unwrap();

    let writer = {
        let engine = engine.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                engine.next_turn().await.unwrap();
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move {
                for _ in 0..50 {
                    let status = engine.status().await.unwrap();
                    assert!(status.current_cup < 2);
                }
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }

    assert_eq!(engine.status().await.unwrap().current_cup, 0);
}
