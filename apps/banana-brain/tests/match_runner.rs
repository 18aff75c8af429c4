mod common;

use std::time::Duration;

use banana_brain::domain::{BoardPhase, DifficultyTier, EndReason};
use banana_brain::services::{BoardHandle, BoardInput, MatchRunner, RoundOutcome};
use common::ordered_board;

async fn flip_pair(handle: &mut BoardHandle, a: usize, b: usize) {
    handle.input.send(BoardInput::Flip(a)).await.unwrap();
    handle.input.send(BoardInput::Flip(b)).await.unwrap();
    handle
        .view
        .wait_for(|v| v.phase != BoardPhase::Active && v.cards[b].is_flipped)
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn clearing_the_board_adds_remaining_time() {
    let board = ordered_board(DifficultyTier::Hard);
    let pairs = board.pair_count();
    let mut handle = MatchRunner::with_board(board).spawn();

    for i in 0..pairs {
        flip_pair(&mut handle, i, i + pairs).await;
        handle
            .view
            .wait_for(|v| v.phase != BoardPhase::Resolving)
            .await
            .unwrap();
    }

    match handle.task.await.unwrap() {
        RoundOutcome::Completed { score, reason } => {
            assert_eq!(reason, EndReason::BoardCleared);
            // Six pairs at 10 each plus whatever was left of the 10 seconds.
            assert!(score > 60 && score <= 70, "score {score}");
        }
        other => panic!("expected a completed board, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn mismatch_flips_back_after_delay() {
    let mut handle = MatchRunner::with_board(ordered_board(DifficultyTier::Easy)).spawn();

    flip_pair(&mut handle, 0, 1).await;
    assert_eq!(handle.view.borrow().phase, BoardPhase::Resolving);

    // A third flip while two are face up is refused.
    handle.input.send(BoardInput::Flip(2)).await.unwrap();
    let view = handle
        .view
        .wait_for(|v| v.notice.is_some())
        .await
        .unwrap()
        .clone();
    assert!(!view.cards[2].is_flipped);

    let view = handle
        .view
        .wait_for(|v| v.phase == BoardPhase::Active)
        .await
        .unwrap()
        .clone();
    assert!(view.cards.iter().all(|c| !c.is_flipped && !c.is_matched));
    assert_eq!(view.score, 0);

    handle.cancel.cancel();
    assert_eq!(handle.task.await.unwrap(), RoundOutcome::Abandoned);
}

#[tokio::test(start_paused = true)]
async fn countdown_expiry_reports_score_once() {
    let mut handle = MatchRunner::with_board(ordered_board(DifficultyTier::Hard)).spawn();
    flip_pair(&mut handle, 0, 6).await;

    let outcome = handle.task.await.unwrap();
    assert_eq!(
        outcome,
        RoundOutcome::Completed {
            score: 10,
            reason: EndReason::Timeout
        }
    );
}

#[tokio::test(start_paused = true)]
async fn countdown_pauses_while_a_pair_resolves() {
    let mut handle = MatchRunner::with_board(ordered_board(DifficultyTier::Hard)).spawn();
    flip_pair(&mut handle, 0, 1).await;
    let before = handle.view.borrow().time_remaining;

    tokio::time::sleep(Duration::from_millis(1300)).await;
    let view = handle.view.borrow().clone();
    assert_eq!(view.phase, BoardPhase::Active);
    assert_eq!(view.time_remaining, before);

    handle.input.send(BoardInput::Quit).await.unwrap();
    assert_eq!(handle.task.await.unwrap(), RoundOutcome::Abandoned);
}

#[tokio::test(start_paused = true)]
async fn seeded_boards_deal_the_same_layout() {
    let config = banana_brain::domain::RoundConfig::for_mode(
        DifficultyTier::Medium,
        banana_brain::domain::GameMode::CardMatch,
    );
    let a = MatchRunner::new(config.clone(), Some(42)).unwrap().spawn();
    let b = MatchRunner::new(config, Some(42)).unwrap().spawn();
    assert_eq!(a.view.borrow().cards, b.view.borrow().cards);
    assert_eq!(a.view.borrow().cards.len(), 16);
    a.cancel.cancel();
    b.cancel.cancel();
}
