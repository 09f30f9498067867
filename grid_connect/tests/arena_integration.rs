//! Integration tests for the match registry and its actors
//!
//! These run full lifecycles through `MatchManager` on the in-memory
//! repository, including concurrent requests against one match.

use grid_connect::{
    MatchManager,
    db::{InMemoryMatchRepository, MatchRepository},
    game::{Color, Conclusion, MatchError, MatchState, PlayerId},
};
use std::sync::Arc;

const RED: Color = Color(255, 0, 0);
const BLUE: Color = Color(0, 0, 255);
const GREEN: Color = Color(0, 255, 0);

fn setup() -> (MatchManager, Arc<InMemoryMatchRepository>) {
    let repository = Arc::new(InMemoryMatchRepository::new());
    (MatchManager::new(repository.clone()), repository)
}

async fn started_match(manager: &MatchManager, owner: PlayerId, guest: PlayerId) -> (i64, Vec<PlayerId>) {
    let id = manager.create_match(owner, 3, 3, 3, RED).await.unwrap();
    manager.join_match(id, guest, BLUE).await.unwrap();
    let order = manager.start_match(id, owner).await.unwrap();
    (id, order.players().to_vec())
}

#[tokio::test]
async fn test_full_lifecycle_through_manager() {
    let (manager, repository) = setup();
    let (id, order) = started_match(&manager, 1, 2).await;

    let moves = [(0, 0), (1, 1), (0, 1), (1, 0)];
    for (turn, (row, col)) in moves.into_iter().enumerate() {
        let outcome = manager
            .submit_turn(id, order[turn % 2], row, col)
            .await
            .unwrap();
        assert_eq!(outcome.conclusion, None);
    }
    let last = manager.submit_turn(id, order[0], 0, 2).await.unwrap();
    assert!(matches!(last.conclusion, Some(Conclusion::Won(_))));

    let stored = repository.load(id).await.unwrap();
    assert_eq!(stored.state(), MatchState::Finished);
    assert_eq!(stored.history().len(), 5);

    let suffix = manager.history(id, 3).await.unwrap();
    assert_eq!(suffix.moves.len(), 2);
    assert_eq!(suffix.conclusion, last.conclusion);
}

#[tokio::test]
async fn test_listing_tracks_state() {
    let (manager, _repository) = setup();
    let first = manager.create_match(1, 3, 3, 3, RED).await.unwrap();
    let second = manager.create_match(2, 5, 5, 4, RED).await.unwrap();
    manager.start_match(first, 1).await.unwrap();

    let waiting = manager
        .list_matches(MatchState::Waiting, None, None)
        .await
        .unwrap();
    assert_eq!(waiting.len(), 1);
    assert_eq!(waiting[0].id, second);
    assert_eq!(waiting[0].win_threshold, 4);

    let started = manager
        .list_matches(MatchState::Started, Some(1), Some(5))
        .await
        .unwrap();
    assert_eq!(started.iter().map(|m| m.id).collect::<Vec<_>>(), vec![first]);
}

#[tokio::test]
async fn test_one_active_match_per_player() {
    let (manager, _repository) = setup();
    let (first, order) = started_match(&manager, 1, 2).await;
    let other = manager.create_match(3, 3, 3, 3, RED).await.unwrap();

    // Player 2 is still playing the first match
    assert_eq!(
        manager.join_match(other, 2, BLUE).await,
        Err(MatchError::AlreadyInAnotherActiveMatch)
    );

    // Finish the first match, then player 2 is free again
    for (turn, (row, col)) in [(0, 0), (1, 1), (0, 1), (1, 0), (0, 2)].into_iter().enumerate() {
        manager
            .submit_turn(first, order[turn % 2], row, col)
            .await
            .unwrap();
    }
    manager.join_match(other, 2, BLUE).await.unwrap();

    let view = manager.match_view(other).await.unwrap();
    assert_eq!(view.players.iter().map(|p| p.player).collect::<Vec<_>>(), vec![2, 3]);
}

#[tokio::test]
async fn test_join_precedence_prefers_color_over_activity() {
    let (manager, _repository) = setup();
    started_match(&manager, 1, 2).await;
    let other = manager.create_match(3, 3, 3, 3, RED).await.unwrap();

    assert_eq!(
        manager.join_match(other, 2, RED).await,
        Err(MatchError::ColorTaken)
    );
    assert_eq!(
        manager.join_match(other, 3, GREEN).await,
        Err(MatchError::AlreadyJoined)
    );
}

#[tokio::test]
async fn test_concurrent_turns_are_serialized() {
    let (manager, _repository) = setup();
    let (id, order) = started_match(&manager, 1, 2).await;

    // Both players race for the same cell many times over
    let mut tasks = Vec::new();
    for attempt in 0..16 {
        let manager = manager.clone();
        let player = order[attempt % 2];
        tasks.push(tokio::spawn(async move {
            manager.submit_turn(id, player, 1, 1).await
        }));
    }

    let mut accepted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(MatchError::CellOccupied | MatchError::NotYourTurn) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(accepted, 1);
    let suffix = manager.history(id, 0).await.unwrap();
    assert_eq!(suffix.moves.len(), 1);
}

#[tokio::test]
async fn test_concurrent_joins_keep_colors_distinct() {
    let (manager, _repository) = setup();
    let id = manager.create_match(1, 5, 5, 3, RED).await.unwrap();

    let mut tasks = Vec::new();
    for player in 2..10 {
        let manager = manager.clone();
        tasks.push(tokio::spawn(async move {
            manager.join_match(id, player, BLUE).await
        }));
    }
    let results: Vec<_> = join_all(tasks).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == MatchError::ColorTaken)
    );
}

async fn join_all<T>(tasks: Vec<tokio::task::JoinHandle<T>>) -> Vec<T> {
    let mut results = Vec::with_capacity(tasks.len());
    for task in tasks {
        results.push(task.await.unwrap());
    }
    results
}

#[tokio::test]
async fn test_matches_reload_after_close() {
    let (manager, _repository) = setup();
    let (id, order) = started_match(&manager, 1, 2).await;
    manager.submit_turn(id, order[0], 2, 2).await.unwrap();

    manager.close_match(id).await.unwrap();
    assert_eq!(manager.active_match_count().await, 0);

    // A fresh actor picks up where the old one stopped
    assert_eq!(
        manager.submit_turn(id, order[0], 0, 0).await,
        Err(MatchError::NotYourTurn)
    );
    manager.submit_turn(id, order[1], 0, 0).await.unwrap();
    assert_eq!(manager.history(id, 0).await.unwrap().moves.len(), 2);
}

#[tokio::test]
async fn test_errors_for_unknown_matches() {
    let (manager, _repository) = setup();
    assert_eq!(
        manager.join_match(404, 1, RED).await,
        Err(MatchError::NotFound(404))
    );
    assert_eq!(
        manager.history(404, 0).await.err(),
        Some(MatchError::NotFound(404))
    );
    manager.close_match(404).await.unwrap();
}
