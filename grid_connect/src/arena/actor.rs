//! Match actor implementation with async message handling.

use super::messages::MatchMessage;
use crate::{
    db::MatchRepository,
    game::{
        Color, HistorySuffix, Match, MatchError, MatchId, MatchResult, MatchState, PlayerId,
        SeatOrder, SeatRandomizer, TurnOutcome,
    },
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

const INBOX_CAPACITY: usize = 100;

/// Match actor handle for sending messages
#[derive(Clone, Debug)]
pub struct MatchHandle {
    sender: mpsc::Sender<MatchMessage>,
    match_id: MatchId,
}

impl MatchHandle {
    /// Create a new match handle
    pub fn new(sender: mpsc::Sender<MatchMessage>, match_id: MatchId) -> Self {
        Self { sender, match_id }
    }

    /// Get match ID
    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    /// Whether the actor behind this handle has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the match
    pub async fn send(&self, message: MatchMessage) -> MatchResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| MatchError::ActorUnavailable)
    }

    /// Send a request built around a fresh reply channel and await the answer
    pub async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<MatchResult<T>>) -> MatchMessage,
    ) -> MatchResult<T> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;
        rx.await.map_err(|_| MatchError::ActorUnavailable)?
    }
}

/// Actor owning a single match
///
/// Requests for one match are handled strictly in arrival order, so two
/// turns can never interleave. Every accepted mutation is written to the
/// repository before the caller hears about it; a failed write leaves the
/// in-memory match unchanged.
///
/// The actor retires once its match is finished or a close request arrives:
/// the inbox stops accepting messages, whatever is already queued is still
/// answered, and the task ends.
pub struct MatchActor {
    /// Match state
    game: Match,

    /// Snapshot storage
    repository: Arc<dyn MatchRepository>,

    /// Turn-order shuffler
    randomizer: SeatRandomizer,

    /// Message inbox
    inbox: mpsc::Receiver<MatchMessage>,
}

impl MatchActor {
    /// Create a new match actor
    ///
    /// # Arguments
    ///
    /// * `game` - Match with its id already assigned
    /// * `repository` - Where accepted changes are persisted
    /// * `randomizer` - Source of the seat order
    ///
    /// # Returns
    ///
    /// * `(MatchActor, MatchHandle)` - Actor and handle for sending messages
    pub fn new(
        game: Match,
        repository: Arc<dyn MatchRepository>,
        randomizer: SeatRandomizer,
    ) -> (Self, MatchHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let handle = MatchHandle::new(sender, game.id());

        let actor = Self {
            game,
            repository,
            randomizer,
            inbox,
        };

        (actor, handle)
    }

    /// Run the match actor event loop
    pub async fn run(mut self) {
        log::info!("Match {} actor starting: {}", self.game.id(), self.game);

        while let Some(message) = self.inbox.recv().await {
            log::trace!("Match {}: handling {}", self.game.id(), message.kind());
            self.handle_message(message).await;
        }

        log::info!("Match {} actor stopped", self.game.id());
    }

    /// Handle a match message
    ///
    /// The inbox is closed before a reply goes out, so a caller that sees a
    /// match finish also sees its handle closed.
    async fn handle_message(&mut self, message: MatchMessage) {
        match message {
            MatchMessage::Join {
                player,
                color,
                response,
            } => {
                let result = self.handle_join(player, color).await;
                self.retire_if_finished();
                let _ = response.send(result);
            }

            MatchMessage::Start { player, response } => {
                let result = self.handle_start(player).await;
                self.retire_if_finished();
                let _ = response.send(result);
            }

            MatchMessage::SubmitTurn {
                player,
                row,
                col,
                response,
            } => {
                let result = self.handle_turn(player, row, col).await;
                self.retire_if_finished();
                let _ = response.send(result);
            }

            MatchMessage::History { start, response } => {
                let result = self.handle_history(start);
                self.retire_if_finished();
                let _ = response.send(result);
            }

            MatchMessage::View { response } => {
                let view = self.game.view();
                self.retire_if_finished();
                let _ = response.send(Ok(view));
            }

            MatchMessage::Close { response } => {
                self.inbox.close();
                let _ = response.send(Ok(()));
            }
        }
    }

    /// Stop accepting messages once nothing can change any more
    fn retire_if_finished(&mut self) {
        if self.game.state() == MatchState::Finished {
            self.inbox.close();
        }
    }

    async fn handle_join(&mut self, player: PlayerId, color: Color) -> MatchResult<()> {
        // Closed lobbies answer without a repository round trip
        if self.game.state() != MatchState::Waiting {
            return Err(MatchError::AlreadyStarted);
        }
        let active_elsewhere = if self.game.has_player(player) {
            false
        } else {
            self.repository
                .has_active_match(player, Some(self.game.id()))
                .await?
        };

        let mut next = self.game.clone();
        next.join(player, color, active_elsewhere)?;
        self.commit(next).await
    }

    async fn handle_start(&mut self, player: PlayerId) -> MatchResult<SeatOrder> {
        let mut next = self.game.clone();
        let order = next.start(player, &mut self.randomizer)?.clone();
        self.commit(next).await?;
        Ok(order)
    }

    /// Turns are applied in place; only a failed write pays for undoing one.
    async fn handle_turn(&mut self, player: PlayerId, row: i64, col: i64) -> MatchResult<TurnOutcome> {
        let outcome = self.game.submit_turn(player, row, col)?;
        if let Err(e) = self.repository.save(&self.game).await {
            log::error!("Match {}: failed to persist turn: {}", self.game.id(), e);
            self.game.revert_turn(&outcome);
            return Err(e);
        }
        Ok(outcome)
    }

    fn handle_history(&self, start: i64) -> MatchResult<HistorySuffix> {
        self.game.history_suffix(start)
    }

    /// Persist `next` and adopt it as the current state
    async fn commit(&mut self, next: Match) -> MatchResult<()> {
        if let Err(e) = self.repository.save(&next).await {
            log::error!("Match {}: failed to persist change: {}", next.id(), e);
            return Err(e);
        }
        self.game = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{InMemoryMatchRepository, Page},
        game::{MatchSummary, MatchView},
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// In-memory storage whose writes can be switched off
    #[derive(Default)]
    struct FlakyRepository {
        inner: InMemoryMatchRepository,
        refuse_saves: AtomicBool,
    }

    #[async_trait]
    impl MatchRepository for FlakyRepository {
        async fn insert(&self, game: &Match) -> MatchResult<MatchId> {
            self.inner.insert(game).await
        }

        async fn load(&self, id: MatchId) -> MatchResult<Match> {
            self.inner.load(id).await
        }

        async fn save(&self, game: &Match) -> MatchResult<()> {
            if self.refuse_saves.load(Ordering::SeqCst) {
                return Err(MatchError::Repository("disk full".to_string()));
            }
            self.inner.save(game).await
        }

        async fn has_active_match(
            &self,
            player: PlayerId,
            excluding: Option<MatchId>,
        ) -> MatchResult<bool> {
            self.inner.has_active_match(player, excluding).await
        }

        async fn list(&self, state: MatchState, page: Page) -> MatchResult<Vec<MatchSummary>> {
            self.inner.list(state, page).await
        }
    }

    /// Started 3x3x3 match between players 1 and 2, returning the handle
    /// and the players in seat order.
    async fn spawn_started(
        repository: Arc<FlakyRepository>,
    ) -> (MatchHandle, Vec<PlayerId>) {
        let mut game = Match::create(1, 3, 3, 3, Color(255, 0, 0)).unwrap();
        game.join(2, Color(0, 0, 255), false).unwrap();
        game.start(1, &mut SeatRandomizer::seeded(3)).unwrap();
        let order = game.seat_order().unwrap().players().to_vec();
        let id = repository.insert(&game).await.unwrap();
        game.assign_id(id);

        let (actor, handle) = MatchActor::new(game, repository, SeatRandomizer::seeded(1));
        tokio::spawn(actor.run());
        (handle, order)
    }

    async fn turn(handle: &MatchHandle, player: PlayerId, row: i64, col: i64) -> MatchResult<TurnOutcome> {
        handle
            .request(|response| MatchMessage::SubmitTurn {
                player,
                row,
                col,
                response,
            })
            .await
    }

    async fn spawn_lobby() -> (MatchHandle, Arc<InMemoryMatchRepository>) {
        let repository = Arc::new(InMemoryMatchRepository::new());
        let mut game = Match::create(1, 3, 3, 3, Color(255, 0, 0)).unwrap();
        let id = repository.insert(&game).await.unwrap();
        game.assign_id(id);

        let (actor, handle) = MatchActor::new(game, repository.clone(), SeatRandomizer::seeded(1));
        tokio::spawn(actor.run());
        (handle, repository)
    }

    #[tokio::test]
    async fn test_join_is_persisted() {
        let (handle, repository) = spawn_lobby().await;

        handle
            .request(|response| MatchMessage::Join {
                player: 2,
                color: Color(0, 0, 255),
                response,
            })
            .await
            .unwrap();

        let stored = repository.load(handle.match_id()).await.unwrap();
        assert_eq!(stored.players(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_rejected_request_changes_nothing() {
        let (handle, repository) = spawn_lobby().await;

        let result = handle
            .request(|response| MatchMessage::Start { player: 2, response })
            .await;
        assert_eq!(result, Err(MatchError::NotOwner));

        let view: MatchView = handle
            .request(|response| MatchMessage::View { response })
            .await
            .unwrap();
        assert_eq!(view.state, MatchState::Waiting);
        assert_eq!(
            repository.load(handle.match_id()).await.unwrap().state(),
            MatchState::Waiting
        );
    }

    #[tokio::test]
    async fn test_closed_actor_is_unavailable() {
        let (handle, _repository) = spawn_lobby().await;

        handle
            .request(|response| MatchMessage::Close { response })
            .await
            .unwrap();

        let result = handle
            .request(|response| MatchMessage::View { response })
            .await;
        assert_eq!(result.err(), Some(MatchError::ActorUnavailable));
    }

    #[tokio::test]
    async fn test_failed_turn_write_is_undone() {
        let repository = Arc::new(FlakyRepository::default());
        let (handle, order) = spawn_started(repository.clone()).await;
        turn(&handle, order[0], 0, 0).await.unwrap();

        repository.refuse_saves.store(true, Ordering::SeqCst);
        let result = turn(&handle, order[1], 1, 1).await;
        assert!(matches!(result, Err(MatchError::Repository(_))));

        let view: MatchView = handle
            .request(|response| MatchMessage::View { response })
            .await
            .unwrap();
        assert_eq!(view.history.len(), 1);

        repository.refuse_saves.store(false, Ordering::SeqCst);
        turn(&handle, order[1], 1, 1).await.unwrap();
        let stored = repository.load(handle.match_id()).await.unwrap();
        assert_eq!(stored.history().len(), 2);
    }

    #[tokio::test]
    async fn test_finishing_turn_retires_actor() {
        let repository = Arc::new(FlakyRepository::default());
        let (handle, order) = spawn_started(repository.clone()).await;

        for (turn_index, (row, col)) in [(0, 0), (1, 1), (0, 1), (1, 0)].into_iter().enumerate() {
            turn(&handle, order[turn_index % 2], row, col).await.unwrap();
        }
        assert!(!handle.is_closed());

        let outcome = turn(&handle, order[0], 0, 2).await.unwrap();
        assert!(outcome.conclusion.is_some());
        assert!(handle.is_closed());
        assert_eq!(
            repository.load(handle.match_id()).await.unwrap().state(),
            MatchState::Finished
        );
    }
}
