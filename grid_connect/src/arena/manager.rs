//! Match manager for coordinating multiple match actors.

use super::{
    actor::{MatchActor, MatchHandle},
    messages::{MatchMessage, Reply},
};
use crate::{
    db::{MatchRepository, Page},
    game::{
        Color, HistorySuffix, Match, MatchError, MatchId, MatchResult, MatchState, MatchSummary,
        MatchView, PlayerId, SeatOrder, SeatRandomizer, TurnOutcome,
    },
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

/// How often a request is re-sent after landing on a retiring actor
const MAX_DELIVERY_ATTEMPTS: usize = 3;

/// Registry of running match actors
///
/// Matches are loaded from the repository and given an actor the first
/// time they are addressed; afterwards every request for that id goes
/// through the same actor. Actors of finished matches retire on their own
/// and their handles are pruned from the registry.
#[derive(Clone)]
pub struct MatchManager {
    /// Snapshot storage shared with every actor
    repository: Arc<dyn MatchRepository>,

    /// Running actors (`match_id` -> handle)
    matches: Arc<RwLock<HashMap<MatchId, MatchHandle>>>,
}

impl MatchManager {
    /// Create a new match manager
    ///
    /// # Arguments
    ///
    /// * `repository` - Storage for match snapshots
    pub fn new(repository: Arc<dyn MatchRepository>) -> Self {
        Self {
            repository,
            matches: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a new match owned by `owner`
    ///
    /// # Arguments
    ///
    /// * `owner` - Authenticated creator, seated in the lobby immediately
    /// * `width`, `height`, `win_threshold` - Board geometry
    /// * `color` - Owner's stone color
    ///
    /// # Returns
    ///
    /// * `MatchResult<MatchId>` - Id of the stored match
    pub async fn create_match(
        &self,
        owner: PlayerId,
        width: usize,
        height: usize,
        win_threshold: usize,
        color: Color,
    ) -> MatchResult<MatchId> {
        let mut game = Match::create(owner, width, height, win_threshold, color)?;

        if self.repository.has_active_match(owner, None).await? {
            return Err(MatchError::AlreadyInAnotherActiveMatch);
        }

        let match_id = self.repository.insert(&game).await?;
        game.assign_id(match_id);

        let handle = self.spawn(game);
        let mut matches = self.matches.write().await;
        matches.retain(|_, h| !h.is_closed());
        matches.insert(match_id, handle);
        drop(matches);

        log::info!(
            "Created match {} ({}x{}x{}) for player {}",
            match_id,
            width,
            height,
            win_threshold,
            owner
        );

        Ok(match_id)
    }

    /// Get the actor handle for a match, loading it if needed
    ///
    /// # Errors
    ///
    /// `NotFound` when the repository has no such match
    pub async fn handle(&self, match_id: MatchId) -> MatchResult<MatchHandle> {
        {
            let matches = self.matches.read().await;
            if let Some(handle) = matches.get(&match_id).filter(|h| !h.is_closed()) {
                return Ok(handle.clone());
            }
        }

        let game = self.repository.load(match_id).await?;

        let mut matches = self.matches.write().await;
        // Another request may have loaded it while we were reading
        if let Some(handle) = matches.get(&match_id).filter(|h| !h.is_closed()) {
            return Ok(handle.clone());
        }
        matches.retain(|_, h| !h.is_closed());
        let handle = self.spawn(game);
        matches.insert(match_id, handle.clone());
        log::debug!("Loaded match {} from storage", match_id);

        Ok(handle)
    }

    fn spawn(&self, game: Match) -> MatchHandle {
        let (actor, handle) = MatchActor::new(game, self.repository.clone(), SeatRandomizer::new());
        tokio::spawn(actor.run());
        handle
    }

    /// Deliver a request to the match's actor
    ///
    /// A handle can retire between lookup and send; the message was then
    /// never handled, so it is sent again to a freshly loaded actor.
    async fn request<T>(
        &self,
        match_id: MatchId,
        build: impl Fn(Reply<T>) -> MatchMessage,
    ) -> MatchResult<T> {
        let mut attempt = 1;
        loop {
            let handle = self.handle(match_id).await?;
            match handle.request(&build).await {
                Err(MatchError::ActorUnavailable) if attempt < MAX_DELIVERY_ATTEMPTS => {
                    log::debug!("Match {} actor retired, retrying request", match_id);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Join a waiting match
    pub async fn join_match(
        &self,
        match_id: MatchId,
        player: PlayerId,
        color: Color,
    ) -> MatchResult<()> {
        self.request(match_id, |response| MatchMessage::Join {
            player,
            color,
            response,
        })
        .await
    }

    /// Start a match, fixing its seat order
    pub async fn start_match(&self, match_id: MatchId, player: PlayerId) -> MatchResult<SeatOrder> {
        self.request(match_id, |response| MatchMessage::Start { player, response })
            .await
    }

    /// Place a stone for `player`
    pub async fn submit_turn(
        &self,
        match_id: MatchId,
        player: PlayerId,
        row: i64,
        col: i64,
    ) -> MatchResult<TurnOutcome> {
        self.request(match_id, |response| MatchMessage::SubmitTurn {
            player,
            row,
            col,
            response,
        })
        .await
    }

    /// Moves played from index `start` onward
    pub async fn history(&self, match_id: MatchId, start: i64) -> MatchResult<HistorySuffix> {
        self.request(match_id, |response| MatchMessage::History { start, response })
            .await
    }

    /// Public detail view of a match
    pub async fn match_view(&self, match_id: MatchId) -> MatchResult<MatchView> {
        self.request(match_id, |response| MatchMessage::View { response })
            .await
    }

    /// List matches in a given state, oldest first
    ///
    /// Served straight from the repository; actors persist before replying,
    /// so the listing never lags an acknowledged change.
    pub async fn list_matches(
        &self,
        state: MatchState,
        page: Option<usize>,
        count: Option<usize>,
    ) -> MatchResult<Vec<MatchSummary>> {
        self.repository.list(state, Page::new(page, count)).await
    }

    /// Stop a match actor
    ///
    /// The stored match is untouched; a later request loads it again.
    pub async fn close_match(&self, match_id: MatchId) -> MatchResult<()> {
        let handle = self.matches.write().await.remove(&match_id);

        if let Some(handle) = handle {
            // An actor that already stopped has nothing left to close
            match handle.request(|response| MatchMessage::Close { response }).await {
                Ok(()) | Err(MatchError::ActorUnavailable) => {}
                Err(e) => return Err(e),
            }
            log::info!("Closed match actor {}", match_id);
        }

        Ok(())
    }

    /// Get running actor count
    pub async fn active_match_count(&self) -> usize {
        let matches = self.matches.read().await;
        matches.values().filter(|h| !h.is_closed()).count()
    }
}
