//! In-memory match repository for tests and database-less servers.

use async_trait::async_trait;
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicI64, Ordering},
};
use tokio::sync::RwLock;

use super::repository::{MatchRepository, Page};
use crate::game::{
    Match, MatchError, MatchId, MatchResult, MatchState, MatchSummary, PlayerId,
};

/// Stores match snapshots in a map keyed by id.
pub struct InMemoryMatchRepository {
    matches: RwLock<BTreeMap<MatchId, Match>>,
    next_id: AtomicI64,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self {
            matches: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored matches, in any state
    pub async fn len(&self) -> usize {
        self.matches.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.matches.read().await.is_empty()
    }
}

impl Default for InMemoryMatchRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn insert(&self, game: &Match) -> MatchResult<MatchId> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut stored = game.clone();
        stored.assign_id(id);
        self.matches.write().await.insert(id, stored);
        Ok(id)
    }

    async fn load(&self, id: MatchId) -> MatchResult<Match> {
        self.matches
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(MatchError::NotFound(id))
    }

    async fn save(&self, game: &Match) -> MatchResult<()> {
        let mut matches = self.matches.write().await;
        let slot = matches
            .get_mut(&game.id())
            .ok_or(MatchError::NotFound(game.id()))?;
        *slot = game.clone();
        Ok(())
    }

    async fn has_active_match(
        &self,
        player: PlayerId,
        excluding: Option<MatchId>,
    ) -> MatchResult<bool> {
        let matches = self.matches.read().await;
        Ok(matches.values().any(|game| {
            Some(game.id()) != excluding
                && game.state() != MatchState::Finished
                && game.has_player(player)
        }))
    }

    async fn list(&self, state: MatchState, page: Page) -> MatchResult<Vec<MatchSummary>> {
        let matches = self.matches.read().await;
        Ok(matches
            .values()
            .filter(|game| game.state() == state)
            .skip(page.offset())
            .take(page.count)
            .map(Match::summary)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Color, SeatRandomizer};

    fn lobby(owner: PlayerId) -> Match {
        Match::create(owner, 3, 3, 3, Color(owner as u8, 0, 0)).unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let repo = InMemoryMatchRepository::new();
        let first = repo.insert(&lobby(1)).await.unwrap();
        let second = repo.insert(&lobby(2)).await.unwrap();
        assert!(second > first);
        assert_eq!(repo.load(first).await.unwrap().id(), first);
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_load_unknown_is_not_found() {
        let repo = InMemoryMatchRepository::new();
        assert_eq!(repo.load(77).await, Err(MatchError::NotFound(77)));
        assert_eq!(repo.save(&lobby(1)).await, Err(MatchError::NotFound(0)));
    }

    #[tokio::test]
    async fn test_active_match_lookup() {
        let repo = InMemoryMatchRepository::new();
        let id = repo.insert(&lobby(1)).await.unwrap();

        assert!(repo.has_active_match(1, None).await.unwrap());
        assert!(!repo.has_active_match(1, Some(id)).await.unwrap());
        assert!(!repo.has_active_match(2, None).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_filters_by_state_and_pages() {
        let repo = InMemoryMatchRepository::new();
        for owner in 1..=5 {
            repo.insert(&lobby(owner)).await.unwrap();
        }
        let mut started = repo.load(2).await.unwrap();
        started.start(started.owner(), &mut SeatRandomizer::seeded(0)).unwrap();
        repo.save(&started).await.unwrap();

        let waiting = repo
            .list(MatchState::Waiting, Page::new(Some(1), Some(3)))
            .await
            .unwrap();
        assert_eq!(waiting.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 3, 4]);

        let second_page = repo
            .list(MatchState::Waiting, Page::new(Some(2), Some(3)))
            .await
            .unwrap();
        assert_eq!(second_page.iter().map(|m| m.id).collect::<Vec<_>>(), vec![5]);

        let started = repo.list(MatchState::Started, Page::default()).await.unwrap();
        assert_eq!(started.len(), 1);
    }

    #[tokio::test]
    async fn test_far_page_is_empty() {
        let repo = InMemoryMatchRepository::new();
        repo.insert(&lobby(1)).await.unwrap();

        let page = Page::new(Some(usize::MAX), Some(100));
        assert!(repo.list(MatchState::Waiting, page).await.unwrap().is_empty());
    }
}
