//! Repository trait definitions for testability and dependency injection.
//!
//! This module provides the storage abstraction the match engine consumes:
//! load-by-id, save, and the "does this player have an active match" query.

use async_trait::async_trait;
use sqlx::{PgPool, Row, types::Json};

use crate::game::{
    Match, MatchError, MatchId, MatchResult, MatchState, MatchSummary, PlayerId,
    constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
};

/// One page of a match listing, 1-based.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Page {
    pub page: usize,
    pub count: usize,
}

impl Page {
    /// Clamp a requested page into range, filling in defaults
    pub fn new(page: Option<usize>, count: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            count: count.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip; saturates so far-out pages simply come back empty
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.count)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Trait for match repository operations
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Store a new match, assigning its id
    async fn insert(&self, game: &Match) -> MatchResult<MatchId>;

    /// Load a match by id
    ///
    /// # Errors
    ///
    /// `MatchError::NotFound` when no match has this id
    async fn load(&self, id: MatchId) -> MatchResult<Match>;

    /// Overwrite a stored match with its current state
    async fn save(&self, game: &Match) -> MatchResult<()>;

    /// Whether the player sits in any unfinished match other than `excluding`
    async fn has_active_match(
        &self,
        player: PlayerId,
        excluding: Option<MatchId>,
    ) -> MatchResult<bool>;

    /// Matches in `state`, oldest first
    async fn list(&self, state: MatchState, page: Page) -> MatchResult<Vec<MatchSummary>>;
}

/// Default PostgreSQL implementation of `MatchRepository`
///
/// Each match is one row: the full serde snapshot plus the `state` and
/// `players` columns that listing and the active-match query filter on.
pub struct PgMatchRepository {
    pool: PgPool,
}

impl PgMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchRepository for PgMatchRepository {
    async fn insert(&self, game: &Match) -> MatchResult<MatchId> {
        let id: i64 = sqlx::query_scalar("SELECT nextval(pg_get_serial_sequence('matches', 'id'))")
            .fetch_one(&self.pool)
            .await?;

        let mut stored = game.clone();
        stored.assign_id(id);

        sqlx::query(
            "INSERT INTO matches (id, state, players, snapshot, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(stored.state().as_str())
        .bind(Json(stored.players()))
        .bind(Json(&stored))
        .bind(stored.created_at())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn load(&self, id: MatchId) -> MatchResult<Match> {
        let row = sqlx::query("SELECT snapshot FROM matches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(MatchError::NotFound(id))?;

        let Json(game): Json<Match> = row.try_get("snapshot")?;
        Ok(game)
    }

    async fn save(&self, game: &Match) -> MatchResult<()> {
        let result =
            sqlx::query("UPDATE matches SET state = $2, players = $3, snapshot = $4 WHERE id = $1")
                .bind(game.id())
                .bind(game.state().as_str())
                .bind(Json(game.players()))
                .bind(Json(game))
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(MatchError::NotFound(game.id()));
        }
        Ok(())
    }

    async fn has_active_match(
        &self,
        player: PlayerId,
        excluding: Option<MatchId>,
    ) -> MatchResult<bool> {
        let active: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM matches
                WHERE state <> 'finished'
                  AND players @> $1
                  AND ($2::BIGINT IS NULL OR id <> $2)
            )",
        )
        .bind(Json([player]))
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;

        Ok(active)
    }

    async fn list(&self, state: MatchState, page: Page) -> MatchResult<Vec<MatchSummary>> {
        let rows = sqlx::query(
            "SELECT snapshot FROM matches WHERE state = $1 ORDER BY id ASC LIMIT $2 OFFSET $3",
        )
        .bind(state.as_str())
        .bind(page.count as i64)
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> MatchResult<MatchSummary> {
                let Json(game): Json<Match> = row.try_get("snapshot")?;
                Ok(game.summary())
            })
            .collect()
    }
}
