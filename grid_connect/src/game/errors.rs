//! Error types for match operations

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::MatchId;

/// Result type for match operations
pub type MatchResult<T> = Result<T, MatchError>;

/// Rejections a match operation can produce.
///
/// Every kind is recoverable: callers surface it as a rejected request and
/// the match is left exactly as it was.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum MatchError {
    #[error("invalid match configuration: {0}")]
    InvalidConfig(String),
    #[error("match already started")]
    AlreadyStarted,
    #[error("color already taken")]
    ColorTaken,
    #[error("player is already in another active match")]
    AlreadyInAnotherActiveMatch,
    #[error("player already joined this match")]
    AlreadyJoined,
    #[error("match has no free seats")]
    MatchFull,
    #[error("only the owner can start the match")]
    NotOwner,
    #[error("match not started")]
    NotStarted,
    #[error("match already finished")]
    AlreadyFinished,
    #[error("not your turn")]
    NotYourTurn,
    #[error("cell out of bounds")]
    OutOfBounds,
    #[error("cell already occupied")]
    CellOccupied,
    #[error("history index out of range: {0}")]
    OutOfRange(i64),
    #[error("match not found: {0}")]
    NotFound(MatchId),
    #[error("repository error: {0}")]
    Repository(String),
    #[error("match actor unavailable")]
    ActorUnavailable,
}

impl MatchError {
    /// Stable machine-readable code for transport layers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "invalid_config",
            Self::AlreadyStarted => "already_started",
            Self::ColorTaken => "color_taken",
            Self::AlreadyInAnotherActiveMatch => "already_in_another_active_match",
            Self::AlreadyJoined => "already_joined",
            Self::MatchFull => "match_full",
            Self::NotOwner => "not_owner",
            Self::NotStarted => "not_started",
            Self::AlreadyFinished => "already_finished",
            Self::NotYourTurn => "not_your_turn",
            Self::OutOfBounds => "out_of_bounds",
            Self::CellOccupied => "cell_occupied",
            Self::OutOfRange(_) => "out_of_range",
            Self::NotFound(_) => "not_found",
            Self::Repository(_) => "repository",
            Self::ActorUnavailable => "unavailable",
        }
    }

    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        match self {
            MatchError::Repository(_) => "Internal server error".to_string(),
            MatchError::NotFound(_) => "Match not found".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<sqlx::Error> for MatchError {
    fn from(err: sqlx::Error) -> Self {
        MatchError::Repository(err.to_string())
    }
}

impl From<serde_json::Error> for MatchError {
    fn from(err: serde_json::Error) -> Self {
        MatchError::Repository(format!("snapshot encoding: {err}"))
    }
}
