//! Match actor message types.

use crate::game::{
    Color, HistorySuffix, MatchResult, MatchView, PlayerId, SeatOrder, TurnOutcome,
};
use tokio::sync::oneshot;

/// Reply channel carried by every request
pub type Reply<T> = oneshot::Sender<MatchResult<T>>;

/// Messages that can be sent to a MatchActor
#[derive(Debug)]
pub enum MatchMessage {
    /// Join a waiting match
    Join {
        player: PlayerId,
        color: Color,
        response: Reply<()>,
    },

    /// Owner starts the match
    Start {
        player: PlayerId,
        response: Reply<SeatOrder>,
    },

    /// Place a stone for the seat on turn
    SubmitTurn {
        player: PlayerId,
        row: i64,
        col: i64,
        response: Reply<TurnOutcome>,
    },

    /// Moves from `start` onward
    History {
        start: i64,
        response: Reply<HistorySuffix>,
    },

    /// Full public view of the match
    View { response: Reply<MatchView> },

    /// Stop the actor
    Close { response: Reply<()> },
}

impl MatchMessage {
    /// Short label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            MatchMessage::Join { .. } => "join",
            MatchMessage::Start { .. } => "start",
            MatchMessage::SubmitTurn { .. } => "submit_turn",
            MatchMessage::History { .. } => "history",
            MatchMessage::View { .. } => "view",
            MatchMessage::Close { .. } => "close",
        }
    }
}
