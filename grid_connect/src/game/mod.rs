//! Match engine - lifecycle, turn validation and win detection.
//!
//! This module provides the single-match rules:
//! - Board geometry and the sparse/dense ownership representations
//! - Randomized seating with per-seat colors
//! - Turn validation with deterministic error precedence
//! - Incremental win-line detection around the last move

pub mod board;
pub mod constants;
pub mod entities;
pub mod errors;
pub mod seats;
pub mod state_machine;
pub mod turn;
pub mod win;

pub use board::{Board, BoardRepr, DenseBoard, Geometry, SparseBoard};
pub use entities::{
    Cell, Color, Conclusion, Direction, HistorySuffix, MatchId, MatchState, MatchSummary,
    MatchView, PlayerId, SeatIndex, SeatView, WinLine,
};
pub use errors::{MatchError, MatchResult};
pub use seats::{OrderedColors, SeatColorAssignment, SeatOrder, SeatRandomizer, Seating};
pub use state_machine::{Match, TurnOutcome};
pub use win::LastMove;
