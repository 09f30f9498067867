//! Turn preconditions.
//!
//! Checks run in a fixed order so the reported error is deterministic:
//! match state, then whose turn it is, then geometry, then occupancy.

use super::{
    board::BoardRepr,
    entities::{Cell, MatchState, PlayerId, SeatIndex},
    errors::{MatchError, MatchResult},
    state_machine::Match,
};

/// A move that passed validation and may be applied.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PendingTurn {
    pub cell: Cell,
    pub seat: SeatIndex,
}

/// Validate a turn request against the current match state
///
/// # Arguments
///
/// * `game` - The match the turn targets
/// * `requester` - Authenticated player submitting the move
/// * `row`, `col` - Requested coordinates, possibly negative
///
/// # Errors
///
/// `NotStarted`, `AlreadyFinished`, `NotYourTurn`, `OutOfBounds` or
/// `CellOccupied`, in that order of precedence.
pub fn validate(game: &Match, requester: PlayerId, row: i64, col: i64) -> MatchResult<PendingTurn> {
    match game.state() {
        MatchState::Waiting => return Err(MatchError::NotStarted),
        MatchState::Finished => return Err(MatchError::AlreadyFinished),
        MatchState::Started => {}
    }

    let order = game.seat_order().ok_or(MatchError::NotStarted)?;
    let seat = order.seat_on_turn(game.history().len());
    if order.player_at(seat) != Some(requester) {
        return Err(MatchError::NotYourTurn);
    }

    let cell = to_cell(row, col)
        .filter(|cell| game.geometry().contains(*cell))
        .ok_or(MatchError::OutOfBounds)?;

    if game.board().is_occupied(game.history(), cell) {
        return Err(MatchError::CellOccupied);
    }

    Ok(PendingTurn { cell, seat })
}

fn to_cell(row: i64, col: i64) -> Option<Cell> {
    let row = usize::try_from(row).ok()?;
    let col = usize::try_from(col).ok()?;
    Some(Cell::new(row, col))
}
