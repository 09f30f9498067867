//! Board geometry and the two interchangeable ownership representations.
//!
//! A match starts sparse, answering every question from its move history.
//! Once the history outgrows `2 * min(width, height)` the materializer builds
//! a dense field once and keeps it in step with later moves.

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use super::{
    constants::MAX_BOARD_DIMENSION,
    entities::{Cell, SeatIndex, WinLine},
    errors::{MatchError, MatchResult},
    win::{self, LastMove},
};

/// Board size and the run length needed to win.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
    pub win_threshold: usize,
}

impl Geometry {
    /// Validate a requested configuration
    pub fn new(width: usize, height: usize, win_threshold: usize) -> MatchResult<Self> {
        for (name, value) in [
            ("width", width),
            ("height", height),
            ("win_threshold", win_threshold),
        ] {
            if value == 0 || value > MAX_BOARD_DIMENSION {
                return Err(MatchError::InvalidConfig(format!(
                    "{name} must be between 1 and {MAX_BOARD_DIMENSION}"
                )));
            }
        }
        if win_threshold > width || win_threshold > height {
            return Err(MatchError::InvalidConfig(
                "win_threshold must not exceed width or height".to_string(),
            ));
        }
        Ok(Self {
            width,
            height,
            win_threshold,
        })
    }

    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.width * self.height
    }

    /// History length past which a dense field pays for itself.
    #[must_use]
    pub fn materialize_after(&self) -> usize {
        2 * self.width.min(self.height)
    }
}

/// Ownership queries shared by both board representations.
#[enum_dispatch]
pub trait BoardRepr {
    /// Whether `cell` already holds a piece.
    fn is_occupied(&self, history: &[Cell], cell: Cell) -> bool;

    /// Records an accepted move. `history` already contains it.
    fn record(&mut self, cell: Cell, seat: SeatIndex);

    /// Looks for a completed line through the last move.
    fn detect_win(
        &self,
        geometry: &Geometry,
        history: &[Cell],
        seats: usize,
        last: LastMove,
    ) -> Option<WinLine>;
}

/// No grid at all; history is the board.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SparseBoard;

impl BoardRepr for SparseBoard {
    fn is_occupied(&self, history: &[Cell], cell: Cell) -> bool {
        history.contains(&cell)
    }

    fn record(&mut self, _cell: Cell, _seat: SeatIndex) {}

    fn detect_win(
        &self,
        geometry: &Geometry,
        history: &[Cell],
        seats: usize,
        last: LastMove,
    ) -> Option<WinLine> {
        let captures = win::sparse_captures(history, seats, geometry, last);
        win::check_captured(&captures, last.cell, geometry.win_threshold)
    }
}

/// Materialized `height x width` grid of seat indices, row-major.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DenseBoard {
    width: usize,
    height: usize,
    cells: Vec<Option<SeatIndex>>,
}

impl DenseBoard {
    #[must_use]
    pub fn empty(geometry: &Geometry) -> Self {
        Self {
            width: geometry.width,
            height: geometry.height,
            cells: vec![None; geometry.capacity()],
        }
    }

    /// Replays `history` so that move `k` is owned by seat `k mod seats`.
    #[must_use]
    pub fn materialize(geometry: &Geometry, history: &[Cell], seats: usize) -> Self {
        let mut field = Self::empty(geometry);
        for (index, &cell) in history.iter().enumerate() {
            field.record(cell, index % seats.max(1));
        }
        field
    }

    #[must_use]
    pub fn get(&self, cell: Cell) -> Option<SeatIndex> {
        self.index(cell).and_then(|index| self.cells[index])
    }

    /// Grid rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<SeatIndex>]> {
        self.cells.chunks(self.width.max(1))
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        (cell.row < self.height && cell.col < self.width).then(|| cell.row * self.width + cell.col)
    }
}

impl BoardRepr for DenseBoard {
    fn is_occupied(&self, _history: &[Cell], cell: Cell) -> bool {
        self.get(cell).is_some()
    }

    fn record(&mut self, cell: Cell, seat: SeatIndex) {
        if let Some(index) = self.index(cell) {
            self.cells[index] = Some(seat);
        }
    }

    fn detect_win(
        &self,
        geometry: &Geometry,
        _history: &[Cell],
        _seats: usize,
        last: LastMove,
    ) -> Option<WinLine> {
        let captures = win::dense_captures(self, geometry, last);
        win::check_captured(&captures, last.cell, geometry.win_threshold)
    }
}

/// The representation a match currently uses.
#[enum_dispatch(BoardRepr)]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "field", rename_all = "lowercase")]
pub enum Board {
    Sparse(SparseBoard),
    Dense(DenseBoard),
}

impl Default for Board {
    fn default() -> Self {
        Board::Sparse(SparseBoard)
    }
}

impl Board {
    #[must_use]
    pub fn is_dense(&self) -> bool {
        matches!(self, Board::Dense(_))
    }

    #[must_use]
    pub fn field(&self) -> Option<&DenseBoard> {
        match self {
            Board::Dense(field) => Some(field),
            Board::Sparse(_) => None,
        }
    }

    /// Switches to the dense field once the history is long enough. Returns
    /// `true` on the turn the field gets built.
    pub fn materialize_if_due(
        &mut self,
        geometry: &Geometry,
        history: &[Cell],
        seats: usize,
    ) -> bool {
        if self.is_dense() || history.len() <= geometry.materialize_after() {
            return false;
        }
        *self = Board::Dense(DenseBoard::materialize(geometry, history, seats));
        true
    }

    /// Drops the scratch field; finished matches keep only their history.
    pub fn discard(&mut self) {
        *self = Board::default();
    }
}
