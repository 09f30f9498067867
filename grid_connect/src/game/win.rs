//! Incremental win-line detection.
//!
//! Only runs touching the just-played cell can complete on this turn, so
//! detection never rescans the board. Both strategies fill the same
//! [`Captures`] table and share [`check_captured`]; they differ only in
//! where ownership is read from.

use super::{
    board::{DenseBoard, Geometry},
    entities::{Cell, Direction, SeatIndex, WinLine},
};

/// Contiguous same-seat run lengths in each of the eight directions around
/// the just-played cell, indexed by `(di + 1, dj + 1)`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Captures([[usize; 3]; 3]);

impl Captures {
    #[must_use]
    pub fn get(&self, direction: Direction) -> usize {
        self.0[(direction.di + 1) as usize][(direction.dj + 1) as usize]
    }

    pub fn set(&mut self, direction: Direction, distance: usize) {
        self.0[(direction.di + 1) as usize][(direction.dj + 1) as usize] = distance;
    }
}

/// Everything a strategy needs to know about the move being checked.
#[derive(Clone, Copy, Debug)]
pub struct LastMove {
    pub cell: Cell,
    pub seat: SeatIndex,
}

/// Walks outward from the last move on the dense field, at most
/// `win_threshold - 1` steps per direction.
#[must_use]
pub fn dense_captures(field: &DenseBoard, geometry: &Geometry, last: LastMove) -> Captures {
    let mut captures = Captures::default();
    for direction in Direction::ALL {
        for distance in 1..geometry.win_threshold {
            let owner = last
                .cell
                .offset(direction, distance)
                .filter(|cell| geometry.contains(*cell))
                .and_then(|cell| field.get(cell));
            if owner != Some(last.seat) {
                break;
            }
            captures.set(direction, distance);
        }
    }
    captures
}

/// Derives captures from the acting seat's own moves in `history`.
///
/// Candidates are visited nearest-first by Manhattan distance. Along any of
/// the eight rays that distance grows strictly with the step count, so each
/// ray is seen in order and a gap permanently stops its run. Runs are capped
/// at `win_threshold - 1` so the reported line matches [`dense_captures`].
#[must_use]
pub fn sparse_captures(
    history: &[Cell],
    seats: usize,
    geometry: &Geometry,
    last: LastMove,
) -> Captures {
    let mut candidates: Vec<Cell> = history
        .iter()
        .copied()
        .skip(last.seat)
        .step_by(seats.max(1))
        .collect();
    candidates.sort_by_key(|cell| cell.manhattan(last.cell));

    let mut captures = Captures::default();
    for candidate in candidates {
        let Some((direction, distance)) = Direction::between(last.cell, candidate) else {
            continue;
        };
        if distance < geometry.win_threshold && captures.get(direction) + 1 == distance {
            captures.set(direction, distance);
        }
    }
    captures
}

/// Returns the first line, in [`Direction::ALL`] order, whose two halves plus
/// the last cell reach the threshold.
#[must_use]
pub fn check_captured(captures: &Captures, last: Cell, win_threshold: usize) -> Option<WinLine> {
    Direction::ALL.into_iter().find_map(|direction| {
        let forward = captures.get(direction);
        if forward + captures.get(direction.opposite()) + 1 < win_threshold {
            return None;
        }
        last.offset(direction, forward).map(|start| WinLine {
            start,
            direction: direction.opposite(),
        })
    })
}
