//! Property-based tests for win detection, turn history and seating
//!
//! Uses proptest to check that the sparse and dense strategies agree on
//! arbitrary boards and that random games keep their bookkeeping straight.

use grid_connect::game::{
    BoardRepr, Cell, Color, Conclusion, DenseBoard, Geometry, LastMove, Match, MatchState,
    PlayerId, SeatColorAssignment, SeatRandomizer, SparseBoard,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn all_cells(width: usize, height: usize) -> Vec<Cell> {
    (0..height)
        .flat_map(|row| (0..width).map(move |col| Cell::new(row, col)))
        .collect()
}

/// A board, a threshold, a seat count and a full move order over the board
fn trace_strategy() -> impl Strategy<Value = (Geometry, usize, Vec<Cell>)> {
    (1usize..=8, 1usize..=8).prop_flat_map(|(width, height)| {
        (
            1..=width.min(height),
            1usize..=4,
            Just(all_cells(width, height)).prop_shuffle(),
        )
            .prop_map(move |(win_threshold, seats, cells)| {
                let geometry = Geometry::new(width, height, win_threshold).unwrap();
                (geometry, seats, cells)
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Both strategies report the same line (or none) after every move
    #[test]
    fn test_sparse_and_dense_agree((geometry, seats, cells) in trace_strategy()) {
        for played in 1..=cells.len() {
            let history = &cells[..played];
            let last = LastMove {
                cell: history[played - 1],
                seat: (played - 1) % seats,
            };

            let sparse = SparseBoard.detect_win(&geometry, history, seats, last);
            let field = DenseBoard::materialize(&geometry, history, seats);
            let dense = field.detect_win(&geometry, history, seats, last);

            prop_assert_eq!(sparse, dense, "disagreement after {} moves", played);
        }
    }

    /// Any reported line really is a run of the last mover's cells
    #[test]
    fn test_reported_line_is_owned((geometry, seats, cells) in trace_strategy()) {
        for played in 1..=cells.len() {
            let history = &cells[..played];
            let seat = (played - 1) % seats;
            let last = LastMove { cell: history[played - 1], seat };
            let field = DenseBoard::materialize(&geometry, history, seats);

            if let Some(line) = field.detect_win(&geometry, history, seats, last) {
                for step in 0..geometry.win_threshold {
                    let cell = line.start.offset(line.direction, step);
                    prop_assert!(cell.is_some());
                    prop_assert_eq!(field.get(cell.unwrap()), Some(seat));
                }
            }
        }
    }

    /// Random games grow history one cell at a time, keep the dense field in
    /// step with it, and end consistently
    #[test]
    fn test_random_game_history(
        (geometry, seats, cells) in trace_strategy(),
        seed in any::<u64>(),
    ) {
        let players = seats.min(geometry.capacity());
        let mut game = Match::create(
            1,
            geometry.width,
            geometry.height,
            geometry.win_threshold,
            Color(0, 0, 0),
        )
        .unwrap();
        for player in 2..=players as PlayerId {
            game.join(player, Color(player as u8, 0, 0), false).unwrap();
        }
        game.start(1, &mut SeatRandomizer::seeded(seed)).unwrap();

        for cell in cells {
            if game.state() == MatchState::Finished {
                break;
            }
            let before = game.history().len();
            let order = game.seat_order().unwrap();
            let player = order.player_at(order.seat_on_turn(before)).unwrap();

            game.submit_turn(player, cell.row as i64, cell.col as i64).unwrap();

            prop_assert_eq!(game.history().len(), before + 1);
            prop_assert_eq!(game.history().last(), Some(&cell));
            prop_assert_eq!(game.history_suffix(before as i64).unwrap().moves, vec![cell]);

            // A live field always mirrors history: move k belongs to seat k mod n
            if game.state() != MatchState::Finished {
                let expected = (game.history().len() > geometry.materialize_after())
                    .then(|| DenseBoard::materialize(&geometry, game.history(), players));
                prop_assert_eq!(game.field(), expected.as_ref());
            }
        }

        let distinct: HashSet<_> = game.history().iter().collect();
        prop_assert_eq!(distinct.len(), game.history().len());
        prop_assert_eq!(game.state(), MatchState::Finished);
        prop_assert!(game.field().is_none());
        match game.conclusion() {
            Some(Conclusion::Draw) => prop_assert_eq!(game.history().len(), geometry.capacity()),
            Some(Conclusion::Won(_)) => {}
            None => prop_assert!(false, "finished match without conclusion"),
        }
    }

    /// Starting a match is a bijection from joined players to seats
    #[test]
    fn test_seat_assignment_is_bijective(
        ids in prop::collection::hash_set(1i64..10_000, 1..20),
        seed in any::<u64>(),
    ) {
        let mut lobby = SeatColorAssignment::default();
        for (i, &player) in ids.iter().enumerate() {
            lobby.insert(player, Color(i as u8, (i >> 8) as u8, 1));
        }

        let order = SeatRandomizer::seeded(seed).assign(lobby.clone());

        prop_assert_eq!(order.len(), ids.len());
        let seated: HashSet<_> = order.players().iter().copied().collect();
        prop_assert_eq!(&seated, &ids);
        for (seat, &player) in order.players().iter().enumerate() {
            prop_assert_eq!(order.seat_of(player), Some(seat));
            prop_assert_eq!(order.colors().get(seat), lobby.color_of(player));
        }
    }
}
