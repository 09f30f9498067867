//! End-to-end match scenarios on the engine
//!
//! Moves are always submitted by whichever player the seat order puts on
//! turn, so the scenarios do not depend on how seats were shuffled.

use grid_connect::game::{
    BoardRepr, Cell, Color, Conclusion, Direction, Match, MatchError, MatchState,
    PlayerId, SeatRandomizer, SparseBoard, TurnOutcome, WinLine,
};

const RED: Color = Color(255, 0, 0);
const BLUE: Color = Color(0, 0, 255);

fn two_player_match(width: usize, height: usize, win_threshold: usize) -> Match {
    let mut game = Match::create(1, width, height, win_threshold, RED).unwrap();
    game.join(2, BLUE, false).unwrap();
    game.start(1, &mut SeatRandomizer::seeded(99)).unwrap();
    game
}

fn on_turn(game: &Match) -> PlayerId {
    let order = game.seat_order().unwrap();
    order.player_at(order.seat_on_turn(game.history().len())).unwrap()
}

fn play(game: &mut Match, row: usize, col: usize) -> TurnOutcome {
    let player = on_turn(game);
    game.submit_turn(player, row as i64, col as i64).unwrap()
}

#[test]
fn scenario_a_top_row_win() {
    let mut game = two_player_match(3, 3, 3);
    let first = on_turn(&game);

    for (row, col) in [(0, 0), (1, 1), (0, 1), (1, 0)] {
        assert_eq!(play(&mut game, row, col).conclusion, None);
    }
    let outcome = play(&mut game, 0, 2);

    let line = WinLine {
        start: Cell::new(0, 0),
        direction: Direction::new(0, 1),
    };
    assert_eq!(outcome.seat, 0);
    assert_eq!(outcome.conclusion, Some(Conclusion::Won(line)));
    assert_eq!(game.state(), MatchState::Finished);
    assert_eq!(game.seat_order().unwrap().player_at(outcome.seat), Some(first));
    assert!(game.field().is_none());
}

#[test]
fn scenario_b_full_board_is_a_draw() {
    // X O X
    // X O O
    // O X X
    let mut game = two_player_match(3, 3, 3);
    let moves = [
        (0, 0),
        (0, 1),
        (0, 2),
        (1, 1),
        (1, 0),
        (1, 2),
        (2, 1),
        (2, 0),
    ];
    for (row, col) in moves {
        assert_eq!(play(&mut game, row, col).conclusion, None);
    }

    let last = play(&mut game, 2, 2);
    assert_eq!(last.conclusion, Some(Conclusion::Draw));
    assert_eq!(game.conclusion(), Some(Conclusion::Draw));
    assert_eq!(game.state(), MatchState::Finished);
    assert_eq!(game.history().len(), 9);
}

#[test]
fn scenario_c_color_taken() {
    let mut game = Match::create(1, 3, 3, 3, RED).unwrap();
    game.join(2, BLUE, false).unwrap();

    assert_eq!(game.join(3, BLUE, false), Err(MatchError::ColorTaken));
    assert_eq!(game.join(3, "#FF0000".parse().unwrap(), false), Err(MatchError::ColorTaken));
    assert_eq!(game.players(), vec![1, 2]);
}

#[test]
fn scenario_d_not_your_turn() {
    let mut game = two_player_match(3, 3, 3);
    let first = on_turn(&game);
    let second = if first == 1 { 2 } else { 1 };

    assert_eq!(game.submit_turn(second, 0, 0), Err(MatchError::NotYourTurn));
    game.submit_turn(first, 0, 0).unwrap();
    assert_eq!(game.submit_turn(first, 1, 1), Err(MatchError::NotYourTurn));
    assert!(game.history().len() == 1);
}

#[test]
fn scenario_e_dense_crossover_keeps_detection() {
    let mut game = two_player_match(10, 10, 5);
    assert_eq!(game.geometry().materialize_after(), 20);

    // Twenty scattered moves that cannot form a line of five
    let opening = [
        (9, 0),
        (8, 0),
        (9, 2),
        (8, 2),
        (9, 4),
        (8, 4),
        (9, 6),
        (8, 6),
        (9, 8),
        (8, 8),
        (7, 0),
        (6, 0),
        (7, 2),
        (6, 2),
        (7, 4),
        (6, 4),
        (7, 6),
        (6, 6),
        (7, 8),
        (6, 8),
    ];
    for (row, col) in opening {
        assert_eq!(play(&mut game, row, col).conclusion, None);
        assert!(game.field().is_none());
    }

    let closing = [
        (0, 0),
        (0, 9),
        (1, 1),
        (1, 9),
        (2, 2),
        (2, 9),
        (3, 3),
        (3, 9),
    ];
    for (row, col) in closing {
        let outcome = play(&mut game, row, col);
        assert_eq!(outcome.conclusion, None);
        assert!(game.field().is_some(), "field should exist past move 20");

        let sparse = SparseBoard.detect_win(
            game.geometry(),
            game.history(),
            2,
            outcome.last_move(),
        );
        assert_eq!(sparse, None);
    }

    let winning = play(&mut game, 4, 4);
    let line = WinLine {
        start: Cell::new(0, 0),
        direction: Direction::new(1, 1),
    };
    assert_eq!(winning.conclusion, Some(Conclusion::Won(line)));
    assert_eq!(
        SparseBoard.detect_win(game.geometry(), game.history(), 2, winning.last_move()),
        Some(line)
    );
    assert!(game.field().is_none(), "finished matches drop the field");
}

#[test]
fn threshold_one_wins_immediately() {
    let mut game = two_player_match(2, 2, 1);
    let outcome = play(&mut game, 1, 0);
    assert!(matches!(outcome.conclusion, Some(Conclusion::Won(_))));
    assert_eq!(game.state(), MatchState::Finished);
}

#[test]
fn history_reads_are_idempotent() {
    let mut game = two_player_match(4, 4, 3);
    play(&mut game, 0, 0);
    play(&mut game, 3, 3);

    let first = game.history_suffix(0).unwrap();
    let second = game.history_suffix(0).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.moves, vec![Cell::new(0, 0), Cell::new(3, 3)]);
}
