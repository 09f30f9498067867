//! Match aggregate and its lifecycle.
//!
//! A match moves `Waiting -> Started -> Finished` and never backward. Every
//! operation either applies completely or returns an error and leaves the
//! match untouched.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    board::{Board, BoardRepr, DenseBoard, Geometry},
    entities::{
        Cell, Color, Conclusion, HistorySuffix, MatchId, MatchState, MatchSummary, MatchView,
        PlayerId, SeatIndex, SeatView,
    },
    errors::{MatchError, MatchResult},
    seats::{SeatColorAssignment, SeatOrder, SeatRandomizer, Seating},
    turn,
    win::LastMove,
};

/// Result of an accepted turn.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TurnOutcome {
    pub cell: Cell,
    pub seat: SeatIndex,
    /// Set when this move ended the match.
    pub conclusion: Option<Conclusion>,
}

impl TurnOutcome {
    /// The accepted move in the shape the win detectors take.
    #[must_use]
    pub fn last_move(&self) -> LastMove {
        LastMove {
            cell: self.cell,
            seat: self.seat,
        }
    }
}

/// A single match: board configuration, players, moves and outcome.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Match {
    id: MatchId,
    geometry: Geometry,
    owner: PlayerId,
    seating: Seating,
    history: Vec<Cell>,
    board: Board,
    state: MatchState,
    conclusion: Option<Conclusion>,
    created_at: DateTime<Utc>,
}

impl Match {
    /// Create a waiting match with its owner already seated in the lobby.
    ///
    /// The id stays `0` until the persistence layer assigns one.
    pub fn create(
        owner: PlayerId,
        width: usize,
        height: usize,
        win_threshold: usize,
        owner_color: Color,
    ) -> MatchResult<Self> {
        let geometry = Geometry::new(width, height, win_threshold)?;
        Ok(Self {
            id: 0,
            geometry,
            owner,
            seating: Seating::Open {
                colors: SeatColorAssignment::new(owner, owner_color),
            },
            history: Vec::new(),
            board: Board::default(),
            state: MatchState::Waiting,
            conclusion: None,
            created_at: Utc::now(),
        })
    }

    pub fn assign_id(&mut self, id: MatchId) {
        self.id = id;
    }

    /// Add a player to a waiting match.
    ///
    /// `active_elsewhere` is the persistence layer's answer to whether the
    /// player already sits in another unfinished match.
    pub fn join(&mut self, player: PlayerId, color: Color, active_elsewhere: bool) -> MatchResult<()> {
        let capacity = self.geometry.capacity();
        let Seating::Open { colors } = &mut self.seating else {
            return Err(MatchError::AlreadyStarted);
        };
        if colors.is_taken(color) {
            return Err(MatchError::ColorTaken);
        }
        if colors.contains(player) {
            return Err(MatchError::AlreadyJoined);
        }
        if active_elsewhere {
            return Err(MatchError::AlreadyInAnotherActiveMatch);
        }
        if colors.len() >= capacity {
            return Err(MatchError::MatchFull);
        }

        colors.insert(player, color);
        debug!("Match {}: player {} joined with {}", self.id, player, color);
        Ok(())
    }

    /// Shuffle the lobby into a fixed turn order and open the board.
    pub fn start(&mut self, requester: PlayerId, randomizer: &mut SeatRandomizer) -> MatchResult<&SeatOrder> {
        if requester != self.owner {
            return Err(MatchError::NotOwner);
        }
        if self.state != MatchState::Waiting {
            return Err(MatchError::AlreadyStarted);
        }
        let Seating::Open { colors } = &mut self.seating else {
            return Err(MatchError::AlreadyStarted);
        };

        let order = randomizer.assign(std::mem::take(colors));
        info!(
            "Match {} started with seat order {:?}",
            self.id,
            order.players()
        );
        self.seating = Seating::Seated(order);
        self.state = MatchState::Started;
        self.seat_order().ok_or(MatchError::NotStarted)
    }

    /// Apply one move for the seat on turn and settle the match if it ends.
    pub fn submit_turn(&mut self, requester: PlayerId, row: i64, col: i64) -> MatchResult<TurnOutcome> {
        let pending = turn::validate(self, requester, row, col)?;
        let seats = self.seating.player_count();

        self.history.push(pending.cell);
        self.board.record(pending.cell, pending.seat);
        if self
            .board
            .materialize_if_due(&self.geometry, &self.history, seats)
        {
            debug!(
                "Match {}: dense field materialized after {} moves",
                self.id,
                self.history.len()
            );
        }

        let last = LastMove {
            cell: pending.cell,
            seat: pending.seat,
        };
        let conclusion = match self
            .board
            .detect_win(&self.geometry, &self.history, seats, last)
        {
            Some(line) => Some(Conclusion::Won(line)),
            None if self.history.len() == self.geometry.capacity() => Some(Conclusion::Draw),
            None => None,
        };

        debug!(
            "Match {}: seat {} played {}",
            self.id, pending.seat, pending.cell
        );
        if let Some(conclusion) = conclusion {
            self.finish(conclusion, pending.seat);
        }

        Ok(TurnOutcome {
            cell: pending.cell,
            seat: pending.seat,
            conclusion,
        })
    }

    fn finish(&mut self, conclusion: Conclusion, last_seat: SeatIndex) {
        self.conclusion = Some(conclusion);
        self.state = MatchState::Finished;
        self.board.discard();
        match conclusion {
            Conclusion::Won(line) => info!(
                "Match {} won by seat {} with line from {} towards {}",
                self.id, last_seat, line.start, line.direction
            ),
            Conclusion::Draw => info!("Match {} ended in a draw", self.id),
        }
    }

    /// Take back the most recent accepted turn.
    ///
    /// Used when an accepted turn could not be stored. The match returns to
    /// exactly the state it had before `outcome` was played.
    pub fn revert_turn(&mut self, outcome: &TurnOutcome) {
        if self.history.last() != Some(&outcome.cell) {
            return;
        }
        self.history.pop();
        self.conclusion = None;
        self.state = MatchState::Started;

        let seats = self.seating.player_count();
        self.board = Board::default();
        self.board
            .materialize_if_due(&self.geometry, &self.history, seats);
        debug!(
            "Match {}: reverted seat {} at {}",
            self.id, outcome.seat, outcome.cell
        );
    }

    /// Moves from `start` onward plus the conclusion, if any.
    pub fn history_suffix(&self, start: i64) -> MatchResult<HistorySuffix> {
        let start = usize::try_from(start).map_err(|_| MatchError::OutOfRange(start))?;
        let moves = self.history.get(start..).map(<[Cell]>::to_vec).unwrap_or_default();
        Ok(HistorySuffix {
            start,
            moves,
            conclusion: self.conclusion,
        })
    }

    #[must_use]
    pub fn id(&self) -> MatchId {
        self.id
    }

    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[must_use]
    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    #[must_use]
    pub fn state(&self) -> MatchState {
        self.state
    }

    #[must_use]
    pub fn history(&self) -> &[Cell] {
        &self.history
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn field(&self) -> Option<&DenseBoard> {
        self.board.field()
    }

    #[must_use]
    pub fn conclusion(&self) -> Option<Conclusion> {
        self.conclusion
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn seating(&self) -> &Seating {
        &self.seating
    }

    #[must_use]
    pub fn seat_order(&self) -> Option<&SeatOrder> {
        self.seating.order()
    }

    /// Players sorted by id before the start, by seat afterwards.
    #[must_use]
    pub fn players(&self) -> Vec<PlayerId> {
        match &self.seating {
            Seating::Open { colors } => colors.players().collect(),
            Seating::Seated(order) => order.players().to_vec(),
        }
    }

    #[must_use]
    pub fn has_player(&self, player: PlayerId) -> bool {
        match &self.seating {
            Seating::Open { colors } => colors.contains(player),
            Seating::Seated(order) => order.seat_of(player).is_some(),
        }
    }

    #[must_use]
    pub fn view(&self) -> MatchView {
        let players = match &self.seating {
            Seating::Open { colors } => colors
                .players()
                .filter_map(|player| {
                    colors.color_of(player).map(|color| SeatView {
                        player,
                        color,
                        seat: None,
                    })
                })
                .collect(),
            Seating::Seated(order) => order
                .players()
                .iter()
                .zip(order.colors().as_slice())
                .enumerate()
                .map(|(seat, (&player, &color))| SeatView {
                    player,
                    color,
                    seat: Some(seat),
                })
                .collect(),
        };

        MatchView {
            id: self.id,
            width: self.geometry.width,
            height: self.geometry.height,
            win_threshold: self.geometry.win_threshold,
            owner: self.owner,
            state: self.state,
            players,
            history: self.history.clone(),
            conclusion: self.conclusion,
            created_at: self.created_at,
        }
    }

    #[must_use]
    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            id: self.id,
            width: self.geometry.width,
            height: self.geometry.height,
            win_threshold: self.geometry.win_threshold,
            owner: self.owner,
            created_at: self.created_at,
        }
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let players = self
            .players()
            .iter()
            .map(PlayerId::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "[{}] {}x{}x{} match with [{}]",
            self.state,
            self.geometry.width,
            self.geometry.height,
            self.geometry.win_threshold,
            players
        )
    }
}
