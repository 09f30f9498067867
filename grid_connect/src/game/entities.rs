use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Identity of an authenticated player, as handed over by the identity collaborator.
pub type PlayerId = i64;

/// Identity of a match, assigned by the persistence collaborator.
pub type MatchId = i64;

/// A player's position in turn order after the match starts.
pub type SeatIndex = usize;

/// A board coordinate. Rows grow downward, columns grow rightward.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Moves `distance` steps along `direction`, or `None` when the result
    /// would leave the non-negative quadrant.
    #[must_use]
    pub fn offset(self, direction: Direction, distance: usize) -> Option<Self> {
        let row = step(self.row, direction.di, distance)?;
        let col = step(self.col, direction.dj, distance)?;
        Some(Self { row, col })
    }

    #[must_use]
    pub fn manhattan(self, other: Self) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

fn step(origin: usize, delta: i8, distance: usize) -> Option<usize> {
    match delta {
        0 => Some(origin),
        d if d > 0 => origin.checked_add(distance),
        _ => origin.checked_sub(distance),
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the eight unit steps around a cell. `(0, 0)` is never constructed
/// by the engine.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Direction {
    pub di: i8,
    pub dj: i8,
}

impl Direction {
    /// The eight directions in row-major order of `(di, dj)`. Win detection
    /// scans in exactly this order, so the first completed line wins ties.
    pub const ALL: [Direction; 8] = [
        Direction::new(-1, -1),
        Direction::new(-1, 0),
        Direction::new(-1, 1),
        Direction::new(0, -1),
        Direction::new(0, 1),
        Direction::new(1, -1),
        Direction::new(1, 0),
        Direction::new(1, 1),
    ];

    #[must_use]
    pub const fn new(di: i8, dj: i8) -> Self {
        Self { di, dj }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        Self {
            di: -self.di,
            dj: -self.dj,
        }
    }

    /// Unit direction and step count from `from` to `to`, provided the two
    /// cells share a row, a column or a diagonal and are distinct.
    #[must_use]
    pub fn between(from: Cell, to: Cell) -> Option<(Self, usize)> {
        let di = to.row as i64 - from.row as i64;
        let dj = to.col as i64 - from.col as i64;
        let distance = di.abs().max(dj.abs());
        if distance == 0 || !(di.abs() == dj.abs() || di == 0 || dj == 0) {
            return None;
        }
        let direction = Self::new((di / distance) as i8, (dj / distance) as i8);
        Some((direction, distance as usize))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.di, self.dj)
    }
}

/// A completed run: walking `winThreshold` or more cells from `start` along
/// `direction` stays on the winner's cells.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct WinLine {
    pub start: Cell,
    pub direction: Direction,
}

/// How a finished match ended.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Conclusion {
    Won(WinLine),
    Draw,
}

impl Conclusion {
    #[must_use]
    pub fn win_line(&self) -> Option<WinLine> {
        match self {
            Self::Won(line) => Some(*line),
            Self::Draw => None,
        }
    }
}

/// Lifecycle of a match. Transitions only move forward.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchState {
    Waiting,
    Started,
    Finished,
}

impl MatchState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Started => "started",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MatchState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(Self::Waiting),
            "started" => Ok(Self::Started),
            "finished" => Ok(Self::Finished),
            other => Err(format!("unknown match state: {other}")),
        }
    }
}

/// A piece color as an RGB triple, written `#rrggbb`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Color(pub u8, pub u8, pub u8);

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("invalid color: {s}"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| format!("invalid color: {s}"))
        };
        Ok(Self(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = String::deserialize(deserializer)?;
        repr.parse().map_err(serde::de::Error::custom)
    }
}

/// A player as shown in a match view, in seat order once started.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatView {
    pub player: PlayerId,
    pub color: Color,
    pub seat: Option<SeatIndex>,
}

/// Public detail of a match. The dense field is scratch state and never shown.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MatchView {
    pub id: MatchId,
    pub width: usize,
    pub height: usize,
    pub win_threshold: usize,
    pub owner: PlayerId,
    pub state: MatchState,
    pub players: Vec<SeatView>,
    pub history: Vec<Cell>,
    pub conclusion: Option<Conclusion>,
    pub created_at: DateTime<Utc>,
}

/// List entry for waiting/started match listings.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MatchSummary {
    pub id: MatchId,
    pub width: usize,
    pub height: usize,
    pub win_threshold: usize,
    pub owner: PlayerId,
    pub created_at: DateTime<Utc>,
}

/// Reply to a history read: every move from the requested index on, plus
/// the conclusion once the match is over.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HistorySuffix {
    pub start: usize,
    pub moves: Vec<Cell>,
    pub conclusion: Option<Conclusion>,
}
