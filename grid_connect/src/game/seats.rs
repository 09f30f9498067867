//! Seat assignment and per-seat colors.
//!
//! Before the start colors are keyed by player; afterwards they are a
//! sequence aligned with the turn order and looked up by seat index only.

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::entities::{Color, PlayerId, SeatIndex};

/// Pre-start colors, one per joined player, pairwise distinct.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatColorAssignment(BTreeMap<PlayerId, Color>);

impl SeatColorAssignment {
    #[must_use]
    pub fn new(owner: PlayerId, color: Color) -> Self {
        Self(BTreeMap::from([(owner, color)]))
    }

    #[must_use]
    pub fn is_taken(&self, color: Color) -> bool {
        self.0.values().any(|&taken| taken == color)
    }

    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        self.0.contains_key(&player)
    }

    /// Caller guarantees `player` is new and `color` is free.
    pub fn insert(&mut self, player: PlayerId, color: Color) {
        self.0.insert(player, color);
    }

    #[must_use]
    pub fn color_of(&self, player: PlayerId) -> Option<Color> {
        self.0.get(&player).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Players in ascending id order.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.0.keys().copied()
    }
}

/// Post-start colors, `colors[i]` belongs to seat `i`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct OrderedColors(Vec<Color>);

impl OrderedColors {
    #[must_use]
    pub fn get(&self, seat: SeatIndex) -> Option<Color> {
        self.0.get(seat).copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Color] {
        &self.0
    }
}

/// Turn order fixed at start, with colors realigned to it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatOrder {
    order: Vec<PlayerId>,
    colors: OrderedColors,
}

impl SeatOrder {
    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        &self.order
    }

    #[must_use]
    pub fn colors(&self) -> &OrderedColors {
        &self.colors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn player_at(&self, seat: SeatIndex) -> Option<PlayerId> {
        self.order.get(seat).copied()
    }

    #[must_use]
    pub fn seat_of(&self, player: PlayerId) -> Option<SeatIndex> {
        self.order.iter().position(|&seated| seated == player)
    }

    /// Seat whose turn comes after `moves_played` moves.
    #[must_use]
    pub fn seat_on_turn(&self, moves_played: usize) -> SeatIndex {
        moves_played % self.order.len().max(1)
    }
}

/// The color field in whichever shape the match lifecycle calls for.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum Seating {
    Open { colors: SeatColorAssignment },
    Seated(SeatOrder),
}

impl Seating {
    #[must_use]
    pub fn player_count(&self) -> usize {
        match self {
            Seating::Open { colors } => colors.len(),
            Seating::Seated(order) => order.len(),
        }
    }

    #[must_use]
    pub fn order(&self) -> Option<&SeatOrder> {
        match self {
            Seating::Seated(order) => Some(order),
            Seating::Open { .. } => None,
        }
    }
}

/// Seat randomizer for fair turn order
#[derive(Debug)]
pub struct SeatRandomizer {
    /// Random number generator
    rng: StdRng,
}

impl SeatRandomizer {
    /// Create a new seat randomizer seeded from the OS
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a reproducible randomizer, for tests and simulations
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Shuffle the joined players into a uniformly random turn order
    ///
    /// # Arguments
    ///
    /// * `assignment` - Pre-start player to color mapping
    ///
    /// # Returns
    ///
    /// * `SeatOrder` - Permutation of the players with colors aligned to it
    pub fn assign(&mut self, assignment: SeatColorAssignment) -> SeatOrder {
        let mut seated: Vec<(PlayerId, Color)> = assignment.0.into_iter().collect();
        seated.shuffle(&mut self.rng);

        let (order, colors) = seated.into_iter().unzip();
        SeatOrder {
            order,
            colors: OrderedColors(colors),
        }
    }
}

impl Default for SeatRandomizer {
    fn default() -> Self {
        Self::new()
    }
}
