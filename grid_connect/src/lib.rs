//! # Grid Connect
//!
//! A multiplayer connect-N engine on a rectangular grid.
//!
//! Players join a waiting match, each choosing a distinct color. The owner
//! starts it, which shuffles everyone into a fixed turn order. Seats then
//! place stones in rotation until one of them completes a straight line of
//! `win_threshold` cells or the board fills up.
//!
//! ## Core Modules
//!
//! - [`game`]: Match state machine, turn validation and win detection
//! - [`arena`]: Per-match actors and the registry that addresses them
//! - [`db`]: Persistence boundary with PostgreSQL and in-memory backends
//!
//! ## Example
//!
//! ```
//! use grid_connect::game::{Color, Match, SeatRandomizer};
//!
//! let mut game = Match::create(1, 3, 3, 3, Color(255, 0, 0)).unwrap();
//! game.join(2, Color(0, 0, 255), false).unwrap();
//! game.start(1, &mut SeatRandomizer::seeded(0)).unwrap();
//! assert_eq!(game.to_string(), format!("[started] 3x3x3 match with {:?}", game.players()));
//! ```

/// Core match logic, entities, and state machine.
pub mod game;
pub use game::{
    Color, Conclusion, Match, MatchError, MatchResult, MatchState, constants, entities,
};

/// Per-match actors and the match registry.
pub mod arena;
pub use arena::MatchManager;

/// Match storage.
pub mod db;
