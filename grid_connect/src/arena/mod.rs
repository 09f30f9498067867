//! Arena module providing concurrent access to many matches.
//!
//! This module implements:
//! - MatchActor: Async actor owning a single match
//! - MatchManager: Registry that loads, spawns and addresses match actors
//! - Message-based communication with tokio channels
//!
//! ## Architecture
//!
//! Each loaded match runs in its own Tokio task with an mpsc message inbox,
//! so requests for one match are serialized while different matches proceed
//! independently. Actors persist every accepted change through the
//! [`MatchRepository`](crate::db::MatchRepository) before replying.
//!
//! ## Example
//!
//! ```no_run
//! use grid_connect::{arena::MatchManager, db::InMemoryMatchRepository, game::Color};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let manager = MatchManager::new(Arc::new(InMemoryMatchRepository::new()));
//!
//!     let id = manager.create_match(1, 7, 6, 4, Color(255, 0, 0)).await.unwrap();
//!     manager.join_match(id, 2, Color(255, 255, 0)).await.unwrap();
//!     manager.start_match(id, 1).await.unwrap();
//! }
//! ```

pub mod actor;
pub mod manager;
pub mod messages;

pub use actor::{MatchActor, MatchHandle};
pub use manager::MatchManager;
pub use messages::MatchMessage;
