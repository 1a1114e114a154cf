//! Core engine types: players, seats, snapshots, errors, RNG.
//!
//! This module contains the building blocks shared by every game and by the
//! session layer. Nothing here knows about a specific rule-set.

pub mod error;
pub mod player;
pub mod rng;
pub mod snapshot;

pub use error::GameError;
pub use player::{Player, PlayerMap, Seat};
pub use rng::GameRng;
pub use snapshot::FsmSnapshot;
