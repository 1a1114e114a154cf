//! # rust-tabletop
//!
//! Turn-based board game engine with a multi-room session coordinator.
//!
//! ## Design Principles
//!
//! 1. **Pure Rules**: A game is a `Rules` implementation: initial state,
//!    legal actions, and a transition. No I/O, no clocks, no randomness.
//!
//! 2. **Replayable History**: `GameMachine` records every accepted action,
//!    so any past position can be rebuilt by replaying a prefix.
//!
//! 3. **One Writer per Room**: Every change to a room's game happens inside
//!    one store transaction. There is no other lock on game progress.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) cloning via `im-rs` for history and
//!   storage snapshots.
//!
//! - **Closed Game Registry**: `GameKind` maps a stored game name to its
//!   engine before any payload is decoded.
//!
//! ## Modules
//!
//! - `core`: Players, seats, RNG, snapshots, errors
//! - `rules`: `Rules` trait and the `GameMachine` history wrapper
//! - `games`: Tic-tac-toe, Boop, and the game registry
//! - `session`: Rooms, session records, store, and the coordinator
//! - `agent`: Automated players

pub mod agent;
pub mod core;
pub mod games;
pub mod rules;
pub mod session;

// Re-export commonly used types
pub use crate::core::{FsmSnapshot, GameError, GameRng, Player, PlayerMap, Seat};

pub use crate::rules::{ActionLog, GameMachine, GameResult, Rules};

pub use crate::games::{AnyGame, GameKind};

pub use crate::session::{
    ClientEvent, Coordinator, CoordinatorConfig, CoordinatorError, MemoryStore, Outcome, Rejection,
    RoomId, ServerEvent, SessionStore, StoreError,
};

pub use crate::agent::{AgentPolicy, PolicyKind};
