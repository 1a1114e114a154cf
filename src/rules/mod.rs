//! Rules trait and the generic game machine.
//!
//! Games implement `Rules` to define:
//! - Legal actions for each game state
//! - How actions modify state
//! - Win/draw conditions
//!
//! `GameMachine` drives any `Rules` implementation: it validates actions,
//! records history, and replays it. It never interprets game-specific data.

pub mod engine;
pub mod machine;

pub use engine::{ActionLog, GameResult, Rules};
pub use machine::GameMachine;
