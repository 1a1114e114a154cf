//! Move selection for automated players.
//!
//! Policies see the resumed game and its legal actions as JSON payloads, so
//! one policy works for every registered game.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::GameRng;
use crate::games::AnyGame;
use crate::rules::GameResult;

/// Chooses one action among the legal ones.
pub trait AgentPolicy: Send {
    /// Pick an action from `actions`, or `None` if there is none.
    fn choose(&mut self, game: &AnyGame, actions: &[Value]) -> Option<Value>;
}

/// Configurable policy selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Uniformly random legal action.
    Uniform,
    /// An immediately winning action if one exists, otherwise uniform.
    WinFirst,
}

impl PolicyKind {
    /// Build the policy with its own RNG stream.
    #[must_use]
    pub fn build(self, rng: GameRng) -> Box<dyn AgentPolicy> {
        match self {
            PolicyKind::Uniform => Box::new(UniformPolicy::new(rng)),
            PolicyKind::WinFirst => Box::new(WinFirstPolicy::new(rng)),
        }
    }
}

/// Uniform random policy.
#[derive(Clone, Debug)]
pub struct UniformPolicy {
    rng: GameRng,
}

impl UniformPolicy {
    #[must_use]
    pub fn new(rng: GameRng) -> Self {
        Self { rng }
    }
}

impl AgentPolicy for UniformPolicy {
    fn choose(&mut self, _game: &AnyGame, actions: &[Value]) -> Option<Value> {
        self.rng.choose(actions).cloned()
    }
}

/// Takes a win when one is on the board.
///
/// Each candidate is tried on a copy of the game; copies share structure
/// with the live game, so the scan stays cheap.
#[derive(Clone, Debug)]
pub struct WinFirstPolicy {
    fallback: UniformPolicy,
}

impl WinFirstPolicy {
    #[must_use]
    pub fn new(rng: GameRng) -> Self {
        Self {
            fallback: UniformPolicy::new(rng),
        }
    }
}

impl AgentPolicy for WinFirstPolicy {
    fn choose(&mut self, game: &AnyGame, actions: &[Value]) -> Option<Value> {
        let me = game.current_seat();
        let winning = actions.iter().find(|action| {
            let mut trial = game.clone();
            matches!(trial.take_action(action), Ok(true))
                && trial.result() == Some(GameResult::Winner(me))
        });
        match winning {
            Some(action) => Some(action.clone()),
            None => self.fallback.choose(game, actions),
        }
    }
}
