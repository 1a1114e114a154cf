//! Rules trait for game implementations.
//!
//! Games implement `Rules` to define their rules:
//! - The initial state for a player count
//! - What actions are legal
//! - How actions modify state
//! - Win/draw conditions

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::core::{Player, Seat};

/// Result of a completed game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    /// Single winner.
    Winner(Seat),
    /// Game over with no winner.
    Draw,
}

impl GameResult {
    /// Check if a seat won.
    #[must_use]
    pub fn is_winner(&self, seat: Seat) -> bool {
        match self {
            GameResult::Winner(s) => *s == seat,
            GameResult::Draw => false,
        }
    }
}

/// Collects human-readable lines produced while one action is applied.
///
/// Every line pushed during a single `apply_action` call lands on the same
/// history index.
#[derive(Debug)]
pub struct ActionLog<'a> {
    players: &'a [Player],
    lines: Vec<String>,
}

impl<'a> ActionLog<'a> {
    /// Create an empty log for a game with the given seated players.
    #[must_use]
    pub fn new(players: &'a [Player]) -> Self {
        Self {
            players,
            lines: Vec::new(),
        }
    }

    /// Display name of the player in `seat`.
    #[must_use]
    pub fn name(&self, seat: Seat) -> &'a str {
        self.players
            .get(seat.index())
            .map_or("unknown player", |p| p.name.as_str())
    }

    /// Append a line.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Lines pushed so far.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Join the lines into one history entry.
    #[must_use]
    pub fn into_entry(self) -> String {
        self.lines.join("\n")
    }
}

/// Rules trait.
///
/// ## Implementation Notes
///
/// - `new_init_state`: Pure; depends only on the player count
/// - `valid_actions`: Exhaustive; empty once the game has ended
/// - `apply_action`: Only ever called with an action from `valid_actions`;
///   must be deterministic so history replay reproduces the state
/// - `result`: Return `None` while the game continues
pub trait Rules: Default + Clone + Debug {
    /// Game state. Plain data, deep-copied by `Clone`.
    type State: Clone + Debug + PartialEq + Serialize + DeserializeOwned;

    /// Move descriptor.
    type Action: Clone + Debug + PartialEq + Serialize + DeserializeOwned;

    /// Registry name, e.g. `"boop"`.
    const NAME: &'static str;

    /// Minimum number of seated players.
    const MIN_PLAYERS: usize = 2;

    /// Maximum number of seated players.
    const MAX_PLAYERS: usize = 2;

    /// Build the initial state for `num_players` players.
    fn new_init_state(&self, num_players: usize) -> Self::State;

    /// Enumerate all legal actions from `state`.
    fn valid_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Apply a legal action, logging display lines.
    fn apply_action(&self, state: &mut Self::State, action: &Self::Action, log: &mut ActionLog<'_>);

    /// Outcome, if the game has ended.
    fn result(&self, state: &Self::State) -> Option<GameResult>;

    /// Seat expected to act next.
    fn current_player(&self, state: &Self::State) -> Seat;

    /// Check if the game is over.
    fn has_ended(&self, state: &Self::State) -> bool {
        self.result(state).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_result_is_winner() {
        let result = GameResult::Winner(Seat::new(1));
        assert!(!result.is_winner(Seat::new(0)));
        assert!(result.is_winner(Seat::new(1)));

        let draw = GameResult::Draw;
        assert!(!draw.is_winner(Seat::new(0)));
        assert!(!draw.is_winner(Seat::new(1)));
    }

    #[test]
    fn test_game_result_serialization() {
        assert_eq!(serde_json::to_string(&GameResult::Draw).unwrap(), r#""draw""#);
        assert_eq!(
            serde_json::to_string(&GameResult::Winner(Seat::new(0))).unwrap(),
            r#"{"winner":0}"#
        );
    }

    #[test]
    fn test_action_log_joins_lines() {
        let players = vec![Player::new("a", "Alice"), Player::new("b", "Bob")];
        let mut log = ActionLog::new(&players);
        assert_eq!(log.name(Seat::new(1)), "Bob");

        log.push("first");
        log.push(format!("{} second", log.name(Seat::new(0))));
        assert_eq!(log.lines().len(), 2);
        assert_eq!(log.into_entry(), "first\nAlice second");
    }

    #[test]
    fn test_action_log_empty_entry() {
        let players = vec![];
        let log = ActionLog::new(&players);
        assert_eq!(log.name(Seat::new(3)), "unknown player");
        assert_eq!(log.into_entry(), "");
    }
}
