//! Game registry.
//!
//! The set of games is closed: each `GameKind` names one `Rules`
//! implementation. `AnyGame` wraps a `GameMachine` of any registered kind so
//! the session layer can work with JSON snapshots and action payloads,
//! looking up the engine by name before anything is deserialized.

pub mod boop;
pub mod tic_tac_toe;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::RangeInclusive;

use crate::core::{FsmSnapshot, GameError, Player, Seat};
use crate::rules::{GameMachine, GameResult, Rules};

use self::boop::Boop;
use self::tic_tac_toe::TicTacToe;

/// A registered game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameKind {
    TicTacToe,
    Boop,
}

impl GameKind {
    /// Every registered game.
    pub const ALL: [GameKind; 2] = [GameKind::TicTacToe, GameKind::Boop];

    /// Look up a game by its registry name.
    pub fn from_name(name: &str) -> Result<Self, GameError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| GameError::UnknownGame(name.to_string()))
    }

    /// Registry name stored in session records.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            GameKind::TicTacToe => TicTacToe::NAME,
            GameKind::Boop => Boop::NAME,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            GameKind::TicTacToe => "Tic-tac-toe",
            GameKind::Boop => "Boop",
        }
    }

    /// Rules text.
    #[must_use]
    pub fn rules_text(self) -> &'static str {
        match self {
            GameKind::TicTacToe => tic_tac_toe::RULES,
            GameKind::Boop => boop::RULES,
        }
    }

    /// Supported player counts.
    #[must_use]
    pub fn player_range(self) -> RangeInclusive<usize> {
        match self {
            GameKind::TicTacToe => TicTacToe::MIN_PLAYERS..=TicTacToe::MAX_PLAYERS,
            GameKind::Boop => Boop::MIN_PLAYERS..=Boop::MAX_PLAYERS,
        }
    }

    /// Start a fresh game of this kind.
    pub fn new_game(self, players: &[Player]) -> Result<AnyGame, GameError> {
        Ok(match self {
            GameKind::TicTacToe => AnyGame::TicTacToe(GameMachine::new(players)?),
            GameKind::Boop => AnyGame::Boop(GameMachine::new(players)?),
        })
    }

    /// Resume a game of this kind from a stored JSON snapshot.
    pub fn resume(self, snapshot: &Value) -> Result<AnyGame, GameError> {
        Ok(match self {
            GameKind::TicTacToe => AnyGame::TicTacToe(resume(snapshot)?),
            GameKind::Boop => AnyGame::Boop(resume(snapshot)?),
        })
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A game machine of any registered kind.
#[derive(Clone, Debug)]
pub enum AnyGame {
    TicTacToe(GameMachine<TicTacToe>),
    Boop(GameMachine<Boop>),
}

impl AnyGame {
    /// Which game this is.
    #[must_use]
    pub fn kind(&self) -> GameKind {
        match self {
            AnyGame::TicTacToe(_) => GameKind::TicTacToe,
            AnyGame::Boop(_) => GameKind::Boop,
        }
    }

    /// Seated players.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        match self {
            AnyGame::TicTacToe(g) => g.players(),
            AnyGame::Boop(g) => g.players(),
        }
    }

    /// Seat expected to act next.
    #[must_use]
    pub fn current_seat(&self) -> Seat {
        match self {
            AnyGame::TicTacToe(g) => g.current_seat(),
            AnyGame::Boop(g) => g.current_seat(),
        }
    }

    /// Player expected to act next.
    #[must_use]
    pub fn current_player(&self) -> Option<&Player> {
        match self {
            AnyGame::TicTacToe(g) => g.current_player(),
            AnyGame::Boop(g) => g.current_player(),
        }
    }

    /// Check if the game is over.
    #[must_use]
    pub fn has_ended(&self) -> bool {
        match self {
            AnyGame::TicTacToe(g) => g.has_ended(),
            AnyGame::Boop(g) => g.has_ended(),
        }
    }

    /// Outcome, if the game has ended.
    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        match self {
            AnyGame::TicTacToe(g) => g.result(),
            AnyGame::Boop(g) => g.result(),
        }
    }

    /// Number of accepted actions.
    #[must_use]
    pub fn history_len(&self) -> usize {
        match self {
            AnyGame::TicTacToe(g) => g.action_history().len(),
            AnyGame::Boop(g) => g.action_history().len(),
        }
    }

    /// Legal actions encoded as JSON payloads.
    pub fn valid_actions(&self) -> Result<Vec<Value>, GameError> {
        match self {
            AnyGame::TicTacToe(g) => encode_all(&g.valid_actions()),
            AnyGame::Boop(g) => encode_all(&g.valid_actions()),
        }
    }

    /// Decode a JSON action payload and apply it.
    ///
    /// A payload that does not decode into this game's action type is a
    /// `GameError::MalformedAction`; a well-formed but illegal action
    /// returns `Ok(false)`.
    pub fn take_action(&mut self, action: &Value) -> Result<bool, GameError> {
        match self {
            AnyGame::TicTacToe(g) => take_action(g, action),
            AnyGame::Boop(g) => take_action(g, action),
        }
    }

    /// Encode the full snapshot as JSON.
    pub fn to_snapshot(&self) -> Result<Value, GameError> {
        match self {
            AnyGame::TicTacToe(g) => encode(&g.to_snapshot()),
            AnyGame::Boop(g) => encode(&g.to_snapshot()),
        }
    }
}

fn resume<R: Rules>(snapshot: &Value) -> Result<GameMachine<R>, GameError> {
    let snapshot =
        FsmSnapshot::<R::State, R::Action>::deserialize(snapshot).map_err(GameError::MalformedSnapshot)?;
    Ok(GameMachine::from_snapshot(snapshot))
}

fn take_action<R: Rules>(game: &mut GameMachine<R>, action: &Value) -> Result<bool, GameError> {
    let action = R::Action::deserialize(action).map_err(GameError::MalformedAction)?;
    Ok(game.take_action(&action))
}

fn encode<T: Serialize>(value: &T) -> Result<Value, GameError> {
    serde_json::to_value(value).map_err(GameError::Encode)
}

fn encode_all<T: Serialize>(values: &[T]) -> Result<Vec<Value>, GameError> {
    values.iter().map(encode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn players() -> Vec<Player> {
        vec![Player::new("a", "Alice"), Player::new("b", "Bob")]
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(GameKind::from_name("tic_tac_toe").unwrap(), GameKind::TicTacToe);
        assert_eq!(GameKind::from_name("boop").unwrap(), GameKind::Boop);
        assert!(matches!(GameKind::from_name("chess"), Err(GameError::UnknownGame(name)) if name == "chess"));
    }

    #[test]
    fn test_metadata() {
        for kind in GameKind::ALL {
            assert_eq!(GameKind::from_name(kind.name()).unwrap(), kind);
            assert_eq!(kind.player_range(), 2..=2);
            assert!(kind.rules_text().contains(kind.display_name()));
        }
        assert_eq!(GameKind::Boop.to_string(), "boop");
    }

    #[test]
    fn test_new_game_validates_player_count() {
        let one = vec![Player::new("a", "Alice")];
        for kind in GameKind::ALL {
            assert!(matches!(
                kind.new_game(&one),
                Err(GameError::InvalidPlayerCount { count: 1, .. })
            ));
        }
    }

    #[test]
    fn test_json_round_trip_through_registry() {
        let mut game = GameKind::TicTacToe.new_game(&players()).unwrap();
        assert_eq!(game.current_player().unwrap().id, "a");
        assert!(game.take_action(&json!({"player": 0, "row": 1, "col": 1})).unwrap());
        assert!(!game.take_action(&json!({"player": 0, "row": 0, "col": 0})).unwrap(), "out of turn");

        let snapshot = game.to_snapshot().unwrap();
        assert_eq!(snapshot["actionHistory"].as_array().unwrap().len(), 1);

        let resumed = GameKind::TicTacToe.resume(&snapshot).unwrap();
        assert_eq!(resumed.kind(), GameKind::TicTacToe);
        assert_eq!(resumed.history_len(), 1);
        assert_eq!(resumed.current_player().unwrap().id, "b");
        assert_eq!(resumed.current_seat(), Seat::new(1));
        assert_eq!(resumed.to_snapshot().unwrap(), snapshot);
    }

    #[test]
    fn test_malformed_payloads() {
        let mut game = GameKind::Boop.new_game(&players()).unwrap();
        assert!(matches!(
            game.take_action(&json!({"type": "fly", "player": 0})),
            Err(GameError::MalformedAction(_))
        ));

        // A tic-tac-toe snapshot does not decode as boop.
        let ttt = GameKind::TicTacToe.new_game(&players()).unwrap().to_snapshot().unwrap();
        assert!(matches!(GameKind::Boop.resume(&ttt), Err(GameError::MalformedSnapshot(_))));
    }

    #[test]
    fn test_valid_actions_are_accepted_payloads() {
        let mut game = GameKind::Boop.new_game(&players()).unwrap();
        let actions = game.valid_actions().unwrap();
        assert_eq!(actions.len(), 36);
        assert_eq!(actions[0]["type"], "place");
        assert!(game.take_action(&actions[0]).unwrap());
        assert!(!game.has_ended());
        assert_eq!(game.result(), None);
    }
}
