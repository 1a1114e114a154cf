//! Serializable snapshot of a game machine.
//!
//! A snapshot is the complete state of one play-through: the seated players,
//! the initial and current state, every accepted action, and the display
//! lines each action produced. It is plain data; the coordinator persists it
//! as JSON inside the session record.

use serde::{Deserialize, Serialize};

use super::player::Player;

/// Complete serializable state of a rule-engine instance.
///
/// `history_display[i]` holds the newline-joined lines logged while applying
/// `action_history[i]`. Both vectors always have the same length.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FsmSnapshot<S, A> {
    /// Players by seat.
    pub players: Vec<Player>,
    /// State before any action was taken.
    pub init_state: S,
    /// Current state.
    pub state: S,
    /// Accepted actions, oldest first.
    pub action_history: Vec<A>,
    /// Display text per accepted action.
    pub history_display: Vec<String>,
}
