//! Durable record shapes: rooms and session records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Room identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub Uuid);

impl RoomId {
    /// A fresh random id.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Session record identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// A fresh random id.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A room row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    pub id: RoomId,
    pub created_at: DateTime<Utc>,
}

/// One play-through (or not-yet-started slot) of a room's game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: SessionId,
    pub room_id: RoomId,
    pub game_name: String,
    /// `None` until the game is started.
    pub fsm_snapshot: Option<Value>,
    pub created_at: DateTime<Utc>,
    /// Set by the action that ends the game.
    pub ended_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// The part of the record broadcast to clients.
    #[must_use]
    pub fn session_data(&self) -> GameSessionData {
        GameSessionData {
            game_name: self.game_name.clone(),
            fsm_snapshot: self.fsm_snapshot.clone(),
        }
    }
}

/// Payload of the `game:state` event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSessionData {
    pub game_name: String,
    pub fsm_snapshot: Option<Value>,
}
