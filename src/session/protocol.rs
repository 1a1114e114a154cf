//! Wire events exchanged with clients, plus the admin request shapes.
//!
//! Every event serializes as `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{GameSessionData, RoomId};
use crate::core::Player;

/// Payload of `room:join`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomJoin {
    pub player_id: String,
    pub player_name: String,
    pub room_id: RoomId,
}

/// Payload of `game:start`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStart {
    pub room_id: RoomId,
    pub players: Vec<Player>,
}

/// Payload of `game:action`. `game_action` is decoded by the room's engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameActionRequest {
    pub room_id: RoomId,
    pub game_action: Value,
}

/// Client to coordinator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "room:join")]
    Join(RoomJoin),
    #[serde(rename = "game:start")]
    Start(GameStart),
    #[serde(rename = "game:action")]
    Action(GameActionRequest),
}

impl ClientEvent {
    /// Wire name of the event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Join(_) => "room:join",
            ClientEvent::Start(_) => "game:start",
            ClientEvent::Action(_) => "game:action",
        }
    }
}

/// Coordinator to client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "players:state")]
    PlayersState { players: Vec<Player> },
    #[serde(rename = "game:state")]
    GameState(GameSessionData),
}

impl ServerEvent {
    /// Wire name of the event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::PlayersState { .. } => "players:state",
            ServerEvent::GameState(_) => "game:state",
        }
    }
}

/// Admin request to open a room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub game_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: RoomId,
}

/// Admin request to seat an automated player in a room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAiPlayerRequest {
    pub room_id: RoomId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAiPlayerResponse {
    pub player_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_client_event_wire_format() {
        let room = RoomId(Uuid::nil());
        let raw = json!({
            "event": "room:join",
            "data": {"playerId": "p1", "playerName": "Alice", "roomId": room.to_string()}
        });

        let event: ClientEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(event.name(), "room:join");
        assert_eq!(
            event,
            ClientEvent::Join(RoomJoin {
                player_id: "p1".to_string(),
                player_name: "Alice".to_string(),
                room_id: room,
            })
        );
    }

    #[test]
    fn test_action_payload_stays_opaque() {
        let raw = json!({
            "event": "game:action",
            "data": {"roomId": Uuid::nil().to_string(), "gameAction": {"anything": [1, 2]}}
        });
        let ClientEvent::Action(request) = serde_json::from_value::<ClientEvent>(raw).unwrap() else {
            panic!("expected game:action");
        };
        assert_eq!(request.game_action, json!({"anything": [1, 2]}));
    }

    #[test]
    fn test_unknown_event_rejected() {
        let raw = json!({"event": "game:undo", "data": {}});
        assert!(serde_json::from_value::<ClientEvent>(raw).is_err());
    }

    #[test]
    fn test_server_event_wire_format() {
        let event = ServerEvent::PlayersState {
            players: vec![Player::new("p1", "Alice")],
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "players:state", "data": {"players": [{"id": "p1", "name": "Alice"}]}})
        );

        let event = ServerEvent::GameState(GameSessionData {
            game_name: "tic_tac_toe".to_string(),
            fsm_snapshot: None,
        });
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "game:state", "data": {"gameName": "tic_tac_toe", "fsmSnapshot": null}})
        );
    }
}
