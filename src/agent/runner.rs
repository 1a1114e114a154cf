//! Automated player task.
//!
//! An agent is an ordinary client: it connects to the coordinator, joins its
//! room, and answers every `game:state` broadcast in which it is the player
//! to move. Stale decisions are simply rejected by the coordinator.

use serde_json::Value;
use std::sync::Weak;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::policy::AgentPolicy;
use crate::core::{GameError, GameRng};
use crate::games::GameKind;
use crate::session::{
    ClientEvent, Coordinator, GameActionRequest, GameSessionData, RoomId, RoomJoin, ServerEvent,
    SessionStore,
};

/// Decision state of one automated player.
pub struct Agent {
    player_id: String,
    policy: Box<dyn AgentPolicy>,
}

impl Agent {
    #[must_use]
    pub fn new(player_id: impl Into<String>, policy: Box<dyn AgentPolicy>) -> Self {
        Self {
            player_id: player_id.into(),
            policy,
        }
    }

    #[must_use]
    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Pick a move for a broadcast state, if it is this agent's turn.
    pub fn decide(&mut self, data: &GameSessionData) -> Result<Option<Value>, GameError> {
        let Some(snapshot) = &data.fsm_snapshot else {
            return Ok(None);
        };
        let game = GameKind::from_name(&data.game_name)?.resume(snapshot)?;
        if game.has_ended() {
            return Ok(None);
        }
        if game.current_player().map(|p| p.id.as_str()) != Some(self.player_id.as_str()) {
            return Ok(None);
        }
        let actions = game.valid_actions()?;
        Ok(self.policy.choose(&game, &actions))
    }
}

/// Spawn an agent task for `player_id` in `room_id`.
///
/// The task holds only a weak reference to the coordinator and ends when the
/// coordinator is dropped.
pub fn spawn<S: SessionStore>(
    coordinator: Weak<Coordinator<S>>,
    room_id: RoomId,
    player_id: String,
) -> JoinHandle<()> {
    tokio::spawn(run(coordinator, room_id, player_id))
}

async fn run<S: SessionStore>(coordinator: Weak<Coordinator<S>>, room_id: RoomId, player_id: String) {
    let Some(strong) = coordinator.upgrade() else {
        return;
    };
    let config = strong.config().clone();
    let rng = GameRng::new(config.agent_seed).for_context(&player_id);
    let mut agent = Agent::new(player_id.clone(), config.agent_policy.build(rng));
    let delay = Duration::from_millis(config.agent_move_delay_ms);

    let (connection, mut inbox) = strong.connect();
    let join = RoomJoin {
        player_id: player_id.clone(),
        player_name: config.ai_display_name.clone(),
        room_id,
    };
    strong.handle(connection, ClientEvent::Join(join)).await;
    drop(strong);

    while let Some(event) = inbox.recv().await {
        let ServerEvent::GameState(data) = event else {
            continue;
        };
        let action = match agent.decide(&data) {
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(err) => {
                warn!(room = %room_id, player = %player_id, error = %err, "agent could not read game state");
                continue;
            }
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let Some(strong) = coordinator.upgrade() else {
            break;
        };
        debug!(room = %room_id, player = %player_id, action = %action, "agent move");
        let request = GameActionRequest {
            room_id,
            game_action: action,
        };
        strong.handle(connection, ClientEvent::Action(request)).await;
    }
    debug!(room = %room_id, player = %player_id, "agent stopped");
}
