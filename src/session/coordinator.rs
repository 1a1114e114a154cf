//! Session coordinator.
//!
//! Owns the connection registry and a `SessionStore`, and turns client
//! events into transactional game updates plus broadcasts.
//!
//! ## Outcomes
//!
//! Handlers return `Outcome::Rejected` for anything a client can cause
//! (unknown room, illegal move, start mid-game, ...). Rejections are logged
//! and leave no trace in the store. `Err(CoordinatorError)` is reserved for
//! store failures and corrupted records, and affects only the one request.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::config::CoordinatorConfig;
use super::protocol::{
    AddAiPlayerRequest, AddAiPlayerResponse, ClientEvent, CreateRoomRequest, CreateRoomResponse,
    GameActionRequest, GameStart, RoomJoin, ServerEvent,
};
use super::record::{GameSessionData, RoomId, RoomRecord, SessionRecord};
use super::registry::{ConnectionId, Departure, Joined, Registry};
use super::store::{SessionStore, StoreError};
use crate::agent;
use crate::core::{GameError, Player};
use crate::games::GameKind;

/// Result of handling one client event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Rejected(Rejection),
}

/// Why an event was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("connection is not registered")]
    UnknownConnection,
    #[error("room does not exist")]
    UnknownRoom,
    #[error("player is not a member of the room")]
    NotInRoom,
    #[error("a game is already in progress")]
    GameInProgress,
    #[error("invalid number of players")]
    InvalidPlayerCount,
    #[error("game has not started")]
    NotStarted,
    #[error("action does not match the game")]
    MalformedAction,
    #[error("action is not legal now")]
    IllegalAction,
}

/// Failures that are not the client's fault.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Why a handler stopped early. Either way the transaction is discarded.
#[derive(Debug)]
enum Abort {
    Rejected(Rejection),
    Failed(CoordinatorError),
}

impl From<StoreError> for Abort {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownRoom(_) => Abort::Rejected(Rejection::UnknownRoom),
            other => Abort::Failed(other.into()),
        }
    }
}

impl From<GameError> for Abort {
    fn from(err: GameError) -> Self {
        Abort::Failed(err.into())
    }
}

/// Multi-room game coordinator.
pub struct Coordinator<S> {
    store: S,
    config: CoordinatorConfig,
    registry: Mutex<Registry>,
    me: Weak<Self>,
}

impl<S: SessionStore> Coordinator<S> {
    /// Create a coordinator over a store.
    pub fn new(store: S, config: CoordinatorConfig) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            store,
            config,
            registry: Mutex::new(Registry::new()),
            me: me.clone(),
        })
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Live members of a room, in join order.
    #[must_use]
    pub fn members(&self, room_id: RoomId) -> Vec<Player> {
        self.registry().members(room_id)
    }

    /// Register a new client connection.
    pub fn connect(&self) -> (ConnectionId, UnboundedReceiver<ServerEvent>) {
        let (connection, inbox, live) = {
            let mut registry = self.registry();
            let (connection, inbox) = registry.connect();
            (connection, inbox, registry.connection_count())
        };
        debug!(%connection, connections = live, "connected");
        (connection, inbox)
    }

    /// Dispatch one client event. Never fails; failures are logged.
    pub async fn handle(&self, connection: ConnectionId, event: ClientEvent) {
        let name = event.name();
        let outcome = match event {
            ClientEvent::Join(request) => self.join(connection, request).await,
            ClientEvent::Start(request) => self.start(request).await,
            ClientEvent::Action(request) => self.action(request).await,
        };
        debug!(%connection, event = name, ?outcome, "event handled");
    }

    /// Decode a raw text frame and dispatch it.
    pub async fn handle_message(&self, connection: ConnectionId, message: &str) {
        match serde_json::from_str::<ClientEvent>(message) {
            Ok(event) => self.handle(connection, event).await,
            Err(err) => warn!(%connection, error = %err, "undecodable client message"),
        }
    }

    /// `room:join`: bind the connection to a player and a room, then send
    /// membership and game state to the room.
    ///
    /// The connection is registered before the active record is read, so any
    /// action committed after that read is also broadcast to it. A connection
    /// moving from another room leaves that room first. If the room had no
    /// live members, automated players seated in its current game are
    /// spawned again.
    pub async fn join(&self, connection: ConnectionId, request: RoomJoin) -> Result<Outcome, CoordinatorError> {
        let RoomJoin {
            player_id,
            player_name,
            room_id,
        } = request;

        let exists = self
            .store
            .transaction(|tx| -> Result<bool, StoreError> { Ok(tx.room_exists(room_id)) })
            .await?;
        if !exists {
            return settle(room_id, "room:join", Abort::Rejected(Rejection::UnknownRoom));
        }

        let joined = {
            let mut registry = self.registry();
            registry
                .join(connection, Player::new(player_id.clone(), player_name), room_id)
                .map(|joined| (joined, registry.members(room_id)))
        };
        let Some((Joined { first_in_room, previous }, members)) = joined else {
            return settle(room_id, "room:join", Abort::Rejected(Rejection::UnknownConnection));
        };
        info!(room = %room_id, player = %player_id, %connection, "player joined");
        self.announce(connection, previous);

        let session = match self
            .store
            .transaction(|tx| -> Result<SessionRecord, Abort> { Ok(tx.active_session(room_id)?) })
            .await
        {
            Ok(session) => session,
            Err(abort) => return settle(room_id, "room:join", abort),
        };

        if first_in_room {
            if let Err(abort) = self.revive_agents(room_id, &session, &player_id) {
                return settle(room_id, "room:join", abort);
            }
        }

        self.broadcast(room_id, ServerEvent::PlayersState { players: members });
        self.broadcast(room_id, ServerEvent::GameState(session.session_data()));
        Ok(Outcome::Applied)
    }

    /// `game:start`: begin a game in the room.
    ///
    /// A finished game is kept and a new record is appended; a game still in
    /// progress is never replaced.
    pub async fn start(&self, request: GameStart) -> Result<Outcome, CoordinatorError> {
        let GameStart { room_id, players } = request;

        let absent = {
            let registry = self.registry();
            players
                .iter()
                .find(|p| !registry.is_member(room_id, &p.id))
                .map(|p| p.id.clone())
        };
        if let Some(player) = absent {
            debug!(room = %room_id, %player, "start lists a player outside the room");
            return settle(room_id, "game:start", Abort::Rejected(Rejection::NotInRoom));
        }

        let result = self
            .store
            .transaction(|tx| -> Result<SessionRecord, Abort> {
                let mut session = tx.active_session(room_id)?;
                let kind = GameKind::from_name(&session.game_name)?;
                if let Some(snapshot) = session.fsm_snapshot.take() {
                    if !kind.resume(&snapshot)?.has_ended() {
                        return Err(Abort::Rejected(Rejection::GameInProgress));
                    }
                    session = tx.insert_session(room_id, kind.name())?;
                }
                let game = kind.new_game(&players).map_err(|err| match err {
                    GameError::InvalidPlayerCount { .. } => Abort::Rejected(Rejection::InvalidPlayerCount),
                    other => other.into(),
                })?;
                let snapshot = game.to_snapshot()?;
                tx.save_snapshot(session.id, snapshot.clone(), None)?;
                session.fsm_snapshot = Some(snapshot);
                Ok(session)
            })
            .await;
        let session = match result {
            Ok(session) => session,
            Err(abort) => return settle(room_id, "game:start", abort),
        };

        info!(
            room = %room_id,
            session = %session.id,
            game = %session.game_name,
            players = players.len(),
            "game started"
        );
        self.broadcast(room_id, ServerEvent::GameState(session.session_data()));
        Ok(Outcome::Applied)
    }

    /// `game:action`: validate and apply one action against the stored game.
    ///
    /// The load, validation, application and save all happen inside one
    /// transaction, so concurrent actions on a room are applied one at a
    /// time, each against the result of the previous one.
    pub async fn action(&self, request: GameActionRequest) -> Result<Outcome, CoordinatorError> {
        let GameActionRequest { room_id, game_action } = request;

        let result = self
            .store
            .transaction(|tx| -> Result<GameSessionData, Abort> {
                let session = tx.active_session(room_id)?;
                let Some(snapshot) = &session.fsm_snapshot else {
                    return Err(Abort::Rejected(Rejection::NotStarted));
                };
                let mut game = GameKind::from_name(&session.game_name)?.resume(snapshot)?;
                match game.take_action(&game_action) {
                    Ok(true) => {}
                    Ok(false) => return Err(Abort::Rejected(Rejection::IllegalAction)),
                    Err(GameError::MalformedAction(_)) => {
                        return Err(Abort::Rejected(Rejection::MalformedAction))
                    }
                    Err(err) => return Err(err.into()),
                }
                let ended_at = game.has_ended().then(chrono::Utc::now);
                let snapshot = game.to_snapshot()?;
                tx.save_snapshot(session.id, snapshot.clone(), ended_at)?;
                Ok(GameSessionData {
                    game_name: session.game_name,
                    fsm_snapshot: Some(snapshot),
                })
            })
            .await;
        let data = match result {
            Ok(data) => data,
            Err(abort) => return settle(room_id, "game:action", abort),
        };

        debug!(room = %room_id, action = %game_action, "action applied");
        self.broadcast(room_id, ServerEvent::GameState(data));
        Ok(Outcome::Applied)
    }

    /// Drop a connection. The player leaves its room once none of their
    /// connections is bound there; an emptied room's membership is torn down.
    pub fn disconnect(&self, connection: ConnectionId) {
        let (departure, live) = {
            let mut registry = self.registry();
            let departure = registry.disconnect(connection);
            (departure, registry.connection_count())
        };
        debug!(%connection, connections = live, "disconnected");
        self.announce(connection, departure);
    }

    /// Open a room for a registered game.
    ///
    /// The room row and its first, not-yet-started record are written in one
    /// transaction.
    pub async fn create_room(&self, request: CreateRoomRequest) -> Result<CreateRoomResponse, CoordinatorError> {
        let kind = GameKind::from_name(&request.game_name)?;
        let room = self
            .store
            .transaction(|tx| -> Result<RoomRecord, CoordinatorError> {
                let room = tx.insert_room();
                tx.insert_session(room.id, kind.name())?;
                Ok(room)
            })
            .await?;
        info!(room = %room.id, game = %kind, "room created");
        Ok(CreateRoomResponse { room_id: room.id })
    }

    /// Seat a new automated player in a room.
    ///
    /// The agent joins like any other client; it still has to be listed in a
    /// `game:start` to play.
    pub async fn add_ai_player(&self, request: AddAiPlayerRequest) -> Result<AddAiPlayerResponse, CoordinatorError> {
        let room_id = request.room_id;
        let exists = self
            .store
            .transaction(|tx| -> Result<bool, StoreError> { Ok(tx.room_exists(room_id)) })
            .await?;
        if !exists {
            return Err(StoreError::UnknownRoom(room_id).into());
        }
        let player_id = format!("{}{}", self.config.ai_id_prefix, Uuid::new_v4());
        self.spawn_agent(room_id, player_id.clone());
        Ok(AddAiPlayerResponse { player_id })
    }

    /// Every record of a room, oldest first.
    pub async fn history(&self, room_id: RoomId) -> Result<Vec<SessionRecord>, CoordinatorError> {
        let records = self
            .store
            .transaction(|tx| -> Result<Vec<SessionRecord>, StoreError> {
                if !tx.room_exists(room_id) {
                    return Err(StoreError::UnknownRoom(room_id));
                }
                Ok(tx.sessions(room_id))
            })
            .await?;
        Ok(records)
    }

    fn revive_agents(&self, room_id: RoomId, session: &SessionRecord, joining: &str) -> Result<(), Abort> {
        let Some(snapshot) = &session.fsm_snapshot else {
            return Ok(());
        };
        let game = GameKind::from_name(&session.game_name)?.resume(snapshot)?;
        for player in game.players() {
            if self.config.is_ai_player(&player.id) && player.id != joining {
                self.spawn_agent(room_id, player.id.clone());
            }
        }
        Ok(())
    }

    fn spawn_agent(&self, room_id: RoomId, player_id: String) -> JoinHandle<()> {
        info!(room = %room_id, player = %player_id, "spawning agent");
        agent::spawn(self.me.clone(), room_id, player_id)
    }

    fn announce(&self, connection: ConnectionId, departure: Departure) {
        match departure {
            Departure::Left { room, remaining } => {
                info!(room = %room, %connection, remaining = remaining.len(), "player left");
                self.broadcast(room, ServerEvent::PlayersState { players: remaining });
            }
            Departure::Closed { room } => info!(room = %room, %connection, "room emptied"),
            Departure::Silent => {}
            Departure::Unknown => debug!(%connection, "unknown connection"),
        }
    }

    fn broadcast(&self, room_id: RoomId, event: ServerEvent) {
        let delivered = self.registry().broadcast(room_id, &event);
        debug!(room = %room_id, event = event.name(), delivered, "broadcast");
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn settle(room_id: RoomId, event: &'static str, abort: Abort) -> Result<Outcome, CoordinatorError> {
    match abort {
        Abort::Rejected(rejection) => {
            warn!(room = %room_id, event, reason = %rejection, "event rejected");
            Ok(Outcome::Rejected(rejection))
        }
        Abort::Failed(err) => {
            error!(room = %room_id, event, error = %err, "event failed");
            Err(err)
        }
    }
}
