//! Live connection and room membership tracking.
//!
//! The registry is owned by the coordinator and is the only place
//! membership changes. It is plain synchronous state; callers hold its lock
//! only for the duration of one method call.

use rustc_hash::FxHashMap;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::protocol::ServerEvent;
use super::record::RoomId;
use crate::core::Player;

/// Identifier of one client connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(pub u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Debug)]
struct Connection {
    player_id: Option<String>,
    room_id: Option<RoomId>,
    outbox: UnboundedSender<ServerEvent>,
}

/// How a room's membership changed when a player stopped being bound to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Departure {
    /// The connection was not registered.
    Unknown,
    /// Membership did not change: the connection never joined, or another
    /// connection of the same player is still bound to the room.
    Silent,
    /// The player left a room that still has members.
    Left { room: RoomId, remaining: Vec<Player> },
    /// The last member left; the room's membership was torn down.
    Closed { room: RoomId },
}

/// What a join changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Joined {
    /// The room had no live membership before this join.
    pub first_in_room: bool,
    /// Effect on the room the connection was bound to before, if it moved.
    pub previous: Departure,
}

/// Connections, active players, and per-room membership.
#[derive(Debug, Default)]
pub struct Registry {
    next_connection: u64,
    connections: FxHashMap<ConnectionId, Connection>,
    players: FxHashMap<String, Player>,
    /// Member player ids per room, in join order.
    rooms: FxHashMap<RoomId, Vec<String>>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and return its event stream.
    pub fn connect(&mut self) -> (ConnectionId, UnboundedReceiver<ServerEvent>) {
        let id = ConnectionId(self.next_connection);
        self.next_connection += 1;
        let (outbox, inbox) = mpsc::unbounded_channel();
        self.connections.insert(
            id,
            Connection {
                player_id: None,
                room_id: None,
                outbox,
            },
        );
        (id, inbox)
    }

    /// Bind a connection to a player and a room.
    ///
    /// Returns `None` for an unknown connection. A connection that was bound
    /// elsewhere is released from its previous room first, so a player stays
    /// a member only of rooms one of their connections is bound to.
    pub fn join(&mut self, connection: ConnectionId, player: Player, room: RoomId) -> Option<Joined> {
        let entry = self.connections.get_mut(&connection)?;
        let previous_player = entry.player_id.replace(player.id.clone());
        let previous_room = entry.room_id.replace(room);

        let first_in_room = !self.rooms.contains_key(&room);
        let members = self.rooms.entry(room).or_default();
        if !members.contains(&player.id) {
            members.push(player.id.clone());
        }
        self.players.insert(player.id.clone(), player);

        let previous = match (previous_player, previous_room) {
            (Some(old_player), Some(old_room)) => {
                let departure = self.release(old_room, &old_player);
                self.forget_if_offline(&old_player);
                departure
            }
            _ => Departure::Silent,
        };
        Some(Joined {
            first_in_room,
            previous,
        })
    }

    /// Check whether a player is a live member of a room.
    #[must_use]
    pub fn is_member(&self, room: RoomId, player_id: &str) -> bool {
        self.rooms
            .get(&room)
            .is_some_and(|members| members.iter().any(|id| id == player_id))
    }

    /// Members of a room, in join order.
    #[must_use]
    pub fn members(&self, room: RoomId) -> Vec<Player> {
        self.rooms
            .get(&room)
            .map(|ids| ids.iter().filter_map(|id| self.players.get(id).cloned()).collect())
            .unwrap_or_default()
    }

    /// Remove a connection and update membership of the room it was bound to.
    pub fn disconnect(&mut self, connection: ConnectionId) -> Departure {
        let Some(gone) = self.connections.remove(&connection) else {
            return Departure::Unknown;
        };
        let Some(player_id) = gone.player_id else {
            return Departure::Silent;
        };
        let departure = match gone.room_id {
            Some(room) => self.release(room, &player_id),
            None => Departure::Silent,
        };
        self.forget_if_offline(&player_id);
        departure
    }

    /// Send an event to every connection bound to a room.
    ///
    /// Returns the number of live receivers reached.
    pub fn broadcast(&self, room: RoomId, event: &ServerEvent) -> usize {
        self.connections
            .values()
            .filter(|c| c.room_id == Some(room))
            .filter(|c| c.outbox.send(event.clone()).is_ok())
            .count()
    }

    /// Number of registered connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Drop `player_id` from `room` unless one of its connections is still
    /// bound there.
    fn release(&mut self, room: RoomId, player_id: &str) -> Departure {
        let still_bound = self
            .connections
            .values()
            .any(|c| c.room_id == Some(room) && c.player_id.as_deref() == Some(player_id));
        if still_bound {
            return Departure::Silent;
        }
        let Some(members) = self.rooms.get_mut(&room) else {
            return Departure::Silent;
        };
        let before = members.len();
        members.retain(|id| id != player_id);
        if members.is_empty() {
            self.rooms.remove(&room);
            return Departure::Closed { room };
        }
        if members.len() == before {
            return Departure::Silent;
        }
        Departure::Left {
            room,
            remaining: self.members(room),
        }
    }

    fn forget_if_offline(&mut self, player_id: &str) {
        if !self
            .connections
            .values()
            .any(|c| c.player_id.as_deref() == Some(player_id))
        {
            self.players.remove(player_id);
        }
    }
}
