//! Rooms, session records, and the coordinator that serves clients.
//!
//! ## Flow
//!
//! Clients connect, join a room, and exchange `ClientEvent`/`ServerEvent`
//! messages with the `Coordinator`. Every change to a room's game happens
//! inside one `SessionStore::transaction`, which is the only mutual
//! exclusion on game progress.

mod config;
mod coordinator;
mod protocol;
mod record;
mod registry;
mod store;

pub use config::CoordinatorConfig;
pub use coordinator::{Coordinator, CoordinatorError, Outcome, Rejection};
pub use protocol::{
    AddAiPlayerRequest, AddAiPlayerResponse, ClientEvent, CreateRoomRequest, CreateRoomResponse,
    GameActionRequest, GameStart, RoomJoin, ServerEvent,
};
pub use record::{GameSessionData, RoomId, RoomRecord, SessionId, SessionRecord};
pub use registry::{ConnectionId, Departure, Joined, Registry};
pub use store::{MemoryStore, SessionStore, StoreError, Transaction};
