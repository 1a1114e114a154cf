//! Transactional session storage.
//!
//! Every read-validate-write sequence on a room's game runs inside one
//! `SessionStore::transaction` call. Implementations must serialize
//! transactions (or provide equivalent isolation) and must discard every
//! staged write when the closure returns `Err`.
//!
//! ## MemoryStore
//!
//! Tables are `im` persistent maps behind an async mutex. A transaction
//! clones the committed tables (O(1) structural sharing), lets the closure
//! mutate the copy, and swaps it in only on success.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use super::record::{RoomId, RoomRecord, SessionId, SessionRecord};

/// Storage-level failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown room: {0}")]
    UnknownRoom(RoomId),

    #[error("unknown session: {0}")]
    UnknownSession(SessionId),

    /// Only the newest record of a room accepts writes.
    #[error("session {0} has been superseded")]
    SupersededSession(SessionId),
}

/// Operations available inside one transaction.
pub trait Transaction {
    /// Insert a new room row.
    fn insert_room(&mut self) -> RoomRecord;

    /// Check whether a room row exists.
    fn room_exists(&self, room: RoomId) -> bool;

    /// Append a new, not-yet-started session record to a room.
    fn insert_session(&mut self, room: RoomId, game_name: &str) -> Result<SessionRecord, StoreError>;

    /// The most recently created record of a room.
    fn active_session(&self, room: RoomId) -> Result<SessionRecord, StoreError>;

    /// All records of a room, oldest first.
    fn sessions(&self, room: RoomId) -> Vec<SessionRecord>;

    /// Overwrite a record's snapshot, stamping `ended_at` when given.
    fn save_snapshot(
        &mut self,
        session: SessionId,
        snapshot: Value,
        ended_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;
}

/// Durable store of rooms and session records.
pub trait SessionStore: Send + Sync + 'static {
    /// Run `f` atomically.
    ///
    /// `Ok` commits every write made through the transaction; `Err` discards
    /// them all and is returned unchanged.
    fn transaction<T, E, F>(&self, f: F) -> impl Future<Output = Result<T, E>> + Send
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T, E> + Send,
        T: Send,
        E: From<StoreError> + Send;
}

impl<S: SessionStore> SessionStore for Arc<S> {
    fn transaction<T, E, F>(&self, f: F) -> impl Future<Output = Result<T, E>> + Send
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T, E> + Send,
        T: Send,
        E: From<StoreError> + Send,
    {
        (**self).transaction(f)
    }
}

#[derive(Clone, Debug, Default)]
struct Tables {
    rooms: im::HashMap<RoomId, RoomRecord>,
    sessions: im::HashMap<SessionId, SessionRecord>,
    /// Record ids per room in creation order.
    room_sessions: im::HashMap<RoomId, im::Vector<SessionId>>,
}

impl Tables {
    fn latest_id(&self, room: RoomId) -> Option<SessionId> {
        self.room_sessions.get(&room).and_then(|ids| ids.last().copied())
    }
}

impl Transaction for Tables {
    fn insert_room(&mut self) -> RoomRecord {
        let record = RoomRecord {
            id: RoomId::random(),
            created_at: Utc::now(),
        };
        self.rooms.insert(record.id, record.clone());
        self.room_sessions.insert(record.id, im::Vector::new());
        record
    }

    fn room_exists(&self, room: RoomId) -> bool {
        self.rooms.contains_key(&room)
    }

    fn insert_session(&mut self, room: RoomId, game_name: &str) -> Result<SessionRecord, StoreError> {
        let ids = self
            .room_sessions
            .get_mut(&room)
            .ok_or(StoreError::UnknownRoom(room))?;
        let record = SessionRecord {
            id: SessionId::random(),
            room_id: room,
            game_name: game_name.to_string(),
            fsm_snapshot: None,
            created_at: Utc::now(),
            ended_at: None,
        };
        ids.push_back(record.id);
        self.sessions.insert(record.id, record.clone());
        Ok(record)
    }

    fn active_session(&self, room: RoomId) -> Result<SessionRecord, StoreError> {
        let id = self.latest_id(room).ok_or(StoreError::UnknownRoom(room))?;
        self.sessions
            .get(&id)
            .cloned()
            .ok_or(StoreError::UnknownSession(id))
    }

    fn sessions(&self, room: RoomId) -> Vec<SessionRecord> {
        self.room_sessions
            .get(&room)
            .map(|ids| ids.iter().filter_map(|id| self.sessions.get(id).cloned()).collect())
            .unwrap_or_default()
    }

    fn save_snapshot(
        &mut self,
        session: SessionId,
        snapshot: Value,
        ended_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let room = self
            .sessions
            .get(&session)
            .map(|record| record.room_id)
            .ok_or(StoreError::UnknownSession(session))?;
        if self.latest_id(room) != Some(session) {
            return Err(StoreError::SupersededSession(session));
        }
        if let Some(record) = self.sessions.get_mut(&session) {
            record.fsm_snapshot = Some(snapshot);
            if ended_at.is_some() {
                record.ended_at = ended_at;
            }
        }
        Ok(())
    }
}

/// In-process `SessionStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn transaction<T, E, F>(&self, f: F) -> impl Future<Output = Result<T, E>> + Send
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T, E> + Send,
        T: Send,
        E: From<StoreError> + Send,
    {
        async move {
            let mut committed = self.tables.lock().await;
            let mut staged = committed.clone();
            let out = f(&mut staged)?;
            *committed = staged;
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_room_and_session_lifecycle() {
        let store = MemoryStore::new();
        let (room, first) = store
            .transaction(|tx| {
                let room = tx.insert_room();
                let session = tx.insert_session(room.id, "boop")?;
                Ok::<_, StoreError>((room.id, session))
            })
            .await
            .unwrap();

        let active = store.transaction(|tx| tx.active_session(room)).await.unwrap();
        assert_eq!(active, first);
        assert_eq!(active.fsm_snapshot, None);

        let second = store
            .transaction(|tx| tx.insert_session(room, "boop"))
            .await
            .unwrap();
        let (active, history) = store
            .transaction(|tx| Ok::<_, StoreError>((tx.active_session(room)?, tx.sessions(room))))
            .await
            .unwrap();
        assert_eq!(active.id, second.id);
        assert_eq!(
            history.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
    }

    #[tokio::test]
    async fn test_failed_transaction_discards_writes() {
        let store = MemoryStore::new();
        let result = store
            .transaction(|tx| {
                let room = tx.insert_room();
                tx.insert_session(room.id, "tic_tac_toe")?;
                Err::<(), _>(StoreError::UnknownRoom(room.id))
            })
            .await;
        assert!(result.is_err());

        let rooms = store.tables.lock().await.rooms.len();
        assert_eq!(rooms, 0);
    }

    #[tokio::test]
    async fn test_unknown_room() {
        let store = MemoryStore::new();
        let room = RoomId::random();
        assert!(matches!(
            store.transaction(|tx| tx.active_session(room)).await,
            Err(StoreError::UnknownRoom(id)) if id == room
        ));
        assert!(matches!(
            store.transaction(|tx| tx.insert_session(room, "boop")).await,
            Err(StoreError::UnknownRoom(_))
        ));
        assert!(store
            .transaction(|tx| Ok::<_, StoreError>(tx.sessions(room)))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_save_snapshot_only_on_latest_record() {
        let store = MemoryStore::new();
        let (room, first) = store
            .transaction(|tx| {
                let room = tx.insert_room();
                Ok::<_, StoreError>((room.id, tx.insert_session(room.id, "boop")?))
            })
            .await
            .unwrap();

        let ended = Utc::now();
        store
            .transaction(|tx| tx.save_snapshot(first.id, json!({"n": 1}), Some(ended)))
            .await
            .unwrap();
        let saved = store.transaction(|tx| tx.active_session(room)).await.unwrap();
        assert_eq!(saved.fsm_snapshot, Some(json!({"n": 1})));
        assert_eq!(saved.ended_at, Some(ended));

        store
            .transaction(|tx| tx.insert_session(room, "boop"))
            .await
            .unwrap();
        assert!(matches!(
            store
                .transaction(|tx| tx.save_snapshot(first.id, json!({"n": 2}), None))
                .await,
            Err(StoreError::SupersededSession(id)) if id == first.id
        ));

        let missing = SessionId::random();
        assert!(matches!(
            store.transaction(|tx| tx.save_snapshot(missing, json!({}), None)).await,
            Err(StoreError::UnknownSession(_))
        ));
    }
}
