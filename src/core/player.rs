//! Player identity, seats, and per-seat data storage.
//!
//! ## Player
//!
//! Opaque caller-supplied identity (`id`, `name`). The engine never
//! interprets `id`; the coordinator indexes by it.
//!
//! ## Seat
//!
//! 0-based index of a player within one game's player list. Actions and
//! state refer to seats, never to player ids.
//!
//! ## PlayerMap
//!
//! Per-seat data storage backed by `Vec` for O(1) access.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A participant as supplied by the client.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Opaque identifier. Stable across reconnects.
    pub id: String,
    /// Display name used in history lines.
    pub name: String,
}

impl Player {
    /// Create a new player.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Seat index of a player within a game.
///
/// Serializes as a bare number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Seat(pub u8);

impl Seat {
    /// Create a new seat.
    #[must_use]
    pub const fn new(seat: u8) -> Self {
        Self(seat)
    }

    /// Get the raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The seat that moves after this one in a game of `seat_count` seats.
    #[must_use]
    pub fn next(self, seat_count: usize) -> Self {
        Self(((self.index() + 1) % seat_count.max(1)) as u8)
    }

    /// Iterate over all seats for a game with `seat_count` players.
    ///
    /// ```
    /// use rust_tabletop::core::Seat;
    ///
    /// let seats: Vec<_> = Seat::all(2).collect();
    /// assert_eq!(seats, vec![Seat::new(0), Seat::new(1)]);
    /// ```
    pub fn all(seat_count: usize) -> impl Iterator<Item = Seat> {
        (0..seat_count as u8).map(Seat)
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seat {}", self.0)
    }
}

/// Per-seat data storage with O(1) access.
///
/// Serializes as a plain array, one entry per seat.
///
/// ```
/// use rust_tabletop::core::{PlayerMap, Seat};
///
/// let mut pieces: PlayerMap<u8> = PlayerMap::with_value(2, 8);
/// pieces[Seat::new(1)] -= 1;
/// assert_eq!(pieces[Seat::new(0)], 8);
/// assert_eq!(pieces[Seat::new(1)], 7);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(seat_count: usize, factory: impl Fn(Seat) -> T) -> Self {
        assert!(seat_count > 0, "Must have at least 1 player");
        assert!(seat_count <= 255, "At most 255 players supported");

        let data = (0..seat_count as u8).map(|i| factory(Seat(i))).collect();

        Self { data }
    }

    /// Create a new PlayerMap with all entries set to the same value.
    pub fn with_value(seat_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(seat_count, |_| value.clone())
    }

    /// Get the number of seats.
    #[must_use]
    pub fn seat_count(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to a seat's data.
    #[must_use]
    pub fn get(&self, seat: Seat) -> &T {
        &self.data[seat.index()]
    }

    /// Get a mutable reference to a seat's data.
    pub fn get_mut(&mut self, seat: Seat) -> &mut T {
        &mut self.data[seat.index()]
    }
}

impl<T> Index<Seat> for PlayerMap<T> {
    type Output = T;

    fn index(&self, seat: Seat) -> &Self::Output {
        self.get(seat)
    }
}

impl<T> IndexMut<Seat> for PlayerMap<T> {
    fn index_mut(&mut self, seat: Seat) -> &mut Self::Output {
        self.get_mut(seat)
    }
}
