//! Boop: a 6×6 piece-displacement game.
//!
//! - Each player starts with 8 kittens in reserve and no cats
//! - Placing a piece pushes dominated neighbours one cell away
//! - Three of your pieces in a line graduate into cats; three cats win
//! - All 8 of your pieces on the board forces a removal; 8 cats win
//!
//! Geometry lives in `board`, turn structure in `game`.

mod board;
mod game;

pub use board::{
    Board, Displacement, LineCandidate, Piece, PieceCount, PieceKind, Pos, BOARD_SIZE, PIECES_PER_PLAYER,
};
pub use game::{Boop, BoopAction, BoopState, RULES};
