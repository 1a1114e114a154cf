//! Tic-tac-toe.
//!
//! Two players alternate marking cells of a 3×3 grid. Three equal marks in
//! a row, column or diagonal win; a full board without a line is a draw.

mod game;

pub use game::{TicTacToe, TicTacToeAction, TicTacToeState, RULES, SIZE};
