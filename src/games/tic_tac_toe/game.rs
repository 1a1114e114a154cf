//! Tic-tac-toe implementation.

use serde::{Deserialize, Serialize};

use crate::core::Seat;
use crate::rules::{ActionLog, GameResult, Rules};

/// Board side length.
pub const SIZE: usize = 3;

/// Rules text shown to players.
pub const RULES: &str = "Tic-tac-toe - Game Rules

Setup:
- 2 players
- The board is a 3x3 grid that starts empty

Gameplay:
- Players take turns marking one empty cell
- The first player to get 3 marks in a row (horizontal, vertical, or diagonal) wins
- If every cell is marked and nobody has 3 in a row, the game is a draw";

/// Tic-tac-toe state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicTacToeState {
    /// Marks by row then column; `None` is empty.
    pub board: [[Option<Seat>; SIZE]; SIZE],
    /// Seat to move.
    pub current_player: Seat,
    /// `None` while the game continues.
    pub winner: Option<GameResult>,
}

/// Mark a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicTacToeAction {
    pub player: Seat,
    pub row: u8,
    pub col: u8,
}

impl TicTacToeAction {
    #[must_use]
    pub fn new(player: Seat, row: u8, col: u8) -> Self {
        Self { player, row, col }
    }
}

/// Tic-tac-toe rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct TicTacToe;

impl TicTacToe {
    /// Winner of a board, `Draw` when full without a line, `None` otherwise.
    #[must_use]
    pub fn check_winner(board: &[[Option<Seat>; SIZE]; SIZE]) -> Option<GameResult> {
        const LINES: [[(usize, usize); 3]; 8] = [
            [(0, 0), (0, 1), (0, 2)],
            [(1, 0), (1, 1), (1, 2)],
            [(2, 0), (2, 1), (2, 2)],
            [(0, 0), (1, 0), (2, 0)],
            [(0, 1), (1, 1), (2, 1)],
            [(0, 2), (1, 2), (2, 2)],
            [(0, 0), (1, 1), (2, 2)],
            [(0, 2), (1, 1), (2, 0)],
        ];

        for [a, b, c] in LINES {
            if let Some(seat) = board[a.0][a.1] {
                if board[b.0][b.1] == Some(seat) && board[c.0][c.1] == Some(seat) {
                    return Some(GameResult::Winner(seat));
                }
            }
        }

        let full = board.iter().flatten().all(Option::is_some);
        full.then_some(GameResult::Draw)
    }
}

impl Rules for TicTacToe {
    type State = TicTacToeState;
    type Action = TicTacToeAction;
    const NAME: &'static str = "tic_tac_toe";

    fn new_init_state(&self, _num_players: usize) -> TicTacToeState {
        TicTacToeState {
            board: [[None; SIZE]; SIZE],
            current_player: Seat::new(0),
            winner: None,
        }
    }

    fn valid_actions(&self, state: &TicTacToeState) -> Vec<TicTacToeAction> {
        if state.winner.is_some() {
            return vec![];
        }

        let mut actions = Vec::new();
        for (row, cells) in state.board.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if cell.is_none() {
                    actions.push(TicTacToeAction::new(state.current_player, row as u8, col as u8));
                }
            }
        }
        actions
    }

    fn apply_action(&self, state: &mut TicTacToeState, action: &TicTacToeAction, log: &mut ActionLog<'_>) {
        let name = log.name(action.player);
        state.board[action.row as usize][action.col as usize] = Some(action.player);
        log.push(format!("{name} played ({}, {})", action.row, action.col));

        match Self::check_winner(&state.board) {
            Some(GameResult::Draw) => {
                state.winner = Some(GameResult::Draw);
                log.push("Game ends in a draw");
            }
            Some(GameResult::Winner(seat)) => {
                state.winner = Some(GameResult::Winner(seat));
                log.push(format!("{} wins!", log.name(seat)));
            }
            None => state.current_player = state.current_player.next(2),
        }
    }

    fn result(&self, state: &TicTacToeState) -> Option<GameResult> {
        state.winner
    }

    fn current_player(&self, state: &TicTacToeState) -> Seat {
        state.current_player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Player;
    use crate::rules::GameMachine;

    const X: Seat = Seat::new(0);
    const O: Seat = Seat::new(1);

    fn new_game() -> GameMachine<TicTacToe> {
        GameMachine::new(&[Player::new("a", "Alice"), Player::new("b", "Bob")]).unwrap()
    }

    fn play(game: &mut GameMachine<TicTacToe>, moves: &[(Seat, u8, u8)]) {
        for &(seat, row, col) in moves {
            assert!(game.take_action(&TicTacToeAction::new(seat, row, col)), "move {row},{col}");
        }
    }

    #[test]
    fn test_initial_actions() {
        let game = new_game();
        let actions = game.valid_actions();
        assert_eq!(actions.len(), 9);
        assert!(actions.iter().all(|a| a.player == X));
    }

    #[test]
    fn test_turn_alternates() {
        let mut game = new_game();
        play(&mut game, &[(X, 0, 0)]);
        assert_eq!(game.state().current_player, O);

        // Wrong seat and occupied cell are both rejected.
        assert!(!game.take_action(&TicTacToeAction::new(X, 1, 1)));
        assert!(!game.take_action(&TicTacToeAction::new(O, 0, 0)));
        assert_eq!(game.action_history().len(), 1);
    }

    #[test]
    fn test_column_win() {
        let mut game = new_game();
        play(&mut game, &[(X, 0, 1), (O, 0, 0), (X, 1, 1), (O, 1, 0), (X, 2, 1)]);
        assert_eq!(game.result(), Some(GameResult::Winner(X)));
        assert_eq!(game.history_display()[4], "Alice played (2, 1)\nAlice wins!");
    }

    #[test]
    fn test_anti_diagonal_win() {
        let mut game = new_game();
        play(&mut game, &[(X, 0, 0), (O, 0, 2), (X, 0, 1), (O, 1, 1), (X, 2, 2), (O, 2, 0)]);
        assert_eq!(game.result(), Some(GameResult::Winner(O)));
        assert_eq!(game.state().current_player, O, "turn does not pass after a win");
    }

    #[test]
    fn test_full_board_is_draw() {
        let mut game = new_game();
        // X O X / X O O / O X X
        play(
            &mut game,
            &[
                (X, 0, 0), (O, 0, 1), (X, 0, 2),
                (O, 1, 1), (X, 1, 0), (O, 1, 2),
                (X, 2, 1), (O, 2, 0), (X, 2, 2),
            ],
        );

        assert_eq!(game.result(), Some(GameResult::Draw));
        assert_ne!(game.result(), None);
        assert!(game.has_ended());
        assert!(game.valid_actions().is_empty());
        assert_eq!(game.history_display()[8], "Alice played (2, 2)\nGame ends in a draw");
    }

    #[test]
    fn test_check_winner_empty_board() {
        assert_eq!(TicTacToe::check_winner(&[[None; SIZE]; SIZE]), None);
    }

    #[test]
    fn test_state_serialization() {
        let mut game = new_game();
        play(&mut game, &[(X, 1, 2)]);

        let value = serde_json::to_value(game.state()).unwrap();
        assert_eq!(value["board"][1][2], 0);
        assert!(value["board"][0][0].is_null());
        assert_eq!(value["currentPlayer"], 1);
        assert!(value["winner"].is_null());
    }
}
