//! Boop implementation.

use serde::{Deserialize, Serialize};

use crate::core::{PlayerMap, Seat};
use crate::rules::{ActionLog, GameResult, Rules};

use super::board::{Board, LineCandidate, Piece, PieceCount, PieceKind, Pos, PIECES_PER_PLAYER};

/// Rules text shown to players.
pub const RULES: &str = "Boop - Game Rules

Setup:
- 2 players
- Each player starts with 8 Kittens of their color
- 8 Cats of each color are kept in reserve
- The game board is a 6x6 grid that starts empty

Gameplay:
1. Players take turns placing one Kitten or Cat on any empty space
2. When placing a piece, it \"boops\" all adjacent pieces (including diagonal):
   - Adjacent pieces move one space away from the placed piece
   - Pieces can be booped off the board and return to their owner's pool
   - Booped pieces don't cause chain reactions
   - When two adjacent pieces are already in a line, a piece played into that line cannot push them
   - However, pieces in a line can still be booped from other directions

Special Rules:
- Cats can boop both Cats and Kittens
- Kittens cannot boop Cats
- You always have exactly 8 pieces available to play

Graduating Kittens:
- When you line up 3 pieces in a row (horizontal, vertical, or diagonal):
  - If all 3 pieces are Cats, you win immediately
  - Otherwise:
    - Remove all 3 pieces from the game
    - For each Kitten removed, add a Cat from reserve to your pool
    - Return any removed Cats to your pool
    - If multiple sets of 3 are lined up, choose which group to graduate
- If you have all 8 pieces on the board:
  - If all 8 pieces are Cats, you win immediately
  - Otherwise:
    - Graduate any one Kitten to a Cat OR
    - Return a Cat to your pool

Winning:
- Line up 3 Cats in a row OR
- Have all 8 Cats on the board at once";

/// Boop state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoopState {
    pub board: Board,
    /// Seat to move or to resolve a pending decision.
    pub current_player: Seat,
    pub winner: Option<Seat>,
    /// Pieces each player holds off the board.
    pub reserves: PlayerMap<PieceCount>,
    /// Lines awaiting a `select-graduation` decision.
    pub pending_graduations: Vec<LineCandidate>,
    /// The current player has all 8 pieces on the board and must remove one.
    pub needs_piece_removal: bool,
}

impl BoopState {
    /// Pieces `seat` owns across board and reserve. Always 8.
    #[must_use]
    pub fn total_pieces(&self, seat: Seat) -> u8 {
        self.board.count(seat).total() + self.reserves[seat].total()
    }

    /// Whether the current player owes a graduation or removal decision.
    #[must_use]
    pub fn awaiting_decision(&self) -> bool {
        !self.pending_graduations.is_empty() || self.needs_piece_removal
    }
}

/// Boop move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BoopAction {
    /// Place a piece from reserve on an empty cell.
    Place {
        player: Seat,
        row: u8,
        col: u8,
        #[serde(rename = "pieceType")]
        piece: PieceKind,
    },
    /// Graduate one pending line.
    SelectGraduation { player: Seat, positions: [Pos; 3] },
    /// Take one of your own pieces off a full board.
    RemovePiece { player: Seat, row: u8, col: u8 },
}

/// Boop rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct Boop;

impl Boop {
    fn place(state: &mut BoopState, player: Seat, at: Pos, kind: PieceKind, log: &mut ActionLog<'_>) {
        let name = log.name(player);
        let placed = Piece::new(player, kind);
        state.board.set(at, Some(placed));
        state.reserves[player].remove(kind);
        log.push(format!("{name} placed a {kind} at {at}"));

        for push in state.board.displacements(at, placed) {
            let Some(piece) = state.board.take(push.from) else {
                continue;
            };
            match push.to {
                Some(to) => state.board.set(to, Some(piece)),
                None => state.reserves[piece.owner].add(piece.kind),
            }
        }

        let candidates = state.board.lines_of(player);
        if candidates.iter().any(|line| line.all_cats) {
            state.winner = Some(player);
            log.push(format!("{name} wins with three cats in a row!"));
            return;
        }
        state.pending_graduations = candidates;

        let on_board = state.board.count(player);
        if on_board.cats == PIECES_PER_PLAYER {
            state.winner = Some(player);
            state.pending_graduations.clear();
            log.push(format!("{name} wins with 8 cats on the board!"));
            return;
        }
        state.needs_piece_removal = on_board.total() == PIECES_PER_PLAYER;

        if !state.needs_piece_removal && state.pending_graduations.len() == 1 {
            let line = state.pending_graduations.remove(0);
            Self::graduate(state, player, &line.positions, log);
        }

        if !state.awaiting_decision() {
            state.current_player = state.current_player.next(state.reserves.seat_count());
        }
    }

    fn graduate(state: &mut BoopState, player: Seat, positions: &[Pos; 3], log: &mut ActionLog<'_>) {
        let mut kittens = 0;
        for &pos in positions {
            if state.board.take(pos).is_some_and(|p| p.kind == PieceKind::Kitten) {
                kittens += 1;
            }
        }
        state.reserves[player].cats += 3;

        let (kitten_text, cat_text) = if kittens == 1 { ("kitten", "a cat") } else { ("kittens", "cats") };
        log.push(format!("{} graduated {kittens} {kitten_text} to {cat_text}", log.name(player)));
    }

    fn remove(state: &mut BoopState, player: Seat, at: Pos, log: &mut ActionLog<'_>) {
        let name = log.name(player);
        match state.board.take(at).map(|p| p.kind) {
            Some(PieceKind::Kitten) => log.push(format!("{name} graduated a kitten to a cat")),
            Some(PieceKind::Cat) => log.push(format!("{name} returned a cat to their pool")),
            None => return,
        }
        state.reserves[player].cats += 1;
    }

    fn end_decision(state: &mut BoopState) {
        state.pending_graduations.clear();
        state.needs_piece_removal = false;
        state.current_player = state.current_player.next(state.reserves.seat_count());
    }
}

impl Rules for Boop {
    type State = BoopState;
    type Action = BoopAction;
    const NAME: &'static str = "boop";

    fn new_init_state(&self, num_players: usize) -> BoopState {
        BoopState {
            board: Board::new(),
            current_player: Seat::new(0),
            winner: None,
            reserves: PlayerMap::with_value(num_players, PieceCount::new(0, PIECES_PER_PLAYER)),
            pending_graduations: Vec::new(),
            needs_piece_removal: false,
        }
    }

    fn valid_actions(&self, state: &BoopState) -> Vec<BoopAction> {
        if state.winner.is_some() {
            return vec![];
        }

        let player = state.current_player;

        if state.awaiting_decision() {
            let mut actions: Vec<BoopAction> = state
                .pending_graduations
                .iter()
                .map(|line| BoopAction::SelectGraduation { player, positions: line.positions })
                .collect();

            if state.needs_piece_removal {
                actions.extend(
                    state
                        .board
                        .positions_of(player)
                        .map(|pos| BoopAction::RemovePiece { player, row: pos.row, col: pos.col }),
                );
            }
            return actions;
        }

        let reserve = state.reserves[player];
        let mut actions = Vec::new();
        for pos in Board::positions().filter(|&pos| state.board.get(pos).is_none()) {
            for piece in [PieceKind::Cat, PieceKind::Kitten] {
                if reserve.of(piece) > 0 {
                    actions.push(BoopAction::Place { player, row: pos.row, col: pos.col, piece });
                }
            }
        }
        actions
    }

    fn apply_action(&self, state: &mut BoopState, action: &BoopAction, log: &mut ActionLog<'_>) {
        match *action {
            BoopAction::Place { player, row, col, piece } => {
                Self::place(state, player, Pos::new(row, col), piece, log);
            }
            BoopAction::SelectGraduation { player, positions } => {
                Self::graduate(state, player, &positions, log);
                Self::end_decision(state);
            }
            BoopAction::RemovePiece { player, row, col } => {
                Self::remove(state, player, Pos::new(row, col), log);
                Self::end_decision(state);
            }
        }
    }

    fn result(&self, state: &BoopState) -> Option<GameResult> {
        state.winner.map(GameResult::Winner)
    }

    fn current_player(&self, state: &BoopState) -> Seat {
        state.current_player
    }
}
