//! Board geometry for Boop: pieces, positions, displacement, and lines.
//!
//! Everything here is a pure function of the board. The rules in `game.rs`
//! decide when to call it and what to do with the results.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::Seat;

/// Board side length.
pub const BOARD_SIZE: usize = 6;

/// Pieces each player owns across board and reserve.
pub const PIECES_PER_PLAYER: u8 = 8;

/// The eight neighbour offsets, row-major.
const NEIGHBOURS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// Line directions scanned from each start cell: right, down, down-right, down-left.
const LINE_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Piece tier. `Cat` dominates `Kitten`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Kitten,
    Cat,
}

impl PieceKind {
    /// Whether a placed piece of this kind pushes a neighbour of `other` kind.
    #[must_use]
    pub fn can_boop(self, other: PieceKind) -> bool {
        self >= other
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PieceKind::Kitten => f.write_str("kitten"),
            PieceKind::Cat => f.write_str("cat"),
        }
    }
}

/// A piece on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub owner: Seat,
    pub kind: PieceKind,
}

impl Piece {
    #[must_use]
    pub const fn new(owner: Seat, kind: PieceKind) -> Self {
        Self { owner, kind }
    }
}

/// A board coordinate. Serializes as `[row, col]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(u8, u8)", into = "(u8, u8)")]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Whether this position lies on the board.
    #[must_use]
    pub fn is_valid(self) -> bool {
        (self.row as usize) < BOARD_SIZE && (self.col as usize) < BOARD_SIZE
    }

    /// The position one step along `direction`, if still on the board.
    #[must_use]
    pub fn step(self, direction: (i8, i8)) -> Option<Pos> {
        let row = i16::from(self.row) + i16::from(direction.0);
        let col = i16::from(self.col) + i16::from(direction.1);
        let pos = Pos::new(u8::try_from(row).ok()?, u8::try_from(col).ok()?);
        pos.is_valid().then_some(pos)
    }

    /// Unit direction from `self` towards `to` (sign of the difference per axis).
    #[must_use]
    pub fn direction_to(self, to: Pos) -> (i8, i8) {
        let sign = |from: u8, to: u8| (i16::from(to) - i16::from(from)).signum() as i8;
        (sign(self.row, to.row), sign(self.col, to.col))
    }
}

impl From<(u8, u8)> for Pos {
    fn from((row, col): (u8, u8)) -> Self {
        Pos::new(row, col)
    }
}

impl From<Pos> for (u8, u8) {
    fn from(pos: Pos) -> Self {
        (pos.row, pos.col)
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Per-player count of pieces by tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceCount {
    pub cats: u8,
    pub kittens: u8,
}

impl PieceCount {
    #[must_use]
    pub const fn new(cats: u8, kittens: u8) -> Self {
        Self { cats, kittens }
    }

    /// Total pieces of both tiers.
    #[must_use]
    pub fn total(&self) -> u8 {
        self.cats + self.kittens
    }

    /// Count of one tier.
    #[must_use]
    pub fn of(&self, kind: PieceKind) -> u8 {
        match kind {
            PieceKind::Cat => self.cats,
            PieceKind::Kitten => self.kittens,
        }
    }

    /// Add one piece of `kind`.
    pub fn add(&mut self, kind: PieceKind) {
        match kind {
            PieceKind::Cat => self.cats += 1,
            PieceKind::Kitten => self.kittens += 1,
        }
    }

    /// Remove one piece of `kind`.
    pub fn remove(&mut self, kind: PieceKind) {
        match kind {
            PieceKind::Cat => self.cats -= 1,
            PieceKind::Kitten => self.kittens -= 1,
        }
    }
}

/// The outcome of pushing one neighbour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Displacement {
    /// Where the neighbour stood.
    pub from: Pos,
    /// Where it lands; `None` means pushed off the board.
    pub to: Option<Pos>,
}

/// Three same-owner pieces in a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineCandidate {
    pub positions: [Pos; 3],
    pub all_cats: bool,
}

/// 6×6 grid of optional pieces.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// An empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Piece at `pos`.
    #[must_use]
    pub fn get(&self, pos: Pos) -> Option<Piece> {
        self.cells[pos.row as usize][pos.col as usize]
    }

    /// Put `piece` at `pos`, replacing whatever was there.
    pub fn set(&mut self, pos: Pos, piece: Option<Piece>) {
        self.cells[pos.row as usize][pos.col as usize] = piece;
    }

    /// Remove and return the piece at `pos`.
    pub fn take(&mut self, pos: Pos) -> Option<Piece> {
        self.cells[pos.row as usize][pos.col as usize].take()
    }

    /// Every position, row-major.
    pub fn positions() -> impl Iterator<Item = Pos> {
        (0..BOARD_SIZE as u8).flat_map(|row| (0..BOARD_SIZE as u8).map(move |col| Pos::new(row, col)))
    }

    /// Positions holding a piece owned by `seat`, row-major.
    pub fn positions_of(&self, seat: Seat) -> impl Iterator<Item = Pos> + '_ {
        Self::positions().filter(move |&pos| self.get(pos).is_some_and(|p| p.owner == seat))
    }

    /// Pieces `seat` has on the board, by tier.
    #[must_use]
    pub fn count(&self, seat: Seat) -> PieceCount {
        let mut count = PieceCount::default();
        for pos in self.positions_of(seat) {
            if let Some(piece) = self.get(pos) {
                count.add(piece.kind);
            }
        }
        count
    }

    /// Pushes caused by placing `placed` at `at`.
    ///
    /// Destinations are judged against the board as it stands, before any
    /// neighbour moves. A neighbour whose destination is occupied is left
    /// out; pushed pieces never push further.
    #[must_use]
    pub fn displacements(&self, at: Pos, placed: Piece) -> SmallVec<[Displacement; 8]> {
        let mut results = SmallVec::new();

        for offset in NEIGHBOURS {
            let Some(from) = at.step(offset) else {
                continue;
            };
            let Some(target) = self.get(from) else {
                continue;
            };
            if !placed.kind.can_boop(target.kind) {
                continue;
            }

            let direction = at.direction_to(from);
            match from.step(direction) {
                None => results.push(Displacement { from, to: None }),
                Some(to) if self.get(to).is_none() => results.push(Displacement { from, to: Some(to) }),
                Some(_) => {}
            }
        }

        results
    }

    /// Every run of three consecutive pieces owned by `seat`.
    ///
    /// Overlapping runs are reported individually, so four in a row yields
    /// two candidates.
    #[must_use]
    pub fn lines_of(&self, seat: Seat) -> Vec<LineCandidate> {
        let mut lines = Vec::new();

        for start in self.positions_of(seat) {
            for direction in LINE_DIRECTIONS {
                let Some(second) = start.step(direction) else {
                    continue;
                };
                let Some(third) = second.step(direction) else {
                    continue;
                };

                let positions = [start, second, third];
                let pieces: SmallVec<[Piece; 3]> = positions
                    .iter()
                    .filter_map(|&pos| self.get(pos))
                    .filter(|piece| piece.owner == seat)
                    .collect();

                if pieces.len() == 3 {
                    let all_cats = pieces.iter().all(|p| p.kind == PieceKind::Cat);
                    lines.push(LineCandidate { positions, all_cats });
                }
            }
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P0: Seat = Seat::new(0);
    const P1: Seat = Seat::new(1);

    fn kitten(owner: Seat) -> Option<Piece> {
        Some(Piece::new(owner, PieceKind::Kitten))
    }

    fn cat(owner: Seat) -> Option<Piece> {
        Some(Piece::new(owner, PieceKind::Cat))
    }

    #[test]
    fn test_tier_domination() {
        assert!(PieceKind::Cat.can_boop(PieceKind::Cat));
        assert!(PieceKind::Cat.can_boop(PieceKind::Kitten));
        assert!(PieceKind::Kitten.can_boop(PieceKind::Kitten));
        assert!(!PieceKind::Kitten.can_boop(PieceKind::Cat));
    }

    #[test]
    fn test_step_and_direction() {
        assert_eq!(Pos::new(0, 0).step((-1, 0)), None);
        assert_eq!(Pos::new(5, 5).step((0, 1)), None);
        assert_eq!(Pos::new(2, 2).step((1, -1)), Some(Pos::new(3, 1)));
        assert_eq!(Pos::new(2, 2).direction_to(Pos::new(1, 3)), (-1, 1));
        assert_eq!(Pos::new(2, 2).direction_to(Pos::new(2, 2)), (0, 0));
        assert!(!Pos::new(6, 0).is_valid());
    }

    #[test]
    fn test_pos_serializes_as_pair() {
        assert_eq!(serde_json::to_string(&Pos::new(1, 4)).unwrap(), "[1,4]");
        let pos: Pos = serde_json::from_str("[3,2]").unwrap();
        assert_eq!(pos, Pos::new(3, 2));
    }

    #[test]
    fn test_displacement_moves_into_empty_cell() {
        let mut board = Board::new();
        board.set(Pos::new(2, 3), kitten(P1));

        let pushes = board.displacements(Pos::new(2, 2), Piece::new(P0, PieceKind::Cat));
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].from, Pos::new(2, 3));
        assert_eq!(pushes[0].to, Some(Pos::new(2, 4)));
    }

    #[test]
    fn test_displacement_blocked_by_occupied_destination() {
        let mut board = Board::new();
        board.set(Pos::new(2, 3), kitten(P1));
        board.set(Pos::new(2, 4), kitten(P0));

        let pushes = board.displacements(Pos::new(2, 2), Piece::new(P0, PieceKind::Kitten));
        assert!(pushes.is_empty());
    }

    #[test]
    fn test_displacement_off_board() {
        let mut board = Board::new();
        board.set(Pos::new(0, 0), kitten(P1));

        let pushes = board.displacements(Pos::new(1, 1), Piece::new(P0, PieceKind::Kitten));
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].to, None);
        assert_eq!(pushes[0].from, Pos::new(0, 0));
    }

    #[test]
    fn test_kitten_cannot_push_cat() {
        let mut board = Board::new();
        board.set(Pos::new(3, 3), cat(P1));
        board.set(Pos::new(3, 1), kitten(P1));

        let pushes = board.displacements(Pos::new(3, 2), Piece::new(P0, PieceKind::Kitten));
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].from, Pos::new(3, 1));
    }

    #[test]
    fn test_pushes_own_pieces_too() {
        let mut board = Board::new();
        for pos in [Pos::new(1, 1), Pos::new(1, 3), Pos::new(3, 1), Pos::new(3, 3)] {
            board.set(pos, kitten(P0));
        }

        let pushes = board.displacements(Pos::new(2, 2), Piece::new(P0, PieceKind::Kitten));
        assert_eq!(pushes.len(), 4);
    }

    #[test]
    fn test_lines_overlap_individually() {
        let mut board = Board::new();
        for col in 0..4 {
            board.set(Pos::new(0, col), kitten(P0));
        }

        let lines = board.lines_of(P0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].positions, [Pos::new(0, 0), Pos::new(0, 1), Pos::new(0, 2)]);
        assert_eq!(lines[1].positions, [Pos::new(0, 1), Pos::new(0, 2), Pos::new(0, 3)]);
        assert!(board.lines_of(P1).is_empty());
    }

    #[test]
    fn test_lines_all_directions() {
        let mut board = Board::new();
        // Anti-diagonal of cats.
        board.set(Pos::new(0, 5), cat(P1));
        board.set(Pos::new(1, 4), cat(P1));
        board.set(Pos::new(2, 3), cat(P1));
        // Mixed vertical.
        board.set(Pos::new(3, 0), kitten(P1));
        board.set(Pos::new(4, 0), cat(P1));
        board.set(Pos::new(5, 0), kitten(P1));

        let lines = board.lines_of(P1);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().any(|l| l.all_cats && l.positions[0] == Pos::new(0, 5)));
        assert!(lines.iter().any(|l| !l.all_cats && l.positions[0] == Pos::new(3, 0)));
    }

    #[test]
    fn test_mixed_owner_is_not_a_line() {
        let mut board = Board::new();
        board.set(Pos::new(4, 1), kitten(P0));
        board.set(Pos::new(4, 2), kitten(P1));
        board.set(Pos::new(4, 3), kitten(P0));
        assert!(board.lines_of(P0).is_empty());
    }

    #[test]
    fn test_count() {
        let mut board = Board::new();
        board.set(Pos::new(0, 0), cat(P0));
        board.set(Pos::new(5, 5), kitten(P0));
        board.set(Pos::new(2, 2), kitten(P1));

        assert_eq!(board.count(P0), PieceCount::new(1, 1));
        assert_eq!(board.count(P1).total(), 1);
        assert_eq!(board.take(Pos::new(0, 0)), cat(P0));
        assert_eq!(board.count(P0), PieceCount::new(0, 1));
    }
}
