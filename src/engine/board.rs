use serde::{Deserialize, Serialize};

use crate::engine::material::{Color, Material, Piece};

/// A square on the 8x8 grid, `row`/`col` in `0..8`.
///
/// Every client indexes the board from its own seat: row 7 is its own back
/// rank, row 0 the opponent's. Coordinates crossing the wire are therefore
/// mirrored on both axes (see [`Coord::mirrored`]).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    #[inline]
    pub const fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < 8 && col < 8);
        Self { row, col }
    }

    /// The same square as seen from the opposite seat.
    #[inline]
    pub const fn mirrored(&self) -> Self {
        Self {
            row: 7 - self.row,
            col: 7 - self.col,
        }
    }

    /// Offset by `(dr, dc)`, `None` when that leaves the board.
    pub fn offset(&self, dr: i8, dc: i8) -> Option<Self> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Self::new(row as u8, col as u8))
        } else {
            None
        }
    }
}

/// The 8x8 board as one client sees it. Pure data: occupancy accessors
/// only, no move rules.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Material>; 8]; 8],
    perspective: Color,
}

impl Board {
    /// An empty board owned by `perspective`.
    pub fn empty(perspective: Color) -> Self {
        Self {
            squares: [[None; 8]; 8],
            perspective,
        }
    }

    /// The starting position as seen from `perspective`'s seat.
    ///
    /// Own pieces fill rows 6-7, the opponent's rows 0-1. The back-rank
    /// order depends on the seat: from White's, the queen sits on col 3
    /// and the king on col 4; from Black's mirrored seat the two swap.
    pub fn initial(perspective: Color) -> Self {
        use Piece::*;
        let back = match perspective {
            Color::White => [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook],
            Color::Black => [Rook, Knight, Bishop, King, Queen, Bishop, Knight, Rook],
        };
        let mut board = Self::empty(perspective);
        let them = !perspective;
        for col in 0..8u8 {
            let piece = back[col as usize];
            board.set(Coord::new(0, col), Some(Material::new(them, piece)));
            board.set(Coord::new(1, col), Some(Material::new(them, Pawn)));
            board.set(Coord::new(6, col), Some(Material::new(perspective, Pawn)));
            board.set(Coord::new(7, col), Some(Material::new(perspective, piece)));
        }
        board
    }

    #[inline]
    pub fn perspective(&self) -> Color {
        self.perspective
    }

    #[inline]
    pub fn get(&self, at: Coord) -> Option<Material> {
        self.squares[at.row as usize][at.col as usize]
    }

    #[inline]
    pub fn set(&mut self, at: Coord, contents: Option<Material>) {
        self.squares[at.row as usize][at.col as usize] = contents;
    }

    /// Every occupied square holding a piece of `color`.
    pub fn pieces_of(&self, color: Color) -> Vec<(Coord, Material)> {
        let mut found = Vec::new();
        for row in 0..8u8 {
            for col in 0..8u8 {
                let at = Coord::new(row, col);
                if let Some(material) = self.get(at) {
                    if material.color() == color {
                        found.push((at, material));
                    }
                }
            }
        }
        found
    }

    pub fn king_square(&self, color: Color) -> Option<Coord> {
        self.pieces_of(color)
            .into_iter()
            .find(|(_, material)| material.piece() == Piece::King)
            .map(|(at, _)| at)
    }

    /// True when `color` has nothing left but the king.
    pub fn only_king_remains(&self, color: Color) -> bool {
        self.pieces_of(color)
            .iter()
            .all(|(_, material)| material.piece() == Piece::King)
    }

    /// Row direction `color`'s pawns travel: own pawns climb toward row 0,
    /// the opponent's descend toward row 7.
    #[inline]
    pub fn forward(&self, color: Color) -> i8 {
        if color == self.perspective {
            -1
        } else {
            1
        }
    }

    #[inline]
    pub fn back_row(&self, color: Color) -> u8 {
        if color == self.perspective {
            7
        } else {
            0
        }
    }

    #[inline]
    pub fn pawn_start_row(&self, color: Color) -> u8 {
        if color == self.perspective {
            6
        } else {
            1
        }
    }

    /// The rank whose reaching triggers promotion for `color`.
    #[inline]
    pub fn promotion_row(&self, color: Color) -> u8 {
        if color == self.perspective {
            0
        } else {
            7
        }
    }
}
