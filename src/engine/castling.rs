use serde::{Deserialize, Serialize};

use crate::engine::board::{Board, Coord};
use crate::engine::material::Color;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

/// Moved-piece flags gating castling. Monotonic within one game: a flag
/// once raised is never cleared, even if the piece returns to its square.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights {
    king_moved: bool,
    kingside_rook_moved: bool,
    queenside_rook_moved: bool,
}

impl CastlingRights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn may_castle(&self, side: CastleSide) -> bool {
        !self.king_moved
            && match side {
                CastleSide::Kingside => !self.kingside_rook_moved,
                CastleSide::Queenside => !self.queenside_rook_moved,
            }
    }

    /// Raise the flags a move leaving `from` implies for `color`.
    pub fn note_departure(&mut self, board: &Board, color: Color, from: Coord) {
        if from == king_home(board, color) {
            self.king_moved = true;
        }
        if from == rook_home(board, color, CastleSide::Kingside) {
            self.kingside_rook_moved = true;
        }
        if from == rook_home(board, color, CastleSide::Queenside) {
            self.queenside_rook_moved = true;
        }
    }
}

/// Column of the king's starting square. Both back ranks share it, but it
/// depends on the seat: col 4 from White's, col 3 from Black's mirror.
fn king_col(perspective: Color) -> u8 {
    match perspective {
        Color::White => 4,
        Color::Black => 3,
    }
}

/// Column of the kingside (h-file) rook for the given seat.
fn kingside_col(perspective: Color) -> u8 {
    match perspective {
        Color::White => 7,
        Color::Black => 0,
    }
}

pub fn king_home(board: &Board, color: Color) -> Coord {
    Coord::new(board.back_row(color), king_col(board.perspective()))
}

pub fn rook_home(board: &Board, color: Color, side: CastleSide) -> Coord {
    let col = match side {
        CastleSide::Kingside => kingside_col(board.perspective()),
        CastleSide::Queenside => 7 - kingside_col(board.perspective()),
    };
    Coord::new(board.back_row(color), col)
}

/// Column step from the king toward the castling rook.
fn toward_rook(board: &Board, side: CastleSide) -> i8 {
    let king = king_col(board.perspective()) as i8;
    let rook = rook_home(board, board.perspective(), side).col as i8;
    if rook > king {
        1
    } else {
        -1
    }
}

/// Where the king lands: two squares toward the rook.
pub fn king_target(board: &Board, color: Color, side: CastleSide) -> Coord {
    let step = toward_rook(board, side);
    let col = (king_col(board.perspective()) as i8 + 2 * step) as u8;
    Coord::new(board.back_row(color), col)
}

/// Where the rook lands: the square the king passed over.
pub fn rook_target(board: &Board, color: Color, side: CastleSide) -> Coord {
    let step = toward_rook(board, side);
    let col = (king_col(board.perspective()) as i8 + step) as u8;
    Coord::new(board.back_row(color), col)
}

/// The squares strictly between king and rook, all of which must be empty.
pub fn blocking_lane(board: &Board, color: Color, side: CastleSide) -> Vec<Coord> {
    let row = board.back_row(color);
    let king = king_col(board.perspective()) as i8;
    let rook = rook_home(board, color, side).col as i8;
    let step = toward_rook(board, side);
    let mut lane = Vec::new();
    let mut col = king + step;
    while col != rook {
        lane.push(Coord::new(row, col as u8));
        col += step;
    }
    lane
}

/// The squares the king crosses or lands on, none of which may be attacked.
pub fn attacked_lane(board: &Board, color: Color, side: CastleSide) -> [Coord; 2] {
    [
        rook_target(board, color, side),
        king_target(board, color, side),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rights_start_open() {
        let rights = CastlingRights::new();
        assert!(rights.may_castle(CastleSide::Kingside));
        assert!(rights.may_castle(CastleSide::Queenside));
    }

    #[test]
    fn test_king_departure_closes_both_sides() {
        let board = Board::initial(Color::White);
        let mut rights = CastlingRights::new();
        rights.note_departure(&board, Color::White, Coord::new(7, 4));
        assert!(!rights.may_castle(CastleSide::Kingside));
        assert!(!rights.may_castle(CastleSide::Queenside));
    }

    #[test]
    fn test_rook_departure_closes_one_side_for_good() {
        let board = Board::initial(Color::White);
        let mut rights = CastlingRights::new();
        rights.note_departure(&board, Color::White, Coord::new(7, 7));
        assert!(!rights.may_castle(CastleSide::Kingside));
        assert!(rights.may_castle(CastleSide::Queenside));
        // Returning to the home square later must not reopen the side;
        // there is no clearing operation at all.
        rights.note_departure(&board, Color::White, Coord::new(5, 5));
        assert!(!rights.may_castle(CastleSide::Kingside));
    }

    #[test]
    fn test_geometry_white_seat() {
        let board = Board::initial(Color::White);
        assert_eq!(king_home(&board, Color::White), Coord::new(7, 4));
        assert_eq!(
            king_target(&board, Color::White, CastleSide::Kingside),
            Coord::new(7, 6)
        );
        assert_eq!(
            rook_target(&board, Color::White, CastleSide::Kingside),
            Coord::new(7, 5)
        );
        assert_eq!(
            blocking_lane(&board, Color::White, CastleSide::Queenside),
            vec![Coord::new(7, 3), Coord::new(7, 2), Coord::new(7, 1)]
        );
    }

    #[test]
    fn test_geometry_black_seat() {
        let board = Board::initial(Color::Black);
        assert_eq!(king_home(&board, Color::Black), Coord::new(7, 3));
        assert_eq!(
            rook_home(&board, Color::Black, CastleSide::Kingside),
            Coord::new(7, 0)
        );
        assert_eq!(
            king_target(&board, Color::Black, CastleSide::Kingside),
            Coord::new(7, 1)
        );
        assert_eq!(
            blocking_lane(&board, Color::Black, CastleSide::Kingside),
            vec![Coord::new(7, 2), Coord::new(7, 1)]
        );
        // The opponent's geometry sits on row 0 of the same seat.
        assert_eq!(king_home(&board, Color::White), Coord::new(0, 3));
    }
}
