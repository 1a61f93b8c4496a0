use std::collections::HashSet;

use crate::engine::board::{Board, Coord};
use crate::engine::material::{Color, Piece};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const ORTHOGONALS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Destinations reachable by the `color` piece on `from` under its movement
/// pattern and occupancy rules alone. Checks are not considered, and neither
/// castling nor en passant is generated here; the legality filter overlays
/// both.
pub fn pseudo_legal_moves(board: &Board, color: Color, from: Coord) -> Vec<Coord> {
    let Some(material) = board.get(from) else {
        return Vec::new();
    };
    if material.color() != color {
        return Vec::new();
    }
    match material.piece() {
        Piece::Pawn => pawn_moves(board, color, from),
        Piece::Knight => step_moves(board, color, from, &KNIGHT_OFFSETS),
        Piece::King => step_moves(board, color, from, &KING_OFFSETS),
        Piece::Bishop => ray_moves(board, color, from, &DIAGONALS),
        Piece::Rook => ray_moves(board, color, from, &ORTHOGONALS),
        Piece::Queen => {
            let mut moves = ray_moves(board, color, from, &ORTHOGONALS);
            moves.extend(ray_moves(board, color, from, &DIAGONALS));
            moves
        }
    }
}

fn pawn_moves(board: &Board, color: Color, from: Coord) -> Vec<Coord> {
    let dir = board.forward(color);
    let mut moves = Vec::new();
    if let Some(one) = from.offset(dir, 0) {
        if board.get(one).is_none() {
            moves.push(one);
            if from.row == board.pawn_start_row(color) {
                if let Some(two) = from.offset(2 * dir, 0) {
                    if board.get(two).is_none() {
                        moves.push(two);
                    }
                }
            }
        }
    }
    for to in pawn_attacks(board, color, from) {
        if board.get(to).is_some_and(|m| m.color() != color) {
            moves.push(to);
        }
    }
    moves
}

/// The two diagonal squares a pawn threatens. Forward pushes never threaten.
fn pawn_attacks(board: &Board, color: Color, from: Coord) -> Vec<Coord> {
    let dir = board.forward(color);
    [-1, 1]
        .iter()
        .filter_map(|&dc| from.offset(dir, dc))
        .collect()
}

fn step_moves(board: &Board, color: Color, from: Coord, offsets: &[(i8, i8)]) -> Vec<Coord> {
    offsets
        .iter()
        .filter_map(|&(dr, dc)| from.offset(dr, dc))
        .filter(|&to| board.get(to).map_or(true, |m| m.color() != color))
        .collect()
}

fn ray_moves(board: &Board, color: Color, from: Coord, dirs: &[(i8, i8)]) -> Vec<Coord> {
    let mut moves = Vec::new();
    for &(dr, dc) in dirs {
        let mut cursor = from;
        while let Some(to) = cursor.offset(dr, dc) {
            match board.get(to) {
                None => moves.push(to),
                Some(m) => {
                    if m.color() != color {
                        moves.push(to);
                    }
                    break;
                }
            }
            cursor = to;
        }
    }
    moves
}

/// Every square attacked by at least one `by` piece. The pawn case is
/// specialized to its capture diagonals.
pub fn attacked_squares(board: &Board, by: Color) -> HashSet<Coord> {
    let mut attacked = HashSet::new();
    for (from, material) in board.pieces_of(by) {
        if material.piece() == Piece::Pawn {
            attacked.extend(pawn_attacks(board, by, from));
        } else {
            attacked.extend(pseudo_legal_moves(board, by, from));
        }
    }
    attacked
}

/// True when `color`'s king stands on a square the opponent attacks.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    match board.king_square(color) {
        Some(king) => attacked_squares(board, !color).contains(&king),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::material::Material;

    fn place(board: &mut Board, row: u8, col: u8, color: Color, piece: Piece) {
        board.set(Coord::new(row, col), Some(Material::new(color, piece)));
    }

    #[test]
    fn test_twenty_pseudo_legal_moves_at_start() {
        let board = Board::initial(Color::White);
        let total: usize = board
            .pieces_of(Color::White)
            .iter()
            .map(|&(from, _)| pseudo_legal_moves(&board, Color::White, from).len())
            .sum();
        assert_eq!(total, 20);
    }

    #[test]
    fn test_pawn_single_and_double_advance() {
        let board = Board::initial(Color::White);
        let moves = pseudo_legal_moves(&board, Color::White, Coord::new(6, 4));
        assert!(moves.contains(&Coord::new(5, 4)));
        assert!(moves.contains(&Coord::new(4, 4)));
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn test_pawn_blocked_cannot_jump() {
        let mut board = Board::initial(Color::White);
        place(&mut board, 5, 4, Color::Black, Piece::Knight);
        let moves = pseudo_legal_moves(&board, Color::White, Coord::new(6, 4));
        assert!(moves.is_empty());
    }

    #[test]
    fn test_pawn_double_blocked_on_second_square() {
        let mut board = Board::initial(Color::White);
        place(&mut board, 4, 4, Color::Black, Piece::Knight);
        let moves = pseudo_legal_moves(&board, Color::White, Coord::new(6, 4));
        assert_eq!(moves, vec![Coord::new(5, 4)]);
    }

    #[test]
    fn test_pawn_captures_diagonally_only_enemies() {
        let mut board = Board::initial(Color::White);
        place(&mut board, 5, 3, Color::Black, Piece::Pawn);
        place(&mut board, 5, 5, Color::White, Piece::Knight);
        let moves = pseudo_legal_moves(&board, Color::White, Coord::new(6, 4));
        assert!(moves.contains(&Coord::new(5, 3)));
        assert!(!moves.contains(&Coord::new(5, 5)));
    }

    #[test]
    fn test_opponent_pawn_advances_down_the_board() {
        let board = Board::initial(Color::White);
        let moves = pseudo_legal_moves(&board, Color::Black, Coord::new(1, 4));
        assert!(moves.contains(&Coord::new(2, 4)));
        assert!(moves.contains(&Coord::new(3, 4)));
    }

    #[test]
    fn test_knight_jumps_over_pieces() {
        let board = Board::initial(Color::White);
        let moves = pseudo_legal_moves(&board, Color::White, Coord::new(7, 1));
        assert_eq!(moves.len(), 2);
        assert!(moves.contains(&Coord::new(5, 0)));
        assert!(moves.contains(&Coord::new(5, 2)));
    }

    #[test]
    fn test_ray_stops_at_first_capture() {
        let mut board = Board::empty(Color::White);
        place(&mut board, 7, 0, Color::White, Piece::Rook);
        place(&mut board, 3, 0, Color::Black, Piece::Pawn);
        place(&mut board, 1, 0, Color::Black, Piece::Rook);
        let moves = pseudo_legal_moves(&board, Color::White, Coord::new(7, 0));
        assert!(moves.contains(&Coord::new(3, 0)));
        assert!(!moves.contains(&Coord::new(2, 0)));
        assert!(!moves.contains(&Coord::new(1, 0)));
    }

    #[test]
    fn test_queen_unions_rook_and_bishop_rays() {
        let mut board = Board::empty(Color::White);
        place(&mut board, 4, 4, Color::White, Piece::Queen);
        let moves = pseudo_legal_moves(&board, Color::White, Coord::new(4, 4));
        assert_eq!(moves.len(), 27);
    }

    #[test]
    fn test_pawn_push_square_is_not_attacked() {
        let board = Board::initial(Color::White);
        let attacked = attacked_squares(&board, Color::White);
        // The push square straight ahead of a pawn is not threatened,
        // the capture diagonals are.
        assert!(!attacked.contains(&Coord::new(4, 4)));
        assert!(attacked.contains(&Coord::new(5, 3)));
        assert!(attacked.contains(&Coord::new(5, 5)));
    }

    #[test]
    fn test_no_check_at_start() {
        let board = Board::initial(Color::White);
        assert!(!is_in_check(&board, Color::White));
        assert!(!is_in_check(&board, Color::Black));
    }

    #[test]
    fn test_rook_gives_check_along_open_file() {
        let mut board = Board::empty(Color::White);
        place(&mut board, 7, 4, Color::White, Piece::King);
        place(&mut board, 0, 4, Color::Black, Piece::Rook);
        assert!(is_in_check(&board, Color::White));
        place(&mut board, 4, 4, Color::White, Piece::Bishop);
        assert!(!is_in_check(&board, Color::White));
    }
}
