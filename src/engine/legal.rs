use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::engine::board::{Board, Coord};
use crate::engine::castling::{self, CastleSide, CastlingRights};
use crate::engine::material::{Color, Piece};
use crate::engine::movegen::{attacked_squares, is_in_check, pseudo_legal_moves};

/// The one-ply en-passant capture window: the square a double-stepping pawn
/// skipped (`target`) and the square it landed on (`victim`).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct EnPassant {
    pub target: Coord,
    pub victim: Coord,
}

/// Every legal move for `color`, keyed by origin square.
///
/// A pseudo-legal candidate survives only if replaying it on a scratch board
/// leaves `color`'s own king unattacked; pins need no rule of their own.
/// Castling and en passant are overlaid afterwards, since both depend on
/// state the piece generators do not see.
pub fn legal_moves(
    board: &Board,
    color: Color,
    rights: &CastlingRights,
    en_passant: Option<EnPassant>,
) -> HashMap<Coord, Vec<Coord>> {
    let mut all: HashMap<Coord, Vec<Coord>> = HashMap::new();
    for (from, material) in board.pieces_of(color) {
        let mut dests: Vec<Coord> = pseudo_legal_moves(board, color, from)
            .into_iter()
            .filter(|&to| !leaves_king_exposed(board, color, from, to, None))
            .collect();
        if material.piece() == Piece::Pawn {
            if let Some(ep) = en_passant {
                if may_capture_en_passant(board, color, from, ep)
                    && !leaves_king_exposed(board, color, from, ep.target, Some(ep.victim))
                {
                    dests.push(ep.target);
                }
            }
        }
        if !dests.is_empty() {
            all.insert(from, dests);
        }
    }

    if rights.may_castle(CastleSide::Kingside) || rights.may_castle(CastleSide::Queenside) {
        let attacked = attacked_squares(board, !color);
        for side in [CastleSide::Kingside, CastleSide::Queenside] {
            if castle_available(board, color, rights, side)
                && !attacked.contains(&castling::king_home(board, color))
                && castling::attacked_lane(board, color, side)
                    .iter()
                    .all(|square| !attacked.contains(square))
            {
                all.entry(castling::king_home(board, color))
                    .or_default()
                    .push(castling::king_target(board, color, side));
            }
        }
    }

    all
}

fn may_capture_en_passant(board: &Board, color: Color, from: Coord, ep: EnPassant) -> bool {
    from.row == ep.victim.row
        && from.col.abs_diff(ep.victim.col) == 1
        && board
            .get(ep.victim)
            .is_some_and(|m| m.piece() == Piece::Pawn && m.color() != color)
}

/// Unmoved king and rook on their home squares with an empty lane between
/// them. Attack conditions are checked by the caller.
fn castle_available(board: &Board, color: Color, rights: &CastlingRights, side: CastleSide) -> bool {
    if !rights.may_castle(side) {
        return false;
    }
    let king_ok = board
        .get(castling::king_home(board, color))
        .is_some_and(|m| m.color() == color && m.piece() == Piece::King);
    let rook_ok = board
        .get(castling::rook_home(board, color, side))
        .is_some_and(|m| m.color() == color && m.piece() == Piece::Rook);
    king_ok
        && rook_ok
        && castling::blocking_lane(board, color, side)
            .iter()
            .all(|&square| board.get(square).is_none())
}

/// Replay `from -> to` on a scratch copy and report whether `color`'s own
/// king ends up attacked. `remove` is the extra square vacated by an
/// en-passant capture.
fn leaves_king_exposed(
    board: &Board,
    color: Color,
    from: Coord,
    to: Coord,
    remove: Option<Coord>,
) -> bool {
    let mut scratch = board.clone();
    scratch.set(to, scratch.get(from));
    scratch.set(from, None);
    if let Some(victim) = remove {
        scratch.set(victim, None);
    }
    is_in_check(&scratch, color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::material::Material;

    fn place(board: &mut Board, row: u8, col: u8, color: Color, piece: Piece) {
        board.set(Coord::new(row, col), Some(Material::new(color, piece)));
    }

    fn bare_kings(perspective: Color) -> Board {
        let mut board = Board::empty(perspective);
        place(&mut board, 7, 4, perspective, Piece::King);
        place(&mut board, 0, 4, !perspective, Piece::King);
        board
    }

    #[test]
    fn test_twenty_legal_moves_at_start() {
        let board = Board::initial(Color::White);
        let moves = legal_moves(&board, Color::White, &CastlingRights::new(), None);
        let total: usize = moves.values().map(Vec::len).sum();
        assert_eq!(total, 20);
    }

    #[test]
    fn test_no_legal_move_leaves_own_king_attacked() {
        let board = Board::initial(Color::White);
        let moves = legal_moves(&board, Color::White, &CastlingRights::new(), None);
        for (&from, dests) in &moves {
            for &to in dests {
                assert!(!leaves_king_exposed(&board, Color::White, from, to, None));
            }
        }
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        let mut board = bare_kings(Color::White);
        place(&mut board, 5, 4, Color::White, Piece::Bishop);
        place(&mut board, 0, 4, Color::Black, Piece::Rook);
        place(&mut board, 0, 0, Color::Black, Piece::King);
        let moves = legal_moves(&board, Color::White, &CastlingRights::new(), None);
        // The bishop shields the king from the rook on the e-file and may
        // not leave the line.
        assert!(!moves.contains_key(&Coord::new(5, 4)));
    }

    #[test]
    fn test_king_cannot_step_into_attack() {
        let mut board = bare_kings(Color::White);
        place(&mut board, 0, 3, Color::Black, Piece::Rook);
        let moves = legal_moves(&board, Color::White, &CastlingRights::new(), None);
        let king_moves = moves.get(&Coord::new(7, 4)).unwrap();
        assert!(!king_moves.contains(&Coord::new(7, 3)));
        assert!(!king_moves.contains(&Coord::new(6, 3)));
        assert!(king_moves.contains(&Coord::new(7, 5)));
    }

    #[test]
    fn test_check_must_be_answered() {
        let mut board = bare_kings(Color::White);
        place(&mut board, 0, 4, Color::Black, Piece::Rook);
        place(&mut board, 0, 0, Color::Black, Piece::King);
        place(&mut board, 6, 0, Color::White, Piece::Rook);
        let moves = legal_moves(&board, Color::White, &CastlingRights::new(), None);
        // The rook may only block on the checking file (or the king steps
        // aside); quiet rook moves elsewhere are gone.
        let rook_moves = moves.get(&Coord::new(6, 0)).unwrap();
        assert_eq!(rook_moves, &vec![Coord::new(6, 4)]);
    }

    #[test]
    fn test_castling_both_sides_on_open_rank() {
        let mut board = bare_kings(Color::White);
        place(&mut board, 7, 0, Color::White, Piece::Rook);
        place(&mut board, 7, 7, Color::White, Piece::Rook);
        let moves = legal_moves(&board, Color::White, &CastlingRights::new(), None);
        let king_moves = moves.get(&Coord::new(7, 4)).unwrap();
        assert!(king_moves.contains(&Coord::new(7, 6)));
        assert!(king_moves.contains(&Coord::new(7, 2)));
    }

    #[test]
    fn test_castling_blocked_by_piece_in_lane() {
        let mut board = bare_kings(Color::White);
        place(&mut board, 7, 7, Color::White, Piece::Rook);
        place(&mut board, 7, 5, Color::White, Piece::Bishop);
        let moves = legal_moves(&board, Color::White, &CastlingRights::new(), None);
        let king_moves = moves.get(&Coord::new(7, 4)).unwrap();
        assert!(!king_moves.contains(&Coord::new(7, 6)));
    }

    #[test]
    fn test_castling_forbidden_while_in_check() {
        let mut board = bare_kings(Color::White);
        place(&mut board, 7, 7, Color::White, Piece::Rook);
        place(&mut board, 0, 4, Color::Black, Piece::Rook);
        place(&mut board, 0, 0, Color::Black, Piece::King);
        let moves = legal_moves(&board, Color::White, &CastlingRights::new(), None);
        let king_moves = moves.get(&Coord::new(7, 4)).unwrap();
        assert!(!king_moves.contains(&Coord::new(7, 6)));
    }

    #[test]
    fn test_castling_forbidden_through_attacked_transit() {
        let mut board = bare_kings(Color::White);
        place(&mut board, 7, 7, Color::White, Piece::Rook);
        // Black rook eyes the f1 transit square but not the king itself.
        place(&mut board, 0, 5, Color::Black, Piece::Rook);
        let moves = legal_moves(&board, Color::White, &CastlingRights::new(), None);
        let king_moves = moves.get(&Coord::new(7, 4)).unwrap();
        assert!(!king_moves.contains(&Coord::new(7, 6)));
    }

    #[test]
    fn test_castling_gone_after_rook_flag() {
        let mut board = bare_kings(Color::White);
        place(&mut board, 7, 0, Color::White, Piece::Rook);
        place(&mut board, 7, 7, Color::White, Piece::Rook);
        let mut rights = CastlingRights::new();
        rights.note_departure(&board, Color::White, Coord::new(7, 7));
        let moves = legal_moves(&board, Color::White, &rights, None);
        let king_moves = moves.get(&Coord::new(7, 4)).unwrap();
        assert!(!king_moves.contains(&Coord::new(7, 6)));
        assert!(king_moves.contains(&Coord::new(7, 2)));
    }

    #[test]
    fn test_castling_on_black_seat_geometry() {
        let mut board = Board::empty(Color::Black);
        place(&mut board, 7, 3, Color::Black, Piece::King);
        place(&mut board, 7, 0, Color::Black, Piece::Rook);
        place(&mut board, 0, 3, Color::White, Piece::King);
        let moves = legal_moves(&board, Color::Black, &CastlingRights::new(), None);
        let king_moves = moves.get(&Coord::new(7, 3)).unwrap();
        assert!(king_moves.contains(&Coord::new(7, 1)));
    }

    #[test]
    fn test_en_passant_capture_in_window() {
        let mut board = bare_kings(Color::White);
        place(&mut board, 3, 4, Color::White, Piece::Pawn);
        place(&mut board, 3, 3, Color::Black, Piece::Pawn);
        let window = EnPassant {
            target: Coord::new(2, 3),
            victim: Coord::new(3, 3),
        };
        let moves = legal_moves(&board, Color::White, &CastlingRights::new(), Some(window));
        assert!(moves.get(&Coord::new(3, 4)).unwrap().contains(&Coord::new(2, 3)));

        // Without the window the same diagonal is not available.
        let moves = legal_moves(&board, Color::White, &CastlingRights::new(), None);
        assert!(!moves
            .get(&Coord::new(3, 4))
            .unwrap()
            .contains(&Coord::new(2, 3)));
    }

    #[test]
    fn test_en_passant_refused_when_it_exposes_king() {
        let mut board = Board::empty(Color::White);
        place(&mut board, 3, 7, Color::White, Piece::King);
        place(&mut board, 3, 4, Color::White, Piece::Pawn);
        place(&mut board, 3, 3, Color::Black, Piece::Pawn);
        place(&mut board, 3, 0, Color::Black, Piece::Rook);
        place(&mut board, 0, 0, Color::Black, Piece::King);
        let window = EnPassant {
            target: Coord::new(2, 3),
            victim: Coord::new(3, 3),
        };
        let moves = legal_moves(&board, Color::White, &CastlingRights::new(), Some(window));
        // Capturing would clear both pawns off the rank and open the rook's
        // line to the king.
        assert!(moves
            .get(&Coord::new(3, 4))
            .map_or(true, |dests| !dests.contains(&Coord::new(2, 3))));
    }
}
