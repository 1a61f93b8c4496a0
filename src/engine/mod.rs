//! The chess rules engine and per-session game-state machine.
//!
//! Everything here is pure, single-threaded state owned by one client:
//! the mirrored board, pseudo-legal move generation, the attack/check
//! oracle, the legality filter with its castling and en-passant overlays,
//! the chess clock and the turn state machine. The session relay never
//! sees any of it.

pub mod board;
pub mod castling;
pub mod clock;
pub mod legal;
pub mod material;
pub mod movegen;
pub mod state;

pub use board::{Board, Coord};
pub use castling::{CastleSide, CastlingRights};
pub use clock::ChessClock;
pub use legal::{legal_moves, EnPassant};
pub use material::{Color, Material, Pair, Piece, Promotion};
pub use movegen::{attacked_squares, is_in_check, pseudo_legal_moves};
pub use state::{
    DrawReason, GameState, MoveError, MoveRecord, Outcome, Phase, PromotionRecord, SpecialMove,
    TurnReport, WinReason,
};
