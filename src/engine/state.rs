use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::board::{Board, Coord};
use crate::engine::castling::{self, CastleSide, CastlingRights};
use crate::engine::clock::ChessClock;
use crate::engine::legal::{legal_moves, EnPassant};
use crate::engine::material::{Color, Material, Pair, Piece, Promotion};
use crate::engine::movegen::is_in_check;

/// Where the game stands between externally delivered events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WaitingForMove(Color),
    /// A pawn reached the far rank; the turn does not advance (and the
    /// chooser's clock keeps running) until the piece kind arrives.
    AwaitingPromotion { color: Color, square: Coord },
    GameOver(Outcome),
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum WinReason {
    Checkmate,
    FlagFall,
    Resignation,
    Abandonment,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    Stalemate,
    /// A flag fell while the opponent held nothing but a bare king.
    FlagFall,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win { winner: Color, reason: WinReason },
    Draw { reason: DrawReason },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win { winner, reason } => {
                let how = match reason {
                    WinReason::Checkmate => "by checkmate",
                    WinReason::FlagFall => "on time",
                    WinReason::Resignation => "by resignation",
                    WinReason::Abandonment => "by abandonment",
                };
                write!(f, "{winner} wins {how}")
            }
            Outcome::Draw { reason } => match reason {
                DrawReason::Stalemate => write!(f, "draw by stalemate"),
                DrawReason::FlagFall => write!(f, "draw, time expired against a bare king"),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialMove {
    CastleKingside,
    CastleQueenside,
    EnPassantCapture,
}

/// What a completed move did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub from: Coord,
    pub to: Coord,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub special: Option<SpecialMove>,
    pub gives_check: bool,
}

/// A resolved promotion choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionRecord {
    pub square: Coord,
    pub promotion: Promotion,
    pub gives_check: bool,
}

/// What an opponent's event left us with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnReport {
    pub in_check: bool,
    pub awaiting_promotion: bool,
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("not this side's turn to move")]
    NotYourTurn,
    #[error("move {from:?} -> {to:?} is not in the legal move set")]
    IllegalMove { from: Coord, to: Coord },
    #[error("no matching promotion is pending")]
    NoPromotionPending,
    #[error("the game is already over")]
    GameOver,
}

/// One client's complete game: its mirrored board, both castling ledgers,
/// the en-passant window, both clocks and the turn phase. All engine
/// operations go through this value; nothing here is global.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    us: Color,
    rights: Pair<CastlingRights>,
    en_passant: Option<EnPassant>,
    clock: ChessClock,
    phase: Phase,
}

impl GameState {
    pub fn new(us: Color, minutes: u32) -> Self {
        Self {
            board: Board::initial(us),
            us,
            rights: Pair::default(),
            en_passant: None,
            clock: ChessClock::new(minutes),
            phase: Phase::WaitingForMove(Color::White),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn us(&self) -> Color {
        self.us
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn clock(&self) -> &ChessClock {
        &self.clock
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::GameOver(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Our side's full legal move set, empty unless it is our move.
    pub fn legal_moves(&self) -> HashMap<Coord, Vec<Coord>> {
        match self.phase {
            Phase::WaitingForMove(color) if color == self.us => {
                legal_moves(&self.board, self.us, &self.rights[self.us], self.en_passant)
            }
            _ => HashMap::new(),
        }
    }

    /// Play one of our own moves. Anything outside the legal set is
    /// rejected without touching any state; callers drop the error to get
    /// the silent-reject behavior the session layer wants.
    pub fn play_move(&mut self, from: Coord, to: Coord) -> Result<MoveRecord, MoveError> {
        match self.phase {
            Phase::GameOver(_) => return Err(MoveError::GameOver),
            Phase::WaitingForMove(color) if color == self.us => {}
            _ => return Err(MoveError::NotYourTurn),
        }
        let legal = self.legal_moves();
        if !legal.get(&from).is_some_and(|dests| dests.contains(&to)) {
            return Err(MoveError::IllegalMove { from, to });
        }
        let record = self.execute(self.us, from, to)?;
        if record.piece == Piece::Pawn && to.row == self.board.promotion_row(self.us) {
            self.phase = Phase::AwaitingPromotion {
                color: self.us,
                square: to,
            };
        } else {
            self.phase = Phase::WaitingForMove(!self.us);
        }
        Ok(record)
    }

    /// Resolve our pending promotion with the chosen piece kind and only
    /// then hand the turn over.
    pub fn choose_promotion(&mut self, promotion: Promotion) -> Result<PromotionRecord, MoveError> {
        let square = match self.phase {
            Phase::AwaitingPromotion { color, square } if color == self.us => square,
            Phase::GameOver(_) => return Err(MoveError::GameOver),
            _ => return Err(MoveError::NoPromotionPending),
        };
        self.board
            .set(square, Some(Material::new(self.us, promotion.into())));
        self.phase = Phase::WaitingForMove(!self.us);
        Ok(PromotionRecord {
            square,
            promotion,
            gives_check: is_in_check(&self.board, !self.us),
        })
    }

    /// Apply a relayed opponent move. The coordinates are already relative
    /// to our seat, and legality is taken on trust: the opponent's engine
    /// is authoritative for its own side. Only turn-order violations and
    /// empty origins are refused.
    pub fn apply_opponent_move(&mut self, from: Coord, to: Coord) -> Result<TurnReport, MoveError> {
        match self.phase {
            Phase::GameOver(_) => return Err(MoveError::GameOver),
            Phase::WaitingForMove(color) if color == !self.us => {}
            _ => return Err(MoveError::NotYourTurn),
        }
        let them = !self.us;
        let record = self.execute(them, from, to)?;
        if record.piece == Piece::Pawn && to.row == self.board.promotion_row(them) {
            self.phase = Phase::AwaitingPromotion {
                color: them,
                square: to,
            };
            return Ok(TurnReport {
                in_check: false,
                awaiting_promotion: true,
                outcome: None,
            });
        }
        self.phase = Phase::WaitingForMove(self.us);
        Ok(self.classify_our_turn())
    }

    /// Apply the opponent's promotion choice for the pawn parked on our
    /// row 7 at `col`.
    pub fn apply_opponent_promotion(
        &mut self,
        col: u8,
        promotion: Promotion,
    ) -> Result<TurnReport, MoveError> {
        let them = !self.us;
        let square = match self.phase {
            Phase::AwaitingPromotion { color, square } if color == them && square.col == col => {
                square
            }
            Phase::GameOver(_) => return Err(MoveError::GameOver),
            _ => return Err(MoveError::NoPromotionPending),
        };
        self.board
            .set(square, Some(Material::new(them, promotion.into())));
        self.phase = Phase::WaitingForMove(self.us);
        Ok(self.classify_our_turn())
    }

    /// Whose clock should be running right now, if any. Promotion choices
    /// burn the chooser's time; a finished game stops both clocks.
    pub fn active_clock(&self) -> Option<Color> {
        match self.phase {
            Phase::WaitingForMove(color) => Some(color),
            Phase::AwaitingPromotion { color, .. } => Some(color),
            Phase::GameOver(_) => None,
        }
    }

    /// One elapsed second for the active clock. The tick that drives a
    /// clock negative ends the game: the opponent wins on time unless they
    /// hold nothing but a bare king, which is scored a draw here.
    pub fn tick(&mut self) -> Option<Outcome> {
        let active = self.active_clock()?;
        if !self.clock.tick(active) {
            return None;
        }
        let opponent = !active;
        let outcome = if self.board.only_king_remains(opponent) {
            Outcome::Draw {
                reason: DrawReason::FlagFall,
            }
        } else {
            Outcome::Win {
                winner: opponent,
                reason: WinReason::FlagFall,
            }
        };
        self.phase = Phase::GameOver(outcome);
        Some(outcome)
    }

    pub fn resign(&mut self) -> Outcome {
        self.end_with(Outcome::Win {
            winner: !self.us,
            reason: WinReason::Resignation,
        })
    }

    pub fn opponent_left(&mut self) -> Outcome {
        self.end_with(Outcome::Win {
            winner: self.us,
            reason: WinReason::Abandonment,
        })
    }

    /// Freeze with an outcome reported by the peer (who is the one that
    /// detects its own mate, stalemate or flag).
    pub fn conclude(&mut self, outcome: Outcome) -> Outcome {
        self.end_with(outcome)
    }

    fn end_with(&mut self, outcome: Outcome) -> Outcome {
        if let Phase::GameOver(existing) = self.phase {
            return existing;
        }
        self.phase = Phase::GameOver(outcome);
        outcome
    }

    /// Shared mutation path for both our own and relayed moves: clears the
    /// en-passant window, infers and applies special effects from the move
    /// shape, moves the piece, updates the mover's castling ledger and
    /// possibly opens a fresh window.
    fn execute(&mut self, mover: Color, from: Coord, to: Coord) -> Result<MoveRecord, MoveError> {
        let material = match self.board.get(from) {
            Some(m) if m.color() == mover => m,
            _ => return Err(MoveError::IllegalMove { from, to }),
        };
        self.en_passant = None;

        let mut captured = self.board.get(to).map(|m| m.piece());
        let mut special = None;

        if material.piece() == Piece::King && from == castling::king_home(&self.board, mover) {
            for side in [CastleSide::Kingside, CastleSide::Queenside] {
                if to == castling::king_target(&self.board, mover, side) {
                    let rook_from = castling::rook_home(&self.board, mover, side);
                    let rook_to = castling::rook_target(&self.board, mover, side);
                    let rook = self.board.get(rook_from);
                    self.board.set(rook_to, rook);
                    self.board.set(rook_from, None);
                    special = Some(match side {
                        CastleSide::Kingside => SpecialMove::CastleKingside,
                        CastleSide::Queenside => SpecialMove::CastleQueenside,
                    });
                }
            }
        } else if material.piece() == Piece::Pawn
            && from.col != to.col
            && self.board.get(to).is_none()
        {
            // A pawn stepping diagonally onto an empty square can only be
            // an en-passant capture; the passed-over pawn goes, not the
            // destination's occupant.
            let victim = Coord::new(from.row, to.col);
            self.board.set(victim, None);
            captured = Some(Piece::Pawn);
            special = Some(SpecialMove::EnPassantCapture);
        }

        self.board.set(to, Some(material));
        self.board.set(from, None);
        self.rights[mover].note_departure(&self.board, mover, from);

        if material.piece() == Piece::Pawn && from.row.abs_diff(to.row) == 2 {
            self.en_passant = Some(EnPassant {
                target: Coord::new((from.row + to.row) / 2, from.col),
                victim: to,
            });
        }

        Ok(MoveRecord {
            from,
            to,
            piece: material.piece(),
            captured,
            special,
            gives_check: is_in_check(&self.board, !mover),
        })
    }

    /// End-of-turn classification, run once per turn transition after the
    /// opponent's event has been applied and it became our move.
    fn classify_our_turn(&mut self) -> TurnReport {
        let in_check = is_in_check(&self.board, self.us);
        let outcome = if !self.legal_moves().is_empty() {
            None
        } else if in_check {
            Some(Outcome::Win {
                winner: !self.us,
                reason: WinReason::Checkmate,
            })
        } else {
            Some(Outcome::Draw {
                reason: DrawReason::Stalemate,
            })
        };
        if let Some(outcome) = outcome {
            self.phase = Phase::GameOver(outcome);
        }
        TurnReport {
            in_check,
            awaiting_promotion: false,
            outcome,
        }
    }
}
