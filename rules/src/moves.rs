use board::{Color, Piece, PieceKind, Square};

use crate::grid::{Board, CastleSide};
use crate::movegen;
use crate::{Error, Result};

/// One move, fully resolved
///
/// The first six variants are ordinary chess; `Teleport` and `PieceSwap` are
/// the card-exclusive pseudo-moves. All variants share the same contract:
/// [`Move::is_legal`] simulates on a clone and rejects self-check,
/// [`Move::execute`] mutates the board and reports what the half-move clock
/// needs to know.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Normal {
        from: Square,
        to: Square,
    },
    /// A pawn's initial two-square advance; creates an en-passant target
    DoublePawn {
        from: Square,
        to: Square,
    },
    /// Capture of the opposing pawn that just double-stepped past `from`
    EnPassant {
        from: Square,
        to: Square,
    },
    CastleKingside {
        color: Color,
    },
    CastleQueenside {
        color: Color,
    },
    Promotion {
        from: Square,
        to: Square,
        into: PieceKind,
    },
    /// Card effect: relocate an owned piece to any empty square
    Teleport {
        from: Square,
        to: Square,
    },
    /// Card effect: exchange the squares of two owned pieces
    PieceSwap {
        first: Square,
        second: Square,
    },
}

/// What [`Move::execute`] did to the board
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveEffect {
    /// The piece removed from the board, if any
    pub captured: Option<Piece>,
    /// Whether a pawn moved
    pub pawn_moved: bool,
}
impl MoveEffect {
    /// Whether the half-move clock (and the repetition history) resets
    pub const fn resets_clock(&self) -> bool {
        self.captured.is_some() || self.pawn_moved
    }
}

impl Move {
    /// The square the moving piece starts on
    ///
    /// For castling this is the king's square; for a swap it is the first of
    /// the two squares.
    pub fn from(&self) -> Square {
        match *self {
            Move::Normal { from, .. }
            | Move::DoublePawn { from, .. }
            | Move::EnPassant { from, .. }
            | Move::Promotion { from, .. }
            | Move::Teleport { from, .. } => from,
            Move::CastleKingside { color } | Move::CastleQueenside { color } => {
                Square::new(color.back_row(), 4).unwrap()
            }
            Move::PieceSwap { first, .. } => first,
        }
    }

    /// The square the moving piece ends on
    pub fn to(&self) -> Square {
        match *self {
            Move::Normal { to, .. }
            | Move::DoublePawn { to, .. }
            | Move::EnPassant { to, .. }
            | Move::Promotion { to, .. }
            | Move::Teleport { to, .. } => to,
            Move::CastleKingside { color } => {
                Square::new(color.back_row(), CastleSide::Kingside.king_target_col()).unwrap()
            }
            Move::CastleQueenside { color } => {
                Square::new(color.back_row(), CastleSide::Queenside.king_target_col()).unwrap()
            }
            Move::PieceSwap { second, .. } => second,
        }
    }

    /// The promotion payload, if this is a promotion
    pub fn promotion(&self) -> Option<PieceKind> {
        match *self {
            Move::Promotion { into, .. } => Some(into),
            _ => None,
        }
    }

    /// Check that this move is legal for `mover` on the given board
    ///
    /// Every variant ends with the same simulation: execute the move on a
    /// cloned board and reject if the mover's king is then in check. The
    /// variant-specific preconditions run first so the error says what
    /// actually went wrong.
    pub fn is_legal(&self, board: &Board, mover: Color) -> Result<()> {
        let piece = board
            .piece_at(self.from())
            .ok_or(Error::EmptySquare(self.from()))?;
        if piece.color != mover {
            return Err(Error::OpponentPiece(self.from()));
        }
        match *self {
            Move::Normal { .. } | Move::DoublePawn { .. } => {}
            Move::EnPassant { to, .. } => {
                if board.pawn_skip(mover.other()) != Some(to) {
                    return Err(Error::IllegalEnPassant(to));
                }
                if piece.kind != PieceKind::Pawn {
                    return Err(Error::Internal("en passant by a non-pawn"));
                }
            }
            Move::CastleKingside { color } => {
                Self::check_castle(board, color, CastleSide::Kingside)?
            }
            Move::CastleQueenside { color } => {
                Self::check_castle(board, color, CastleSide::Queenside)?
            }
            Move::Promotion { into, .. } => {
                if !into.is_promotable() {
                    return Err(Error::BadPromotion(into));
                }
            }
            Move::Teleport { to, .. } => {
                if board.piece_at(to).is_some() {
                    return Err(Error::DestinationOccupied(to));
                }
            }
            Move::PieceSwap { first, second } => {
                if first == second {
                    return Err(Error::SwapSameSquare);
                }
                let other = board.piece_at(second).ok_or(Error::EmptySquare(second))?;
                if other.color != mover {
                    return Err(Error::OpponentPiece(second));
                }
            }
        }
        let mut simulated = board.clone();
        self.execute(&mut simulated)?;
        if simulated.is_in_check(mover) {
            return Err(Error::MovingIntoCheck);
        }
        Ok(())
    }

    /// The extra castling restrictions: rights must hold, the path must be
    /// vacant, and the king may not start in, pass through, or land on an
    /// attacked square.
    fn check_castle(board: &Board, color: Color, side: CastleSide) -> Result<()> {
        if !board.castling_rights(color, side) {
            return Err(Error::CastleRightsLost);
        }
        let row = color.back_row();
        for &col in side.between_cols() {
            if board.piece_at(Square::new(row, col).unwrap()).is_some() {
                return Err(Error::CastleBlocked);
            }
        }
        if board.is_in_check(color) {
            return Err(Error::CastleThroughCheck);
        }
        for &col in side.crossed_cols() {
            if movegen::is_attacked(board, Square::new(row, col).unwrap(), color.other()) {
                return Err(Error::CastleThroughCheck);
            }
        }
        Ok(())
    }

    /// Apply this move to the board
    ///
    /// The caller is expected to have validated legality; reaching an
    /// impossible board state here is an internal defect, not a rule
    /// violation.
    pub fn execute(&self, board: &mut Board) -> Result<MoveEffect> {
        match *self {
            Move::Normal { from, to } => {
                let mut piece = board.take(from).ok_or(Error::Internal("move from empty square"))?;
                piece.has_moved = true;
                let captured = board.take(to);
                board.place(to, piece);
                Ok(MoveEffect {
                    captured,
                    pawn_moved: piece.kind == PieceKind::Pawn,
                })
            }
            Move::DoublePawn { from, to } => {
                let mut piece = board.take(from).ok_or(Error::Internal("move from empty square"))?;
                piece.has_moved = true;
                board.place(to, piece);
                let skip_row = (from.row() + to.row()) / 2;
                let skipped = Square::new(skip_row, from.col())
                    .ok_or(Error::Internal("double pawn move off the board"))?;
                board.set_pawn_skip(piece.color, skipped);
                Ok(MoveEffect {
                    captured: None,
                    pawn_moved: true,
                })
            }
            Move::EnPassant { from, to } => {
                let mut piece = board.take(from).ok_or(Error::Internal("move from empty square"))?;
                piece.has_moved = true;
                board.place(to, piece);
                let victim_square = Square::new(from.row(), to.col())
                    .ok_or(Error::Internal("en passant victim off the board"))?;
                let captured = board.take(victim_square);
                if captured.is_none() {
                    return Err(Error::Internal("no pawn to capture en passant"));
                }
                Ok(MoveEffect {
                    captured,
                    pawn_moved: true,
                })
            }
            Move::CastleKingside { color } => Self::execute_castle(board, color, CastleSide::Kingside),
            Move::CastleQueenside { color } => {
                Self::execute_castle(board, color, CastleSide::Queenside)
            }
            Move::Promotion { from, to, into } => {
                let pawn = board.take(from).ok_or(Error::Internal("move from empty square"))?;
                let captured = board.take(to);
                board.place(
                    to,
                    Piece {
                        kind: into,
                        color: pawn.color,
                        has_moved: true,
                    },
                );
                Ok(MoveEffect {
                    captured,
                    pawn_moved: true,
                })
            }
            Move::Teleport { from, to } => {
                let mut piece = board.take(from).ok_or(Error::Internal("move from empty square"))?;
                if board.piece_at(to).is_some() {
                    return Err(Error::DestinationOccupied(to));
                }
                piece.has_moved = true;
                board.place(to, piece);
                Ok(MoveEffect {
                    captured: None,
                    pawn_moved: piece.kind == PieceKind::Pawn,
                })
            }
            Move::PieceSwap { first, second } => {
                let mut a = board.take(first).ok_or(Error::Internal("swap of empty square"))?;
                let mut b = board.take(second).ok_or(Error::Internal("swap of empty square"))?;
                a.has_moved = true;
                b.has_moved = true;
                board.place(first, b);
                board.place(second, a);
                Ok(MoveEffect {
                    captured: None,
                    pawn_moved: false,
                })
            }
        }
    }

    fn execute_castle(board: &mut Board, color: Color, side: CastleSide) -> Result<MoveEffect> {
        let row = color.back_row();
        let king_from = Square::new(row, 4).unwrap();
        let king_to = Square::new(row, side.king_target_col()).unwrap();
        let rook_from = Square::new(row, side.rook_col()).unwrap();
        let rook_to = Square::new(row, side.rook_target_col()).unwrap();
        let mut king = board.take(king_from).ok_or(Error::Internal("castle without king"))?;
        let mut rook = board.take(rook_from).ok_or(Error::Internal("castle without rook"))?;
        king.has_moved = true;
        rook.has_moved = true;
        board.place(king_to, king);
        board.place(rook_to, rook);
        Ok(MoveEffect {
            captured: None,
            pawn_moved: false,
        })
    }
}
