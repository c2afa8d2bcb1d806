//! The chess engine proper: the mailbox board, the move variants and their
//! legality rule, move generation, and the turn/result state machine.
//!
//! The legality rule shared by every move variant is simulate-then-reject:
//! the candidate move is executed on a clone of the board and rejected if the
//! mover's own king is left in check. Castling layers extra restrictions on
//! top, and the card-exclusive pseudo-moves (teleport, piece swap) add their
//! own preconditions before the simulation.

use board::{PieceKind, Square};

mod game;
mod grid;
pub mod history;
pub mod movegen;
mod moves;

pub use crate::game::{AppliedMove, GameOverReason, GameResult, GameState};
pub use crate::grid::{Board, CastleSide};
pub use crate::moves::{Move, MoveEffect};

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Everything that can make a move or board mutation unacceptable
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("there is no piece on {0}")]
    EmptySquare(Square),
    #[error("the piece on {0} belongs to the opponent")]
    OpponentPiece(Square),
    #[error("there is no legal move from {from} to {to}")]
    NoSuchMove { from: Square, to: Square },
    #[error("that move would leave the own king in check")]
    MovingIntoCheck,
    #[error("castling rights on that side were lost by an earlier move")]
    CastleRightsLost,
    #[error("castling is blocked by an intervening piece")]
    CastleBlocked,
    #[error("the king may not castle out of or through check")]
    CastleThroughCheck,
    #[error("en passant is not available towards {0}")]
    IllegalEnPassant(Square),
    #[error("pawns cannot promote into a {0:?}")]
    BadPromotion(PieceKind),
    #[error("the destination square {0} is occupied")]
    DestinationOccupied(Square),
    #[error("cannot swap a square with itself")]
    SwapSameSquare,
    #[error("the game is already over")]
    GameFinished,
    #[error("internal invariant violated: {0}")]
    Internal(&'static str),
}
