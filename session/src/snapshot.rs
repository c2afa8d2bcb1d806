//! Read-only structs handed back across the session boundary
//!
//! Everything here is a value copy taken while the session lock was held, so
//! callers can serialize or inspect it at leisure without observing a board
//! that is still being mutated.

use std::time::Duration;

use board::{Color, PieceKind, Square};
use cards::{Card, SwapDetails};
use rules::Board;

/// A piece as seen from outside the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PieceView {
    pub kind: PieceKind,
    pub color: Color,
}

/// An 8x8 copy of the board, row 0 being rank 8
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardSnapshot {
    squares: [[Option<PieceView>; 8]; 8],
}

impl BoardSnapshot {
    pub(crate) fn capture(board: &Board) -> Self {
        let mut squares = [[None; 8]; 8];
        for square in Square::all() {
            squares[square.row() as usize][square.col() as usize] =
                board.piece_at(square).map(|piece| PieceView {
                    kind: piece.kind,
                    color: piece.color,
                });
        }
        Self { squares }
    }

    pub fn piece_at(&self, square: Square) -> Option<PieceView> {
        self.squares[square.row() as usize][square.col() as usize]
    }
}

/// The game from one player's point of view
///
/// `Check` is only ever reported to the player whose king is in check, which
/// is always the player to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    None,
    Check,
    Checkmate,
    Stalemate,
    Draw50Move,
    DrawInsufficientMaterial,
    DrawThreefold,
    TimeOut,
}

/// What a move-count milestone draw produced, when one happened
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardDrawSignal {
    /// The top card of the pile, now in the player's hand
    Drew(Card),
    /// The milestone was reached but the pile is exhausted
    PileEmpty,
    /// The milestone was reached but the hand is at its size cap
    HandFull,
}

/// The result of a successfully applied move
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub board: BoardSnapshot,
    /// Whether the requester moves again next (an extra-move grant)
    pub your_turn_next: bool,
    /// The requester's status after the move
    pub status: GameStatus,
    pub from: Square,
    pub to: Square,
    pub card_draw: Option<CardDrawSignal>,
}

/// The result of a successful card activation
///
/// `board_updated` is false for the spend-without-effect outcomes and for
/// the cards that only touch the clock or the hands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivationResult {
    pub message: Option<String>,
    pub board: BoardSnapshot,
    pub board_updated: bool,
    /// Squares the effect touched, for highlighting
    pub affected: Vec<Square>,
    pub your_turn_next: bool,
    pub status: GameStatus,
    pub swap: Option<SwapDetails>,
    /// The sacrifice reward draw, when the card grants one
    pub card_draw: Option<CardDrawSignal>,
}

/// Both clocks at a single settled instant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeUpdate {
    pub white_remaining: Duration,
    pub black_remaining: Duration,
    /// `None` once the game is over
    pub running: Option<Color>,
}
