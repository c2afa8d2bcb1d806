//! The power-card subsystem: the card catalog, per-player deck/hand
//! management, and one effect handler per card kind.

mod catalog;
mod effects;
mod manager;

pub use crate::catalog::{deck_pool, Card, CardInstanceId, CardKind, CardKindSet};
pub use crate::effects::{
    activate, ActivationOutcome, ActivationRequest, EffectContext, SwapDetails,
};
pub use crate::manager::{
    CapturedPieceBank, CardManager, DrawOutcome, PendingEffect, DRAW_MILESTONE, HAND_LIMIT,
};

pub type Result<T, E = EffectError> = core::result::Result<T, E>;

/// Why a card activation was refused
///
/// An `Err` always means the card stays in the activator's hand and nothing
/// changed. The deliberate spend-without-effect outcomes (reviving onto an
/// occupied home square, swapping against an empty hand) are successes with
/// an explanatory message, not errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum EffectError {
    #[error("the activation request is missing the {0} field")]
    MissingField(&'static str),
    #[error("{} can only be used once per game", .0.name())]
    AlreadyUsed(CardKind),
    #[error("there is no piece on {0}")]
    EmptySquare(board::Square),
    #[error("the piece on {0} does not belong to the activating player")]
    NotYourPiece(board::Square),
    #[error("the piece on {0} is not a pawn")]
    NotAPawn(board::Square),
    #[error("a {0:?} cannot be revived")]
    RevivalKind(board::PieceKind),
    #[error("{1} is not a home square for a {0:?}")]
    RevivalSquare(board::PieceKind, board::Square),
    #[error("no captured {0:?} is available for revival")]
    NothingCaptured(board::PieceKind),
    #[error("card {0} is not in the activating player's hand")]
    CardNotInHand(CardInstanceId),
    #[error("a card cannot be swapped for itself")]
    CannotSwapItself,
    #[error("the opponent's clock is below the three-minute floor")]
    OpponentClockTooLow,
    #[error(transparent)]
    Rule(#[from] rules::Error),
}
