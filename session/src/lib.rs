//! The orchestrator for one live game
//!
//! A [`GameSession`] owns the rules engine, the card subsystem, and the
//! clock behind one exclusive lock, and exposes the handful of operations a
//! transport layer needs: apply a move, activate a card, query legal moves,
//! status, and clocks. Observers and the history log are injected as traits
//! so the engine never touches a network or a file itself.

use std::fmt;

mod notify;
mod session;
mod snapshot;

pub use crate::notify::{Notifier, NullNotifier, SessionEvent, SharedNotifier};
pub use crate::session::{CardRequest, GameSession};
pub use crate::snapshot::{
    ActivationResult, BoardSnapshot, CardDrawSignal, GameStatus, MoveOutcome, PieceView,
    TimeUpdate,
};

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// An opaque transport-level identity for one connected player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.0)
    }
}

/// Why a session operation was refused
///
/// `NotYourTurn` is decided inside the critical section, so of two racing
/// requests for the same turn the loser's error reflects the state the
/// winner already produced.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("{0} is not part of this session")]
    UnknownPlayer(PlayerId),
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("the game is already over")]
    GameOver,
    #[error("card {0} is not in your hand")]
    NoSuchCard(cards::CardInstanceId),
    #[error("card {} is not a {} card", .card, .requested.name())]
    CardMismatch {
        card: cards::CardInstanceId,
        requested: cards::CardKind,
    },
    #[error(transparent)]
    Card(#[from] cards::EffectError),
    #[error(transparent)]
    Rule(#[from] rules::Error),
}
