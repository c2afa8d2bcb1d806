//! Fire-and-forget observer notification
//!
//! Events are emitted after the session lock has been released, so a slow or
//! blocking notifier can never stall a concurrent move.

use std::sync::{Arc, Mutex};

use board::{Color, Square};
use cards::CardKind;
use rules::GameResult;

use crate::snapshot::BoardSnapshot;

/// Something observers of a game want to hear about
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    MoveApplied {
        by: Color,
        from: Square,
        to: Square,
        board: BoardSnapshot,
    },
    CardPlayed {
        by: Color,
        kind: CardKind,
        board: BoardSnapshot,
        affected: Vec<Square>,
    },
    GameEnded(GameResult),
}

/// Push channel towards connected observers
///
/// Implementations must be best-effort: a notification that cannot be
/// delivered is dropped, never retried from inside the engine.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: SessionEvent);
}

/// Discards every event
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: SessionEvent) {}
}

/// Collects events into shared memory, mostly useful in tests
#[derive(Clone, Default)]
pub struct SharedNotifier(Arc<Mutex<Vec<SessionEvent>>>);

impl SharedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything notified so far
    pub fn events(&self) -> Vec<SessionEvent> {
        self.lock().clone()
    }

    /// The event log is plain data, so a poisoned lock is still readable
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SessionEvent>> {
        self.0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Notifier for SharedNotifier {
    fn notify(&self, event: SessionEvent) {
        self.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rules::GameOverReason;

    #[test]
    fn shared_notifier_survives_a_poisoned_lock() {
        let notifier = SharedNotifier::new();
        let poisoner = notifier.clone();
        std::thread::spawn(move || {
            let _guard = poisoner.0.lock().unwrap();
            panic!("poison the log on purpose");
        })
        .join()
        .unwrap_err();
        notifier.notify(SessionEvent::GameEnded(GameResult {
            winner: Some(Color::White),
            reason: GameOverReason::Checkmate,
        }));
        assert_eq!(notifier.events().len(), 1);
    }
}
