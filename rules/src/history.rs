//! The append-only move-history log
//!
//! The engine only ever appends; export and persistence belong to whoever
//! owns the [`HistoryRecorder`] implementation. Card effects that change the
//! board are logged alongside ordinary moves.

use std::sync::{Arc, Mutex};

use board::{Color, PieceKind, Square};

/// One entry in the game's history
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryEvent {
    /// An ordinary move (including castling and promotion)
    Moved {
        color: Color,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
        captured: Option<PieceKind>,
    },
    /// A piece relocated by the teleport card
    Teleported { color: Color, from: Square, to: Square },
    /// Two pieces exchanged by the position-swap card
    Swapped {
        color: Color,
        first: Square,
        second: Square,
    },
    /// A captured piece returned to a home square
    Revived {
        color: Color,
        kind: PieceKind,
        at: Square,
    },
    /// A pawn given up for a card draw
    Sacrificed { color: Color, at: Square },
}

/// Sink for history entries
pub trait HistoryRecorder {
    fn record(&mut self, event: HistoryEvent);
}

/// A recorder that drops everything
pub struct NullRecorder;
impl HistoryRecorder for NullRecorder {
    fn record(&mut self, _event: HistoryEvent) {}
}

/// A recorder backed by a shared vector
///
/// Clones observe the same log, which makes it usable both as the injected
/// sink and as the read side for export.
#[derive(Clone, Default)]
pub struct SharedRecorder(Arc<Mutex<Vec<HistoryEvent>>>);
impl SharedRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything recorded so far
    pub fn entries(&self) -> Vec<HistoryEvent> {
        self.lock().clone()
    }

    /// The entries are plain data, so a poisoned lock is still readable
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<HistoryEvent>> {
        self.0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
impl HistoryRecorder for SharedRecorder {
    fn record(&mut self, event: HistoryEvent) {
        self.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_recorder_clones_observe_the_same_log() {
        let recorder = SharedRecorder::new();
        let mut writer = recorder.clone();
        writer.record(HistoryEvent::Sacrificed {
            color: Color::White,
            at: "e4".parse().unwrap(),
        });
        assert_eq!(recorder.entries().len(), 1);
    }

    #[test]
    fn shared_recorder_survives_a_poisoned_lock() {
        let recorder = SharedRecorder::new();
        let poisoner = recorder.clone();
        std::thread::spawn(move || {
            let _guard = poisoner.0.lock().unwrap();
            panic!("poison the log on purpose");
        })
        .join()
        .unwrap_err();
        let mut writer = recorder.clone();
        writer.record(HistoryEvent::Sacrificed {
            color: Color::Black,
            at: "d5".parse().unwrap(),
        });
        assert_eq!(recorder.entries().len(), 1);
    }
}
