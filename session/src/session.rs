//! The per-game concurrency guard and orchestrator

use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use board::{Color, PieceKind, Square};
use cards::{
    ActivationRequest, Card, CardInstanceId, CardKind, CardManager, DrawOutcome, EffectContext,
    PendingEffect,
};
use clock::{GameClock, INITIAL_BUDGET};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rules::history::{HistoryEvent, HistoryRecorder, NullRecorder};
use rules::{movegen, GameOverReason, GameResult, GameState, Move};

use crate::notify::{Notifier, NullNotifier, SessionEvent};
use crate::snapshot::{
    ActivationResult, BoardSnapshot, CardDrawSignal, GameStatus, MoveOutcome, TimeUpdate,
};
use crate::{Error, PlayerId, Result};

/// A card activation as submitted by a player
///
/// `kind` is the caller's claim of what the instance is; it is checked
/// against the actual card so a stale client cannot activate the wrong
/// effect by id reuse.
#[derive(Clone, Debug)]
pub struct CardRequest {
    pub card: CardInstanceId,
    pub kind: CardKind,
    pub from: Option<Square>,
    pub to: Option<Square>,
    pub revive_kind: Option<PieceKind>,
    pub revive_at: Option<Square>,
    pub swap_card: Option<CardInstanceId>,
}

impl CardRequest {
    /// A request with only the card named, for the cards that take no payload
    pub fn bare(card: CardInstanceId, kind: CardKind) -> Self {
        Self {
            card,
            kind,
            from: None,
            to: None,
            revive_kind: None,
            revive_at: None,
            swap_card: None,
        }
    }
}

/// One live game between two players
///
/// All mutation happens inside a single exclusive critical section per
/// session; turn ownership is re-checked after the lock is acquired, so of
/// two racing requests for the same turn exactly one wins and the other sees
/// the turn already gone. The critical section only does in-memory work;
/// notification happens strictly after the lock is released.
pub struct GameSession {
    inner: Mutex<SessionInner>,
    notifier: Box<dyn Notifier>,
}

struct SessionInner {
    game: GameState,
    cards: CardManager,
    clock: GameClock,
    players: [PlayerId; 2],
    rng: SmallRng,
    history: Box<dyn HistoryRecorder + Send>,
}

impl GameSession {
    /// A fresh game with no observers and no history sink
    pub fn new(white: PlayerId, black: PlayerId, seed: u64, now: Instant) -> Self {
        Self::with_collaborators(
            white,
            black,
            seed,
            now,
            Box::new(NullNotifier),
            Box::new(NullRecorder),
        )
    }

    /// A fresh game wired up to an observer channel and a history sink
    pub fn with_collaborators(
        white: PlayerId,
        black: PlayerId,
        seed: u64,
        now: Instant,
        notifier: Box<dyn Notifier>,
        history: Box<dyn HistoryRecorder + Send>,
    ) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let cards = CardManager::new(&mut rng);
        let mut clock = GameClock::new(INITIAL_BUDGET, now);
        clock.set_running(Some(Color::White), now);
        log::debug!("session opened: white is {white}, black is {black}");
        Self {
            inner: Mutex::new(SessionInner {
                game: GameState::new(),
                cards,
                clock,
                players: [white, black],
                rng,
                history,
            }),
            notifier,
        }
    }

    /// Apply a move for `player`
    ///
    /// The concrete move is resolved from the legal moves of the piece on
    /// `from`; a promotion with no piece named promotes to a queen.
    pub fn apply_move(
        &self,
        player: PlayerId,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
        now: Instant,
    ) -> Result<MoveOutcome> {
        let mut events = Vec::new();
        let outcome = self.apply_move_locked(player, from, to, promotion, now, &mut events);
        self.emit(events);
        outcome
    }

    fn apply_move_locked(
        &self,
        player: PlayerId,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
        now: Instant,
        events: &mut Vec<SessionEvent>,
    ) -> Result<MoveOutcome> {
        let mut inner = self.lock();
        let color = inner.color_of(player)?;
        if let Some(result) = inner.settle_clock(now) {
            events.push(SessionEvent::GameEnded(result));
        }
        inner.require_turn(color)?;
        let mv = resolve_move(&inner.game, from, to, promotion)?;
        let keep_turn = inner.cards.pending(color) == Some(PendingEffect::ExtraMove);
        let applied = inner.game.apply_move(&mv, keep_turn)?;
        if keep_turn {
            inner.cards.take_pending(color);
        }
        if let Some(captured) = applied.captured {
            inner.cards.record_capture(captured);
        }
        inner.history.record(HistoryEvent::Moved {
            color,
            from,
            to,
            promotion: mv.promotion(),
            captured: applied.captured.map(|piece| piece.kind),
        });
        let card_draw = draw_signal(inner.cards.note_move(color));
        inner.sync_clock(now);
        let board = BoardSnapshot::capture(inner.game.board());
        events.push(SessionEvent::MoveApplied {
            by: color,
            from,
            to,
            board: board.clone(),
        });
        if let Some(result) = inner.game.result() {
            events.push(SessionEvent::GameEnded(result));
        }
        Ok(MoveOutcome {
            your_turn_next: inner.game.result().is_none() && inner.game.active() == color,
            status: inner.status_for(color),
            board,
            from,
            to,
            card_draw,
        })
    }

    /// Activate a card from `player`'s hand
    ///
    /// On any `Err` nothing has changed and the card is still in hand. On
    /// `Ok` the card is spent, including the deliberate spend-without-effect
    /// outcomes.
    pub fn activate_card(
        &self,
        player: PlayerId,
        request: &CardRequest,
        now: Instant,
    ) -> Result<ActivationResult> {
        let mut events = Vec::new();
        let result = self.activate_card_locked(player, request, now, &mut events);
        self.emit(events);
        result
    }

    fn activate_card_locked(
        &self,
        player: PlayerId,
        request: &CardRequest,
        now: Instant,
        events: &mut Vec<SessionEvent>,
    ) -> Result<ActivationResult> {
        let mut guard = self.lock();
        let color = guard.color_of(player)?;
        if let Some(result) = guard.settle_clock(now) {
            events.push(SessionEvent::GameEnded(result));
        }
        guard.require_turn(color)?;
        let card = guard
            .cards
            .card_in_hand(color, request.card)
            .ok_or(Error::NoSuchCard(request.card))?;
        if card.kind != request.kind {
            return Err(Error::CardMismatch {
                card: request.card,
                requested: request.kind,
            });
        }
        let activation = ActivationRequest {
            from: request.from,
            to: request.to,
            revive_kind: request.revive_kind,
            revive_at: request.revive_at,
            swap_card: request.swap_card,
        };
        let inner = &mut *guard;
        let mut ctx = EffectContext {
            game: &mut inner.game,
            cards: &mut inner.cards,
            clock: &mut inner.clock,
            rng: &mut inner.rng,
            history: inner.history.as_mut(),
            activator: color,
            now,
        };
        let outcome = cards::activate(&mut ctx, card, &activation)?;
        if inner.cards.remove_card(color, card.id).is_none() {
            // The swap handler is the only one that touches hands, and it
            // never removes the activated instance itself
            log::error!("activated card {} vanished from the hand", card.id);
        }
        if outcome.ends_turn {
            inner.game.pass_turn();
        }
        let card_draw = if outcome.grants_draw {
            draw_signal(inner.cards.draw(color))
        } else {
            None
        };
        inner.sync_clock(now);
        let board = BoardSnapshot::capture(inner.game.board());
        events.push(SessionEvent::CardPlayed {
            by: color,
            kind: card.kind,
            board: board.clone(),
            affected: outcome.affected.clone(),
        });
        if let Some(result) = inner.game.result() {
            events.push(SessionEvent::GameEnded(result));
        }
        Ok(ActivationResult {
            message: outcome.message,
            board_updated: outcome.board_updated,
            affected: outcome.affected,
            your_turn_next: inner.game.result().is_none() && inner.game.active() == color,
            status: inner.status_for(color),
            board,
            swap: outcome.swap,
            card_draw,
        })
    }

    /// The distinct squares the piece on `from` can legally reach
    pub fn legal_moves(&self, from: Square) -> Vec<Square> {
        let inner = self.lock();
        let mut targets: Vec<Square> = Vec::new();
        for mv in movegen::legal_moves(inner.game.board(), from) {
            let to = mv.to();
            if !targets.contains(&to) {
                targets.push(to);
            }
        }
        targets
    }

    /// The game from `player`'s point of view
    ///
    /// Settles the clock first, so a fallen flag becomes a timeout here even
    /// when no move is pending.
    pub fn status(&self, player: PlayerId, now: Instant) -> Result<GameStatus> {
        let mut events = Vec::new();
        let status = {
            let mut inner = self.lock();
            let color = inner.color_of(player)?;
            if let Some(result) = inner.settle_clock(now) {
                events.push(SessionEvent::GameEnded(result));
            }
            inner.status_for(color)
        };
        self.emit(events);
        Ok(status)
    }

    /// Both clocks, settled to `now`
    pub fn time_update(&self, now: Instant) -> TimeUpdate {
        let mut events = Vec::new();
        let update = {
            let mut inner = self.lock();
            if let Some(result) = inner.settle_clock(now) {
                events.push(SessionEvent::GameEnded(result));
            }
            TimeUpdate {
                white_remaining: inner.clock.remaining(Color::White),
                black_remaining: inner.clock.remaining(Color::Black),
                running: inner.clock.running(),
            }
        };
        self.emit(events);
        update
    }

    /// A copy of `player`'s current hand
    pub fn hand(&self, player: PlayerId) -> Result<Vec<Card>> {
        let inner = self.lock();
        let color = inner.color_of(player)?;
        Ok(inner.cards.hand(color).to_vec())
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            log::error!("session lock poisoned, continuing with the inner state");
            poisoned.into_inner()
        })
    }

    fn emit(&self, events: Vec<SessionEvent>) {
        for event in events {
            self.notifier.notify(event);
        }
    }
}

impl SessionInner {
    fn color_of(&self, player: PlayerId) -> Result<Color> {
        Color::COLORS
            .into_iter()
            .find(|color| self.players[color.index()] == player)
            .ok_or(Error::UnknownPlayer(player))
    }

    /// Deduct elapsed time and turn a fallen flag into a terminal result
    ///
    /// Returns the result only on the transition, so observers hear about a
    /// timeout exactly once no matter how often the clock is polled.
    fn settle_clock(&mut self, now: Instant) -> Option<GameResult> {
        self.clock.elapse(now);
        let loser = self.clock.flagged()?;
        if self.game.result().is_some() {
            return None;
        }
        self.game.flag_timeout(loser);
        self.clock.set_running(None, now);
        self.game.result()
    }

    fn require_turn(&self, color: Color) -> Result<()> {
        if self.game.result().is_some() {
            return Err(Error::GameOver);
        }
        if self.game.active() != color {
            return Err(Error::NotYourTurn);
        }
        Ok(())
    }

    /// Point the running clock at the player to move, or stop it
    fn sync_clock(&mut self, now: Instant) {
        let running = match self.game.result() {
            Some(_) => None,
            None => Some(self.game.active()),
        };
        self.clock.set_running(running, now);
    }

    fn status_for(&self, color: Color) -> GameStatus {
        match self.game.result() {
            Some(result) => match result.reason {
                GameOverReason::Checkmate => GameStatus::Checkmate,
                GameOverReason::Stalemate => GameStatus::Stalemate,
                GameOverReason::FiftyMoveRule => GameStatus::Draw50Move,
                GameOverReason::ThreefoldRepetition => GameStatus::DrawThreefold,
                GameOverReason::InsufficientMaterial => GameStatus::DrawInsufficientMaterial,
                GameOverReason::Timeout => GameStatus::TimeOut,
            },
            None if self.game.active() == color && self.game.is_check() => GameStatus::Check,
            None => GameStatus::None,
        }
    }
}

/// Find the legal move matching a from/to pair
///
/// Promotions expand to four legal moves per destination; the caller's
/// choice (or the queen default) picks one.
fn resolve_move(
    game: &GameState,
    from: Square,
    to: Square,
    promotion: Option<PieceKind>,
) -> Result<Move> {
    let wanted = promotion.unwrap_or(PieceKind::Queen);
    movegen::legal_moves(game.board(), from)
        .into_iter()
        .find(|mv| {
            mv.to() == to
                && match mv {
                    Move::Promotion { into, .. } => *into == wanted,
                    _ => true,
                }
        })
        .ok_or(Error::Rule(rules::Error::NoSuchMove { from, to }))
}

fn draw_signal(outcome: DrawOutcome) -> Option<CardDrawSignal> {
    match outcome {
        DrawOutcome::NotYet => None,
        DrawOutcome::Drew(card) => Some(CardDrawSignal::Drew(card)),
        DrawOutcome::PileEmpty => Some(CardDrawSignal::PileEmpty),
        DrawOutcome::HandFull => Some(CardDrawSignal::HandFull),
    }
}
