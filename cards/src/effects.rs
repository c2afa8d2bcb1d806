//! One handler per card kind
//!
//! Every handler validates its own preconditions before mutating anything,
//! and any board mutation goes through the same simulate-then-reject
//! self-check rule as an ordinary move. An `Err` leaves all state untouched;
//! an `Ok` means the activated card is spent, even when the outcome says the
//! board did not change.

use std::time::Instant;

use board::{Color, Piece, PieceKind, Square};
use clock::{GameClock, PENALTY_FLOOR, TIME_GRANT, TIME_PENALTY};
use rand::rngs::SmallRng;
use rules::history::{HistoryEvent, HistoryRecorder};
use rules::{GameState, Move};

use crate::catalog::{Card, CardInstanceId, CardKind};
use crate::manager::{CardManager, PendingEffect};
use crate::{EffectError, Result};

/// The raw payload of an activation request, squares already parsed
#[derive(Clone, Debug, Default)]
pub struct ActivationRequest {
    pub from: Option<Square>,
    pub to: Option<Square>,
    pub revive_kind: Option<PieceKind>,
    pub revive_at: Option<Square>,
    pub swap_card: Option<CardInstanceId>,
}

/// The cards exchanged by a card swap
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapDetails {
    /// The card the activator gave up
    pub given: Card,
    /// The card received in return; `None` when the opponent's hand was
    /// empty and the given card was simply discarded
    pub received: Option<Card>,
}

/// What a successful activation did
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivationOutcome {
    /// Set for the deliberate spend-without-effect outcomes
    pub message: Option<String>,
    /// Whether the activator's turn ends
    pub ends_turn: bool,
    /// Whether the board changed
    pub board_updated: bool,
    /// Squares the effect touched, for highlighting
    pub affected: Vec<Square>,
    /// Whether the activator draws a card (the sacrifice reward)
    pub grants_draw: bool,
    pub swap: Option<SwapDetails>,
}

/// Everything a handler may read or mutate
pub struct EffectContext<'a> {
    pub game: &'a mut GameState,
    pub cards: &'a mut CardManager,
    pub clock: &'a mut GameClock,
    pub rng: &'a mut SmallRng,
    pub history: &'a mut dyn HistoryRecorder,
    pub activator: Color,
    pub now: Instant,
}

/// Run the handler for the activated card
pub fn activate(
    ctx: &mut EffectContext<'_>,
    card: Card,
    request: &ActivationRequest,
) -> Result<ActivationOutcome> {
    if card.kind.once_per_game() && ctx.cards.already_used(ctx.activator, card.kind) {
        return Err(EffectError::AlreadyUsed(card.kind));
    }
    let outcome = match card.kind {
        CardKind::ExtraZug => extra_zug(ctx),
        CardKind::Teleport => teleport(ctx, request),
        CardKind::PositionSwap => position_swap(ctx, request),
        CardKind::Wiedergeburt => wiedergeburt(ctx, request),
        CardKind::Opfergabe => opfergabe(ctx, request),
        CardKind::CardSwap => card_swap(ctx, card.id, request),
        CardKind::AddTime => add_time(ctx),
        CardKind::SubtractTime => subtract_time(ctx),
        CardKind::TimeSwap => time_swap(ctx),
    }?;
    if card.kind.once_per_game() {
        ctx.cards.mark_used(ctx.activator, card.kind);
    }
    Ok(outcome)
}

fn extra_zug(ctx: &mut EffectContext<'_>) -> Result<ActivationOutcome> {
    ctx.cards
        .set_pending(ctx.activator, PendingEffect::ExtraMove);
    Ok(ActivationOutcome {
        ends_turn: false,
        ..Default::default()
    })
}

fn teleport(ctx: &mut EffectContext<'_>, request: &ActivationRequest) -> Result<ActivationOutcome> {
    let from = request.from.ok_or(EffectError::MissingField("fromSquare"))?;
    let to = request.to.ok_or(EffectError::MissingField("toSquare"))?;
    own_piece(ctx, from)?;
    ctx.game
        .apply_effect_move(&Move::Teleport { from, to }, ctx.activator)?;
    ctx.history.record(HistoryEvent::Teleported {
        color: ctx.activator,
        from,
        to,
    });
    Ok(ActivationOutcome {
        ends_turn: true,
        board_updated: true,
        affected: vec![from, to],
        ..Default::default()
    })
}

fn position_swap(
    ctx: &mut EffectContext<'_>,
    request: &ActivationRequest,
) -> Result<ActivationOutcome> {
    let first = request.from.ok_or(EffectError::MissingField("fromSquare"))?;
    let second = request.to.ok_or(EffectError::MissingField("toSquare"))?;
    own_piece(ctx, first)?;
    own_piece(ctx, second)?;
    ctx.game
        .apply_effect_move(&Move::PieceSwap { first, second }, ctx.activator)?;
    ctx.history.record(HistoryEvent::Swapped {
        color: ctx.activator,
        first,
        second,
    });
    Ok(ActivationOutcome {
        ends_turn: true,
        board_updated: true,
        affected: vec![first, second],
        ..Default::default()
    })
}

fn wiedergeburt(
    ctx: &mut EffectContext<'_>,
    request: &ActivationRequest,
) -> Result<ActivationOutcome> {
    let kind = request
        .revive_kind
        .ok_or(EffectError::MissingField("pieceTypeToRevive"))?;
    let at = request
        .revive_at
        .ok_or(EffectError::MissingField("targetRevivalSquare"))?;
    if kind == PieceKind::Pawn {
        return Err(EffectError::RevivalKind(kind));
    }
    if !kind.home_squares(ctx.activator).contains(&at) {
        return Err(EffectError::RevivalSquare(kind, at));
    }
    if ctx.cards.bank(ctx.activator).count(kind) == 0 {
        return Err(EffectError::NothingCaptured(kind));
    }
    if ctx.game.board().piece_at(at).is_some() {
        // Deliberate spend-without-effect: the card is gone, the bank is not
        return Ok(ActivationOutcome {
            message: Some(format!(
                "{at} is occupied; the revival fizzles and the card is spent"
            )),
            ends_turn: true,
            ..Default::default()
        });
    }
    let revived = Piece {
        kind,
        color: ctx.activator,
        has_moved: true,
    };
    let mut simulated = ctx.game.board().clone();
    simulated.place(at, revived);
    if simulated.is_in_check(ctx.activator) {
        return Err(rules::Error::MovingIntoCheck.into());
    }
    ctx.cards.bank_mut(ctx.activator).take(kind);
    ctx.game.board_mut().place(at, revived);
    ctx.history.record(HistoryEvent::Revived {
        color: ctx.activator,
        kind,
        at,
    });
    Ok(ActivationOutcome {
        ends_turn: true,
        board_updated: true,
        affected: vec![at],
        ..Default::default()
    })
}

fn opfergabe(ctx: &mut EffectContext<'_>, request: &ActivationRequest) -> Result<ActivationOutcome> {
    let at = request.from.ok_or(EffectError::MissingField("fromSquare"))?;
    let piece = own_piece(ctx, at)?;
    if piece.kind != PieceKind::Pawn {
        return Err(EffectError::NotAPawn(at));
    }
    let mut simulated = ctx.game.board().clone();
    simulated.take(at);
    if simulated.is_in_check(ctx.activator) {
        return Err(rules::Error::MovingIntoCheck.into());
    }
    ctx.game.board_mut().take(at);
    ctx.history.record(HistoryEvent::Sacrificed {
        color: ctx.activator,
        at,
    });
    Ok(ActivationOutcome {
        ends_turn: true,
        board_updated: true,
        affected: vec![at],
        grants_draw: true,
        ..Default::default()
    })
}

fn card_swap(
    ctx: &mut EffectContext<'_>,
    activated: CardInstanceId,
    request: &ActivationRequest,
) -> Result<ActivationOutcome> {
    let nominated = request
        .swap_card
        .ok_or(EffectError::MissingField("cardInstanceIdToSwap"))?;
    if nominated == activated {
        return Err(EffectError::CannotSwapItself);
    }
    let opponent = ctx.activator.other();
    if ctx.cards.card_in_hand(ctx.activator, nominated).is_none() {
        return Err(EffectError::CardNotInHand(nominated));
    }
    match ctx.cards.take_random_card(opponent, ctx.rng) {
        Some(received) => {
            let given = ctx
                .cards
                .remove_card(ctx.activator, nominated)
                .ok_or(EffectError::CardNotInHand(nominated))?;
            ctx.cards.add_card(opponent, given);
            ctx.cards.add_card(ctx.activator, received);
            Ok(ActivationOutcome {
                ends_turn: true,
                swap: Some(SwapDetails {
                    given,
                    received: Some(received),
                }),
                ..Default::default()
            })
        }
        None => {
            // Deliberate spend-without-effect: the nominated card is
            // discarded and nothing comes back
            let given = ctx
                .cards
                .remove_card(ctx.activator, nominated)
                .ok_or(EffectError::CardNotInHand(nominated))?;
            Ok(ActivationOutcome {
                message: Some(format!(
                    "the opponent's hand is empty; {} is discarded without replacement",
                    given.kind.name()
                )),
                ends_turn: true,
                swap: Some(SwapDetails {
                    given,
                    received: None,
                }),
                ..Default::default()
            })
        }
    }
}

fn add_time(ctx: &mut EffectContext<'_>) -> Result<ActivationOutcome> {
    ctx.clock.elapse(ctx.now);
    ctx.clock.add_time(ctx.activator, TIME_GRANT);
    Ok(ActivationOutcome::default())
}

fn subtract_time(ctx: &mut EffectContext<'_>) -> Result<ActivationOutcome> {
    let opponent = ctx.activator.other();
    ctx.clock.elapse(ctx.now);
    if ctx.clock.remaining(opponent) < PENALTY_FLOOR {
        return Err(EffectError::OpponentClockTooLow);
    }
    ctx.clock.subtract_time(opponent, TIME_PENALTY);
    Ok(ActivationOutcome::default())
}

fn time_swap(ctx: &mut EffectContext<'_>) -> Result<ActivationOutcome> {
    ctx.clock.swap(ctx.now);
    Ok(ActivationOutcome::default())
}

/// The piece on `square`, which must belong to the activator
fn own_piece(ctx: &EffectContext<'_>, square: Square) -> Result<Piece> {
    let piece = ctx
        .game
        .board()
        .piece_at(square)
        .ok_or(EffectError::EmptySquare(square))?;
    if piece.color != ctx.activator {
        return Err(EffectError::NotYourPiece(square));
    }
    Ok(piece)
}
