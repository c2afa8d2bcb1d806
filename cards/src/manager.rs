use board::{Color, Piece, PieceKind};
use rand::{seq::SliceRandom, Rng};

use crate::catalog::{deck_pool, Card, CardInstanceId, CardKind, CardKindSet};

/// A player draws a card after every this-many of their own completed moves
pub const DRAW_MILESTONE: u32 = 5;

/// The most cards a hand can hold; milestone draws beyond this are skipped
pub const HAND_LIMIT: usize = 7;

/// A deferred card effect consumed by the next successfully applied move
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingEffect {
    /// The next move does not pass the turn
    ExtraMove,
}

/// The pieces captured *from* one color, available to that color for revival
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapturedPieceBank {
    counts: [u8; 6],
}
impl CapturedPieceBank {
    /// How many pieces of the given kind are in the bank
    pub fn count(&self, kind: PieceKind) -> u8 {
        self.counts[kind.index()]
    }

    pub fn add(&mut self, kind: PieceKind) {
        self.counts[kind.index()] += 1;
    }

    /// Remove one piece of the given kind, if any is banked
    pub fn take(&mut self, kind: PieceKind) -> bool {
        if self.counts[kind.index()] > 0 {
            self.counts[kind.index()] -= 1;
            true
        } else {
            false
        }
    }
}

/// What a milestone check produced
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawOutcome {
    /// Not at a milestone, nothing drawn
    NotYet,
    /// The top card of the pile went into the hand
    Drew(Card),
    /// At a milestone, but the draw pile is exhausted
    PileEmpty,
    /// At a milestone, but the hand is at its limit
    HandFull,
}

/// Deck, hand, and card-bookkeeping state for both players
///
/// The draw piles are shuffled once at game start from the fixed pool;
/// drawn cards get process-unique instance ids minted here.
#[derive(Clone, Debug)]
pub struct CardManager {
    hands: [Vec<Card>; 2],
    piles: [Vec<CardKind>; 2],
    captured: [CapturedPieceBank; 2],
    spent_once: [CardKindSet; 2],
    pending: [Option<PendingEffect>; 2],
    moves_made: [u32; 2],
    next_instance: u32,
}

impl CardManager {
    /// Fresh decks for both players, shuffled with the given randomness
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut make_pile = || {
            let mut pile = deck_pool();
            pile.shuffle(rng);
            pile
        };
        Self {
            piles: [make_pile(), make_pile()],
            hands: [Vec::new(), Vec::new()],
            captured: [CapturedPieceBank::default(), CapturedPieceBank::default()],
            spent_once: [CardKindSet::empty(), CardKindSet::empty()],
            pending: [None, None],
            moves_made: [0, 0],
            next_instance: 0,
        }
    }

    pub fn hand(&self, color: Color) -> &[Card] {
        &self.hands[color.index()]
    }

    pub fn pile_len(&self, color: Color) -> usize {
        self.piles[color.index()].len()
    }

    pub fn bank(&self, color: Color) -> &CapturedPieceBank {
        &self.captured[color.index()]
    }

    pub fn bank_mut(&mut self, color: Color) -> &mut CapturedPieceBank {
        &mut self.captured[color.index()]
    }

    /// Bank a piece that was just captured
    ///
    /// The bank is keyed by the *owner* of the captured piece, since that is
    /// the player who may later revive it.
    pub fn record_capture(&mut self, piece: Piece) {
        self.captured[piece.color.index()].add(piece.kind);
    }

    /// Count a completed move and draw on the milestone
    pub fn note_move(&mut self, color: Color) -> DrawOutcome {
        let made = &mut self.moves_made[color.index()];
        *made += 1;
        if *made % DRAW_MILESTONE == 0 {
            self.draw(color)
        } else {
            DrawOutcome::NotYet
        }
    }

    /// Draw the top card of the pile into the hand
    pub fn draw(&mut self, color: Color) -> DrawOutcome {
        if self.hands[color.index()].len() >= HAND_LIMIT {
            return DrawOutcome::HandFull;
        }
        match self.piles[color.index()].pop() {
            Some(kind) => {
                let card = Card {
                    id: self.mint_id(),
                    kind,
                };
                self.hands[color.index()].push(card);
                DrawOutcome::Drew(card)
            }
            None => DrawOutcome::PileEmpty,
        }
    }

    /// Find a hand card by instance id
    pub fn card_in_hand(&self, color: Color, id: CardInstanceId) -> Option<Card> {
        self.hands[color.index()]
            .iter()
            .find(|card| card.id == id)
            .copied()
    }

    /// Remove a hand card by instance id
    pub fn remove_card(&mut self, color: Color, id: CardInstanceId) -> Option<Card> {
        let hand = &mut self.hands[color.index()];
        let position = hand.iter().position(|card| card.id == id)?;
        Some(hand.remove(position))
    }

    /// Put a card into a hand (used by the card-swap exchange)
    pub fn add_card(&mut self, color: Color, card: Card) {
        self.hands[color.index()].push(card);
    }

    /// Remove a uniformly random card from the hand
    pub fn take_random_card(&mut self, color: Color, rng: &mut impl Rng) -> Option<Card> {
        let hand = &mut self.hands[color.index()];
        if hand.is_empty() {
            return None;
        }
        let position = rng.gen_range(0..hand.len());
        Some(hand.remove(position))
    }

    pub fn pending(&self, color: Color) -> Option<PendingEffect> {
        self.pending[color.index()]
    }

    pub fn set_pending(&mut self, color: Color, effect: PendingEffect) {
        self.pending[color.index()] = Some(effect);
    }

    /// Consume the pending effect, if one is set
    pub fn take_pending(&mut self, color: Color) -> Option<PendingEffect> {
        self.pending[color.index()].take()
    }

    pub fn already_used(&self, color: Color, kind: CardKind) -> bool {
        self.spent_once[color.index()].contains(kind.flag())
    }

    pub fn mark_used(&mut self, color: Color, kind: CardKind) {
        self.spent_once[color.index()] |= kind.flag();
    }

    fn mint_id(&mut self) -> CardInstanceId {
        let id = CardInstanceId(self.next_instance);
        self.next_instance += 1;
        id
    }
}
