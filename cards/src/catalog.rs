use core::fmt;

/// The kinds of power cards there are
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CardKind {
    /// The activator's next move does not pass the turn
    ExtraZug,
    /// Relocate an owned piece to any empty square
    Teleport,
    /// Exchange the squares of two owned pieces
    PositionSwap,
    /// Return a captured piece to one of its home squares
    Wiedergeburt,
    /// Give up an own pawn for a card draw
    Opfergabe,
    /// Trade an own hand card for a random opponent card
    CardSwap,
    /// Grant the activator extra clock time
    AddTime,
    /// Take clock time from the opponent
    SubtractTime,
    /// Exchange both players' remaining clock time
    TimeSwap,
}

impl CardKind {
    /// All the kinds of cards there are
    pub const KINDS: [CardKind; 9] = [
        Self::ExtraZug,
        Self::Teleport,
        Self::PositionSwap,
        Self::Wiedergeburt,
        Self::Opfergabe,
        Self::CardSwap,
        Self::AddTime,
        Self::SubtractTime,
        Self::TimeSwap,
    ];

    /// The stable identifier used on the wire and in activation requests
    pub const fn type_id(self) -> &'static str {
        match self {
            Self::ExtraZug => "extra-zug",
            Self::Teleport => "teleport",
            Self::PositionSwap => "position-swap",
            Self::Wiedergeburt => "wiedergeburt",
            Self::Opfergabe => "opfergabe",
            Self::CardSwap => "card-swap",
            Self::AddTime => "add-time",
            Self::SubtractTime => "subtract-time",
            Self::TimeSwap => "time-swap",
        }
    }

    /// Look a kind up by its wire identifier
    pub fn from_type_id(id: &str) -> Option<Self> {
        Self::KINDS.into_iter().find(|kind| kind.type_id() == id)
    }

    /// The display name shown on the card face
    pub const fn name(self) -> &'static str {
        match self {
            Self::ExtraZug => "Extra Zug",
            Self::Teleport => "Teleport",
            Self::PositionSwap => "Stellungstausch",
            Self::Wiedergeburt => "Wiedergeburt",
            Self::Opfergabe => "Opfergabe",
            Self::CardSwap => "Kartentausch",
            Self::AddTime => "Zeitgewinn",
            Self::SubtractTime => "Zeitdiebstahl",
            Self::TimeSwap => "Zeittausch",
        }
    }

    /// The rules text shown to players
    pub const fn description(self) -> &'static str {
        match self {
            Self::ExtraZug => "Your next move does not end your turn: you move twice in a row.",
            Self::Teleport => "Move one of your pieces to any empty square.",
            Self::PositionSwap => "Exchange the squares of two of your own pieces.",
            Self::Wiedergeburt => {
                "Return one of your captured pieces to a free home square of its kind."
            }
            Self::Opfergabe => "Sacrifice one of your pawns and draw a card in return.",
            Self::CardSwap => "Give one of your hand cards for a random card from the opponent.",
            Self::AddTime => "Add two minutes to your own clock.",
            Self::SubtractTime => "Remove two minutes from the opponent's clock.",
            Self::TimeSwap => "Exchange the remaining time on both clocks.",
        }
    }

    /// The image asset shown for this card
    pub const fn image_ref(self) -> &'static str {
        match self {
            Self::ExtraZug => "cards/extra_zug.png",
            Self::Teleport => "cards/teleport.png",
            Self::PositionSwap => "cards/position_swap.png",
            Self::Wiedergeburt => "cards/wiedergeburt.png",
            Self::Opfergabe => "cards/opfergabe.png",
            Self::CardSwap => "cards/card_swap.png",
            Self::AddTime => "cards/add_time.png",
            Self::SubtractTime => "cards/subtract_time.png",
            Self::TimeSwap => "cards/time_swap.png",
        }
    }

    /// Whether a player may only ever spend one of these per game
    pub const fn once_per_game(self) -> bool {
        matches!(self, Self::ExtraZug)
    }

    /// The set containing exactly this kind
    pub const fn flag(self) -> CardKindSet {
        match self {
            Self::ExtraZug => CardKindSet::EXTRA_ZUG,
            Self::Teleport => CardKindSet::TELEPORT,
            Self::PositionSwap => CardKindSet::POSITION_SWAP,
            Self::Wiedergeburt => CardKindSet::WIEDERGEBURT,
            Self::Opfergabe => CardKindSet::OPFERGABE,
            Self::CardSwap => CardKindSet::CARD_SWAP,
            Self::AddTime => CardKindSet::ADD_TIME,
            Self::SubtractTime => CardKindSet::SUBTRACT_TIME,
            Self::TimeSwap => CardKindSet::TIME_SWAP,
        }
    }
}

bitflags::bitflags! {
    /// A set of card kinds (the per-player record of spent one-shot cards)
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct CardKindSet: u16 {
        const EXTRA_ZUG = 1 << 0;
        const TELEPORT = 1 << 1;
        const POSITION_SWAP = 1 << 2;
        const WIEDERGEBURT = 1 << 3;
        const OPFERGABE = 1 << 4;
        const CARD_SWAP = 1 << 5;
        const ADD_TIME = 1 << 6;
        const SUBTRACT_TIME = 1 << 7;
        const TIME_SWAP = 1 << 8;
    }
}

/// A unique identifier for one physical card in this game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CardInstanceId(pub u32);
impl fmt::Display for CardInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One card as held in a hand or drawn from a pile
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Card {
    pub id: CardInstanceId,
    pub kind: CardKind,
}

/// The fixed pool each player's draw pile starts from, before shuffling
///
/// Two copies of everything except the once-per-game extra move.
pub fn deck_pool() -> Vec<CardKind> {
    let mut pool = Vec::with_capacity(CardKind::KINDS.len() * 2);
    for kind in CardKind::KINDS {
        pool.push(kind);
        if !kind.once_per_game() {
            pool.push(kind);
        }
    }
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_ids_round_trip() {
        for kind in CardKind::KINDS {
            assert_eq!(CardKind::from_type_id(kind.type_id()), Some(kind));
        }
        assert_eq!(CardKind::from_type_id("no-such-card"), None);
    }

    #[test]
    fn kind_flags_are_distinct() {
        let mut seen = CardKindSet::empty();
        for kind in CardKind::KINDS {
            assert!(!seen.intersects(kind.flag()));
            seen |= kind.flag();
        }
    }

    #[test]
    fn pool_has_one_extra_zug_and_two_of_the_rest() {
        let pool = deck_pool();
        assert_eq!(pool.len(), 17);
        for kind in CardKind::KINDS {
            let copies = pool.iter().filter(|&&k| k == kind).count();
            assert_eq!(copies, if kind.once_per_game() { 1 } else { 2 });
        }
    }
}
