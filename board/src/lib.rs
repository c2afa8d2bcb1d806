//! Value types shared by every crate in the workspace: colors, piece kinds,
//! pieces, and board squares with algebraic-notation parsing.

use core::{fmt, str::FromStr};

/// The two sides of a game
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}
impl Color {
    /// Both colors, white first
    pub const COLORS: [Color; 2] = [Self::White, Self::Black];

    pub const fn other(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Index usable for per-color arrays (white = 0, black = 1)
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// The row holding this color's back rank
    ///
    /// Row 0 is rank 8, so black's back rank is row 0 and white's is row 7.
    pub const fn back_row(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// The row this color's pawns start on
    pub const fn pawn_row(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// The row direction this color's pawns advance in
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }
}
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::White => "white",
            Color::Black => "black",
        })
    }
}

/// The types of pieces there are
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}
impl PieceKind {
    /// All the kinds of pieces there are
    pub const KINDS: [PieceKind; 6] = [
        Self::Pawn,
        Self::Knight,
        Self::Bishop,
        Self::Rook,
        Self::Queen,
        Self::King,
    ];

    /// The capitalized version of the letter used for this piece in FEN
    pub const fn fen_letter(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Rook => 'R',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    /// Whether a pawn can promote into this kind of piece
    pub const fn is_promotable(self) -> bool {
        match self {
            PieceKind::Pawn | PieceKind::King => false,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => true,
        }
    }

    /// Index usable for per-kind arrays
    pub const fn index(self) -> usize {
        match self {
            Self::Pawn => 0,
            Self::Knight => 1,
            Self::Bishop => 2,
            Self::Rook => 3,
            Self::Queen => 4,
            Self::King => 5,
        }
    }

    /// The squares where a piece of this kind starts the game for the given
    /// color
    ///
    /// These are the squares a captured piece may be revived onto. Pawns
    /// return no squares since they cannot be revived.
    pub fn home_squares(self, color: Color) -> &'static [Square] {
        const fn sq(row: u8, col: u8) -> Square {
            Square { row, col }
        }
        const WHITE_KNIGHTS: [Square; 2] = [sq(7, 1), sq(7, 6)];
        const BLACK_KNIGHTS: [Square; 2] = [sq(0, 1), sq(0, 6)];
        const WHITE_BISHOPS: [Square; 2] = [sq(7, 2), sq(7, 5)];
        const BLACK_BISHOPS: [Square; 2] = [sq(0, 2), sq(0, 5)];
        const WHITE_ROOKS: [Square; 2] = [sq(7, 0), sq(7, 7)];
        const BLACK_ROOKS: [Square; 2] = [sq(0, 0), sq(0, 7)];
        const WHITE_QUEEN: [Square; 1] = [sq(7, 3)];
        const BLACK_QUEEN: [Square; 1] = [sq(0, 3)];
        const WHITE_KING: [Square; 1] = [sq(7, 4)];
        const BLACK_KING: [Square; 1] = [sq(0, 4)];
        match (self, color) {
            (Self::Pawn, _) => &[],
            (Self::Knight, Color::White) => &WHITE_KNIGHTS,
            (Self::Knight, Color::Black) => &BLACK_KNIGHTS,
            (Self::Bishop, Color::White) => &WHITE_BISHOPS,
            (Self::Bishop, Color::Black) => &BLACK_BISHOPS,
            (Self::Rook, Color::White) => &WHITE_ROOKS,
            (Self::Rook, Color::Black) => &BLACK_ROOKS,
            (Self::Queen, Color::White) => &WHITE_QUEEN,
            (Self::Queen, Color::Black) => &BLACK_QUEEN,
            (Self::King, Color::White) => &WHITE_KING,
            (Self::King, Color::Black) => &BLACK_KING,
        }
    }
}

/// A piece on the board
///
/// `has_moved` is tracked per piece so castling rights can always be derived
/// from the pieces themselves instead of a separate flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub has_moved: bool,
}
impl Piece {
    /// A piece that has not moved yet
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self {
            kind,
            color,
            has_moved: false,
        }
    }

    /// The FEN letter for this piece (uppercase white, lowercase black)
    pub const fn fen_letter(self) -> char {
        match self.color {
            Color::White => self.kind.fen_letter().to_ascii_uppercase(),
            Color::Black => self.kind.fen_letter().to_ascii_lowercase(),
        }
    }
}

/// A square on the board
///
/// `(row, col)` with both on `[0,7]`. Row 0 is rank 8 (black's back rank) and
/// column 0 is file a, so algebraic `e4` is row 4, column 4.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    row: u8,
    col: u8,
}
impl Square {
    /// Produce a square from row and column, if both are on the board
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row < 8 && col < 8 {
            Some(Self { row, col })
        } else {
            None
        }
    }

    pub const fn row(self) -> u8 {
        self.row
    }

    pub const fn col(self) -> u8 {
        self.col
    }

    /// Offset the given number of rows and columns, if the result stays on
    /// the board
    ///
    /// ```
    /// use board::Square;
    /// let e2: Square = "e2".parse().unwrap();
    /// let e4: Square = "e4".parse().unwrap();
    /// assert_eq!(e2.offset(-2, 0), Some(e4));
    /// assert_eq!(e2.offset(6, 0), None);
    /// ```
    pub const fn offset(self, rows: i8, cols: i8) -> Option<Self> {
        let row = self.row as i8 + rows;
        let col = self.col as i8 + cols;
        if 0 <= row && row < 8 && 0 <= col && col < 8 {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// The rank digit used in algebraic notation (row 0 is rank 8)
    pub const fn rank(self) -> u8 {
        8 - self.row
    }

    /// The file letter used in algebraic notation
    pub const fn file(self) -> char {
        (b'a' + self.col) as char
    }

    /// Whether the square is dark, from the `(row + col)` parity
    ///
    /// Relevant for the same-colored-bishops insufficient-material rule.
    pub const fn is_dark(self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    /// An iterator over all 64 squares
    pub fn all() -> impl Iterator<Item = Self> {
        (0..8).flat_map(|row| (0..8).map(move |col| Self { row, col }))
    }
}
impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}
impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({self})")
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("not a square in algebraic notation: {0:?}")]
pub struct SquareParseError(pub String);

impl FromStr for Square {
    type Err = SquareParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SquareParseError(s.to_owned());
        let mut chars = s.chars();
        let file = chars.next().ok_or_else(err)?;
        let rank = chars.next().ok_or_else(err)?;
        if chars.next().is_some() {
            return Err(err());
        }
        let col = match file {
            'a'..='h' => file as u8 - b'a',
            _ => return Err(err()),
        };
        let row = match rank.to_digit(10) {
            Some(rank @ 1..=8) => 8 - rank as u8,
            _ => return Err(err()),
        };
        Ok(Self { row, col })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quickcheck::{quickcheck, Arbitrary, Gen};

    impl Arbitrary for Square {
        fn arbitrary(g: &mut Gen) -> Self {
            Square::new(u8::arbitrary(g) % 8, u8::arbitrary(g) % 8).unwrap()
        }
    }

    quickcheck! {
        fn square_name_round_trip(square: Square) -> bool {
            square.to_string().parse() == Ok(square)
        }

        fn square_offset_zero_is_identity(square: Square) -> bool {
            square.offset(0, 0) == Some(square)
        }
    }

    #[test]
    fn algebraic_corners() {
        assert_eq!("a8".parse(), Ok(Square::new(0, 0).unwrap()));
        assert_eq!("h8".parse(), Ok(Square::new(0, 7).unwrap()));
        assert_eq!("a1".parse(), Ok(Square::new(7, 0).unwrap()));
        assert_eq!("h1".parse(), Ok(Square::new(7, 7).unwrap()));
    }

    #[test]
    fn bad_squares_rejected() {
        for s in ["", "e", "e0", "e9", "i4", "e44", "44"] {
            assert!(s.parse::<Square>().is_err(), "{s:?} parsed");
        }
    }

    #[test]
    fn home_squares_are_back_rank() {
        for kind in PieceKind::KINDS {
            for color in Color::COLORS {
                let homes = kind.home_squares(color);
                let expected = match kind {
                    PieceKind::Pawn => 0,
                    PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook => 2,
                    PieceKind::Queen | PieceKind::King => 1,
                };
                assert_eq!(homes.len(), expected, "{kind:?}");
                for square in homes {
                    assert_eq!(square.row(), color.back_row());
                }
            }
        }
    }

    #[test]
    fn home_squares_match_the_initial_back_rank() {
        assert_eq!(
            PieceKind::Knight.home_squares(Color::White),
            ["b1".parse().unwrap(), "g1".parse().unwrap()]
        );
        assert_eq!(
            PieceKind::Queen.home_squares(Color::Black),
            ["d8".parse::<Square>().unwrap()]
        );
    }

    #[test]
    fn pawn_forward_points_at_opponent() {
        let e2: Square = "e2".parse().unwrap();
        let e7: Square = "e7".parse().unwrap();
        assert_eq!(
            e2.offset(Color::White.forward(), 0),
            Some("e3".parse().unwrap())
        );
        assert_eq!(
            e7.offset(Color::Black.forward(), 0),
            Some("e6".parse().unwrap())
        );
    }
}
