use core::fmt;

use board::{Color, Piece, PieceKind, Square};

use crate::movegen;

/// The two directions a king can castle in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastleSide {
    Kingside,
    Queenside,
}
impl CastleSide {
    pub const SIDES: [CastleSide; 2] = [Self::Kingside, Self::Queenside];

    /// The column the castling rook starts on
    pub const fn rook_col(self) -> u8 {
        match self {
            Self::Kingside => 7,
            Self::Queenside => 0,
        }
    }

    /// The column the king ends up on
    pub const fn king_target_col(self) -> u8 {
        match self {
            Self::Kingside => 6,
            Self::Queenside => 2,
        }
    }

    /// The column the rook ends up on
    pub const fn rook_target_col(self) -> u8 {
        match self {
            Self::Kingside => 5,
            Self::Queenside => 3,
        }
    }

    /// The columns between king and rook that must be vacant
    pub const fn between_cols(self) -> &'static [u8] {
        match self {
            Self::Kingside => &[5, 6],
            Self::Queenside => &[1, 2, 3],
        }
    }

    /// The columns the king passes through (target included) that must not
    /// be under attack
    pub const fn crossed_cols(self) -> &'static [u8] {
        match self {
            Self::Kingside => &[5, 6],
            Self::Queenside => &[3, 2],
        }
    }
}

/// An 8×8 mailbox board
///
/// Each cell owns its piece outright, so cloning the board for legality
/// simulation yields fully independent piece instances. The per-color pawn
/// skip square is the en-passant target created by that color's most recent
/// double pawn move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Piece>; 8]; 8],
    pawn_skip: [Option<Square>; 2],
}

impl Board {
    /// A board with no pieces on it
    pub const fn empty() -> Self {
        Self {
            cells: [[None; 8]; 8],
            pawn_skip: [None, None],
        }
    }

    /// The standard starting position
    pub fn initial() -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut board = Self::empty();
        for color in Color::COLORS {
            for (col, kind) in BACK_RANK.into_iter().enumerate() {
                let square = Square::new(color.back_row(), col as u8).unwrap();
                board.place(square, Piece::new(kind, color));
            }
            for col in 0..8 {
                let square = Square::new(color.pawn_row(), col).unwrap();
                board.place(square, Piece::new(PieceKind::Pawn, color));
            }
        }
        board
    }

    /// Read the piece on the given square
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.cells[square.row() as usize][square.col() as usize]
    }

    /// Put a piece on the given square, replacing whatever was there
    pub fn place(&mut self, square: Square, piece: Piece) {
        self.cells[square.row() as usize][square.col() as usize] = Some(piece);
    }

    /// Empty the given square
    pub fn clear(&mut self, square: Square) {
        self.cells[square.row() as usize][square.col() as usize] = None;
    }

    /// Remove and return the piece on the given square
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.cells[square.row() as usize][square.col() as usize].take()
    }

    /// All occupied squares with their pieces
    pub fn occupied(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
    }

    /// All squares occupied by the given color
    pub fn occupied_by(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.occupied()
            .filter(move |(_, piece)| piece.color == color)
    }

    /// Where the given color's king stands
    ///
    /// `None` only ever happens on hand-built test boards; during a game
    /// exactly one king of each color is on the board at all times.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.occupied_by(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(square, _)| square)
    }

    /// The en-passant target created by this color's last double pawn move
    pub fn pawn_skip(&self, color: Color) -> Option<Square> {
        self.pawn_skip[color.index()]
    }

    pub fn set_pawn_skip(&mut self, color: Color, target: Square) {
        self.pawn_skip[color.index()] = Some(target);
    }

    pub fn clear_pawn_skip(&mut self, color: Color) {
        self.pawn_skip[color.index()] = None;
    }

    /// Whether any opposing piece can reach the given color's king
    ///
    /// Computed through each piece's own move generator rather than a
    /// special-cased attack table.
    pub fn is_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(king) => movegen::is_attacked(self, king, color.other()),
            None => false,
        }
    }

    /// Whether the given color may still castle on the given side
    ///
    /// Derived entirely from the board: the king and the corresponding rook
    /// must both be on their home squares and never have moved. No separate
    /// rights flag exists to fall out of sync.
    pub fn castling_rights(&self, color: Color, side: CastleSide) -> bool {
        let row = color.back_row();
        let king_home = Square::new(row, 4).unwrap();
        let rook_home = Square::new(row, side.rook_col()).unwrap();
        let king_ok = self.piece_at(king_home).is_some_and(|piece| {
            piece.kind == PieceKind::King && piece.color == color && !piece.has_moved
        });
        let rook_ok = self.piece_at(rook_home).is_some_and(|piece| {
            piece.kind == PieceKind::Rook && piece.color == color && !piece.has_moved
        });
        king_ok && rook_ok
    }

    /// Draw by insufficient material
    ///
    /// True for king vs king, king and one minor piece vs king, and king and
    /// bishop vs king and bishop with both bishops on the same square color.
    pub fn insufficient_material(&self) -> bool {
        let mut extras: [Vec<(Square, PieceKind)>; 2] = [Vec::new(), Vec::new()];
        for (square, piece) in self.occupied() {
            if piece.kind != PieceKind::King {
                extras[piece.color.index()].push((square, piece.kind));
            }
        }
        match (&extras[0][..], &extras[1][..]) {
            ([], []) => true,
            ([(_, kind)], []) | ([], [(_, kind)]) => {
                matches!(kind, PieceKind::Bishop | PieceKind::Knight)
            }
            ([(first, PieceKind::Bishop)], [(second, PieceKind::Bishop)]) => {
                first.is_dark() == second.is_dark()
            }
            _ => false,
        }
    }

    /// The piece-placement field of a FEN string
    ///
    /// Used for repetition signatures and board rendering.
    pub fn fen_placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for row in 0..8 {
            if row != 0 {
                out.push('/');
            }
            let mut run = 0;
            for col in 0..8 {
                match self.piece_at(Square::new(row, col).unwrap()) {
                    Some(piece) => {
                        if run != 0 {
                            out.push(char::from_digit(run, 10).unwrap());
                            run = 0;
                        }
                        out.push(piece.fen_letter());
                    }
                    None => run += 1,
                }
            }
            if run != 0 {
                out.push(char::from_digit(run, 10).unwrap());
            }
        }
        out
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8 {
            write!(f, "{} ", 8 - row)?;
            for col in 0..8 {
                match self.piece_at(Square::new(row, col).unwrap()) {
                    Some(piece) => write!(f, "{} ", piece.fen_letter())?,
                    None => f.write_str(". ")?,
                }
            }
            writeln!(f)?;
        }
        f.write_str("  a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn place_new(board: &mut Board, name: &str, kind: PieceKind, color: Color) {
        board.place(sq(name), Piece::new(kind, color));
    }

    #[test]
    fn initial_position_fen_placement() {
        assert_eq!(
            Board::initial().fen_placement(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
    }

    #[test]
    fn initial_position_has_all_castling_rights() {
        let board = Board::initial();
        for color in Color::COLORS {
            for side in CastleSide::SIDES {
                assert!(board.castling_rights(color, side));
            }
        }
    }

    #[test]
    fn moved_rook_loses_its_side_only() {
        let mut board = Board::initial();
        let mut rook = board.take(sq("h1")).unwrap();
        rook.has_moved = true;
        board.place(sq("h1"), rook);
        assert!(!board.castling_rights(Color::White, CastleSide::Kingside));
        assert!(board.castling_rights(Color::White, CastleSide::Queenside));
        assert!(board.castling_rights(Color::Black, CastleSide::Kingside));
    }

    #[test]
    fn check_detected_along_a_file() {
        let mut board = Board::empty();
        place_new(&mut board, "e1", PieceKind::King, Color::White);
        place_new(&mut board, "e8", PieceKind::Rook, Color::Black);
        place_new(&mut board, "a8", PieceKind::King, Color::Black);
        assert!(board.is_in_check(Color::White));
        place_new(&mut board, "e4", PieceKind::Pawn, Color::Black);
        assert!(!board.is_in_check(Color::White));
    }

    #[test]
    fn insufficient_material_cases() {
        let mut board = Board::empty();
        place_new(&mut board, "e1", PieceKind::King, Color::White);
        place_new(&mut board, "e8", PieceKind::King, Color::Black);
        assert!(board.insufficient_material(), "K vs K");

        place_new(&mut board, "c1", PieceKind::Bishop, Color::White);
        assert!(board.insufficient_material(), "K+B vs K");

        place_new(&mut board, "b8", PieceKind::Knight, Color::Black);
        assert!(!board.insufficient_material(), "K+B vs K+N");

        board.clear(sq("b8"));
        place_new(&mut board, "f8", PieceKind::Bishop, Color::Black);
        // c1 and f8 are both dark squares
        assert!(board.insufficient_material(), "same-colored bishops");

        board.clear(sq("f8"));
        place_new(&mut board, "c8", PieceKind::Bishop, Color::Black);
        assert!(!board.insufficient_material(), "opposite-colored bishops");

        board.clear(sq("c8"));
        place_new(&mut board, "a7", PieceKind::Pawn, Color::Black);
        assert!(!board.insufficient_material(), "K+B vs K+P");
    }

    #[test]
    fn clone_is_deep() {
        let board = Board::initial();
        let mut copy = board.clone();
        copy.take(sq("e2"));
        assert!(board.piece_at(sq("e2")).is_some());
        assert!(copy.piece_at(sq("e2")).is_none());
    }
}
