//! Per-piece move generation
//!
//! Sliding pieces ray-cast along fixed direction sets, knights and kings
//! enumerate fixed offsets, and pawns handle the single/double advance,
//! diagonal captures, en passant, and promotion expansion. Castling
//! candidates are generated when the derived rights hold and the path is
//! vacant; the check-related castling restrictions live in
//! [`Move::is_legal`].

use board::{Color, PieceKind, Square};

use crate::grid::{Board, CastleSide};
use crate::moves::Move;

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// All pseudo-legal moves for the piece on `from`
///
/// Pseudo-legal means structurally sound; whether the move leaves the own
/// king in check is decided by [`Move::is_legal`].
pub fn pseudo_moves(board: &Board, from: Square) -> Vec<Move> {
    let Some(piece) = board.piece_at(from) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, from, piece.color, piece.has_moved, &mut out),
        PieceKind::Knight => step_moves(board, from, piece.color, &KNIGHT_JUMPS, &mut out),
        PieceKind::Bishop => slide_moves(board, from, piece.color, &DIAGONAL, &mut out),
        PieceKind::Rook => slide_moves(board, from, piece.color, &ORTHOGONAL, &mut out),
        PieceKind::Queen => slide_moves(board, from, piece.color, &ALL_DIRECTIONS, &mut out),
        PieceKind::King => {
            step_moves(board, from, piece.color, &ALL_DIRECTIONS, &mut out);
            castle_moves(board, piece.color, &mut out);
        }
    }
    out
}

/// The legal moves for the piece on `from`
pub fn legal_moves(board: &Board, from: Square) -> Vec<Move> {
    let Some(piece) = board.piece_at(from) else {
        return Vec::new();
    };
    pseudo_moves(board, from)
        .into_iter()
        .filter(|mv| mv.is_legal(board, piece.color).is_ok())
        .collect()
}

/// Every legal move the given color has
pub fn all_legal_moves(board: &Board, color: Color) -> Vec<Move> {
    board
        .occupied_by(color)
        .flat_map(|(square, _)| legal_moves(board, square))
        .collect()
}

/// Whether the given color has any legal move at all
///
/// Early-exits on the first hit; used by checkmate/stalemate detection.
pub fn has_legal_move(board: &Board, color: Color) -> bool {
    board.occupied_by(color).any(|(square, piece)| {
        pseudo_moves(board, square)
            .into_iter()
            .any(|mv| mv.is_legal(board, piece.color).is_ok())
    })
}

/// Whether any piece of `by` attacks `target`
///
/// Castling is excluded since a castling king can never capture.
pub fn is_attacked(board: &Board, target: Square, by: Color) -> bool {
    board.occupied_by(by).any(|(from, piece)| match piece.kind {
        PieceKind::Pawn => [1, -1]
            .into_iter()
            .any(|cols| from.offset(by.forward(), cols) == Some(target)),
        PieceKind::Knight => reaches_by_step(from, target, &KNIGHT_JUMPS),
        PieceKind::King => reaches_by_step(from, target, &ALL_DIRECTIONS),
        PieceKind::Bishop => reaches_by_ray(board, from, target, &DIAGONAL),
        PieceKind::Rook => reaches_by_ray(board, from, target, &ORTHOGONAL),
        PieceKind::Queen => reaches_by_ray(board, from, target, &ALL_DIRECTIONS),
    })
}

fn reaches_by_step(from: Square, target: Square, offsets: &[(i8, i8)]) -> bool {
    offsets
        .iter()
        .any(|&(rows, cols)| from.offset(rows, cols) == Some(target))
}

fn reaches_by_ray(board: &Board, from: Square, target: Square, dirs: &[(i8, i8)]) -> bool {
    for &(rows, cols) in dirs {
        let mut square = from;
        while let Some(next) = square.offset(rows, cols) {
            if next == target {
                return true;
            }
            if board.piece_at(next).is_some() {
                break;
            }
            square = next;
        }
    }
    false
}

fn step_moves(board: &Board, from: Square, color: Color, offsets: &[(i8, i8)], out: &mut Vec<Move>) {
    for &(rows, cols) in offsets {
        let Some(to) = from.offset(rows, cols) else {
            continue;
        };
        match board.piece_at(to) {
            Some(piece) if piece.color == color => {}
            _ => out.push(Move::Normal { from, to }),
        }
    }
}

fn slide_moves(board: &Board, from: Square, color: Color, dirs: &[(i8, i8)], out: &mut Vec<Move>) {
    for &(rows, cols) in dirs {
        let mut square = from;
        while let Some(to) = square.offset(rows, cols) {
            match board.piece_at(to) {
                None => out.push(Move::Normal { from, to }),
                Some(piece) => {
                    if piece.color != color {
                        out.push(Move::Normal { from, to });
                    }
                    break;
                }
            }
            square = to;
        }
    }
}

fn pawn_moves(board: &Board, from: Square, color: Color, has_moved: bool, out: &mut Vec<Move>) {
    let forward = color.forward();
    if let Some(single) = from.offset(forward, 0) {
        if board.piece_at(single).is_none() {
            push_pawn_advance(from, single, color, out);
            if !has_moved && from.row() == color.pawn_row() {
                if let Some(double) = single.offset(forward, 0) {
                    if board.piece_at(double).is_none() {
                        out.push(Move::DoublePawn { from, to: double });
                    }
                }
            }
        }
    }
    for cols in [1, -1] {
        let Some(to) = from.offset(forward, cols) else {
            continue;
        };
        match board.piece_at(to) {
            Some(piece) if piece.color != color => push_pawn_advance(from, to, color, out),
            Some(_) => {}
            None => {
                if board.pawn_skip(color.other()) == Some(to) {
                    out.push(Move::EnPassant { from, to });
                }
            }
        }
    }
}

/// A pawn move landing on the far rank expands into the four promotion
/// variants; anywhere else it is a normal move.
fn push_pawn_advance(from: Square, to: Square, color: Color, out: &mut Vec<Move>) {
    if to.row() == color.other().back_row() {
        for into in [
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::Queen,
        ] {
            out.push(Move::Promotion { from, to, into });
        }
    } else {
        out.push(Move::Normal { from, to });
    }
}

fn castle_moves(board: &Board, color: Color, out: &mut Vec<Move>) {
    for side in CastleSide::SIDES {
        if !board.castling_rights(color, side) {
            continue;
        }
        let row = color.back_row();
        let blocked = side
            .between_cols()
            .iter()
            .any(|&col| board.piece_at(Square::new(row, col).unwrap()).is_some());
        if blocked {
            continue;
        }
        out.push(match side {
            CastleSide::Kingside => Move::CastleKingside { color },
            CastleSide::Queenside => Move::CastleQueenside { color },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use board::Piece;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn initial_position_has_twenty_moves() {
        let board = Board::initial();
        assert_eq!(all_legal_moves(&board, Color::White).len(), 20);
        assert_eq!(all_legal_moves(&board, Color::Black).len(), 20);
    }

    #[test]
    fn knight_moves_from_the_corner() {
        let mut board = Board::empty();
        board.place(sq("e1"), Piece::new(PieceKind::King, Color::White));
        board.place(sq("e8"), Piece::new(PieceKind::King, Color::Black));
        board.place(sq("a1"), Piece::new(PieceKind::Knight, Color::White));
        let moves = legal_moves(&board, sq("a1"));
        assert_eq!(moves.len(), 2);
        let targets: Vec<Square> = moves.iter().map(Move::to).collect();
        assert!(targets.contains(&sq("b3")));
        assert!(targets.contains(&sq("c2")));
    }

    #[test]
    fn sliders_stop_at_the_first_occupied_square() {
        let mut board = Board::empty();
        board.place(sq("e1"), Piece::new(PieceKind::King, Color::White));
        board.place(sq("h8"), Piece::new(PieceKind::King, Color::Black));
        board.place(sq("a1"), Piece::new(PieceKind::Rook, Color::White));
        board.place(sq("a4"), Piece::new(PieceKind::Pawn, Color::Black));
        board.place(sq("c1"), Piece::new(PieceKind::Bishop, Color::White));
        let targets: Vec<Square> = legal_moves(&board, sq("a1")).iter().map(Move::to).collect();
        assert!(targets.contains(&sq("a4")), "capture ends the ray");
        assert!(!targets.contains(&sq("a5")), "no moving past a capture");
        assert!(targets.contains(&sq("b1")));
        assert!(!targets.contains(&sq("c1")), "own piece blocks");
    }

    #[test]
    fn pinned_piece_has_no_legal_moves() {
        let mut board = Board::empty();
        board.place(sq("e1"), Piece::new(PieceKind::King, Color::White));
        board.place(sq("e4"), Piece::new(PieceKind::Knight, Color::White));
        board.place(sq("e8"), Piece::new(PieceKind::Rook, Color::Black));
        board.place(sq("a8"), Piece::new(PieceKind::King, Color::Black));
        assert!(!pseudo_moves(&board, sq("e4")).is_empty());
        assert!(legal_moves(&board, sq("e4")).is_empty());
    }

    #[test]
    fn promotion_expands_into_four_variants() {
        let mut board = Board::empty();
        board.place(sq("e1"), Piece::new(PieceKind::King, Color::White));
        board.place(sq("h8"), Piece::new(PieceKind::King, Color::Black));
        board.place(sq("a7"), Piece::new(PieceKind::Pawn, Color::White));
        let moves = legal_moves(&board, sq("a7"));
        assert_eq!(moves.len(), 4);
        assert!(moves.iter().all(|mv| mv.promotion().is_some()));
    }

    #[test]
    fn en_passant_generated_only_against_the_skip_square() {
        let mut board = Board::empty();
        board.place(sq("e1"), Piece::new(PieceKind::King, Color::White));
        board.place(sq("a8"), Piece::new(PieceKind::King, Color::Black));
        board.place(sq("d5"), Piece::new(PieceKind::Pawn, Color::White));
        board.place(sq("e5"), Piece::new(PieceKind::Pawn, Color::Black));
        assert!(!legal_moves(&board, sq("d5"))
            .iter()
            .any(|mv| matches!(mv, Move::EnPassant { .. })));
        board.set_pawn_skip(Color::Black, sq("e6"));
        assert!(legal_moves(&board, sq("d5"))
            .iter()
            .any(|mv| matches!(mv, Move::EnPassant { .. })));
    }

    #[test]
    fn teleported_pawn_cannot_double_step() {
        let mut board = Board::empty();
        board.place(sq("e1"), Piece::new(PieceKind::King, Color::White));
        board.place(sq("h8"), Piece::new(PieceKind::King, Color::Black));
        board.place(
            sq("b2"),
            Piece {
                kind: PieceKind::Pawn,
                color: Color::White,
                has_moved: true,
            },
        );
        assert!(!legal_moves(&board, sq("b2"))
            .iter()
            .any(|mv| matches!(mv, Move::DoublePawn { .. })));
    }

    #[test]
    fn castles_generated_when_path_is_clear() {
        let mut board = Board::initial();
        let king_moves = pseudo_moves(&board, sq("e1"));
        assert!(!king_moves
            .iter()
            .any(|mv| matches!(mv, Move::CastleKingside { .. })));
        board.clear(sq("f1"));
        board.clear(sq("g1"));
        let king_moves = pseudo_moves(&board, sq("e1"));
        assert!(king_moves
            .iter()
            .any(|mv| matches!(mv, Move::CastleKingside { .. })));
    }

    use quickcheck::quickcheck;

    quickcheck! {
        fn random_playouts_never_leave_the_mover_in_check(seed: u64) -> bool {
            use rand::{rngs::SmallRng, Rng, SeedableRng};

            let mut rng = SmallRng::seed_from_u64(seed);
            let mut board = Board::initial();
            let mut mover = Color::White;
            for _ in 0..80 {
                let moves = all_legal_moves(&board, mover);
                if moves.is_empty() {
                    break;
                }
                let mv = moves[rng.gen_range(0..moves.len())];
                mv.execute(&mut board).unwrap();
                assert!(
                    !board.is_in_check(mover),
                    "seed {seed}: {mv:?} left {mover} in check\n{board}"
                );
                board.clear_pawn_skip(mover.other());
                if !matches!(mv, Move::DoublePawn { .. }) {
                    board.clear_pawn_skip(mover);
                }
                mover = mover.other();
            }
            true
        }
    }
}
