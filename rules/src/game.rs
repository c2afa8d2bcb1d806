use std::collections::HashMap;

use board::{Color, Piece, Square};

use crate::grid::{Board, CastleSide};
use crate::movegen;
use crate::moves::{Move, MoveEffect};
use crate::{Error, Result};

/// Why a game ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOverReason {
    Checkmate,
    Stalemate,
    FiftyMoveRule,
    ThreefoldRepetition,
    InsufficientMaterial,
    Timeout,
}

/// The outcome of a finished game
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameResult {
    /// `None` for a draw
    pub winner: Option<Color>,
    pub reason: GameOverReason,
}

/// What [`GameState::apply_move`] did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedMove {
    /// The piece that was captured, if any
    pub captured: Option<Piece>,
    /// Whether the half-move clock and repetition history were reset
    pub reset_clock: bool,
    /// Whether the turn passed to the other player
    ///
    /// False exactly when a pending extra-move effect was consumed.
    pub turn_passed: bool,
}

/// The turn/result state machine
///
/// Owns the live board, the player to move, the half-move clock, and the
/// repetition history. Once a result is set the state is terminal: every
/// further mutation is rejected and only read queries remain.
#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    active: Color,
    result: Option<GameResult>,
    halfmove_clock: u32,
    repetition: HashMap<String, u32>,
}

impl GameState {
    /// A fresh game from the standard starting position, white to move
    pub fn new() -> Self {
        Self::with_board(Board::initial(), Color::White)
    }

    /// A game from an arbitrary position
    pub fn with_board(board: Board, active: Color) -> Self {
        let mut state = Self {
            board,
            active,
            result: None,
            halfmove_clock: 0,
            repetition: HashMap::new(),
        };
        let signature = state.signature();
        state.repetition.insert(signature, 1);
        state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access for card effects
    ///
    /// Card handlers validate their own preconditions (including the cloned
    /// self-check simulation) before touching the board through this.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Whose turn it is
    pub fn active(&self) -> Color {
        self.active
    }

    /// The terminal result, if the game is over
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    /// Whether the player to move is in check
    pub fn is_check(&self) -> bool {
        self.board.is_in_check(self.active)
    }

    /// Half-moves since the last capture or pawn move
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Apply a move for the active player
    ///
    /// With `keep_turn` the turn does not alternate afterwards; that is the
    /// one-shot effect of a granted extra move. Everything the turn machine
    /// owns is updated here: pawn-skip expiry, the half-move clock, the
    /// repetition history, and terminal detection.
    pub fn apply_move(&mut self, mv: &Move, keep_turn: bool) -> Result<AppliedMove> {
        if self.result.is_some() {
            return Err(Error::GameFinished);
        }
        mv.is_legal(&self.board, self.active)?;
        let effect = mv.execute(&mut self.board)?;
        self.expire_pawn_skips(mv);
        self.advance_clocks(&effect);
        if !keep_turn {
            self.active = self.active.other();
        }
        let signature = self.signature();
        *self.repetition.entry(signature).or_insert(0) += 1;
        self.evaluate_game_over();
        Ok(AppliedMove {
            captured: effect.captured,
            reset_clock: effect.resets_clock(),
            turn_passed: !keep_turn,
        })
    }

    /// Apply a card-exclusive pseudo-move (teleport, piece swap) for `mover`
    ///
    /// Runs the full legality rule but none of the turn bookkeeping; whether
    /// the card ends the turn is the card's own business, settled through
    /// [`GameState::pass_turn`].
    pub fn apply_effect_move(&mut self, mv: &Move, mover: Color) -> Result<()> {
        if self.result.is_some() {
            return Err(Error::GameFinished);
        }
        mv.is_legal(&self.board, mover)?;
        mv.execute(&mut self.board)?;
        Ok(())
    }

    /// Hand the turn to the other player and re-evaluate termination
    ///
    /// Used by card effects that end the activator's turn without a move
    /// being made.
    pub fn pass_turn(&mut self) {
        if self.result.is_some() {
            return;
        }
        self.active = self.active.other();
        self.evaluate_game_over();
    }

    /// End the game because `loser` ran out of time
    pub fn flag_timeout(&mut self, loser: Color) {
        if self.result.is_none() {
            self.result = Some(GameResult {
                winner: Some(loser.other()),
                reason: GameOverReason::Timeout,
            });
        }
    }

    /// Re-evaluate the termination conditions for the player to move
    ///
    /// Also called after card effects that changed the board, since a
    /// teleport or revival can deliver mate just as a move can.
    pub fn evaluate_game_over(&mut self) {
        if self.result.is_some() {
            return;
        }
        if !movegen::has_legal_move(&self.board, self.active) {
            self.result = Some(if self.board.is_in_check(self.active) {
                GameResult {
                    winner: Some(self.active.other()),
                    reason: GameOverReason::Checkmate,
                }
            } else {
                GameResult {
                    winner: None,
                    reason: GameOverReason::Stalemate,
                }
            });
        } else if self.halfmove_clock >= 100 {
            self.result = Some(GameResult {
                winner: None,
                reason: GameOverReason::FiftyMoveRule,
            });
        } else if self.repetition.get(&self.signature()).copied().unwrap_or(0) >= 3 {
            self.result = Some(GameResult {
                winner: None,
                reason: GameOverReason::ThreefoldRepetition,
            });
        } else if self.board.insufficient_material() {
            self.result = Some(GameResult {
                winner: None,
                reason: GameOverReason::InsufficientMaterial,
            });
        }
    }

    /// A FEN-like signature of the position: placement, player to move,
    /// derived castling rights, and both en-passant targets
    pub fn signature(&self) -> String {
        let skip = |color: Color| match self.board.pawn_skip(color) {
            Some(square) => square.to_string(),
            None => "-".to_owned(),
        };
        let mut castles = String::with_capacity(4);
        for (color, letters) in [(Color::White, ['K', 'Q']), (Color::Black, ['k', 'q'])] {
            for (side, letter) in CastleSide::SIDES.into_iter().zip(letters) {
                if self.board.castling_rights(color, side) {
                    castles.push(letter);
                }
            }
        }
        if castles.is_empty() {
            castles.push('-');
        }
        format!(
            "{} {} {} {} {}",
            self.board.fen_placement(),
            match self.active {
                Color::White => 'w',
                Color::Black => 'b',
            },
            castles,
            skip(Color::White),
            skip(Color::Black),
        )
    }

    /// The mover's en-passant target survives only their own double pawn
    /// move; the opponent's target expires as soon as the mover has moved.
    fn expire_pawn_skips(&mut self, mv: &Move) {
        self.board.clear_pawn_skip(self.active.other());
        if !matches!(mv, Move::DoublePawn { .. }) {
            self.board.clear_pawn_skip(self.active);
        }
    }

    fn advance_clocks(&mut self, effect: &MoveEffect) {
        if effect.resets_clock() {
            // Positions from before a capture or pawn move can never repeat
            self.halfmove_clock = 0;
            self.repetition.clear();
        } else {
            self.halfmove_clock += 1;
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use board::{Piece, PieceKind};

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn normal(from: &str, to: &str) -> Move {
        Move::Normal {
            from: sq(from),
            to: sq(to),
        }
    }

    fn double(from: &str, to: &str) -> Move {
        Move::DoublePawn {
            from: sq(from),
            to: sq(to),
        }
    }

    #[test]
    fn opening_pawn_move_passes_the_turn() {
        let mut game = GameState::new();
        let applied = game.apply_move(&double("e2", "e4"), false).unwrap();
        assert!(applied.turn_passed);
        assert_eq!(
            game.board().piece_at(sq("e4")).map(|piece| (piece.kind, piece.color)),
            Some((PieceKind::Pawn, Color::White))
        );
        assert_eq!(game.active(), Color::Black);
        assert_eq!(game.result(), None);
    }

    #[test]
    fn keep_turn_suppresses_alternation_once() {
        let mut game = GameState::new();
        let applied = game.apply_move(&double("e2", "e4"), true).unwrap();
        assert!(!applied.turn_passed);
        assert_eq!(game.active(), Color::White);
        game.apply_move(&double("d2", "d4"), false).unwrap();
        assert_eq!(game.active(), Color::Black);
    }

    #[test]
    fn moving_for_the_opponent_is_rejected() {
        let mut game = GameState::new();
        assert_eq!(
            game.apply_move(&double("e7", "e5"), false),
            Err(Error::OpponentPiece(sq("e7")))
        );
    }

    #[test]
    fn opponents_skip_square_expires_after_one_move() {
        let mut game = GameState::new();
        game.apply_move(&double("e2", "e4"), false).unwrap();
        assert_eq!(game.board().pawn_skip(Color::White), Some(sq("e3")));
        game.apply_move(&normal("a7", "a6"), false).unwrap();
        assert_eq!(game.board().pawn_skip(Color::White), None);
    }

    #[test]
    fn en_passant_full_scenario() {
        let mut game = GameState::new();
        game.apply_move(&double("d2", "d4"), false).unwrap();
        game.apply_move(&normal("a7", "a6"), false).unwrap();
        game.apply_move(&normal("d4", "d5"), false).unwrap();
        game.apply_move(&double("e7", "e5"), false).unwrap();
        let mv = Move::EnPassant {
            from: sq("d5"),
            to: sq("e6"),
        };
        let applied = game.apply_move(&mv, false).unwrap();
        assert_eq!(
            applied.captured.map(|piece| piece.kind),
            Some(PieceKind::Pawn)
        );
        assert!(game.board().piece_at(sq("e5")).is_none());
        assert_eq!(
            game.board().piece_at(sq("e6")).map(|piece| piece.kind),
            Some(PieceKind::Pawn)
        );
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut game = GameState::new();
        game.apply_move(&normal("f2", "f3"), false).unwrap();
        game.apply_move(&double("e7", "e5"), false).unwrap();
        game.apply_move(&double("g2", "g4"), false).unwrap();
        game.apply_move(&normal("d8", "h4"), false).unwrap();
        assert_eq!(
            game.result(),
            Some(GameResult {
                winner: Some(Color::Black),
                reason: GameOverReason::Checkmate,
            })
        );
        assert_eq!(
            game.apply_move(&normal("a2", "a3"), false),
            Err(Error::GameFinished)
        );
    }

    #[test]
    fn bare_kings_stalemate() {
        let mut board = Board::empty();
        board.place(sq("a8"), Piece::new(PieceKind::King, Color::Black));
        board.place(sq("b6"), Piece::new(PieceKind::King, Color::White));
        board.place(sq("c7"), Piece::new(PieceKind::Queen, Color::White));
        let mut game = GameState::with_board(board, Color::Black);
        game.evaluate_game_over();
        assert_eq!(
            game.result(),
            Some(GameResult {
                winner: None,
                reason: GameOverReason::Stalemate,
            })
        );
    }

    #[test]
    fn threefold_repetition_draws_at_three_not_two() {
        let mut game = GameState::new();
        let shuffle = [
            normal("g1", "f3"),
            normal("g8", "f6"),
            normal("f3", "g1"),
            normal("f6", "g8"),
        ];
        // Once around: the initial position has now occurred twice
        for mv in &shuffle {
            game.apply_move(mv, false).unwrap();
        }
        assert_eq!(game.result(), None);
        // Twice around: three occurrences, draw
        for mv in &shuffle {
            game.apply_move(mv, false).unwrap();
        }
        assert_eq!(
            game.result(),
            Some(GameResult {
                winner: None,
                reason: GameOverReason::ThreefoldRepetition,
            })
        );
    }

    #[test]
    fn capture_resets_the_repetition_history() {
        let mut game = GameState::new();
        game.apply_move(&double("e2", "e4"), false).unwrap();
        game.apply_move(&double("d7", "d5"), false).unwrap();
        game.apply_move(&normal("e4", "d5"), false).unwrap();
        assert_eq!(game.halfmove_clock(), 0);
        assert_eq!(game.repetition.len(), 1);
    }

    #[test]
    fn fifty_move_rule_draws_at_one_hundred_half_moves() {
        let mut board = Board::empty();
        board.place(sq("e1"), Piece::new(PieceKind::King, Color::White));
        board.place(sq("e8"), Piece::new(PieceKind::King, Color::Black));
        board.place(sq("a1"), Piece::new(PieceKind::Rook, Color::White));
        board.place(sq("h8"), Piece::new(PieceKind::Rook, Color::Black));
        let mut game = GameState::with_board(board, Color::White);
        game.halfmove_clock = 99;
        game.apply_move(&normal("a1", "a2"), false).unwrap();
        assert_eq!(
            game.result(),
            Some(GameResult {
                winner: None,
                reason: GameOverReason::FiftyMoveRule,
            })
        );
    }

    #[test]
    fn capture_into_insufficient_material_draws() {
        let mut board = Board::empty();
        board.place(sq("e1"), Piece::new(PieceKind::King, Color::White));
        board.place(sq("c3"), Piece::new(PieceKind::Knight, Color::White));
        board.place(sq("e8"), Piece::new(PieceKind::King, Color::Black));
        board.place(sq("d5"), Piece::new(PieceKind::Pawn, Color::Black));
        let mut game = GameState::with_board(board, Color::White);
        game.apply_move(&normal("c3", "d5"), false).unwrap();
        assert_eq!(
            game.result(),
            Some(GameResult {
                winner: None,
                reason: GameOverReason::InsufficientMaterial,
            })
        );
    }

    #[test]
    fn pass_turn_detects_mate_delivered_by_a_card_effect() {
        let mut board = Board::empty();
        board.place(sq("a8"), Piece::new(PieceKind::King, Color::Black));
        board.place(sq("b6"), Piece::new(PieceKind::King, Color::White));
        board.place(sq("h1"), Piece::new(PieceKind::Rook, Color::White));
        let mut game = GameState::with_board(board, Color::White);
        let mv = Move::Teleport {
            from: sq("h1"),
            to: sq("h8"),
        };
        game.apply_effect_move(&mv, Color::White).unwrap();
        game.pass_turn();
        assert_eq!(
            game.result(),
            Some(GameResult {
                winner: Some(Color::White),
                reason: GameOverReason::Checkmate,
            })
        );
    }
}
