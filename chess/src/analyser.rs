//! Entry point of the legality core

use crate::attack;
use crate::bitboard::Bitboard;
use crate::board::{Board, PieceId};
use crate::castling;
use crate::legal::{self, MoveSet};
use crate::reach::{Reach, StandardReach};
use crate::types::{CastlingSide, Color, Coord};

use thiserror::Error;

/// Error raised when the board is not in a state the analyser can work with
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum Error {
    /// The side has no live king
    #[error("no live king of color {0:?}")]
    NoKing(Color),
    /// A pawn moves diagonally onto an empty square, but there is nothing to take en passant
    #[error("no piece to take en passant on {0}")]
    MissingEnpassantVictim(Coord),
    /// Geometry reported a target occupied by a piece of the same side
    #[error("piece on {src} targets its own piece on {dst}")]
    InvalidTarget { src: Coord, dst: Coord },
}

/// Legality analyser over a board
///
/// The analyser borrows the board mutably for its whole lifetime, as enumerating legal moves
/// simulates each candidate on the board itself. Every simulated move is reverted before the
/// call returns, so the board is observed unchanged afterwards.
///
/// # Example
///
/// ```
/// # use arbiter::{analyser::Analyser, board::Board, types::Color};
/// #
/// let mut board = Board::initial();
/// let mut analyser = Analyser::new(&mut board);
/// assert!(!analyser.is_king_attacked(Color::White).unwrap());
/// assert_eq!(analyser.legal_moves(Color::White).unwrap().move_count(), 20);
/// ```
pub struct Analyser<'a, R = StandardReach> {
    board: &'a mut Board,
    reach: R,
}

impl<'a> Analyser<'a, StandardReach> {
    /// Creates the analyser with orthodox piece geometry
    pub fn new(board: &'a mut Board) -> Self {
        Analyser {
            board,
            reach: StandardReach,
        }
    }
}

impl<'a, R: Reach> Analyser<'a, R> {
    pub fn with_reach(board: &'a mut Board, reach: R) -> Self {
        Analyser { board, reach }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        self.board
    }

    #[inline]
    pub fn reach(&self) -> &R {
        &self.reach
    }

    /// Returns the squares attacked by the live pieces of color `c`
    ///
    /// The king of color `c` counts only if `include_king` is set. Check detection leaves it out,
    /// while castling takes it into account.
    pub fn controlled_squares(&self, c: Color, include_king: bool) -> Bitboard {
        attack::controlled_squares(self.board, &self.reach, c, include_king)
    }

    /// Returns `true` if the king of color `c` is attacked
    pub fn is_king_attacked(&self, c: Color) -> Result<bool, Error> {
        attack::is_king_attacked(self.board, &self.reach, c)
    }

    /// Returns the square of the king of color `c` if it is attacked
    pub fn check_square(&self, c: Color) -> Result<Option<Coord>, Error> {
        attack::check_square(self.board, &self.reach, c)
    }

    /// Returns all the legal moves of color `c`
    ///
    /// An empty result is not an error: it means checkmate or stalemate, depending on
    /// [`Analyser::is_king_attacked()`].
    pub fn legal_moves(&mut self, c: Color) -> Result<MoveSet, Error> {
        self.legal_moves_with(c, None)
    }

    /// Same as [`Analyser::legal_moves()`], but reuses a known answer to
    /// [`Analyser::is_king_attacked()`]
    pub fn legal_moves_with(
        &mut self,
        c: Color,
        king_attacked: Option<bool>,
    ) -> Result<MoveSet, Error> {
        legal::legal_moves(self.board, &self.reach, c, king_attacked)
    }

    /// Returns `true` if the king and some rook towards `side` have never moved
    ///
    /// Neither attacked nor occupied squares are considered, use [`Analyser::legal_moves()`]
    /// to learn whether castling is possible right now.
    pub fn can_castle(&self, c: Color, side: CastlingSide) -> bool {
        castling::can_castle(self.board, c, side)
    }

    /// Returns the rook the king of color `c` would castle with towards `side`
    pub fn castle_rook(&self, c: Color, side: CastlingSide) -> Option<PieceId> {
        castling::find_rook(self.board, c, side)
    }
}
