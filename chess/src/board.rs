//! Board and related things

use crate::bitboard::Bitboard;
use crate::castling;
use crate::geometry::{self, MAX_PIECES};
use crate::types::{
    self, CastlingRights, CastlingSide, Color, Coord, CoordParseError, File, Piece, Rank,
};

use std::fmt::{self, Display};
use std::num::ParseIntError;
use std::str::FromStr;

use arrayvec::ArrayVec;
use thiserror::Error;

/// FEN of the standard initial position
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Board validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// Too many pieces of given color
    ///
    /// No more than 16 pieces of each color is allowed.
    #[error("too many pieces of color {0:?}")]
    TooManyPieces(Color),
    /// One of the sides doesn't have a king
    #[error("no king of color {0:?}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
    /// There is a pawn on the 1th or on the 8th rank
    #[error("invalid pawn position {0}")]
    InvalidPawn(Coord),
}

/// Error parsing the first part of FEN (i.e. the positions of pieces on the board)
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CellsParseError {
    /// Rank is too large
    #[error("too many items in rank {0}")]
    RankOverflow(Rank),
    /// Rank is too small
    #[error("not enough items in rank {0}")]
    RankUnderflow(Rank),
    /// Too many ranks
    #[error("too many ranks")]
    Overflow,
    /// Not enough ranks
    #[error("not enough ranks")]
    Underflow,
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

/// Error parsing the fields of FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RawFenParseError {
    /// FEN contains non-ASCII characters
    #[error("non-ASCII data in FEN")]
    NonAscii,
    /// FEN doesn't have board part
    #[error("board not specified")]
    NoBoard,
    /// Error parsing board from FEN
    #[error("bad board: {0}")]
    Board(#[from] CellsParseError),
    /// FEN doesn't have move side part
    #[error("no move side")]
    NoMoveSide,
    /// Error parsing move side from FEN
    #[error("bad move side: {0}")]
    MoveSide(#[from] types::ColorParseError),
    /// FEN doesn't have castling rights part
    #[error("no castling rights")]
    NoCastling,
    /// Error parsing castling rights from FEN
    #[error("bad castling rights: {0}")]
    Castling(#[from] types::CastlingRightsParseError),
    /// FEN doesn't have enpassant part
    #[error("no enpassant")]
    NoEnpassant,
    /// Error parsing enpassant from FEN
    #[error("bad enpassant: {0}")]
    Enpassant(#[from] CoordParseError),
    /// Enpassant rank is invalid
    #[error("invalid enpassant rank {0}")]
    InvalidEnpassantRank(Rank),
    /// Error parsing move counter
    #[error("bad move counter: {0}")]
    MoveCounter(ParseIntError),
    /// Error parsing move number
    #[error("bad move number: {0}")]
    MoveNumber(ParseIntError),
    /// FEN contains extra data
    #[error("extra data in FEN")]
    ExtraData,
}

/// Error parsing [`Board`] from FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum FenParseError {
    /// Board cannot be parsed
    #[error("cannot parse fen: {0}")]
    Fen(#[from] RawFenParseError),
    /// Board was parsed, but it's invalid
    #[error("invalid position: {0}")]
    Valid(#[from] ValidateError),
}

/// Error applying a move with [`Board::play()`]
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum PlayError {
    #[error("no piece on {0}")]
    EmptySource(Coord),
    #[error("piece on {0} doesn't belong to the side to move")]
    WrongSide(Coord),
    #[error("cannot capture own piece on {0}")]
    OwnCapture(Coord),
    #[error("no rook to castle with towards {0}")]
    NoCastlingRook(Coord),
    #[error("no pawn to take en passant on {0}")]
    NoEnpassantVictim(Coord),
    #[error("promotion piece required for move to {0}")]
    PromotionRequired(Coord),
    #[error("cannot promote to {0}")]
    InvalidPromotion(Piece),
    #[error("promotion is only allowed for a pawn reaching the last rank")]
    UnexpectedPromotion,
}

/// Stable identifier of a piece
///
/// Identifiers index the piece arena of the [`Board`] which created them. A piece keeps its
/// identifier for the whole game, also after it was captured.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceId(u8);

impl PieceId {
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// State of a single piece
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PieceRecord {
    pub color: Color,
    pub kind: Piece,
    /// Current square. Meaningful only while the piece is alive.
    pub coord: Coord,
    /// Set once the piece makes its first move, never reset
    pub has_moved: bool,
    /// Captured pieces are kept in the arena, marked as dead
    pub is_dead: bool,
}

/// Kind of a move applied by [`Board::play()`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal,
    Enpassant,
    Castling(CastlingSide),
    Promotion(Piece),
}

/// Result of [`Board::play()`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PlayedMove {
    pub piece: PieceId,
    pub src: Coord,
    pub dst: Coord,
    pub captured: Option<PieceId>,
    pub kind: MoveKind,
}

type Cells = [Option<(Color, Piece)>; Coord::COUNT];

/// Chess board
///
/// The board owns the square grid and the arena of all the pieces ever placed on it. Pieces
/// are created once, when the board is built, and then mutated in place: captured pieces are
/// only marked as dead, so they can be brought back while the analyser simulates moves.
///
/// The board itself knows nothing about how pieces move. Movement geometry is provided by
/// [`Reach`](crate::reach::Reach), and legality by [`Analyser`](crate::analyser::Analyser).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    pieces: ArrayVec<PieceRecord, { 2 * MAX_PIECES }>,
    cells: [Option<PieceId>; Coord::COUNT],
    side: Color,
    ep_victim: Option<PieceId>,
    move_counter: u16,
    move_number: u16,
}

impl Board {
    /// Returns a board with the initial position
    pub fn initial() -> Board {
        let mut cells: Cells = [None; Coord::COUNT];
        let back = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, kind) in File::iter().zip(back) {
            for color in [Color::White, Color::Black] {
                let pawn = Coord::from_parts(file, geometry::pawn_home_rank(color));
                let piece = Coord::from_parts(file, geometry::castling_rank(color));
                cells[pawn.index()] = Some((color, Piece::Pawn));
                cells[piece.index()] = Some((color, kind));
            }
        }
        Board::build(&cells, Color::White, CastlingRights::FULL, None, 0, 1)
    }

    /// Parses a board from FEN
    ///
    /// Does the same as [`Board::from_str`]. It is recommended to use this function instead of
    /// `from_str()` for better readability.
    ///
    /// FEN doesn't store whether the pieces have moved, so it is derived: pawns outside of their
    /// initial rank have moved, kings and rooks are unmoved only if the castling rights allow it.
    pub fn from_fen(fen: &str) -> Result<Board, FenParseError> {
        Board::from_str(fen)
    }

    fn build(
        cells: &Cells,
        side: Color,
        castling: CastlingRights,
        ep_dest: Option<Coord>,
        move_counter: u16,
        move_number: u16,
    ) -> Board {
        let mut board = Board {
            pieces: ArrayVec::new(),
            cells: [None; Coord::COUNT],
            side,
            ep_victim: None,
            move_counter,
            move_number,
        };
        let castling_rooks = castling_rooks(cells, castling);
        for coord in Coord::iter() {
            let (color, kind) = match cells[coord.index()] {
                Some(cell) => cell,
                None => continue,
            };
            let has_moved = match kind {
                Piece::Pawn => coord.rank() != geometry::pawn_home_rank(color),
                Piece::King => {
                    coord.rank() != geometry::castling_rank(color) || !castling.has_any(color)
                }
                Piece::Rook => !castling_rooks.has(coord),
                Piece::Knight | Piece::Bishop | Piece::Queen => false,
            };
            let id = PieceId(board.pieces.len() as u8);
            board.pieces.push(PieceRecord {
                color,
                kind,
                coord,
                has_moved,
                is_dead: false,
            });
            board.cells[coord.index()] = Some(id);
        }
        if let Some(dst) = ep_dest {
            let victim = dst.shift(0, -side.forward()).and_then(|c| board.id_at(c));
            board.ep_victim = victim.filter(|&id| {
                let p = board.piece(id);
                p.color == side.inv() && p.kind == Piece::Pawn && board.id_at(dst).is_none()
            });
        }
        board
    }

    /// Returns the piece with identifier `id`
    #[inline]
    pub fn piece(&self, id: PieceId) -> &PieceRecord {
        &self.pieces[id.index()]
    }

    /// Returns the identifier of the piece standing on `c`
    #[inline]
    pub fn id_at(&self, c: Coord) -> Option<PieceId> {
        self.cells[c.index()]
    }

    /// Returns the piece standing on `c`
    #[inline]
    pub fn piece_at(&self, c: Coord) -> Option<&PieceRecord> {
        self.id_at(c).map(|id| self.piece(id))
    }

    /// Iterates over all the live pieces of color `c`
    pub fn pieces(&self, c: Color) -> impl Iterator<Item = PieceId> + '_ {
        self.pieces
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.color == c && !p.is_dead)
            .map(|(i, _)| PieceId(i as u8))
    }

    /// Iterates over the whole arena, dead pieces included
    pub fn all_ids(&self) -> impl Iterator<Item = PieceId> {
        (0..self.pieces.len()).map(|i| PieceId(i as u8))
    }

    /// Returns the live king of color `c`
    pub fn king(&self, c: Color) -> Option<PieceId> {
        self.pieces(c).find(|&id| self.piece(id).kind == Piece::King)
    }

    /// Returns the set of occupied squares
    pub fn occupied(&self) -> Bitboard {
        Coord::iter()
            .filter(|c| self.cells[c.index()].is_some())
            .collect()
    }

    /// Returns side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    /// Returns the pawn that has just made a double step, if any
    #[inline]
    pub fn ep_victim(&self) -> Option<PieceId> {
        self.ep_victim
    }

    /// Returns the square passed over by the pawn that has just made a double step
    pub fn ep_square(&self) -> Option<Coord> {
        let victim = self.piece(self.ep_victim?);
        victim.coord.shift(0, -victim.color.forward())
    }

    /// Number of half-moves without pawn moves or captures
    #[inline]
    pub fn move_counter(&self) -> u16 {
        self.move_counter
    }

    /// Move number, incremented after each move by Black
    #[inline]
    pub fn move_number(&self) -> u16 {
        self.move_number
    }

    /// Moves the piece `id` to `dst`, without any checks
    ///
    /// The origin square is cleared only if it still holds this piece. Whatever stood on `dst`
    /// is overwritten, so captured pieces must be [killed](Board::kill) beforehand.
    pub fn relocate(&mut self, id: PieceId, dst: Coord) {
        self.lift(id);
        self.cells[dst.index()] = Some(id);
        self.pieces[id.index()].coord = dst;
    }

    /// Marks the piece `id` as dead and takes it off the board
    pub fn kill(&mut self, id: PieceId) {
        self.lift(id);
        self.pieces[id.index()].is_dead = true;
    }

    /// Marks the piece `id` as alive and puts it back to its recorded square
    pub fn revive(&mut self, id: PieceId) {
        let p = &mut self.pieces[id.index()];
        p.is_dead = false;
        self.cells[p.coord.index()] = Some(id);
    }

    fn lift(&mut self, id: PieceId) {
        let src = self.pieces[id.index()].coord;
        if self.cells[src.index()] == Some(id) {
            self.cells[src.index()] = None;
        }
    }

    /// Converts square keys (like `"e4"`) into a square set
    pub fn keys_to_squares<'k, I>(keys: I) -> Result<Bitboard, CoordParseError>
    where
        I: IntoIterator<Item = &'k str>,
    {
        keys.into_iter().map(Coord::from_str).collect()
    }

    /// Converts a square set into square keys, in ascending order
    pub fn squares_to_keys(squares: Bitboard) -> Vec<String> {
        squares.into_iter().map(|c| c.to_string()).collect()
    }

    /// Applies the move from `src` to `dst`
    ///
    /// The move is expected to be legal, this function only verifies that it can be applied
    /// consistently. Castling is recognized either by a king step longer than one file or by a king
    /// landing on its own rook; in both cases the king and the rook end up on their usual castling
    /// squares. `promote` must be set exactly when a pawn reaches the last rank.
    pub fn play(
        &mut self,
        src: Coord,
        dst: Coord,
        promote: Option<Piece>,
    ) -> Result<PlayedMove, PlayError> {
        let id = self.id_at(src).ok_or(PlayError::EmptySource(src))?;
        let PieceRecord { color, kind, .. } = *self.piece(id);
        if color != self.side {
            return Err(PlayError::WrongSide(src));
        }
        let reaches_last_rank = kind == Piece::Pawn && dst.rank() == geometry::promote_rank(color);
        if promote.is_some() && !reaches_last_rank {
            return Err(PlayError::UnexpectedPromotion);
        }

        let target = self.id_at(dst);
        let own_target = target.filter(|&t| self.piece(t).color == color);
        let onto_own_rook = own_target.map_or(false, |t| self.piece(t).kind == Piece::Rook);
        if kind == Piece::King && (onto_own_rook || src.x().abs_diff(dst.x()) > 1) {
            return self.play_castling(id, src, dst);
        }
        if own_target.is_some() {
            return Err(PlayError::OwnCapture(dst));
        }

        let mut captured = target;
        let mut move_kind = MoveKind::Normal;
        if kind == Piece::Pawn && target.is_none() && src.file() != dst.file() {
            let behind = dst.shift(0, -color.forward());
            let victim = self
                .ep_victim
                .filter(|&v| Some(self.piece(v).coord) == behind)
                .ok_or(PlayError::NoEnpassantVictim(dst))?;
            captured = Some(victim);
            move_kind = MoveKind::Enpassant;
        }
        let promoted = match (reaches_last_rank, promote) {
            (false, _) => None,
            (true, None) => return Err(PlayError::PromotionRequired(dst)),
            (true, Some(p @ (Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen))) => {
                Some(p)
            }
            (true, Some(p)) => return Err(PlayError::InvalidPromotion(p)),
        };

        if let Some(victim) = captured {
            self.kill(victim);
        }
        self.relocate(id, dst);
        let p = &mut self.pieces[id.index()];
        p.has_moved = true;
        if let Some(promoted) = promoted {
            p.kind = promoted;
            move_kind = MoveKind::Promotion(promoted);
        }
        self.ep_victim = if kind == Piece::Pawn && src.y().abs_diff(dst.y()) == 2 {
            Some(id)
        } else {
            None
        };
        self.finish_move(kind == Piece::Pawn || captured.is_some());

        Ok(PlayedMove {
            piece: id,
            src,
            dst,
            captured,
            kind: move_kind,
        })
    }

    fn play_castling(
        &mut self,
        king: PieceId,
        src: Coord,
        dst: Coord,
    ) -> Result<PlayedMove, PlayError> {
        let color = self.piece(king).color;
        let side = if dst.x() > src.x() {
            CastlingSide::King
        } else {
            CastlingSide::Queen
        };
        let rook = match self.id_at(dst) {
            Some(r) if self.piece(r).color == color && self.piece(r).kind == Piece::Rook => r,
            _ => castling::find_rook(self, color, side).ok_or(PlayError::NoCastlingRook(dst))?,
        };
        let king_dst = Coord::from_parts(geometry::castling_king_file(side), src.rank());
        let rook_dst = Coord::from_parts(geometry::castling_rook_file(side), src.rank());

        // King and rook may pass over each other, so both are lifted before landing
        self.lift(king);
        self.lift(rook);
        self.relocate(king, king_dst);
        self.relocate(rook, rook_dst);
        self.pieces[king.index()].has_moved = true;
        self.pieces[rook.index()].has_moved = true;
        self.ep_victim = None;
        self.finish_move(false);

        Ok(PlayedMove {
            piece: king,
            src,
            dst,
            captured: None,
            kind: MoveKind::Castling(side),
        })
    }

    fn finish_move(&mut self, reset_counter: bool) {
        self.move_counter = if reset_counter {
            0
        } else {
            self.move_counter.saturating_add(1)
        };
        if self.side == Color::Black {
            self.move_number = self.move_number.saturating_add(1);
        }
        self.side = self.side.inv();
    }

    /// Returns the castling rights implied by unmoved kings and rooks
    pub fn castling_rights(&self) -> CastlingRights {
        let mut res = CastlingRights::EMPTY;
        for color in [Color::White, Color::Black] {
            for side in [CastlingSide::King, CastlingSide::Queen] {
                if castling::find_rook(self, color, side).is_some() {
                    res.set(color, side);
                }
            }
        }
        res
    }

    /// Converts the board into a FEN string
    ///
    /// Does the same as `Board::to_string()`. It is recommended to use this function instead of
    /// `to_string()` for better readability.
    #[inline]
    pub fn as_fen(&self) -> String {
        self.to_string()
    }
}

impl Default for Board {
    #[inline]
    fn default() -> Board {
        Board::initial()
    }
}

/// Finds the rooks that keep castling rights: for every allowed side, the outermost rook of
/// the king's color on its home rank
fn castling_rooks(cells: &Cells, castling: CastlingRights) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for color in [Color::White, Color::Black] {
        let rank = geometry::castling_rank(color);
        let at = |file: File| cells[Coord::from_parts(file, rank).index()];
        let king_file = match File::iter().find(|&f| at(f) == Some((color, Piece::King))) {
            Some(f) => f,
            None => continue,
        };
        for side in [CastlingSide::King, CastlingSide::Queen] {
            if !castling.has(color, side) {
                continue;
            }
            let mut files: Vec<File> = match side {
                CastlingSide::King => File::iter().filter(|&f| f > king_file).collect(),
                CastlingSide::Queen => File::iter().filter(|&f| f < king_file).collect(),
            };
            if side == CastlingSide::King {
                files.reverse();
            }
            if let Some(file) = files.into_iter().find(|&f| at(f) == Some((color, Piece::Rook))) {
                res.set(Coord::from_parts(file, rank));
            }
        }
    }
    res
}

fn validate(cells: &Cells) -> Result<(), ValidateError> {
    for color in [Color::White, Color::Black] {
        let owned = || cells.iter().flatten().filter(move |(c, _)| *c == color);
        if owned().count() > MAX_PIECES {
            return Err(ValidateError::TooManyPieces(color));
        }
        match owned().filter(|(_, p)| *p == Piece::King).count() {
            0 => return Err(ValidateError::NoKing(color)),
            1 => {}
            _ => return Err(ValidateError::TooManyKings(color)),
        }
    }
    for coord in Coord::iter() {
        if let Some((_, Piece::Pawn)) = cells[coord.index()] {
            if matches!(coord.rank(), Rank::R1 | Rank::R8) {
                return Err(ValidateError::InvalidPawn(coord));
            }
        }
    }
    Ok(())
}

fn parse_cells(s: &str) -> Result<Cells, CellsParseError> {
    type Error = CellsParseError;

    // FEN lists ranks from the eighth down to the first one
    let rank_at = |row: usize| Rank::from_index(7 - row).unwrap_or(Rank::R1);

    let mut file = 0_usize;
    let mut row = 0_usize;
    let mut cells: Cells = [None; Coord::COUNT];
    for b in s.bytes() {
        match b {
            b'1'..=b'8' => {
                let add = (b - b'0') as usize;
                if file + add > 8 {
                    return Err(Error::RankOverflow(rank_at(row)));
                }
                file += add;
            }
            b'/' => {
                if file < 8 {
                    return Err(Error::RankUnderflow(rank_at(row)));
                }
                row += 1;
                file = 0;
                if row >= 8 {
                    return Err(Error::Overflow);
                }
            }
            _ => {
                if file >= 8 {
                    return Err(Error::RankOverflow(rank_at(row)));
                }
                let ch = b as char;
                let kind = Piece::from_char(ch).ok_or(Error::UnexpectedChar(ch))?;
                let color = if ch.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                let coord = File::from_index(file)
                    .map(|f| Coord::from_parts(f, rank_at(row)))
                    .ok_or(Error::RankOverflow(rank_at(row)))?;
                cells[coord.index()] = Some((color, kind));
                file += 1;
            }
        };
    }

    if file < 8 {
        return Err(Error::RankUnderflow(rank_at(row)));
    }
    if row < 7 {
        return Err(Error::Underflow);
    }

    Ok(cells)
}

fn parse_ep_dest(s: &str, side: Color) -> Result<Option<Coord>, RawFenParseError> {
    if s == "-" {
        return Ok(None);
    }
    let dest = Coord::from_str(s)?;
    let expected = match side {
        Color::White => Rank::R6,
        Color::Black => Rank::R3,
    };
    if dest.rank() != expected {
        return Err(RawFenParseError::InvalidEnpassantRank(dest.rank()));
    }
    Ok(Some(dest))
}

impl FromStr for Board {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<Board, Self::Err> {
        type Error = RawFenParseError;

        if !s.is_ascii() {
            return Err(Error::NonAscii.into());
        }
        let mut iter = s.split(' ').fuse();

        let cells = parse_cells(iter.next().ok_or(Error::NoBoard)?).map_err(Error::from)?;
        let side = Color::from_str(iter.next().ok_or(Error::NoMoveSide)?).map_err(Error::from)?;
        let castling = CastlingRights::from_str(iter.next().ok_or(Error::NoCastling)?)
            .map_err(Error::from)?;
        let ep_dest = parse_ep_dest(iter.next().ok_or(Error::NoEnpassant)?, side)?;
        let move_counter = match iter.next() {
            Some(s) => u16::from_str(s).map_err(Error::MoveCounter)?,
            None => 0,
        };
        let move_number = match iter.next() {
            Some(s) => u16::from_str(s).map_err(Error::MoveNumber)?,
            None => 1,
        };

        if iter.next().is_some() {
            return Err(Error::ExtraData.into());
        }

        validate(&cells)?;
        Ok(Board::build(
            &cells,
            side,
            castling,
            ep_dest,
            move_counter,
            move_number,
        ))
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for (row, rank) in Rank::iter().rev().enumerate() {
            if row != 0 {
                write!(f, "/")?;
            }
            let mut empty = 0;
            for file in File::iter() {
                let p = match self.piece_at(Coord::from_parts(file, rank)) {
                    Some(p) => p,
                    None => {
                        empty += 1;
                        continue;
                    }
                };
                if empty != 0 {
                    write!(f, "{}", empty)?;
                    empty = 0;
                }
                write!(f, "{}", p.kind.fen_char(p.color))?;
            }
            if empty != 0 {
                write!(f, "{}", empty)?;
            }
        }
        write!(f, " {} {}", self.side, self.castling_rights())?;
        match self.ep_square() {
            Some(p) => write!(f, " {}", p)?,
            None => write!(f, " -")?,
        };
        write!(f, " {} {}", self.move_counter, self.move_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    #[test]
    fn test_initial() {
        assert_eq!(Board::initial().to_string(), INITIAL_FEN);
        assert_eq!(Board::from_fen(INITIAL_FEN), Ok(Board::initial()));
        let b = Board::initial();
        assert_eq!(b.pieces(Color::White).count(), 16);
        assert_eq!(b.pieces(Color::Black).count(), 16);
        assert_eq!(b.occupied().len(), 32);
        assert!(b.all_ids().all(|id| !b.piece(id).has_moved));
    }

    #[test]
    fn test_midgame() {
        const FEN: &str = "1rq1r1k1/1p3ppp/pB3n2/3ppP2/Pbb1P3/1PN2B2/2P2QPP/R1R4K w - - 1 21";

        let b = Board::from_fen(FEN).unwrap();
        assert_eq!(b.as_fen(), FEN);
        let bishop = b.piece_at(coord("b4")).unwrap();
        assert_eq!((bishop.color, bishop.kind), (Color::Black, Piece::Bishop));
        let king = b.piece(b.king(Color::White).unwrap());
        assert_eq!(king.coord, coord("h1"));
        assert!(king.has_moved);
        assert_eq!(b.side(), Color::White);
        assert_eq!(b.move_counter(), 1);
        assert_eq!(b.move_number(), 21);
    }

    #[test]
    fn test_castling_flags() {
        const FEN: &str = "r3k2r/8/8/8/8/8/8/R3K1R1 w Qkq - 0 1";

        let b = Board::from_fen(FEN).unwrap();
        assert!(!b.piece_at(coord("a1")).unwrap().has_moved);
        assert!(b.piece_at(coord("g1")).unwrap().has_moved);
        assert!(!b.piece_at(coord("e1")).unwrap().has_moved);
        assert!(!b.piece_at(coord("h8")).unwrap().has_moved);
        assert_eq!(b.as_fen(), FEN);

        let b = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1").unwrap();
        assert!(b.piece_at(coord("e1")).unwrap().has_moved);
        assert!(b.piece_at(coord("a8")).unwrap().has_moved);
        assert_eq!(b.castling_rights(), CastlingRights::EMPTY);
    }

    #[test]
    fn test_fixes() {
        // No black pawn in front of c6, so the enpassant field is dropped
        let b = Board::from_fen("r1bq1b1r/ppppkppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK1R1 w Q c6 6 5")
            .unwrap();
        assert_eq!(b.ep_victim(), None);
        assert_eq!(
            b.as_fen(),
            "r1bq1b1r/ppppkppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK1R1 w Q - 6 5"
        );

        let b = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        assert_eq!(b.ep_victim(), b.id_at(coord("d5")));
        assert_eq!(b.ep_square(), Some(coord("d6")));
    }

    #[test]
    fn test_invalid() {
        assert_eq!(
            Board::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenParseError::Valid(ValidateError::NoKing(Color::Black)))
        );
        assert_eq!(
            Board::from_fen("k6k/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenParseError::Valid(ValidateError::TooManyKings(Color::Black)))
        );
        assert_eq!(
            Board::from_fen("k7/8/8/8/8/8/8/P3K3 w - - 0 1"),
            Err(FenParseError::Valid(ValidateError::InvalidPawn(coord("a1"))))
        );
        assert_eq!(
            Board::from_fen("k7/8/8/8/PPPPPPPP/PPPPPPPP/1P6/4K3 w - - 0 1"),
            Err(FenParseError::Valid(ValidateError::TooManyPieces(Color::White)))
        );
        assert_eq!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - e4 0 1"),
            Err(FenParseError::Fen(RawFenParseError::InvalidEnpassantRank(
                Rank::R4
            )))
        );
        assert_eq!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K2X w - - 0 1"),
            Err(FenParseError::Fen(RawFenParseError::Board(
                CellsParseError::UnexpectedChar('X')
            )))
        );
    }

    #[test]
    fn test_incomplete() {
        assert_eq!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"),
            Err(FenParseError::Fen(RawFenParseError::NoMoveSide))
        );
        assert_eq!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w"),
            Err(FenParseError::Fen(RawFenParseError::NoCastling))
        );
        assert_eq!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq"),
            Err(FenParseError::Fen(RawFenParseError::NoEnpassant))
        );
        let b = Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -").unwrap();
        assert_eq!(b.move_counter(), 0);
        assert_eq!(b.move_number(), 1);
    }

    #[test]
    fn test_kill_revive() {
        let mut b = Board::initial();
        let before = b.clone();
        let knight = b.id_at(coord("g1")).unwrap();
        let pawn = b.id_at(coord("d7")).unwrap();
        b.kill(pawn);
        b.relocate(knight, coord("d7"));
        assert!(b.piece(pawn).is_dead);
        assert_eq!(b.id_at(coord("g1")), None);
        assert_eq!(b.id_at(coord("d7")), Some(knight));
        assert_eq!(b.pieces(Color::Black).count(), 15);

        b.relocate(knight, coord("g1"));
        b.revive(pawn);
        assert_eq!(b, before);
    }

    #[test]
    fn test_keys() {
        let squares = Board::keys_to_squares(["e4", "a1", "h8"]).unwrap();
        assert_eq!(squares.len(), 3);
        assert_eq!(Board::squares_to_keys(squares), vec!["a1", "e4", "h8"]);
        assert_eq!(
            Board::keys_to_squares(["e4", "z9"]),
            Err(CoordParseError::UnexpectedFileChar('z'))
        );
    }

    #[test]
    fn test_play() {
        let mut b = Board::initial();
        for (src, dst, fen) in [
            (
                "e2",
                "e4",
                "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            ),
            (
                "d7",
                "d5",
                "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2",
            ),
            (
                "e4",
                "d5",
                "rnbqkbnr/ppp1pppp/8/3P4/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 2",
            ),
            (
                "g8",
                "f6",
                "rnbqkb1r/ppp1pppp/5n2/3P4/8/8/PPPP1PPP/RNBQKBNR w KQkq - 1 3",
            ),
        ] {
            let mv = b.play(coord(src), coord(dst), None).unwrap();
            assert_eq!(mv.kind, MoveKind::Normal);
            assert_eq!(b.as_fen(), fen);
        }
        assert_eq!(b.pieces(Color::Black).count(), 15);
        assert_eq!(
            b.play(coord("e7"), coord("e5"), None),
            Err(PlayError::WrongSide(coord("e7")))
        );
    }

    #[test]
    fn test_play_enpassant() {
        let mut b = Board::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1").unwrap();
        b.play(coord("d7"), coord("d5"), None).unwrap();
        let victim = b.id_at(coord("d5")).unwrap();
        assert_eq!(b.ep_victim(), Some(victim));
        let mv = b.play(coord("e5"), coord("d6"), None).unwrap();
        assert_eq!(mv.kind, MoveKind::Enpassant);
        assert_eq!(mv.captured, Some(victim));
        assert!(b.piece(victim).is_dead);
        assert_eq!(b.as_fen(), "4k3/8/3P4/8/8/8/8/4K3 b - - 0 2");
    }

    #[test]
    fn test_play_castling() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";

        let mut b = Board::from_fen(fen).unwrap();
        let mv = b.play(coord("e1"), coord("g1"), None).unwrap();
        assert_eq!(mv.kind, MoveKind::Castling(CastlingSide::King));
        assert_eq!(b.as_fen(), "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");
        let mv = b.play(coord("e8"), coord("c8"), None).unwrap();
        assert_eq!(mv.kind, MoveKind::Castling(CastlingSide::Queen));
        assert_eq!(b.as_fen(), "2kr3r/8/8/8/8/8/8/R4RK1 w - - 2 2");

        // King landing on its own rook
        let mut b = Board::from_fen(fen).unwrap();
        b.play(coord("e1"), coord("a1"), None).unwrap();
        assert_eq!(b.as_fen(), "r3k2r/8/8/8/8/8/8/2KR3R b kq - 1 1");

        let mut b = Board::from_fen("4k3/8/8/8/8/8/8/RK6 w Q - 0 1").unwrap();
        b.play(coord("b1"), coord("a1"), None).unwrap();
        assert_eq!(b.as_fen(), "4k3/8/8/8/8/8/8/2KR4 b - - 1 1");
    }

    #[test]
    fn test_play_promotion() {
        let fen = "1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1";

        let mut b = Board::from_fen(fen).unwrap();
        assert_eq!(
            b.play(coord("a7"), coord("a8"), None),
            Err(PlayError::PromotionRequired(coord("a8")))
        );
        assert_eq!(
            b.play(coord("a7"), coord("a8"), Some(Piece::King)),
            Err(PlayError::InvalidPromotion(Piece::King))
        );
        assert_eq!(
            b.play(coord("e1"), coord("e2"), Some(Piece::Queen)),
            Err(PlayError::UnexpectedPromotion)
        );
        let mv = b.play(coord("a7"), coord("b8"), Some(Piece::Knight)).unwrap();
        assert_eq!(mv.kind, MoveKind::Promotion(Piece::Knight));
        assert!(mv.captured.is_some());
        assert_eq!(b.as_fen(), "1N2k3/8/8/8/8/8/8/4K3 b - - 0 1");
    }
}
