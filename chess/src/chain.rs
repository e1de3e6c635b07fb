//! Game record driven move by move

use crate::analyser::{self, Analyser};
use crate::board::{self, Board, PieceRecord, PlayError, PlayedMove};
use crate::geometry;
use crate::legal::MoveSet;
use crate::pgn::{PgnDumper, PgnGame, Variant};
use crate::reach::{Reach, StandardReach};
use crate::san::{self, MoveFlags, RenderError};
use crate::types::{CastlingSide, Color, Coord, Piece};

use std::str::FromStr;

use log::debug;
use thiserror::Error;

/// Error adding a move to [`GameRecord`]
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum PushError {
    #[error("game is already finished")]
    Finished,
    #[error("no piece on {0}")]
    NoPiece(Coord),
    #[error("piece on {0} doesn't belong to the side to move")]
    WrongSide(Coord),
    #[error("illegal move {src}{dst}")]
    Illegal { src: Coord, dst: Coord },
    #[error("promotion piece required for move to {0}")]
    PromotionRequired(Coord),
    #[error("bad UCI move {0:?}")]
    BadUci(String),
    #[error("cannot analyse position: {0}")]
    Analyse(#[from] analyser::Error),
    #[error("cannot render move: {0}")]
    Render(#[from] RenderError),
    #[error("cannot apply move: {0}")]
    Play(#[from] PlayError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot push UCI move #{}: {}", .pos + 1, .source)]
pub struct UciListError {
    pub pos: usize,
    pub source: PushError,
}

/// Game in progress
///
/// The record owns the board and the data needed to render the game into PGN. Each move is
/// checked against the legal moves of the side to move, written down in SAN and applied to the
/// board. After each move the record looks for checkmate and stalemate and finishes the game
/// when one of them is found.
#[derive(Debug, Clone)]
pub struct GameRecord<R = StandardReach> {
    board: Board,
    reach: R,
    game: PgnGame,
}

impl GameRecord<StandardReach> {
    pub fn new(board: Board, game: PgnGame) -> Self {
        GameRecord::with_reach(board, game, StandardReach)
    }

    pub fn new_initial() -> Self {
        GameRecord::new(Board::initial(), PgnGame::default())
    }

    /// Creates the record starting from the position given by `fen`
    ///
    /// Unless `fen` is the standard initial position, the game is marked as starting from
    /// a custom position.
    pub fn from_fen(fen: &str) -> Result<Self, board::FenParseError> {
        let board = Board::from_fen(fen)?;
        let mut game = PgnGame::default();
        if board != Board::initial() {
            game.variant = Variant::FromPosition;
            game.initial_fen = board.as_fen();
        }
        Ok(GameRecord::new(board, game))
    }

    pub fn from_uci_list(board: Board, uci_list: &str) -> Result<Self, UciListError> {
        let mut res = GameRecord::new(board, PgnGame::default());
        res.push_uci_list(uci_list)?;
        Ok(res)
    }
}

fn parse_uci(s: &str) -> Result<(Coord, Coord, Option<Piece>), PushError> {
    let bad = || PushError::BadUci(s.to_string());
    if !s.is_ascii() || !(4..=5).contains(&s.len()) {
        return Err(bad());
    }
    let src = Coord::from_str(&s[0..2]).map_err(|_| bad())?;
    let dst = Coord::from_str(&s[2..4]).map_err(|_| bad())?;
    let promote = match s[4..].chars().next() {
        None => None,
        Some(ch @ ('n' | 'b' | 'r' | 'q')) => Piece::from_char(ch),
        Some(_) => return Err(bad()),
    };
    Ok((src, dst, promote))
}

impl<R: Reach> GameRecord<R> {
    pub fn with_reach(board: Board, game: PgnGame, reach: R) -> Self {
        GameRecord { board, reach, game }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn game(&self) -> &PgnGame {
        &self.game
    }

    #[inline]
    pub fn game_mut(&mut self) -> &mut PgnGame {
        &mut self.game
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.game.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.game.moves.is_empty()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.game.finished
    }

    #[inline]
    pub fn winner(&self) -> Option<Color> {
        self.game.winner()
    }

    /// Returns the legal moves of the side to move
    pub fn legal_moves(&mut self) -> Result<MoveSet, analyser::Error> {
        let side = self.board.side();
        Analyser::with_reach(&mut self.board, &self.reach).legal_moves(side)
    }

    /// Returns `true` if the king of the side to move is attacked
    pub fn is_check(&mut self) -> Result<bool, analyser::Error> {
        let side = self.board.side();
        Analyser::with_reach(&mut self.board, &self.reach).is_king_attacked(side)
    }

    /// Rewrites a king move onto its own castling rook into the king's landing square
    ///
    /// Legal move sets hold the rook's square only when the king travels one file at most, so
    /// this is the only case where the rook's square is kept.
    fn castling_dst(&self, p: &PieceRecord, src: Coord, dst: Coord) -> Coord {
        if p.kind != Piece::King || p.has_moved {
            return dst;
        }
        let onto_rook = self.board.piece_at(dst).map_or(false, |t| {
            t.color == p.color && t.kind == Piece::Rook && !t.has_moved && dst.rank() == src.rank()
        });
        if !onto_rook {
            return dst;
        }
        let side = if dst.x() > src.x() {
            CastlingSide::King
        } else {
            CastlingSide::Queen
        };
        let king_dst = Coord::from_parts(geometry::castling_king_file(side), src.rank());
        if src.x().abs_diff(king_dst.x()) > 1 {
            king_dst
        } else {
            dst
        }
    }

    fn flags(&self, p: &PieceRecord, src: Coord, dst: Coord, promote: Option<Piece>) -> MoveFlags {
        let target = self.board.piece_at(dst);
        let onto_own_rook = target.map_or(false, |t| t.color == p.color && t.kind == Piece::Rook);
        let en_passant = p.kind == Piece::Pawn && src.file() != dst.file() && target.is_none();
        MoveFlags {
            capture: en_passant || target.map_or(false, |t| t.color != p.color),
            castling: p.kind == Piece::King && (onto_own_rook || src.x().abs_diff(dst.x()) > 1),
            en_passant,
            promotion: promote,
        }
    }

    /// Makes the move from `src` to `dst`
    ///
    /// `promote` must be set when a pawn reaches the last rank. Castling is given by the king's
    /// move, either to its landing square or onto the castling rook.
    pub fn push(
        &mut self,
        src: Coord,
        dst: Coord,
        promote: Option<Piece>,
    ) -> Result<PlayedMove, PushError> {
        self.push_impl(src, dst, promote, None)
    }

    /// Same as [`GameRecord::push()`], but also records `seconds` spent on the move
    pub fn push_timed(
        &mut self,
        src: Coord,
        dst: Coord,
        promote: Option<Piece>,
        seconds: u32,
    ) -> Result<PlayedMove, PushError> {
        self.push_impl(src, dst, promote, Some(seconds))
    }

    fn push_impl(
        &mut self,
        src: Coord,
        dst: Coord,
        promote: Option<Piece>,
        seconds: Option<u32>,
    ) -> Result<PlayedMove, PushError> {
        if self.game.finished {
            return Err(PushError::Finished);
        }
        let p = *self.board.piece_at(src).ok_or(PushError::NoPiece(src))?;
        if p.color != self.board.side() {
            return Err(PushError::WrongSide(src));
        }
        let dst = self.castling_dst(&p, src, dst);
        let moves = Analyser::with_reach(&mut self.board, &self.reach).legal_moves(p.color)?;
        if !moves.contains(src, dst) {
            return Err(PushError::Illegal { src, dst });
        }
        let promote = if p.kind == Piece::Pawn && dst.rank() == geometry::promote_rank(p.color) {
            Some(promote.ok_or(PushError::PromotionRequired(dst))?)
        } else {
            promote
        };

        let flags = self.flags(&p, src, dst, promote);
        let san = san::render(&self.board, &moves, src, dst, flags)?;
        let played = self.board.play(src, dst, promote)?;
        debug!("{} played {}", p.color.name(), san);
        self.game.moves.push(san);
        self.game.move_times.resize(self.game.moves.len() - 1, None);
        self.game.move_times.push(seconds);
        self.update_status()?;
        Ok(played)
    }

    /// Makes the move given in UCI format, like `e2e4` or `e7e8q`
    pub fn push_uci(&mut self, s: &str) -> Result<PlayedMove, PushError> {
        let (src, dst, promote) = parse_uci(s)?;
        self.push(src, dst, promote)
    }

    /// Makes the moves given as a space-separated list in UCI format
    pub fn push_uci_list(&mut self, uci_list: &str) -> Result<(), UciListError> {
        for (pos, mv) in uci_list.split_ascii_whitespace().enumerate() {
            self.push_uci(mv)
                .map_err(|source| UciListError { pos, source })?;
        }
        Ok(())
    }

    /// Finishes the game, giving the win to the opponent of `c`
    pub fn resign(&mut self, c: Color) -> Result<(), PushError> {
        if self.game.finished {
            return Err(PushError::Finished);
        }
        self.game.finished = true;
        self.game.player_mut(c.inv()).is_winner = true;
        debug!("{} resigned", c.name());
        Ok(())
    }

    fn update_status(&mut self) -> Result<(), analyser::Error> {
        let side = self.board.side();
        let mut analyser = Analyser::with_reach(&mut self.board, &self.reach);
        let in_check = analyser.is_king_attacked(side)?;
        if !analyser.legal_moves_with(side, Some(in_check))?.is_empty() {
            return Ok(());
        }
        self.game.finished = true;
        if in_check {
            self.game.player_mut(side.inv()).is_winner = true;
            debug!("{} is checkmated", side.name());
        } else {
            debug!("{} is stalemated", side.name());
        }
        Ok(())
    }

    /// Renders the game into PGN with default settings
    pub fn pgn(&self, with_time: bool) -> String {
        self.pgn_with(&PgnDumper::default(), with_time)
    }

    pub fn pgn_with(&self, dumper: &PgnDumper, with_time: bool) -> String {
        dumper.dump_game(&self.game, with_time)
    }
}
