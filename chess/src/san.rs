//! Utilities to render moves in SAN format

use crate::board::Board;
use crate::legal::MoveSet;
use crate::types::{CastlingSide, Coord, File, Piece, Rank};

use std::fmt;

use thiserror::Error;

/// Error rendering a move into SAN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RenderError {
    /// Source square is empty
    #[error("no piece on {0}")]
    EmptySource(Coord),
    /// More than one of castling, en passant and promotion is set
    #[error("conflicting move flags {0:?}")]
    ConflictingFlags(MoveFlags),
    /// Castling flag is set for a piece other than king
    #[error("castling by a non-king piece on {0}")]
    NotAKing(Coord),
    /// En passant or promotion flag is set for a piece other than pawn
    #[error("pawn move by a non-pawn piece on {0}")]
    NotAPawn(Coord),
    /// Promotion target is a king or a pawn
    #[error("cannot promote to {0}")]
    InvalidPromotion(Piece),
}

/// Facts about the move which cannot be derived from its squares alone
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MoveFlags {
    pub capture: bool,
    pub castling: bool,
    pub en_passant: bool,
    /// Piece to promote, if the move is a promotion
    pub promotion: Option<Piece>,
}

/// Style for formatting SAN moves
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Style {
    /// Use capital Latin letters for pieces
    Algebraic,
    /// Use Unicode chess symbols for pieces
    Utf8,
}

trait PieceTheme {
    fn piece_to_char(piece: Piece) -> char;
    fn promote_sign() -> &'static str;
}

struct Utf8Theme;

impl PieceTheme for Utf8Theme {
    fn promote_sign() -> &'static str {
        ""
    }

    fn piece_to_char(piece: Piece) -> char {
        match piece {
            Piece::Pawn => '♙',
            Piece::Knight => '♘',
            Piece::Bishop => '♗',
            Piece::Rook => '♖',
            Piece::Queen => '♕',
            Piece::King => '♔',
        }
    }
}

struct AlgebraicTheme;

impl PieceTheme for AlgebraicTheme {
    fn promote_sign() -> &'static str {
        "="
    }

    fn piece_to_char(piece: Piece) -> char {
        piece.as_char()
    }
}

/// Move prepared for rendering
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Data {
    /// Castling
    Castling(CastlingSide),
    /// En passant capture
    Enpassant {
        /// Source file
        src: File,
        /// Destination square
        dst: Coord,
    },
    /// Pawn promotion, written without the source file even if it's a capture
    Promotion {
        /// Destination square
        dst: Coord,
        /// Piece to promote
        piece: Piece,
    },
    /// Simple pawn move
    PawnMove {
        /// Destination square
        dst: Coord,
    },
    /// Pawn capture
    PawnCapture {
        /// Source file
        src: File,
        /// Destination square
        dst: Coord,
    },
    /// Non-pawn move
    Simple {
        /// Piece to move
        piece: Piece,
        /// Source file, if needed to disambiguate
        file: Option<File>,
        /// Source rank, if needed to disambiguate
        rank: Option<Rank>,
        /// Is the move capture?
        is_capture: bool,
        /// Destination square
        dst: Coord,
    },
}

/// Wrapper to format [`Data`] with the given [`Style`]
pub struct StyledData<'a>(&'a Data, Style);

struct AmbigDetector {
    src: Coord,
    sim_any: bool,
    sim_file: bool,
    sim_rank: bool,
}

impl AmbigDetector {
    fn new(src: Coord) -> Self {
        Self {
            src,
            sim_any: false,
            sim_file: false,
            sim_rank: false,
        }
    }

    fn push(&mut self, src: Coord) {
        if src == self.src {
            return;
        }
        self.sim_any = true;
        if self.src.file() == src.file() {
            self.sim_file = true;
        }
        if self.src.rank() == src.rank() {
            self.sim_rank = true;
        }
    }

    fn file(&self) -> Option<File> {
        if self.sim_any && (self.sim_rank || !self.sim_file) {
            return Some(self.src.file());
        }
        None
    }

    fn rank(&self) -> Option<Rank> {
        if self.sim_any && self.sim_file {
            return Some(self.src.rank());
        }
        None
    }
}

impl Data {
    /// Returns the wrapper which helps to format the move with the given style `style`
    #[inline]
    pub fn styled(&self, style: Style) -> StyledData<'_> {
        StyledData(self, style)
    }

    /// Prepares the move from `src` to `dst` in position `b` for rendering
    ///
    /// `moves` must hold the legal moves of the moving side in `b`, as they are used to
    /// disambiguate between pieces of the same kind. Castling is kingside if the destination lies
    /// to the right of the king, whichever way the destination is encoded.
    pub fn from_move(
        b: &Board,
        moves: &MoveSet,
        src: Coord,
        dst: Coord,
        flags: MoveFlags,
    ) -> Result<Data, RenderError> {
        let p = b.piece_at(src).ok_or(RenderError::EmptySource(src))?;
        let special = [
            flags.castling,
            flags.en_passant,
            flags.promotion.is_some(),
        ];
        if special.iter().filter(|&&f| f).count() > 1 {
            return Err(RenderError::ConflictingFlags(flags));
        }

        if flags.castling {
            if p.kind != Piece::King {
                return Err(RenderError::NotAKing(src));
            }
            let side = if dst.x() > src.x() {
                CastlingSide::King
            } else {
                CastlingSide::Queen
            };
            return Ok(Data::Castling(side));
        }
        if (flags.en_passant || flags.promotion.is_some()) && p.kind != Piece::Pawn {
            return Err(RenderError::NotAPawn(src));
        }
        if flags.en_passant {
            return Ok(Data::Enpassant {
                src: src.file(),
                dst,
            });
        }
        if let Some(piece) = flags.promotion {
            return match piece {
                Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen => {
                    Ok(Data::Promotion { dst, piece })
                }
                Piece::Pawn | Piece::King => Err(RenderError::InvalidPromotion(piece)),
            };
        }

        let is_capture = flags.capture || b.id_at(dst).is_some();
        if p.kind == Piece::Pawn {
            return Ok(if is_capture {
                Data::PawnCapture {
                    src: src.file(),
                    dst,
                }
            } else {
                Data::PawnMove { dst }
            });
        }

        let mut detector = AmbigDetector::new(src);
        for (other, dsts) in moves.iter() {
            if !dsts.has(dst) {
                continue;
            }
            if let Some(q) = b.piece_at(other) {
                if q.kind == p.kind && q.color == p.color {
                    detector.push(other);
                }
            }
        }
        Ok(Data::Simple {
            piece: p.kind,
            file: detector.file(),
            rank: detector.rank(),
            is_capture,
            dst,
        })
    }

    fn do_fmt<P: PieceTheme>(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Self::Castling(CastlingSide::King) => write!(f, "O-O"),
            Self::Castling(CastlingSide::Queen) => write!(f, "O-O-O"),
            Self::Enpassant { src, dst } | Self::PawnCapture { src, dst } => {
                write!(f, "{}x{}", src.as_char(), dst)
            }
            Self::Promotion { dst, piece } => write!(
                f,
                "{}{}{}",
                dst,
                P::promote_sign(),
                P::piece_to_char(piece)
            ),
            Self::PawnMove { dst } => write!(f, "{}", dst),
            Self::Simple {
                piece,
                file,
                rank,
                is_capture,
                dst,
            } => {
                write!(f, "{}", P::piece_to_char(piece))?;
                if let Some(file) = file {
                    write!(f, "{}", file.as_char())?;
                }
                if let Some(rank) = rank {
                    write!(f, "{}", rank.as_char())?;
                }
                if is_capture {
                    write!(f, "x")?;
                }
                write!(f, "{}", dst)
            }
        }
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.do_fmt::<AlgebraicTheme>(f)
    }
}

impl<'a> fmt::Display for StyledData<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.1 {
            Style::Algebraic => self.0.do_fmt::<AlgebraicTheme>(f),
            Style::Utf8 => self.0.do_fmt::<Utf8Theme>(f),
        }
    }
}

/// Renders the move from `src` to `dst` in position `b` into SAN
///
/// See [`Data::from_move()`] for the meaning of the arguments.
pub fn render(
    b: &Board,
    moves: &MoveSet,
    src: Coord,
    dst: Coord,
    flags: MoveFlags,
) -> Result<String, RenderError> {
    Ok(Data::from_move(b, moves, src, dst, flags)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyser::Analyser;

    fn coord(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn san(fen: &str, src: &str, dst: &str, flags: MoveFlags) -> Result<String, RenderError> {
        let mut b = Board::from_fen(fen).unwrap();
        let side = b.side();
        let moves = Analyser::new(&mut b).legal_moves(side).unwrap();
        render(&b, &moves, coord(src), coord(dst), flags)
    }

    fn simple(fen: &str, src: &str, dst: &str) -> String {
        san(fen, src, dst, MoveFlags::default()).unwrap()
    }

    #[test]
    fn test_simple() {
        let fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2";
        assert_eq!(simple(fen, "e4", "e5"), "e5");
        assert_eq!(simple(fen, "e4", "d5"), "exd5");
        assert_eq!(simple(fen, "g1", "f3"), "Nf3");
        assert_eq!(simple(fen, "f1", "b5"), "Bb5");
        assert_eq!(simple(fen, "e1", "e2"), "Ke2");
        let capture = MoveFlags {
            capture: true,
            ..MoveFlags::default()
        };
        assert_eq!(san(fen, "e4", "d5", capture).unwrap(), "exd5");
    }

    #[test]
    fn test_disambiguation() {
        // Different files
        let fen = "4k3/8/8/8/8/5N2/8/1N2K3 w - - 0 1";
        assert_eq!(simple(fen, "b1", "d2"), "Nbd2");
        assert_eq!(simple(fen, "f3", "d2"), "Nfd2");
        assert_eq!(simple(fen, "f3", "d4"), "Nd4");

        // Same file
        let fen = "4k3/8/8/8/8/1N6/8/1N2K3 w - - 0 1";
        assert_eq!(simple(fen, "b1", "d2"), "N1d2");
        assert_eq!(simple(fen, "b3", "d2"), "N3d2");

        // Same file for one candidate, same rank for another one
        let fen = "4k3/8/8/8/8/1N6/8/1N2KN2 w - - 0 1";
        assert_eq!(simple(fen, "b1", "d2"), "Nb1d2");
        assert_eq!(simple(fen, "b3", "d2"), "N3d2");
        assert_eq!(simple(fen, "f1", "d2"), "Nfd2");

        // Pinned piece is not a candidate
        let fen = "4k3/4r3/8/8/8/8/4N3/1N2K3 w - - 0 1";
        assert_eq!(simple(fen, "b1", "c3"), "Nc3");

        // Rooks with a capture
        let fen = "4k3/8/8/8/R2p3R/8/8/4K3 w - - 0 1";
        assert_eq!(simple(fen, "a4", "d4"), "Raxd4");
    }

    #[test]
    fn test_enpassant() {
        let fen = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1";
        let flags = MoveFlags {
            en_passant: true,
            ..MoveFlags::default()
        };
        assert_eq!(san(fen, "e5", "d6", flags).unwrap(), "exd6");
        // Even without the flag, the move is a capture
        let flags = MoveFlags {
            capture: true,
            ..MoveFlags::default()
        };
        assert_eq!(san(fen, "e5", "d6", flags).unwrap(), "exd6");
    }

    #[test]
    fn test_promotion() {
        let fen = "1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1";
        let promote = |piece| MoveFlags {
            promotion: Some(piece),
            ..MoveFlags::default()
        };
        assert_eq!(san(fen, "a7", "a8", promote(Piece::Queen)).unwrap(), "a8=Q");
        assert_eq!(san(fen, "a7", "b8", promote(Piece::Knight)).unwrap(), "b8=N");
        assert_eq!(
            san(fen, "a7", "a8", promote(Piece::King)),
            Err(RenderError::InvalidPromotion(Piece::King))
        );

        let mut b = Board::from_fen(fen).unwrap();
        let side = b.side();
        let moves = Analyser::new(&mut b).legal_moves(side).unwrap();
        let data = Data::from_move(&b, &moves, coord("a7"), coord("a8"), promote(Piece::Rook));
        assert_eq!(data.unwrap().styled(Style::Utf8).to_string(), "a8♖");
    }

    #[test]
    fn test_castling() {
        let castling = MoveFlags {
            castling: true,
            ..MoveFlags::default()
        };
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        assert_eq!(san(fen, "e1", "g1", castling).unwrap(), "O-O");
        assert_eq!(san(fen, "e1", "c1", castling).unwrap(), "O-O-O");
        assert_eq!(san(fen, "e1", "h1", castling).unwrap(), "O-O");
        assert_eq!(san(fen, "e1", "a1", castling).unwrap(), "O-O-O");

        let fen = "4k3/8/8/8/8/8/8/RK6 w Q - 0 1";
        assert_eq!(san(fen, "b1", "a1", castling).unwrap(), "O-O-O");
    }

    #[test]
    fn test_errors() {
        let fen = "r3k2r/p7/8/8/8/8/8/R3K2R w KQkq - 0 1";
        assert_eq!(
            san(fen, "e3", "e4", MoveFlags::default()),
            Err(RenderError::EmptySource(coord("e3")))
        );
        let flags = MoveFlags {
            castling: true,
            promotion: Some(Piece::Queen),
            ..MoveFlags::default()
        };
        assert_eq!(
            san(fen, "e1", "g1", flags),
            Err(RenderError::ConflictingFlags(flags))
        );
        let flags = MoveFlags {
            castling: true,
            ..MoveFlags::default()
        };
        assert_eq!(
            san(fen, "a1", "d1", flags),
            Err(RenderError::NotAKing(coord("a1")))
        );
        let flags = MoveFlags {
            en_passant: true,
            ..MoveFlags::default()
        };
        assert_eq!(
            san(fen, "a1", "a2", flags),
            Err(RenderError::NotAPawn(coord("a1")))
        );
    }

    #[test]
    fn test_styled() {
        let fen = "4k3/8/8/8/8/5N2/8/1N2K3 w - - 0 1";
        let mut b = Board::from_fen(fen).unwrap();
        let side = b.side();
        let moves = Analyser::new(&mut b).legal_moves(side).unwrap();
        let data = Data::from_move(
            &b,
            &moves,
            coord("b1"),
            coord("d2"),
            MoveFlags::default(),
        )
        .unwrap();
        assert_eq!(data.styled(Style::Algebraic).to_string(), "Nbd2");
        assert_eq!(data.styled(Style::Utf8).to_string(), "♘bd2");
    }
}
