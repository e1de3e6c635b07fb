//! Legal move enumeration

use crate::analyser::Error;
use crate::attack;
use crate::bitboard::Bitboard;
use crate::board::{Board, PieceId};
use crate::castling;
use crate::geometry::MAX_PIECES;
use crate::reach::Reach;
use crate::types::{Color, Coord, Piece};

use arrayvec::ArrayVec;
use log::{debug, trace};

/// Legal moves of one side, as a map from the origin square to the set of destinations
///
/// Only origins with at least one destination are stored. Castling is encoded by the king's
/// destination, which is either the king's landing square or the square of the castling rook.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MoveSet(ArrayVec<(Coord, Bitboard), MAX_PIECES>);

impl MoveSet {
    pub fn new() -> MoveSet {
        MoveSet::default()
    }

    /// Adds `dsts` to the destinations of `src`
    ///
    /// # Panics
    ///
    /// Panics if the set already holds `MAX_PIECES` origins and `src` is not among them.
    pub fn insert(&mut self, src: Coord, dsts: Bitboard) {
        if dsts.is_empty() {
            return;
        }
        match self.0.iter_mut().find(|(s, _)| *s == src) {
            Some((_, cur)) => *cur |= dsts,
            None => self.0.push((src, dsts)),
        }
    }

    /// Returns the destinations of `src`
    pub fn get(&self, src: Coord) -> Bitboard {
        self.0
            .iter()
            .find(|(s, _)| *s == src)
            .map_or(Bitboard::EMPTY, |(_, d)| *d)
    }

    #[inline]
    pub fn contains(&self, src: Coord, dst: Coord) -> bool {
        self.get(src).has(dst)
    }

    /// Iterates over the origins and their destinations
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Bitboard)> + '_ {
        self.0.iter().copied()
    }

    /// Returns the set of origins
    pub fn origins(&self) -> Bitboard {
        self.0.iter().map(|(s, _)| *s).collect()
    }

    /// Returns the number of origins
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the total number of moves
    pub fn move_count(&self) -> usize {
        self.0.iter().map(|(_, d)| d.len()).sum()
    }

    /// Returns `true` if there are no legal moves
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

type Subset = ArrayVec<PieceId, MAX_PIECES>;

/// Simulated move, reverted on drop
///
/// The piece is moved to its destination and the victim (if any) is killed when the simulation
/// is created. Dropping it moves the piece back and revives the victim, so the board is restored
/// on every path out of the scope that owns the simulation.
struct Simulation<'b> {
    board: &'b mut Board,
    piece: PieceId,
    origin: Coord,
    victim: Option<PieceId>,
}

impl<'b> Simulation<'b> {
    fn new(board: &'b mut Board, piece: PieceId, dst: Coord, victim: Option<PieceId>) -> Self {
        let origin = board.piece(piece).coord;
        if let Some(victim) = victim {
            board.kill(victim);
        }
        board.relocate(piece, dst);
        Simulation {
            board,
            piece,
            origin,
            victim,
        }
    }

    #[inline]
    fn board(&self) -> &Board {
        self.board
    }
}

impl Drop for Simulation<'_> {
    fn drop(&mut self) {
        self.board.relocate(self.piece, self.origin);
        if let Some(victim) = self.victim {
            self.board.revive(victim);
        }
    }
}

/// Finds the piece captured by moving `id` to `dst`
///
/// Looked up before anything is mutated. A pawn moving diagonally onto an empty square takes
/// the piece right behind the destination.
fn find_victim(b: &Board, id: PieceId, dst: Coord) -> Result<Option<PieceId>, Error> {
    let p = b.piece(id);
    match b.id_at(dst) {
        Some(target) if b.piece(target).color != p.color => Ok(Some(target)),
        Some(_) => Err(Error::InvalidTarget { src: p.coord, dst }),
        None if p.kind == Piece::Pawn && dst.file() != p.coord.file() => dst
            .shift(0, -p.color.forward())
            .and_then(|behind| b.id_at(behind))
            .filter(|&v| b.piece(v).color != p.color)
            .map(Some)
            .ok_or(Error::MissingEnpassantVictim(dst)),
        None => Ok(None),
    }
}

/// Enumerates legal moves of color `c`
///
/// `king_attacked` may carry a known answer to [`attack::is_king_attacked()`] for `c`, otherwise
/// it is computed here.
///
/// Each candidate from [`Reach::basic_targets()`] is simulated on the board and checked against a
/// subset of opponent pieces. King moves are checked against all of them. Other moves are
/// checked against all pieces but the opponent king when already in check, and only against
/// sliding pieces otherwise, as only a line opened by the moving piece can expose the king then.
pub fn legal_moves<R: Reach + ?Sized>(
    b: &mut Board,
    reach: &R,
    c: Color,
    king_attacked: Option<bool>,
) -> Result<MoveSet, Error> {
    let king = b.king(c).ok_or(Error::NoKing(c))?;
    let king_attacked = match king_attacked {
        Some(known) => known,
        None => attack::is_king_attacked(b, reach, c)?,
    };

    let all: Subset = b.pieces(c.inv()).collect();
    let all_but_king: Subset = all
        .iter()
        .copied()
        .filter(|&id| b.piece(id).kind != Piece::King)
        .collect();
    let sliding: Subset = all
        .iter()
        .copied()
        .filter(|&id| b.piece(id).kind.is_sliding())
        .collect();
    let own: Subset = b.pieces(c).collect();

    let mut res = MoveSet::new();
    for id in own {
        let p = *b.piece(id);
        let watchers: &[PieceId] = match p.kind {
            Piece::King => &all,
            _ if king_attacked => &all_but_king,
            _ => &sliding,
        };

        let mut dsts = Bitboard::EMPTY;
        for dst in reach.basic_targets(b, id) {
            let victim = find_victim(b, id, dst)?;
            let king_square = if id == king {
                dst
            } else {
                b.piece(king).coord
            };
            let exposed = {
                let sim = Simulation::new(b, id, dst, victim);
                attack::is_attacked_by(
                    sim.board(),
                    reach,
                    watchers,
                    king_square,
                    victim.is_some(),
                )
            };
            if exposed {
                trace!("{} {}-{} leaves the king attacked", p.kind, p.coord, dst);
            } else {
                dsts.set(dst);
            }
        }

        if p.kind == Piece::King && !king_attacked && !p.has_moved {
            dsts |= castling::castling_targets(b, reach, c);
        }
        res.insert(p.coord, dsts);
    }

    debug!(
        "{} has {} legal moves from {} squares (in check: {})",
        c.name(),
        res.move_count(),
        res.len(),
        king_attacked
    );
    Ok(res)
}
