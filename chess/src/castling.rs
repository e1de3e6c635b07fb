//! Castling eligibility
//!
//! Castling is resolved per rook: any unmoved rook of the side standing on the rank of its
//! unmoved king is a candidate, so positions where the king and the rooks don't start on their
//! usual files are supported as well. The king and the rook always land on the usual castling
//! files (see [`geometry::castling_king_file()`] and [`geometry::castling_rook_file()`]).

use crate::attack;
use crate::bitboard::Bitboard;
use crate::board::{Board, PieceId};
use crate::geometry::{self, BOARD_SIZE};
use crate::reach::Reach;
use crate::types::{CastlingSide, Color, Coord, Piece};

use log::trace;

/// Finds the rook the king of color `c` would castle with towards `side`
///
/// The king must be alive and unmoved. The rook is the first unmoved rook of the same color met
/// when walking from the king towards `side`; other pieces on the way are skipped. Attacked and
/// occupied squares are not taken into account.
pub fn find_rook(b: &Board, c: Color, side: CastlingSide) -> Option<PieceId> {
    let king = b.piece(b.king(c)?);
    if king.has_moved {
        return None;
    }
    let mut cur = king.coord;
    while let Some(next) = cur.shift(side.direction(), 0) {
        if let Some(id) = b.id_at(next) {
            let p = b.piece(id);
            if p.color == c && p.kind == Piece::Rook && !p.has_moved {
                return Some(id);
            }
        }
        cur = next;
    }
    None
}

/// Returns `true` if both the king of color `c` and some rook towards `side` have never moved
#[inline]
pub fn can_castle(b: &Board, c: Color, side: CastlingSide) -> bool {
    find_rook(b, c, side).is_some()
}

fn side_of(king: Coord, rook: Coord) -> CastlingSide {
    if rook.x() < king.x() {
        CastlingSide::Queen
    } else {
        CastlingSide::King
    }
}

/// Returns the destinations of the king of color `c` that correspond to castling
///
/// The caller must ensure that the king is not attacked. For each candidate rook, the squares
/// the king walks over (both ends included) must not be controlled by the opponent, and all
/// the squares between the leftmost and the rightmost of the four castling files must hold
/// nothing but the king and the rook.
///
/// The destination is the king's landing square, or the rook's square if the king moves by one
/// file at most.
pub fn castling_targets<R: Reach + ?Sized>(b: &Board, reach: &R, c: Color) -> Bitboard {
    let king = match b.king(c) {
        Some(id) => id,
        None => return Bitboard::EMPTY,
    };
    let origin = b.piece(king).coord;
    if b.piece(king).has_moved {
        return Bitboard::EMPTY;
    }

    let rooks = b.pieces(c).filter(|&id| {
        let p = b.piece(id);
        p.kind == Piece::Rook && !p.has_moved && p.coord.rank() == origin.rank()
    });
    let mut control = None;
    let mut res = Bitboard::EMPTY;
    for rook in rooks {
        let attacked =
            *control.get_or_insert_with(|| attack::controlled_squares(b, reach, c.inv(), true));
        if let Some(dst) = target(b, king, rook, attacked) {
            res.set(dst);
        }
    }
    res
}

fn target(b: &Board, king: PieceId, rook: PieceId, control: Bitboard) -> Option<Coord> {
    let king_src = b.piece(king).coord;
    let rook_src = b.piece(rook).coord;
    let y = king_src.y();
    let side = side_of(king_src, rook_src);
    let king_x = geometry::castling_king_file(side).number();
    let rook_x = geometry::castling_rook_file(side).number();

    let (lo, hi) = (king_src.x().min(king_x), king_src.x().max(king_x));
    for x in lo..=hi {
        let sq = Coord::from_xy(x, y)?;
        if control.has(sq) {
            trace!("castling {:?} from {}: {} is attacked", side, king_src, sq);
            return None;
        }
    }

    let files = [king_src.x(), rook_src.x(), king_x, rook_x];
    let lo = files.iter().copied().min()?;
    let hi = files.iter().copied().max()?.min(BOARD_SIZE);
    for x in lo..=hi {
        let sq = Coord::from_xy(x, y)?;
        match b.id_at(sq) {
            Some(id) if id != king && id != rook => {
                trace!("castling {:?} from {}: {} is occupied", side, king_src, sq);
                return None;
            }
            _ => {}
        }
    }

    if king_src.x().abs_diff(king_x) <= 1 {
        Some(rook_src)
    } else {
        Coord::from_xy(king_x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reach::StandardReach;

    fn targets(fen: &str, c: Color) -> Vec<String> {
        let b = Board::from_fen(fen).unwrap();
        Board::squares_to_keys(castling_targets(&b, &StandardReach, c))
    }

    #[test]
    fn test_standard() {
        assert_eq!(
            targets("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", Color::White),
            vec!["c1", "g1"]
        );
        assert_eq!(
            targets("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", Color::Black),
            vec!["c8", "g8"]
        );
        assert_eq!(
            targets("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1", Color::White),
            vec!["g1"]
        );
        assert!(targets("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1", Color::White).is_empty());
    }

    #[test]
    fn test_blocked() {
        // b1 is not walked over by the king, but must still be empty
        assert_eq!(
            targets("4k3/8/8/8/8/8/8/RN2K2R w KQ - 0 1", Color::White),
            vec!["g1"]
        );
        assert!(targets("4k3/8/8/8/8/8/8/R3KB1R w K - 0 1", Color::White).is_empty());
        // Own piece beyond the rook is irrelevant
        assert_eq!(
            targets("4k3/8/8/8/8/8/8/4K1RN w K - 0 1", Color::White),
            vec!["g1"]
        );
    }

    #[test]
    fn test_attacked() {
        // f1 is covered by the bishop
        assert_eq!(
            targets("4k3/8/b7/8/8/8/8/R3K2R w KQ - 0 1", Color::White),
            vec!["c1"]
        );
        // b1 may be attacked for queenside castling
        assert_eq!(
            targets("1r2k3/8/8/8/8/8/8/R3K2R w KQ - 0 1", Color::White),
            vec!["c1", "g1"]
        );
        assert_eq!(
            targets("2r1k3/8/8/8/8/8/8/R3K2R w KQ - 0 1", Color::White),
            vec!["g1"]
        );
        // The opponent king also counts as an attacker
        assert_eq!(
            targets("8/8/8/8/8/8/6k1/4K2R w K - 0 1", Color::White),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_compact() {
        // The king travels one file at most, so the rook's square is the destination
        assert_eq!(
            targets("4k3/8/8/8/8/8/8/RK6 w Q - 0 1", Color::White),
            vec!["a1"]
        );
        assert_eq!(
            targets("4k3/8/8/8/8/8/8/1RK5 w Q - 0 1", Color::White),
            vec!["b1"]
        );
        assert_eq!(
            targets("4k3/8/8/8/8/8/8/5KR1 w K - 0 1", Color::White),
            vec!["g1"]
        );
    }

    #[test]
    fn test_find_rook() {
        let b = Board::from_fen("r3k2r/8/8/8/8/8/8/R2QK1NR w KQk - 0 1").unwrap();
        let h1 = b.id_at("h1".parse().unwrap());
        let a1 = b.id_at("a1".parse().unwrap());
        assert_eq!(find_rook(&b, Color::White, CastlingSide::King), h1);
        assert_eq!(find_rook(&b, Color::White, CastlingSide::Queen), a1);
        assert!(can_castle(&b, Color::Black, CastlingSide::King));
        assert!(!can_castle(&b, Color::Black, CastlingSide::Queen));

        let b = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1").unwrap();
        assert!(!can_castle(&b, Color::White, CastlingSide::King));
    }
}
