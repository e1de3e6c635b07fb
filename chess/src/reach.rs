//! Movement geometry of the pieces
//!
//! The legality core never decides by itself how a piece moves. It asks a [`Reach`] for two
//! square sets per piece: the squares the piece may go to if its own king is ignored, and the
//! squares it threatens. Both are computed against the current state of the board, so they follow
//! the board while the analyser simulates moves on it.

use crate::bitboard::Bitboard;
use crate::board::{Board, PieceId, PieceRecord};
use crate::geometry;
use crate::types::{Color, Coord, Piece};

/// Source of piece geometry
pub trait Reach {
    /// Squares the piece `id` may move to, ignoring whether its own king is attacked after
    /// the move
    ///
    /// Dead pieces reach nothing.
    fn basic_targets(&self, b: &Board, id: PieceId) -> Bitboard;

    /// Squares threatened by the piece `id`
    ///
    /// These can differ from [`Reach::basic_targets()`]: a pawn moves straight but attacks
    /// diagonally, and a piece also threatens the squares occupied by its own side.
    fn attack_targets(&self, b: &Board, id: PieceId) -> Bitboard;
}

impl<R: Reach + ?Sized> Reach for &R {
    #[inline]
    fn basic_targets(&self, b: &Board, id: PieceId) -> Bitboard {
        (**self).basic_targets(b, id)
    }

    #[inline]
    fn attack_targets(&self, b: &Board, id: PieceId) -> Bitboard {
        (**self).attack_targets(b, id)
    }
}

/// Orthodox chess geometry
///
/// Castling is not part of it, as it depends on the attacked squares rather than on the
/// piece itself.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StandardReach;

const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_STEPS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const DIAG_RAYS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

const LINE_RAYS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

fn jumps(from: Coord, deltas: &[(i8, i8)]) -> Bitboard {
    deltas
        .iter()
        .filter_map(|&(dx, dy)| from.shift(dx, dy))
        .collect()
}

fn rays(b: &Board, from: Coord, dirs: &[(i8, i8)]) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for &(dx, dy) in dirs {
        let mut cur = from;
        while let Some(next) = cur.shift(dx, dy) {
            res.set(next);
            if b.id_at(next).is_some() {
                break;
            }
            cur = next;
        }
    }
    res
}

fn occupied_by(b: &Board, c: Color) -> Bitboard {
    b.pieces(c).map(|id| b.piece(id).coord).collect()
}

fn pawn_targets(b: &Board, p: &PieceRecord) -> Bitboard {
    let fwd = p.color.forward();
    let mut res = Bitboard::EMPTY;

    if let Some(one) = p.coord.shift(0, fwd).filter(|&c| b.id_at(c).is_none()) {
        res.set(one);
        if p.coord.rank() == geometry::pawn_home_rank(p.color) {
            if let Some(two) = one.shift(0, fwd).filter(|&c| b.id_at(c).is_none()) {
                res.set(two);
            }
        }
    }

    let ep_victim = b.ep_victim().map(|id| b.piece(id));
    for dx in [-1, 1] {
        let dst = match p.coord.shift(dx, fwd) {
            Some(dst) => dst,
            None => continue,
        };
        let takes = match b.piece_at(dst) {
            Some(q) => q.color != p.color,
            None => ep_victim.map_or(false, |v| {
                v.color != p.color && !v.is_dead && Some(v.coord) == dst.shift(0, -fwd)
            }),
        };
        if takes {
            res.set(dst);
        }
    }
    res
}

impl Reach for StandardReach {
    fn basic_targets(&self, b: &Board, id: PieceId) -> Bitboard {
        let p = b.piece(id);
        if p.is_dead {
            return Bitboard::EMPTY;
        }
        match p.kind {
            Piece::Pawn => pawn_targets(b, p),
            Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen | Piece::King => {
                self.attack_targets(b, id) & !occupied_by(b, p.color)
            }
        }
    }

    fn attack_targets(&self, b: &Board, id: PieceId) -> Bitboard {
        let p = b.piece(id);
        if p.is_dead {
            return Bitboard::EMPTY;
        }
        match p.kind {
            Piece::Pawn => jumps(p.coord, &[(-1, p.color.forward()), (1, p.color.forward())]),
            Piece::Knight => jumps(p.coord, &KNIGHT_JUMPS),
            Piece::King => jumps(p.coord, &KING_STEPS),
            Piece::Bishop => rays(b, p.coord, &DIAG_RAYS),
            Piece::Rook => rays(b, p.coord, &LINE_RAYS),
            Piece::Queen => rays(b, p.coord, &DIAG_RAYS) | rays(b, p.coord, &LINE_RAYS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(b: Bitboard) -> Vec<String> {
        Board::squares_to_keys(b)
    }

    fn at(b: &Board, key: &str) -> PieceId {
        b.id_at(key.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_initial() {
        let b = Board::initial();
        let r = StandardReach;
        assert_eq!(keys(r.basic_targets(&b, at(&b, "g1"))), vec!["f3", "h3"]);
        assert_eq!(keys(r.basic_targets(&b, at(&b, "e2"))), vec!["e3", "e4"]);
        assert_eq!(keys(r.attack_targets(&b, at(&b, "e2"))), vec!["d3", "f3"]);
        assert!(r.basic_targets(&b, at(&b, "a1")).is_empty());
        assert_eq!(keys(r.attack_targets(&b, at(&b, "a1"))), vec!["b1", "a2"]);
        assert!(r.basic_targets(&b, at(&b, "d1")).is_empty());
    }

    #[test]
    fn test_sliders() {
        let b = Board::from_fen("4k3/8/8/3p4/8/1Q3P2/8/4K3 w - - 0 1").unwrap();
        let r = StandardReach;
        let queen = r.basic_targets(&b, at(&b, "b3"));
        assert!(queen.has("d5".parse().unwrap()));
        assert!(!queen.has("e6".parse().unwrap()));
        assert!(queen.has("e3".parse().unwrap()));
        assert!(!queen.has("f3".parse().unwrap()));
        assert!(r.attack_targets(&b, at(&b, "b3")).has("f3".parse().unwrap()));
        assert_eq!(queen.len(), 17);
    }

    #[test]
    fn test_pawns() {
        let b = Board::from_fen("4k3/8/8/3pP3/8/2p5/1P6/4K3 w - d6 0 1").unwrap();
        let r = StandardReach;
        assert_eq!(keys(r.basic_targets(&b, at(&b, "e5"))), vec!["d6", "e6"]);
        assert_eq!(keys(r.basic_targets(&b, at(&b, "b2"))), vec!["b3", "c3", "b4"]);
        assert_eq!(keys(r.attack_targets(&b, at(&b, "d5"))), vec!["c4", "e4"]);

        let b = Board::from_fen("4k3/8/8/8/8/1p6/1P6/4K3 w - - 0 1").unwrap();
        assert!(r.basic_targets(&b, at(&b, "b2")).is_empty());
    }

    #[test]
    fn test_dead() {
        let mut b = Board::initial();
        let knight = at(&b, "b1");
        b.kill(knight);
        assert!(StandardReach.basic_targets(&b, knight).is_empty());
        assert!(StandardReach.attack_targets(&b, knight).is_empty());
    }
}
