use crate::analyser::Error;
use crate::bitboard::Bitboard;
use crate::board::{Board, PieceId};
use crate::reach::Reach;
use crate::types::{Color, Coord, Piece};

/// Returns the union of attack targets of all the live pieces of color `c`
///
/// The king of color `c` contributes only if `include_king` is set.
pub fn controlled_squares<R: Reach + ?Sized>(
    b: &Board,
    reach: &R,
    c: Color,
    include_king: bool,
) -> Bitboard {
    b.pieces(c)
        .filter(|&id| include_king || b.piece(id).kind != Piece::King)
        .fold(Bitboard::EMPTY, |acc, id| acc | reach.attack_targets(b, id))
}

pub fn is_king_attacked<R: Reach + ?Sized>(b: &Board, reach: &R, c: Color) -> Result<bool, Error> {
    let king = b.king(c).ok_or(Error::NoKing(c))?;
    Ok(controlled_squares(b, reach, c.inv(), false).has(b.piece(king).coord))
}

pub fn check_square<R: Reach + ?Sized>(
    b: &Board,
    reach: &R,
    c: Color,
) -> Result<Option<Coord>, Error> {
    let king = b.king(c).ok_or(Error::NoKing(c))?;
    let square = b.piece(king).coord;
    Ok(controlled_squares(b, reach, c.inv(), false)
        .has(square)
        .then_some(square))
}

/// Returns `true` if any of `watchers` attacks `square`
///
/// Dead watchers are skipped when `skip_dead` is set.
pub(crate) fn is_attacked_by<R: Reach + ?Sized>(
    b: &Board,
    reach: &R,
    watchers: &[PieceId],
    square: Coord,
    skip_dead: bool,
) -> bool {
    watchers
        .iter()
        .filter(|&&id| !(skip_dead && b.piece(id).is_dead))
        .any(|&id| reach.attack_targets(b, id).has(square))
}
