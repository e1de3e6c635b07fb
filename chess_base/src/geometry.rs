use crate::types::{CastlingSide, Color, File, Rank};

/// Number of files (and ranks) on the board
pub const BOARD_SIZE: u8 = 8;

/// Maximum number of pieces a side may own
pub const MAX_PIECES: usize = 16;

/// File where the king lands after castling
pub const fn castling_king_file(s: CastlingSide) -> File {
    match s {
        CastlingSide::King => File::G,
        CastlingSide::Queen => File::C,
    }
}

/// File where the rook lands after castling
pub const fn castling_rook_file(s: CastlingSide) -> File {
    match s {
        CastlingSide::King => File::F,
        CastlingSide::Queen => File::D,
    }
}

pub const fn castling_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    }
}

/// Rank where pawns of color `c` start and may make a double step
pub const fn pawn_home_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R2,
        Color::Black => Rank::R7,
    }
}

/// Rank where pawns of color `c` get promoted
pub const fn promote_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R8,
        Color::Black => Rank::R1,
    }
}

/// Rank where a pawn of color `c` stands right after its double step
pub const fn double_step_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R4,
        Color::Black => Rank::R5,
    }
}
