//! # Arbiter
//!
//! Chess legality and notation engine. It tells which moves are legal in a given position,
//! including castling in both orthodox and Chess960 setups, and writes the moves down in
//! Standard Algebraic Notation and whole games in PGN.
//!
//! Pieces live in an arena inside [`Board`] and keep their identity while they move, die and
//! come back. Legal moves are found by simulating each candidate on the board itself and
//! checking whether the own king stays safe, see [`Analyser`].
//!
//! # Example
//!
//! ```
//! use arbiter::{chain::GameRecord, types::Color};
//!
//! let mut game = GameRecord::new_initial();
//! game.push_uci_list("f2f3 e7e5 g2g4 d8h4").unwrap();
//! assert!(game.is_finished());
//! assert_eq!(game.winner(), Some(Color::Black));
//! assert_eq!(game.game().moves, vec!["f3", "e5", "g4", "Qh4"]);
//! ```

pub mod analyser;
pub mod attack;
pub mod board;
pub mod castling;
pub mod chain;
pub mod legal;
pub mod pgn;
pub mod reach;
pub mod san;

pub use arbiter_base::{bitboard, geometry, types};

pub use analyser::Analyser;
pub use bitboard::Bitboard;
pub use board::{Board, PieceId, PieceRecord, PlayedMove};
pub use chain::GameRecord;
pub use legal::MoveSet;
pub use pgn::{PgnConfig, PgnDumper, PgnGame, PlayerInfo, Variant};
pub use reach::{Reach, StandardReach};
pub use types::{CastlingRights, CastlingSide, Color, Coord, File, Piece, Rank};
