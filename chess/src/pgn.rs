//! Rendering of whole games into PGN
//!
//! The output follows the PGN standard: a block of tag pairs, an empty line, numbered move
//! text and the game result. Tags are always emitted in the same order:
//!
//! `Event`, `Site`, `Date`, `White`, `Black`, `WhiteElo`, `BlackElo`, `Result`, `PlyCount`,
//! `Variant` and, unless the game starts from the standard position, `FEN`.

use crate::board::INITIAL_FEN;
use crate::types::Color;

use std::fmt;

use chrono::NaiveDate;

/// Game variant
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Variant {
    #[default]
    Standard,
    Chess960,
    FromPosition,
}

impl Variant {
    /// Returns the name used in the `Variant` tag
    pub fn title(&self) -> &'static str {
        match *self {
            Variant::Standard => "Standard",
            Variant::Chess960 => "Chess960",
            Variant::FromPosition => "From position",
        }
    }

    #[inline]
    pub fn is_standard(&self) -> bool {
        *self == Variant::Standard
    }
}

/// Player of a game
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct PlayerInfo {
    pub username: Option<String>,
    /// Level of the engine, if the player is an engine
    pub engine_level: Option<u8>,
    pub elo: Option<u32>,
    pub is_winner: bool,
}

impl PlayerInfo {
    pub fn human(username: impl Into<String>, elo: Option<u32>) -> PlayerInfo {
        PlayerInfo {
            username: Some(username.into()),
            elo,
            ..PlayerInfo::default()
        }
    }

    pub fn engine(level: u8) -> PlayerInfo {
        PlayerInfo {
            engine_level: Some(level),
            ..PlayerInfo::default()
        }
    }

    #[inline]
    pub fn is_engine(&self) -> bool {
        self.engine_level.is_some()
    }
}

/// Everything needed to render a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnGame {
    pub id: String,
    pub rated: bool,
    pub created_at: Option<NaiveDate>,
    pub variant: Variant,
    /// Starting position, written into the `FEN` tag for non-standard variants
    pub initial_fen: String,
    pub white: PlayerInfo,
    pub black: PlayerInfo,
    pub finished: bool,
    /// Moves in SAN
    pub moves: Vec<String>,
    /// Seconds spent on each move, parallel to `moves`. Moves without a known time hold `None`.
    pub move_times: Vec<Option<u32>>,
}

impl Default for PgnGame {
    fn default() -> PgnGame {
        PgnGame {
            id: String::new(),
            rated: false,
            created_at: None,
            variant: Variant::Standard,
            initial_fen: INITIAL_FEN.to_string(),
            white: PlayerInfo::default(),
            black: PlayerInfo::default(),
            finished: false,
            moves: Vec::new(),
            move_times: Vec::new(),
        }
    }
}

impl PgnGame {
    pub fn new(id: impl Into<String>) -> PgnGame {
        PgnGame {
            id: id.into(),
            ..PgnGame::default()
        }
    }

    #[inline]
    pub fn player(&self, c: Color) -> &PlayerInfo {
        match c {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    #[inline]
    pub fn player_mut(&mut self, c: Color) -> &mut PlayerInfo {
        match c {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Returns `true` if at least one move has a known time
    #[inline]
    pub fn has_move_times(&self) -> bool {
        self.move_times.iter().any(Option::is_some)
    }

    /// Returns the winner of a finished game
    pub fn winner(&self) -> Option<Color> {
        if !self.finished {
            return None;
        }
        [Color::White, Color::Black]
            .into_iter()
            .find(|&c| self.player(c).is_winner)
    }
}

/// Settings of [`PgnDumper`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PgnConfig {
    /// Base URL of game pages. The game id is appended to it to fill the `Site` tag, which is
    /// `?` if no URL is given.
    pub site: Option<String>,
    /// Name under which engine players appear, followed by the engine level
    pub engine_name: String,
}

impl Default for PgnConfig {
    fn default() -> PgnConfig {
        PgnConfig {
            site: Some("http://lichess.org/".to_string()),
            engine_name: "Crafty".to_string(),
        }
    }
}

/// Renders games into PGN
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct PgnDumper {
    config: PgnConfig,
}

struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for ch in self.0.chars() {
            if ch == '"' || ch == '\\' {
                write!(f, "\\")?;
            }
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}

struct PlayerName<'a>(&'a PgnConfig, &'a PlayerInfo);

impl fmt::Display for PlayerName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match (self.1.engine_level, &self.1.username) {
            (Some(level), _) => write!(f, "{} level {}", Escaped(&self.0.engine_name), level),
            (None, Some(name)) => write!(f, "{}", Escaped(name)),
            (None, None) => write!(f, "?"),
        }
    }
}

struct PlayerElo<'a>(&'a PlayerInfo);

impl fmt::Display for PlayerElo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.0.elo {
            Some(elo) if elo != 0 && !self.0.is_engine() => write!(f, "{}", elo),
            _ => write!(f, "?"),
        }
    }
}

struct Header<'a>(&'a PgnConfig, &'a PgnGame);

impl fmt::Display for Header<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let Header(config, game) = *self;
        let event = if game.rated {
            "Rated Game"
        } else {
            "Casual game"
        };
        writeln!(f, "[Event \"{}\"]", event)?;
        match &config.site {
            Some(site) => writeln!(f, "[Site \"{}{}\"]", Escaped(site), Escaped(&game.id))?,
            None => writeln!(f, "[Site \"?\"]")?,
        }
        match game.created_at {
            Some(date) => writeln!(f, "[Date \"{}\"]", date.format("%Y.%m.%d"))?,
            None => writeln!(f, "[Date \"?\"]")?,
        }
        writeln!(f, "[White \"{}\"]", PlayerName(config, &game.white))?;
        writeln!(f, "[Black \"{}\"]", PlayerName(config, &game.black))?;
        writeln!(f, "[WhiteElo \"{}\"]", PlayerElo(&game.white))?;
        writeln!(f, "[BlackElo \"{}\"]", PlayerElo(&game.black))?;
        writeln!(f, "[Result \"{}\"]", PgnDumper::result_token(game))?;
        writeln!(f, "[PlyCount \"{}\"]", game.moves.len())?;
        write!(f, "[Variant \"{}\"]", game.variant.title())?;
        if !game.variant.is_standard() {
            write!(f, "\n[FEN \"{}\"]", Escaped(&game.initial_fen))?;
        }
        Ok(())
    }
}

struct MoveText<'a> {
    game: &'a PgnGame,
    with_time: bool,
}

impl fmt::Display for MoveText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let with_time = self.with_time && self.game.has_move_times();
        for (i, san) in self.game.moves.iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            if i % 2 == 0 {
                write!(f, "{}. ", i / 2 + 1)?;
            }
            write!(f, "{}", san)?;
            if with_time {
                if let Some(time) = self.game.move_times.get(i).copied().flatten() {
                    write!(f, " {{{}}}", time)?;
                }
            }
        }
        Ok(())
    }
}

impl PgnDumper {
    pub fn new(config: PgnConfig) -> PgnDumper {
        PgnDumper { config }
    }

    #[inline]
    pub fn config(&self) -> &PgnConfig {
        &self.config
    }

    /// Returns `1-0`, `0-1`, `1/2-1/2` or `*` for a game in progress
    pub fn result_token(game: &PgnGame) -> &'static str {
        if !game.finished {
            return "*";
        }
        match game.winner() {
            Some(Color::White) => "1-0",
            Some(Color::Black) => "0-1",
            None => "1/2-1/2",
        }
    }

    /// Renders the tag pairs
    pub fn dump_header(&self, game: &PgnGame) -> String {
        Header(&self.config, game).to_string()
    }

    /// Renders the numbered move text
    ///
    /// If `with_time` is set and the game has move times, the time spent on each move follows
    /// it as a comment.
    pub fn dump_moves(&self, game: &PgnGame, with_time: bool) -> String {
        MoveText { game, with_time }.to_string()
    }

    /// Renders the whole game
    pub fn dump_game(&self, game: &PgnGame, with_time: bool) -> String {
        let moves = self.dump_moves(game, with_time);
        let sep = if moves.is_empty() { "" } else { " " };
        format!(
            "{}\n\n{}{}{}",
            self.dump_header(game),
            moves,
            sep,
            PgnDumper::result_token(game)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished_game() -> PgnGame {
        let mut game = PgnGame::new("abcd1234");
        game.rated = true;
        game.created_at = NaiveDate::from_ymd_opt(2011, 3, 7);
        game.white = PlayerInfo::human("alice", Some(1620));
        game.black = PlayerInfo::human("bob", None);
        game.white.is_winner = true;
        game.finished = true;
        game.moves = vec!["e4".to_string(), "e5".to_string()];
        game.move_times = vec![Some(3), Some(12)];
        game
    }

    #[test]
    fn test_game() {
        let game = finished_game();
        let pgn = PgnDumper::default().dump_game(&game, false);
        assert_eq!(
            pgn,
            "[Event \"Rated Game\"]\n\
             [Site \"http://lichess.org/abcd1234\"]\n\
             [Date \"2011.03.07\"]\n\
             [White \"alice\"]\n\
             [Black \"bob\"]\n\
             [WhiteElo \"1620\"]\n\
             [BlackElo \"?\"]\n\
             [Result \"1-0\"]\n\
             [PlyCount \"2\"]\n\
             [Variant \"Standard\"]\n\
             \n\
             1. e4 e5 1-0"
        );
        let pgn = PgnDumper::default().dump_game(&game, true);
        assert!(pgn.ends_with("\n\n1. e4 {3} e5 {12} 1-0"));
    }

    #[test]
    fn test_moves() {
        let mut game = PgnGame::new("x");
        let dumper = PgnDumper::default();
        assert_eq!(dumper.dump_moves(&game, true), "");
        game.moves = ["e4", "e5", "Nf3", "Nc6", "Bb5"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            dumper.dump_moves(&game, false),
            "1. e4 e5 2. Nf3 Nc6 3. Bb5"
        );
        // No time data, nothing to print
        assert_eq!(
            dumper.dump_moves(&game, true),
            "1. e4 e5 2. Nf3 Nc6 3. Bb5"
        );
        game.move_times = vec![Some(1), Some(2), Some(3), Some(4), Some(5)];
        assert_eq!(
            dumper.dump_moves(&game, true),
            "1. e4 {1} e5 {2} 2. Nf3 {3} Nc6 {4} 3. Bb5 {5}"
        );
        // Only the moves with a known time get a comment
        game.move_times = vec![None, Some(2), None, None, Some(5)];
        assert_eq!(
            dumper.dump_moves(&game, true),
            "1. e4 e5 {2} 2. Nf3 Nc6 3. Bb5 {5}"
        );
        game.move_times = vec![None; 5];
        assert!(!game.has_move_times());
        assert_eq!(
            dumper.dump_moves(&game, true),
            "1. e4 e5 2. Nf3 Nc6 3. Bb5"
        );
    }

    #[test]
    fn test_result() {
        let mut game = finished_game();
        assert_eq!(PgnDumper::result_token(&game), "1-0");
        game.white.is_winner = false;
        game.black.is_winner = true;
        assert_eq!(PgnDumper::result_token(&game), "0-1");
        game.black.is_winner = false;
        assert_eq!(PgnDumper::result_token(&game), "1/2-1/2");
        game.finished = false;
        assert_eq!(PgnDumper::result_token(&game), "*");

        let empty = PgnGame::new("x");
        assert!(PgnDumper::default()
            .dump_game(&empty, false)
            .ends_with("[Variant \"Standard\"]\n\n*"));
    }

    #[test]
    fn test_header() {
        let mut game = finished_game();
        game.rated = false;
        game.created_at = None;
        game.variant = Variant::Chess960;
        game.initial_fen = "bqnrkrnb/pppppppp/8/8/8/8/PPPPPPPP/BQNRKRNB w KQkq - 0 1".to_string();
        game.black = PlayerInfo::engine(3);
        game.black.elo = Some(1900);
        game.white.username = Some("say \"hi\"".to_string());
        let dumper = PgnDumper::new(PgnConfig {
            site: Some("https://example.org/".to_string()),
            ..PgnConfig::default()
        });
        let header = dumper.dump_header(&game);
        let lines: Vec<_> = header.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[Event \"Casual game\"]",
                "[Site \"https://example.org/abcd1234\"]",
                "[Date \"?\"]",
                "[White \"say \\\"hi\\\"\"]",
                "[Black \"Crafty level 3\"]",
                "[WhiteElo \"1620\"]",
                "[BlackElo \"?\"]",
                "[Result \"1-0\"]",
                "[PlyCount \"2\"]",
                "[Variant \"Chess960\"]",
                "[FEN \"bqnrkrnb/pppppppp/8/8/8/8/PPPPPPPP/BQNRKRNB w KQkq - 0 1\"]",
            ]
        );

        let dumper = PgnDumper::new(PgnConfig {
            site: None,
            ..PgnConfig::default()
        });
        assert_eq!(dumper.dump_header(&game).lines().nth(1), Some("[Site \"?\"]"));
    }
}
