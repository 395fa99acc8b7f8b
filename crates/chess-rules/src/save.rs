//! Save files: a JSON snapshot of everything needed to resume a game.
//!
//! Pieces are identified by square in the file; ids are handed out afresh on
//! load. Loading goes through [`GameBuilder`], so a file that describes an
//! impossible game is refused instead of half-loaded.

use std::fs;
use std::path::Path;

use chess_core::{Color, MoveSet, PieceKind, Square};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::builder::{GameBuilder, PieceSetup, SetupError};
use crate::{Game, MateRule, MoveRecord, Phase, Players};

/// Current save-file format.
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to access save file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed save file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported save file version {0} (expected {SAVE_VERSION})")]
    UnsupportedVersion(u32),
    #[error("corrupt save file: {0}")]
    Corrupt(#[from] SetupError),
}

/// A piece as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPiece {
    pub kind: PieceKind,
    pub color: Color,
    pub start: Square,
    pub square: Square,
    pub categories: MoveSet,
}

/// The en-passant window as written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedEnPassant {
    /// Square the pawn passed over.
    pub square: Square,
    /// Square the pawn landed on.
    pub target: Square,
}

/// On-disk form of a [`Game`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub version: u32,
    pub players: Players,
    pub side_to_move: Color,
    #[serde(default)]
    pub mate_rule: MateRule,
    pub pieces: Vec<SavedPiece>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_passant: Option<SavedEnPassant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_promotion: Option<MoveRecord>,
    #[serde(default)]
    pub history: Vec<MoveRecord>,
}

impl SavedGame {
    pub fn from_game(game: &Game) -> Self {
        let position = game.position();
        let pieces = position
            .pieces()
            .map(|piece| SavedPiece {
                kind: piece.kind(),
                color: piece.color(),
                start: piece.start(),
                square: piece.square(),
                categories: piece.categories(),
            })
            .collect();
        let en_passant = position.en_passant().and_then(|window| {
            position.piece(window.target).map(|target| SavedEnPassant {
                square: window.square,
                target: target.square(),
            })
        });
        let pending_promotion = match game.phase() {
            Phase::AwaitingPromotion(_) => game.pending().map(|pending| pending.record),
            Phase::AwaitingMove => None,
        };

        SavedGame {
            version: SAVE_VERSION,
            players: game.players().clone(),
            side_to_move: game.side_to_move(),
            mate_rule: game.mate_rule(),
            pieces,
            en_passant,
            pending_promotion,
            history: game.history().to_vec(),
        }
    }

    /// Rebuilds the game, refusing anything the rules could not have
    /// produced.
    pub fn into_game(self) -> Result<Game, SaveError> {
        if self.version != SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion(self.version));
        }

        let mut builder = GameBuilder::new(self.players.white, self.players.black)
            .side_to_move(self.side_to_move)
            .mate_rule(self.mate_rule)
            .history(self.history);
        for piece in self.pieces {
            builder = builder.placed(PieceSetup {
                kind: piece.kind,
                color: piece.color,
                start: piece.start,
                square: piece.square,
                categories: piece.categories,
            });
        }
        if let Some(window) = self.en_passant {
            builder = builder.en_passant(window.square, window.target);
        }
        if let Some(record) = self.pending_promotion {
            builder = builder.pending_promotion(record);
        }
        Ok(builder.build()?)
    }
}

/// Serializes a game as pretty-printed JSON.
pub fn to_json(game: &Game) -> Result<String, SaveError> {
    Ok(serde_json::to_string_pretty(&SavedGame::from_game(game))?)
}

pub fn from_json(json: &str) -> Result<Game, SaveError> {
    let saved: SavedGame = serde_json::from_str(json)?;
    saved.into_game()
}

/// Writes a game to `path`, creating parent directories as needed.
pub fn save_to_path(game: &Game, path: impl AsRef<Path>) -> Result<(), SaveError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_json(game)?)?;
    debug!(path = %path.display(), plies = game.history().len(), "game saved");
    Ok(())
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Game, SaveError> {
    let path = path.as_ref();
    let game = from_json(&fs::read_to_string(path)?)?;
    debug!(path = %path.display(), plies = game.history().len(), "game loaded");
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::MoveCategory;

    fn sq(label: &str) -> Square {
        Square::from_label(label).unwrap()
    }

    fn play(game: &mut Game, moves: &[(&str, &str)]) {
        for &(from, to) in moves {
            game.attempt_move_labels(from, to).unwrap();
        }
    }

    #[test]
    fn resumes_with_the_en_passant_window_open() {
        let mut game = Game::new("Ada", "Bert");
        play(
            &mut game,
            &[("b2", "b4"), ("h7", "h6"), ("b4", "b5"), ("c7", "c5")],
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saves").join("game.json");
        save_to_path(&game, &path).unwrap();
        let mut loaded = load_from_path(&path).unwrap();

        assert_eq!(loaded.players(), game.players());
        assert_eq!(loaded.side_to_move(), Color::White);
        assert_eq!(loaded.history(), game.history());
        for square in Square::all() {
            let before = game.position().piece_at(square);
            let after = loaded.position().piece_at(square);
            assert_eq!(
                before.map(|p| (p.kind(), p.color(), p.start(), p.categories())),
                after.map(|p| (p.kind(), p.color(), p.start(), p.categories())),
                "{square}"
            );
        }

        let applied = loaded.attempt_move_labels("b5", "c6").unwrap();
        assert_eq!(applied.category, MoveCategory::EnPassant);
        assert_eq!(applied.captured, Some(PieceKind::Pawn));
        assert!(loaded.position().piece_at(sq("c5")).is_none());
    }

    #[test]
    fn keeps_lost_castling_rights_and_mate_rule() {
        let mut game = Game::new("Ada", "Bert").with_mate_rule(MateRule::Strict);
        play(
            &mut game,
            &[("g1", "f3"), ("a7", "a6"), ("h1", "g1"), ("a6", "a5"), ("g1", "h1")],
        );
        let loaded = from_json(&to_json(&game).unwrap()).unwrap();
        assert_eq!(loaded.mate_rule(), MateRule::Strict);
        let rook = loaded.position().piece_at(Square::H1).unwrap();
        assert_eq!(rook.kind(), PieceKind::Rook);
        assert!(!rook.categories().can_castle());
    }

    #[test]
    fn pending_promotion_survives() {
        let mut game = GameBuilder::new("Ada", "Bert")
            .piece(PieceKind::King, Color::White, sq("e1"))
            .piece(PieceKind::King, Color::Black, sq("h5"))
            .piece(PieceKind::Pawn, Color::Black, sq("c2"))
            .side_to_move(Color::Black)
            .build()
            .unwrap();
        game.attempt_move_labels("c2", "c1").unwrap();

        let mut loaded = from_json(&to_json(&game).unwrap()).unwrap();
        assert_eq!(loaded.phase(), Phase::AwaitingPromotion(sq("c1")));
        loaded.promote(PieceKind::Rook).unwrap();
        assert_eq!(loaded.history()[0].promotion, Some(PieceKind::Rook));
        assert_eq!(loaded.side_to_move(), Color::White);
    }

    #[test]
    fn pending_promotion_with_a_discovered_check_loads() {
        let mut game = GameBuilder::new("Ada", "Bert")
            .piece(PieceKind::King, Color::White, sq("a1"))
            .piece(PieceKind::Rook, Color::White, sq("a7"))
            .piece(PieceKind::Pawn, Color::White, sq("g7"))
            .piece(PieceKind::King, Color::Black, sq("h7"))
            .build()
            .unwrap();
        game.attempt_move_labels("g7", "g8").unwrap();
        assert!(game.position().in_check(Color::Black));

        let mut loaded = from_json(&to_json(&game).unwrap()).unwrap();
        assert_eq!(loaded.phase(), Phase::AwaitingPromotion(sq("g8")));
        assert_eq!(loaded.side_to_move(), Color::White);
        loaded.promote(PieceKind::Queen).unwrap();
        assert_eq!(loaded.status(), crate::GameStatus::Check(Color::Black));
    }

    #[test]
    fn fails_closed() {
        let game = Game::new("Ada", "Bert");
        let mut saved = SavedGame::from_game(&game);

        saved.version = 99;
        assert!(matches!(
            saved.clone().into_game(),
            Err(SaveError::UnsupportedVersion(99))
        ));

        saved.version = SAVE_VERSION;
        let queen = saved
            .pieces
            .iter_mut()
            .find(|p| p.kind == PieceKind::Queen && p.color == Color::White)
            .unwrap();
        queen.kind = PieceKind::King;
        assert!(matches!(
            saved.into_game(),
            Err(SaveError::Corrupt(SetupError::KingCount {
                color: Color::White,
                count: 2
            }))
        ));

        assert!(matches!(from_json("{ not json"), Err(SaveError::Json(_))));
        assert!(matches!(
            load_from_path("/nonexistent/chess/save.json"),
            Err(SaveError::Io(_))
        ));
    }

    #[test]
    fn file_names_squares_not_ids() {
        let json = to_json(&Game::new("Ada", "Bert")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], SAVE_VERSION);
        assert_eq!(value["side_to_move"], "white");
        assert_eq!(value["pieces"][0]["square"], "a1");
        assert_eq!(value["pieces"][0]["kind"], "rook");
        assert!(value.get("en_passant").is_none());
    }
}
