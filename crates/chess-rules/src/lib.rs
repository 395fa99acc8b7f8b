//! Rules of play for two-player chess.
//!
//! This crate provides:
//! - [`Board`] - the 8x8 grid and its geometry predicates
//! - [`Position`] - pieces in play, their one-time rights and the en-passant
//!   window
//! - Move legality per [`chess_core::MoveCategory`], in move and threat mode
//! - Check, checkmate, stalemate and insufficient-material detection
//! - [`Game`] - turn control, the promotion phase and move history
//! - [`GameBuilder`] - custom arrangements, validated before play
//! - Save files via [`save`]
//!
//! # Example
//!
//! ```
//! use chess_rules::{Game, GameStatus};
//!
//! let mut game = Game::new("Ada", "Bert");
//! game.attempt_move_labels("e2", "e4").unwrap();
//! game.attempt_move_labels("e7", "e5").unwrap();
//! assert_eq!(game.status(), GameStatus::Ongoing);
//! println!("{}", game.position().board());
//! ```

mod board;
mod builder;
pub mod castling;
mod detector;
mod evaluator;
mod game;
mod piece;
mod position;
pub mod save;

pub use board::{Board, Occupant};
pub use builder::{GameBuilder, PieceSetup, SetupError};
pub use detector::{adjacent_squares, DrawReason, GameStatus, LegalMove, MateRule};
pub use evaluator::Mode;
pub use game::{AppliedMove, Game, GameError, MoveRecord, Phase, Players};
pub use piece::{Piece, PieceId};
pub use position::{EnPassant, Position};
pub use save::{SaveError, SavedGame};
