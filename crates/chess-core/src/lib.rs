//! Core types for chess.
//!
//! This crate provides the value types shared by the rules engine and the
//! command-line front end:
//! - [`Square`] for board coordinates and the `<file><rank>` label form
//! - [`Color`] for the two sides
//! - [`PieceKind`] for the six kinds of piece
//! - [`MoveCategory`] and [`MoveSet`] for the move patterns a piece may use

mod category;
mod color;
mod piece;
mod square;

pub use category::{MoveCategory, MoveSet};
pub use color::Color;
pub use piece::{PieceKind, PromotionError};
pub use square::{Square, SquareError};
