//! Piece kind representation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Color, MoveCategory, MoveSet};

/// Errors produced when reading a promotion choice.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PromotionError {
    #[error("invalid promotion choice: '{0}' (choose B, R, N or Q)")]
    InvalidChoice(String),
}

/// The six kinds of chess piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    /// All piece kinds in order.
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Kinds a pawn may promote to.
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Queen,
    ];

    /// Back-row layout from file `a` to file `h`.
    pub const BACK_ROW: [PieceKind; 8] = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];

    /// Returns the categories a freshly created piece of this kind may use.
    pub const fn initial_categories(self) -> MoveSet {
        use MoveCategory::*;
        match self {
            PieceKind::Pawn => MoveSet::of(&[TwoSpacesForward, OneSpaceForward, DiagonalToTake]),
            PieceKind::Rook => MoveSet::of(&[Horizontal, Vertical, Castling]),
            PieceKind::Knight => MoveSet::of(&[Knight]),
            PieceKind::Bishop => MoveSet::of(&[Diagonal]),
            PieceKind::Queen => MoveSet::of(&[Horizontal, Vertical, Diagonal]),
            PieceKind::King => MoveSet::of(&[OneAnyDirection, Castling]),
        }
    }

    /// Returns the Unicode glyph for this kind.
    ///
    /// The solid glyphs are used for both sides; the renderer tells the
    /// sides apart by colour.
    pub const fn glyph(self) -> char {
        match self {
            PieceKind::Pawn => '♟',
            PieceKind::Knight => '♞',
            PieceKind::Bishop => '♝',
            PieceKind::Rook => '♜',
            PieceKind::Queen => '♛',
            PieceKind::King => '♚',
        }
    }

    /// Returns an ASCII letter for this kind, upper case for White.
    pub const fn letter(self, color: Color) -> char {
        let c = match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Returns true if a pawn may promote to this kind.
    #[inline]
    pub const fn is_promotion_choice(self) -> bool {
        matches!(
            self,
            PieceKind::Bishop | PieceKind::Rook | PieceKind::Knight | PieceKind::Queen
        )
    }

    /// Parses a promotion choice: `B`, `R`, `N` (or `K`, for knight) or `Q`.
    pub fn from_promotion_choice(input: &str) -> Result<Self, PromotionError> {
        match input.trim().to_ascii_uppercase().as_str() {
            "B" | "BISHOP" => Ok(PieceKind::Bishop),
            "R" | "ROOK" => Ok(PieceKind::Rook),
            "N" | "K" | "KNIGHT" => Ok(PieceKind::Knight),
            "Q" | "QUEEN" => Ok(PieceKind::Queen),
            _ => Err(PromotionError::InvalidChoice(input.trim().to_string())),
        }
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PieceKind::Pawn => "Pawn",
            PieceKind::Knight => "Knight",
            PieceKind::Bishop => "Bishop",
            PieceKind::Rook => "Rook",
            PieceKind::Queen => "Queen",
            PieceKind::King => "King",
        };
        write!(f, "{}", name)
    }
}
