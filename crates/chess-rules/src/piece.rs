//! Pieces in play.

use std::fmt;

use chess_core::{Color, MoveCategory, MoveSet, PieceKind, Square};
use serde::{Deserialize, Serialize};

use crate::Occupant;

/// Stable identity of a piece for the whole game.
///
/// Ids are never reused, so removing a captured piece can never hit a
/// different piece that merely looks the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub(crate) u16);

impl PieceId {
    #[inline]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A piece on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub(crate) id: PieceId,
    pub(crate) kind: PieceKind,
    pub(crate) color: Color,
    /// Square the piece was created on. Never changes.
    pub(crate) start: Square,
    /// Square the piece stands on now, mirrored by the board cell.
    pub(crate) square: Square,
    pub(crate) categories: MoveSet,
}

impl Piece {
    /// Creates a piece with the full category set of its kind.
    pub(crate) fn new(id: PieceId, kind: PieceKind, color: Color, square: Square) -> Self {
        Piece {
            id,
            kind,
            color,
            start: square,
            square,
            categories: kind.initial_categories(),
        }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn start(&self) -> Square {
        self.start
    }

    pub fn square(&self) -> Square {
        self.square
    }

    /// Categories this piece may currently attempt.
    pub fn categories(&self) -> MoveSet {
        self.categories
    }

    #[inline]
    pub fn allows(&self, category: MoveCategory) -> bool {
        self.categories.contains(category)
    }

    /// The board-cell record for this piece.
    #[inline]
    pub fn occupant(&self) -> Occupant {
        Occupant {
            id: self.id,
            kind: self.kind,
            color: self.color,
        }
    }

    /// Returns true if `to` lies ahead of this piece from its side's point of
    /// view.
    #[inline]
    pub(crate) fn is_forward(&self, to: Square) -> bool {
        match self.color {
            Color::White => to.row() > self.square.row(),
            Color::Black => to.row() < self.square.row(),
        }
    }

    /// Returns true for a pawn standing on its side's far row.
    #[inline]
    pub(crate) fn can_promote(&self) -> bool {
        self.kind == PieceKind::Pawn && self.square.row() == self.color.promotion_row()
    }
}
