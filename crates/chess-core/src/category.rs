//! Move categories and per-piece category sets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the fixed movement patterns a piece may attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MoveCategory {
    /// Pawn push to the empty square directly ahead.
    OneSpaceForward = 0,
    /// Pawn push over an empty square to the empty square beyond.
    TwoSpacesForward = 1,
    /// Pawn capture one square diagonally ahead.
    DiagonalToTake = 2,
    /// Pawn capture onto the square a double-pushed pawn passed over.
    EnPassant = 3,
    /// Any distance along a row.
    Horizontal = 4,
    /// Any distance along a column.
    Vertical = 5,
    /// Any distance along a diagonal.
    Diagonal = 6,
    /// The knight's L-shaped jump.
    Knight = 7,
    /// A king step to any neighbouring square.
    OneAnyDirection = 8,
    /// King moves two squares toward a partnered rook, which hops over it.
    Castling = 9,
}

impl MoveCategory {
    /// All categories, in evaluation order.
    pub const ALL: [MoveCategory; 10] = [
        MoveCategory::TwoSpacesForward,
        MoveCategory::OneSpaceForward,
        MoveCategory::DiagonalToTake,
        MoveCategory::EnPassant,
        MoveCategory::Horizontal,
        MoveCategory::Vertical,
        MoveCategory::Diagonal,
        MoveCategory::Knight,
        MoveCategory::OneAnyDirection,
        MoveCategory::Castling,
    ];

    #[inline]
    const fn bit(self) -> u16 {
        1 << self as u16
    }

    /// Returns the snake_case name used in save files and logs.
    pub const fn name(self) -> &'static str {
        match self {
            MoveCategory::OneSpaceForward => "one_space_forward",
            MoveCategory::TwoSpacesForward => "two_spaces_forward",
            MoveCategory::DiagonalToTake => "diagonal_to_take",
            MoveCategory::EnPassant => "en_passant",
            MoveCategory::Horizontal => "horizontal",
            MoveCategory::Vertical => "vertical",
            MoveCategory::Diagonal => "diagonal",
            MoveCategory::Knight => "knight",
            MoveCategory::OneAnyDirection => "one_any_direction",
            MoveCategory::Castling => "castling",
        }
    }

    /// Returns true if the category can only ever be used once per piece.
    #[inline]
    pub const fn is_one_time(self) -> bool {
        matches!(self, MoveCategory::TwoSpacesForward | MoveCategory::Castling)
    }
}

impl fmt::Display for MoveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of categories a piece is currently allowed to attempt.
///
/// Stored as a bit per category. The set only shrinks over a piece's life,
/// except for the single-reply `en_passant` grant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<MoveCategory>", into = "Vec<MoveCategory>")]
pub struct MoveSet(u16);

impl MoveSet {
    pub const EMPTY: MoveSet = MoveSet(0);

    /// Builds a set from a slice of categories.
    pub const fn of(categories: &[MoveCategory]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < categories.len() {
            bits |= categories[i].bit();
            i += 1;
        }
        MoveSet(bits)
    }

    #[inline]
    pub const fn contains(self, category: MoveCategory) -> bool {
        self.0 & category.bit() != 0
    }

    #[inline]
    pub fn insert(&mut self, category: MoveCategory) {
        self.0 |= category.bit();
    }

    #[inline]
    pub fn remove(&mut self, category: MoveCategory) {
        self.0 &= !category.bit();
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true while the piece still holds its castling right.
    #[inline]
    pub const fn can_castle(self) -> bool {
        self.contains(MoveCategory::Castling)
    }

    /// Returns true while a pawn may still advance two squares.
    #[inline]
    pub const fn can_double_push(self) -> bool {
        self.contains(MoveCategory::TwoSpacesForward)
    }

    /// Iterates the contained categories in evaluation order.
    pub fn iter(self) -> impl Iterator<Item = MoveCategory> {
        MoveCategory::ALL
            .into_iter()
            .filter(move |category| self.contains(*category))
    }
}

impl From<Vec<MoveCategory>> for MoveSet {
    fn from(categories: Vec<MoveCategory>) -> Self {
        let mut set = MoveSet::EMPTY;
        for category in categories {
            set.insert(category);
        }
        set
    }
}

impl From<MoveSet> for Vec<MoveCategory> {
    fn from(set: MoveSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for MoveSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
