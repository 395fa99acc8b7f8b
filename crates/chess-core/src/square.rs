//! Board square representation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when converting text into a [`Square`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SquareError {
    /// The label is not a file letter `a`-`h` followed by a rank digit `1`-`8`.
    #[error("invalid square label: '{0}'")]
    InvalidLabel(String),
}

/// A square on the chess board.
///
/// Squares are addressed by a zero-based `(row, column)` pair where row 0 is
/// rank 1 and column 0 is file `a`. Internally the pair is packed into a
/// single index in little-endian rank-file order:
/// - a1 = 0, b1 = 1, ..., h1 = 7
/// - a2 = 8, ..., h8 = 63
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square(u8);

impl Square {
    /// Number of squares on the board.
    pub const COUNT: usize = 64;

    /// Creates a square from a zero-based row and column.
    #[inline]
    pub const fn from_coordinates(row: u8, column: u8) -> Option<Self> {
        if row < 8 && column < 8 {
            Some(Square(row * 8 + column))
        } else {
            None
        }
    }

    /// Creates a square from index (0-63).
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Parses a two-character label such as `"e4"`.
    ///
    /// The file letter may be upper or lower case; anything other than
    /// exactly two characters naming one of the 64 squares is refused.
    pub fn from_label(label: &str) -> Result<Self, SquareError> {
        let invalid = || SquareError::InvalidLabel(label.to_string());
        let bytes = label.as_bytes();
        if bytes.len() != 2 {
            return Err(invalid());
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(invalid());
        }
        Ok(Square((rank - b'1') * 8 + (file - b'a')))
    }

    /// Returns the index (0-63).
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Returns the zero-based row (rank 1 is row 0).
    #[inline]
    pub const fn row(self) -> u8 {
        self.0 / 8
    }

    /// Returns the zero-based column (file `a` is column 0).
    #[inline]
    pub const fn column(self) -> u8 {
        self.0 % 8
    }

    /// Returns the file letter, `'a'` to `'h'`.
    #[inline]
    pub const fn file_char(self) -> char {
        (b'a' + self.column()) as char
    }

    /// Returns the rank digit, `'1'` to `'8'`.
    #[inline]
    pub const fn rank_char(self) -> char {
        (b'1' + self.row()) as char
    }

    /// Returns the `<file><rank>` label for this square.
    pub fn label(self) -> String {
        format!("{}{}", self.file_char(), self.rank_char())
    }

    /// Returns the square shifted by the given row and column deltas, or
    /// `None` if that falls off the board.
    pub fn offset(self, d_row: i8, d_column: i8) -> Option<Self> {
        let row = self.row() as i8 + d_row;
        let column = self.column() as i8 + d_column;
        if (0..8).contains(&row) && (0..8).contains(&column) {
            Self::from_coordinates(row as u8, column as u8)
        } else {
            None
        }
    }

    /// Returns true for light squares (h1 and a8 are light, a1 is dark).
    #[inline]
    pub const fn is_light(self) -> bool {
        (self.row() + self.column()) % 2 == 1
    }

    /// Iterates over all 64 squares, a1 first, h8 last.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).map(Square)
    }

    // Squares named by the castling registry and the starting layout.
    pub const A1: Square = Square(0);
    pub const B1: Square = Square(1);
    pub const C1: Square = Square(2);
    pub const D1: Square = Square(3);
    pub const E1: Square = Square(4);
    pub const F1: Square = Square(5);
    pub const G1: Square = Square(6);
    pub const H1: Square = Square(7);
    pub const A8: Square = Square(56);
    pub const B8: Square = Square(57);
    pub const C8: Square = Square(58);
    pub const D8: Square = Square(59);
    pub const E8: Square = Square(60);
    pub const F8: Square = Square(61);
    pub const G8: Square = Square(62);
    pub const H8: Square = Square(63);
}

impl FromStr for Square {
    type Err = SquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

impl TryFrom<String> for Square {
    type Error = SquareError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_label(&value)
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.label()
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({})", self.label())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}
