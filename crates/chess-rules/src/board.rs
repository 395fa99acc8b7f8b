//! The 8x8 grid and its geometry predicates.
//!
//! The board owns no game rules. It records which piece sits on each square
//! and answers pure geometric questions about pairs of squares.

use std::fmt;

use chess_core::{Color, PieceKind, Square};

use crate::PieceId;

/// What a board cell records about the piece standing on it.
///
/// Kind and colour never change for a given id (promotion creates a new
/// piece), so the copy held by the board cannot go stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant {
    pub id: PieceId,
    pub kind: PieceKind,
    pub color: Color,
}

/// An 8x8 grid of optional occupants, indexed by [`Square`].
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Occupant>; Square::COUNT],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// Creates a board with every cell empty.
    pub const fn empty() -> Self {
        Board {
            cells: [None; Square::COUNT],
        }
    }

    /// Returns the occupant of a square, if any.
    #[inline]
    pub fn at(&self, square: Square) -> Option<Occupant> {
        self.cells[square.index() as usize]
    }

    /// Overwrites a cell.
    ///
    /// Callers keep the piece's own recorded square in step with this.
    #[inline]
    pub fn set(&mut self, square: Square, occupant: Option<Occupant>) {
        self.cells[square.index() as usize] = occupant;
    }

    #[inline]
    pub fn is_empty(&self, square: Square) -> bool {
        self.at(square).is_none()
    }

    /// Returns true if the square holds a piece of the given side.
    #[inline]
    pub fn is_occupied_by(&self, square: Square, color: Color) -> bool {
        self.at(square).is_some_and(|occupant| occupant.color == color)
    }

    /// Iterates over every occupied square.
    pub fn occupants(&self) -> impl Iterator<Item = (Square, Occupant)> + '_ {
        Square::all().filter_map(|square| self.at(square).map(|occupant| (square, occupant)))
    }

    #[inline]
    pub const fn in_same_row(from: Square, to: Square) -> bool {
        from.row() == to.row()
    }

    #[inline]
    pub const fn in_same_column(from: Square, to: Square) -> bool {
        from.column() == to.column()
    }

    /// Returns true if the squares share a diagonal (|Δrow| = |Δcol|).
    #[inline]
    pub const fn diagonally_accessible(from: Square, to: Square) -> bool {
        from.row().abs_diff(to.row()) == from.column().abs_diff(to.column())
    }

    /// Returns true if a knight could jump between the squares.
    #[inline]
    pub const fn knight_accessible(from: Square, to: Square) -> bool {
        let rows = from.row().abs_diff(to.row());
        let columns = from.column().abs_diff(to.column());
        (rows == 1 && columns == 2) || (rows == 2 && columns == 1)
    }

    /// Returns true if the squares are at most one step apart in every
    /// direction (Chebyshev distance <= 1).
    #[inline]
    pub const fn one_space_away(from: Square, to: Square) -> bool {
        from.row().abs_diff(to.row()) <= 1 && from.column().abs_diff(to.column()) <= 1
    }

    #[inline]
    pub const fn n_rows_away(from: Square, to: Square, n: u8) -> bool {
        from.row().abs_diff(to.row()) == n
    }

    #[inline]
    pub const fn n_columns_away(from: Square, to: Square, n: u8) -> bool {
        from.column().abs_diff(to.column()) == n
    }

    /// Returns true if every square strictly between `from` and `to` along a
    /// column is empty.
    ///
    /// `allow_king_in_path` names a side whose king does not block the walk.
    /// Occupancy of `to` itself is not examined.
    pub fn vertical_path_clear(
        &self,
        from: Square,
        to: Square,
        allow_king_in_path: Option<Color>,
    ) -> bool {
        debug_assert!(Self::in_same_column(from, to));
        self.path_clear(from, to, allow_king_in_path)
    }

    /// Row counterpart of [`Board::vertical_path_clear`].
    pub fn horizontal_path_clear(
        &self,
        from: Square,
        to: Square,
        allow_king_in_path: Option<Color>,
    ) -> bool {
        debug_assert!(Self::in_same_row(from, to));
        self.path_clear(from, to, allow_king_in_path)
    }

    /// Diagonal counterpart of [`Board::vertical_path_clear`].
    pub fn diagonal_path_clear(
        &self,
        from: Square,
        to: Square,
        allow_king_in_path: Option<Color>,
    ) -> bool {
        debug_assert!(Self::diagonally_accessible(from, to));
        self.path_clear(from, to, allow_king_in_path)
    }

    /// Walks unit steps from `from` (exclusive) to `to` (exclusive).
    ///
    /// Misaligned inputs walk off the board and report a blocked path.
    fn path_clear(&self, from: Square, to: Square, allow_king_in_path: Option<Color>) -> bool {
        let d_row = (to.row() as i8 - from.row() as i8).signum();
        let d_column = (to.column() as i8 - from.column() as i8).signum();

        let mut current = from;
        loop {
            let Some(next) = current.offset(d_row, d_column) else {
                return false;
            };
            if next == to {
                return true;
            }
            match self.at(next) {
                None => {}
                Some(occupant)
                    if occupant.kind == PieceKind::King
                        && allow_king_in_path == Some(occupant.color) => {}
                Some(_) => return false,
            }
            current = next;
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..8).rev() {
            write!(f, "{} ", row + 1)?;
            for column in 0..8 {
                let c = Square::from_coordinates(row, column)
                    .and_then(|square| self.at(square))
                    .map_or('.', |occupant| occupant.kind.letter(occupant.color));
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board(")?;
        writeln!(f, "{}", self)?;
        write!(f, ")")
    }
}
