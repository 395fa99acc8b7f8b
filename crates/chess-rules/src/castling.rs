//! The fixed registry of castling moves.

use chess_core::Square;

/// One castling move: where the king goes and which rook hops over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingPair {
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
}

/// All four castling moves of the standard layout.
pub const CASTLING_PAIRS: [CastlingPair; 4] = [
    CastlingPair {
        king_from: Square::E1,
        king_to: Square::C1,
        rook_from: Square::A1,
        rook_to: Square::D1,
    },
    CastlingPair {
        king_from: Square::E1,
        king_to: Square::G1,
        rook_from: Square::H1,
        rook_to: Square::F1,
    },
    CastlingPair {
        king_from: Square::E8,
        king_to: Square::C8,
        rook_from: Square::A8,
        rook_to: Square::D8,
    },
    CastlingPair {
        king_from: Square::E8,
        king_to: Square::G8,
        rook_from: Square::H8,
        rook_to: Square::F8,
    },
];

/// Looks up the castling move a king would make going from `from` to `to`.
pub fn castling_pair(from: Square, to: Square) -> Option<&'static CastlingPair> {
    CASTLING_PAIRS
        .iter()
        .find(|pair| pair.king_from == from && pair.king_to == to)
}

impl CastlingPair {
    /// Squares the king stands on or crosses, origin and destination
    /// included.
    pub fn king_route(&self) -> impl Iterator<Item = Square> {
        let row = self.king_from.row();
        let (low, high) = if self.king_from.column() < self.king_to.column() {
            (self.king_from.column(), self.king_to.column())
        } else {
            (self.king_to.column(), self.king_from.column())
        };
        (low..=high).filter_map(move |column| Square::from_coordinates(row, column))
    }
}
