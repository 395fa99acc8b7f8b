//! Board state: pieces in play, the grid that mirrors them, and the
//! en-passant window.
//!
//! Every mutation goes through [`Position::relocate`], [`Position::insert`]
//! or [`Position::remove`], which update the piece map and the board cell in
//! the same call so the two never disagree.

use std::collections::BTreeMap;

use chess_core::{Color, MoveCategory, PieceKind, Square};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::castling::castling_pair;
use crate::{Board, Piece, PieceId};

/// The square a double-pushed pawn passed over, and that pawn.
///
/// Lives for exactly one reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnPassant {
    pub square: Square,
    pub target: PieceId,
}

/// Side effects of [`Position::apply`] that callers report back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Effects {
    pub captured: Option<PieceKind>,
}

/// Pieces in play and the board that mirrors them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    pieces: BTreeMap<PieceId, Piece>,
    next_id: u16,
    en_passant: Option<EnPassant>,
}

impl Default for Position {
    fn default() -> Self {
        Self::empty()
    }
}

impl Position {
    /// Creates a position with no pieces.
    pub fn empty() -> Self {
        Position {
            board: Board::empty(),
            pieces: BTreeMap::new(),
            next_id: 0,
            en_passant: None,
        }
    }

    /// Creates the standard 32-piece starting arrangement.
    pub fn startpos() -> Self {
        let mut position = Self::empty();
        for color in Color::ALL {
            for (column, kind) in (0u8..).zip(PieceKind::BACK_ROW) {
                if let Some(square) = Square::from_coordinates(color.back_row(), column) {
                    position.insert(kind, color, square);
                }
            }
            for column in 0..8 {
                if let Some(square) = Square::from_coordinates(color.pawn_row(), column) {
                    position.insert(PieceKind::Pawn, color, square);
                }
            }
        }
        position
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn en_passant(&self) -> Option<EnPassant> {
        self.en_passant
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    /// Returns the piece standing on a square.
    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.board.at(square).and_then(|occupant| self.pieces.get(&occupant.id))
    }

    /// All pieces in play, in id order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    /// The active pieces of one side.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> {
        self.pieces.values().filter(move |piece| piece.color == color)
    }

    pub fn king(&self, color: Color) -> Option<&Piece> {
        self.pieces_of(color)
            .find(|piece| piece.kind == PieceKind::King)
    }

    /// Places a new piece on an empty square and returns its id.
    pub(crate) fn insert(&mut self, kind: PieceKind, color: Color, square: Square) -> PieceId {
        self.restore(Piece::new(PieceId(self.next_id), kind, color, square))
    }

    /// Places a fully described piece (start square and categories already
    /// set), assigning it a fresh id.
    pub(crate) fn restore(&mut self, mut piece: Piece) -> PieceId {
        debug_assert!(self.board.is_empty(piece.square));
        let id = PieceId(self.next_id);
        self.next_id += 1;
        piece.id = id;
        self.board.set(piece.square, Some(piece.occupant()));
        self.pieces.insert(id, piece);
        id
    }

    pub(crate) fn set_en_passant(&mut self, en_passant: Option<EnPassant>) {
        self.en_passant = en_passant;
    }

    pub(crate) fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(&id)
    }

    /// Takes a piece out of play and clears its cell.
    pub(crate) fn remove(&mut self, id: PieceId) -> Option<Piece> {
        let piece = self.pieces.remove(&id)?;
        debug_assert_eq!(self.board.at(piece.square).map(|o| o.id), Some(id));
        self.board.set(piece.square, None);
        Some(piece)
    }

    /// Moves a piece to `to`, which must be empty.
    pub(crate) fn relocate(&mut self, id: PieceId, to: Square) {
        let Some(piece) = self.pieces.get_mut(&id) else {
            debug_assert!(false, "relocating unknown piece {id}");
            return;
        };
        debug_assert_eq!(self.board.at(piece.square).map(|o| o.id), Some(id));
        debug_assert!(self.board.is_empty(to));
        self.board.set(piece.square, None);
        self.board.set(to, Some(piece.occupant()));
        piece.square = to;
    }

    /// Applies a move whose category has already been validated.
    ///
    /// Runs every side effect except promotion: capture, castling rook hop,
    /// en-passant window bookkeeping, loss of one-time rights and the
    /// relocation itself.
    pub(crate) fn apply(&mut self, id: PieceId, to: Square, category: MoveCategory) -> Effects {
        let mut effects = Effects::default();
        let Some(mover) = self.pieces.get(&id).cloned() else {
            debug_assert!(false, "applying a move for unknown piece {id}");
            return effects;
        };
        let from = mover.square;
        // The previous window closes now, whatever this move is.
        let window = self.en_passant.take();

        if let Some(occupant) = self.board.at(to) {
            if occupant.color != mover.color {
                effects.captured = self.remove(occupant.id).map(|piece| piece.kind);
            }
        }

        if category == MoveCategory::Castling {
            self.hop_castling_rook(from, to);
        }

        if category == MoveCategory::TwoSpacesForward {
            self.open_en_passant_window(&mover, to);
        }

        if let Some(piece) = self.pieces.get_mut(&id) {
            match piece.kind {
                PieceKind::Pawn => piece.categories.remove(MoveCategory::TwoSpacesForward),
                PieceKind::King | PieceKind::Rook => {
                    piece.categories.remove(MoveCategory::Castling)
                }
                _ => {}
            }
        }

        if category == MoveCategory::EnPassant {
            if let Some(window) = window {
                effects.captured = self.remove(window.target).map(|piece| piece.kind);
            }
        }

        self.relocate(id, to);

        for piece in self.pieces.values_mut() {
            if piece.color == mover.color {
                piece.categories.remove(MoveCategory::EnPassant);
            }
        }

        effects
    }

    fn hop_castling_rook(&mut self, king_from: Square, king_to: Square) {
        let Some(pair) = castling_pair(king_from, king_to) else {
            debug_assert!(false, "castling from {king_from} to {king_to} is not registered");
            return;
        };
        let Some(rook) = self.board.at(pair.rook_from).map(|occupant| occupant.id) else {
            debug_assert!(false, "castling rook missing from {}", pair.rook_from);
            return;
        };
        self.relocate(rook, pair.rook_to);
        if let Some(rook) = self.pieces.get_mut(&rook) {
            rook.categories.remove(MoveCategory::Castling);
        }
        debug!(from = %pair.rook_from, to = %pair.rook_to, "castling rook relocated");
    }

    fn open_en_passant_window(&mut self, pawn: &Piece, landing: Square) {
        let Some(passed) = pawn.square.offset(pawn.color.pawn_direction(), 0) else {
            return;
        };
        self.en_passant = Some(EnPassant {
            square: passed,
            target: pawn.id,
        });

        let opponent = pawn.color.opposite();
        for piece in self.pieces.values_mut() {
            if piece.color == opponent
                && piece.kind == PieceKind::Pawn
                && Board::in_same_row(piece.square, landing)
                && Board::n_columns_away(piece.square, landing, 1)
            {
                piece.categories.insert(MoveCategory::EnPassant);
            }
        }
        debug!(square = %passed, target = %pawn.id, "en passant window opened");
    }

    /// Replaces a pawn with a new piece of the chosen kind on the same
    /// square. Returns the new piece's id.
    pub(crate) fn promote(&mut self, pawn: PieceId, kind: PieceKind) -> Option<PieceId> {
        let pawn = self.remove(pawn)?;
        debug_assert_eq!(pawn.kind, PieceKind::Pawn);
        Some(self.insert(kind, pawn.color, pawn.square))
    }

    /// Checks that every piece and its board cell agree. Debug builds only.
    pub(crate) fn debug_assert_consistent(&self) {
        if cfg!(debug_assertions) {
            for piece in self.pieces.values() {
                assert_eq!(
                    self.board.at(piece.square),
                    Some(piece.occupant()),
                    "piece {} is not on its recorded square {}",
                    piece.id,
                    piece.square
                );
            }
            assert_eq!(self.board.occupants().count(), self.pieces.len());
        }
    }
}
