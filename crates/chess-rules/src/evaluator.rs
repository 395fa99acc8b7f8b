//! Move legality, one check per [`MoveCategory`].
//!
//! Every check answers one of two questions, picked by [`Mode`]:
//! - [`Mode::Move`]: can this piece make this move on its own turn?
//! - [`Mode::Threat`]: does this piece attack that square? Pushes, king
//!   steps and castling never attack; a diagonal pawn step attacks whether or
//!   not something stands there.
//!
//! Checks only read the position. The self-check guard in
//! [`Position::legal_category`] runs the move on a clone.

use chess_core::{Color, MoveCategory, PieceKind, Square};

use crate::castling::castling_pair;
use crate::{Board, Piece, Position};

/// What a legality check is asked to decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The piece moving on its own turn.
    Move,
    /// The piece attacking a square, for check and king-safety analysis.
    Threat,
}

impl Position {
    /// Returns true if `piece` can reach `to` using `category`.
    ///
    /// A square held by the piece's own side is never reachable, in either
    /// mode. The piece's allowed categories are not consulted here; see
    /// [`Position::legal_category`].
    pub fn can_move_via(
        &self,
        piece: &Piece,
        to: Square,
        category: MoveCategory,
        mode: Mode,
    ) -> bool {
        if self.board().is_occupied_by(to, piece.color) {
            return false;
        }
        let from = piece.square;

        // A threat looks through the threatened side's king, so squares
        // behind a king on the attack line still count as covered.
        let allow_king_in_path = match mode {
            Mode::Move => None,
            Mode::Threat => Some(piece.color.opposite()),
        };

        match category {
            MoveCategory::OneSpaceForward => {
                mode == Mode::Move && self.pawn_push(piece, from, to, 1)
            }
            MoveCategory::TwoSpacesForward => {
                mode == Mode::Move && self.pawn_push(piece, from, to, 2)
            }
            MoveCategory::DiagonalToTake => {
                let geometry = Board::diagonally_accessible(from, to)
                    && Board::one_space_away(from, to)
                    && piece.is_forward(to);
                match mode {
                    Mode::Threat => geometry,
                    Mode::Move => {
                        geometry && self.board().is_occupied_by(to, piece.color.opposite())
                    }
                }
            }
            MoveCategory::EnPassant => mode == Mode::Move && self.en_passant_capture(piece, from, to),
            MoveCategory::Horizontal => {
                Board::in_same_row(from, to)
                    && self.board().horizontal_path_clear(from, to, allow_king_in_path)
            }
            MoveCategory::Vertical => {
                Board::in_same_column(from, to)
                    && self.board().vertical_path_clear(from, to, allow_king_in_path)
            }
            MoveCategory::Diagonal => {
                Board::diagonally_accessible(from, to)
                    && self.board().diagonal_path_clear(from, to, allow_king_in_path)
            }
            MoveCategory::Knight => Board::knight_accessible(from, to),
            MoveCategory::OneAnyDirection => {
                mode == Mode::Move
                    && Board::one_space_away(from, to)
                    && !self.square_attacked_by(piece.color.opposite(), to)
            }
            MoveCategory::Castling => mode == Mode::Move && self.castling(piece, from, to),
        }
    }

    /// Returns the first of the piece's allowed categories that takes it to
    /// `to` without leaving its own king attacked.
    pub fn legal_category(&self, piece: &Piece, to: Square) -> Option<MoveCategory> {
        piece.categories.iter().find(|&category| {
            self.can_move_via(piece, to, category, Mode::Move)
                && !self.leaves_king_attacked(piece, to, category)
        })
    }

    /// Plays the move on a scratch copy and asks whether the mover's king is
    /// attacked afterwards.
    fn leaves_king_attacked(&self, piece: &Piece, to: Square, category: MoveCategory) -> bool {
        let mut trial = self.clone();
        trial.apply(piece.id, to, category);
        trial.in_check(piece.color)
    }

    fn pawn_push(&self, piece: &Piece, from: Square, to: Square, distance: u8) -> bool {
        Board::in_same_column(from, to)
            && Board::n_rows_away(from, to, distance)
            && piece.is_forward(to)
            && self.board().vertical_path_clear(from, to, None)
            && self.board().is_empty(to)
    }

    fn en_passant_capture(&self, piece: &Piece, from: Square, to: Square) -> bool {
        let Some(window) = self.en_passant() else {
            return false;
        };
        window.square == to
            && Board::diagonally_accessible(from, to)
            && Board::one_space_away(from, to)
            && piece.is_forward(to)
            && self
                .piece(window.target)
                .is_some_and(|target| target.color != piece.color)
    }

    fn castling(&self, king: &Piece, from: Square, to: Square) -> bool {
        if king.kind != PieceKind::King {
            return false;
        }
        let Some(pair) = castling_pair(from, to) else {
            return false;
        };
        let rook_ready = self.piece_at(pair.rook_from).is_some_and(|rook| {
            rook.kind == PieceKind::Rook && rook.color == king.color && rook.categories.can_castle()
        });
        if !rook_ready || !self.board().horizontal_path_clear(from, pair.rook_from, None) {
            return false;
        }

        let opponent: Color = king.color.opposite();
        pair.king_route().all(|square| {
            !self.board().is_occupied_by(square, opponent)
                && !self.square_attacked_by(opponent, square)
        })
    }
}
