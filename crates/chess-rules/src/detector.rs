//! Check, checkmate and draw detection.

use chess_core::{Color, MoveCategory, PieceKind, Square};
use serde::{Deserialize, Serialize};

use crate::evaluator::Mode;
use crate::{Board, Piece, Position};

/// How checkmate is decided and how a side in check may respond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MateRule {
    /// A side in check may only move its king. Mate is declared when every
    /// empty square next to the king is attacked, or when the side is in
    /// check with no legal move at all.
    ///
    /// The first condition does not require the king to be in check and
    /// does not consider blocks or captures by other pieces.
    #[default]
    Adjacency,
    /// Any piece may answer check. Mate is declared only when the side is in
    /// check and has no legal move.
    Strict,
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawReason {
    /// No legal moves, not in check.
    Stalemate,
    /// Neither side can deliver mate with what is left.
    InsufficientMaterial,
}

/// State of the game from the side to move's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    /// The given side is in check.
    Check(Color),
    Checkmate {
        winner: Color,
    },
    Draw(DrawReason),
}

impl GameStatus {
    /// Returns true once no more moves may be played.
    pub const fn is_over(self) -> bool {
        matches!(self, GameStatus::Checkmate { .. } | GameStatus::Draw(_))
    }
}

/// A move available to the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegalMove {
    pub from: Square,
    pub to: Square,
    pub category: MoveCategory,
}

impl Position {
    /// Returns true if any piece of `side` attacks `square`.
    ///
    /// Kings never attack through the evaluator, so a king standing next to
    /// the square is counted here instead.
    pub fn square_attacked_by(&self, side: Color, square: Square) -> bool {
        if self.board().is_occupied_by(square, side) {
            return false;
        }
        self.pieces_of(side).any(|piece| {
            if piece.kind == PieceKind::King {
                piece.square != square && Board::one_space_away(piece.square, square)
            } else {
                self.threatens(piece, square)
            }
        })
    }

    fn threatens(&self, piece: &Piece, square: Square) -> bool {
        piece
            .categories
            .iter()
            .any(|category| self.can_move_via(piece, square, category, Mode::Threat))
    }

    /// Returns true if the defender's king is attacked.
    pub fn in_check(&self, defender: Color) -> bool {
        self.king(defender)
            .is_some_and(|king| self.square_attacked_by(defender.opposite(), king.square))
    }

    /// Returns true if the defender is mated under the given rule.
    pub fn checkmate(&self, defender: Color, rule: MateRule) -> bool {
        let Some(king) = self.king(defender) else {
            return false;
        };
        let no_escape = self.in_check(defender) && !self.has_legal_move(defender, rule);
        match rule {
            MateRule::Strict => no_escape,
            MateRule::Adjacency => self.flight_squares_covered(king) || no_escape,
        }
    }

    /// At least one empty square next to the king, and every one of them
    /// attacked.
    fn flight_squares_covered(&self, king: &Piece) -> bool {
        let attacker = king.color.opposite();
        let mut open = adjacent_squares(king.square)
            .filter(|&square| self.board().is_empty(square))
            .peekable();
        open.peek().is_some() && open.all(|square| self.square_attacked_by(attacker, square))
    }

    /// Returns true if neither side has enough material to mate.
    pub fn insufficient_material(&self) -> bool {
        let white: Vec<PieceKind> = self.pieces_of(Color::White).map(|p| p.kind).collect();
        let black: Vec<PieceKind> = self.pieces_of(Color::Black).map(|p| p.kind).collect();

        only_kings(&white) && only_kings(&black)
            || kings_and_knights(&white, &black)
            || kings_and_knights(&black, &white)
            || king_and_bishop(&white, &black)
            || king_and_bishop(&black, &white)
            || self.same_colored_bishops()
    }

    /// Kings and bishops only, at most four pieces, and every bishop on the
    /// same square colour.
    fn same_colored_bishops(&self) -> bool {
        if self.pieces().count() > 4
            || self
                .pieces()
                .any(|p| !matches!(p.kind, PieceKind::King | PieceKind::Bishop))
        {
            return false;
        }
        let mut bishops = self
            .pieces()
            .filter(|p| p.kind == PieceKind::Bishop)
            .map(|p| p.square.is_light());
        match bishops.next() {
            None => true,
            Some(first) => bishops.all(|light| light == first),
        }
    }

    /// Returns true if `side` is not in check and cannot move.
    pub fn stalemate(&self, side: Color, rule: MateRule) -> bool {
        !self.in_check(side) && !self.has_legal_move(side, rule)
    }

    /// Every legal move for `side`.
    pub fn legal_moves(&self, side: Color, rule: MateRule) -> Vec<LegalMove> {
        self.movable_pieces(side, rule)
            .flat_map(|piece| {
                Square::all().filter_map(move |to| {
                    self.legal_category(piece, to).map(|category| LegalMove {
                        from: piece.square,
                        to,
                        category,
                    })
                })
            })
            .collect()
    }

    pub fn has_legal_move(&self, side: Color, rule: MateRule) -> bool {
        self.movable_pieces(side, rule).any(|piece| {
            Square::all().any(|to| self.legal_category(piece, to).is_some())
        })
    }

    /// Pieces of `side` allowed to move this turn: only the king while in
    /// check under [`MateRule::Adjacency`].
    fn movable_pieces(&self, side: Color, rule: MateRule) -> impl Iterator<Item = &Piece> {
        let king_only = rule == MateRule::Adjacency && self.in_check(side);
        self.pieces_of(side)
            .filter(move |piece| !king_only || piece.kind == PieceKind::King)
    }

    /// Game status with `side` to move.
    pub fn status(&self, side: Color, rule: MateRule) -> GameStatus {
        if self.checkmate(side, rule) {
            GameStatus::Checkmate {
                winner: side.opposite(),
            }
        } else if self.insufficient_material() {
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        } else if self.stalemate(side, rule) {
            GameStatus::Draw(DrawReason::Stalemate)
        } else if self.in_check(side) {
            GameStatus::Check(side)
        } else {
            GameStatus::Ongoing
        }
    }
}

/// Squares one step from `square`, clipped at the board edge.
pub fn adjacent_squares(square: Square) -> impl Iterator<Item = Square> {
    (-1i8..=1)
        .flat_map(|d_row| (-1i8..=1).map(move |d_column| (d_row, d_column)))
        .filter(|&delta| delta != (0, 0))
        .filter_map(move |(d_row, d_column)| square.offset(d_row, d_column))
}

fn only_kings(pieces: &[PieceKind]) -> bool {
    pieces.iter().all(|&kind| kind == PieceKind::King)
}

fn kings_and_knights(king_only: &[PieceKind], other: &[PieceKind]) -> bool {
    only_kings(king_only)
        && other.len() < 4
        && other
            .iter()
            .all(|&kind| matches!(kind, PieceKind::King | PieceKind::Knight))
}

fn king_and_bishop(king_only: &[PieceKind], other: &[PieceKind]) -> bool {
    only_kings(king_only)
        && other.len() == 2
        && other
            .iter()
            .all(|&kind| matches!(kind, PieceKind::King | PieceKind::Bishop))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(label: &str) -> Square {
        Square::from_label(label).unwrap()
    }

    fn setup(pieces: &[(PieceKind, Color, &str)]) -> Position {
        let mut position = Position::empty();
        for &(kind, color, label) in pieces {
            position.insert(kind, color, sq(label));
        }
        position
    }

    #[test]
    fn adjacent_squares_clip_at_edges() {
        assert_eq!(adjacent_squares(sq("e4")).count(), 8);
        assert_eq!(adjacent_squares(sq("a4")).count(), 5);
        let mut corner: Vec<_> = adjacent_squares(Square::A8).map(Square::label).collect();
        corner.sort();
        assert_eq!(corner, vec!["a7", "b7", "b8"]);
    }

    #[test]
    fn startpos_is_quiet() {
        let position = Position::startpos();
        assert!(!position.in_check(Color::White));
        assert!(!position.in_check(Color::Black));
        assert_eq!(position.legal_moves(Color::White, MateRule::Adjacency).len(), 20);
        assert_eq!(
            position.status(Color::White, MateRule::Adjacency),
            GameStatus::Ongoing
        );
    }

    #[test]
    fn detects_check() {
        let position = setup(&[
            (PieceKind::King, Color::White, "e1"),
            (PieceKind::Bishop, Color::Black, "b4"),
            (PieceKind::Rook, Color::Black, "a8"),
            (PieceKind::King, Color::Black, "e8"),
        ]);
        assert!(position.in_check(Color::White));
        assert!(!position.in_check(Color::Black));
        assert_eq!(
            position.status(Color::White, MateRule::Adjacency),
            GameStatus::Check(Color::White)
        );
    }

    #[test]
    fn queen_and_king_cover_the_corner() {
        let position = setup(&[
            (PieceKind::King, Color::Black, "a8"),
            (PieceKind::King, Color::White, "a1"),
            (PieceKind::Queen, Color::White, "c7"),
        ]);
        assert!(position.checkmate(Color::Black, MateRule::Adjacency));
        assert_eq!(
            position.status(Color::Black, MateRule::Adjacency),
            GameStatus::Checkmate {
                winner: Color::White
            }
        );
        // Not in check, so the strict rule calls it stalemate.
        assert!(!position.checkmate(Color::Black, MateRule::Strict));
        assert_eq!(
            position.status(Color::Black, MateRule::Strict),
            GameStatus::Draw(DrawReason::Stalemate)
        );
    }

    #[test]
    fn open_flight_square_is_not_mate() {
        let position = setup(&[
            (PieceKind::King, Color::Black, "a8"),
            (PieceKind::King, Color::White, "a1"),
            (PieceKind::Queen, Color::White, "c6"),
        ]);
        // b8 is free of attack.
        assert!(!position.checkmate(Color::Black, MateRule::Adjacency));
    }

    #[test]
    fn back_rank_mate() {
        let position = setup(&[
            (PieceKind::King, Color::Black, "g8"),
            (PieceKind::Pawn, Color::Black, "f7"),
            (PieceKind::Pawn, Color::Black, "g7"),
            (PieceKind::Pawn, Color::Black, "h7"),
            (PieceKind::Rook, Color::White, "a8"),
            (PieceKind::King, Color::White, "g1"),
        ]);
        assert!(position.in_check(Color::Black));
        assert!(position.checkmate(Color::Black, MateRule::Adjacency));
        assert!(position.checkmate(Color::Black, MateRule::Strict));
    }

    #[test]
    fn smothered_king_with_no_open_square() {
        let position = setup(&[
            (PieceKind::King, Color::Black, "h8"),
            (PieceKind::Rook, Color::Black, "g8"),
            (PieceKind::Pawn, Color::Black, "g7"),
            (PieceKind::Pawn, Color::Black, "h7"),
            (PieceKind::Knight, Color::White, "f7"),
            (PieceKind::King, Color::White, "a1"),
        ]);
        assert!(position.in_check(Color::Black));
        assert!(position.checkmate(Color::Black, MateRule::Adjacency));
        assert!(position.checkmate(Color::Black, MateRule::Strict));
    }

    #[test]
    fn strict_rule_lets_other_pieces_answer_check() {
        let position = setup(&[
            (PieceKind::King, Color::Black, "g8"),
            (PieceKind::Pawn, Color::Black, "f7"),
            (PieceKind::Pawn, Color::Black, "g7"),
            (PieceKind::Pawn, Color::Black, "h7"),
            (PieceKind::Rook, Color::Black, "d1"),
            (PieceKind::Rook, Color::White, "a8"),
            (PieceKind::King, Color::White, "g1"),
        ]);
        // The rook on d1 can drop back to d8.
        assert!(!position.checkmate(Color::Black, MateRule::Strict));
        let moves = position.legal_moves(Color::Black, MateRule::Strict);
        assert_eq!(moves.len(), 1);
        assert_eq!((moves[0].from, moves[0].to), (sq("d1"), sq("d8")));
        // Under the adjacency rule only the king may move, and it cannot.
        assert!(position.checkmate(Color::Black, MateRule::Adjacency));
    }

    #[test]
    fn classic_stalemate() {
        let position = setup(&[
            (PieceKind::King, Color::Black, "h8"),
            (PieceKind::Queen, Color::White, "f7"),
            (PieceKind::King, Color::White, "g6"),
        ]);
        assert!(!position.in_check(Color::Black));
        assert!(position.stalemate(Color::Black, MateRule::Strict));
        assert_eq!(
            position.status(Color::Black, MateRule::Strict),
            GameStatus::Draw(DrawReason::Stalemate)
        );
    }

    #[test]
    fn insufficient_material_cases() {
        let drawn = [
            vec![
                (PieceKind::King, Color::White, "e1"),
                (PieceKind::King, Color::Black, "e8"),
            ],
            vec![
                (PieceKind::King, Color::White, "e1"),
                (PieceKind::Knight, Color::White, "b1"),
                (PieceKind::Knight, Color::White, "g1"),
                (PieceKind::King, Color::Black, "e8"),
            ],
            vec![
                (PieceKind::King, Color::White, "e1"),
                (PieceKind::King, Color::Black, "e8"),
                (PieceKind::Bishop, Color::Black, "c8"),
            ],
            vec![
                (PieceKind::King, Color::White, "e1"),
                (PieceKind::Bishop, Color::White, "f1"),
                (PieceKind::King, Color::Black, "e8"),
                (PieceKind::Bishop, Color::Black, "c8"),
            ],
        ];
        for pieces in &drawn {
            assert!(setup(pieces).insufficient_material(), "{pieces:?}");
        }

        let live = [
            vec![
                (PieceKind::King, Color::White, "e1"),
                (PieceKind::Pawn, Color::White, "e2"),
                (PieceKind::King, Color::Black, "e8"),
            ],
            vec![
                (PieceKind::King, Color::White, "e1"),
                (PieceKind::Rook, Color::White, "a1"),
                (PieceKind::King, Color::Black, "e8"),
            ],
            vec![
                (PieceKind::King, Color::White, "e1"),
                (PieceKind::Bishop, Color::White, "c1"),
                (PieceKind::Bishop, Color::White, "f1"),
                (PieceKind::King, Color::Black, "e8"),
            ],
        ];
        for pieces in &live {
            assert!(!setup(pieces).insufficient_material(), "{pieces:?}");
        }
    }

    #[test]
    fn status_reports_insufficient_material() {
        let position = setup(&[
            (PieceKind::King, Color::White, "e1"),
            (PieceKind::King, Color::Black, "e8"),
        ]);
        assert_eq!(
            position.status(Color::White, MateRule::Adjacency),
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        );
    }
}
