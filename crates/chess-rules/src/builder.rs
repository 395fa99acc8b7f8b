//! Building a [`Game`] from an arbitrary arrangement.
//!
//! Used to resume saved games and to set up positions in tests. Every
//! arrangement is checked before a game is handed out, so a `Game` never
//! starts from a state the rules could not have produced.

use std::collections::BTreeSet;

use chess_core::{Color, MoveCategory, MoveSet, PieceKind, Square};
use thiserror::Error;

use crate::castling::CASTLING_PAIRS;
use crate::game::PendingPromotion;
use crate::position::EnPassant;
use crate::{Board, Game, MateRule, MoveRecord, Piece, PieceId, Players, Position};

/// Why an arrangement was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("more than one piece on {0}")]
    DuplicateSquare(Square),
    #[error("{color} has {count} kings")]
    KingCount { color: Color, count: usize },
    #[error("the pawn on {0} cannot stand on that row")]
    MisplacedPawn(Square),
    #[error("no pawn can be taken en passant on {0}")]
    EnPassant(Square),
    #[error("no pawn is waiting to promote on {0}")]
    Promotion(Square),
    #[error("{0} is in check while the other side is to move")]
    OpponentInCheck(Color),
}

/// One piece of an arrangement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceSetup {
    pub kind: PieceKind,
    pub color: Color,
    pub start: Square,
    pub square: Square,
    pub categories: MoveSet,
}

impl PieceSetup {
    /// A piece standing on `square` with the categories its placement
    /// allows: no double push off the pawn row, no castling away from the
    /// castling squares.
    pub fn placed(kind: PieceKind, color: Color, square: Square) -> Self {
        let mut categories = kind.initial_categories();
        let on_back_row = square.row() == color.back_row();
        match kind {
            PieceKind::Pawn if square.row() != color.pawn_row() => {
                categories.remove(MoveCategory::TwoSpacesForward);
            }
            PieceKind::King
                if !(on_back_row && CASTLING_PAIRS.iter().any(|p| p.king_from == square)) =>
            {
                categories.remove(MoveCategory::Castling);
            }
            PieceKind::Rook
                if !(on_back_row && CASTLING_PAIRS.iter().any(|p| p.rook_from == square)) =>
            {
                categories.remove(MoveCategory::Castling);
            }
            _ => {}
        }
        PieceSetup {
            kind,
            color,
            start: square,
            square,
            categories,
        }
    }
}

/// Collects an arrangement and checks it in [`GameBuilder::build`].
#[derive(Debug, Clone)]
pub struct GameBuilder {
    players: Players,
    side_to_move: Color,
    mate_rule: MateRule,
    pieces: Vec<PieceSetup>,
    en_passant: Option<(Square, Square)>,
    pending_promotion: Option<MoveRecord>,
    history: Vec<MoveRecord>,
}

impl GameBuilder {
    pub fn new(white: impl Into<String>, black: impl Into<String>) -> Self {
        GameBuilder {
            players: Players::new(white, black),
            side_to_move: Color::White,
            mate_rule: MateRule::default(),
            pieces: Vec::new(),
            en_passant: None,
            pending_promotion: None,
            history: Vec::new(),
        }
    }

    /// Adds a piece with the categories its square allows.
    pub fn piece(self, kind: PieceKind, color: Color, square: Square) -> Self {
        self.placed(PieceSetup::placed(kind, color, square))
    }

    /// Adds a piece exactly as described.
    pub fn placed(mut self, piece: PieceSetup) -> Self {
        self.pieces.push(piece);
        self
    }

    pub fn side_to_move(mut self, color: Color) -> Self {
        self.side_to_move = color;
        self
    }

    pub fn mate_rule(mut self, mate_rule: MateRule) -> Self {
        self.mate_rule = mate_rule;
        self
    }

    /// Opens an en-passant window: `passed` is the square the pawn on
    /// `target` just crossed.
    pub fn en_passant(mut self, passed: Square, target: Square) -> Self {
        self.en_passant = Some((passed, target));
        self
    }

    /// Leaves the side to move halfway through a turn, with the pawn on
    /// `record.to` waiting to promote.
    pub fn pending_promotion(mut self, record: MoveRecord) -> Self {
        self.pending_promotion = Some(record);
        self
    }

    pub fn history(mut self, history: Vec<MoveRecord>) -> Self {
        self.history = history;
        self
    }

    pub fn build(self) -> Result<Game, SetupError> {
        let mut squares = BTreeSet::new();
        for piece in &self.pieces {
            if !squares.insert(piece.square) {
                return Err(SetupError::DuplicateSquare(piece.square));
            }
        }

        for color in Color::ALL {
            let count = self
                .pieces
                .iter()
                .filter(|p| p.color == color && p.kind == PieceKind::King)
                .count();
            if count != 1 {
                return Err(SetupError::KingCount { color, count });
            }
        }

        let promoting = self.pending_promotion.map(|record| record.to);
        for piece in self.pieces.iter().filter(|p| p.kind == PieceKind::Pawn) {
            let row = piece.square.row();
            let awaiting = promoting == Some(piece.square) && piece.color == self.side_to_move;
            if row == piece.color.back_row() || (row == piece.color.promotion_row() && !awaiting) {
                return Err(SetupError::MisplacedPawn(piece.square));
            }
        }

        let mut position = Position::empty();
        for setup in &self.pieces {
            let mut piece = Piece::new(PieceId(0), setup.kind, setup.color, setup.square);
            piece.start = setup.start;
            piece.categories = setup.categories;
            position.restore(piece);
        }

        let pending = match self.pending_promotion {
            Some(record) => {
                let pawn = position
                    .piece_at(record.to)
                    .filter(|p| p.kind == PieceKind::Pawn && p.color == self.side_to_move)
                    .filter(|p| p.can_promote())
                    .ok_or(SetupError::Promotion(record.to))?;
                Some(PendingPromotion {
                    pawn: pawn.id,
                    record,
                })
            }
            None => None,
        };

        let window = match self.en_passant {
            Some((passed, target)) => {
                Some(en_passant_window(&position, self.side_to_move, passed, target)?)
            }
            None => None,
        };
        grant_en_passant(&mut position, self.side_to_move, window);

        // Mid-promotion the pawn move may have given a discovered check.
        let opponent = self.side_to_move.opposite();
        if pending.is_none() && position.in_check(opponent) {
            return Err(SetupError::OpponentInCheck(opponent));
        }

        position.debug_assert_consistent();
        Ok(Game::from_parts(
            self.players,
            position,
            self.side_to_move,
            self.mate_rule,
            pending,
            self.history,
        ))
    }
}

/// The window left by the opponent's last move, if it could have been a
/// double push landing on `target`.
fn en_passant_window(
    position: &Position,
    side_to_move: Color,
    passed: Square,
    target: Square,
) -> Result<EnPassant, SetupError> {
    let pawn = position
        .piece_at(target)
        .filter(|p| p.kind == PieceKind::Pawn && p.color == side_to_move.opposite())
        .ok_or(SetupError::EnPassant(passed))?;
    let behind = target.offset(-pawn.color.pawn_direction(), 0);
    let landed = target.row() as i8 == pawn.color.pawn_row() as i8 + 2 * pawn.color.pawn_direction();
    if behind != Some(passed) || !landed || !position.board().is_empty(passed) {
        return Err(SetupError::EnPassant(passed));
    }
    Ok(EnPassant {
        square: passed,
        target: pawn.id,
    })
}

/// Gives `en_passant` to exactly the side to move's pawns beside the window's
/// target, and takes it from every other piece.
fn grant_en_passant(position: &mut Position, side_to_move: Color, window: Option<EnPassant>) {
    let target = window.and_then(|w| position.piece(w.target).map(|p| p.square));
    let eligible: Vec<PieceId> = match target {
        Some(target) => position
            .pieces_of(side_to_move)
            .filter(|p| {
                p.kind == PieceKind::Pawn
                    && Board::in_same_row(p.square, target)
                    && Board::n_columns_away(p.square, target, 1)
            })
            .map(|p| p.id)
            .collect(),
        None => Vec::new(),
    };
    let ids: Vec<PieceId> = position.pieces().map(|p| p.id).collect();
    for id in ids {
        if let Some(piece) = position.piece_mut(id) {
            if eligible.contains(&id) {
                piece.categories.insert(MoveCategory::EnPassant);
            } else {
                piece.categories.remove(MoveCategory::EnPassant);
            }
        }
    }
    position.set_en_passant(window);
}
