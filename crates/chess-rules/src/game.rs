//! Turn control: whose move it is, move attempts and the promotion phase.
//!
//! [`Game`] owns the [`Position`] and is the only thing that mutates it
//! between turns. A turn is either a single [`Game::attempt_move`] or, when a
//! pawn reaches its far row, an `attempt_move` followed by [`Game::promote`].

use chess_core::{Color, MoveCategory, PieceKind, PromotionError, Square, SquareError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{GameStatus, LegalMove, MateRule, PieceId, Position};

/// Errors returned by move and promotion attempts. All of them leave the
/// game unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    InvalidSquare(#[from] SquareError),
    #[error("there is no piece on {0}")]
    NoPieceAtOrigin(Square),
    #[error("the piece on {0} belongs to your opponent")]
    NotOwnerOfPiece(Square),
    #[error("illegal move from {from} to {to}")]
    IllegalMove { from: Square, to: Square },
    #[error("your king is in check and must move")]
    KingMustMove,
    #[error("a promotion must be chosen first")]
    PromotionPending,
    #[error("no promotion is pending")]
    NoPromotionPending,
    #[error("a pawn cannot promote to a {0}")]
    InvalidPromotion(PieceKind),
    #[error(transparent)]
    PromotionChoice(#[from] PromotionError),
    #[error("the game is over")]
    GameOver,
}

/// The two players' names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    pub white: String,
    pub black: String,
}

impl Players {
    pub fn new(white: impl Into<String>, black: impl Into<String>) -> Self {
        Players {
            white: white.into(),
            black: black.into(),
        }
    }

    pub fn name(&self, color: Color) -> &str {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }
}

/// A completed half-move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub color: Color,
    pub from: Square,
    pub to: Square,
    pub category: MoveCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured: Option<PieceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
}

/// What [`Game::attempt_move`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedMove {
    pub from: Square,
    pub to: Square,
    pub category: MoveCategory,
    pub captured: Option<PieceKind>,
    /// The moved pawn reached its far row; call [`Game::promote`] next.
    pub promotion_pending: bool,
}

/// What the game is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingMove,
    /// A pawn on the given square must be promoted before the turn ends.
    AwaitingPromotion(Square),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingPromotion {
    pub pawn: PieceId,
    pub record: MoveRecord,
}

/// A game between two players.
#[derive(Debug, Clone)]
pub struct Game {
    players: Players,
    position: Position,
    side_to_move: Color,
    mate_rule: MateRule,
    pending: Option<PendingPromotion>,
    history: Vec<MoveRecord>,
}

impl Game {
    /// Starts a game from the standard arrangement with White to move.
    pub fn new(white: impl Into<String>, black: impl Into<String>) -> Self {
        Game {
            players: Players::new(white, black),
            position: Position::startpos(),
            side_to_move: Color::White,
            mate_rule: MateRule::default(),
            pending: None,
            history: Vec::new(),
        }
    }

    /// Assembles a game from parts already checked by the builder.
    pub(crate) fn from_parts(
        players: Players,
        position: Position,
        side_to_move: Color,
        mate_rule: MateRule,
        pending: Option<PendingPromotion>,
        history: Vec<MoveRecord>,
    ) -> Self {
        Game {
            players,
            position,
            side_to_move,
            mate_rule,
            pending,
            history,
        }
    }

    pub fn with_mate_rule(mut self, mate_rule: MateRule) -> Self {
        self.mate_rule = mate_rule;
        self
    }

    pub fn players(&self) -> &Players {
        &self.players
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn mate_rule(&self) -> MateRule {
        self.mate_rule
    }

    /// Completed half-moves, oldest first.
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn phase(&self) -> Phase {
        match &self.pending {
            Some(pending) => Phase::AwaitingPromotion(pending.record.to),
            None => Phase::AwaitingMove,
        }
    }

    pub(crate) fn pending(&self) -> Option<&PendingPromotion> {
        self.pending.as_ref()
    }

    /// Name of the player to move.
    pub fn current_player(&self) -> &str {
        self.players.name(self.side_to_move)
    }

    /// The game's status. Always [`GameStatus::Ongoing`] while a promotion
    /// is pending, since the turn has not ended yet.
    pub fn status(&self) -> GameStatus {
        if self.pending.is_some() {
            return GameStatus::Ongoing;
        }
        self.position.status(self.side_to_move, self.mate_rule)
    }

    /// The only square a piece may be moved from this turn, if the choice is
    /// forced: the king's square while in check under
    /// [`MateRule::Adjacency`].
    pub fn forced_origin(&self) -> Option<Square> {
        if self.mate_rule != MateRule::Adjacency || !self.position.in_check(self.side_to_move) {
            return None;
        }
        self.position
            .king(self.side_to_move)
            .map(|king| king.square())
    }

    /// Every move the side to move may attempt. Empty while a promotion is
    /// pending.
    pub fn legal_moves(&self) -> Vec<LegalMove> {
        if self.pending.is_some() {
            return Vec::new();
        }
        self.position.legal_moves(self.side_to_move, self.mate_rule)
    }

    /// Moves the side to move's piece on `from` to `to`.
    ///
    /// On success the side to move switches, unless a pawn reached its far
    /// row, in which case the game waits for [`Game::promote`].
    pub fn attempt_move(&mut self, from: Square, to: Square) -> Result<AppliedMove, GameError> {
        if self.pending.is_some() {
            return Err(GameError::PromotionPending);
        }
        if self.status().is_over() {
            return Err(GameError::GameOver);
        }

        let piece = self
            .position
            .piece_at(from)
            .ok_or(GameError::NoPieceAtOrigin(from))?;
        if piece.color() != self.side_to_move {
            return Err(GameError::NotOwnerOfPiece(from));
        }
        if self.forced_origin().is_some_and(|king| king != from) {
            return Err(GameError::KingMustMove);
        }
        let category = self
            .position
            .legal_category(piece, to)
            .ok_or(GameError::IllegalMove { from, to })?;
        let id = piece.id();

        let effects = self.position.apply(id, to, category);
        self.position.debug_assert_consistent();
        debug!(
            color = %self.side_to_move,
            %from,
            %to,
            %category,
            captured = ?effects.captured,
            "move applied"
        );

        let record = MoveRecord {
            color: self.side_to_move,
            from,
            to,
            category,
            captured: effects.captured,
            promotion: None,
        };
        let promotion_pending = self
            .position
            .piece(id)
            .is_some_and(|piece| piece.can_promote());
        if promotion_pending {
            debug!(square = %to, "promotion pending");
            self.pending = Some(PendingPromotion { pawn: id, record });
        } else {
            self.finish_turn(record);
        }

        Ok(AppliedMove {
            from,
            to,
            category,
            captured: effects.captured,
            promotion_pending,
        })
    }

    /// [`Game::attempt_move`] with squares given as labels such as `"e2"`.
    pub fn attempt_move_labels(&mut self, from: &str, to: &str) -> Result<AppliedMove, GameError> {
        let from = Square::from_label(from)?;
        let to = Square::from_label(to)?;
        self.attempt_move(from, to)
    }

    /// Replaces the pending pawn with a piece of `kind` and ends the turn.
    pub fn promote(&mut self, kind: PieceKind) -> Result<(), GameError> {
        if !kind.is_promotion_choice() {
            return Err(GameError::InvalidPromotion(kind));
        }
        let Some(PendingPromotion { pawn, mut record }) = self.pending.take() else {
            return Err(GameError::NoPromotionPending);
        };

        self.position.promote(pawn, kind);
        self.position.debug_assert_consistent();
        debug!(square = %record.to, %kind, "pawn promoted");

        record.promotion = Some(kind);
        self.finish_turn(record);
        Ok(())
    }

    /// [`Game::promote`] with the choice given as `B`, `R`, `N` or `Q`.
    pub fn promote_choice(&mut self, choice: &str) -> Result<(), GameError> {
        if self.pending.is_none() {
            return Err(GameError::NoPromotionPending);
        }
        let kind = PieceKind::from_promotion_choice(choice)?;
        self.promote(kind)
    }

    fn finish_turn(&mut self, record: MoveRecord) {
        self.history.push(record);
        self.side_to_move = self.side_to_move.opposite();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DrawReason, GameBuilder};

    fn sq(label: &str) -> Square {
        Square::from_label(label).unwrap()
    }

    #[test]
    fn new_game() {
        let game = Game::new("Ada", "Bert");
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.current_player(), "Ada");
        assert_eq!(game.players().name(Color::Black), "Bert");
        assert_eq!(game.phase(), Phase::AwaitingMove);
        assert_eq!(game.status(), GameStatus::Ongoing);
        assert_eq!(game.legal_moves().len(), 20);
        assert!(game.history().is_empty());
    }

    #[test]
    fn first_moves_switch_sides() {
        let mut game = Game::new("Ada", "Bert");
        let applied = game.attempt_move_labels("e2", "e4").unwrap();
        assert_eq!(applied.category, MoveCategory::TwoSpacesForward);
        assert!(!applied.promotion_pending);
        assert_eq!(game.side_to_move(), Color::Black);
        assert_eq!(game.position().en_passant().map(|w| w.square), Some(sq("e3")));

        let applied = game.attempt_move_labels("g8", "f6").unwrap();
        assert_eq!(applied.category, MoveCategory::Knight);
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.position().en_passant(), None);
        assert_eq!(game.history().len(), 2);
        assert_eq!(game.history()[1].color, Color::Black);
    }

    #[test]
    fn recoverable_errors_leave_the_game_unchanged() {
        let mut game = Game::new("Ada", "Bert");
        assert!(matches!(
            game.attempt_move_labels("z9", "e4"),
            Err(GameError::InvalidSquare(_))
        ));
        assert_eq!(
            game.attempt_move_labels("e4", "e5"),
            Err(GameError::NoPieceAtOrigin(sq("e4")))
        );
        assert_eq!(
            game.attempt_move_labels("e7", "e5"),
            Err(GameError::NotOwnerOfPiece(sq("e7")))
        );
        assert_eq!(
            game.attempt_move_labels("e2", "e5"),
            Err(GameError::IllegalMove {
                from: sq("e2"),
                to: sq("e5")
            })
        );
        assert_eq!(game.side_to_move(), Color::White);
        assert!(game.history().is_empty());
        assert_eq!(game.position(), &Position::startpos());
    }

    #[test]
    fn fools_mate() {
        for rule in [MateRule::Adjacency, MateRule::Strict] {
            let mut game = Game::new("Ada", "Bert").with_mate_rule(rule);
            game.attempt_move_labels("f2", "f3").unwrap();
            game.attempt_move_labels("e7", "e5").unwrap();
            game.attempt_move_labels("g2", "g4").unwrap();
            game.attempt_move_labels("d8", "h4").unwrap();
            assert_eq!(
                game.status(),
                GameStatus::Checkmate {
                    winner: Color::Black
                },
                "{rule:?}"
            );
            assert_eq!(
                game.attempt_move_labels("a2", "a3"),
                Err(GameError::GameOver)
            );
        }
    }

    #[test]
    fn only_the_king_answers_check_by_default() {
        let builder = GameBuilder::new("Ada", "Bert")
            .piece(PieceKind::King, Color::White, sq("e1"))
            .piece(PieceKind::Rook, Color::White, sq("a2"))
            .piece(PieceKind::Rook, Color::Black, sq("e8"))
            .piece(PieceKind::King, Color::Black, sq("h8"));

        let mut game = builder.clone().build().unwrap();
        assert_eq!(game.status(), GameStatus::Check(Color::White));
        assert_eq!(game.forced_origin(), Some(sq("e1")));
        assert_eq!(
            game.attempt_move_labels("a2", "e2"),
            Err(GameError::KingMustMove)
        );
        assert!(game.legal_moves().iter().all(|m| m.from == sq("e1")));
        game.attempt_move_labels("e1", "d1").unwrap();

        let mut game = builder.mate_rule(MateRule::Strict).build().unwrap();
        assert_eq!(game.forced_origin(), None);
        game.attempt_move_labels("a2", "e2").unwrap();
        assert_eq!(game.status(), GameStatus::Ongoing);
    }

    #[test]
    fn promotion_completes_the_turn() {
        let mut game = GameBuilder::new("Ada", "Bert")
            .piece(PieceKind::King, Color::White, sq("e1"))
            .piece(PieceKind::Pawn, Color::White, sq("b7"))
            .piece(PieceKind::King, Color::Black, sq("h5"))
            .build()
            .unwrap();

        let applied = game.attempt_move_labels("b7", "b8").unwrap();
        assert!(applied.promotion_pending);
        assert_eq!(game.phase(), Phase::AwaitingPromotion(sq("b8")));
        assert_eq!(game.side_to_move(), Color::White);
        assert!(game.legal_moves().is_empty());
        assert_eq!(
            game.attempt_move_labels("e1", "e2"),
            Err(GameError::PromotionPending)
        );
        assert_eq!(
            game.promote(PieceKind::Pawn),
            Err(GameError::InvalidPromotion(PieceKind::Pawn))
        );
        assert!(matches!(
            game.promote_choice("x"),
            Err(GameError::PromotionChoice(_))
        ));

        game.promote_choice("q").unwrap();
        let queen = game.position().piece_at(sq("b8")).unwrap();
        assert_eq!(queen.kind(), PieceKind::Queen);
        assert_eq!(queen.categories(), PieceKind::Queen.initial_categories());
        assert_eq!(game.side_to_move(), Color::Black);
        assert_eq!(game.phase(), Phase::AwaitingMove);
        assert_eq!(game.history()[0].promotion, Some(PieceKind::Queen));
        assert_eq!(game.promote(PieceKind::Queen), Err(GameError::NoPromotionPending));
    }

    #[test]
    fn pending_promotion_is_not_a_stalemate() {
        let mut game = GameBuilder::new("Ada", "Bert")
            .piece(PieceKind::King, Color::White, sq("a1"))
            .piece(PieceKind::Pawn, Color::White, sq("b7"))
            .piece(PieceKind::Rook, Color::Black, sq("b3"))
            .piece(PieceKind::Rook, Color::Black, sq("c2"))
            .piece(PieceKind::King, Color::Black, sq("h5"))
            .mate_rule(MateRule::Strict)
            .build()
            .unwrap();
        assert_eq!(game.legal_moves().len(), 1);

        game.attempt_move_labels("b7", "b8").unwrap();
        assert_eq!(game.phase(), Phase::AwaitingPromotion(sq("b8")));
        assert_eq!(game.status(), GameStatus::Ongoing);

        game.promote(PieceKind::Queen).unwrap();
        assert_eq!(game.side_to_move(), Color::Black);
        assert_eq!(game.status(), GameStatus::Ongoing);
    }

    #[test]
    fn captures_are_recorded() {
        let mut game = Game::new("Ada", "Bert");
        for (from, to) in [("e2", "e4"), ("d7", "d5")] {
            game.attempt_move_labels(from, to).unwrap();
        }
        let applied = game.attempt_move_labels("e4", "d5").unwrap();
        assert_eq!(applied.category, MoveCategory::DiagonalToTake);
        assert_eq!(applied.captured, Some(PieceKind::Pawn));
        assert_eq!(game.position().pieces_of(Color::Black).count(), 15);
        assert_eq!(game.history()[2].captured, Some(PieceKind::Pawn));
    }

    #[test]
    fn bare_kings_end_the_game() {
        let mut game = GameBuilder::new("Ada", "Bert")
            .piece(PieceKind::King, Color::White, sq("e1"))
            .piece(PieceKind::King, Color::Black, sq("e8"))
            .build()
            .unwrap();
        assert_eq!(
            game.status(),
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        );
        assert_eq!(game.attempt_move_labels("e1", "e2"), Err(GameError::GameOver));
    }
}
