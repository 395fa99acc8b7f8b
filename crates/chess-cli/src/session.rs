//! The prompt-and-move loop for one game.
//!
//! [`Session`] is generic over its input and output so the whole loop can be
//! driven from memory in tests.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chess_core::Square;
use chess_rules::{save, DrawReason, Game, GameError, GameStatus, Phase};
use tracing::{debug, info};

use crate::render::render_board;

const SELECTION_MESSAGE: &str = "Choose a Bishop (B), Rook (R), Knight (N), or Queen (Q)";

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The game reached a final status.
    Finished(GameStatus),
    /// The players saved the game to this file and left.
    Saved(PathBuf),
    /// Input ran out mid-game.
    Abandoned,
}

/// What the player typed at a square prompt.
enum Entry {
    Square(Square),
    Save,
    Closed,
}

pub struct Session<R, W> {
    game: Game,
    input: R,
    output: W,
    save_dir: PathBuf,
    color: bool,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(game: Game, input: R, output: W, save_dir: impl Into<PathBuf>, color: bool) -> Self {
        Session {
            game,
            input,
            output,
            save_dir: save_dir.into(),
            color,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Plays turns until the game ends, the players save, or input runs out.
    pub fn run(&mut self) -> Result<Outcome> {
        loop {
            let status = self.game.status();
            if status.is_over() {
                self.announce(status)?;
                return Ok(Outcome::Finished(status));
            }

            if matches!(self.game.phase(), Phase::AwaitingPromotion(_)) {
                if let Some(outcome) = self.choose_promotion()? {
                    return Ok(outcome);
                }
                continue;
            }

            self.draw(None)?;
            if let Some(outcome) = self.play_turn()? {
                return Ok(outcome);
            }
        }
    }

    /// Reads one origin and destination and tries the move. Returns an
    /// outcome when the session should stop.
    fn play_turn(&mut self) -> Result<Option<Outcome>> {
        let (from, prompt) = match self.game.forced_origin() {
            Some(king) => (king, "Your king is in check! Where will you move it?"),
            None => {
                let from = match self.select_origin()? {
                    Entry::Square(square) => square,
                    Entry::Save => return self.save().map(Some),
                    Entry::Closed => return Ok(Some(Outcome::Abandoned)),
                };
                (from, "Where do you want to move your piece?")
            }
        };

        self.draw(Some(from))?;
        let to = match self.read_square(prompt, Some(from))? {
            Entry::Square(square) => square,
            Entry::Save => return self.save().map(Some),
            Entry::Closed => return Ok(Some(Outcome::Abandoned)),
        };

        match self.game.attempt_move(from, to) {
            Ok(applied) => {
                info!(%from, %to, category = %applied.category, "move played");
            }
            Err(GameError::IllegalMove { .. }) => {
                self.draw(None)?;
                writeln!(self.output, "Sorry, that move is invalid.")?;
            }
            Err(e) => {
                writeln!(self.output, "Sorry, {e}.")?;
            }
        }
        Ok(None)
    }

    /// Asks for a square holding one of the side to move's pieces.
    fn select_origin(&mut self) -> Result<Entry> {
        let mut prompt = format!("Which piece are you moving {}?", self.game.current_player());
        loop {
            let entry = self.read_square(&prompt, None)?;
            let Entry::Square(square) = entry else {
                return Ok(entry);
            };
            let owned = self
                .game
                .position()
                .piece_at(square)
                .is_some_and(|piece| piece.color() == self.game.side_to_move());
            if owned {
                return Ok(Entry::Square(square));
            }
            self.draw(None)?;
            prompt = "You don't have a piece there. Pick another position.".to_string();
        }
    }

    /// Prompts until the player types a valid square label or `s`.
    fn read_square(&mut self, prompt: &str, highlight: Option<Square>) -> Result<Entry> {
        let mut prompt = prompt.to_string();
        loop {
            let Some(line) = self.prompt(&prompt)? else {
                return Ok(Entry::Closed);
            };
            if line.eq_ignore_ascii_case("s") {
                return Ok(Entry::Save);
            }
            match Square::from_label(&line) {
                Ok(square) => return Ok(Entry::Square(square)),
                Err(e) => {
                    debug!(error = %e, "rejected square input");
                    self.draw(highlight)?;
                    prompt =
                        "That's not a valid position on the board. Pick another position."
                            .to_string();
                }
            }
        }
    }

    fn choose_promotion(&mut self) -> Result<Option<Outcome>> {
        writeln!(self.output, "Your pawn can be promoted!")?;
        loop {
            let Some(line) = self.prompt(SELECTION_MESSAGE)? else {
                return Ok(Some(Outcome::Abandoned));
            };
            if line.eq_ignore_ascii_case("s") {
                return self.save().map(Some);
            }
            match self.game.promote_choice(&line) {
                Ok(()) => return Ok(None),
                Err(e) => {
                    debug!(error = %e, "rejected promotion input");
                    writeln!(self.output, "I didn't understand that.")?;
                }
            }
        }
    }

    /// Writes the prompt and reads a trimmed line. `None` at end of input.
    fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt} ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn draw(&mut self, highlight: Option<Square>) -> Result<()> {
        let board = render_board(self.game.position().board(), highlight, self.color);
        write!(self.output, "{board}")?;
        Ok(())
    }

    fn announce(&mut self, status: GameStatus) -> Result<()> {
        self.draw(None)?;
        match status {
            GameStatus::Checkmate { winner } => {
                let name = self.game.players().name(winner).to_string();
                writeln!(self.output, "Checkmate! {name} wins!")?;
            }
            GameStatus::Draw(DrawReason::InsufficientMaterial) => {
                writeln!(self.output, "Insufficient material! It's a draw!")?;
            }
            GameStatus::Draw(DrawReason::Stalemate) => {
                writeln!(self.output, "Stalemate! It's a draw!")?;
            }
            GameStatus::Ongoing | GameStatus::Check(_) => {}
        }
        Ok(())
    }

    fn save(&mut self) -> Result<Outcome> {
        let path = save_path(&self.save_dir, &self.game, chrono::Utc::now().timestamp());
        save::save_to_path(&self.game, &path)?;
        writeln!(self.output, "Game saved to {}. Goodbye!", path.display())?;
        Ok(Outcome::Saved(path))
    }
}

/// `<save_dir>/<white>_v_<black>_<unix time>.json`
pub fn save_path(save_dir: &Path, game: &Game, timestamp: i64) -> PathBuf {
    let players = game.players();
    save_dir.join(format!(
        "{}_v_{}_{timestamp}.json",
        file_safe(&players.white),
        file_safe(&players.black)
    ))
}

/// Keeps a player name usable as part of a file name.
fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
