//! chess - two players, one terminal.
//!
//! Starts a new game or resumes a saved one and hands it to the
//! prompt-and-move loop in [`session`].

mod config;
mod render;
mod session;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chess_rules::{save, Game, MateRule};
use clap::{Parser, Subcommand};
use config::Config;
use session::{Outcome, Session};
use tracing::Level;

#[derive(Parser)]
#[command(name = "chess")]
#[command(about = "Two-player chess in the terminal")]
struct Cli {
    /// Configuration file (defaults to chess.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new game
    New {
        /// Name of the white player
        #[arg(long)]
        white: Option<String>,
        /// Name of the black player
        #[arg(long)]
        black: Option<String>,
        /// Only declare mate when the side in check has no legal move
        #[arg(long)]
        strict: bool,
    },
    /// Resume a saved game
    Load {
        /// Save file written by an earlier game
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::from_str(&config.log_level).unwrap_or(Level::WARN)
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
    colored::control::set_override(config.color);

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let game = match cli.command {
        Commands::New {
            white,
            black,
            strict,
        } => {
            let white = match white.or_else(|| config.players.white.clone()) {
                Some(name) => name,
                None => ask_name(&mut input, "white")?,
            };
            let black = match black.or_else(|| config.players.black.clone()) {
                Some(name) => name,
                None => ask_name(&mut input, "black")?,
            };
            let mate_rule = if strict {
                MateRule::Strict
            } else {
                config.mate_rule
            };
            tracing::info!(%white, %black, ?mate_rule, "starting new game");
            Game::new(white, black).with_mate_rule(mate_rule)
        }
        Commands::Load { path } => save::load_from_path(&path)
            .with_context(|| format!("loading saved game from {}", path.display()))?,
    };

    let stdout = io::stdout();
    let mut session = Session::new(
        game,
        input,
        stdout.lock(),
        config.save_dir.clone(),
        config.color,
    );
    match session.run()? {
        Outcome::Finished(status) => tracing::info!(?status, "game over"),
        Outcome::Saved(path) => tracing::info!(path = %path.display(), "game saved"),
        Outcome::Abandoned => tracing::warn!("input closed before the game ended"),
    }
    Ok(())
}

/// Asks for a player's name on the terminal.
fn ask_name(input: &mut impl BufRead, color: &str) -> Result<String> {
    print!("Who is playing as {color}? ");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("no name given for the {color} player");
    }
    let name = line.trim();
    if name.is_empty() {
        Ok(color.to_string())
    } else {
        Ok(name.to_string())
    }
}
