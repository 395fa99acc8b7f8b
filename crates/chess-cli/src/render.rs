//! Terminal drawing of the board.

use chess_core::{Color, Square};
use chess_rules::{Board, Occupant};
use colored::{Color as Paint, Colorize};

const FILE_MARKERS: &str = "    a  b  c  d  e  f  g  h";

/// Draws the board with rank 8 at the top, optionally highlighting one
/// square.
///
/// With `color` off, pieces are letters (upper case for White), empty
/// squares are dots and the highlighted square is bracketed.
pub fn render_board(board: &Board, highlight: Option<Square>, color: bool) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(FILE_MARKERS);
    out.push_str("\n\n");
    for row in (0..8u8).rev() {
        let rank = row + 1;
        out.push_str(&format!("{rank}  "));
        for column in 0..8u8 {
            let Some(square) = Square::from_coordinates(row, column) else {
                continue;
            };
            let highlighted = highlight == Some(square);
            let cell = if color {
                painted_cell(board.at(square), square, highlighted)
            } else {
                plain_cell(board.at(square), highlighted)
            };
            out.push_str(&cell);
        }
        out.push_str(&format!("  {rank}\n"));
    }
    out.push('\n');
    out.push_str(FILE_MARKERS);
    out.push('\n');
    out
}

fn plain_cell(occupant: Option<Occupant>, highlighted: bool) -> String {
    let symbol = occupant.map_or('.', |o| o.kind.letter(o.color));
    if highlighted {
        format!("[{symbol}]")
    } else {
        format!(" {symbol} ")
    }
}

fn painted_cell(occupant: Option<Occupant>, square: Square, highlighted: bool) -> String {
    let background = if highlighted {
        Paint::BrightGreen
    } else if square.is_light() {
        Paint::BrightBlack
    } else {
        Paint::Black
    };
    let cell = match occupant {
        Some(o) => {
            let foreground = match o.color {
                Color::White => Paint::BrightWhite,
                Color::Black => Paint::Blue,
            };
            format!(" {} ", o.kind.glyph()).color(foreground)
        }
        None => "   ".normal(),
    };
    cell.on_color(background).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::Game;

    #[test]
    fn plain_board_has_rank_8_on_top() {
        let game = Game::new("Ada", "Bert");
        let text = render_board(game.position().board(), None, false);
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], FILE_MARKERS);
        assert_eq!(lines[1], "8   r  n  b  q  k  b  n  r   8");
        assert_eq!(lines[5], "4   .  .  .  .  .  .  .  .   4");
        assert_eq!(lines[8], "1   R  N  B  Q  K  B  N  R   1");
        assert_eq!(lines[9], FILE_MARKERS);
    }

    #[test]
    fn plain_highlight_brackets_the_square() {
        let game = Game::new("Ada", "Bert");
        let e2 = Square::from_label("e2").unwrap();
        let text = render_board(game.position().board(), Some(e2), false);
        assert!(text.contains("2   P  P  P  P [P] P  P  P   2"));
    }

    #[test]
    fn painted_board_uses_glyphs() {
        let game = Game::new("Ada", "Bert");
        let text = render_board(game.position().board(), None, true);
        assert!(text.contains('♚'));
        assert!(text.contains('♟'));
        assert!(!text.contains(" K "));
    }
}
