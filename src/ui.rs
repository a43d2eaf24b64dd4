//! Terminal presentation.
//!
//! Everything here is cosmetic: the start-up banner and the highlight styles
//! for item ids and titles that show up inside log lines.  Colour can be
//! switched off globally with [`set_color`].

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::{
    cursor::MoveTo,
    execute, queue,
    style::{Color, Print, PrintStyledContent, Stylize},
    terminal::{self, Clear, ClearType},
};

const HEADLINE: &str = "TurnipMon - Animal Crossing New Horizons Turnip Market Monitor";

static COLOR: AtomicBool = AtomicBool::new(true);

pub fn set_color(enabled: bool) {
    COLOR.store(enabled, Ordering::Relaxed);
}

fn color_enabled() -> bool {
    COLOR.load(Ordering::Relaxed)
}

/// `[t3_abc]`, grey on light cyan.
pub fn id(id: &str) -> String {
    let text = format!("[{id}]");
    if color_enabled() {
        text.with(Color::Grey).on(Color::Cyan).to_string()
    } else {
        text
    }
}

/// Item title, grey on light magenta.
pub fn title(title: &str) -> String {
    if color_enabled() {
        title.with(Color::Grey).on(Color::Magenta).to_string()
    } else {
        title.to_string()
    }
}

/// Clear the screen and draw the centred header.
pub fn banner() -> io::Result<()> {
    let mut stdout = io::stdout();
    let width = terminal::size().map(|(w, _)| w as usize).unwrap_or(80);

    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;

    let logo = centre("TurnipMon", width);
    let header = centre(HEADLINE, width);
    if color_enabled() {
        queue!(
            stdout,
            PrintStyledContent(logo.as_str().cyan().bold()),
            Print("\n\n"),
            PrintStyledContent(header.as_str().black().on(Color::Blue)),
            Print("\n\n"),
        )?;
    } else {
        queue!(stdout, Print(logo), Print("\n\n"), Print(header), Print("\n\n"))?;
    }
    stdout.flush()
}

/// Pad `text` on both sides to `width` columns (no truncation).
fn centre(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}
