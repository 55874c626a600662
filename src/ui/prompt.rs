//! Prompts and one-line messages

use crossterm::style::Stylize;
use std::io::{self, Write};

pub const STATE_PROMPT: &str = "Enter a state name (e.g. Michigan, michigan) or 'exit': ";
pub const SELECTION_PROMPT: &str = "Choose the number for a detailed search or 'exit' or 'back': ";

/// Writes a prompt without a trailing newline and flushes it
pub fn render_prompt(out: &mut impl Write, prompt: &str) -> io::Result<()> {
    write!(out, "{}", prompt)?;
    out.flush()
}

/// Writes a notice about invalid input or a recoverable problem
pub fn render_message(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "{}", message.yellow())
}
