//! Text rendering for the interactive session
//!
//! Everything the user sees on stdout is written here. Functions take any
//! `Write` so the session can be driven and checked in tests.

pub mod nearby_places;
pub mod prompt;
pub mod site_list;

pub use nearby_places::render as render_nearby_places;
pub use prompt::{render_message, render_prompt, SELECTION_PROMPT, STATE_PROMPT};
pub use site_list::render as render_site_list;

/// Width of the horizontal rules around headings
const RULE_WIDTH: usize = 39;

/// Writes a heading framed by horizontal rules
fn write_heading(out: &mut impl std::io::Write, title: &str) -> std::io::Result<()> {
    use crossterm::style::Stylize;

    let rule = "-".repeat(RULE_WIDTH);
    writeln!(out, "{}", rule.as_str().dark_grey())?;
    writeln!(out, "{}", title.bold())?;
    writeln!(out, "{}", rule.as_str().dark_grey())
}
