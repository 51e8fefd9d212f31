//! Color constants for the terminal user interface.

use ratatui::style::Color;

// Status colors follow the web-dashboard palette:
// green for done, amber for in progress, grey for queued work.

/// Used for Done tasks.
pub const DONE_GREEN: Color = Color::Rgb(34, 197, 94);
/// Used for In Progress tasks.
pub const PROGRESS_AMBER: Color = Color::Rgb(245, 158, 11);
/// Used for To Do tasks.
pub const TODO_GREY: Color = Color::Rgb(156, 163, 175);
/// Accent for selections and headers.
pub const ACCENT_BLUE: Color = Color::Rgb(59, 130, 246);
