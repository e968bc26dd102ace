//! Colour styling for bug fields.
//!
//! Palette follows Ayu Dark. Only states that need attention get colour:
//! New and In Progress are highlighted, Resolved and Closed are dimmed, and
//! High/Critical priorities stand out while Low/Medium stay neutral.

use bugsage_core::enums::{Priority, Status};
use owo_colors::OwoColorize;

use crate::terminal::supports_color;

type Rgb = (u8, u8, u8);

const WARN: Rgb = (0xff, 0xb4, 0x54);
const FAIL: Rgb = (0xf0, 0x71, 0x78);
const MUTED: Rgb = (0x6c, 0x76, 0x80);
const ACCENT: Rgb = (0x59, 0xc2, 0xff);

const STATUS_NEW: Rgb = ACCENT;
const STATUS_IN_PROGRESS: Rgb = WARN;
const STATUS_DONE: Rgb = (0x80, 0x90, 0xa0);

const PRIORITY_CRITICAL: Rgb = FAIL;
const PRIORITY_HIGH: Rgb = (0xff, 0x8f, 0x40);

pub const STATUS_ICON_NEW: &str = "\u{25CB}";
pub const STATUS_ICON_IN_PROGRESS: &str = "\u{25D0}";
pub const STATUS_ICON_RESOLVED: &str = "\u{2713}";
pub const STATUS_ICON_CLOSED: &str = "\u{2716}";

fn paint(s: &str, rgb: Option<Rgb>, bold: bool, enabled: bool) -> String {
    if !enabled {
        return s.to_string();
    }
    match (rgb, bold) {
        (Some((r, g, b)), true) => s.truecolor(r, g, b).bold().to_string(),
        (Some((r, g, b)), false) => s.truecolor(r, g, b).to_string(),
        (None, true) => s.bold().to_string(),
        (None, false) => s.to_string(),
    }
}

fn color_str(s: &str, rgb: Rgb) -> String {
    paint(s, Some(rgb), false, supports_color())
}

pub fn render_warn(s: &str) -> String {
    color_str(s, WARN)
}

pub fn render_muted(s: &str) -> String {
    color_str(s, MUTED)
}

pub fn render_bold(s: &str) -> String {
    paint(s, None, true, supports_color())
}

/// Section header: uppercase, bold accent.
pub fn render_category(s: &str) -> String {
    paint(&s.to_uppercase(), Some(ACCENT), true, supports_color())
}

pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::New => STATUS_ICON_NEW,
        Status::InProgress => STATUS_ICON_IN_PROGRESS,
        Status::Resolved => STATUS_ICON_RESOLVED,
        Status::Closed => STATUS_ICON_CLOSED,
    }
}

fn status_color(status: Status) -> Rgb {
    match status {
        Status::New => STATUS_NEW,
        Status::InProgress => STATUS_IN_PROGRESS,
        Status::Resolved | Status::Closed => STATUS_DONE,
    }
}

fn priority_color(priority: Priority) -> Option<Rgb> {
    match priority {
        Priority::Critical => Some(PRIORITY_CRITICAL),
        Priority::High => Some(PRIORITY_HIGH),
        Priority::Medium | Priority::Low => None,
    }
}

/// Status label with its icon, e.g. `◐ In Progress`.
pub fn render_status(status: Status) -> String {
    let label = format!("{} {}", status_icon(status), status.as_str());
    paint(&label, Some(status_color(status)), false, supports_color())
}

/// Priority label; Critical is bold.
pub fn render_priority(priority: Priority) -> String {
    paint(
        priority.as_str(),
        priority_color(priority),
        priority == Priority::Critical,
        supports_color(),
    )
}
