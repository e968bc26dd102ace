//! Terminal detection.

use std::env;

/// Returns `true` if stdout is connected to a terminal.
pub fn is_tty() -> bool {
    crossterm::tty::IsTty::is_tty(&std::io::stdout())
}

/// Terminal width in columns, 80 when it cannot be determined.
pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(cols, _rows)| cols as usize)
        .unwrap_or(80)
}

/// Whether ANSI colour should be emitted.
///
/// - `NO_COLOR` (any value) disables colour (<https://no-color.org/>)
/// - `CLICOLOR=0` or `TERM=dumb` disable colour
/// - `CLICOLOR_FORCE` (any value) forces colour even when piped
/// - otherwise colour follows TTY detection
pub fn supports_color() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var("CLICOLOR").as_deref() == Ok("0") {
        return false;
    }
    if env::var("TERM").as_deref() == Ok("dumb") {
        return false;
    }
    if env::var_os("CLICOLOR_FORCE").is_some() {
        return true;
    }
    is_tty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_width_is_positive() {
        assert!(terminal_width() > 0);
    }
}
