//! Terminal styling for CLI output
//!
//! Commands being run are green and failures red, so a long
//! build log can be skimmed. `colored` turns itself off when NO_COLOR is set.

use colored::Colorize;

pub struct Theme;

impl Theme {
    /// Toolchain command lines
    pub fn command(text: &str) -> String {
        text.green().to_string()
    }

    /// Fatal errors on stderr
    pub fn error(text: &str) -> String {
        text.red().bold().to_string()
    }

    pub fn success(text: &str) -> String {
        text.green().bold().to_string()
    }

    pub fn warning(text: &str) -> String {
        text.yellow().to_string()
    }

    pub fn muted(text: &str) -> String {
        text.dimmed().to_string()
    }

    pub fn header(text: &str) -> String {
        text.bold().to_string()
    }

    pub fn value(text: &str) -> String {
        text.cyan().to_string()
    }

    pub fn divider(width: usize) -> String {
        "-".repeat(width)
    }

    pub fn divider_bold(width: usize) -> String {
        "=".repeat(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styling_keeps_text() {
        colored::control::set_override(false);
        assert_eq!(Theme::command("g++ -c a.cpp"), "g++ -c a.cpp");
        assert_eq!(Theme::error("Error:"), "Error:");
        assert_eq!(Theme::divider(3), "---");
        assert_eq!(Theme::divider_bold(2), "==");
        colored::control::unset_override();
    }
}
