//! Terminal presentation
//!
//! Pure `text -> styled text` helpers. A disabled palette returns its input
//! unchanged, so every renderer can be tested against plain strings.

use std::borrow::Cow;
use std::io::IsTerminal;

use crate::record::Record;

/// Shown for a required field that did not match
pub const PLACEHOLDER: &str = "N/A";
pub const ELLIPSIS: &str = "...";

const RESET: &str = "\x1b[0m";

/// ANSI color mapping, or nothing at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Colors on when stdout is a terminal and NO_COLOR is unset
    pub fn detect() -> Self {
        Self::new(!colors_disabled_by_env() && std::io::stdout().is_terminal())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn paint(&self, code: u8, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(1, text)
    }

    pub fn red(&self, text: &str) -> String {
        self.paint(31, text)
    }

    pub fn green(&self, text: &str) -> String {
        self.paint(32, text)
    }

    pub fn yellow(&self, text: &str) -> String {
        self.paint(33, text)
    }

    pub fn blue(&self, text: &str) -> String {
        self.paint(34, text)
    }

    pub fn magenta(&self, text: &str) -> String {
        self.paint(35, text)
    }

    pub fn cyan(&self, text: &str) -> String {
        self.paint(36, text)
    }

    pub fn error(&self, text: &str) -> String {
        self.red(text)
    }

    pub fn heading(&self, text: &str) -> String {
        self.yellow(text)
    }

    pub fn accent(&self, text: &str) -> String {
        self.cyan(text)
    }

    pub fn emphasis(&self, text: &str) -> String {
        self.bold(text)
    }

    pub fn info(&self, text: &str) -> String {
        self.green(text)
    }

    pub fn count(&self, text: &str) -> String {
        self.magenta(text)
    }

    pub fn frame(&self, text: &str) -> String {
        self.blue(text)
    }
}

/// NO_COLOR set to anything but "", "0" or "false"
pub fn colors_disabled_by_env() -> bool {
    std::env::var("NO_COLOR")
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
}

/// Cut `text` to `width` characters plus an ellipsis; shorter text is untouched
pub fn truncate(text: &str, width: usize) -> Cow<'_, str> {
    match text.char_indices().nth(width) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &text[..cut], ELLIPSIS)),
        None => Cow::Borrowed(text),
    }
}

pub fn rule(ch: char, width: usize) -> String {
    std::iter::repeat(ch).take(width).collect()
}

/// An indented line under a record's headline
#[derive(Debug, Clone, Copy)]
pub struct Detail {
    pub prefix: &'static str,
    pub field: &'static str,
    pub width: Option<usize>,
}

/// How a target's records are printed
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub headline: &'static str,
    pub details: &'static [Detail],
    pub blank_after: bool,
}

/// Numbered headline plus detail lines; details with no value are skipped
pub fn render_record(record: &Record, index: usize, layout: &Layout, palette: &Palette) -> String {
    let headline = record.get(layout.headline).unwrap_or(PLACEHOLDER);
    let mut out = format!("{index}. {}\n", palette.emphasis(headline));

    for detail in layout.details {
        if let Some(value) = record.get(detail.field) {
            let value = match detail.width {
                Some(width) => truncate(value, width),
                None => Cow::Borrowed(value),
            };
            out.push_str(&format!("   {}{}\n", detail.prefix, value));
        }
    }

    if layout.blank_after {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_boundary() {
        assert_eq!(truncate("abcdef", 6), "abcdef");
        assert_eq!(truncate("abcdefg", 6), "abcdef...");
        assert_eq!(truncate("abc", 6), "abc");
        assert_eq!(truncate("", 0), "");
        assert!(matches!(truncate("abcdef", 6), Cow::Borrowed(_)));
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("héllo wörld", 5), "héllo...");
        assert_eq!(truncate("“quoted”", 8), "“quoted”");
    }

    #[test]
    fn test_palette() {
        let on = Palette::new(true);
        assert_eq!(on.error("x"), "\x1b[31mx\x1b[0m");
        assert_eq!(on.emphasis("x"), "\x1b[1mx\x1b[0m");
        assert_eq!(Palette::plain().heading("x"), "x");
    }

    const BOOK: Layout = Layout {
        headline: "title",
        details: &[
            Detail {
                prefix: "- Price: ",
                field: "price",
                width: None,
            },
            Detail {
                prefix: "- Note: ",
                field: "note",
                width: Some(4),
            },
        ],
        blank_after: false,
    };

    #[test]
    fn test_render_record() {
        let record: Record = [("title", "Dune"), ("price", "£9.99"), ("note", "classic")]
            .into_iter()
            .collect();
        assert_eq!(
            render_record(&record, 3, &BOOK, &Palette::plain()),
            "3. Dune\n   - Price: £9.99\n   - Note: clas...\n"
        );
    }

    #[test]
    fn test_render_missing_fields() {
        let record: Record = [("price", "£1")].into_iter().collect();
        assert_eq!(
            render_record(&record, 1, &BOOK, &Palette::plain()),
            "1. N/A\n   - Price: £1\n"
        );
    }
}
