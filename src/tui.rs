use ratatui::style::{Color, Modifier, Style};

use crate::render::RowClass;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const PAID_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
pub const OVERDUE_STYLE: Style = Style::new().fg(Color::Red);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

pub const CURSOR_CELL_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Cyan);

/// Row highlight for a status class.
pub fn row_style(class: RowClass) -> Style {
    match class {
        RowClass::Paid => PAID_STYLE,
        RowClass::Overdue => OVERDUE_STYLE,
        RowClass::Plain => Style::new(),
    }
}

/// Truncate text to a given width with an ellipsis.
pub fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('\u{2026}');
    cut
}

/// Wrap text to a given width, one string per line.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    textwrap::wrap(text, width).into_iter().map(|l| l.into_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_short_text_unchanged() {
        assert_eq!(clip("Acme", 10), "Acme");
    }

    #[test]
    fn test_clip_long_text() {
        let out = clip("Acme Trading Corporation", 10);
        assert!(out.ends_with('\u{2026}'));
        assert_eq!(out.chars().count(), 10);
        assert!(out.starts_with("Acme Trad"));
    }

    #[test]
    fn test_wrap_lines_splits_on_width() {
        let lines = wrap_lines("paid partly by cheque, rest pending", 12);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 12));
        assert_eq!(wrap_lines("", 12), vec![String::new()]);
    }

    #[test]
    fn test_row_style() {
        assert_eq!(row_style(RowClass::Paid), PAID_STYLE);
        assert_eq!(row_style(RowClass::Plain), Style::new());
    }
}
