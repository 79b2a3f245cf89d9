use ratatui::style::{Color, Modifier, Style};

use super::StatusType;

/// Colors for the editor pane, its gutter and the two one-line bars.
pub struct Theme {
    pub surface: Color,
    pub bar: Color,
    pub ink: Color,
    pub ink_faint: Color,
    pub accent: Color,
    pub gutter: Color,
    pub selection: Color,
    pub frame: Color,
    pub frame_focused: Color,

    // Status messages
    pub note: Color,
    pub done: Color,
    pub caution: Color,
    pub failure: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Warm charcoal, easy on long writing sessions.
    pub fn dark() -> Self {
        Self {
            surface: Color::Rgb(28, 27, 25),
            bar: Color::Rgb(40, 38, 35),
            ink: Color::Rgb(222, 216, 204),
            ink_faint: Color::Rgb(132, 126, 116),
            accent: Color::Rgb(230, 170, 90),
            gutter: Color::Rgb(88, 84, 78),
            selection: Color::Rgb(74, 66, 52),
            frame: Color::Rgb(64, 61, 56),
            frame_focused: Color::Rgb(230, 170, 90),
            note: Color::Rgb(140, 180, 210),
            done: Color::Rgb(150, 195, 120),
            caution: Color::Rgb(235, 200, 110),
            failure: Color::Rgb(230, 110, 95),
        }
    }

    /// Paper-like background for bright terminals.
    pub fn light() -> Self {
        Self {
            surface: Color::Rgb(250, 247, 240),
            bar: Color::Rgb(236, 231, 220),
            ink: Color::Rgb(44, 40, 34),
            ink_faint: Color::Rgb(128, 120, 108),
            accent: Color::Rgb(170, 95, 20),
            gutter: Color::Rgb(176, 168, 154),
            selection: Color::Rgb(240, 220, 170),
            frame: Color::Rgb(210, 202, 188),
            frame_focused: Color::Rgb(170, 95, 20),
            note: Color::Rgb(40, 100, 150),
            done: Color::Rgb(60, 130, 50),
            caution: Color::Rgb(160, 110, 0),
            failure: Color::Rgb(180, 50, 40),
        }
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.ink).bg(self.surface)
    }

    pub fn selected(&self) -> Style {
        Style::default().fg(self.ink).bg(self.selection)
    }

    pub fn line_number(&self) -> Style {
        Style::default().fg(self.gutter).bg(self.surface)
    }

    /// Header and status bar background with dimmed text.
    pub fn bar(&self) -> Style {
        Style::default().fg(self.ink_faint).bg(self.bar)
    }

    pub fn title(&self) -> Style {
        self.bar().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn frame(&self, focused: bool) -> Style {
        let color = if focused { self.frame_focused } else { self.frame };
        Style::default().fg(color)
    }

    pub fn status(&self, status: StatusType) -> Style {
        let color = match status {
            StatusType::Info => self.note,
            StatusType::Success => self.done,
            StatusType::Warning => self.caution,
            StatusType::Error => self.failure,
        };
        self.bar().fg(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_differs_from_text() {
        for theme in [Theme::dark(), Theme::light()] {
            assert_ne!(theme.selected().bg, theme.text().bg);
            assert_eq!(theme.selected().fg, theme.text().fg);
        }
    }

    #[test]
    fn test_status_colors_are_distinct() {
        let theme = Theme::dark();
        let styles = [
            theme.status(StatusType::Info),
            theme.status(StatusType::Success),
            theme.status(StatusType::Warning),
            theme.status(StatusType::Error),
        ];
        for (i, a) in styles.iter().enumerate() {
            for b in &styles[i + 1..] {
                assert_ne!(a.fg, b.fg);
            }
            assert_eq!(a.bg, Some(theme.bar));
        }
    }
}
