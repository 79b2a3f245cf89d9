use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use snapedit::History;
use unicode_width::UnicodeWidthStr;

use crate::ui::{App, Theme};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Editor
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_editor(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);
}

/// Rows of text the editor shows for a terminal of the given height.
pub fn editor_rows(terminal_height: u16) -> usize {
    // Header, status bar and the two editor borders
    terminal_height.saturating_sub(4) as usize
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let name = app
        .file_path
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "[scratch]".to_string());
    let modified = if app.view.modified { " [+]" } else { "" };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" snapedit ", theme.title()),
        Span::styled(format!("{name}{modified}"), theme.bar()),
    ]))
    .style(theme.bar());

    frame.render_widget(header, area);
}

fn draw_editor(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let view = &app.view;
    let focused = view.focused;

    let title = if app.engine.capture_enabled() {
        " Editor (Tab indents, F2 releases Tab) "
    } else {
        " Editor (Tab leaves, F2 captures Tab) "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.frame(focused))
        .title(title)
        .title_style(if focused {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.ink_faint)
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let tab_width = app.engine.config().tab_size;
    let gutter = view.line_count().to_string().len();
    let selection = view.selection_range();
    let visible_height = inner.height as usize;

    let mut lines = Vec::with_capacity(visible_height);
    let mut line_offset = 0;
    for (idx, text) in view.value.split('\n').enumerate() {
        let offset = line_offset;
        line_offset += text.len() + 1;
        if idx < view.scroll_offset {
            continue;
        }
        if lines.len() >= visible_height {
            break;
        }
        lines.push(render_line(
            idx, text, offset, selection, gutter, tab_width, theme,
        ));
    }

    frame.render_widget(Paragraph::new(lines).style(theme.text()), inner);

    // Show cursor
    let line = view.cursor_line();
    if focused && line >= view.scroll_offset {
        let row = (line - view.scroll_offset) as u16;
        let before = expand_tabs(view.text_before_cursor_on_line(), tab_width);
        let x = inner.x + (gutter + 1) as u16 + before.width() as u16;
        if row < inner.height {
            let max_x = inner.x + inner.width.saturating_sub(1);
            frame.set_cursor_position((x.min(max_x), inner.y + row));
        }
    }
}

fn render_line(
    index: usize,
    text: &str,
    offset: usize,
    selection: (usize, usize),
    gutter: usize,
    tab_width: usize,
    theme: &Theme,
) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("{:>width$} ", index + 1, width = gutter),
        theme.line_number(),
    )];

    // Selection clipped to this line, in line-local offsets
    let line_end = offset + text.len();
    let (start, end) = selection;
    let local_start = start.clamp(offset, line_end) - offset;
    let local_end = end.clamp(offset, line_end) - offset;

    let parts = [
        (&text[..local_start], theme.text()),
        (&text[local_start..local_end], theme.selected()),
        (&text[local_end..], theme.text()),
    ];
    for (part, style) in parts {
        if !part.is_empty() {
            spans.push(Span::styled(expand_tabs(part, tab_width), style));
        }
    }

    // A selected line break shows as one highlighted cell
    if start <= line_end && end > line_end {
        spans.push(Span::styled(" ", theme.selected()));
    }

    Line::from(spans)
}

fn expand_tabs(text: &str, tab_width: usize) -> String {
    text.replace('\t', &" ".repeat(tab_width))
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let history = app.engine.history();

    let capture = if app.engine.capture_enabled() {
        "captured"
    } else {
        "released"
    };
    let left_text = format!(
        " {} | Tab {} | {} ",
        app.engine.config().platform.label(),
        capture,
        history_label(history)
    );

    let (message, message_style) = match &app.status_message {
        Some((msg, status)) => (format!(" {msg}"), theme.status(*status)),
        None => (String::new(), theme.bar()),
    };

    let right_text = "Ctrl+S Save | Ctrl+Q Quit ";

    let used = left_text.width() + message.width() + right_text.width();
    let padding = (area.width as usize).saturating_sub(used);

    let status_line = Line::from(vec![
        Span::styled(left_text, theme.bar()),
        Span::styled(message, message_style),
        Span::styled(" ".repeat(padding), theme.bar()),
        Span::styled(right_text, theme.bar()),
    ]);

    frame.render_widget(Paragraph::new(status_line), area);
}

/// Position in the undo history and which directions are available.
fn history_label(history: &History) -> String {
    let position = history.offset().map(|o| o + 1).unwrap_or(0);
    let directions = match (history.can_undo(), history.can_redo()) {
        (true, true) => " undo redo",
        (true, false) => " undo",
        (false, true) => " redo",
        (false, false) => "",
    };
    format!("History {}/{}{}", position, history.len(), directions)
}
