//! SearchInput — wraps tui-input for the vehicle search bar.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};
use unicode_width::UnicodeWidthChar;

use crate::theme::{C_FILTER_BG, C_FILTER_FG, C_MUTED};

/// Drop the leading `cols` display columns of `s`, landing on a char
/// boundary.  `visual_scroll` hands back a column offset, not a byte one,
/// so indexing the string with it directly would split multibyte chars.
fn skip_columns(s: &str, cols: usize) -> &str {
    let mut width = 0;
    for (idx, ch) in s.char_indices() {
        if width >= cols {
            return &s[idx..];
        }
        width += ch.width().unwrap_or(0);
    }
    ""
}

pub enum SearchAction {
    Changed(String),
    Confirmed,
    Cancelled,
}

pub struct SearchInput {
    input: Input,
    pub active: bool,
    placeholder: String,
}

impl SearchInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            active: false,
            placeholder: placeholder.into(),
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn clear(&mut self) {
        self.input = Input::default();
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.input.value().is_empty()
    }

    /// Handle a key event. Returns what happened.
    ///
    /// Esc behaviour:
    ///   - If the input has text: clear the text, emit `Changed("")`
    ///   - If the input is already empty: deactivate and emit `Cancelled`
    pub fn handle_key(&mut self, key: KeyEvent) -> SearchAction {
        match key.code {
            KeyCode::Esc => {
                if !self.input.value().is_empty() {
                    self.input = Input::default();
                    SearchAction::Changed(String::new())
                } else {
                    self.deactivate();
                    SearchAction::Cancelled
                }
            }
            KeyCode::Enter => {
                self.deactivate();
                SearchAction::Confirmed
            }
            _ => {
                self.input
                    .handle_event(&ratatui::crossterm::event::Event::Key(key));
                SearchAction::Changed(self.input.value().to_string())
            }
        }
    }

    /// Render the search bar into `area`.
    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let scroll = self
            .input
            .visual_scroll(area.width.saturating_sub(4) as usize);
        let value = self.input.value();
        let display = if value.is_empty() {
            Span::styled(
                format!("/ {}", self.placeholder),
                Style::default().fg(C_MUTED),
            )
        } else {
            Span::styled(
                format!("/ {}", skip_columns(value, scroll)),
                Style::default().fg(C_FILTER_FG),
            )
        };

        let paragraph =
            Paragraph::new(Line::from(vec![display])).style(Style::default().bg(C_FILTER_BG));
        frame.render_widget(paragraph, area);

        if self.active && !value.is_empty() {
            let cursor_x = area.x + 2 + (self.input.visual_cursor() - scroll) as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width - 1), area.y));
        }
    }
}

impl Default for SearchInput {
    fn default() -> Self {
        Self::new("name, plate, nickname...")
    }
}
