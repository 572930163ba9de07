//! Single-line text input with a cursor

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Paragraph, Widget},
};

/// Single-line input; `cursor` counts characters, not bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInputState {
    input: String,
    cursor: usize,
}

impl TextInputState {
    /// Create with initial value, cursor at the end
    pub fn with_value(value: &str) -> Self {
        Self {
            input: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn value(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn len(&self) -> usize {
        self.input.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    fn char_at(&self, char_idx: usize) -> Option<char> {
        self.input.chars().nth(char_idx)
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.input.insert(at, c);
        self.cursor += 1;
    }

    /// Backspace
    pub fn delete_char(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.input.remove(at);
        }
    }

    /// Delete
    pub fn delete_forward(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.input.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    /// Ctrl+U
    pub fn delete_to_start(&mut self) {
        let at = self.byte_index(self.cursor);
        self.input.drain(..at);
        self.cursor = 0;
    }

    /// Ctrl+W
    pub fn delete_word(&mut self) {
        let end = self.cursor;
        while self.cursor > 0 && self.char_at(self.cursor - 1) == Some(' ') {
            self.cursor -= 1;
        }
        while self.cursor > 0 && self.char_at(self.cursor - 1) != Some(' ') {
            self.cursor -= 1;
        }
        let (from, to) = (self.byte_index(self.cursor), self.byte_index(end));
        self.input.drain(from..to);
    }

    /// Render the text, scrolled so the cursor stays visible
    pub fn render(&self, area: Rect, buf: &mut Buffer, style: Style) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let width = area.width as usize;
        let skip = (self.cursor + 1).saturating_sub(width);
        let visible: String = self.input.chars().skip(skip).take(width).collect();
        Paragraph::new(visible).style(style).render(area, buf);

        let cursor_x = area.x + (self.cursor - skip) as u16;
        buf[(cursor_x, area.y)].set_style(Style::default().add_modifier(Modifier::REVERSED));
    }
}
