//! Controlled text input: renders a value, reports edits as whole strings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

/// Visible lines of a multi-line field before it stops growing.
const MAX_VISIBLE_LINES: u16 = 4;

/// Characters a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Keyboard {
    #[default]
    Text,
    /// Digits and a decimal point only.
    Numeric,
}

/// Static configuration of a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFieldSpec {
    pub label: &'static str,
    pub keyboard: Keyboard,
    /// Maximum length in characters, or `None` for unbounded.
    pub max_len: Option<usize>,
    pub multiline: bool,
}

impl TextFieldSpec {
    /// A single-line, unbounded text field.
    pub const fn text(label: &'static str) -> Self {
        Self {
            label,
            keyboard: Keyboard::Text,
            max_len: None,
            multiline: false,
        }
    }

    /// A single-line numeric field.
    pub const fn numeric(label: &'static str) -> Self {
        Self {
            label,
            keyboard: Keyboard::Numeric,
            max_len: None,
            multiline: false,
        }
    }

    pub const fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub const fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    /// Applies one keystroke to `value`.
    ///
    /// Returns the full updated string, or `None` if the key changes nothing
    /// (masked character, length cap, or a key the field does not handle).
    pub fn edit(&self, value: &str, key: KeyEvent) -> Option<String> {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return None;
        }
        match key.code {
            KeyCode::Char(ch) => self.insert(value, ch),
            KeyCode::Enter if self.multiline => self.insert(value, '\n'),
            KeyCode::Backspace if !value.is_empty() => {
                let mut updated = value.to_string();
                updated.pop();
                Some(updated)
            }
            _ => None,
        }
    }

    fn insert(&self, value: &str, ch: char) -> Option<String> {
        if !self.accepts(ch) {
            return None;
        }
        if let Some(max) = self.max_len
            && value.chars().count() >= max
        {
            return None;
        }
        let mut updated = String::with_capacity(value.len() + ch.len_utf8());
        updated.push_str(value);
        updated.push(ch);
        Some(updated)
    }

    fn accepts(&self, ch: char) -> bool {
        match self.keyboard {
            Keyboard::Text => ch == '\n' || !ch.is_control(),
            Keyboard::Numeric => ch.is_ascii_digit() || ch == '.',
        }
    }

    /// Rows needed to draw `value`, borders included.
    pub fn height(&self, value: &str) -> u16 {
        if !self.multiline {
            return 3;
        }
        let lines = value.split('\n').count().clamp(1, MAX_VISIBLE_LINES as usize);
        2 + lines as u16
    }
}

/// Renders a text field. Purely a function of its arguments.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn draw_text_field(
    spec: &TextFieldSpec,
    value: &str,
    focused: bool,
    frame: &mut Frame,
    area: Rect,
) {
    let border_color = if focused {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(spec.label)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let mut lines: Vec<Line> = value
        .split('\n')
        .map(|l| Line::from(Span::raw(l.to_string())))
        .collect();
    if focused && let Some(last) = lines.last_mut() {
        last.spans.push(Span::styled(
            "\u{2588}",
            Style::default().add_modifier(Modifier::SLOW_BLINK),
        ));
    }
    // Keep the cursor line visible once the field stops growing.
    let visible = area.height.saturating_sub(2) as usize;
    let skip = lines.len().saturating_sub(visible.max(1));

    let paragraph = Paragraph::new(lines.split_off(skip)).block(block);
    frame.render_widget(paragraph, area);
}
