//! Controlled single-select: renders the chosen option, reports new picks.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::model::SelectOption;

/// Static configuration of a single-select field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectFieldSpec {
    pub label: &'static str,
    /// Ordered options; the first conventionally means "no selection".
    pub options: &'static [SelectOption],
}

impl SelectFieldSpec {
    /// Moves the selection one step for Left/Right (Space also moves right).
    ///
    /// Returns the newly selected value only when it differs from `value`.
    /// A `value` not in the options is treated as the first option.
    pub fn pick(&self, value: &str, key: KeyEvent) -> Option<&'static str> {
        let forward = match key.code {
            KeyCode::Right | KeyCode::Char(' ') => true,
            KeyCode::Left => false,
            _ => return None,
        };
        let picked = cycle(self.options, self.position(value), forward)?;
        (picked.value != value).then_some(picked.value)
    }

    /// Label of the option matching `value`, or of the first option.
    pub fn label_for(&self, value: &str) -> &'static str {
        self.options
            .get(self.position(value))
            .map(|o| o.label)
            .unwrap_or("")
    }

    fn position(&self, value: &str) -> usize {
        self.options
            .iter()
            .position(|o| o.value == value)
            .unwrap_or(0)
    }
}

/// Steps forward or backward through `items`, wrapping around.
fn cycle<T>(items: &[T], pos: usize, forward: bool) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    let next = if forward {
        (pos + 1) % items.len()
    } else {
        (pos + items.len() - 1) % items.len()
    };
    items.get(next)
}

/// Renders a select field. Purely a function of its arguments.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn draw_select_field(
    spec: &SelectFieldSpec,
    value: &str,
    focused: bool,
    frame: &mut Frame,
    area: Rect,
) {
    let (border_color, value_style) = if focused {
        (Color::Yellow, Style::default().fg(Color::Yellow))
    } else if value.is_empty() {
        (Color::DarkGray, Style::default().fg(Color::DarkGray))
    } else {
        (Color::DarkGray, Style::default())
    };
    let block = Block::default()
        .title(spec.label)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let mut spans = Vec::new();
    if focused {
        spans.push(Span::styled("\u{25c0} ", value_style));
    }
    spans.push(Span::styled(spec.label_for(value), value_style));
    if focused {
        spans.push(Span::styled(" \u{25b6}", value_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::model::{DonationType, HealthIssue};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn donation() -> SelectFieldSpec {
        SelectFieldSpec {
            label: "Donation Type",
            options: DonationType::options(),
        }
    }

    #[test]
    fn right_picks_next_option() {
        assert_eq!(donation().pick("", key(KeyCode::Right)), Some("volunteer"));
        assert_eq!(
            donation().pick("volunteer", key(KeyCode::Char(' '))),
            Some("patient_specific")
        );
    }

    #[test]
    fn left_wraps_to_last_option() {
        assert_eq!(donation().pick("", key(KeyCode::Left)), Some("autologous"));
    }

    #[test]
    fn right_wraps_to_placeholder() {
        assert_eq!(donation().pick("autologous", key(KeyCode::Right)), Some(""));
    }

    #[test]
    fn other_keys_pick_nothing() {
        assert_eq!(donation().pick("", key(KeyCode::Char('v'))), None);
        assert_eq!(donation().pick("", key(KeyCode::Enter)), None);
    }

    #[test]
    fn unknown_value_counts_as_placeholder() {
        assert_eq!(donation().pick("bogus", key(KeyCode::Right)), Some("volunteer"));
        assert_eq!(donation().label_for("bogus"), "Select Donation Type");
    }

    #[test]
    fn same_value_is_not_reported() {
        static ONE: &[SelectOption] = &[SelectOption {
            label: "Only",
            value: "only",
        }];
        let spec = SelectFieldSpec {
            label: "Single",
            options: ONE,
        };
        assert_eq!(spec.pick("only", key(KeyCode::Right)), None);
    }

    #[test]
    fn empty_options_pick_nothing() {
        let spec = SelectFieldSpec {
            label: "Empty",
            options: &[],
        };
        assert_eq!(spec.pick("", key(KeyCode::Right)), None);
        assert_eq!(spec.label_for(""), "");
    }

    #[test]
    fn label_for_known_value() {
        let spec = SelectFieldSpec {
            label: "Health",
            options: HealthIssue::options(),
        };
        assert_eq!(spec.label_for("heart_disease"), "Heart Disease");
    }

    mod rendering {
        use ratatui::Terminal;
        use ratatui::backend::TestBackend;

        use super::*;
        use crate::tui::test_support::buffer_to_string;

        #[test]
        fn renders_label_and_selected_option() {
            let mut terminal = Terminal::new(TestBackend::new(40, 3)).unwrap();
            terminal
                .draw(|frame| {
                    draw_select_field(&donation(), "replacement", true, frame, frame.area())
                })
                .unwrap();
            let output = buffer_to_string(terminal.backend().buffer());
            assert!(output.contains("Donation Type"));
            assert!(output.contains("Replacement"));
        }
    }
}
