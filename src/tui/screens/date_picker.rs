//! Date picker overlay for the last-donated date.

use chrono::{Datelike, Days, Months, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::model::{DonationDraft, display_date};
use crate::tui::action::{Action, ScreenState};
use crate::tui::widgets::centered;

/// State for the date picker: the date under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePickerState {
    candidate: NaiveDate,
}

impl DatePickerState {
    pub fn new(date: NaiveDate) -> Self {
        Self { candidate: date }
    }

    /// Re-seeds the cursor when the picker opens.
    pub fn open(&mut self, date: NaiveDate) {
        self.candidate = date;
    }

    pub fn candidate(&self) -> NaiveDate {
        self.candidate
    }

    fn step_days(&mut self, days: i64) {
        let moved = if days >= 0 {
            self.candidate.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.candidate.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(date) = moved {
            self.candidate = date;
        }
    }

    fn step_months(&mut self, forward: bool) {
        let moved = if forward {
            self.candidate.checked_add_months(Months::new(1))
        } else {
            self.candidate.checked_sub_months(Months::new(1))
        };
        if let Some(date) = moved {
            self.candidate = date;
        }
    }
}

impl ScreenState for DatePickerState {
    fn handle_key(&mut self, _draft: &DonationDraft, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.step_days(-1),
            KeyCode::Right | KeyCode::Char('l') => self.step_days(1),
            KeyCode::Up | KeyCode::Char('k') => self.step_days(-7),
            KeyCode::Down | KeyCode::Char('j') => self.step_days(7),
            KeyCode::PageUp => self.step_months(false),
            KeyCode::PageDown => self.step_months(true),
            KeyCode::Enter => return Action::PickDate(Some(self.candidate)),
            KeyCode::Esc => return Action::PickDate(None),
            _ => {}
        }
        Action::None
    }
}

/// Number of days in the month containing `date`.
fn days_in_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Calendar rows for the month of `selected`, Monday first.
///
/// Each row is seven cells; `None` pads days outside the month.
fn month_grid(selected: NaiveDate) -> Vec<[Option<u32>; 7]> {
    let first = selected.with_day(1).unwrap_or(selected);
    let offset = first.weekday().num_days_from_monday() as usize;
    let days = days_in_month(selected);

    let mut rows = Vec::new();
    let mut week = [None; 7];
    let mut col = offset;
    for day in 1..=days {
        week[col] = Some(day);
        col += 1;
        if col == 7 {
            rows.push(week);
            week = [None; 7];
            col = 0;
        }
    }
    if col > 0 {
        rows.push(week);
    }
    rows
}

/// Renders the date picker over the form.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn draw_date_picker(state: &DatePickerState, frame: &mut Frame, area: Rect) {
    let selected = state.candidate();
    let grid = month_grid(selected);
    let popup = centered(area, 34, grid.len() as u16 + 8);

    let block = Block::default()
        .title(" Last Donated Date ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let mut lines = vec![
        Line::from(Span::styled(
            selected.format("%B %Y").to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Mo Tu We Th Fr Sa Su",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    for week in &grid {
        let mut spans = Vec::new();
        for (i, cell) in week.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            match cell {
                Some(day) if *day == selected.day() => spans.push(Span::styled(
                    format!("{day:>2}"),
                    Style::default().fg(Color::Black).bg(Color::Yellow),
                )),
                Some(day) => spans.push(Span::raw(format!("{day:>2}"))),
                None => spans.push(Span::raw("  ")),
            }
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(display_date(selected)));
    lines.push(Line::from(Span::styled(
        "\u{2190}\u{2192}\u{2191}\u{2193} day/week  PgUp/PgDn month",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(Span::styled(
        "Enter: choose  Esc: cancel",
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        popup,
    );
}
