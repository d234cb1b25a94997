//! Full-screen QR scanner view. While it is up, the form is not drawn.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::model::DonationDraft;
use crate::tui::action::{Action, ScreenState};

/// State for the scanner screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerState {
    source: String,
}

impl ScannerState {
    /// `source` describes where decoded codes come from, e.g. a device path.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl ScreenState for ScannerState {
    fn handle_key(&mut self, _draft: &DonationDraft, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Action::CancelScan,
            _ => Action::None,
        }
    }
}

/// Renders the scanner over the whole area.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn draw_scanner(state: &ScannerState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Scan QR Code ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let lines = vec![
        Line::from("Point the scanner at the blood bag QR code"),
        Line::from(""),
        Line::from(format!("Listening on {}", state.source())),
        Line::from(""),
        Line::from("Esc: cancel").style(Style::default().fg(Color::DarkGray)),
    ];
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [centered] = Layout::vertical([Constraint::Length(lines.len() as u16)])
        .flex(Flex::Center)
        .areas(inner);
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered,
    );
}
