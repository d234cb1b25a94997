//! Donation form screen: every field, the photo and scan triggers, and submit
//! in one scrollable column.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::capability::PhotoSource;
use crate::model::{
    DonationDraft, DonationType, FieldUpdate, HealthIssue, TextField, display_date,
};
use crate::tui::action::{Action, ScreenState};
use crate::tui::widgets::{
    FocusRing, SelectFieldSpec, TextFieldSpec, draw_select_field, draw_text_field,
};

const ALLERGIES: TextFieldSpec =
    TextFieldSpec::text("Allergies (e.g., penicillin, dust)").multiline();
const AGE: TextFieldSpec = TextFieldSpec::numeric("Age (years)").max_len(3);
const WEIGHT: TextFieldSpec = TextFieldSpec::numeric("Weight (kg)").max_len(3);
const BLOOD_PRESSURE: TextFieldSpec = TextFieldSpec::text("Blood Pressure (e.g., 120/80 mmHg)");
const BLOOD_COUNT: TextFieldSpec = TextFieldSpec::numeric("Blood Count (e.g., 5.0 million/uL)");
const CLUB_NAME: TextFieldSpec = TextFieldSpec::text("Club Name (if member of any club)");

/// A focusable row of the form, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Row {
    DonationType,
    HealthIssue,
    Allergies,
    LastDonated,
    Age,
    Weight,
    BloodPressure,
    BloodCount,
    ClubName,
    Photo,
    ScanQr,
    Submit,
}

static ROWS: &[Row] = &[
    Row::DonationType,
    Row::HealthIssue,
    Row::Allergies,
    Row::LastDonated,
    Row::Age,
    Row::Weight,
    Row::BloodPressure,
    Row::BloodCount,
    Row::ClubName,
    Row::Photo,
    Row::ScanQr,
    Row::Submit,
];

/// Screen layout: section headings interleaved with rows.
#[derive(Debug, Clone, Copy)]
enum Item {
    Section(&'static str),
    Row(Row),
}

static LAYOUT: &[Item] = &[
    Item::Section("Donation Details"),
    Item::Row(Row::DonationType),
    Item::Row(Row::HealthIssue),
    Item::Row(Row::Allergies),
    Item::Row(Row::LastDonated),
    Item::Row(Row::Age),
    Item::Row(Row::Weight),
    Item::Section("Test Results"),
    Item::Row(Row::BloodPressure),
    Item::Row(Row::BloodCount),
    Item::Section("Club Details"),
    Item::Row(Row::ClubName),
    Item::Section("Upload Blood Bag Photo"),
    Item::Row(Row::Photo),
    Item::Section("Scan Blood Bag QR Code"),
    Item::Row(Row::ScanQr),
    Item::Row(Row::Submit),
];

impl Row {
    /// Returns all rows in focus order.
    pub fn all() -> &'static [Row] {
        ROWS
    }

    fn text_field(self) -> Option<(TextField, &'static TextFieldSpec)> {
        match self {
            Row::Allergies => Some((TextField::Allergies, &ALLERGIES)),
            Row::Age => Some((TextField::Age, &AGE)),
            Row::Weight => Some((TextField::Weight, &WEIGHT)),
            Row::BloodPressure => Some((TextField::BloodPressure, &BLOOD_PRESSURE)),
            Row::BloodCount => Some((TextField::BloodCount, &BLOOD_COUNT)),
            Row::ClubName => Some((TextField::ClubName, &CLUB_NAME)),
            _ => None,
        }
    }

    fn select_field(self) -> Option<SelectFieldSpec> {
        match self {
            Row::DonationType => Some(SelectFieldSpec {
                label: "Donation Type",
                options: DonationType::options(),
            }),
            Row::HealthIssue => Some(SelectFieldSpec {
                label: "Health Issue",
                options: HealthIssue::options(),
            }),
            _ => None,
        }
    }

    /// Current wire value of a select row.
    fn select_value(self, draft: &DonationDraft) -> &'static str {
        match self {
            Row::DonationType => draft.donation_type.code(),
            Row::HealthIssue => draft.health_issue.code(),
            _ => "",
        }
    }

    /// Builds the draft update for a select row's newly picked value.
    fn select_update(self, value: &str) -> Option<FieldUpdate> {
        match self {
            Row::DonationType => DonationType::from_code(value).map(FieldUpdate::DonationType),
            Row::HealthIssue => HealthIssue::from_code(value).map(FieldUpdate::HealthIssue),
            _ => None,
        }
    }

    /// Rows needed to draw this row for `draft`.
    fn height(self, draft: &DonationDraft) -> u16 {
        match self {
            Row::ScanQr if draft.qr_scan_result.is_some() => 4,
            _ => match self.text_field() {
                Some((field, spec)) => spec.height(draft.text(field)),
                None => 3,
            },
        }
    }

    /// Key hints for the footer while this row is focused.
    fn hint(self) -> &'static str {
        match self {
            Row::DonationType | Row::HealthIssue => "\u{2190}/\u{2192}: choose",
            Row::Allergies => "Enter: new line",
            Row::LastDonated => "Enter: change date",
            Row::Photo => "c: camera  g: gallery",
            Row::ScanQr => "Enter: scan",
            Row::Submit => "Enter: submit",
            _ => "Enter: next",
        }
    }
}

/// State for the donation form screen. Only focus lives here; values are
/// read from the draft on every call.
#[derive(Debug, Clone)]
pub struct DonationFormState {
    focus: FocusRing,
}

impl Default for DonationFormState {
    fn default() -> Self {
        Self::new()
    }
}

impl DonationFormState {
    /// Creates the form state with focus on the first row.
    pub fn new() -> Self {
        Self {
            focus: FocusRing::new(ROWS.len()),
        }
    }

    /// Returns the focused row.
    pub fn focused_row(&self) -> Row {
        ROWS.get(self.focus.focus())
            .copied()
            .unwrap_or(Row::DonationType)
    }

    /// Moves focus to `row`.
    pub fn focus_row(&mut self, row: Row) {
        if let Some(index) = ROWS.iter().position(|r| *r == row) {
            self.focus.set_focus(index);
        }
    }

    /// Puts focus back on the first row.
    pub fn reset(&mut self) {
        self.focus.set_focus(0);
    }

    fn handle_row_key(&mut self, draft: &DonationDraft, key: KeyEvent) -> Action {
        let row = self.focused_row();

        if let Some(spec) = row.select_field() {
            return spec
                .pick(row.select_value(draft), key)
                .and_then(|value| row.select_update(value))
                .map(Action::Update)
                .unwrap_or(Action::None);
        }

        if let Some((field, spec)) = row.text_field() {
            if let Some(value) = spec.edit(draft.text(field), key) {
                return Action::Update(FieldUpdate::Text(field, value));
            }
            if key.code == KeyCode::Enter {
                self.focus.focus_next();
            }
            return Action::None;
        }

        match (row, key.code) {
            (Row::LastDonated, KeyCode::Enter | KeyCode::Char(' ')) => Action::OpenDatePicker,
            (Row::Photo, KeyCode::Char('c')) => Action::RequestPhoto(PhotoSource::Camera),
            (Row::Photo, KeyCode::Char('g')) => Action::RequestPhoto(PhotoSource::Gallery),
            (Row::ScanQr, KeyCode::Enter | KeyCode::Char(' ')) => Action::EnterScan,
            (Row::Submit, KeyCode::Enter | KeyCode::Char(' ')) => Action::Submit,
            _ => Action::None,
        }
    }
}

impl ScreenState for DonationFormState {
    fn handle_key(&mut self, draft: &DonationDraft, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('s') => Action::Submit,
                KeyCode::Char('c') => Action::Quit,
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus.focus_next();
                Action::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus.focus_prev();
                Action::None
            }
            KeyCode::Esc => Action::Quit,
            _ => self.handle_row_key(draft, key),
        }
    }
}

/// Index of the first layout item to draw so that item `focus` fits in
/// `available` rows.
fn first_visible(heights: &[u16], focus: usize, available: u16) -> usize {
    let mut start = 0;
    while start < focus && heights[start..=focus].iter().sum::<u16>() > available {
        start += 1;
    }
    start
}

/// Renders the donation form.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn draw_donation_form(
    state: &DonationFormState,
    draft: &DonationDraft,
    frame: &mut Frame,
    area: Rect,
) {
    let block = Block::default()
        .title(" Blood Donation Form ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [body, footer_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);

    let focused = state.focused_row();
    let heights: Vec<u16> = LAYOUT
        .iter()
        .map(|item| match item {
            Item::Section(_) => 1,
            Item::Row(row) => row.height(draft),
        })
        .collect();
    let focus_item = LAYOUT
        .iter()
        .position(|item| matches!(item, Item::Row(row) if *row == focused))
        .unwrap_or(0);
    let start = first_visible(&heights, focus_item, body.height);

    let mut y = body.y;
    for (item, height) in LAYOUT[start..].iter().zip(&heights[start..]) {
        if y + height > body.bottom() {
            break;
        }
        let rect = Rect {
            x: body.x,
            y,
            width: body.width,
            height: *height,
        };
        match item {
            Item::Section(title) => draw_section(title, frame, rect),
            Item::Row(row) => draw_row(*row, draft, *row == focused, frame, rect),
        }
        y += height;
    }

    let footer = Paragraph::new(Line::from(format!(
        "Tab/Shift+Tab: move  {}  Ctrl+S: submit  Esc: quit",
        focused.hint()
    )))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, footer_area);
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
fn draw_section(title: &str, frame: &mut Frame, area: Rect) {
    let heading = Paragraph::new(Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(heading, area);
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
fn draw_row(row: Row, draft: &DonationDraft, focused: bool, frame: &mut Frame, area: Rect) {
    if let Some(spec) = row.select_field() {
        draw_select_field(&spec, row.select_value(draft), focused, frame, area);
        return;
    }
    if let Some((field, spec)) = row.text_field() {
        draw_text_field(spec, draft.text(field), focused, frame, area);
        return;
    }

    let border_color = if focused {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let boxed = |title: &'static str| {
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
    };
    let dim = Style::default().fg(Color::DarkGray);

    match row {
        Row::LastDonated => {
            let line = Line::from(vec![
                Span::styled(
                    display_date(draft.last_donated_date),
                    Style::default().fg(Color::Blue),
                ),
                Span::styled(if focused { "  (Enter to change)" } else { "" }, dim),
            ]);
            frame.render_widget(
                Paragraph::new(line).block(boxed("Last Donated Date")),
                area,
            );
        }
        Row::Photo => {
            let photo = match &draft.blood_bag_photo {
                Some(image) => Span::raw(image.file_name.clone().unwrap_or_else(|| image.uri.clone())),
                None => Span::styled("No photo selected", dim),
            };
            let line = Line::from(vec![
                photo,
                Span::styled(if focused { "  c: camera  g: gallery" } else { "" }, dim),
            ]);
            frame.render_widget(Paragraph::new(line).block(boxed("Blood Bag Photo")), area);
        }
        Row::ScanQr => {
            let [button_area, result_area] =
                Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
            let button = Paragraph::new(Line::from(Span::styled(
                "[ Scan QR Code ]",
                Style::default().fg(Color::Green),
            )))
            .alignment(Alignment::Center)
            .block(boxed(""));
            frame.render_widget(button, button_area);
            if let Some(result) = &draft.qr_scan_result {
                let text = Paragraph::new(Line::from(Span::styled(
                    format!("Scanned QR Value: {result}"),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )))
                .alignment(Alignment::Center);
                frame.render_widget(text, result_area);
            }
        }
        _ => {
            let button = Paragraph::new(Line::from(Span::styled(
                "[ Submit Donation ]",
                Style::default().add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .block(boxed(""));
            frame.render_widget(button, area);
        }
    }
}
