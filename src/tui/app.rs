use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::capability::{
    PhotoCapture, PhotoSource, ProviderEvent, QrDecoder, ScanEvent, request_photo, run_scan,
};
use crate::form::{FormController, Overlay};
use crate::model::DonationRecord;
use crate::sink::{CollectingSink, TracingSink};

use super::action::{Action, ScreenState};
use super::error::AppError;
use super::screens::{
    DatePickerState, DonationFormState, ScannerState, draw_date_picker, draw_donation_form,
    draw_scanner,
};
use super::widgets::draw_notice;

/// Where the app sends submitted records: the log, and memory for printing
/// once the terminal is restored.
pub type AppSink = (TracingSink, CollectingSink);

/// Top-level application state.
pub struct App {
    controller: FormController<AppSink>,
    form: DonationFormState,
    date_picker: DatePickerState,
    scanner: ScannerState,
    photo: Arc<dyn PhotoCapture>,
    qr: Arc<dyn QrDecoder>,
    scan_debounce: Duration,
    events_tx: mpsc::UnboundedSender<ProviderEvent>,
    events_rx: mpsc::UnboundedReceiver<ProviderEvent>,
    scan_task: Option<JoinHandle<()>>,
    /// Bumped each time the scanner opens; older scan events are stale.
    scan_activation: u64,
    should_quit: bool,
}

impl App {
    /// Creates an `App` showing the form with the controller's draft.
    pub fn new(
        controller: FormController<AppSink>,
        photo: Arc<dyn PhotoCapture>,
        qr: Arc<dyn QrDecoder>,
        scan_debounce: Duration,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            date_picker: DatePickerState::new(controller.draft().last_donated_date),
            scanner: ScannerState::new(qr.describe()),
            controller,
            form: DonationFormState::new(),
            photo,
            qr,
            scan_debounce,
            events_tx,
            events_rx,
            scan_task: None,
            scan_activation: 0,
            should_quit: false,
        }
    }

    /// Main event loop: draw → wait for a key or a provider result → apply.
    #[cfg_attr(coverage_nightly, coverage(off))]
    #[mutants::skip]
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut terminal_events = EventStream::new();
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            tokio::select! {
                event = terminal_events.next() => match event {
                    Some(Ok(Event::Key(key))) => self.handle_key(key),
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => break,
                },
                Some(event) = self.events_rx.recv() => self.handle_provider_event(event),
            }
        }
        self.stop_scan();
        Ok(())
    }

    /// Renders the form, or the scanner in its place, plus any overlay.
    #[cfg_attr(coverage_nightly, coverage(off))]
    #[mutants::skip]
    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        match self.controller.overlay() {
            Overlay::Scanning => draw_scanner(&self.scanner, frame, area),
            overlay => {
                draw_donation_form(&self.form, self.controller.draft(), frame, area);
                if overlay == Overlay::DatePicking {
                    draw_date_picker(&self.date_picker, frame, area);
                }
            }
        }
        if let Some(notice) = self.controller.notice() {
            draw_notice(notice, frame, area);
        }
    }

    /// Handles a key event: an open notice swallows keys until dismissed,
    /// otherwise the screen for the current overlay decides.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        let action = if self.controller.notice().is_some() {
            match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Action::DismissNotice,
                _ => Action::None,
            }
        } else {
            let draft = self.controller.draft();
            match self.controller.overlay() {
                Overlay::Normal => self.form.handle_key(draft, key),
                Overlay::DatePicking => self.date_picker.handle_key(draft, key),
                Overlay::Scanning => self.scanner.handle_key(draft, key),
            }
        };
        self.apply(action);
    }

    /// Applies a capability result delivered by a provider task.
    pub fn handle_provider_event(&mut self, event: ProviderEvent) {
        match event {
            ProviderEvent::Photo(outcome) => self.controller.apply_photo_outcome(outcome),
            ProviderEvent::Scan { activation, .. } if activation != self.scan_activation => {
                tracing::debug!(activation, "scan event from a closed scanner dropped");
            }
            ProviderEvent::Scan {
                event: ScanEvent::Decoded(payload),
                ..
            } => {
                if self.controller.exit_scan_mode(payload) {
                    self.stop_scan();
                }
            }
            ProviderEvent::Scan {
                event: ScanEvent::Failed(reason),
                ..
            } => {
                self.controller.scan_failed(reason);
                self.stop_scan();
            }
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Update(update) => self.controller.update_field(update),
            Action::OpenDatePicker => {
                if self.controller.open_date_picker() {
                    self.date_picker
                        .open(self.controller.draft().last_donated_date);
                }
            }
            Action::PickDate(date) => self.controller.set_last_donated_date(date),
            Action::RequestPhoto(source) => self.spawn_photo_request(source),
            Action::EnterScan => {
                if self.controller.enter_scan_mode() {
                    self.spawn_scan();
                }
            }
            Action::CancelScan => {
                if self.controller.cancel_scan() {
                    self.stop_scan();
                }
            }
            Action::Submit => {
                self.controller.submit();
                if self.controller.resets_after_submit() {
                    self.form.reset();
                }
            }
            Action::DismissNotice => self.controller.dismiss_notice(),
            Action::Quit => self.should_quit = true,
        }
    }

    /// Runs a photo request in the background; the outcome comes back as a
    /// [`ProviderEvent::Photo`].
    fn spawn_photo_request(&self, source: PhotoSource) {
        let provider = Arc::clone(&self.photo);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = request_photo(provider.as_ref(), source).await;
            let _ = events.send(ProviderEvent::Photo(outcome));
        });
    }

    fn spawn_scan(&mut self) {
        self.stop_scan();
        let decoder = Arc::clone(&self.qr);
        let events = self.events_tx.clone();
        let window = self.scan_debounce;
        self.scan_activation = self.scan_activation.wrapping_add(1);
        let activation = self.scan_activation;
        self.scan_task = Some(tokio::spawn(async move {
            run_scan(decoder.as_ref(), activation, window, &events).await;
        }));
    }

    fn stop_scan(&mut self) {
        if let Some(task) = self.scan_task.take() {
            task.abort();
        }
    }

    /// Returns the form controller.
    pub fn controller(&self) -> &FormController<AppSink> {
        &self.controller
    }

    /// Records submitted so far, oldest first.
    pub fn submitted(&self) -> &[DonationRecord] {
        self.controller.sink().1.records()
    }

    /// Returns `true` if the app should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Waits for one provider event and applies it.
    #[cfg(test)]
    async fn pump_one(&mut self) {
        if let Some(event) = self.events_rx.recv().await {
            self.handle_provider_event(event);
        }
    }

    /// Applies every provider event that is already queued.
    #[cfg(test)]
    fn drain_queued(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_provider_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crossterm::event::{KeyEventState, KeyModifiers};

    use super::*;
    use crate::capability::scripted::{ScriptedPhotoCapture, ScriptedQrDecoder};
    use crate::model::{DonationType, ImageRef};
    use crate::tui::screens::Row;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn make_app_with(photo: ScriptedPhotoCapture, qr: ScriptedQrDecoder) -> App {
        let controller = FormController::new(today(), (TracingSink, CollectingSink::default()));
        App::new(
            controller,
            Arc::new(photo),
            Arc::new(qr),
            Duration::from_millis(2000),
        )
    }

    fn make_app() -> App {
        make_app_with(
            ScriptedPhotoCapture::granted(Some(ImageRef::new("img://1"))),
            ScriptedQrDecoder::reads(&["LOT-9981"]),
        )
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        }
    }

    fn type_string(app: &mut App, s: &str) {
        for ch in s.chars() {
            app.handle_key(press(KeyCode::Char(ch)));
        }
    }

    mod basics {
        use super::*;

        #[test]
        fn new_starts_on_form() {
            let app = make_app();
            assert_eq!(app.controller().overlay(), Overlay::Normal);
            assert!(!app.should_quit());
            assert!(app.submitted().is_empty());
        }

        #[test]
        fn esc_on_form_quits() {
            let mut app = make_app();
            app.handle_key(press(KeyCode::Esc));
            assert!(app.should_quit());
        }

        #[test]
        fn release_events_are_ignored() {
            let mut app = make_app();
            app.handle_key(release(KeyCode::Esc));
            assert!(!app.should_quit());
        }

        #[test]
        fn typing_updates_draft() {
            let mut app = make_app();
            app.form.focus_row(Row::Weight);
            type_string(&mut app, "70kg");
            assert_eq!(app.controller().draft().weight, "70");
        }
    }

    mod notices {
        use super::*;

        #[test]
        fn notice_swallows_keys_until_dismissed() {
            let mut app = make_app();
            app.form.focus_row(Row::Age);
            app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
            assert_eq!(app.submitted().len(), 1);
            assert!(app.controller().notice().is_some());

            type_string(&mut app, "12");
            assert_eq!(app.controller().draft().age, "");

            app.handle_key(press(KeyCode::Enter));
            assert_eq!(app.controller().notice(), None);
            type_string(&mut app, "12");
            assert_eq!(app.controller().draft().age, "12");
        }
    }

    mod date_picker {
        use super::*;

        #[test]
        fn pick_earlier_date() {
            let mut app = make_app();
            app.form.focus_row(Row::LastDonated);
            app.handle_key(press(KeyCode::Enter));
            assert_eq!(app.controller().overlay(), Overlay::DatePicking);

            app.handle_key(press(KeyCode::Left));
            app.handle_key(press(KeyCode::Enter));
            assert_eq!(app.controller().overlay(), Overlay::Normal);
            assert_eq!(
                app.controller().draft().last_donated_date,
                NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
            );
        }

        #[test]
        fn esc_keeps_date_and_does_not_quit() {
            let mut app = make_app();
            app.form.focus_row(Row::LastDonated);
            app.handle_key(press(KeyCode::Enter));
            app.handle_key(press(KeyCode::Left));
            app.handle_key(press(KeyCode::Esc));
            assert_eq!(app.controller().overlay(), Overlay::Normal);
            assert_eq!(app.controller().draft().last_donated_date, today());
            assert!(!app.should_quit());
        }

        #[test]
        fn picker_reopens_on_current_date() {
            let mut app = make_app();
            app.form.focus_row(Row::LastDonated);
            app.handle_key(press(KeyCode::Enter));
            app.handle_key(press(KeyCode::Down));
            app.handle_key(press(KeyCode::Esc));
            app.handle_key(press(KeyCode::Enter));
            assert_eq!(app.date_picker.candidate(), today());
        }
    }

    mod photo {
        use super::*;

        #[tokio::test]
        async fn camera_result_lands_in_draft() {
            let mut app = make_app();
            app.form.focus_row(Row::Photo);
            app.handle_key(press(KeyCode::Char('c')));
            app.pump_one().await;
            assert_eq!(
                app.controller().draft().blood_bag_photo,
                Some(ImageRef::new("img://1"))
            );
        }

        #[tokio::test]
        async fn denied_permission_shows_notice_only() {
            let mut app = make_app_with(
                ScriptedPhotoCapture::denied(),
                ScriptedQrDecoder::reads(&[]),
            );
            app.form.focus_row(Row::Photo);
            app.handle_key(press(KeyCode::Char('g')));
            app.pump_one().await;
            assert_eq!(app.controller().draft().blood_bag_photo, None);
            assert_eq!(app.controller().overlay(), Overlay::Normal);
            assert_eq!(
                app.controller().notice().map(|n| n.title.as_str()),
                Some("Permission Denied")
            );
        }
    }

    mod scanning {
        use super::*;

        #[tokio::test]
        async fn scan_fills_result_once() {
            let mut app = make_app_with(
                ScriptedPhotoCapture::denied(),
                ScriptedQrDecoder::reads(&["LOT-9981", "LOT-9981", "LOT-0002"]),
            );
            app.form.focus_row(Row::ScanQr);
            app.handle_key(press(KeyCode::Enter));
            assert_eq!(app.controller().overlay(), Overlay::Scanning);

            app.pump_one().await;
            app.drain_queued();
            assert_eq!(app.controller().overlay(), Overlay::Normal);
            assert_eq!(
                app.controller().draft().qr_scan_result.as_deref(),
                Some("LOT-9981")
            );
            assert!(app.scan_task.is_none());
        }

        #[tokio::test]
        async fn esc_cancels_scanner() {
            let mut app = make_app();
            app.form.focus_row(Row::ScanQr);
            app.handle_key(press(KeyCode::Enter));
            app.handle_key(press(KeyCode::Esc));
            assert_eq!(app.controller().overlay(), Overlay::Normal);
            assert!(app.scan_task.is_none());
            assert!(!app.should_quit());

            app.drain_queued();
            assert_eq!(app.controller().draft().qr_scan_result, None);
        }

        #[tokio::test]
        async fn broken_scanner_returns_to_form() {
            let mut app = make_app_with(
                ScriptedPhotoCapture::denied(),
                ScriptedQrDecoder::broken(),
            );
            app.form.focus_row(Row::ScanQr);
            app.handle_key(press(KeyCode::Enter));
            app.pump_one().await;
            assert_eq!(app.controller().overlay(), Overlay::Normal);
            assert_eq!(
                app.controller().notice().map(|n| n.title.as_str()),
                Some("Scanner Unavailable")
            );
        }

        fn decoded(activation: u64, payload: &str) -> ProviderEvent {
            ProviderEvent::Scan {
                activation,
                event: ScanEvent::Decoded(payload.into()),
            }
        }

        #[test]
        fn late_decode_after_cancel_is_ignored() {
            let mut app = make_app();
            app.controller.enter_scan_mode();
            app.controller.cancel_scan();
            app.handle_provider_event(decoded(app.scan_activation, "LATE"));
            assert_eq!(app.controller().draft().qr_scan_result, None);
        }

        #[tokio::test]
        async fn queued_read_from_cancelled_scanner_is_not_taken_by_next_one() {
            let mut app = make_app();
            app.form.focus_row(Row::ScanQr);
            app.handle_key(press(KeyCode::Enter));
            let cancelled = app.scan_activation;
            app.handle_key(press(KeyCode::Esc));
            app.handle_key(press(KeyCode::Enter));
            assert_eq!(app.controller().overlay(), Overlay::Scanning);

            app.handle_provider_event(decoded(cancelled, "STALE"));
            assert_eq!(app.controller().overlay(), Overlay::Scanning);
            assert_eq!(app.controller().draft().qr_scan_result, None);

            app.handle_provider_event(decoded(app.scan_activation, "LOT-9981"));
            assert_eq!(
                app.controller().draft().qr_scan_result.as_deref(),
                Some("LOT-9981")
            );
        }

        #[tokio::test]
        async fn scanner_closing_without_a_read_returns_to_form() {
            let mut app = make_app_with(
                ScriptedPhotoCapture::denied(),
                ScriptedQrDecoder::reads(&[]),
            );
            app.form.focus_row(Row::ScanQr);
            app.handle_key(press(KeyCode::Enter));
            app.pump_one().await;
            assert_eq!(app.controller().overlay(), Overlay::Normal);
            assert_eq!(
                app.controller().notice().map(|n| n.message.as_str()),
                Some("scanner closed")
            );
        }
    }

    mod end_to_end {
        use super::*;

        #[tokio::test]
        async fn fill_capture_scan_submit() {
            let mut app = make_app();

            app.handle_key(press(KeyCode::Right));
            assert_eq!(
                app.controller().draft().donation_type,
                DonationType::Volunteer
            );
            app.form.focus_row(Row::Age);
            type_string(&mut app, "34");
            app.form.focus_row(Row::Weight);
            type_string(&mut app, "70");

            app.form.focus_row(Row::Photo);
            app.handle_key(press(KeyCode::Char('c')));
            app.pump_one().await;

            app.form.focus_row(Row::ScanQr);
            app.handle_key(press(KeyCode::Enter));
            app.pump_one().await;
            app.handle_key(press(KeyCode::Enter)); // dismiss "QR Code Scanned"

            app.form.focus_row(Row::Submit);
            app.handle_key(press(KeyCode::Enter));

            let records = app.submitted();
            assert_eq!(records.len(), 1);
            let record = &records[0];
            assert_eq!(record.donation_type, "volunteer");
            assert_eq!(record.health_issue, "");
            assert_eq!(record.age, "34");
            assert_eq!(record.weight, "70");
            assert_eq!(record.last_donated_date, "Fri Oct 16 2026");
            assert_eq!(record.blood_bag_photo_uri.as_deref(), Some("img://1"));
            assert_eq!(record.qr_code_details, "LOT-9981");
        }

        #[test]
        fn reset_after_submit_clears_form_and_focus() {
            let controller = FormController::new(today(), (TracingSink, CollectingSink::default()))
                .with_reset_after_submit(true);
            let mut app = App::new(
                controller,
                Arc::new(ScriptedPhotoCapture::denied()),
                Arc::new(ScriptedQrDecoder::reads(&[])),
                Duration::from_millis(2000),
            );
            app.form.focus_row(Row::ClubName);
            type_string(&mut app, "Lions");
            app.form.focus_row(Row::Submit);
            app.handle_key(press(KeyCode::Enter));

            assert_eq!(app.submitted()[0].club_name, "Lions");
            assert_eq!(app.controller().draft().club_name, "");
            assert_eq!(app.form.focused_row(), Row::DonationType);
        }
    }

    mod rendering {
        use ratatui::backend::TestBackend;

        use super::*;
        use crate::tui::test_support::buffer_to_string;

        fn render(app: &App) -> String {
            let mut terminal = Terminal::new(TestBackend::new(70, 50)).unwrap();
            terminal.draw(|frame| app.draw(frame)).unwrap();
            buffer_to_string(terminal.backend().buffer())
        }

        #[test]
        fn form_is_drawn_normally() {
            let output = render(&make_app());
            assert!(output.contains("Blood Donation Form"));
        }

        #[test]
        fn scanner_replaces_form() {
            let mut app = make_app();
            app.controller.enter_scan_mode();
            let output = render(&app);
            assert!(output.contains("Scan QR Code"));
            assert!(output.contains("scripted scanner"));
            assert!(!output.contains("Blood Donation Form"));
        }

        #[test]
        fn date_picker_overlays_form() {
            let mut app = make_app();
            app.apply(Action::OpenDatePicker);
            let output = render(&app);
            assert!(output.contains("Blood Donation Form"));
            assert!(output.contains("October 2026"));
        }

        #[test]
        fn notice_is_drawn_on_top() {
            let mut app = make_app();
            app.apply(Action::Submit);
            let output = render(&app);
            assert!(output.contains("Submission Successful"));
        }
    }
}
