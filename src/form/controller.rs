use chrono::{Local, NaiveDate};

use super::latch::ScanLatch;
use super::{Notice, Overlay};
use crate::capability::{PhotoCapture, PhotoOutcome, PhotoSource, request_photo};
use crate::model::{DonationDraft, DonationRecord, FieldUpdate};
use crate::sink::SubmissionSink;

/// Single source of truth for the donation draft and overlay state.
///
/// Everything else reads the draft through [`draft`](Self::draft) and asks
/// for changes through the methods below.
#[derive(Debug)]
pub struct FormController<S> {
    draft: DonationDraft,
    today: NaiveDate,
    overlay: Overlay,
    latch: ScanLatch,
    notice: Option<Notice>,
    sink: S,
    reset_after_submit: bool,
}

impl<S: SubmissionSink> FormController<S> {
    /// Creates a controller with a fresh draft dated `today`.
    pub fn new(today: NaiveDate, sink: S) -> Self {
        Self {
            draft: DonationDraft::new(today),
            today,
            overlay: Overlay::Normal,
            latch: ScanLatch::default(),
            notice: None,
            sink,
            reset_after_submit: false,
        }
    }

    /// Creates a controller dated with the local calendar date.
    pub fn mounted(sink: S) -> Self {
        Self::new(Local::now().date_naive(), sink)
    }

    /// Clears the draft after each successful submit when `reset` is set.
    pub fn with_reset_after_submit(mut self, reset: bool) -> Self {
        self.reset_after_submit = reset;
        self
    }

    pub fn resets_after_submit(&self) -> bool {
        self.reset_after_submit
    }

    pub fn draft(&self) -> &DonationDraft {
        &self.draft
    }

    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Replaces one draft field. Always succeeds.
    pub fn update_field(&mut self, update: FieldUpdate) {
        tracing::trace!(?update, "field updated");
        self.draft.apply(update);
    }

    /// Opens the date picker. Returns `false` unless the form was in
    /// [`Overlay::Normal`].
    pub fn open_date_picker(&mut self) -> bool {
        if self.overlay != Overlay::Normal {
            return false;
        }
        self.overlay = Overlay::DatePicking;
        true
    }

    /// Applies the date picker's answer and closes it.
    ///
    /// `None` (picker dismissed) keeps the previous date.
    pub fn set_last_donated_date(&mut self, date: Option<NaiveDate>) {
        if let Some(date) = date {
            self.draft.last_donated_date = date;
        }
        if self.overlay == Overlay::DatePicking {
            self.overlay = Overlay::Normal;
        }
    }

    /// Requests a photo from `provider` and applies the outcome.
    pub async fn request_photo(
        &mut self,
        provider: &dyn PhotoCapture,
        source: PhotoSource,
    ) -> PhotoOutcome {
        let outcome = request_photo(provider, source).await;
        self.apply_photo_outcome(outcome.clone());
        outcome
    }

    /// Stores a captured photo, or explains a denied permission.
    ///
    /// Never changes the overlay state.
    pub fn apply_photo_outcome(&mut self, outcome: PhotoOutcome) {
        match outcome {
            PhotoOutcome::Captured(image) => {
                tracing::info!(uri = %image.uri, "blood bag photo attached");
                self.draft.blood_bag_photo = Some(image);
            }
            PhotoOutcome::Cancelled => {}
            PhotoOutcome::PermissionDenied(source) => {
                let message = match source {
                    PhotoSource::Camera => "Please enable camera and storage permissions.",
                    PhotoSource::Gallery => "Please enable gallery permissions.",
                };
                self.notice = Some(Notice::new("Permission Denied", message));
            }
        }
    }

    /// Shows the QR scanner and arms the scan latch.
    ///
    /// Returns `false` unless the form was in [`Overlay::Normal`].
    pub fn enter_scan_mode(&mut self) -> bool {
        if self.overlay != Overlay::Normal {
            return false;
        }
        self.overlay = Overlay::Scanning;
        self.latch.arm();
        tracing::debug!("scanner opened");
        true
    }

    /// Records a decoded payload and returns to the form.
    ///
    /// Only the first call per scanner activation has any effect; later calls
    /// return `false`.
    pub fn exit_scan_mode(&mut self, value: impl Into<String>) -> bool {
        if self.overlay != Overlay::Scanning || !self.latch.fire() {
            tracing::debug!("late or duplicate scan ignored");
            return false;
        }
        let value = value.into();
        tracing::info!(payload = %value, "QR code scanned");
        self.notice = Some(Notice::new("QR Code Scanned", value.clone()));
        self.draft.qr_scan_result = Some(value);
        self.overlay = Overlay::Normal;
        true
    }

    /// Leaves the scanner without a result. Returns `false` if not scanning.
    pub fn cancel_scan(&mut self) -> bool {
        if self.overlay != Overlay::Scanning {
            return false;
        }
        self.latch.disarm();
        self.overlay = Overlay::Normal;
        tracing::debug!("scanner cancelled");
        true
    }

    /// Leaves the scanner because it could not be started.
    pub fn scan_failed(&mut self, reason: impl Into<String>) {
        if self.cancel_scan() {
            self.notice = Some(Notice::new("Scanner Unavailable", reason));
        }
    }

    /// Snapshots the draft, hands it to the sink and confirms to the user.
    pub fn submit(&mut self) -> DonationRecord {
        let record = DonationRecord::from_draft(&self.draft);
        self.sink.on_submit(&record);
        self.notice = Some(Notice::new(
            "Submission Successful",
            "Donation details have been submitted!",
        ));
        if self.reset_after_submit {
            self.draft = DonationDraft::new(self.today);
        }
        record
    }
}
