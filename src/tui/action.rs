//! Actions returned by screen event handlers.

use chrono::NaiveDate;
use crossterm::event::KeyEvent;

use crate::capability::PhotoSource;
use crate::model::{DonationDraft, FieldUpdate};

/// An action that a screen handler returns to the [`App`](super::App).
///
/// Screens never touch the draft; the `App` applies these to the
/// [`FormController`](crate::form::FormController).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No state change needed.
    None,
    /// Replace one draft field.
    Update(FieldUpdate),
    /// Show the date picker.
    OpenDatePicker,
    /// Close the date picker, with the chosen date or `None` if dismissed.
    PickDate(Option<NaiveDate>),
    /// Ask the photo provider for an image.
    RequestPhoto(PhotoSource),
    /// Show the QR scanner.
    EnterScan,
    /// Leave the QR scanner without a result.
    CancelScan,
    /// Submit the draft.
    Submit,
    /// Close the current notice.
    DismissNotice,
    /// Quit the application.
    Quit,
}

/// Common behavior for all screen state types.
pub trait ScreenState {
    /// Process a key event against a read-only view of the draft.
    fn handle_key(&mut self, draft: &DonationDraft, key: KeyEvent) -> Action;
}
