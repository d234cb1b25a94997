//! Form controller: the single owner of the donation draft.

mod controller;
mod latch;

pub use controller::FormController;
pub use latch::ScanLatch;

/// Which overlay, if any, is showing on top of (or instead of) the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Overlay {
    /// Just the form.
    #[default]
    Normal,
    /// The date picker, drawn over the form.
    DatePicking,
    /// The QR scanner, replacing the form entirely.
    Scanning,
}

/// A one-shot message for the user, dismissed explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}
