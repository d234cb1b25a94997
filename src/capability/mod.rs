//! Device capability boundaries: photo capture and QR scanning.
//!
//! Providers are async and never touch the draft. Their results travel back
//! to the event loop as [`ProviderEvent`]s.

mod error;
mod photo;
mod qr;
#[cfg(test)]
pub(crate) mod scripted;

pub use error::ScanError;
pub use photo::{DirectoryPhotoCapture, PhotoCapture, PhotoOutcome, PhotoSource, request_photo};
pub use qr::{Debouncer, LineQrDecoder, QrDecoder, ScanEvent, ScanSession, run_scan};

/// A capability result delivered to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    Photo(PhotoOutcome),
    /// A scan result, stamped with the scanner activation that produced it.
    Scan { activation: u64, event: ScanEvent },
}
