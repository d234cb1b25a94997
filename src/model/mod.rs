//! Donation draft, select-field enums and the submitted record.

mod donation;
mod draft;
mod record;

pub use donation::{DonationType, HealthIssue, SelectOption};
pub use draft::{DonationDraft, FieldUpdate, ImageRef, TextField};
pub use record::{DonationRecord, display_date};
