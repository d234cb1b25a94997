//! TUI screen implementations.

pub mod date_picker;
pub mod donation_form;
pub mod scanner;

pub use date_picker::{DatePickerState, draw_date_picker};
pub use donation_form::{DonationFormState, Row, draw_donation_form};
pub use scanner::{ScannerState, draw_scanner};
