//! TUI: App state, event loop, screens, widgets.

pub mod action;
pub mod app;
pub mod error;
pub mod screens;
#[cfg(test)]
pub(crate) mod test_support;
pub mod widgets;

pub use app::{App, AppSink};
pub use error::AppError;
