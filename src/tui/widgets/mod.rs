//! Reusable TUI widgets.

pub mod focus;
pub mod notice;
pub mod select_field;
pub mod text_field;

pub use focus::FocusRing;
pub use notice::{centered, draw_notice};
pub use select_field::{SelectFieldSpec, draw_select_field};
pub use text_field::{Keyboard, TextFieldSpec, draw_text_field};
