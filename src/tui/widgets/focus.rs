//! Focus management for a fixed list of form rows.

/// Tracks which of `len` rows has keyboard focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusRing {
    len: usize,
    focus: usize,
}

impl FocusRing {
    /// Creates a ring over `len` rows. Focus starts on the first row.
    pub fn new(len: usize) -> Self {
        Self { len, focus: 0 }
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Moves focus to the next row, wrapping around.
    pub fn focus_next(&mut self) {
        if self.len == 0 {
            return;
        }
        self.focus = (self.focus + 1) % self.len;
    }

    /// Moves focus to the previous row, wrapping around.
    pub fn focus_prev(&mut self) {
        if self.len == 0 {
            return;
        }
        self.focus = (self.focus + self.len - 1) % self.len;
    }

    /// Sets focus to `index`; out-of-range indices are ignored.
    pub fn set_focus(&mut self, index: usize) {
        if index < self.len {
            self.focus = index;
        }
    }
}
