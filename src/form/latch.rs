/// One-shot guard armed once per scanner activation.
///
/// [`fire`](ScanLatch::fire) succeeds at most once between two calls to
/// [`arm`](ScanLatch::arm).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanLatch {
    armed: bool,
}

impl ScanLatch {
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Consumes the latch. Returns `true` only for the first call after arming.
    pub fn fire(&mut self) -> bool {
        std::mem::replace(&mut self.armed, false)
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}
