//! Output boundary for submitted donation records.

use crate::model::DonationRecord;

/// Receives each submitted record. Called synchronously from
/// [`FormController::submit`](crate::form::FormController::submit).
pub trait SubmissionSink {
    fn on_submit(&mut self, record: &DonationRecord);
}

/// Logs each record as JSON at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl SubmissionSink for TracingSink {
    fn on_submit(&mut self, record: &DonationRecord) {
        match serde_json::to_string(record) {
            Ok(json) => tracing::info!(record = %json, "donation details submitted"),
            Err(err) => tracing::warn!(%err, "could not serialize donation record"),
        }
    }
}

/// Keeps every submitted record in memory, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectingSink {
    records: Vec<DonationRecord>,
}

impl CollectingSink {
    pub fn records(&self) -> &[DonationRecord] {
        &self.records
    }
}

impl SubmissionSink for CollectingSink {
    fn on_submit(&mut self, record: &DonationRecord) {
        self.records.push(record.clone());
    }
}

/// Fans a record out to both sinks, left first.
impl<A: SubmissionSink, B: SubmissionSink> SubmissionSink for (A, B) {
    fn on_submit(&mut self, record: &DonationRecord) {
        self.0.on_submit(record);
        self.1.on_submit(record);
    }
}
