use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::donation::{DonationType, HealthIssue};

/// Opaque reference to a captured or selected image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Location of the image, e.g. `file:///home/me/Pictures/bag.jpg`.
    pub uri: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl ImageRef {
    /// Creates a reference carrying only a URI.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            file_name: None,
            mime_type: None,
        }
    }
}

/// Free-text fields of the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Allergies,
    Age,
    Weight,
    BloodPressure,
    BloodCount,
    ClubName,
}

impl TextField {
    pub fn all() -> &'static [TextField] {
        &[
            TextField::Allergies,
            TextField::Age,
            TextField::Weight,
            TextField::BloodPressure,
            TextField::BloodCount,
            TextField::ClubName,
        ]
    }
}

/// A replacement value for exactly one draft field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    DonationType(DonationType),
    HealthIssue(HealthIssue),
    Text(TextField, String),
}

/// The in-progress, not-yet-submitted donation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationDraft {
    pub donation_type: DonationType,
    pub health_issue: HealthIssue,
    pub allergies: String,
    pub last_donated_date: NaiveDate,
    pub age: String,
    pub weight: String,
    pub blood_pressure: String,
    pub blood_count: String,
    pub club_name: String,
    pub blood_bag_photo: Option<ImageRef>,
    pub qr_scan_result: Option<String>,
}

impl DonationDraft {
    /// Creates an empty draft whose last-donated date is `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            donation_type: DonationType::Unset,
            health_issue: HealthIssue::Unset,
            allergies: String::new(),
            last_donated_date: today,
            age: String::new(),
            weight: String::new(),
            blood_pressure: String::new(),
            blood_count: String::new(),
            club_name: String::new(),
            blood_bag_photo: None,
            qr_scan_result: None,
        }
    }

    /// Replaces one field. No validation is performed here.
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::DonationType(t) => self.donation_type = t,
            FieldUpdate::HealthIssue(h) => self.health_issue = h,
            FieldUpdate::Text(field, value) => *self.text_mut(field) = value,
        }
    }

    /// Returns the current value of a text field.
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Allergies => &self.allergies,
            TextField::Age => &self.age,
            TextField::Weight => &self.weight,
            TextField::BloodPressure => &self.blood_pressure,
            TextField::BloodCount => &self.blood_count,
            TextField::ClubName => &self.club_name,
        }
    }

    fn text_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::Allergies => &mut self.allergies,
            TextField::Age => &mut self.age,
            TextField::Weight => &mut self.weight,
            TextField::BloodPressure => &mut self.blood_pressure,
            TextField::BloodCount => &mut self.blood_count,
            TextField::ClubName => &mut self.club_name,
        }
    }
}
