use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::draft::DonationDraft;

/// `strftime` pattern for the submitted date, e.g. `Fri Oct 16 2026`.
const DISPLAY_DATE_FORMAT: &str = "%a %b %d %Y";

/// Immutable snapshot of a draft, as handed to the submission boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRecord {
    pub donation_type: String,
    pub health_issue: String,
    pub allergies: String,
    pub last_donated_date: String,
    pub age: String,
    pub weight: String,
    pub blood_pressure: String,
    pub blood_count: String,
    pub club_name: String,
    pub blood_bag_photo_uri: Option<String>,
    pub qr_code_details: String,
}

impl DonationRecord {
    /// Snapshots a draft, rendering the date for display.
    pub fn from_draft(draft: &DonationDraft) -> Self {
        Self {
            donation_type: draft.donation_type.code().to_string(),
            health_issue: draft.health_issue.code().to_string(),
            allergies: draft.allergies.clone(),
            last_donated_date: display_date(draft.last_donated_date),
            age: draft.age.clone(),
            weight: draft.weight.clone(),
            blood_pressure: draft.blood_pressure.clone(),
            blood_count: draft.blood_count.clone(),
            club_name: draft.club_name.clone(),
            blood_bag_photo_uri: draft.blood_bag_photo.as_ref().map(|img| img.uri.clone()),
            qr_code_details: draft.qr_scan_result.clone().unwrap_or_default(),
        }
    }
}

/// Formats a date the way the form shows it on the date button.
pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DonationType, FieldUpdate, HealthIssue, ImageRef, TextField};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn display_date_matches_button_text() {
        assert_eq!(display_date(today()), "Fri Oct 16 2026");
        assert_eq!(
            display_date(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()),
            "Sun Mar 02 2025"
        );
    }

    #[test]
    fn untouched_draft_yields_empty_record() {
        let record = DonationRecord::from_draft(&DonationDraft::new(today()));
        assert_eq!(record.donation_type, "");
        assert_eq!(record.health_issue, "");
        assert_eq!(record.allergies, "");
        assert_eq!(record.last_donated_date, "Fri Oct 16 2026");
        assert_eq!(record.age, "");
        assert_eq!(record.weight, "");
        assert_eq!(record.blood_pressure, "");
        assert_eq!(record.blood_count, "");
        assert_eq!(record.club_name, "");
        assert_eq!(record.blood_bag_photo_uri, None);
        assert_eq!(record.qr_code_details, "");
    }

    #[test]
    fn photo_uri_and_scan_are_carried() {
        let mut draft = DonationDraft::new(today());
        draft.blood_bag_photo = Some(ImageRef {
            uri: "file:///tmp/bag.jpg".into(),
            file_name: Some("bag.jpg".into()),
            mime_type: Some("image/jpeg".into()),
        });
        draft.qr_scan_result = Some("LOT-1".into());
        let record = DonationRecord::from_draft(&draft);
        assert_eq!(
            record.blood_bag_photo_uri.as_deref(),
            Some("file:///tmp/bag.jpg")
        );
        assert_eq!(record.qr_code_details, "LOT-1");
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut draft = DonationDraft::new(today());
        draft.apply(FieldUpdate::DonationType(DonationType::Volunteer));
        draft.apply(FieldUpdate::HealthIssue(HealthIssue::None));
        draft.apply(FieldUpdate::Text(TextField::Age, "34".into()));
        let json = serde_json::to_string(&DonationRecord::from_draft(&draft)).unwrap();
        insta::assert_snapshot!(json, @r#"{"donationType":"volunteer","healthIssue":"none","allergies":"","lastDonatedDate":"Fri Oct 16 2026","age":"34","weight":"","bloodPressure":"","bloodCount":"","clubName":"","bloodBagPhotoUri":null,"qrCodeDetails":""}"#);
    }
}
