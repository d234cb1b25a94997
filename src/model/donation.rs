use std::fmt;

use serde::{Deserialize, Serialize};

/// A `{label, value}` pair offered by a single-select field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOption {
    pub label: &'static str,
    pub value: &'static str,
}

/// Kind of blood donation being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DonationType {
    #[default]
    Unset,
    Volunteer,
    PatientSpecific,
    Replacement,
    Autologous,
}

static ALL_DONATION_TYPES: &[DonationType] = &[
    DonationType::Unset,
    DonationType::Volunteer,
    DonationType::PatientSpecific,
    DonationType::Replacement,
    DonationType::Autologous,
];

static DONATION_TYPE_OPTIONS: &[SelectOption] = &[
    SelectOption {
        label: "Select Donation Type",
        value: "",
    },
    SelectOption {
        label: "Volunteer",
        value: "volunteer",
    },
    SelectOption {
        label: "Patient Specific",
        value: "patient_specific",
    },
    SelectOption {
        label: "Replacement",
        value: "replacement",
    },
    SelectOption {
        label: "Autologous",
        value: "autologous",
    },
];

impl DonationType {
    /// Returns the wire code; [`DonationType::Unset`] encodes as `""`.
    pub fn code(&self) -> &'static str {
        match self {
            DonationType::Unset => "",
            DonationType::Volunteer => "volunteer",
            DonationType::PatientSpecific => "patient_specific",
            DonationType::Replacement => "replacement",
            DonationType::Autologous => "autologous",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DonationType::Unset => "Select Donation Type",
            DonationType::Volunteer => "Volunteer",
            DonationType::PatientSpecific => "Patient Specific",
            DonationType::Replacement => "Replacement",
            DonationType::Autologous => "Autologous",
        }
    }

    /// Parses a wire code. Unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.code() == code)
    }

    /// Returns all donation types in display order, placeholder first.
    pub fn all() -> &'static [DonationType] {
        ALL_DONATION_TYPES
    }

    /// Select options in display order; the first entry means "no selection".
    pub fn options() -> &'static [SelectOption] {
        DONATION_TYPE_OPTIONS
    }
}

#[mutants::skip]
impl fmt::Display for DonationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Self-reported health condition of the donor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HealthIssue {
    #[default]
    Unset,
    None,
    Diabetes,
    Hypertension,
    Asthma,
    HeartDisease,
}

static ALL_HEALTH_ISSUES: &[HealthIssue] = &[
    HealthIssue::Unset,
    HealthIssue::None,
    HealthIssue::Diabetes,
    HealthIssue::Hypertension,
    HealthIssue::Asthma,
    HealthIssue::HeartDisease,
];

static HEALTH_ISSUE_OPTIONS: &[SelectOption] = &[
    SelectOption {
        label: "Select Health Issue",
        value: "",
    },
    SelectOption {
        label: "None",
        value: "none",
    },
    SelectOption {
        label: "Diabetes",
        value: "diabetes",
    },
    SelectOption {
        label: "Hypertension",
        value: "hypertension",
    },
    SelectOption {
        label: "Asthma",
        value: "asthma",
    },
    SelectOption {
        label: "Heart Disease",
        value: "heart_disease",
    },
];

impl HealthIssue {
    /// Returns the wire code; [`HealthIssue::Unset`] encodes as `""`.
    pub fn code(&self) -> &'static str {
        match self {
            HealthIssue::Unset => "",
            HealthIssue::None => "none",
            HealthIssue::Diabetes => "diabetes",
            HealthIssue::Hypertension => "hypertension",
            HealthIssue::Asthma => "asthma",
            HealthIssue::HeartDisease => "heart_disease",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthIssue::Unset => "Select Health Issue",
            HealthIssue::None => "None",
            HealthIssue::Diabetes => "Diabetes",
            HealthIssue::Hypertension => "Hypertension",
            HealthIssue::Asthma => "Asthma",
            HealthIssue::HeartDisease => "Heart Disease",
        }
    }

    /// Parses a wire code. Unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::all().iter().copied().find(|h| h.code() == code)
    }

    pub fn all() -> &'static [HealthIssue] {
        ALL_HEALTH_ISSUES
    }

    pub fn options() -> &'static [SelectOption] {
        HEALTH_ISSUE_OPTIONS
    }
}

#[mutants::skip]
impl fmt::Display for HealthIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
