use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Progress of an enrollment. Distinct from the record's `active` flag:
/// `status` tracks how the student is doing in the course, `active` tracks
/// whether the relationship still exists at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Dropped,
}

impl EnrollmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Completed => "completed",
            EnrollmentStatus::Dropped => "dropped",
        }
    }
}
