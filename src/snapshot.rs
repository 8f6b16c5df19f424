//! JSON snapshot of a record list and its GPA, as saved and exported.
//!
//! The layout keeps the field names used by earlier saved files:
//!
//! ```json
//! {
//!   "courses": [{ "id": 1, "name": "CALC 1000", "percentage": "85", "credits": "0.5", "semester": "2024-Fall" }],
//!   "gpa": 3.9,
//!   "semesterGPAs": { "2024-Fall": 3.9 },
//!   "exportDate": "2025-05-01T12:00:00Z"
//! }
//! ```
//!
//! Courses are stored without their validity flag; every restored course is valid.

use crate::error::TranscriptError;
use crate::grading::GpaSummary;
use crate::transcript::CourseRecord;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// One stored course.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredCourse {
    pub id: i64,
    pub name: String,
    pub percentage: String,
    pub credits: String,
    #[serde(rename = "semester")]
    pub term: String,
}

impl From<&CourseRecord> for StoredCourse {
    fn from(record: &CourseRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            percentage: record.percentage.clone(),
            credits: record.credits.clone(),
            term: record.term.clone(),
        }
    }
}

impl From<StoredCourse> for CourseRecord {
    fn from(course: StoredCourse) -> Self {
        Self {
            id: course.id,
            name: course.name,
            percentage: course.percentage,
            credits: course.credits,
            term: course.term,
            is_valid: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub courses: Vec<StoredCourse>,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(rename = "semesterGPAs", default)]
    pub semester_gpas: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Captures records and their statistics, stamped with the current time.
    pub fn capture(records: &[CourseRecord], summary: &GpaSummary) -> Self {
        Self {
            courses: records.iter().map(StoredCourse::from).collect(),
            gpa: summary.gpa,
            semester_gpas: summary
                .terms
                .iter()
                .map(|entry| (entry.term.clone(), entry.gpa))
                .collect(),
            export_date: Some(Utc::now()),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, TranscriptError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a saved snapshot. A malformed document is an error; callers typically fall
    /// back to a single blank row.
    pub fn from_json(text: &str) -> Result<Self, TranscriptError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The stored courses as records, each marked valid.
    pub fn restore(self) -> Vec<CourseRecord> {
        self.courses.into_iter().map(CourseRecord::from).collect()
    }
}
