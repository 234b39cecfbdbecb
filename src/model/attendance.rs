use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    /// Present and late marks carry clock times, absences never do.
    pub fn has_times(self) -> bool {
        !matches!(self, AttendanceStatus::Absent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub subject_id: String,
    #[schema(value_type = String, format = "date", example = "2024-05-01")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(value_type = Option<String>, example = "09:00:00")]
    pub check_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "17:30:00")]
    pub check_out: Option<NaiveTime>,
}

/// Parsed attendance mark handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceMark {
    pub subject_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub present_count: u32,
    pub absent_count: u32,
    pub late_count: u32,
}

impl AttendanceSummary {
    pub fn record(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present_count += 1,
            AttendanceStatus::Absent => self.absent_count += 1,
            AttendanceStatus::Late => self.late_count += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.present_count + self.absent_count + self.late_count
    }
}
