use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum LeaveCategory {
    Annual,
    Sick,
    Maternity,
    Paternity,
    Unpaid,
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

/// Outcome an approver can choose; `Pending` is not a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Decision {
    Approved,
    Rejected,
}

impl From<Decision> for LeaveStatus {
    fn from(d: Decision) -> Self {
        match d {
            Decision::Approved => LeaveStatus::Approved,
            Decision::Rejected => LeaveStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "4c1f0c9e-5c7a-4a51-9a53-0d2f1b8f0c11",
    "requesterId": "1000",
    "category": "Sick",
    "startDate": "2026-01-01",
    "endDate": "2026-01-03",
    "reason": "Medical appointment",
    "document": null,
    "status": "Pending",
    "createdAt": "2025-12-28T09:00:00Z",
    "decidedAt": null
}))]
pub struct LeaveRequest {
    pub id: String,
    pub requester_id: String,
    pub category: LeaveCategory,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub reason: String,
    /// Reference to an uploaded supporting document
    pub document: Option<String>,
    pub status: LeaveStatus,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub decided_at: Option<DateTime<Utc>>,
}

/// Raw form input, validated by the leave store.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveSubmission {
    #[schema(example = "Sick")]
    pub leave_type: String,
    #[schema(example = "2026-01-01", format = "date")]
    pub from_date: String,
    #[schema(example = "2026-01-03", format = "date")]
    pub to_date: String,
    #[schema(example = "Medical appointment")]
    pub reason: String,
    #[schema(example = "uploads/leave/medical-note.pdf", nullable = true)]
    pub document: Option<String>,
}
