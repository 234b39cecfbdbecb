use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::utils::date_range::DateSpan;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum HolidayKind {
    National,
    Religious,
    Regional,
    Corporate,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "0b9d3c55-71a2-4f43-8d8e-8d5d7b0e2f10",
    "name": "Winter Break",
    "type": "Corporate",
    "startDate": "2025-12-24",
    "endDate": "2026-01-01",
    "isDateRange": true
}))]
pub struct Holiday {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: HolidayKind,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    /// Only set for ranged holidays
    #[schema(value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
    pub is_date_range: bool,
}

impl Holiday {
    pub fn span(&self) -> DateSpan {
        match self.end_date {
            Some(end) if self.is_date_range => DateSpan {
                start: self.start_date,
                end,
            },
            _ => DateSpan::single(self.start_date),
        }
    }
}

/// Form payload for creating a holiday.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HolidayInput {
    #[schema(example = "New Year's Day")]
    pub name: String,
    #[schema(example = "2026-01-01", format = "date")]
    pub start_date: String,
    #[schema(example = "2026-01-02", format = "date", nullable = true)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_date_range: bool,
    #[serde(rename = "type", default = "default_kind")]
    #[schema(example = "National")]
    pub kind: String,
}

fn default_kind() -> String {
    HolidayKind::Other.to_string()
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HolidayPatch {
    pub name: Option<String>,
    #[schema(format = "date")]
    pub start_date: Option<String>,
    #[schema(format = "date")]
    pub end_date: Option<String>,
    pub is_date_range: Option<bool>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}
