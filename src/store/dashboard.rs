use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::Stores;
use crate::error::HrResult;
use crate::model::attendance::AttendanceStatus;
use crate::store::SortOrder;
use crate::utils::date_range::days_until;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceToday {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    /// Employees with no mark yet today
    pub unmarked: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NextHoliday {
    pub name: String,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    pub days_until: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingHolidays {
    pub count: usize,
    pub next: Option<NextHoliday>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_employees: usize,
    pub attendance_today: AttendanceToday,
    pub pending_leaves: usize,
    pub approved_leaves: usize,
    pub upcoming_holidays: UpcomingHolidays,
}

/// Admin landing page numbers, all taken as of `today`.
pub async fn summarize(stores: &Stores, today: NaiveDate) -> HrResult<DashboardSummary> {
    let directory = stores.employees.ids().await?;
    let total_employees = directory.len();

    let mut attendance_today = AttendanceToday {
        total: total_employees,
        ..Default::default()
    };
    // marks for ids outside the directory do not count
    for record in stores
        .attendance
        .list_on(today)
        .await?
        .into_iter()
        .filter(|r| directory.contains(&r.subject_id))
    {
        match record.status {
            AttendanceStatus::Present => attendance_today.present += 1,
            AttendanceStatus::Absent => attendance_today.absent += 1,
            AttendanceStatus::Late => attendance_today.late += 1,
        }
    }
    let marked = attendance_today.present + attendance_today.absent + attendance_today.late;
    attendance_today.unmarked = total_employees.saturating_sub(marked);

    let leaves = stores.leaves.counts().await?;

    let upcoming = stores.holidays.list_upcoming(today, SortOrder::Asc).await?;
    let next = upcoming.first().map(|h| NextHoliday {
        name: h.name.clone(),
        start_date: h.start_date,
        days_until: days_until(h.start_date, today),
    });

    Ok(DashboardSummary {
        total_employees,
        attendance_today,
        pending_leaves: leaves.pending,
        approved_leaves: leaves.approved,
        upcoming_holidays: UpcomingHolidays {
            count: upcoming.len(),
            next,
        },
    })
}
