use actix_web::{HttpResponse, web};
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::{HrError, HrResult};
use crate::model::attendance::{AttendanceMark, AttendanceRecord, AttendanceStatus, AttendanceSummary};
use crate::store::attendance::{AttendanceStore, BulkEntry, BulkOutcome};
use crate::utils::date_range::{parse_date, parse_time};

/// Days shown by the own-records view when `from` is omitted.
const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelfMark {
    #[schema(example = "Present")]
    pub status: String,
    /// Defaults to today
    #[schema(example = "2026-01-05", format = "date", nullable = true)]
    pub date: Option<String>,
    /// Defaults to the current time for Present/Late
    #[schema(example = "09:05", nullable = true)]
    pub check_in: Option<String>,
    #[schema(example = "17:30", nullable = true)]
    pub check_out: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkMarkRow {
    #[schema(example = "1")]
    pub subject_id: String,
    #[schema(example = "Late")]
    pub status: String,
    #[schema(example = "09:40", nullable = true)]
    pub check_in: Option<String>,
    #[schema(nullable = true)]
    pub check_out: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct BulkMark {
    #[schema(example = "2026-01-05", format = "date")]
    pub date: String,
    pub entries: Vec<BulkMarkRow>,
}

#[derive(Deserialize, IntoParams)]
pub struct RangeQuery {
    /// Defaults to 30 days before `to`
    pub from: Option<String>,
    /// Defaults to today
    pub to: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct MonthQuery {
    /// `YYYY-MM`; defaults to the current month
    pub month: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct DateQuery {
    /// `YYYY-MM-DD`; defaults to today
    pub date: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRecord>,
}

fn status(raw: &str) -> HrResult<AttendanceStatus> {
    raw.trim()
        .parse()
        .map_err(|_| HrError::validation("status", "Status must be Present, Absent or Late"))
}

fn optional_time(field: &'static str, raw: Option<&str>) -> HrResult<Option<NaiveTime>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_time(s)
            .map(Some)
            .ok_or_else(|| HrError::validation(field, "Time must be HH:MM")),
        None => Ok(None),
    }
}

fn date_or_today(field: &'static str, raw: Option<&str>, today: NaiveDate) -> HrResult<NaiveDate> {
    match raw {
        Some(s) => parse_date(s).ok_or_else(|| HrError::validation(field, "Invalid date")),
        None => Ok(today),
    }
}

/// Parses `YYYY-MM` into (year, month).
fn parse_month(raw: &str) -> Option<(i32, u32)> {
    let (year, month) = raw.trim().split_once('-')?;
    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year.parse().ok()?, month))
}

/// Mark own attendance
#[utoipa::path(
    post,
    path = "/api/user/attendance",
    request_body = SelfMark,
    responses(
        (status = 200, description = "Attendance marked", body = AttendanceRecord),
        (status = 400, description = "Invalid field"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn mark_own(
    auth: AuthUser,
    store: web::Data<AttendanceStore>,
    payload: web::Json<SelfMark>,
) -> HrResult<HttpResponse> {
    let now = Local::now().naive_local();
    let status = status(&payload.status)?;
    let date = date_or_today("date", payload.date.as_deref(), now.date())?;

    let mut check_in = optional_time("checkIn", payload.check_in.as_deref())?;
    if check_in.is_none() && status.has_times() {
        check_in = now.time().with_nanosecond(0);
    }
    let check_out = optional_time("checkOut", payload.check_out.as_deref())?;

    let record = store
        .mark(AttendanceMark {
            subject_id: auth.subject_id(),
            date,
            status,
            check_in,
            check_out,
        })
        .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Own attendance records, oldest first
#[utoipa::path(
    get,
    path = "/api/user/attendance",
    params(RangeQuery),
    responses(
        (status = 200, description = "Attendance records", body = AttendanceListResponse),
        (status = 400, description = "Invalid range"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_attendance(
    auth: AuthUser,
    store: web::Data<AttendanceStore>,
    query: web::Query<RangeQuery>,
) -> HrResult<HttpResponse> {
    let today = Local::now().date_naive();
    let to = date_or_today("to", query.to.as_deref(), today)?;
    let from = match query.from.as_deref() {
        Some(raw) => parse_date(raw).ok_or_else(|| HrError::validation("from", "Invalid date"))?,
        None => to
            .checked_sub_signed(Duration::days(DEFAULT_WINDOW_DAYS))
            .ok_or_else(|| HrError::validation("to", "End date is out of range"))?,
    };

    let data = store.list_for_range(&auth.subject_id(), from, to).await?;
    Ok(HttpResponse::Ok().json(AttendanceListResponse { data }))
}

/// Own monthly counts
#[utoipa::path(
    get,
    path = "/api/user/attendance/summary",
    params(MonthQuery),
    responses(
        (status = 200, description = "Monthly counts", body = AttendanceSummary),
        (status = 400, description = "Invalid month"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_summary(
    auth: AuthUser,
    store: web::Data<AttendanceStore>,
    query: web::Query<MonthQuery>,
) -> HrResult<HttpResponse> {
    let (year, month) = match query.month.as_deref() {
        Some(raw) => parse_month(raw)
            .ok_or_else(|| HrError::validation("month", "Month must be YYYY-MM"))?,
        None => {
            let today = Local::now().date_naive();
            (today.year(), today.month())
        }
    };

    let summary = store.summary(&auth.subject_id(), year, month).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Mark attendance for many employees on one day (HR/Admin)
#[utoipa::path(
    post,
    path = "/api/admin/attendance",
    request_body = BulkMark,
    responses(
        (status = 200, description = "Attendance marked", body = BulkOutcome),
        (status = 400, description = "Invalid field"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn mark_bulk(
    auth: AuthUser,
    store: web::Data<AttendanceStore>,
    payload: web::Json<BulkMark>,
) -> HrResult<HttpResponse> {
    auth.require_admin()?;

    let payload = payload.into_inner();
    let date = parse_date(&payload.date).ok_or_else(|| HrError::validation("date", "Invalid date"))?;

    // Parse the whole roster before writing any of it.
    let entries = payload
        .entries
        .into_iter()
        .map(|row| {
            Ok(BulkEntry {
                status: status(&row.status)?,
                check_in: optional_time("checkIn", row.check_in.as_deref())?,
                check_out: optional_time("checkOut", row.check_out.as_deref())?,
                subject_id: row.subject_id,
            })
        })
        .collect::<HrResult<Vec<_>>>()?;

    let outcome = store.mark_many(date, entries).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Every record for one day (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/admin/attendance",
    params(DateQuery),
    responses(
        (status = 200, description = "Attendance records", body = AttendanceListResponse),
        (status = 400, description = "Invalid date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_on(
    auth: AuthUser,
    store: web::Data<AttendanceStore>,
    query: web::Query<DateQuery>,
) -> HrResult<HttpResponse> {
    auth.require_admin()?;

    let date = date_or_today("date", query.date.as_deref(), Local::now().date_naive())?;
    let data = store.list_on(date).await?;
    Ok(HttpResponse::Ok().json(AttendanceListResponse { data }))
}
