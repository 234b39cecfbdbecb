use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::{HrError, HrResult};
use crate::model::holiday::{Holiday, HolidayInput, HolidayPatch};
use crate::store::SortOrder;
use crate::store::holiday::HolidayStore;
use crate::utils::date_range::{days_until, parse_date};

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HolidayScope {
    #[default]
    All,
    Upcoming,
    Past,
}

#[derive(Deserialize, IntoParams)]
pub struct OrderQuery {
    /// `asc` (default) or `desc`, by start date
    pub order: Option<SortOrder>,
}

#[derive(Deserialize, IntoParams)]
pub struct HolidayListQuery {
    pub scope: Option<HolidayScope>,
    pub order: Option<SortOrder>,
}

#[derive(Deserialize, IntoParams)]
pub struct ActiveQuery {
    /// Day to check, `YYYY-MM-DD`; defaults to today
    pub date: Option<String>,
}

/// A holiday with its distance from today.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HolidayView {
    #[serde(flatten)]
    pub holiday: Holiday,
    #[schema(example = 7)]
    pub days_until: i64,
}

#[derive(Serialize, ToSchema)]
pub struct UserHolidays {
    pub upcoming: Vec<HolidayView>,
    pub past: Vec<HolidayView>,
}

#[derive(Serialize, ToSchema)]
pub struct HolidayListResponse {
    pub data: Vec<Holiday>,
}

fn with_distance(holidays: Vec<Holiday>, today: NaiveDate) -> Vec<HolidayView> {
    holidays
        .into_iter()
        .map(|holiday| HolidayView {
            days_until: days_until(holiday.start_date, today),
            holiday,
        })
        .collect()
}

/// Upcoming and past holidays for the employee calendar
#[utoipa::path(
    get,
    path = "/api/user/holidays",
    params(OrderQuery),
    responses(
        (status = 200, description = "Holidays split around today", body = UserHolidays),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn user_holidays(
    _auth: AuthUser,
    store: web::Data<HolidayStore>,
    query: web::Query<OrderQuery>,
) -> HrResult<HttpResponse> {
    let today = Local::now().date_naive();
    let order = query.order.unwrap_or_default();

    let upcoming = store.list_upcoming(today, order).await?;
    let past = store.list_past(today, order).await?;

    Ok(HttpResponse::Ok().json(UserHolidays {
        upcoming: with_distance(upcoming, today),
        past: with_distance(past, today),
    }))
}

/// Holiday list for the admin calendar
#[utoipa::path(
    get,
    path = "/api/admin/holidays",
    params(HolidayListQuery),
    responses(
        (status = 200, description = "Holidays", body = HolidayListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn list_holidays(
    auth: AuthUser,
    store: web::Data<HolidayStore>,
    query: web::Query<HolidayListQuery>,
) -> HrResult<HttpResponse> {
    auth.require_admin()?;

    let today = Local::now().date_naive();
    let order = query.order.unwrap_or_default();
    let data = match query.scope.unwrap_or_default() {
        HolidayScope::All => store.list(order).await?,
        HolidayScope::Upcoming => store.list_upcoming(today, order).await?,
        HolidayScope::Past => store.list_past(today, order).await?,
    };

    Ok(HttpResponse::Ok().json(HolidayListResponse { data }))
}

/// Holidays in effect on a date
#[utoipa::path(
    get,
    path = "/api/admin/holidays/active",
    params(ActiveQuery),
    responses(
        (status = 200, description = "Active holidays", body = HolidayListResponse),
        (status = 400, description = "Invalid date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn active_holidays(
    auth: AuthUser,
    store: web::Data<HolidayStore>,
    query: web::Query<ActiveQuery>,
) -> HrResult<HttpResponse> {
    auth.require_admin()?;

    let date = match query.date.as_deref() {
        Some(raw) => parse_date(raw).ok_or_else(|| HrError::validation("date", "Invalid date"))?,
        None => Local::now().date_naive(),
    };

    let data = store.active_on(date).await?;
    Ok(HttpResponse::Ok().json(HolidayListResponse { data }))
}

/// Add holiday
#[utoipa::path(
    post,
    path = "/api/admin/holiday",
    request_body = HolidayInput,
    responses(
        (status = 201, description = "Holiday added", body = Holiday),
        (status = 400, description = "Invalid field", body = Object, example = json!({
            "message": "Invalid or earlier end date",
            "field": "endDate"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn add_holiday(
    auth: AuthUser,
    store: web::Data<HolidayStore>,
    payload: web::Json<HolidayInput>,
) -> HrResult<HttpResponse> {
    auth.require_admin()?;
    let holiday = store.add(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(holiday))
}

/// Update holiday
#[utoipa::path(
    put,
    path = "/api/admin/holiday/{holiday_id}",
    params(
        ("holiday_id" = String, Path, description = "Holiday ID")
    ),
    request_body = HolidayPatch,
    responses(
        (status = 200, description = "Holiday updated", body = Holiday),
        (status = 400, description = "Invalid field"),
        (status = 404, description = "Holiday not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn update_holiday(
    auth: AuthUser,
    store: web::Data<HolidayStore>,
    path: web::Path<String>,
    payload: web::Json<HolidayPatch>,
) -> HrResult<HttpResponse> {
    auth.require_admin()?;
    let holiday = store.update(&path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(holiday))
}

/// Delete holiday
#[utoipa::path(
    delete,
    path = "/api/admin/holiday/{holiday_id}",
    params(
        ("holiday_id" = String, Path, description = "Holiday ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Holiday not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn delete_holiday(
    auth: AuthUser,
    store: web::Data<HolidayStore>,
    path: web::Path<String>,
) -> HrResult<HttpResponse> {
    auth.require_admin()?;
    store.remove(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
