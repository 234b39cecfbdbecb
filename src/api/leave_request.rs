use actix_web::{HttpResponse, web};
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::{HrError, HrResult};
use crate::model::leave_request::{Decision, LeaveRequest, LeaveStatus, LeaveSubmission};
use crate::store::SortOrder;
use crate::store::leave::{LeaveCounts, LeaveSort, LeaveStore, sort_leaves};

#[derive(Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveFilter {
    #[schema(example = "Pending")]
    /// `Pending`, `Approved`, `Rejected`, or `history` for every decided request
    pub status: Option<String>,
    /// Defaults to `createdAt` when only `order` is given
    pub sort_by: Option<LeaveSort>,
    /// Defaults to `desc` when only `sortBy` is given
    pub order: Option<SortOrder>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
}

#[derive(Deserialize, ToSchema)]
pub struct StatusUpdate {
    #[schema(example = "Approved")]
    pub status: String,
}

/* =========================
Submit leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/user/leave-form",
    request_body(
        content = LeaveSubmission,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = Object, example = json!({
            "message": "Leave request submitted",
            "data": { "status": "Pending" }
        })),
        (status = 400, description = "Invalid field", body = Object, example = json!({
            "message": "Reason must be 10-500 characters",
            "field": "reason"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn submit_leave(
    auth: AuthUser,
    store: web::Data<LeaveStore>,
    payload: web::Json<LeaveSubmission>,
) -> HrResult<HttpResponse> {
    let leave = store
        .submit(
            &auth.subject_id(),
            payload.into_inner(),
            Local::now().date_naive(),
            Utc::now(),
        )
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Leave request submitted",
        "data": leave
    })))
}

/// Caller's own leave requests
#[utoipa::path(
    get,
    path = "/api/user/leave-forms",
    responses(
        (status = 200, description = "Own leave requests", body = LeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_leaves(auth: AuthUser, store: web::Data<LeaveStore>) -> HrResult<HttpResponse> {
    let data = store.list_for_requester(&auth.subject_id()).await?;
    Ok(HttpResponse::Ok().json(LeaveListResponse { data }))
}

/// Every leave request (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/user/all-leave-forms",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Leave requests", body = LeaveListResponse),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn all_leaves(
    auth: AuthUser,
    store: web::Data<LeaveStore>,
    query: web::Query<LeaveFilter>,
) -> HrResult<HttpResponse> {
    auth.require_admin()?;

    let mut data = match query.status.as_deref().map(str::trim) {
        None | Some("") => store.list_all().await?,
        Some(s) if s.eq_ignore_ascii_case("history") => store.list_history().await?,
        Some(s) => match s.parse::<LeaveStatus>() {
            Ok(LeaveStatus::Pending) => store.list_pending().await?,
            Ok(status) => {
                let mut decided = store.list_history().await?;
                decided.retain(|l| l.status == status);
                decided
            }
            Err(_) => {
                return Err(HrError::validation(
                    "status",
                    "Status must be Pending, Approved, Rejected or history",
                ));
            }
        },
    };

    if query.sort_by.is_some() || query.order.is_some() {
        sort_leaves(
            &mut data,
            query.sort_by.unwrap_or_default(),
            query.order.unwrap_or(SortOrder::Desc),
        );
    }

    Ok(HttpResponse::Ok().json(LeaveListResponse { data }))
}

/// One leave request; visible to its requester and to HR/Admin
#[utoipa::path(
    get,
    path = "/api/user/leave-form/{leave_id}",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "leave request '42' not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    store: web::Data<LeaveStore>,
    path: web::Path<String>,
) -> HrResult<HttpResponse> {
    let leave = store.get(&path.into_inner()).await?;

    if leave.requester_id != auth.subject_id() {
        auth.require_admin()?;
    }
    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Approve / reject (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/user/leave-form/{leave_id}/status",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to decide")
    ),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Leave request decided", body = LeaveRequest),
        (status = 400, description = "Status is not Approved or Rejected"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already processed", body = Object, example = json!({
            "message": "leave request '42' is already Approved, cannot mark it Rejected"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn decide_leave(
    auth: AuthUser,
    store: web::Data<LeaveStore>,
    path: web::Path<String>,
    body: web::Json<StatusUpdate>,
) -> HrResult<HttpResponse> {
    auth.require_admin()?;

    let decision = body
        .status
        .trim()
        .parse::<Decision>()
        .map_err(|_| HrError::validation("status", "Status must be Approved or Rejected"))?;

    let leave = store.decide(&path.into_inner(), decision, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/// Pending/approved/rejected counts
#[utoipa::path(
    get,
    path = "/api/admin/leave-summary",
    responses(
        (status = 200, description = "Leave counts by status", body = LeaveCounts),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_summary(auth: AuthUser, store: web::Data<LeaveStore>) -> HrResult<HttpResponse> {
    auth.require_admin()?;
    Ok(HttpResponse::Ok().json(store.counts().await?))
}
