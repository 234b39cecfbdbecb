use actix_web::{HttpResponse, web};
use chrono::Local;

use crate::auth::auth::AuthUser;
use crate::error::HrResult;
use crate::store::Stores;
use crate::store::dashboard::{DashboardSummary, summarize};

/// Admin landing page numbers
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn dashboard(auth: AuthUser, stores: web::Data<Stores>) -> HrResult<HttpResponse> {
    auth.require_admin()?;
    let summary = summarize(&stores, Local::now().date_naive()).await?;
    Ok(HttpResponse::Ok().json(summary))
}
