use actix_web::{HttpResponse, web};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::HrResult;
use crate::model::employee::{Employee, EmployeeInput, EmployeePatch};
use crate::store::employee::{EmployeePage, EmployeeQuery, EmployeeStore};

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: EmployeePage,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeProfile {
    pub data: Employee,
}

/// Employee directory
#[utoipa::path(
    get,
    path = "/api/user/get-users",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    _auth: AuthUser,
    store: web::Data<EmployeeStore>,
    query: web::Query<EmployeeQuery>,
) -> HrResult<HttpResponse> {
    let page = store.list(&query).await?;
    Ok(HttpResponse::Ok().json(EmployeeListResponse { data: page }))
}

/// Caller's own directory entry
#[utoipa::path(
    get,
    path = "/api/user/get-user",
    responses(
        (status = 200, description = "Own employee profile", body = EmployeeProfile),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No directory entry for the caller", body = Object, example = json!({
            "message": "employee '42' not found"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn my_profile(auth: AuthUser, store: web::Data<EmployeeStore>) -> HrResult<HttpResponse> {
    let data = store.get(&auth.subject_id()).await?;
    Ok(HttpResponse::Ok().json(EmployeeProfile { data }))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/admin/employee",
    request_body = EmployeeInput,
    responses(
        (status = 201, description = "Employee created successfully", body = Employee),
        (status = 400, description = "Invalid field", body = Object, example = json!({
            "message": "Invalid email address",
            "field": "email"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    store: web::Data<EmployeeStore>,
    payload: web::Json<EmployeeInput>,
) -> HrResult<HttpResponse> {
    auth.require_admin()?;
    let employee = store.add(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(employee))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/admin/employee/{employee_id}",
    params(
        ("employee_id" = String, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee '7' not found"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    store: web::Data<EmployeeStore>,
    path: web::Path<String>,
) -> HrResult<HttpResponse> {
    auth.require_admin()?;
    Ok(HttpResponse::Ok().json(store.get(&path.into_inner()).await?))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/admin/employee/{employee_id}",
    params(
        ("employee_id" = String, Path, description = "Employee ID")
    ),
    request_body = EmployeePatch,
    responses(
        (status = 200, description = "Employee updated successfully", body = Employee),
        (status = 400, description = "Invalid field"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    store: web::Data<EmployeeStore>,
    path: web::Path<String>,
    payload: web::Json<EmployeePatch>,
) -> HrResult<HttpResponse> {
    auth.require_admin()?;
    let employee = store.update(&path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/admin/employee/{employee_id}",
    params(
        ("employee_id" = String, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    store: web::Data<EmployeeStore>,
    path: web::Path<String>,
) -> HrResult<HttpResponse> {
    auth.require_admin()?;
    store.remove(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
