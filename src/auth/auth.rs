use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

use crate::error::{HrError, HrResult};
use crate::model::role::Role;

/// Caller identity, placed in request extensions by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<String>,
}

impl FromRequest for AuthUser {
    type Error = HrError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| HrError::Unauthorized("Missing token".into())),
        )
    }
}

impl AuthUser {
    /// Admin views are open to Admin and HR.
    pub fn require_admin(&self) -> HrResult<()> {
        if self.role.can_administer() {
            Ok(())
        } else {
            Err(HrError::Forbidden("HR/Admin only".into()))
        }
    }

    /// Identifier that owns this caller's leave and attendance records.
    pub fn subject_id(&self) -> String {
        self.employee_id
            .clone()
            .unwrap_or_else(|| self.user_id.to_string())
    }
}
