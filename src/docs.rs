use crate::api::attendance::{AttendanceListResponse, BulkMark, BulkMarkRow, SelfMark};
use crate::api::employee::{EmployeeListResponse, EmployeeProfile};
use crate::api::holiday::{HolidayListResponse, HolidayScope, HolidayView, UserHolidays};
use crate::api::leave_request::{LeaveFilter, LeaveListResponse, StatusUpdate};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, AttendanceSummary};
use crate::model::employee::{Employee, EmployeeInput, EmployeePatch, EmployeeStatus};
use crate::model::holiday::{Holiday, HolidayInput, HolidayKind, HolidayPatch};
use crate::model::leave_request::{LeaveCategory, LeaveRequest, LeaveStatus, LeaveSubmission};
use crate::store::SortOrder;
use crate::store::attendance::BulkOutcome;
use crate::store::dashboard::{AttendanceToday, DashboardSummary, NextHoliday, UpcomingHolidays};
use crate::store::employee::{EmployeePage, EmployeeQuery, EmployeeSort};
use crate::store::leave::{LeaveCounts, LeaveSort};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Portal API",
        version = "1.0.0",
        description = r#"
## Human Resource Management Portal

Backend for the HR admin console and the employee self-service pages.

### Key Features
- **Leave Management**
  - Submit leave requests, approve or reject them once, view history and counts
- **Holiday Calendar**
  - Single-day and ranged holidays, upcoming vs past, holidays active on a date
- **Attendance**
  - One record per employee per day, self marking, bulk marking, monthly summaries
- **Employee Directory**
  - Create, update, search, sort and page through employee profiles
- **Dashboard**
  - Headcount, today's attendance, pending leave and the next holiday

### Security
Every endpoint requires a **JWT Bearer** access token.
`/admin/*` routes, and deciding leave, are limited to **Admin** and **HR**.

### Response Format
- camelCase JSON; lists are wrapped as `{ "data": [...] }`
- Errors are `{ "message": ..., "field"?: ... }`
"#,
    ),
    paths(
        crate::api::leave_request::submit_leave,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::all_leaves,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::decide_leave,
        crate::api::leave_request::leave_summary,

        crate::api::holiday::user_holidays,
        crate::api::holiday::list_holidays,
        crate::api::holiday::active_holidays,
        crate::api::holiday::add_holiday,
        crate::api::holiday::update_holiday,
        crate::api::holiday::delete_holiday,

        crate::api::attendance::mark_own,
        crate::api::attendance::my_attendance,
        crate::api::attendance::my_summary,
        crate::api::attendance::mark_bulk,
        crate::api::attendance::attendance_on,

        crate::api::employee::list_employees,
        crate::api::employee::my_profile,
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::dashboard::dashboard
    ),
    components(
        schemas(
            LeaveCategory,
            LeaveStatus,
            LeaveRequest,
            LeaveSubmission,
            LeaveFilter,
            LeaveSort,
            LeaveListResponse,
            LeaveCounts,
            StatusUpdate,
            HolidayKind,
            Holiday,
            HolidayInput,
            HolidayPatch,
            HolidayScope,
            HolidayView,
            HolidayListResponse,
            UserHolidays,
            SortOrder,
            AttendanceStatus,
            AttendanceRecord,
            AttendanceSummary,
            AttendanceListResponse,
            SelfMark,
            BulkMark,
            BulkMarkRow,
            BulkOutcome,
            EmployeeStatus,
            Employee,
            EmployeeInput,
            EmployeePatch,
            EmployeeSort,
            EmployeeQuery,
            EmployeePage,
            EmployeeListResponse,
            EmployeeProfile,
            AttendanceToday,
            NextHoliday,
            UpcomingHolidays,
            DashboardSummary
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave request APIs"),
        (name = "Holiday", description = "Holiday calendar APIs"),
        (name = "Attendance", description = "Attendance APIs"),
        (name = "Employee", description = "Employee directory APIs"),
        (name = "Dashboard", description = "Admin dashboard APIs"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme the paths refer to.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
