//! Persistence seams for the stores.
//!
//! Each store owns exactly one repository. `memory` backs tests and the
//! default development mode, `mysql` backs production deployments.

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::BoxFuture;

use crate::error::HrResult;
use crate::model::{
    attendance::AttendanceRecord, employee::Employee, holiday::Holiday,
    leave_request::{LeaveRequest, LeaveStatus},
};

pub mod memory;
pub mod mysql;

/// Result of a compare-and-set on a leave request's status.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusChange {
    /// The request was pending and now carries the new status
    Applied(LeaveRequest),
    /// The request had already been decided; it is returned untouched
    AlreadyDecided(LeaveRequest),
    Missing,
}

pub trait LeaveRepository: Send + Sync {
    fn insert(&self, leave: LeaveRequest) -> BoxFuture<'_, HrResult<LeaveRequest>>;

    fn find<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HrResult<Option<LeaveRequest>>>;

    /// All requests in insertion order
    fn list(&self) -> BoxFuture<'_, HrResult<Vec<LeaveRequest>>>;

    /// Sets `status` only while the stored request is still pending.
    /// Check and write must be atomic with respect to other callers.
    fn decide_if_pending<'a>(
        &'a self,
        id: &'a str,
        status: LeaveStatus,
        decided_at: DateTime<Utc>,
    ) -> BoxFuture<'a, HrResult<StatusChange>>;
}

pub trait HolidayRepository: Send + Sync {
    fn insert(&self, holiday: Holiday) -> BoxFuture<'_, HrResult<Holiday>>;

    fn find<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HrResult<Option<Holiday>>>;

    fn list(&self) -> BoxFuture<'_, HrResult<Vec<Holiday>>>;

    /// Replaces a stored holiday; `false` when the id is unknown
    fn replace(&self, holiday: Holiday) -> BoxFuture<'_, HrResult<bool>>;

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HrResult<bool>>;
}

pub trait AttendanceRepository: Send + Sync {
    /// Inserts, or overwrites the record already held for the same
    /// (subject, date) while keeping its id.
    fn upsert(&self, record: AttendanceRecord) -> BoxFuture<'_, HrResult<AttendanceRecord>>;

    fn find<'a>(
        &'a self,
        subject_id: &'a str,
        date: NaiveDate,
    ) -> BoxFuture<'a, HrResult<Option<AttendanceRecord>>>;

    /// Records of one subject with `start <= date <= end`, ascending by date
    fn list_for_subject<'a>(
        &'a self,
        subject_id: &'a str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BoxFuture<'a, HrResult<Vec<AttendanceRecord>>>;

    fn list_on(&self, date: NaiveDate) -> BoxFuture<'_, HrResult<Vec<AttendanceRecord>>>;
}

pub trait EmployeeRepository: Send + Sync {
    fn insert(&self, employee: Employee) -> BoxFuture<'_, HrResult<Employee>>;

    fn find<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HrResult<Option<Employee>>>;

    fn list(&self) -> BoxFuture<'_, HrResult<Vec<Employee>>>;

    fn replace(&self, employee: Employee) -> BoxFuture<'_, HrResult<bool>>;

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HrResult<bool>>;
}
