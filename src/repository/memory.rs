use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::{self, BoxFuture, FutureExt};

use super::{
    AttendanceRepository, EmployeeRepository, HolidayRepository, LeaveRepository, StatusChange,
};
use crate::error::{HrError, HrResult};
use crate::model::{
    attendance::AttendanceRecord,
    employee::Employee,
    holiday::Holiday,
    leave_request::{LeaveRequest, LeaveStatus},
};

fn read<T>(lock: &RwLock<T>) -> HrResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| HrError::ExternalService("in-memory store poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> HrResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| HrError::ExternalService("in-memory store poisoned".into()))
}

/// Runs synchronously under the lock, the caller gets a ready future.
fn done<'a, T: Send + 'a>(result: HrResult<T>) -> BoxFuture<'a, HrResult<T>> {
    future::ready(result).boxed()
}

/* =========================
Leave requests
========================= */
#[derive(Default)]
pub struct MemoryLeaveRepository {
    rows: RwLock<Vec<LeaveRequest>>,
}

impl LeaveRepository for MemoryLeaveRepository {
    fn insert(&self, leave: LeaveRequest) -> BoxFuture<'_, HrResult<LeaveRequest>> {
        done(write(&self.rows).map(|mut rows| {
            rows.push(leave.clone());
            leave
        }))
    }

    fn find<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HrResult<Option<LeaveRequest>>> {
        done(read(&self.rows).map(|rows| rows.iter().find(|l| l.id == id).cloned()))
    }

    fn list(&self) -> BoxFuture<'_, HrResult<Vec<LeaveRequest>>> {
        done(read(&self.rows).map(|rows| rows.clone()))
    }

    fn decide_if_pending<'a>(
        &'a self,
        id: &'a str,
        status: LeaveStatus,
        decided_at: DateTime<Utc>,
    ) -> BoxFuture<'a, HrResult<StatusChange>> {
        // one write guard covers both the pending check and the update
        done(write(&self.rows).map(|mut rows| {
            match rows.iter_mut().find(|l| l.id == id) {
                None => StatusChange::Missing,
                Some(leave) if leave.status != LeaveStatus::Pending => {
                    StatusChange::AlreadyDecided(leave.clone())
                }
                Some(leave) => {
                    leave.status = status;
                    leave.decided_at = Some(decided_at);
                    StatusChange::Applied(leave.clone())
                }
            }
        }))
    }
}

/* =========================
Holidays
========================= */
#[derive(Default)]
pub struct MemoryHolidayRepository {
    rows: RwLock<Vec<Holiday>>,
}

impl HolidayRepository for MemoryHolidayRepository {
    fn insert(&self, holiday: Holiday) -> BoxFuture<'_, HrResult<Holiday>> {
        done(write(&self.rows).map(|mut rows| {
            rows.push(holiday.clone());
            holiday
        }))
    }

    fn find<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HrResult<Option<Holiday>>> {
        done(read(&self.rows).map(|rows| rows.iter().find(|h| h.id == id).cloned()))
    }

    fn list(&self) -> BoxFuture<'_, HrResult<Vec<Holiday>>> {
        done(read(&self.rows).map(|rows| rows.clone()))
    }

    fn replace(&self, holiday: Holiday) -> BoxFuture<'_, HrResult<bool>> {
        done(write(&self.rows).map(|mut rows| {
            match rows.iter_mut().find(|h| h.id == holiday.id) {
                Some(slot) => {
                    *slot = holiday;
                    true
                }
                None => false,
            }
        }))
    }

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HrResult<bool>> {
        done(write(&self.rows).map(|mut rows| {
            let before = rows.len();
            rows.retain(|h| h.id != id);
            rows.len() != before
        }))
    }
}

/* =========================
Attendance
========================= */
#[derive(Default)]
pub struct MemoryAttendanceRepository {
    // (subject, date) keeps one subject's days ordered
    rows: RwLock<BTreeMap<(String, NaiveDate), AttendanceRecord>>,
}

impl AttendanceRepository for MemoryAttendanceRepository {
    fn upsert(&self, record: AttendanceRecord) -> BoxFuture<'_, HrResult<AttendanceRecord>> {
        done(write(&self.rows).map(|mut rows| {
            let key = (record.subject_id.clone(), record.date);
            let stored = match rows.get(&key) {
                Some(existing) => AttendanceRecord {
                    id: existing.id.clone(),
                    ..record
                },
                None => record,
            };
            rows.insert(key, stored.clone());
            stored
        }))
    }

    fn find<'a>(
        &'a self,
        subject_id: &'a str,
        date: NaiveDate,
    ) -> BoxFuture<'a, HrResult<Option<AttendanceRecord>>> {
        done(read(&self.rows).map(|rows| rows.get(&(subject_id.to_string(), date)).cloned()))
    }

    fn list_for_subject<'a>(
        &'a self,
        subject_id: &'a str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BoxFuture<'a, HrResult<Vec<AttendanceRecord>>> {
        done(read(&self.rows).map(|rows| {
            rows.range((subject_id.to_string(), start)..=(subject_id.to_string(), end))
                .map(|(_, r)| r.clone())
                .collect()
        }))
    }

    fn list_on(&self, date: NaiveDate) -> BoxFuture<'_, HrResult<Vec<AttendanceRecord>>> {
        done(read(&self.rows).map(|rows| {
            rows.values().filter(|r| r.date == date).cloned().collect()
        }))
    }
}

/* =========================
Employees
========================= */
#[derive(Default)]
pub struct MemoryEmployeeRepository {
    rows: RwLock<Vec<Employee>>,
}

impl EmployeeRepository for MemoryEmployeeRepository {
    fn insert(&self, employee: Employee) -> BoxFuture<'_, HrResult<Employee>> {
        done(write(&self.rows).and_then(|mut rows| {
            if rows.iter().any(|e| e.email.eq_ignore_ascii_case(&employee.email)) {
                return Err(HrError::validation("email", "Email already registered"));
            }
            rows.push(employee.clone());
            Ok(employee)
        }))
    }

    fn find<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HrResult<Option<Employee>>> {
        done(read(&self.rows).map(|rows| rows.iter().find(|e| e.id == id).cloned()))
    }

    fn list(&self) -> BoxFuture<'_, HrResult<Vec<Employee>>> {
        done(read(&self.rows).map(|rows| rows.clone()))
    }

    fn replace(&self, employee: Employee) -> BoxFuture<'_, HrResult<bool>> {
        done(write(&self.rows).and_then(|mut rows| {
            if rows
                .iter()
                .any(|e| e.id != employee.id && e.email.eq_ignore_ascii_case(&employee.email))
            {
                return Err(HrError::validation("email", "Email already registered"));
            }
            Ok(match rows.iter_mut().find(|e| e.id == employee.id) {
                Some(slot) => {
                    *slot = employee;
                    true
                }
                None => false,
            })
        }))
    }

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HrResult<bool>> {
        done(write(&self.rows).map(|mut rows| {
            let before = rows.len();
            rows.retain(|e| e.id != id);
            rows.len() != before
        }))
    }
}
