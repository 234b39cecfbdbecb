use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use futures::future::BoxFuture;
use sqlx::{FromRow, MySqlPool};
use tracing::error;

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

/// Enum columns are stored as their variant names.
fn column<T: FromStr>(table: &str, value: &str) -> HrResult<T> {
    value.parse::<T>().map_err(|_| {
        error!(table, value, "Unexpected enum value in database row");
        HrError::ExternalService(format!("corrupt {table} row"))
    })
}

fn is_duplicate_key(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000"))
}

/* =========================
Leave requests
========================= */
#[derive(FromRow)]
struct LeaveRow {
    id: String,
    requester_id: String,
    category: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: String,
    document: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = HrError;

    fn try_from(row: LeaveRow) -> HrResult<Self> {
        Ok(LeaveRequest {
            category: column("leave_requests", &row.category)?,
            status: column("leave_requests", &row.status)?,
            id: row.id,
            requester_id: row.requester_id,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            document: row.document,
            created_at: row.created_at,
            decided_at: row.decided_at,
        })
    }
}

const LEAVE_COLUMNS: &str = "id, requester_id, category, start_date, end_date, reason, document, \
                             status, created_at, decided_at";

pub struct MySqlLeaveRepository {
    pool: MySqlPool,
}

impl MySqlLeaveRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: &str) -> HrResult<Option<LeaveRequest>> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?");
        sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, leave_id = id, "Failed to fetch leave request");
                HrError::from(e)
            })?
            .map(LeaveRequest::try_from)
            .transpose()
    }
}

impl LeaveRepository for MySqlLeaveRepository {
    fn insert(&self, leave: LeaveRequest) -> BoxFuture<'_, HrResult<LeaveRequest>> {
        Box::pin(async move {
            sqlx::query(
                r#"
                INSERT INTO leave_requests
                    (id, requester_id, category, start_date, end_date, reason, document, status, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&leave.id)
            .bind(&leave.requester_id)
            .bind(leave.category.as_ref())
            .bind(leave.start_date)
            .bind(leave.end_date)
            .bind(&leave.reason)
            .bind(&leave.document)
            .bind(leave.status.as_ref())
            .bind(leave.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, requester_id = %leave.requester_id, "Failed to create leave request");
                HrError::from(e)
            })?;
            Ok(leave)
        })
    }

    fn find<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HrResult<Option<LeaveRequest>>> {
        Box::pin(self.fetch(id))
    }

    fn list(&self) -> BoxFuture<'_, HrResult<Vec<LeaveRequest>>> {
        Box::pin(async move {
            let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests ORDER BY seq ASC");
            sqlx::query_as::<_, LeaveRow>(&sql)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    error!(error = %e, "Failed to fetch leave list");
                    HrError::from(e)
                })?
                .into_iter()
                .map(LeaveRequest::try_from)
                .collect()
        })
    }

    fn decide_if_pending<'a>(
        &'a self,
        id: &'a str,
        status: LeaveStatus,
        decided_at: DateTime<Utc>,
    ) -> BoxFuture<'a, HrResult<StatusChange>> {
        Box::pin(async move {
            // the WHERE clause makes check and write a single statement
            let result = sqlx::query(
                r#"
                UPDATE leave_requests
                SET status = ?, decided_at = ?
                WHERE id = ?
                AND status = 'Pending'
                "#,
            )
            .bind(status.as_ref())
            .bind(decided_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, leave_id = id, "Leave decision failed");
                HrError::from(e)
            })?;

            let current = self.fetch(id).await?;
            Ok(match (result.rows_affected(), current) {
                (_, None) => StatusChange::Missing,
                (0, Some(leave)) => StatusChange::AlreadyDecided(leave),
                (_, Some(leave)) => StatusChange::Applied(leave),
            })
        })
    }
}

/* =========================
Holidays
========================= */
#[derive(FromRow)]
struct HolidayRow {
    id: String,
    name: String,
    kind: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    is_date_range: bool,
}

impl TryFrom<HolidayRow> for Holiday {
    type Error = HrError;

    fn try_from(row: HolidayRow) -> HrResult<Self> {
        Ok(Holiday {
            kind: column("holidays", &row.kind)?,
            id: row.id,
            name: row.name,
            start_date: row.start_date,
            end_date: row.end_date,
            is_date_range: row.is_date_range,
        })
    }
}

const HOLIDAY_COLUMNS: &str = "id, name, kind, start_date, end_date, is_date_range";

pub struct MySqlHolidayRepository {
    pool: MySqlPool,
}

impl MySqlHolidayRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl HolidayRepository for MySqlHolidayRepository {
    fn insert(&self, holiday: Holiday) -> BoxFuture<'_, HrResult<Holiday>> {
        Box::pin(async move {
            sqlx::query(
                r#"
                INSERT INTO holidays (id, name, kind, start_date, end_date, is_date_range)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&holiday.id)
            .bind(&holiday.name)
            .bind(holiday.kind.as_ref())
            .bind(holiday.start_date)
            .bind(holiday.end_date)
            .bind(holiday.is_date_range)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, name = %holiday.name, "Failed to create holiday");
                HrError::from(e)
            })?;
            Ok(holiday)
        })
    }

    fn find<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HrResult<Option<Holiday>>> {
        Box::pin(async move {
            let sql = format!("SELECT {HOLIDAY_COLUMNS} FROM holidays WHERE id = ?");
            sqlx::query_as::<_, HolidayRow>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .map(Holiday::try_from)
                .transpose()
        })
    }

    fn list(&self) -> BoxFuture<'_, HrResult<Vec<Holiday>>> {
        Box::pin(async move {
            let sql = format!("SELECT {HOLIDAY_COLUMNS} FROM holidays ORDER BY seq ASC");
            sqlx::query_as::<_, HolidayRow>(&sql)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    error!(error = %e, "Failed to fetch holidays");
                    HrError::from(e)
                })?
                .into_iter()
                .map(Holiday::try_from)
                .collect()
        })
    }

    fn replace(&self, holiday: Holiday) -> BoxFuture<'_, HrResult<bool>> {
        Box::pin(async move {
            let result = sqlx::query(
                r#"
                UPDATE holidays
                SET name = ?, kind = ?, start_date = ?, end_date = ?, is_date_range = ?
                WHERE id = ?
                "#,
            )
            .bind(&holiday.name)
            .bind(holiday.kind.as_ref())
            .bind(holiday.start_date)
            .bind(holiday.end_date)
            .bind(holiday.is_date_range)
            .bind(&holiday.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, holiday_id = %holiday.id, "Failed to update holiday");
                HrError::from(e)
            })?;

            // sqlx connects with CLIENT_FOUND_ROWS: matched rows, not changed rows
            Ok(result.rows_affected() > 0)
        })
    }

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HrResult<bool>> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM holidays WHERE id = ?")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    error!(error = %e, holiday_id = id, "Failed to delete holiday");
                    HrError::from(e)
                })?;
            Ok(result.rows_affected() > 0)
        })
    }
}

/* =========================
Attendance
========================= */
#[derive(FromRow)]
struct AttendanceRow {
    id: String,
    subject_id: String,
    date: NaiveDate,
    status: String,
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = HrError;

    fn try_from(row: AttendanceRow) -> HrResult<Self> {
        Ok(AttendanceRecord {
            status: column("attendance", &row.status)?,
            id: row.id,
            subject_id: row.subject_id,
            date: row.date,
            check_in: row.check_in,
            check_out: row.check_out,
        })
    }
}

const ATTENDANCE_COLUMNS: &str = "id, subject_id, date, status, check_in, check_out";

pub struct MySqlAttendanceRepository {
    pool: MySqlPool,
}

impl MySqlAttendanceRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, subject_id: &str, date: NaiveDate) -> HrResult<Option<AttendanceRecord>> {
        let sql =
            format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE subject_id = ? AND date = ?");
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(subject_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?
            .map(AttendanceRecord::try_from)
            .transpose()
    }

    async fn fetch_all(&self, sql: &str, binds: (&str, NaiveDate, NaiveDate)) -> HrResult<Vec<AttendanceRecord>> {
        sqlx::query_as::<_, AttendanceRow>(sql)
            .bind(binds.0)
            .bind(binds.1)
            .bind(binds.2)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, subject_id = binds.0, "Failed to fetch attendance");
                HrError::from(e)
            })?
            .into_iter()
            .map(AttendanceRecord::try_from)
            .collect()
    }
}

impl AttendanceRepository for MySqlAttendanceRepository {
    fn upsert(&self, record: AttendanceRecord) -> BoxFuture<'_, HrResult<AttendanceRecord>> {
        Box::pin(async move {
            // unique key (subject_id, date); the original id survives the update
            sqlx::query(
                r#"
                INSERT INTO attendance (id, subject_id, date, status, check_in, check_out)
                VALUES (?, ?, ?, ?, ?, ?)
                ON DUPLICATE KEY UPDATE
                    status = VALUES(status),
                    check_in = VALUES(check_in),
                    check_out = VALUES(check_out)
                "#,
            )
            .bind(&record.id)
            .bind(&record.subject_id)
            .bind(record.date)
            .bind(record.status.as_ref())
            .bind(record.check_in)
            .bind(record.check_out)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, subject_id = %record.subject_id, "Attendance mark failed");
                HrError::from(e)
            })?;

            self.fetch(&record.subject_id, record.date)
                .await?
                .ok_or_else(|| HrError::ExternalService("attendance row vanished after upsert".into()))
        })
    }

    fn find<'a>(
        &'a self,
        subject_id: &'a str,
        date: NaiveDate,
    ) -> BoxFuture<'a, HrResult<Option<AttendanceRecord>>> {
        Box::pin(self.fetch(subject_id, date))
    }

    fn list_for_subject<'a>(
        &'a self,
        subject_id: &'a str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BoxFuture<'a, HrResult<Vec<AttendanceRecord>>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
                 WHERE subject_id = ? AND date BETWEEN ? AND ? ORDER BY date ASC"
            );
            self.fetch_all(&sql, (subject_id, start, end)).await
        })
    }

    fn list_on(&self, date: NaiveDate) -> BoxFuture<'_, HrResult<Vec<AttendanceRecord>>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE date = ? ORDER BY subject_id ASC"
            );
            sqlx::query_as::<_, AttendanceRow>(&sql)
                .bind(date)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    error!(error = %e, %date, "Failed to fetch attendance for date");
                    HrError::from(e)
                })?
                .into_iter()
                .map(AttendanceRecord::try_from)
                .collect()
        })
    }
}

/* =========================
Employees
========================= */
#[derive(FromRow)]
struct EmployeeRow {
    id: String,
    name: String,
    email: String,
    position: String,
    department: String,
    join_date: NaiveDate,
    status: String,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = HrError;

    fn try_from(row: EmployeeRow) -> HrResult<Self> {
        Ok(Employee {
            status: column("employees", &row.status)?,
            id: row.id,
            name: row.name,
            email: row.email,
            position: row.position,
            department: row.department,
            join_date: row.join_date,
        })
    }
}

const EMPLOYEE_COLUMNS: &str = "id, name, email, position, department, join_date, status";

pub struct MySqlEmployeeRepository {
    pool: MySqlPool,
}

impl MySqlEmployeeRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl EmployeeRepository for MySqlEmployeeRepository {
    fn insert(&self, employee: Employee) -> BoxFuture<'_, HrResult<Employee>> {
        Box::pin(async move {
            let result = sqlx::query(
                r#"
                INSERT INTO employees (id, name, email, position, department, join_date, status)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&employee.id)
            .bind(&employee.name)
            .bind(&employee.email)
            .bind(&employee.position)
            .bind(&employee.department)
            .bind(employee.join_date)
            .bind(employee.status.as_ref())
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => Ok(employee),
                Err(e) if is_duplicate_key(&e) => {
                    Err(HrError::validation("email", "Email already registered"))
                }
                Err(e) => {
                    error!(error = %e, "Failed to create employee");
                    Err(e.into())
                }
            }
        })
    }

    fn find<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HrResult<Option<Employee>>> {
        Box::pin(async move {
            let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?");
            sqlx::query_as::<_, EmployeeRow>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    error!(error = %e, employee_id = id, "Failed to fetch employee");
                    HrError::from(e)
                })?
                .map(Employee::try_from)
                .transpose()
        })
    }

    fn list(&self) -> BoxFuture<'_, HrResult<Vec<Employee>>> {
        Box::pin(async move {
            let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY seq ASC");
            sqlx::query_as::<_, EmployeeRow>(&sql)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    error!(error = %e, "Failed to fetch employees");
                    HrError::from(e)
                })?
                .into_iter()
                .map(Employee::try_from)
                .collect()
        })
    }

    fn replace(&self, employee: Employee) -> BoxFuture<'_, HrResult<bool>> {
        Box::pin(async move {
            let result = sqlx::query(
                r#"
                UPDATE employees
                SET name = ?, email = ?, position = ?, department = ?, join_date = ?, status = ?
                WHERE id = ?
                "#,
            )
            .bind(&employee.name)
            .bind(&employee.email)
            .bind(&employee.position)
            .bind(&employee.department)
            .bind(employee.join_date)
            .bind(employee.status.as_ref())
            .bind(&employee.id)
            .execute(&self.pool)
            .await;

            let affected = match result {
                Ok(res) => res.rows_affected(),
                Err(e) if is_duplicate_key(&e) => {
                    return Err(HrError::validation("email", "Email already registered"));
                }
                Err(e) => {
                    error!(error = %e, employee_id = %employee.id, "Failed to update employee");
                    return Err(e.into());
                }
            };
            Ok(affected > 0)
        })
    }

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HrResult<bool>> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM employees WHERE id = ?")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    error!(error = %e, employee_id = id, "Failed to delete employee");
                    HrError::from(e)
                })?;
            Ok(result.rows_affected() > 0)
        })
    }
}
