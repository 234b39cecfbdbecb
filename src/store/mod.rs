//! Domain stores. HTTP handlers call these and nothing else; each store
//! validates input and owns its collection through an injected repository.

use std::cmp::Ordering;
use std::sync::Arc;

use actix_web::web::{self, Data};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::repository::{memory, mysql};

pub mod attendance;
pub mod dashboard;
pub mod employee;
pub mod holiday;
pub mod leave;

use attendance::AttendanceStore;
use employee::EmployeeStore;
use holiday::HolidayStore;
use leave::{LeavePolicy, LeaveStore};

/// Caller-chosen list order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// One handle per store, cloned into every actix worker.
#[derive(Clone)]
pub struct Stores {
    pub leaves: LeaveStore,
    pub holidays: HolidayStore,
    pub attendance: AttendanceStore,
    pub employees: EmployeeStore,
}

impl Stores {
    pub fn in_memory(policy: LeavePolicy) -> Self {
        Self {
            leaves: LeaveStore::new(Arc::new(memory::MemoryLeaveRepository::default()), policy),
            holidays: HolidayStore::new(Arc::new(memory::MemoryHolidayRepository::default())),
            attendance: AttendanceStore::new(Arc::new(
                memory::MemoryAttendanceRepository::default(),
            )),
            employees: EmployeeStore::new(Arc::new(memory::MemoryEmployeeRepository::default())),
        }
    }

    pub fn mysql(pool: MySqlPool, policy: LeavePolicy) -> Self {
        Self {
            leaves: LeaveStore::new(
                Arc::new(mysql::MySqlLeaveRepository::new(pool.clone())),
                policy,
            ),
            holidays: HolidayStore::new(Arc::new(mysql::MySqlHolidayRepository::new(pool.clone()))),
            attendance: AttendanceStore::new(Arc::new(mysql::MySqlAttendanceRepository::new(
                pool.clone(),
            ))),
            employees: EmployeeStore::new(Arc::new(mysql::MySqlEmployeeRepository::new(pool))),
        }
    }

    /// Registers every store, and the bundle itself, as app data.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(Data::new(self.clone()))
            .app_data(Data::new(self.leaves.clone()))
            .app_data(Data::new(self.holidays.clone()))
            .app_data(Data::new(self.attendance.clone()))
            .app_data(Data::new(self.employees.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descending_reverses_the_comparison() {
        assert_eq!(SortOrder::Asc.apply(1.cmp(&2)), Ordering::Less);
        assert_eq!(SortOrder::Desc.apply(1.cmp(&2)), Ordering::Greater);
    }
}
