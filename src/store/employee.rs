use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::SortOrder;
use crate::error::{HrError, HrResult};
use crate::model::employee::{Employee, EmployeeInput, EmployeePatch, EmployeeStatus};
use crate::repository::EmployeeRepository;
use crate::utils::date_range::parse_date;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum EmployeeSort {
    #[default]
    Name,
    Position,
    Department,
    JoinDate,
    Status,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeQuery {
    /// Case-insensitive match on name, email, position or department
    pub search: Option<String>,
    pub department: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<EmployeeSort>,
    pub order: Option<SortOrder>,
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePage {
    pub users: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: usize,
}

#[derive(Clone)]
pub struct EmployeeStore {
    repo: Arc<dyn EmployeeRepository>,
}

impl EmployeeStore {
    pub fn new(repo: Arc<dyn EmployeeRepository>) -> Self {
        Self { repo }
    }

    pub async fn add(&self, input: EmployeeInput) -> HrResult<Employee> {
        let employee = build(Uuid::new_v4().to_string(), &input)?;
        let employee = self.repo.insert(employee).await?;
        info!(employee_id = %employee.id, "Employee added");
        Ok(employee)
    }

    pub async fn update(&self, id: &str, patch: EmployeePatch) -> HrResult<Employee> {
        let current = self.get(id).await?;
        let merged = EmployeeInput {
            name: patch.name.unwrap_or(current.name),
            email: patch.email.unwrap_or(current.email),
            position: patch.position.unwrap_or(current.position),
            department: patch.department.unwrap_or(current.department),
            join_date: patch
                .join_date
                .unwrap_or_else(|| current.join_date.to_string()),
            status: Some(patch.status.unwrap_or_else(|| current.status.to_string())),
        };
        let employee = build(current.id, &merged)?;

        if !self.repo.replace(employee.clone()).await? {
            return Err(HrError::not_found("employee", id));
        }
        info!(employee_id = %employee.id, "Employee updated");
        Ok(employee)
    }

    pub async fn remove(&self, id: &str) -> HrResult<()> {
        if !self.repo.delete(id).await? {
            return Err(HrError::not_found("employee", id));
        }
        info!(employee_id = id, "Employee removed");
        Ok(())
    }

    pub async fn get(&self, id: &str) -> HrResult<Employee> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| HrError::not_found("employee", id))
    }

    /// Ids of every directory entry.
    pub async fn ids(&self) -> HrResult<HashSet<String>> {
        Ok(self.repo.list().await?.into_iter().map(|e| e.id).collect())
    }

    pub async fn list(&self, query: &EmployeeQuery) -> HrResult<EmployeePage> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

        let status = match query.status.as_deref() {
            Some(s) => Some(
                s.parse::<EmployeeStatus>()
                    .map_err(|_| HrError::validation("status", "Status must be Active or Inactive"))?,
            ),
            None => None,
        };
        let needle = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut rows: Vec<Employee> = self
            .repo
            .list()
            .await?
            .into_iter()
            .filter(|e| status.is_none_or(|s| e.status == s))
            .filter(|e| {
                query
                    .department
                    .as_deref()
                    .is_none_or(|d| e.department.eq_ignore_ascii_case(d))
            })
            .filter(|e| needle.as_deref().is_none_or(|n| matches_search(e, n)))
            .collect();

        let order = query.order.unwrap_or_default();
        let sort_by = query.sort_by.unwrap_or_default();
        rows.sort_by(|a, b| {
            let ordering = match sort_by {
                EmployeeSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                EmployeeSort::Position => a.position.cmp(&b.position),
                EmployeeSort::Department => a.department.cmp(&b.department),
                EmployeeSort::JoinDate => a.join_date.cmp(&b.join_date),
                EmployeeSort::Status => a.status.as_ref().cmp(b.status.as_ref()),
            };
            order.apply(ordering)
        });

        let total = rows.len();
        let offset = ((page - 1) * per_page) as usize;
        let users = rows.into_iter().skip(offset).take(per_page as usize).collect();

        Ok(EmployeePage {
            users,
            page,
            per_page,
            total,
        })
    }
}

fn matches_search(employee: &Employee, needle: &str) -> bool {
    [
        &employee.name,
        &employee.email,
        &employee.position,
        &employee.department,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

fn required(field: &'static str, value: &str, label: &str) -> HrResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(HrError::validation(field, format!("{label} is required")));
    }
    Ok(value.to_string())
}

fn build(id: String, input: &EmployeeInput) -> HrResult<Employee> {
    let name = required("name", &input.name, "Name")?;

    let email = required("email", &input.email, "Email")?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => return Err(HrError::validation("email", "Invalid email address")),
    }

    let position = required("position", &input.position, "Position")?;
    let department = required("department", &input.department, "Department")?;
    let join_date = parse_date(&input.join_date)
        .ok_or_else(|| HrError::validation("joinDate", "Invalid join date"))?;

    let status = match input.status.as_deref() {
        None => EmployeeStatus::Active,
        Some(s) => s
            .trim()
            .parse()
            .map_err(|_| HrError::validation("status", "Status must be Active or Inactive"))?,
    };

    Ok(Employee {
        id,
        name,
        email,
        position,
        department,
        join_date,
        status,
    })
}
