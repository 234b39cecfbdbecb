use std::sync::Arc;

use chrono::NaiveDate;
use strum::IntoEnumIterator;
use tracing::info;
use uuid::Uuid;

use super::SortOrder;
use crate::error::{HrError, HrResult};
use crate::model::holiday::{Holiday, HolidayInput, HolidayKind, HolidayPatch};
use crate::repository::HolidayRepository;
use crate::utils::date_range::{DateSpan, Timing, classify, is_range, parse_date};

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 50;

#[derive(Clone)]
pub struct HolidayStore {
    repo: Arc<dyn HolidayRepository>,
}

impl HolidayStore {
    pub fn new(repo: Arc<dyn HolidayRepository>) -> Self {
        Self { repo }
    }

    pub async fn add(&self, input: HolidayInput) -> HrResult<Holiday> {
        let holiday = build(Uuid::new_v4().to_string(), &input)?;
        let holiday = self.repo.insert(holiday).await?;
        info!(holiday_id = %holiday.id, name = %holiday.name, "Holiday added");
        Ok(holiday)
    }

    /// Merges the patch over the stored holiday, then validates as `add` does.
    pub async fn update(&self, id: &str, patch: HolidayPatch) -> HrResult<Holiday> {
        let current = self.get(id).await?;

        let merged = HolidayInput {
            name: patch.name.unwrap_or_else(|| current.name.clone()),
            start_date: patch
                .start_date
                .unwrap_or_else(|| current.start_date.to_string()),
            end_date: patch
                .end_date
                .or_else(|| current.end_date.map(|d| d.to_string())),
            is_date_range: patch.is_date_range.unwrap_or_else(|| {
                let span = current.span();
                is_range(span.start, span.end)
            }),
            kind: patch.kind.unwrap_or_else(|| current.kind.to_string()),
        };
        let holiday = build(current.id, &merged)?;

        if !self.repo.replace(holiday.clone()).await? {
            return Err(HrError::not_found("holiday", id));
        }
        info!(holiday_id = %holiday.id, "Holiday updated");
        Ok(holiday)
    }

    pub async fn remove(&self, id: &str) -> HrResult<()> {
        if !self.repo.delete(id).await? {
            return Err(HrError::not_found("holiday", id));
        }
        info!(holiday_id = id, "Holiday removed");
        Ok(())
    }

    pub async fn get(&self, id: &str) -> HrResult<Holiday> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| HrError::not_found("holiday", id))
    }

    pub async fn list(&self, order: SortOrder) -> HrResult<Vec<Holiday>> {
        let mut all = self.repo.list().await?;
        sort_by_start(&mut all, order);
        Ok(all)
    }

    pub async fn list_upcoming(&self, today: NaiveDate, order: SortOrder) -> HrResult<Vec<Holiday>> {
        self.list_timing(today, Timing::Upcoming, order).await
    }

    pub async fn list_past(&self, today: NaiveDate, order: SortOrder) -> HrResult<Vec<Holiday>> {
        self.list_timing(today, Timing::Past, order).await
    }

    async fn list_timing(
        &self,
        today: NaiveDate,
        timing: Timing,
        order: SortOrder,
    ) -> HrResult<Vec<Holiday>> {
        let mut all = self.repo.list().await?;
        all.retain(|h| classify(h.span(), today) == timing);
        sort_by_start(&mut all, order);
        Ok(all)
    }

    /// Holidays whose closed interval contains `date`, ascending by start.
    pub async fn active_on(&self, date: NaiveDate) -> HrResult<Vec<Holiday>> {
        let mut all = self.repo.list().await?;
        all.retain(|h| h.span().contains(date));
        sort_by_start(&mut all, SortOrder::Asc);
        Ok(all)
    }

    pub async fn next_upcoming(&self, today: NaiveDate) -> HrResult<Option<Holiday>> {
        Ok(self
            .list_upcoming(today, SortOrder::Asc)
            .await?
            .into_iter()
            .next())
    }
}

fn sort_by_start(holidays: &mut [Holiday], order: SortOrder) {
    holidays.sort_by(|a, b| order.apply(a.start_date.cmp(&b.start_date)));
}

/// Checks name, start date, end date (ranged only) and type, in that order.
fn build(id: String, input: &HolidayInput) -> HrResult<Holiday> {
    let name = input.name.trim();
    let chars = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars) {
        return Err(HrError::validation(
            "name",
            format!("Name must be {NAME_MIN_CHARS}-{NAME_MAX_CHARS} characters"),
        ));
    }

    let start = parse_date(&input.start_date)
        .ok_or_else(|| HrError::validation("startDate", "Invalid start date"))?;

    let end_date = if input.is_date_range {
        let end = input
            .end_date
            .as_deref()
            .and_then(parse_date)
            .ok_or_else(|| HrError::validation("endDate", "Invalid or earlier end date"))?;
        DateSpan::new(start, end)
            .ok_or_else(|| HrError::validation("endDate", "Invalid or earlier end date"))?;
        Some(end)
    } else {
        None
    };

    let kind = input.kind.trim().parse::<HolidayKind>().map_err(|_| {
        let allowed: Vec<String> = HolidayKind::iter().map(|k| k.to_string()).collect();
        HrError::validation(
            "type",
            format!("Invalid holiday type. Allowed: {}", allowed.join(", ")),
        )
    })?;

    Ok(Holiday {
        id,
        name: name.to_string(),
        kind,
        start_date: start,
        end_date,
        is_date_range: input.is_date_range,
    })
}
