use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{HrError, HrResult};
use crate::model::attendance::{
    AttendanceMark, AttendanceRecord, AttendanceStatus, AttendanceSummary,
};
use crate::repository::AttendanceRepository;
use crate::utils::date_range::DateSpan;

/// One row of an admin bulk marking.
#[derive(Debug, Clone)]
pub struct BulkEntry {
    pub subject_id: String,
    pub status: AttendanceStatus,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub records: Vec<AttendanceRecord>,
    pub summary: AttendanceSummary,
}

#[derive(Clone)]
pub struct AttendanceStore {
    repo: Arc<dyn AttendanceRepository>,
}

impl AttendanceStore {
    pub fn new(repo: Arc<dyn AttendanceRepository>) -> Self {
        Self { repo }
    }

    /// Upsert keyed by (subject, date). Absent marks drop both clock times.
    pub async fn mark(&self, mark: AttendanceMark) -> HrResult<AttendanceRecord> {
        if mark.subject_id.trim().is_empty() {
            return Err(HrError::validation("subjectId", "Subject is required"));
        }

        let (check_in, check_out) = if mark.status.has_times() {
            (mark.check_in, mark.check_out)
        } else {
            (None, None)
        };
        if let (Some(i), Some(o)) = (check_in, check_out) {
            if o < i {
                return Err(HrError::validation(
                    "checkOut",
                    "Check-out cannot be earlier than check-in",
                ));
            }
        }

        let record = AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            subject_id: mark.subject_id,
            date: mark.date,
            status: mark.status,
            check_in,
            check_out,
        };

        let stored = self.repo.upsert(record).await?;
        info!(
            subject_id = %stored.subject_id,
            date = %stored.date,
            status = %stored.status,
            "Attendance marked"
        );
        Ok(stored)
    }

    /// Marks a whole roster for one day. A subject listed twice keeps its
    /// last entry, at the position of its first. Stops at the first invalid
    /// entry; entries before it stay marked.
    pub async fn mark_many(&self, date: NaiveDate, entries: Vec<BulkEntry>) -> HrResult<BulkOutcome> {
        let mut roster: Vec<BulkEntry> = Vec::with_capacity(entries.len());
        let mut slot: HashMap<String, usize> = HashMap::new();
        for entry in entries {
            match slot.get(&entry.subject_id) {
                Some(&i) => roster[i] = entry,
                None => {
                    slot.insert(entry.subject_id.clone(), roster.len());
                    roster.push(entry);
                }
            }
        }

        let mut summary = AttendanceSummary::default();
        let mut records = Vec::with_capacity(roster.len());
        for entry in roster {
            let record = self
                .mark(AttendanceMark {
                    subject_id: entry.subject_id,
                    date,
                    status: entry.status,
                    check_in: entry.check_in,
                    check_out: entry.check_out,
                })
                .await?;
            summary.record(record.status);
            records.push(record);
        }

        info!(%date, marked = summary.total(), "Bulk attendance marked");
        Ok(BulkOutcome { records, summary })
    }

    pub async fn get_for_date(
        &self,
        subject_id: &str,
        date: NaiveDate,
    ) -> HrResult<Option<AttendanceRecord>> {
        self.repo.find(subject_id, date).await
    }

    pub async fn list_for_range(
        &self,
        subject_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> HrResult<Vec<AttendanceRecord>> {
        let span = DateSpan::new(start, end)
            .ok_or_else(|| HrError::validation("to", "End date cannot be before start date"))?;
        self.repo.list_for_subject(subject_id, span.start, span.end).await
    }

    /// Every subject's record for one day.
    pub async fn list_on(&self, date: NaiveDate) -> HrResult<Vec<AttendanceRecord>> {
        self.repo.list_on(date).await
    }

    pub async fn summary(&self, subject_id: &str, year: i32, month: u32) -> HrResult<AttendanceSummary> {
        let span = month_span(year, month)
            .ok_or_else(|| HrError::validation("month", "Invalid month"))?;

        let mut summary = AttendanceSummary::default();
        for record in self.repo.list_for_subject(subject_id, span.start, span.end).await? {
            summary.record(record.status);
        }
        Ok(summary)
    }
}

/// First and last day of a calendar month.
fn month_span(year: i32, month: u32) -> Option<DateSpan> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    DateSpan::new(first, next.pred_opt()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::MemoryAttendanceRepository;
    use crate::utils::date_range::{parse_date, parse_time};

    fn store() -> AttendanceStore {
        AttendanceStore::new(Arc::new(MemoryAttendanceRepository::default()))
    }

    fn mark(subject: &str, date: &str, status: AttendanceStatus, check_in: Option<&str>) -> AttendanceMark {
        AttendanceMark {
            subject_id: subject.into(),
            date: parse_date(date).unwrap(),
            status,
            check_in: check_in.and_then(parse_time),
            check_out: None,
        }
    }

    #[actix_web::test]
    async fn remarking_a_day_replaces_the_record() {
        let store = store();
        let first = store
            .mark(mark("u1", "2024-05-01", AttendanceStatus::Present, Some("09:00")))
            .await
            .unwrap();
        let second = store
            .mark(mark("u1", "2024-05-01", AttendanceStatus::Absent, None))
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.status, AttendanceStatus::Absent);
        assert_eq!(second.check_in, None);

        let day = parse_date("2024-05-01").unwrap();
        let all = store.list_for_range("u1", day, day).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(store.get_for_date("u1", day).await.unwrap(), Some(second));
    }

    #[actix_web::test]
    async fn absent_ignores_supplied_times() {
        let store = store();
        let record = store
            .mark(AttendanceMark {
                check_out: parse_time("17:00"),
                ..mark("u1", "2024-05-02", AttendanceStatus::Absent, Some("09:00"))
            })
            .await
            .unwrap();
        assert_eq!((record.check_in, record.check_out), (None, None));
    }

    #[actix_web::test]
    async fn check_out_before_check_in_is_rejected() {
        let err = store()
            .mark(AttendanceMark {
                check_out: parse_time("08:00"),
                ..mark("u1", "2024-05-02", AttendanceStatus::Late, Some("09:30"))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::Validation { field: "checkOut", .. }));
    }

    #[actix_web::test]
    async fn range_is_ascending_and_summary_counts_one_month() {
        let store = store();
        for (date, status) in [
            ("2024-05-03", AttendanceStatus::Late),
            ("2024-05-01", AttendanceStatus::Present),
            ("2024-05-02", AttendanceStatus::Absent),
            ("2024-05-31", AttendanceStatus::Present),
            ("2024-06-01", AttendanceStatus::Present),
            ("2024-04-30", AttendanceStatus::Absent),
        ] {
            store.mark(mark("u1", date, status, Some("09:00"))).await.unwrap();
        }
        store
            .mark(mark("u2", "2024-05-01", AttendanceStatus::Late, Some("09:40")))
            .await
            .unwrap();

        let dates: Vec<_> = store
            .list_for_range(
                "u1",
                parse_date("2024-05-01").unwrap(),
                parse_date("2024-05-03").unwrap(),
            )
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.date.to_string())
            .collect();
        assert_eq!(dates, vec!["2024-05-01", "2024-05-02", "2024-05-03"]);

        let summary = store.summary("u1", 2024, 5).await.unwrap();
        assert_eq!(
            summary,
            AttendanceSummary {
                present_count: 2,
                absent_count: 1,
                late_count: 1,
            }
        );
        assert!(matches!(
            store.summary("u1", 2024, 13).await,
            Err(HrError::Validation { .. })
        ));
    }

    #[actix_web::test]
    async fn inverted_range_is_a_validation_error() {
        let err = store()
            .list_for_range(
                "u1",
                parse_date("2024-05-03").unwrap(),
                parse_date("2024-05-01").unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::Validation { .. }));
    }

    #[actix_web::test]
    async fn bulk_marking_counts_statuses() {
        let store = store();
        let day = parse_date("2024-05-01").unwrap();
        let entries = ["u1", "u2", "u3"]
            .iter()
            .zip([
                AttendanceStatus::Present,
                AttendanceStatus::Late,
                AttendanceStatus::Present,
            ])
            .map(|(subject, status)| BulkEntry {
                subject_id: subject.to_string(),
                status,
                check_in: parse_time("09:00"),
                check_out: None,
            })
            .collect();

        let outcome = store.mark_many(day, entries).await.unwrap();
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.summary.present_count, 2);
        assert_eq!(outcome.summary.late_count, 1);
        assert_eq!(store.list_on(day).await.unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn repeated_subject_in_roster_keeps_last_entry() {
        let store = store();
        let day = parse_date("2024-05-01").unwrap();
        let entry = |subject: &str, status| BulkEntry {
            subject_id: subject.to_string(),
            status,
            check_in: parse_time("09:00"),
            check_out: None,
        };

        let outcome = store
            .mark_many(
                day,
                vec![
                    entry("u1", AttendanceStatus::Present),
                    entry("u2", AttendanceStatus::Late),
                    entry("u1", AttendanceStatus::Absent),
                ],
            )
            .await
            .unwrap();

        let marked: Vec<_> = outcome
            .records
            .iter()
            .map(|r| (r.subject_id.as_str(), r.status))
            .collect();
        assert_eq!(
            marked,
            [("u1", AttendanceStatus::Absent), ("u2", AttendanceStatus::Late)]
        );
        assert_eq!(outcome.summary.present_count, 0);
        assert_eq!(outcome.summary.absent_count, 1);
        assert_eq!(outcome.summary.total(), 2);

        let stored = store.list_on(day).await.unwrap();
        assert_eq!(stored.len(), outcome.records.len());
    }

    #[test]
    fn month_span_handles_december_and_leap_years() {
        let dec = month_span(2024, 12).unwrap();
        assert_eq!(dec.end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        let feb = month_span(2024, 2).unwrap();
        assert_eq!(feb.days(), 29);
        assert!(month_span(2024, 0).is_none());
    }
}
