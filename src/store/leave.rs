use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{HrError, HrResult};
use crate::model::leave_request::{
    Decision, LeaveCategory, LeaveRequest, LeaveStatus, LeaveSubmission,
};
use super::SortOrder;
use crate::repository::{LeaveRepository, StatusChange};
use crate::utils::date_range::{DateSpan, parse_date};

pub const REASON_MIN_CHARS: usize = 10;
pub const REASON_MAX_CHARS: usize = 500;

/// Submission rules that differ between deployments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeavePolicy {
    /// Earliest allowed start is `today + min_lead_days`; `None` disables the check
    pub min_lead_days: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaveCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

/// Sort keys accepted by the leave list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum LeaveSort {
    #[default]
    CreatedAt,
    StartDate,
    EndDate,
    Status,
    LeaveType,
}

/// Stable sort, so equal keys keep their current relative order.
pub fn sort_leaves(leaves: &mut [LeaveRequest], sort_by: LeaveSort, order: SortOrder) {
    leaves.sort_by(|a, b| {
        let ordering = match sort_by {
            LeaveSort::CreatedAt => a.created_at.cmp(&b.created_at),
            LeaveSort::StartDate => a.start_date.cmp(&b.start_date),
            LeaveSort::EndDate => a.end_date.cmp(&b.end_date),
            LeaveSort::Status => a.status.as_ref().cmp(b.status.as_ref()),
            LeaveSort::LeaveType => a.category.as_ref().cmp(b.category.as_ref()),
        };
        order.apply(ordering)
    });
}

#[derive(Clone)]
pub struct LeaveStore {
    repo: Arc<dyn LeaveRepository>,
    policy: LeavePolicy,
}

impl LeaveStore {
    pub fn new(repo: Arc<dyn LeaveRepository>, policy: LeavePolicy) -> Self {
        Self { repo, policy }
    }

    /// Creates a pending request, or reports the first invalid field.
    /// `today` is the local calendar date the lead time counts from; `now`
    /// only stamps `created_at`.
    #[instrument(name = "leave_submit", skip(self, submission, now))]
    pub async fn submit(
        &self,
        requester_id: &str,
        submission: LeaveSubmission,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> HrResult<LeaveRequest> {
        let (category, span, reason) = self.validate(&submission, today)?;

        let leave = LeaveRequest {
            id: Uuid::new_v4().to_string(),
            requester_id: requester_id.to_string(),
            category,
            start_date: span.start,
            end_date: span.end,
            reason,
            document: submission
                .document
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            status: LeaveStatus::Pending,
            created_at: now,
            decided_at: None,
        };

        let leave = self.repo.insert(leave).await?;
        info!(leave_id = %leave.id, days = span.days(), "Leave request submitted");
        Ok(leave)
    }

    /// Field checks run in form order: type, start, end, reason.
    fn validate(
        &self,
        submission: &LeaveSubmission,
        today: NaiveDate,
    ) -> HrResult<(LeaveCategory, DateSpan, String)> {
        let category = submission
            .leave_type
            .trim()
            .parse::<LeaveCategory>()
            .map_err(|_| {
                let allowed: Vec<String> = LeaveCategory::iter().map(|c| c.to_string()).collect();
                HrError::validation(
                    "leaveType",
                    format!("Invalid leave type. Allowed: {}", allowed.join(", ")),
                )
            })?;

        let start = parse_date(&submission.from_date)
            .ok_or_else(|| HrError::validation("fromDate", "Invalid start date"))?;

        if let Some(lead) = self.policy.min_lead_days {
            let earliest = today
                .checked_add_signed(Duration::days(i64::from(lead)))
                .unwrap_or(NaiveDate::MAX);
            if start < earliest {
                return Err(HrError::validation(
                    "fromDate",
                    format!("Leave cannot start before {earliest}"),
                ));
            }
        }

        let end = parse_date(&submission.to_date)
            .ok_or_else(|| HrError::validation("toDate", "Invalid end date"))?;
        let span = DateSpan::new(start, end).ok_or_else(|| {
            HrError::validation("toDate", "End date cannot be before start date")
        })?;

        let reason = submission.reason.trim();
        let chars = reason.chars().count();
        if !(REASON_MIN_CHARS..=REASON_MAX_CHARS).contains(&chars) {
            return Err(HrError::validation(
                "reason",
                format!("Reason must be {REASON_MIN_CHARS}-{REASON_MAX_CHARS} characters"),
            ));
        }

        Ok((category, span, reason.to_string()))
    }

    /// Moves a pending request to its terminal state. A decided request
    /// stays as it is and the call fails.
    #[instrument(name = "leave_decide", skip(self))]
    pub async fn decide(
        &self,
        id: &str,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> HrResult<LeaveRequest> {
        let requested = LeaveStatus::from(decision);

        match self.repo.decide_if_pending(id, requested, now).await? {
            StatusChange::Applied(leave) => {
                info!(leave_id = %leave.id, status = %leave.status, "Leave request decided");
                Ok(leave)
            }
            StatusChange::AlreadyDecided(leave) => {
                warn!(leave_id = %leave.id, current = %leave.status, requested = %requested, "Leave request already processed");
                Err(HrError::InvalidTransition {
                    id: leave.id,
                    current: leave.status,
                    requested,
                })
            }
            StatusChange::Missing => Err(HrError::not_found("leave request", id)),
        }
    }

    pub async fn get(&self, id: &str) -> HrResult<LeaveRequest> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| HrError::not_found("leave request", id))
    }

    /// Every request, insertion order.
    pub async fn list_all(&self) -> HrResult<Vec<LeaveRequest>> {
        self.repo.list().await
    }

    pub async fn list_pending(&self) -> HrResult<Vec<LeaveRequest>> {
        let mut all = self.repo.list().await?;
        all.retain(|l| l.status == LeaveStatus::Pending);
        Ok(all)
    }

    /// Decided requests, most recent decision first.
    pub async fn list_history(&self) -> HrResult<Vec<LeaveRequest>> {
        let mut all = self.repo.list().await?;
        all.retain(|l| l.status.is_terminal());
        all.sort_by(|a, b| b.decided_at.cmp(&a.decided_at));
        Ok(all)
    }

    pub async fn list_for_requester(&self, requester_id: &str) -> HrResult<Vec<LeaveRequest>> {
        let mut all = self.repo.list().await?;
        all.retain(|l| l.requester_id == requester_id);
        Ok(all)
    }

    pub async fn counts(&self) -> HrResult<LeaveCounts> {
        let all = self.repo.list().await?;
        let mut counts = LeaveCounts::default();
        for leave in &all {
            match leave.status {
                LeaveStatus::Pending => counts.pending += 1,
                LeaveStatus::Approved => counts.approved += 1,
                LeaveStatus::Rejected => counts.rejected += 1,
            }
        }
        Ok(counts)
    }

    pub async fn count_pending(&self) -> HrResult<usize> {
        Ok(self.counts().await?.pending)
    }

    pub async fn count_approved(&self) -> HrResult<usize> {
        Ok(self.counts().await?.approved)
    }

    pub async fn count_rejected(&self) -> HrResult<usize> {
        Ok(self.counts().await?.rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::MemoryLeaveRepository;
    use chrono::TimeZone;
    use futures::executor::block_on;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 29, 9, 0, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 29).unwrap()
    }

    fn store(lead: Option<u32>) -> LeaveStore {
        LeaveStore::new(
            Arc::new(MemoryLeaveRepository::default()),
            LeavePolicy { min_lead_days: lead },
        )
    }

    fn form(kind: &str, from: &str, to: &str, reason: &str) -> LeaveSubmission {
        LeaveSubmission {
            leave_type: kind.into(),
            from_date: from.into(),
            to_date: to.into(),
            reason: reason.into(),
            document: None,
        }
    }

    fn field_of(err: HrError) -> &'static str {
        match err {
            HrError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn reason_of_nine_chars_is_rejected_ten_is_accepted() {
        let store = store(None);

        let err = store
            .submit("u1", form("Sick", "2024-05-01", "2024-05-02", "123456789"), today(), now())
            .await
            .unwrap_err();
        assert_eq!(field_of(err), "reason");
        assert!(store.list_all().await.unwrap().is_empty());

        let leave = store
            .submit("u1", form("Sick", "2024-05-01", "2024-05-02", "1234567890"), today(), now())
            .await
            .unwrap();
        assert_eq!(leave.status, LeaveStatus::Pending);
        assert_eq!(leave.category, LeaveCategory::Sick);
        assert_eq!(leave.decided_at, None);
    }

    #[actix_web::test]
    async fn reason_over_limit_is_rejected() {
        let store = store(None);
        let long = "x".repeat(REASON_MAX_CHARS + 1);
        let err = store
            .submit("u1", form("Annual", "2024-05-01", "2024-05-01", &long), today(), now())
            .await
            .unwrap_err();
        assert_eq!(field_of(err), "reason");
    }

    #[actix_web::test]
    async fn end_before_start_is_rejected() {
        let store = store(None);
        let err = store
            .submit("u1", form("Annual", "2024-05-03", "2024-05-01", "Family vacation"), today(), now())
            .await
            .unwrap_err();
        assert_eq!(field_of(err), "toDate");
    }

    #[actix_web::test]
    async fn first_failing_field_is_reported() {
        let store = store(None);
        let err = store
            .submit("u1", form("Holiday", "nope", "nope", "short"), today(), now())
            .await
            .unwrap_err();
        assert_eq!(field_of(err), "leaveType");

        let err = store
            .submit("u1", form("unpaid", "nope", "nope", "short"), today(), now())
            .await
            .unwrap_err();
        assert_eq!(field_of(err), "fromDate");

        let err = store
            .submit("u1", form("unpaid", "2024-05-01", "05/02/2024", "short"), today(), now())
            .await
            .unwrap_err();
        assert_eq!(field_of(err), "toDate");
    }

    #[actix_web::test]
    async fn lead_time_policy_is_enforced_only_when_configured() {
        let reason = "Family wedding abroad";

        // same-day start with no policy and with a zero-day policy
        assert!(store(None)
            .submit("u1", form("Annual", "2024-04-29", "2024-04-30", reason), today(), now())
            .await
            .is_ok());
        assert!(store(Some(0))
            .submit("u1", form("Annual", "2024-04-29", "2024-04-30", reason), today(), now())
            .await
            .is_ok());

        let two_days = store(Some(2));
        let err = two_days
            .submit("u1", form("Annual", "2024-04-30", "2024-05-01", reason), today(), now())
            .await
            .unwrap_err();
        assert_eq!(field_of(err), "fromDate");
        assert!(two_days
            .submit("u1", form("Annual", "2024-05-01", "2024-05-01", reason), today(), now())
            .await
            .is_ok());
    }

    #[actix_web::test]
    async fn lead_time_counts_from_local_today_not_the_utc_stamp() {
        // evening west of UTC: local date is still the 28th
        let local_today = NaiveDate::from_ymd_opt(2024, 4, 28).unwrap();
        let utc_now = Utc.with_ymd_and_hms(2024, 4, 29, 3, 0, 0).unwrap();
        let store = store(Some(0));

        let leave = store
            .submit(
                "u1",
                form("Annual", "2024-04-28", "2024-04-28", "Family wedding abroad"),
                local_today,
                utc_now,
            )
            .await
            .unwrap();
        assert_eq!(leave.created_at, utc_now);

        let err = store
            .submit(
                "u1",
                form("Annual", "2024-04-27", "2024-04-28", "Family wedding abroad"),
                local_today,
                utc_now,
            )
            .await
            .unwrap_err();
        assert_eq!(field_of(err), "fromDate");
    }

    #[actix_web::test]
    async fn leaves_sort_by_requested_key_and_order() {
        let store = store(None);
        for (i, (kind, from)) in [("Sick", "2024-06-10"), ("Annual", "2024-06-01"), ("Unpaid", "2024-06-05")]
            .into_iter()
            .enumerate()
        {
            store
                .submit(
                    &format!("u{i}"),
                    form(kind, from, from, "Personal matters"),
                    today(),
                    now() + Duration::minutes(i as i64),
                )
                .await
                .unwrap();
        }

        let starts = |leaves: &[LeaveRequest]| -> Vec<String> {
            leaves.iter().map(|l| l.start_date.to_string()).collect()
        };

        let mut leaves = store.list_all().await.unwrap();
        sort_leaves(&mut leaves, LeaveSort::CreatedAt, SortOrder::Desc);
        assert_eq!(starts(&leaves), ["2024-06-05", "2024-06-01", "2024-06-10"]);

        sort_leaves(&mut leaves, LeaveSort::StartDate, SortOrder::Asc);
        assert_eq!(starts(&leaves), ["2024-06-01", "2024-06-05", "2024-06-10"]);

        sort_leaves(&mut leaves, LeaveSort::LeaveType, SortOrder::Desc);
        let kinds: Vec<_> = leaves.iter().map(|l| l.category).collect();
        assert_eq!(
            kinds,
            [LeaveCategory::Unpaid, LeaveCategory::Sick, LeaveCategory::Annual]
        );
    }

    #[actix_web::test]
    async fn deciding_twice_fails_and_keeps_first_decision() {
        let store = store(None);
        let leave = store
            .submit("u1", form("Sick", "2024-05-01", "2024-05-02", "Medical appointment"), today(), now())
            .await
            .unwrap();

        let approved = store.decide(&leave.id, Decision::Approved, now()).await.unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.decided_at, Some(now()));

        let err = store
            .decide(&leave.id, Decision::Approved, now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HrError::InvalidTransition {
                current: LeaveStatus::Approved,
                requested: LeaveStatus::Approved,
                ..
            }
        ));

        let err = store
            .decide(&leave.id, Decision::Rejected, now())
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::InvalidTransition { .. }));
        assert_eq!(
            store.get(&leave.id).await.unwrap().status,
            LeaveStatus::Approved
        );
    }

    #[actix_web::test]
    async fn deciding_unknown_request_is_not_found() {
        let err = store(None)
            .decide("missing", Decision::Rejected, now())
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::NotFound { .. }));
    }

    #[actix_web::test]
    async fn pending_keeps_insertion_order_and_history_is_latest_first() {
        let store = store(None);
        let mut ids = Vec::new();
        for i in 0..4 {
            let leave = store
                .submit(
                    &format!("u{i}"),
                    form("Annual", "2024-06-01", "2024-06-02", "Summer vacation"),
                    today(),
                    now(),
                )
                .await
                .unwrap();
            ids.push(leave.id);
        }

        store.decide(&ids[2], Decision::Approved, now()).await.unwrap();
        store
            .decide(&ids[0], Decision::Rejected, now() + Duration::hours(1))
            .await
            .unwrap();

        let pending: Vec<_> = store
            .list_pending()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(pending, vec![ids[1].clone(), ids[3].clone()]);

        let history: Vec<_> = store
            .list_history()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(history, vec![ids[0].clone(), ids[2].clone()]);

        let counts = store.counts().await.unwrap();
        assert_eq!(counts, LeaveCounts { pending: 2, approved: 1, rejected: 1 });
        assert_eq!(store.count_pending().await.unwrap(), 2);
        assert_eq!(store.count_approved().await.unwrap(), 1);
        assert_eq!(store.list_for_requester("u3").await.unwrap().len(), 1);
    }

    #[test]
    fn racing_decisions_let_exactly_one_win() {
        let store = store(None);
        let leave = block_on(store.submit(
            "u1",
            form("Annual", "2024-06-01", "2024-06-05", "Summer vacation"),
            today(),
            now(),
        ))
        .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                let id = leave.id.clone();
                std::thread::spawn(move || {
                    let decision = if i % 2 == 0 {
                        Decision::Approved
                    } else {
                        Decision::Rejected
                    };
                    block_on(store.decide(&id, decision, now()))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, HrError::InvalidTransition { .. })));

        let stored = block_on(store.get(&leave.id)).unwrap();
        assert_eq!(stored.status, winners[0].status);
    }
}
