use chrono::NaiveDate;
use hallpass_core::dates::validate_leave_window;
use hallpass_core::{AppError, PaginationMeta};
use hallpass_db::store::LEAVE_OVERLAP_MESSAGE;
use hallpass_db::{CampusStore, LeaveQuery};
use hallpass_models::{
    ApplyLeaveDto, DecideLeaveDto, LeaveConflictDetails, LeaveDecision, LeaveFilterParams, LeaveId,
    LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest, PaginatedLeavesResponse, UserRole,
};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::metrics::{track_leave_decided, track_leave_submitted};
use crate::middleware::scope::{Actor, ensure_can_act_on, ensure_can_view};
use crate::modules::notifications::dispatcher::{NotificationDispatcher, NotificationEvent};

pub const ALREADY_PROCESSED_MESSAGE: &str = "Leave request has already been processed";

const REASON_LENGTH: std::ops::RangeInclusive<usize> = 10..=500;

/// The reason as stored: trimmed, and still within the length bounds.
fn clean_reason(reason: &str) -> Result<String, AppError> {
    let reason = reason.trim();
    if !REASON_LENGTH.contains(&reason.chars().count()) {
        return Err(AppError::invalid_field(
            "reason",
            "Reason must be between 10 and 500 characters",
        ));
    }
    Ok(reason.to_string())
}

/// The leave filter an actor is allowed to run.
///
/// Scope fields always come from the actor's profile. Faculty and wardens
/// see the pending queue unless they ask for a specific status.
pub fn scoped_leave_query(
    actor: &Actor,
    status: Option<LeaveStatus>,
    leave_type: Option<LeaveType>,
) -> Result<LeaveQuery, AppError> {
    let mut query = LeaveQuery {
        status,
        leave_type,
        ..Default::default()
    };

    match actor.role {
        UserRole::Admin => {}
        UserRole::Student => query.student_id = Some(actor.id),
        UserRole::Faculty => {
            query.department = Some(actor.department.clone());
            query.status = Some(status.unwrap_or(LeaveStatus::Pending));
        }
        UserRole::Warden => {
            let hostel = actor
                .hostel
                .clone()
                .ok_or_else(|| AppError::forbidden("Warden is not assigned to a hostel"))?;
            query.hostel = Some(hostel);
            query.status = Some(status.unwrap_or(LeaveStatus::Pending));
        }
    }

    Ok(query)
}

pub struct LeaveService;

impl LeaveService {
    /// Files a pending leave request for `student`.
    ///
    /// `today` anchors the "not in the past" rule.
    #[instrument(skip(store, dto), fields(student_id = %student.id))]
    pub async fn submit(
        store: &dyn CampusStore,
        student: &Actor,
        dto: ApplyLeaveDto,
        today: NaiveDate,
    ) -> Result<LeaveRequest, AppError> {
        if student.role != UserRole::Student {
            return Err(AppError::forbidden("Only students can apply for leave"));
        }

        let reason = clean_reason(&dto.reason)?;
        let days = validate_leave_window(dto.start_date, dto.end_date, today)
            .map_err(|e| AppError::invalid_field(e.field(), e.message()))?;

        let overlapping = store
            .find_overlapping_leaves(student.id, dto.start_date, dto.end_date)
            .await?;
        if let Some(existing) = overlapping.first() {
            let details = json!({ "conflicting_leave": LeaveConflictDetails::from(existing) });
            let err = AppError::conflict(anyhow::anyhow!(LEAVE_OVERLAP_MESSAGE));
            return Err(err.with_details(details));
        }

        let leave = store
            .create_leave(NewLeaveRequest {
                student_id: student.id,
                leave_type: dto.leave_type,
                reason,
                start_date: dto.start_date,
                end_date: dto.end_date,
                department: student.department.clone(),
                hostel: student.hostel.clone(),
                days,
            })
            .await?;

        track_leave_submitted(leave.leave_type.as_str());
        info!(leave_id = %leave.id, days = leave.days, "leave request submitted");
        Ok(leave)
    }

    #[instrument(skip(store))]
    pub async fn list(
        store: &dyn CampusStore,
        actor: &Actor,
        params: &LeaveFilterParams,
    ) -> Result<PaginatedLeavesResponse, AppError> {
        let query = scoped_leave_query(actor, params.status, params.leave_type)?;
        Self::page(store, &query, params).await
    }

    /// The caller's own requests, whatever their role.
    #[instrument(skip(store))]
    pub async fn list_own(
        store: &dyn CampusStore,
        actor: &Actor,
        params: &LeaveFilterParams,
    ) -> Result<PaginatedLeavesResponse, AppError> {
        let query = LeaveQuery {
            student_id: Some(actor.id),
            status: params.status,
            leave_type: params.leave_type,
            ..Default::default()
        };
        Self::page(store, &query, params).await
    }

    async fn page(
        store: &dyn CampusStore,
        query: &LeaveQuery,
        params: &LeaveFilterParams,
    ) -> Result<PaginatedLeavesResponse, AppError> {
        let pagination = &params.pagination;
        let (data, total) = store
            .list_leaves(query, pagination.limit(), pagination.offset())
            .await?;

        Ok(PaginatedLeavesResponse {
            data,
            meta: PaginationMeta::from_params(pagination, total),
        })
    }

    #[instrument(skip(store))]
    pub async fn get(
        store: &dyn CampusStore,
        actor: &Actor,
        id: LeaveId,
    ) -> Result<LeaveRequest, AppError> {
        let leave = Self::load(store, id).await?;
        ensure_can_view(actor, &leave)?;
        Ok(leave)
    }

    /// Pending requests the actor could act on.
    pub async fn pending_count(store: &dyn CampusStore, actor: &Actor) -> Result<i64, AppError> {
        let query = scoped_leave_query(actor, Some(LeaveStatus::Pending), None)?;
        Ok(store.count_leaves(&query).await?)
    }

    /// Approves or rejects a pending request and notifies the student.
    ///
    /// Checks run in order: existence, pending status, then scope. The store
    /// only updates rows that are still pending, so a concurrent decision on
    /// the same request also surfaces as a conflict.
    #[instrument(skip(store, dispatcher, dto), fields(actor_id = %actor.id))]
    pub async fn decide(
        store: &dyn CampusStore,
        dispatcher: &NotificationDispatcher,
        actor: &Actor,
        id: LeaveId,
        decision: LeaveDecision,
        dto: DecideLeaveDto,
    ) -> Result<LeaveRequest, AppError> {
        let leave = Self::load(store, id).await?;

        if leave.status.is_terminal() {
            return Err(AppError::conflict(anyhow::anyhow!(ALREADY_PROCESSED_MESSAGE)));
        }

        ensure_can_act_on(actor, &leave)?;

        let remarks = dto
            .remarks
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let updated = store
            .decide_leave(id, decision.target_status(), actor.id, remarks)
            .await?
            .ok_or_else(|| AppError::conflict(anyhow::anyhow!(ALREADY_PROCESSED_MESSAGE)))?;

        track_leave_decided(updated.status.as_str());
        info!(leave_id = %updated.id, status = %updated.status, "leave request decided");

        if !dispatcher.dispatch(NotificationEvent::LeaveStatusChanged(updated.clone())) {
            warn!(leave_id = %updated.id, "status notification not queued");
        }

        Ok(updated)
    }

    async fn load(store: &dyn CampusStore, id: LeaveId) -> Result<LeaveRequest, AppError> {
        store
            .find_leave(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Leave request not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hallpass_core::PaginationParams;
    use hallpass_db::MemoryStore;
    use hallpass_models::{NewUser, UserId};
    use tokio::sync::mpsc;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        day(3, 1)
    }

    async fn user(
        store: &MemoryStore,
        role: UserRole,
        department: &str,
        hostel: Option<&str>,
    ) -> Actor {
        let created = store
            .create_user(NewUser {
                name: format!("{role} {department}"),
                email: format!("{}@campus.edu", UserId::new()),
                password_hash: "x".to_string(),
                role,
                department: department.to_string(),
                hostel: hostel.map(str::to_string),
                phone: None,
                student_number: None,
            })
            .await
            .unwrap();
        Actor::from(created)
    }

    fn apply(start: NaiveDate, end: NaiveDate) -> ApplyLeaveDto {
        ApplyLeaveDto {
            leave_type: LeaveType::Medical,
            reason: "Fever and doctor-advised rest".to_string(),
            start_date: start,
            end_date: end,
        }
    }

    async fn submit(
        store: &MemoryStore,
        student: &Actor,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<LeaveRequest, AppError> {
        LeaveService::submit(store, student, apply(start, end), today()).await
    }

    async fn approve(
        store: &MemoryStore,
        dispatcher: &NotificationDispatcher,
        actor: &Actor,
        id: LeaveId,
    ) -> Result<LeaveRequest, AppError> {
        let dto = DecideLeaveDto::default();
        LeaveService::decide(store, dispatcher, actor, id, LeaveDecision::Approve, dto).await
    }

    async fn reject(
        store: &MemoryStore,
        dispatcher: &NotificationDispatcher,
        actor: &Actor,
        id: LeaveId,
    ) -> Result<LeaveRequest, AppError> {
        let dto = DecideLeaveDto::default();
        LeaveService::decide(store, dispatcher, actor, id, LeaveDecision::Reject, dto).await
    }

    fn dispatcher() -> (NotificationDispatcher, mpsc::Receiver<NotificationEvent>) {
        NotificationDispatcher::channel(16)
    }

    #[tokio::test]
    async fn test_submit_computes_days_and_snapshots_profile() {
        let store = MemoryStore::new();
        let student = user(&store, UserRole::Student, "CS", Some("H1")).await;

        let leave = submit(&store, &student, day(3, 10), day(3, 12))
            .await
            .unwrap();

        assert_eq!(leave.days, 3);
        assert_eq!(leave.status, LeaveStatus::Pending);
        assert_eq!(leave.department, "CS");
        assert_eq!(leave.hostel.as_deref(), Some("H1"));
        assert_eq!(leave.student_id, student.id);
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_windows() {
        let store = MemoryStore::new();
        let student = user(&store, UserRole::Student, "CS", None).await;

        let backwards = submit(&store, &student, day(3, 12), day(3, 10))
            .await
            .unwrap_err();
        assert_eq!(backwards.status, 400);
        assert!(backwards.details.unwrap().get("end_date").is_some());

        let past = submit(&store, &student, day(2, 27), day(3, 2))
            .await
            .unwrap_err();
        assert_eq!(past.status, 400);
        assert!(past.details.unwrap().get("start_date").is_some());

        let too_long = submit(&store, &student, day(3, 1), day(3, 31))
            .await
            .unwrap_err();
        assert_eq!(too_long.status, 400);

        // Today is allowed, and 30 inclusive days is the limit
        let thirty = submit(&store, &student, day(3, 1), day(3, 30))
            .await
            .unwrap();
        assert_eq!(thirty.days, 30);
    }

    #[tokio::test]
    async fn test_reason_is_measured_after_trimming() {
        let store = MemoryStore::new();
        let student = user(&store, UserRole::Student, "CS", None).await;

        let mut padded = apply(day(3, 10), day(3, 12));
        padded.reason = format!("x{}", " ".repeat(12));
        let err = LeaveService::submit(&store, &student, padded, today())
            .await
            .unwrap_err();
        assert_eq!(err.status, 400);
        assert!(err.details.unwrap().get("reason").is_some());

        let mut surrounded = apply(day(3, 10), day(3, 12));
        surrounded.reason = "  Family wedding out of town  ".to_string();
        let leave = LeaveService::submit(&store, &student, surrounded, today())
            .await
            .unwrap();
        assert_eq!(leave.reason, "Family wedding out of town");
    }

    #[tokio::test]
    async fn test_touching_ranges_conflict() {
        let store = MemoryStore::new();
        let student = user(&store, UserRole::Student, "CS", None).await;

        submit(&store, &student, day(3, 10), day(3, 12))
            .await
            .unwrap();
        let err = submit(&store, &student, day(3, 12), day(3, 14))
            .await
            .unwrap_err();

        assert_eq!(err.status, 409);
        assert_eq!(err.error.to_string(), LEAVE_OVERLAP_MESSAGE);
        let details = err.details.unwrap();
        assert_eq!(details["conflicting_leave"]["start_date"], "2025-03-10");

        // Adjacent but not touching is fine
        submit(&store, &student, day(3, 13), day(3, 14))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_leave_frees_its_dates() {
        let store = MemoryStore::new();
        let student = user(&store, UserRole::Student, "CS", None).await;
        let faculty = user(&store, UserRole::Faculty, "CS", None).await;
        let (dispatcher, _rx) = dispatcher();

        let first = submit(&store, &student, day(3, 10), day(3, 12))
            .await
            .unwrap();
        reject(&store, &dispatcher, &faculty, first.id)
            .await
            .unwrap();

        submit(&store, &student, day(3, 11), day(3, 11))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_only_students_submit() {
        let store = MemoryStore::new();
        let faculty = user(&store, UserRole::Faculty, "CS", None).await;
        let err = submit(&store, &faculty, day(3, 10), day(3, 12))
            .await
            .unwrap_err();
        assert_eq!(err.status, 403);
    }

    #[tokio::test]
    async fn test_approve_then_approve_again_conflicts() {
        let store = MemoryStore::new();
        let student = user(&store, UserRole::Student, "CS", None).await;
        let faculty = user(&store, UserRole::Faculty, "CS", None).await;
        let (dispatcher, mut rx) = dispatcher();

        let leave = submit(&store, &student, day(3, 10), day(3, 12))
            .await
            .unwrap();

        let dto = DecideLeaveDto {
            remarks: Some("  Get well soon ".to_string()),
        };
        let approved = LeaveService::decide(
            &store,
            &dispatcher,
            &faculty,
            leave.id,
            LeaveDecision::Approve,
            dto,
        )
        .await
        .unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.approved_by, Some(faculty.id));
        assert_eq!(approved.remarks.as_deref(), Some("Get well soon"));

        match rx.try_recv() {
            Ok(NotificationEvent::LeaveStatusChanged(sent)) => assert_eq!(sent, approved),
            other => panic!("expected status event, got {other:?}"),
        }

        let again = reject(&store, &dispatcher, &faculty, leave.id)
            .await
            .unwrap_err();
        assert_eq!(again.status, 409);
        assert_eq!(again.error.to_string(), ALREADY_PROCESSED_MESSAGE);

        let stored = store.find_leave(leave.id).await.unwrap().unwrap();
        assert_eq!(stored.status, LeaveStatus::Approved);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_students_cannot_decide_even_their_own() {
        let store = MemoryStore::new();
        let student = user(&store, UserRole::Student, "CS", None).await;
        let (dispatcher, _rx) = dispatcher();

        let leave = submit(&store, &student, day(3, 10), day(3, 12))
            .await
            .unwrap();
        let err = approve(&store, &dispatcher, &student, leave.id)
            .await
            .unwrap_err();

        assert_eq!(err.status, 403);
        let stored = store.find_leave(leave.id).await.unwrap().unwrap();
        assert_eq!(stored.status, LeaveStatus::Pending);
    }

    #[tokio::test]
    async fn test_decide_out_of_scope_and_missing() {
        let store = MemoryStore::new();
        let student = user(&store, UserRole::Student, "CS", Some("H1")).await;
        let ee_faculty = user(&store, UserRole::Faculty, "EE", None).await;
        let other_warden = user(&store, UserRole::Warden, "HOSTEL", Some("H2")).await;
        let own_warden = user(&store, UserRole::Warden, "HOSTEL", Some("H1")).await;
        let (dispatcher, _rx) = dispatcher();

        let leave = submit(&store, &student, day(3, 10), day(3, 12))
            .await
            .unwrap();

        for outsider in [&ee_faculty, &other_warden] {
            let err = approve(&store, &dispatcher, outsider, leave.id)
                .await
                .unwrap_err();
            assert_eq!(err.status, 403);
        }

        let missing = approve(&store, &dispatcher, &own_warden, LeaveId::new())
            .await
            .unwrap_err();
        assert_eq!(missing.status, 404);

        let rejected = reject(&store, &dispatcher, &own_warden, leave.id)
            .await
            .unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);
        assert_eq!(rejected.remarks, None);
    }

    #[tokio::test]
    async fn test_decision_survives_a_closed_dispatcher() {
        let store = MemoryStore::new();
        let student = user(&store, UserRole::Student, "CS", None).await;
        let admin = user(&store, UserRole::Admin, "ADMIN", None).await;
        let (dispatcher, rx) = dispatcher();
        drop(rx);

        let leave = submit(&store, &student, day(3, 10), day(3, 12))
            .await
            .unwrap();
        let approved = approve(&store, &dispatcher, &admin, leave.id)
            .await
            .unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
    }

    #[tokio::test]
    async fn test_cs_faculty_never_sees_ee_leaves() {
        let store = MemoryStore::new();
        let cs_student = user(&store, UserRole::Student, "CS", None).await;
        let ee_student = user(&store, UserRole::Student, "EE", None).await;
        let cs_faculty = user(&store, UserRole::Faculty, "CS", None).await;
        let admin = user(&store, UserRole::Admin, "ADMIN", None).await;
        let (dispatcher, _rx) = dispatcher();

        let cs_leave = submit(&store, &cs_student, day(3, 10), day(3, 12))
            .await
            .unwrap();
        let ee_leave = submit(&store, &ee_student, day(3, 10), day(3, 12))
            .await
            .unwrap();
        // Approved so it also shows up under a status filter
        approve(&store, &dispatcher, &admin, ee_leave.id)
            .await
            .unwrap();

        let statuses = [
            None,
            Some(LeaveStatus::Pending),
            Some(LeaveStatus::Approved),
            Some(LeaveStatus::Rejected),
        ];
        for status in statuses {
            let params = LeaveFilterParams {
                status,
                ..Default::default()
            };
            let page = LeaveService::list(&store, &cs_faculty, &params)
                .await
                .unwrap();
            assert!(page.data.iter().all(|l| l.department == "CS"), "{status:?}");
        }

        let pending = LeaveService::list(&store, &cs_faculty, &LeaveFilterParams::default())
            .await
            .unwrap();
        assert_eq!(pending.data.len(), 1);
        assert_eq!(pending.data[0].id, cs_leave.id);

        let err = LeaveService::get(&store, &cs_faculty, ee_leave.id)
            .await
            .unwrap_err();
        assert_eq!(err.status, 403);
    }

    #[tokio::test]
    async fn test_listing_scopes_by_role() {
        let store = MemoryStore::new();
        let a = user(&store, UserRole::Student, "CS", Some("H1")).await;
        let b = user(&store, UserRole::Student, "CS", Some("H2")).await;
        let admin = user(&store, UserRole::Admin, "ADMIN", None).await;
        let h1_warden = user(&store, UserRole::Warden, "HOSTEL", Some("H1")).await;
        let homeless_warden = user(&store, UserRole::Warden, "HOSTEL", None).await;

        submit(&store, &a, day(3, 10), day(3, 12)).await.unwrap();
        submit(&store, &b, day(3, 10), day(3, 12)).await.unwrap();

        let params = LeaveFilterParams::default();
        let own = LeaveService::list(&store, &a, &params).await.unwrap();
        assert_eq!(own.data.len(), 1);
        assert_eq!(own.data[0].student_id, a.id);

        let all = LeaveService::list(&store, &admin, &params).await.unwrap();
        assert_eq!(all.meta.total, 2);

        let hostel = LeaveService::list(&store, &h1_warden, &params)
            .await
            .unwrap();
        assert_eq!(hostel.data.len(), 1);
        assert_eq!(hostel.data[0].student_id, a.id);

        let err = LeaveService::list(&store, &homeless_warden, &params)
            .await
            .unwrap_err();
        assert_eq!(err.status, 403);

        let admin_pending = LeaveService::pending_count(&store, &admin).await.unwrap();
        assert_eq!(admin_pending, 2);
        let warden_pending = LeaveService::pending_count(&store, &h1_warden)
            .await
            .unwrap();
        assert_eq!(warden_pending, 1);
    }

    #[tokio::test]
    async fn test_list_paginates_newest_first() {
        let store = MemoryStore::new();
        let student = user(&store, UserRole::Student, "CS", None).await;
        for start in [3, 6, 9] {
            submit(&store, &student, day(3, start), day(3, start + 1))
                .await
                .unwrap();
        }

        let params = LeaveFilterParams {
            pagination: PaginationParams {
                limit: Some(2),
                offset: None,
                page: Some(1),
            },
            ..Default::default()
        };
        let first = LeaveService::list_own(&store, &student, &params)
            .await
            .unwrap();
        assert_eq!(first.data.len(), 2);
        assert_eq!(first.meta.total, 3);
        assert!(first.meta.has_more);
        assert!(first.data[0].created_at >= first.data[1].created_at);
    }

    #[tokio::test]
    async fn test_student_sees_own_leave_only() {
        let store = MemoryStore::new();
        let owner = user(&store, UserRole::Student, "CS", None).await;
        let peer = user(&store, UserRole::Student, "CS", None).await;
        let leave = submit(&store, &owner, day(3, 10), day(3, 12))
            .await
            .unwrap();

        let own = LeaveService::get(&store, &owner, leave.id).await.unwrap();
        assert_eq!(own.id, leave.id);

        let err = LeaveService::get(&store, &peer, leave.id)
            .await
            .unwrap_err();
        assert_eq!(err.status, 403);

        let missing = LeaveService::get(&store, &owner, LeaveId::new())
            .await
            .unwrap_err();
        assert_eq!(missing.status, 404);
    }
}
