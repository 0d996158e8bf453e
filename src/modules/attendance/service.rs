use std::collections::HashMap;

use hallpass_core::AppError;
use hallpass_db::store::ATTENDANCE_EXISTS_MESSAGE;
use hallpass_db::{AttendanceQuery, CampusStore};
use hallpass_models::{LeaveConflictDetails, NewAttendanceRecord, UserId};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use super::model::{
    AttendanceFilterParams, AttendanceRecord, AttendanceStats, AttendanceSummary,
    DepartmentStatsResponse, MarkAttendanceDto, User, UserRole,
};
use crate::metrics::track_attendance_marked;
use crate::middleware::scope::{Actor, StudentScope, ensure_can_view};

pub const ON_LEAVE_MESSAGE: &str = "Student is on approved leave for this date";

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub struct AttendanceService;

impl AttendanceService {
    /// Records one student's presence for one day.
    ///
    /// A duplicate day is refused whatever its `present` value. Marking a
    /// student present on a day covered by an approved leave is refused with
    /// the leave attached; marking them absent is fine.
    #[instrument(skip(store, dto), fields(marker = %marker.id, student_id = %dto.student_id, date = %dto.date))]
    pub async fn mark(
        store: &dyn CampusStore,
        marker: &Actor,
        dto: MarkAttendanceDto,
    ) -> Result<AttendanceRecord, AppError> {
        let student = Self::load_student(store, dto.student_id).await?;

        if store.find_attendance(student.id, dto.date).await?.is_some() {
            return Err(AppError::conflict(anyhow::anyhow!(ATTENDANCE_EXISTS_MESSAGE)));
        }

        if dto.present {
            if let Some(leave) = store.find_approved_leave_on(student.id, dto.date).await? {
                return Err(AppError::conflict(anyhow::anyhow!(ON_LEAVE_MESSAGE))
                    .with_details(json!({ "leave_details": LeaveConflictDetails::from(&leave) })));
            }
        }

        let record = store
            .create_attendance(NewAttendanceRecord {
                student_id: student.id,
                date: dto.date,
                present: dto.present,
                marked_by: marker.id,
                subject: clean(dto.subject),
                period: clean(dto.period),
            })
            .await?;

        track_attendance_marked(record.present);
        info!(record_id = %record.id, present = record.present, "attendance marked");
        Ok(record)
    }

    #[instrument(skip(store))]
    pub async fn list(
        store: &dyn CampusStore,
        actor: &Actor,
        params: &AttendanceFilterParams,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let student = Self::resolve_student(store, actor, params.student_id).await?;
        let query = AttendanceQuery {
            student_id: student.id,
            start_date: params.start_date,
            end_date: params.end_date,
            subject: clean(params.subject.clone()),
        };
        Ok(store.list_attendance(&query).await?)
    }

    #[instrument(skip(store))]
    pub async fn stats(
        store: &dyn CampusStore,
        actor: &Actor,
        student_id: Option<Uuid>,
    ) -> Result<AttendanceStats, AppError> {
        let student = Self::resolve_student(store, actor, student_id).await?;
        let summary = store.attendance_summary(student.id).await?;
        Ok(AttendanceStats::from_summary(student.name, &summary))
    }

    /// Per-student stats for a whole department from one grouped query.
    ///
    /// Students with no records yet are listed with zero counts.
    #[instrument(skip(store))]
    pub async fn department_stats(
        store: &dyn CampusStore,
        actor: &Actor,
        department: Option<String>,
    ) -> Result<DepartmentStatsResponse, AppError> {
        let department = match actor.role {
            UserRole::Faculty => actor.department.clone(),
            UserRole::Admin => clean(department).ok_or_else(|| {
                AppError::invalid_field("department", "Department is required")
            })?,
            UserRole::Student | UserRole::Warden => {
                return Err(AppError::forbidden(
                    "Only faculty and admins can view department attendance",
                ));
            }
        };

        let students = store.list_department_students(&department).await?;
        let mut summaries: HashMap<UserId, AttendanceSummary> = store
            .attendance_summaries(&department)
            .await?
            .into_iter()
            .map(|s| (s.student_id, s))
            .collect();

        let stats: Vec<AttendanceStats> = students
            .into_iter()
            .map(|student| {
                let summary = summaries
                    .remove(&student.id)
                    .unwrap_or_else(|| AttendanceSummary::empty(student.id));
                AttendanceStats::from_summary(student.name, &summary)
            })
            .collect();

        Ok(DepartmentStatsResponse {
            department,
            total_students: stats.len(),
            students: stats,
        })
    }

    async fn load_student(store: &dyn CampusStore, id: UserId) -> Result<User, AppError> {
        store
            .find_user(id)
            .await?
            .filter(|u| u.role == UserRole::Student)
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))
    }

    /// Students always get themselves; everyone else names a student in scope.
    async fn resolve_student(
        store: &dyn CampusStore,
        actor: &Actor,
        student_id: Option<Uuid>,
    ) -> Result<User, AppError> {
        let id = match (actor.role, student_id) {
            (UserRole::Student, _) => actor.id,
            (_, Some(id)) => UserId::from(id),
            (_, None) => {
                return Err(AppError::invalid_field("student_id", "student_id is required"));
            }
        };

        let student = Self::load_student(store, id).await?;
        ensure_can_view(actor, &StudentScope(&student))?;
        Ok(student)
    }
}
