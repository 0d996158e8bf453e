//! PostgreSQL backend.
//!
//! The write invariants are backed by the schema: a `UNIQUE (student_id, date)`
//! on attendance and a gist `EXCLUDE` on leave date ranges. Leave inserts also
//! lock the student's row first so concurrent submissions serialize and the
//! losing one gets a readable conflict instead of a constraint name.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hallpass_models::{
    AttendanceId, AttendanceRecord, AttendanceSummary, LeaveId, LeaveRequest, LeaveStatus,
    NewAttendanceRecord, NewLeaveRequest, NewNotification, NewUser, Notification, NotificationId,
    User, UserId,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use crate::error::StoreError;
use crate::store::{
    ATTENDANCE_EXISTS_MESSAGE, AttendanceQuery, CampusStore, EMAIL_TAKEN_MESSAGE,
    LEAVE_OVERLAP_MESSAGE, LeaveQuery, STUDENT_NUMBER_TAKEN_MESSAGE, StoreResult, UserQuery,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, department, hostel, phone, \
     student_number, is_active, last_login, created_at, updated_at";

const LEAVE_COLUMNS: &str = "id, student_id, leave_type, reason, start_date, end_date, status, \
     approved_by, remarks, department, hostel, days, created_at, updated_at";

const ATTENDANCE_COLUMNS: &str =
    "id, student_id, date, present, marked_by, subject, period, created_at";

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, title, message, category, is_read, related_id, created_at";

/// Translates constraint violations into conflicts with a user-facing message.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let message = match db_err.constraint() {
            Some("users_email_key") => Some(EMAIL_TAKEN_MESSAGE),
            Some("users_student_number_key") => Some(STUDENT_NUMBER_TAKEN_MESSAGE),
            Some("attendance_records_student_date_key") => Some(ATTENDANCE_EXISTS_MESSAGE),
            Some("leave_requests_no_overlap") => Some(LEAVE_OVERLAP_MESSAGE),
            _ => None,
        };
        if let Some(message) = message {
            return StoreError::conflict(message);
        }
        if db_err.is_unique_violation() {
            return StoreError::conflict("Record already exists");
        }
    }
    StoreError::Database(err)
}

fn push_leave_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &LeaveQuery) {
    builder.push(" WHERE TRUE");
    if let Some(student_id) = query.student_id {
        builder.push(" AND student_id = ").push_bind(student_id);
    }
    if let Some(department) = &query.department {
        builder
            .push(" AND department = ")
            .push_bind(department.clone());
    }
    if let Some(hostel) = &query.hostel {
        builder.push(" AND hostel = ").push_bind(hostel.clone());
    }
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(leave_type) = query.leave_type {
        builder.push(" AND leave_type = ").push_bind(leave_type);
    }
}

fn push_user_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &UserQuery) {
    builder.push(" WHERE TRUE");
    if let Some(role) = query.role {
        builder.push(" AND role = ").push_bind(role);
    }
    if let Some(department) = &query.department {
        builder
            .push(" AND department = ")
            .push_bind(department.clone());
    }
}

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CampusStore for PgStore {
    #[instrument(skip(self, new), fields(email = %new.email, role = %new.role))]
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password_hash, role, department, hostel, phone, student_number) \
             VALUES ($1, $2, LOWER(TRIM($3)), $4, $5, $6, $7, $8, $9) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(UserId::new())
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(new.role)
            .bind(&new.department)
            .bind(&new.hostel)
            .bind(&new.phone)
            .bind(&new.student_number)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = LOWER(TRIM($1))");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_users(
        &self,
        query: &UserQuery,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<User>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_user_filters(&mut count, query);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut data = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_user_filters(&mut data, query);
        data.push(" ORDER BY created_at DESC, name ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let users = data.build_query_as::<User>().fetch_all(&self.pool).await?;

        Ok((users, total))
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> StoreResult<()> {
        let result = sqlx::query("UPDATE users SET last_login = $2, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("User"));
        }
        Ok(())
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("User"));
        }
        Ok(())
    }

    async fn list_department_students(&self, department: &str) -> StoreResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE role = 'student' AND is_active AND department = $1 ORDER BY name"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(department)
            .fetch_all(&self.pool)
            .await?)
    }

    #[instrument(skip(self, new), fields(student_id = %new.student_id))]
    async fn create_leave(&self, new: NewLeaveRequest) -> StoreResult<LeaveRequest> {
        let mut tx = self.pool.begin().await?;

        // Serialize submissions per student.
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(new.student_id)
            .fetch_optional(&mut *tx)
            .await?;

        let overlaps = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM leave_requests \
             WHERE student_id = $1 AND status IN ('pending', 'approved') \
             AND start_date <= $3 AND end_date >= $2)",
        )
        .bind(new.student_id)
        .bind(new.start_date)
        .bind(new.end_date)
        .fetch_one(&mut *tx)
        .await?;
        if overlaps {
            return Err(StoreError::conflict(LEAVE_OVERLAP_MESSAGE));
        }

        let sql = format!(
            "INSERT INTO leave_requests \
             (id, student_id, leave_type, reason, start_date, end_date, status, department, hostel, days) \
             VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, $8, $9) RETURNING {LEAVE_COLUMNS}"
        );
        let leave = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(LeaveId::new())
            .bind(new.student_id)
            .bind(new.leave_type)
            .bind(&new.reason)
            .bind(new.start_date)
            .bind(new.end_date)
            .bind(&new.department)
            .bind(&new.hostel)
            .bind(new.days)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify)?;

        tx.commit().await?;
        Ok(leave)
    }

    async fn find_leave(&self, id: LeaveId) -> StoreResult<Option<LeaveRequest>> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = $1");
        Ok(sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_leaves(
        &self,
        query: &LeaveQuery,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<LeaveRequest>, i64)> {
        let total = self.count_leaves(query).await?;

        let mut data =
            QueryBuilder::<Postgres>::new(format!("SELECT {LEAVE_COLUMNS} FROM leave_requests"));
        push_leave_filters(&mut data, query);
        data.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let leaves = data
            .build_query_as::<LeaveRequest>()
            .fetch_all(&self.pool)
            .await?;

        Ok((leaves, total))
    }

    async fn count_leaves(&self, query: &LeaveQuery) -> StoreResult<i64> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM leave_requests");
        push_leave_filters(&mut count, query);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn find_overlapping_leaves(
        &self,
        student_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests \
             WHERE student_id = $1 AND status IN ('pending', 'approved') \
             AND start_date <= $3 AND end_date >= $2 ORDER BY start_date"
        );
        Ok(sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(student_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?)
    }

    #[instrument(skip(self, remarks))]
    async fn decide_leave(
        &self,
        id: LeaveId,
        status: LeaveStatus,
        decided_by: UserId,
        remarks: Option<String>,
    ) -> StoreResult<Option<LeaveRequest>> {
        let sql = format!(
            "UPDATE leave_requests \
             SET status = $2, approved_by = $3, remarks = $4, updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' RETURNING {LEAVE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(id)
            .bind(status)
            .bind(decided_by)
            .bind(remarks)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_approved_leave_on(
        &self,
        student_id: UserId,
        date: NaiveDate,
    ) -> StoreResult<Option<LeaveRequest>> {
        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests \
             WHERE student_id = $1 AND status = 'approved' \
             AND start_date <= $2 AND end_date >= $2 ORDER BY start_date LIMIT 1"
        );
        Ok(sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(student_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn approved_leaves_starting_on(
        &self,
        date: NaiveDate,
    ) -> StoreResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests \
             WHERE status = 'approved' AND start_date = $1 ORDER BY created_at"
        );
        Ok(sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_attendance(
        &self,
        student_id: UserId,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance_records WHERE student_id = $1 AND date = $2"
        );
        Ok(sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(student_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?)
    }

    #[instrument(skip(self, new), fields(student_id = %new.student_id, date = %new.date))]
    async fn create_attendance(
        &self,
        new: NewAttendanceRecord,
    ) -> StoreResult<AttendanceRecord> {
        let sql = format!(
            "INSERT INTO attendance_records (id, student_id, date, present, marked_by, subject, period) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {ATTENDANCE_COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(AttendanceId::new())
            .bind(new.student_id)
            .bind(new.date)
            .bind(new.present)
            .bind(new.marked_by)
            .bind(&new.subject)
            .bind(&new.period)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn list_attendance(
        &self,
        query: &AttendanceQuery,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let mut data = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance_records WHERE student_id = "
        ));
        data.push_bind(query.student_id);
        if let Some(start) = query.start_date {
            data.push(" AND date >= ").push_bind(start);
        }
        if let Some(end) = query.end_date {
            data.push(" AND date <= ").push_bind(end);
        }
        if let Some(subject) = &query.subject {
            data.push(" AND subject = ").push_bind(subject.clone());
        }
        data.push(" ORDER BY date DESC");
        Ok(data
            .build_query_as::<AttendanceRecord>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn attendance_summary(&self, student_id: UserId) -> StoreResult<AttendanceSummary> {
        Ok(sqlx::query_as::<_, AttendanceSummary>(
            "SELECT $1::uuid AS student_id, COUNT(*) AS total, \
             COUNT(*) FILTER (WHERE present) AS present, MAX(date) AS last_date \
             FROM attendance_records WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn attendance_summaries(&self, department: &str) -> StoreResult<Vec<AttendanceSummary>> {
        Ok(sqlx::query_as::<_, AttendanceSummary>(
            "SELECT a.student_id, COUNT(*) AS total, \
             COUNT(*) FILTER (WHERE a.present) AS present, MAX(a.date) AS last_date \
             FROM attendance_records a JOIN users u ON u.id = a.student_id \
             WHERE u.role = 'student' AND u.department = $1 \
             GROUP BY a.student_id",
        )
        .bind(department)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_notification(&self, new: NewNotification) -> StoreResult<Notification> {
        let sql = format!(
            "INSERT INTO notifications (id, user_id, title, message, category, related_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {NOTIFICATION_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Notification>(&sql)
            .bind(NotificationId::new())
            .bind(new.user_id)
            .bind(&new.title)
            .bind(&new.message)
            .bind(new.category)
            .bind(new.related_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_notifications(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> StoreResult<Vec<Notification>> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
        );
        Ok(sqlx::query_as::<_, Notification>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn mark_notification_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_notifications_read(&self, user_id: UserId) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn unread_notification_count(&self, user_id: UserId) -> StoreResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?)
    }
}
