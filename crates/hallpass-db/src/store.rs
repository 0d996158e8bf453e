//! The storage seam.
//!
//! Services hold an `Arc<dyn CampusStore>` and never talk to a database
//! directly. Each backend must enforce the two write invariants atomically:
//!
//! - per student, no two pending/approved leave requests overlap
//!   (inclusive bounds), checked together with the insert;
//! - at most one attendance record per (student, date).
//!
//! Both are reported as [`StoreError::Conflict`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hallpass_models::{
    AttendanceRecord, AttendanceSummary, LeaveId, LeaveRequest, LeaveStatus, LeaveType,
    NewAttendanceRecord, NewLeaveRequest, NewNotification, NewUser, Notification, NotificationId,
    User, UserId, UserRole,
};

use crate::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

pub const LEAVE_OVERLAP_MESSAGE: &str = "You already have a leave request overlapping these dates";
pub const ATTENDANCE_EXISTS_MESSAGE: &str = "Attendance already marked for this date";
pub const EMAIL_TAKEN_MESSAGE: &str = "Email already registered";
pub const STUDENT_NUMBER_TAKEN_MESSAGE: &str = "Student number already registered";

#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub role: Option<UserRole>,
    pub department: Option<String>,
}

/// Leave filters. Every `Some` narrows the result; scope fields come from the
/// caller's profile, never from request input.
#[derive(Debug, Clone, Default)]
pub struct LeaveQuery {
    pub student_id: Option<UserId>,
    pub department: Option<String>,
    pub hostel: Option<String>,
    pub status: Option<LeaveStatus>,
    pub leave_type: Option<LeaveType>,
}

#[derive(Debug, Clone)]
pub struct AttendanceQuery {
    pub student_id: UserId,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub subject: Option<String>,
}

#[async_trait]
pub trait CampusStore: Send + Sync {
    // Users
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Newest first, with the total match count.
    async fn list_users(
        &self,
        query: &UserQuery,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<User>, i64)>;
    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> StoreResult<()>;
    async fn update_password(&self, id: UserId, password_hash: &str) -> StoreResult<()>;
    /// Active students of a department, ordered by name.
    async fn list_department_students(&self, department: &str) -> StoreResult<Vec<User>>;

    // Leave requests
    /// Inserts a pending request unless it overlaps a pending/approved one.
    async fn create_leave(&self, leave: NewLeaveRequest) -> StoreResult<LeaveRequest>;
    async fn find_leave(&self, id: LeaveId) -> StoreResult<Option<LeaveRequest>>;
    /// Newest first, with the total match count.
    async fn list_leaves(
        &self,
        query: &LeaveQuery,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<LeaveRequest>, i64)>;
    async fn count_leaves(&self, query: &LeaveQuery) -> StoreResult<i64>;
    /// Pending/approved requests of `student_id` intersecting `[start, end]`.
    async fn find_overlapping_leaves(
        &self,
        student_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<LeaveRequest>>;
    /// Moves a pending request to `status`. Returns `None` when the request is
    /// missing or no longer pending; the row is then left untouched.
    async fn decide_leave(
        &self,
        id: LeaveId,
        status: LeaveStatus,
        decided_by: UserId,
        remarks: Option<String>,
    ) -> StoreResult<Option<LeaveRequest>>;
    async fn find_approved_leave_on(
        &self,
        student_id: UserId,
        date: NaiveDate,
    ) -> StoreResult<Option<LeaveRequest>>;
    async fn approved_leaves_starting_on(
        &self,
        date: NaiveDate,
    ) -> StoreResult<Vec<LeaveRequest>>;

    // Attendance
    async fn find_attendance(
        &self,
        student_id: UserId,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>>;
    async fn create_attendance(
        &self,
        record: NewAttendanceRecord,
    ) -> StoreResult<AttendanceRecord>;
    /// Ordered by date, newest first.
    async fn list_attendance(
        &self,
        query: &AttendanceQuery,
    ) -> StoreResult<Vec<AttendanceRecord>>;
    async fn attendance_summary(&self, student_id: UserId) -> StoreResult<AttendanceSummary>;
    /// One grouped row per student of `department` that has any records.
    async fn attendance_summaries(&self, department: &str) -> StoreResult<Vec<AttendanceSummary>>;

    // Notifications
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> StoreResult<Notification>;
    async fn list_notifications(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> StoreResult<Vec<Notification>>;
    /// `false` when the notification does not exist or belongs to someone else.
    async fn mark_notification_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> StoreResult<bool>;
    async fn mark_all_notifications_read(&self, user_id: UserId) -> StoreResult<u64>;
    async fn unread_notification_count(&self, user_id: UserId) -> StoreResult<i64>;
}
