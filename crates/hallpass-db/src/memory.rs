//! In-memory backend for tests and local development.
//!
//! All tables sit behind one `RwLock`, so every write (including the overlap
//! check that precedes a leave insert) is atomic with respect to other writers.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hallpass_core::dates::ranges_overlap;
use hallpass_models::{
    AttendanceId, AttendanceRecord, AttendanceSummary, LeaveId, LeaveRequest, LeaveStatus,
    NewAttendanceRecord, NewLeaveRequest, NewNotification, NewUser, Notification, NotificationId,
    User, UserId, UserRole,
};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::{
    ATTENDANCE_EXISTS_MESSAGE, AttendanceQuery, CampusStore, EMAIL_TAKEN_MESSAGE,
    LEAVE_OVERLAP_MESSAGE, LeaveQuery, STUDENT_NUMBER_TAKEN_MESSAGE, StoreResult, UserQuery,
};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    leaves: HashMap<LeaveId, LeaveRequest>,
    attendance: HashMap<AttendanceId, AttendanceRecord>,
    notifications: HashMap<NotificationId, Notification>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a user's active flag; `false` when the user does not exist.
    /// The API never deactivates accounts, fixtures do.
    pub async fn set_user_active(&self, id: UserId, active: bool) -> bool {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&id) {
            Some(user) => {
                user.is_active = active;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

fn page<T>(mut rows: Vec<T>, limit: i64, offset: i64) -> (Vec<T>, i64) {
    let total = rows.len() as i64;
    let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
    let rows = if offset >= rows.len() {
        Vec::new()
    } else {
        rows.drain(offset..).take(limit).collect()
    };
    (rows, total)
}

fn leave_matches(leave: &LeaveRequest, query: &LeaveQuery) -> bool {
    query.student_id.is_none_or(|id| leave.student_id == id)
        && query
            .department
            .as_deref()
            .is_none_or(|d| leave.department == d)
        && query
            .hostel
            .as_deref()
            .is_none_or(|h| leave.hostel.as_deref() == Some(h))
        && query.status.is_none_or(|s| leave.status == s)
        && query.leave_type.is_none_or(|t| leave.leave_type == t)
}

fn summarize(student_id: UserId, records: &[&AttendanceRecord]) -> AttendanceSummary {
    AttendanceSummary {
        student_id,
        total: records.len() as i64,
        present: records.iter().filter(|r| r.present).count() as i64,
        last_date: records.iter().map(|r| r.date).max(),
    }
}

#[async_trait]
impl CampusStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let email = new.email.trim().to_lowercase();
        if tables.users.values().any(|u| u.email == email) {
            return Err(StoreError::conflict(EMAIL_TAKEN_MESSAGE));
        }
        let number_taken = new.student_number.as_deref().is_some_and(|number| {
            tables
                .users
                .values()
                .any(|u| u.student_number.as_deref() == Some(number))
        });
        if number_taken {
            return Err(StoreError::conflict(STUDENT_NUMBER_TAKEN_MESSAGE));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            name: new.name,
            email,
            password_hash: new.password_hash,
            role: new.role,
            department: new.department,
            hostel: new.hostel,
            phone: new.phone,
            student_number: new.student_number,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(
        &self,
        query: &UserQuery,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<User>, i64)> {
        let tables = self.tables.read().await;
        let department = query.department.as_deref();
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| query.role.is_none_or(|r| u.role == r))
            .filter(|u| department.is_none_or(|d| u.department == d))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.name.cmp(&b.name)));
        Ok(page(users, limit, offset))
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or(StoreError::NotFound("User"))?;
        user.last_login = Some(at);
        user.updated_at = at;
        Ok(())
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or(StoreError::NotFound("User"))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn list_department_students(&self, department: &str) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut students: Vec<User> = tables
            .users
            .values()
            .filter(|u| u.role == UserRole::Student && u.is_active && u.department == department)
            .cloned()
            .collect();
        students.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(students)
    }

    async fn create_leave(&self, new: NewLeaveRequest) -> StoreResult<LeaveRequest> {
        let mut tables = self.tables.write().await;
        let overlaps = tables.leaves.values().any(|l| {
            l.student_id == new.student_id
                && l.status.blocks_dates()
                && ranges_overlap(l.start_date, l.end_date, new.start_date, new.end_date)
        });
        if overlaps {
            return Err(StoreError::conflict(LEAVE_OVERLAP_MESSAGE));
        }

        let now = Utc::now();
        let leave = LeaveRequest {
            id: LeaveId::new(),
            student_id: new.student_id,
            leave_type: new.leave_type,
            reason: new.reason,
            start_date: new.start_date,
            end_date: new.end_date,
            status: LeaveStatus::Pending,
            approved_by: None,
            remarks: None,
            department: new.department,
            hostel: new.hostel,
            days: new.days,
            created_at: now,
            updated_at: now,
        };
        tables.leaves.insert(leave.id, leave.clone());
        Ok(leave)
    }

    async fn find_leave(&self, id: LeaveId) -> StoreResult<Option<LeaveRequest>> {
        Ok(self.tables.read().await.leaves.get(&id).cloned())
    }

    async fn list_leaves(
        &self,
        query: &LeaveQuery,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<LeaveRequest>, i64)> {
        let tables = self.tables.read().await;
        let mut leaves: Vec<LeaveRequest> = tables
            .leaves
            .values()
            .filter(|l| leave_matches(l, query))
            .cloned()
            .collect();
        leaves.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(leaves, limit, offset))
    }

    async fn count_leaves(&self, query: &LeaveQuery) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .leaves
            .values()
            .filter(|l| leave_matches(l, query))
            .count() as i64)
    }

    async fn find_overlapping_leaves(
        &self,
        student_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<LeaveRequest>> {
        let tables = self.tables.read().await;
        Ok(tables
            .leaves
            .values()
            .filter(|l| {
                l.student_id == student_id
                    && l.status.blocks_dates()
                    && ranges_overlap(l.start_date, l.end_date, start, end)
            })
            .cloned()
            .collect())
    }

    async fn decide_leave(
        &self,
        id: LeaveId,
        status: LeaveStatus,
        decided_by: UserId,
        remarks: Option<String>,
    ) -> StoreResult<Option<LeaveRequest>> {
        let mut tables = self.tables.write().await;
        let Some(leave) = tables.leaves.get_mut(&id) else {
            return Ok(None);
        };
        if leave.status != LeaveStatus::Pending {
            return Ok(None);
        }
        leave.status = status;
        leave.approved_by = Some(decided_by);
        leave.remarks = remarks;
        leave.updated_at = Utc::now();
        Ok(Some(leave.clone()))
    }

    async fn find_approved_leave_on(
        &self,
        student_id: UserId,
        date: NaiveDate,
    ) -> StoreResult<Option<LeaveRequest>> {
        let tables = self.tables.read().await;
        Ok(tables
            .leaves
            .values()
            .filter(|l| {
                l.student_id == student_id
                    && l.status == LeaveStatus::Approved
                    && l.start_date <= date
                    && date <= l.end_date
            })
            .min_by_key(|l| l.start_date)
            .cloned())
    }

    async fn approved_leaves_starting_on(
        &self,
        date: NaiveDate,
    ) -> StoreResult<Vec<LeaveRequest>> {
        let tables = self.tables.read().await;
        let mut leaves: Vec<LeaveRequest> = tables
            .leaves
            .values()
            .filter(|l| l.status == LeaveStatus::Approved && l.start_date == date)
            .cloned()
            .collect();
        leaves.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(leaves)
    }

    async fn find_attendance(
        &self,
        student_id: UserId,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .attendance
            .values()
            .find(|r| r.student_id == student_id && r.date == date)
            .cloned())
    }

    async fn create_attendance(
        &self,
        new: NewAttendanceRecord,
    ) -> StoreResult<AttendanceRecord> {
        let mut tables = self.tables.write().await;
        if tables
            .attendance
            .values()
            .any(|r| r.student_id == new.student_id && r.date == new.date)
        {
            return Err(StoreError::conflict(ATTENDANCE_EXISTS_MESSAGE));
        }
        let record = AttendanceRecord {
            id: AttendanceId::new(),
            student_id: new.student_id,
            date: new.date,
            present: new.present,
            marked_by: new.marked_by,
            subject: new.subject,
            period: new.period,
            created_at: Utc::now(),
        };
        tables.attendance.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_attendance(
        &self,
        query: &AttendanceQuery,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let tables = self.tables.read().await;
        let mut records: Vec<AttendanceRecord> = tables
            .attendance
            .values()
            .filter(|r| r.student_id == query.student_id)
            .filter(|r| query.start_date.is_none_or(|d| r.date >= d))
            .filter(|r| query.end_date.is_none_or(|d| r.date <= d))
            .filter(|r| {
                query
                    .subject
                    .as_deref()
                    .is_none_or(|s| r.subject.as_deref() == Some(s))
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    async fn attendance_summary(&self, student_id: UserId) -> StoreResult<AttendanceSummary> {
        let tables = self.tables.read().await;
        let records: Vec<&AttendanceRecord> = tables
            .attendance
            .values()
            .filter(|r| r.student_id == student_id)
            .collect();
        Ok(summarize(student_id, &records))
    }

    async fn attendance_summaries(&self, department: &str) -> StoreResult<Vec<AttendanceSummary>> {
        let tables = self.tables.read().await;
        let mut grouped: HashMap<UserId, Vec<&AttendanceRecord>> = HashMap::new();
        for record in tables.attendance.values() {
            let in_department = tables.users.get(&record.student_id).is_some_and(|u| {
                u.role == UserRole::Student && u.department == department
            });
            if in_department {
                grouped.entry(record.student_id).or_default().push(record);
            }
        }
        Ok(grouped
            .into_iter()
            .map(|(student_id, records)| summarize(student_id, &records))
            .collect())
    }

    async fn create_notification(&self, new: NewNotification) -> StoreResult<Notification> {
        let notification = Notification {
            id: NotificationId::new(),
            user_id: new.user_id,
            title: new.title,
            message: new.message,
            category: new.category,
            is_read: false,
            related_id: new.related_id,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn list_notifications(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> StoreResult<Vec<Notification>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(rows, limit, 0).0)
    }

    async fn mark_notification_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.notifications.get_mut(&id) {
            Some(n) if n.user_id == user_id => {
                n.is_read = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_all_notifications_read(&self, user_id: UserId) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let mut updated = 0;
        for n in tables
            .notifications
            .values_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            n.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn unread_notification_count(&self, user_id: UserId) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as i64)
    }
}
