//! Best-effort delivery of workflow events.
//!
//! Handlers call [`NotificationDispatcher::dispatch`], which never blocks and
//! never fails the caller. A single background worker turns each event into a
//! stored in-app notification plus an email. Anything that goes wrong after
//! the event is queued is logged and dropped.

use std::fmt;
use std::sync::Arc;

use hallpass_core::AppError;
use hallpass_db::CampusStore;
use hallpass_models::{LeaveRequest, NewNotification, NotificationCategory};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::metrics::{
    track_email_failure, track_notification_delivered, track_notification_dropped,
};
use crate::utils::email::{Mailer, leave_reminder_email, leave_status_email};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// A pending request was approved or rejected.
    LeaveStatusChanged(LeaveRequest),
    /// An approved leave begins the next day.
    LeaveStartingTomorrow(LeaveRequest),
}

impl NotificationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LeaveStatusChanged(_) => "leave_status_changed",
            Self::LeaveStartingTomorrow(_) => "leave_starting_tomorrow",
        }
    }
}

/// Sending half of the notification queue. Cheap to clone.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::Sender<NotificationEvent>,
}

impl fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("capacity", &self.tx.max_capacity())
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl NotificationDispatcher {
    /// A dispatcher and the receiver the worker should drain.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<NotificationEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Creates the queue and spawns the worker on the current runtime.
    pub fn start(
        store: Arc<dyn CampusStore>,
        mailer: Arc<dyn Mailer>,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (dispatcher, rx) = Self::channel(capacity);
        let worker = tokio::spawn(run_worker(store, mailer, rx));
        (dispatcher, worker)
    }

    /// Queues `event` without waiting. Returns `false` when it was dropped.
    pub fn dispatch(&self, event: NotificationEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(event = event.name(), "notification queue full, dropping event");
                track_notification_dropped("full");
                false
            }
            Err(TrySendError::Closed(event)) => {
                warn!(event = event.name(), "notification worker stopped, dropping event");
                track_notification_dropped("closed");
                false
            }
        }
    }
}

/// Drains the queue until every dispatcher is dropped.
pub async fn run_worker(
    store: Arc<dyn CampusStore>,
    mailer: Arc<dyn Mailer>,
    mut rx: mpsc::Receiver<NotificationEvent>,
) {
    while let Some(event) = rx.recv().await {
        if let Err(err) = deliver(store.as_ref(), mailer.as_ref(), &event).await {
            warn!(event = event.name(), error = %err.error, "failed to deliver notification");
        }
    }
    debug!("notification worker stopped");
}

pub fn leave_status_title(leave: &LeaveRequest) -> String {
    format!("Leave Request {}", leave.status)
}

pub fn leave_status_message(leave: &LeaveRequest) -> String {
    let mut message = format!(
        "Your leave request for {} ({} to {}) has been {}",
        leave.leave_type, leave.start_date, leave.end_date, leave.status
    );
    if let Some(remarks) = &leave.remarks {
        message.push_str(&format!(". Remarks: {}", remarks));
    }
    message
}

pub const LEAVE_REMINDER_TITLE: &str = "Leave Starting Tomorrow";

pub fn leave_reminder_message(leave: &LeaveRequest) -> String {
    format!(
        "Your approved leave for {} starts tomorrow ({}). Please ensure all arrangements are in place.",
        leave.leave_type, leave.start_date
    )
}

/// Stores the in-app notification, then emails the student.
///
/// Only a failure to store the notification is returned; mail problems are
/// logged here.
#[instrument(skip(store, mailer, event), fields(event = event.name()))]
pub async fn deliver(
    store: &dyn CampusStore,
    mailer: &dyn Mailer,
    event: &NotificationEvent,
) -> Result<(), AppError> {
    let (leave, title, message, category) = match event {
        NotificationEvent::LeaveStatusChanged(leave) => (
            leave,
            leave_status_title(leave),
            leave_status_message(leave),
            NotificationCategory::LeaveStatus,
        ),
        NotificationEvent::LeaveStartingTomorrow(leave) => (
            leave,
            LEAVE_REMINDER_TITLE.to_string(),
            leave_reminder_message(leave),
            NotificationCategory::LeaveReminder,
        ),
    };

    store
        .create_notification(NewNotification {
            user_id: leave.student_id,
            title,
            message: message.clone(),
            category,
            related_id: Some(leave.id.into_inner()),
        })
        .await?;
    track_notification_delivered(event.name());

    let Some(student) = store.find_user(leave.student_id).await? else {
        warn!(student_id = %leave.student_id, "student missing, skipping email");
        return Ok(());
    };

    let email = match event {
        NotificationEvent::LeaveStatusChanged(_) => {
            leave_status_email(&student.email, &student.name, &message, leave)
        }
        NotificationEvent::LeaveStartingTomorrow(_) => {
            leave_reminder_email(&student.email, &student.name, &message, leave)
        }
    };

    if let Err(err) = mailer.send(email).await {
        track_email_failure();
        warn!(to = %student.email, error = %err.error, "failed to send notification email");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use hallpass_db::MemoryStore;
    use hallpass_models::{LeaveId, LeaveStatus, LeaveType, NewUser, UserId, UserRole};
    use std::sync::Mutex;

    use crate::utils::email::OutgoingEmail;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
            self.sent.lock().unwrap().push(email);
            if self.fail {
                return Err(AppError::internal_error("smtp down"));
            }
            Ok(())
        }
    }

    fn leave(student_id: UserId, status: LeaveStatus, remarks: Option<&str>) -> LeaveRequest {
        LeaveRequest {
            id: LeaveId::new(),
            student_id,
            leave_type: LeaveType::Medical,
            reason: "Fever and doctor-advised rest".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            status,
            approved_by: None,
            remarks: remarks.map(str::to_string),
            department: "CS".to_string(),
            hostel: None,
            days: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn student(store: &MemoryStore) -> UserId {
        store
            .create_user(NewUser {
                name: "Asha".to_string(),
                email: "asha@campus.edu".to_string(),
                password_hash: "x".to_string(),
                role: UserRole::Student,
                department: "CS".to_string(),
                hostel: None,
                phone: None,
                student_number: None,
            })
            .await
            .unwrap()
            .id
    }

    #[test]
    fn test_status_message_format() {
        let approved = leave(UserId::new(), LeaveStatus::Approved, None);
        assert_eq!(leave_status_title(&approved), "Leave Request approved");
        assert_eq!(
            leave_status_message(&approved),
            "Your leave request for medical (2025-03-10 to 2025-03-12) has been approved"
        );

        let rejected = leave(
            UserId::new(),
            LeaveStatus::Rejected,
            Some("Exams that week"),
        );
        assert_eq!(
            leave_status_message(&rejected),
            "Your leave request for medical (2025-03-10 to 2025-03-12) has been rejected. Remarks: Exams that week"
        );
    }

    #[tokio::test]
    async fn test_dispatch_reports_full_queue() {
        let (dispatcher, mut rx) = NotificationDispatcher::channel(1);
        let approved = leave(UserId::new(), LeaveStatus::Approved, None);
        let event = NotificationEvent::LeaveStatusChanged(approved);

        assert!(dispatcher.dispatch(event.clone()));
        assert!(!dispatcher.dispatch(event.clone()));
        assert_eq!(rx.recv().await, Some(event));
    }

    #[tokio::test]
    async fn test_dispatch_after_worker_gone_is_dropped() {
        let (dispatcher, rx) = NotificationDispatcher::channel(4);
        drop(rx);
        let approved = leave(UserId::new(), LeaveStatus::Approved, None);
        let event = NotificationEvent::LeaveStatusChanged(approved);
        assert!(!dispatcher.dispatch(event));
    }

    #[tokio::test]
    async fn test_deliver_stores_notification_and_sends_email() {
        let store = MemoryStore::new();
        let student_id = student(&store).await;
        let mailer = RecordingMailer::default();
        let approved = leave(student_id, LeaveStatus::Approved, None);

        let event = NotificationEvent::LeaveStatusChanged(approved.clone());
        deliver(&store, &mailer, &event).await.unwrap();

        let inbox = store.list_notifications(student_id, 20).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].category, NotificationCategory::LeaveStatus);
        assert_eq!(inbox[0].related_id, Some(approved.id.into_inner()));
        assert!(!inbox[0].is_read);

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_email, "asha@campus.edu");
    }

    #[tokio::test]
    async fn test_mail_failure_keeps_notification() {
        let store = MemoryStore::new();
        let student_id = student(&store).await;
        let mailer = RecordingMailer {
            fail: true,
            ..Default::default()
        };

        let approved = leave(student_id, LeaveStatus::Approved, None);
        let event = NotificationEvent::LeaveStartingTomorrow(approved);
        let result = deliver(&store, &mailer, &event).await;

        assert!(result.is_ok());
        let inbox = store.list_notifications(student_id, 20).await.unwrap();
        assert_eq!(inbox[0].category, NotificationCategory::LeaveReminder);
        assert_eq!(inbox[0].title, LEAVE_REMINDER_TITLE);
    }

    #[tokio::test]
    async fn test_worker_drains_queue_until_closed() {
        let store = Arc::new(MemoryStore::new());
        let student_id = student(&store).await;
        let mailer = Arc::new(RecordingMailer::default());

        let (dispatcher, worker) = NotificationDispatcher::start(store.clone(), mailer.clone(), 8);
        let rejected = leave(student_id, LeaveStatus::Rejected, None);
        dispatcher.dispatch(NotificationEvent::LeaveStatusChanged(rejected));
        drop(dispatcher);
        worker.await.unwrap();

        assert_eq!(store.unread_notification_count(student_id).await.unwrap(), 1);
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }
}
