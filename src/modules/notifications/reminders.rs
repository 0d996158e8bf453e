use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use hallpass_core::AppError;
use hallpass_db::CampusStore;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, instrument, warn};

use super::dispatcher::{NotificationDispatcher, NotificationEvent};

/// Queues a reminder for every approved leave starting the day after `today`.
/// Returns how many reminders were queued.
#[instrument(skip(store, dispatcher))]
pub async fn queue_leave_reminders(
    store: &dyn CampusStore,
    dispatcher: &NotificationDispatcher,
    today: NaiveDate,
) -> Result<usize, AppError> {
    let Some(tomorrow) = today.succ_opt() else {
        return Ok(0);
    };

    let leaves = store.approved_leaves_starting_on(tomorrow).await?;
    let queued = leaves
        .into_iter()
        .filter(|leave| {
            dispatcher.dispatch(NotificationEvent::LeaveStartingTomorrow(leave.clone()))
        })
        .count();

    Ok(queued)
}

/// Runs [`queue_leave_reminders`] on a fixed interval, starting immediately.
pub fn spawn_reminder_task(
    store: Arc<dyn CampusStore>,
    dispatcher: NotificationDispatcher,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let today = Utc::now().date_naive();
            match queue_leave_reminders(store.as_ref(), &dispatcher, today).await {
                Ok(0) => {}
                Ok(queued) => info!(queued, %today, "queued leave reminders"),
                Err(err) => warn!(error = %err.error, "leave reminder sweep failed"),
            }
        }
    })
}
