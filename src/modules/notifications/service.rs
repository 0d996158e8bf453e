use hallpass_core::AppError;
use hallpass_db::CampusStore;
use hallpass_models::{
    MarkAllReadResponse, Notification, NotificationId, NotificationListParams, UnreadCountResponse,
    UserId,
};
use tracing::instrument;

/// Inbox operations. Every call is keyed by the recipient, so a caller can
/// only ever see or change their own notifications.
pub struct NotificationService;

impl NotificationService {
    #[instrument(skip(store))]
    pub async fn list(
        store: &dyn CampusStore,
        user_id: UserId,
        params: &NotificationListParams,
    ) -> Result<Vec<Notification>, AppError> {
        Ok(store.list_notifications(user_id, params.limit()).await?)
    }

    #[instrument(skip(store))]
    pub async fn unread_count(
        store: &dyn CampusStore,
        user_id: UserId,
    ) -> Result<UnreadCountResponse, AppError> {
        let count = store.unread_notification_count(user_id).await?;
        Ok(UnreadCountResponse { count })
    }

    /// Someone else's notification is reported as missing, not forbidden.
    #[instrument(skip(store))]
    pub async fn mark_read(
        store: &dyn CampusStore,
        user_id: UserId,
        id: NotificationId,
    ) -> Result<(), AppError> {
        if store.mark_notification_read(id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found(anyhow::anyhow!("Notification not found")))
        }
    }

    #[instrument(skip(store))]
    pub async fn mark_all_read(
        store: &dyn CampusStore,
        user_id: UserId,
    ) -> Result<MarkAllReadResponse, AppError> {
        let updated = store.mark_all_notifications_read(user_id).await?;
        Ok(MarkAllReadResponse { updated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hallpass_db::MemoryStore;
    use hallpass_models::{NewNotification, NotificationCategory};

    async fn notify(store: &MemoryStore, user_id: UserId, title: &str) -> Notification {
        store
            .create_notification(NewNotification {
                user_id,
                title: title.to_string(),
                message: "message".to_string(),
                category: NotificationCategory::System,
                related_id: None,
            })
            .await
            .unwrap()
    }

    async fn unread(store: &MemoryStore, user_id: UserId) -> i64 {
        NotificationService::unread_count(store, user_id)
            .await
            .unwrap()
            .count
    }

    #[tokio::test]
    async fn test_inbox_is_per_recipient() {
        let store = MemoryStore::new();
        let me = UserId::new();
        let other = UserId::new();
        notify(&store, me, "one").await;
        notify(&store, me, "two").await;
        notify(&store, other, "theirs").await;

        let params = NotificationListParams::default();
        let mine = NotificationService::list(&store, me, &params)
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|n| n.user_id == me));

        let params = NotificationListParams { limit: Some(1) };
        let limited = NotificationService::list(&store, me, &params)
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_mark_read_flow() {
        let store = MemoryStore::new();
        let me = UserId::new();
        let first = notify(&store, me, "one").await;
        notify(&store, me, "two").await;
        notify(&store, me, "three").await;

        assert_eq!(unread(&store, me).await, 3);

        NotificationService::mark_read(&store, me, first.id)
            .await
            .unwrap();
        assert_eq!(unread(&store, me).await, 2);

        let all = NotificationService::mark_all_read(&store, me)
            .await
            .unwrap();
        assert_eq!(all.updated, 2);
        assert_eq!(unread(&store, me).await, 0);
    }

    #[tokio::test]
    async fn test_cannot_mark_someone_elses_notification() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let theirs = notify(&store, owner, "private").await;

        let err = NotificationService::mark_read(&store, UserId::new(), theirs.id)
            .await
            .unwrap_err();
        assert_eq!(err.status, 404);
        assert_eq!(unread(&store, owner).await, 1);
    }
}
