//! In-app notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::ids::{NotificationId, UserId};

pub const DEFAULT_NOTIFICATION_LIMIT: i64 = 20;
pub const MAX_NOTIFICATION_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "notification_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    LeaveStatus,
    LeaveReminder,
    Attendance,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub category: NotificationCategory,
    pub is_read: bool,
    /// The leave request for leave events.
    #[schema(value_type = Option<String>, format = "uuid")]
    pub related_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub category: NotificationCategory,
    pub related_id: Option<Uuid>,
}

fn deserialize_limit<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse::<i64>().ok()))
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationListParams {
    /// Newest first, default 20. Unparseable values fall back to the default.
    #[serde(default, deserialize_with = "deserialize_limit")]
    pub limit: Option<i64>,
}

impl NotificationListParams {
    pub fn limit(&self) -> i64 {
        match self.limit {
            Some(n) if n > 0 => n.min(MAX_NOTIFICATION_LIMIT),
            _ => DEFAULT_NOTIFICATION_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        assert_eq!(
            serde_json::to_string(&NotificationCategory::LeaveReminder).unwrap(),
            r#""leave_reminder""#
        );
    }

    #[test]
    fn test_limit_defaults_and_caps() {
        let parse = |json: &str| serde_json::from_str::<NotificationListParams>(json).unwrap();
        assert_eq!(parse("{}").limit(), 20);
        assert_eq!(parse(r#"{"limit":"abc"}"#).limit(), 20);
        assert_eq!(parse(r#"{"limit":"0"}"#).limit(), 20);
        assert_eq!(parse(r#"{"limit":"5"}"#).limit(), 5);
        assert_eq!(parse(r#"{"limit":"500"}"#).limit(), 100);
    }
}
