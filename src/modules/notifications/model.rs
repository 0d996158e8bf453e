pub use hallpass_models::notifications::{
    MarkAllReadResponse, NewNotification, Notification, NotificationCategory,
    NotificationListParams, UnreadCountResponse,
};
