use std::fmt;
use std::sync::Arc;

use hallpass_config::{
    CorsConfig, DatabaseConfig, EmailConfig, JwtConfig, NotificationConfig, ServerConfig,
};
use hallpass_db::{CampusStore, StoreError, build_store};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::modules::notifications::dispatcher::NotificationDispatcher;
use crate::utils::email::{Mailer, mailer_from_config};

/// Everything read from the environment at startup.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub email: EmailConfig,
    pub cors: CorsConfig,
    pub notifications: NotificationConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig::from_env(),
            jwt: JwtConfig::from_env(),
            email: EmailConfig::from_env(),
            cors: CorsConfig::from_env(),
            notifications: NotificationConfig::from_env(),
            server: ServerConfig::from_env(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CampusStore>,
    pub jwt_config: JwtConfig,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
    pub notification_config: NotificationConfig,
    pub notifications: NotificationDispatcher,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("jwt_config", &"<redacted>")
            .field("email_enabled", &self.email_config.enabled)
            .field("cors_config", &self.cors_config)
            .field("notifications", &self.notifications)
            .field("metrics", &self.metrics_handle.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Builds the state around an existing store and starts the notification
    /// worker. Must be called inside a Tokio runtime.
    pub fn new(store: Arc<dyn CampusStore>, mailer: Arc<dyn Mailer>, config: &AppConfig) -> Self {
        let (notifications, _worker) = NotificationDispatcher::start(
            store.clone(),
            mailer,
            config.notifications.queue_capacity,
        );

        Self {
            store,
            jwt_config: config.jwt.clone(),
            email_config: config.email.clone(),
            cors_config: config.cors.clone(),
            notification_config: config.notifications.clone(),
            notifications,
            metrics_handle: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics_handle = handle;
        self
    }
}

/// Connects the configured store and mailer.
pub async fn init_app_state(config: &AppConfig) -> Result<AppState, StoreError> {
    let store = build_store(&config.database).await?;
    let mailer = mailer_from_config(&config.email);
    Ok(AppState::new(store, mailer, config))
}
