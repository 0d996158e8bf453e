#![allow(dead_code)]

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::{NaiveDate, Utc};
use hallpass::hallpass_auth::create_access_token;
use hallpass::hallpass_config::JwtConfig;
use hallpass::hallpass_core::{AppError, hash_password};
use hallpass::hallpass_db::{CampusStore, MemoryStore};
use hallpass::hallpass_models::{NewUser, UserId, UserRole};
use hallpass::router::init_router;
use hallpass::state::{AppConfig, AppState};
use hallpass::utils::email::{Mailer, OutgoingEmail};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";

/// Hashing at the default cost is slow, so every fixture user shares one digest.
fn shared_digest() -> &'static str {
    static DIGEST: OnceLock<String> = OnceLock::new();
    DIGEST.get_or_init(|| hash_password(PASSWORD).unwrap())
}

/// Captures outgoing mail instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub struct TestUser {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
    pub token: String,
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub jwt: JwtConfig,
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.jwt = JwtConfig {
            secret: "integration-test-secret-at-least-32-chars".to_string(),
            access_token_expiry: 3600,
        };

        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let dyn_store: Arc<dyn CampusStore> = store.clone();
        let dyn_mailer: Arc<dyn Mailer> = mailer.clone();
        let state = AppState::new(dyn_store, dyn_mailer, &config);

        Self {
            router: init_router(state),
            store,
            mailer,
            jwt: config.jwt,
        }
    }

    /// Inserts a user straight into the store and mints a token for them.
    pub async fn user(&self, role: UserRole, department: &str, hostel: Option<&str>) -> TestUser {
        let email = unique_email(role.as_str());
        let user = self
            .store
            .create_user(NewUser {
                name: format!("{} {}", role, department),
                email: email.clone(),
                password_hash: shared_digest().to_string(),
                role,
                department: department.to_string(),
                hostel: hostel.map(str::to_string),
                phone: None,
                student_number: None,
            })
            .await
            .unwrap();

        let token = create_access_token(user.id, &user.email, user.role, &self.jwt).unwrap();
        TestUser {
            id: user.id,
            email,
            role,
            token,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(&user.token), None).await
    }

    pub async fn post(&self, uri: &str, user: &TestUser, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(&user.token), Some(body))
            .await
    }

    pub async fn put(&self, uri: &str, user: &TestUser, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(&user.token), Some(body))
            .await
    }

    /// Waits for the background worker to store `expected` notifications.
    pub async fn wait_for_notifications(&self, user_id: UserId, expected: i64) -> bool {
        let store = &self.store;
        for _ in 0..200 {
            if store.unread_notification_count(user_id).await.unwrap() >= expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@campus.edu", prefix, uuid::Uuid::new_v4().simple())
}

/// A calendar day `offset` days from today, as the API expects it.
pub fn days_from_today(offset: i64) -> NaiveDate {
    Utc::now().date_naive() + chrono::Duration::days(offset)
}

pub fn day_str(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}
