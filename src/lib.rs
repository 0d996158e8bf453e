//! # Hallpass API
//!
//! A REST API built with Rust, Axum, and PostgreSQL for campus leave and
//! attendance management.
//!
//! ## Overview
//!
//! Four roles share one API:
//!
//! - **Students** apply for leave and follow their own attendance
//! - **Faculty** mark attendance and decide leave for their department
//! - **Wardens** decide leave for residents of their hostel
//! - **Admins** see and act on everything; they are created from the CLI only
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/       # Auth extractors, role guards, scope resolver
//! ├── modules/          # Feature modules
//! │   ├── auth/         # Registration and login
//! │   ├── users/        # Profiles, user listing, role dashboards
//! │   ├── leaves/       # Leave workflow (apply, list, approve, reject)
//! │   ├── attendance/   # Attendance ledger and statistics
//! │   └── notifications/# Inbox, background dispatcher, reminders
//! └── utils/            # Email delivery
//! ```
//!
//! Each feature module follows a consistent structure:
//!
//! - `controller.rs`: HTTP handlers
//! - `service.rs`: Business logic against the [`CampusStore`](hallpass_db::CampusStore)
//! - `model.rs`: DTOs and entities (re-exported from `hallpass-models`)
//! - `router.rs`: Axum router configuration
//!
//! ## Scope Rules
//!
//! ```text
//! admin    -> every record
//! student  -> own records, never decides leave
//! faculty  -> records of their department
//! warden   -> records of their hostel (denied when either hostel is unset)
//! ```
//!
//! ## Leave Lifecycle
//!
//! ```text
//! pending --approve--> approved
//!         --reject---> rejected
//! ```
//!
//! Both outcomes are terminal. Deciding a request twice returns `409 Conflict`.
//!
//! ## Configuration
//!
//! Configuration is read from the environment (`.env` is loaded at startup).
//! See `hallpass-config` for the full list of variables.

pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;

// Re-export workspace crates for convenience
pub use hallpass_auth;
pub use hallpass_config;
pub use hallpass_core;
pub use hallpass_db;
pub use hallpass_models;
