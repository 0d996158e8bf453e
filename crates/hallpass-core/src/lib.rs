//! # Hallpass Core
//!
//! Core types, errors, and utilities for the Hallpass API.
//!
//! This crate provides foundational types used throughout the application:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`dates`]: Calendar helpers shared by the leave and attendance workflows
//! - [`pagination`]: Pagination utilities for API responses
//! - [`password`]: Password hashing and verification
//! - [`serde`]: Custom serde deserialization helpers
//!
//! # Example
//!
//! ```ignore
//! use hallpass_core::errors::AppError;
//! use hallpass_core::dates::inclusive_day_count;
//!
//! let error = AppError::not_found(anyhow::anyhow!("Leave request not found"));
//! let days = inclusive_day_count(start, end);
//! ```

pub mod dates;
pub mod errors;
pub mod pagination;
pub mod password;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorKind};
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
