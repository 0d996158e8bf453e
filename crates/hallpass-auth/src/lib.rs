//! # Hallpass Auth
//!
//! JWT claims and token utilities for the Hallpass API.
//!
//! - [`claims`]: Access token claims (subject, email, role)
//! - [`jwt`]: Token creation and verification

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
