//! Utility modules for the Hallpass API.
//!
//! - [`email`]: Outgoing mail (SMTP via lettre, or log-only) and templates

pub mod email;
