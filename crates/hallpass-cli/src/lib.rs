//! # Hallpass CLI
//!
//! Database seeding utilities for Hallpass development.
//!
//! This library crate provides the seeding functionality used by the CLI binary.
//!
//! ## Usage
//!
//! ```ignore
//! use hallpass_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig::new(vec!["CS".into()], vec!["H1".into()]);
//! seed_all(&pool, config).await?;
//! ```

pub mod seeder;
