//! Middleware modules for request processing.
//!
//! - [`auth`]: Bearer token extraction and the [`Actor`](scope::Actor) loader
//! - [`role`]: Role guards as extractors and as route layers
//! - [`scope`]: Record-level view/act decisions
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. `AuthUser` validates the JWT and extracts claims
//! 3. `Actor` loads the caller's current profile and rejects inactive accounts
//! 4. Role guards check the caller's role, services check record scope
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::role::RequireApprover;
//! use crate::middleware::scope::ensure_can_act_on;
//!
//! async fn approve(RequireApprover(actor): RequireApprover, ...) -> Result<_, AppError> {
//!     let leave = load_leave(id).await?;
//!     ensure_can_act_on(&actor, &leave)?;
//!     // ...
//! }
//! ```

pub mod auth;
pub mod role;
pub mod scope;
