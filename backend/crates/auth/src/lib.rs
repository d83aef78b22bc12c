//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Referrer registration with email + password
//! - Stateless HS256 access/refresh tokens
//! - Password reset via single-use mailed link
//! - Role-based access (User, Admin), exact match only
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (random salt per hash)
//! - Access and refresh tokens signed with separate secrets
//! - Reset tokens stored as SHA-256 digests only
//! - Blocked accounts cannot log in or refresh

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{AuthConfig, TokenConfig};
pub use application::tokens::{Claims, TokenManager};
pub use domain::repository::AuthStore;
pub use error::{AuthError, AuthResult};
pub use infra::{MemoryAuthRepository, PgAuthRepository};
pub use presentation::handlers::AuthAppState;
pub use presentation::router::{auth_router, guard, profile_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
