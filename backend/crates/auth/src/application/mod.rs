//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod emails;
pub mod login;
pub mod password_reset;
pub mod profile;
pub mod refresh;
pub mod register;
pub mod seed_admin;
pub mod tokens;

use crate::domain::entity::user::User;
use tokens::TokenPair;

/// Result of every sign-in style use case
#[derive(Debug)]
pub struct AuthOutput {
    pub tokens: TokenPair,
    pub user: User,
}

// Re-exports
pub use config::{AuthConfig, TokenConfig};
pub use login::{LoginInput, LoginUseCase};
pub use password_reset::{ForgotPasswordUseCase, ResetPasswordInput, ResetPasswordUseCase};
pub use profile::{ProfileUseCase, UpdateProfileInput};
pub use refresh::RefreshUseCase;
pub use register::{RegisterInput, RegisterUseCase};
pub use seed_admin::{SeedAdminInput, SeedAdminUseCase};
pub use tokens::{Claims, TokenClass, TokenError, TokenManager};
