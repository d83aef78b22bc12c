//! Seed Admin Use Case
//!
//! Ensures the configured administrator account exists at startup.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::register::create_with_unique_code;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    person_name::{PersonName, Phone},
    referral_code::ReferralCode,
    user_role::UserRole,
};
use crate::error::AuthResult;

pub struct SeedAdminInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

pub struct SeedAdminUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> SeedAdminUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// Returns `true` when an account was created; an existing account with
    /// the same email is left untouched
    pub async fn execute(&self, input: SeedAdminInput) -> AuthResult<bool> {
        let email = Email::new(input.email)?;

        if self.user_repo.exists_by_email(&email).await? {
            tracing::info!(email = %email, "Admin account already exists");
            return Ok(false);
        }

        let password_hash = ClearTextPassword::new(input.password)?.hash()?;
        let name = PersonName::new(&input.name)?;

        let user = User::new(
            email,
            password_hash,
            name,
            Phone::from_db(""),
            UserRole::Admin,
            ReferralCode::generate(&input.name),
        );
        let user = create_with_unique_code(self.user_repo.as_ref(), user).await?;

        tracing::info!(user_id = %user.user_id, email = %user.email, "Admin account created");
        Ok(true)
    }
}
