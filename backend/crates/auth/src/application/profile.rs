//! Profile Use Cases

use std::sync::Arc;

use crate::domain::entity::user::{ProfileUpdate, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    person_name::{PersonName, Phone},
    user_id::UserId,
};
use crate::error::{AuthError, AuthResult};

/// Raw PATCH body; absent fields are left unchanged
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_name: Option<String>,
}

pub struct ProfileUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> ProfileUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn get(&self, user_id: &UserId) -> AuthResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn update(&self, user_id: &UserId, input: UpdateProfileInput) -> AuthResult<User> {
        let update = ProfileUpdate {
            name: input.name.map(PersonName::new).transpose()?,
            phone: input.phone.map(Phone::new).transpose()?,
            bank_name: input.bank_name,
            account_number: input.account_number,
            account_name: input.account_name,
        };

        let mut user = self.get(user_id).await?;
        user.apply(update);
        self.user_repo.update_profile(&user).await?;

        tracing::info!(user_id = %user.user_id, "Profile updated");
        Ok(user)
    }
}
