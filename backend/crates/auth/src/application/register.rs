//! Register Use Case
//!
//! Creates a referrer account and signs it in.

use std::sync::Arc;

use platform::mail::Mailer;
use platform::password::ClearTextPassword;

use crate::application::{emails, tokens::TokenManager, AuthOutput};
use crate::domain::entity::user::{BankDetails, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    person_name::{PersonName, Phone},
    referral_code::ReferralCode,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult, UniqueField};

/// Attempts at finding an unused referral code before giving up
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_name: Option<String>,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    tokens: Arc<TokenManager>,
    mailer: Mailer,
}

impl<U> RegisterUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, tokens: Arc<TokenManager>, mailer: Mailer) -> Self {
        Self {
            user_repo,
            tokens,
            mailer,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<AuthOutput> {
        let email = Email::new(input.email)?;
        let password = ClearTextPassword::new(input.password)?;
        let name = PersonName::new(&input.name)?;
        let phone = Phone::new(&input.phone)?;
        let bank = BankDetails::new(input.bank_name, input.account_number, input.account_name);

        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = password.hash()?;

        let user = User::new(
            email,
            password_hash,
            name,
            phone,
            UserRole::User,
            ReferralCode::generate(&input.name),
        )
        .with_bank(bank);
        let user = create_with_unique_code(self.user_repo.as_ref(), user).await?;

        let tokens = self.tokens.issue_pair(&user)?;

        self.mailer.dispatch(emails::welcome(&user));

        tracing::info!(
            user_id = %user.user_id,
            referral_code = %user.referral_code,
            "User registered"
        );

        Ok(AuthOutput { tokens, user })
    }
}

/// Insert `user`, drawing a fresh referral code whenever the current one is taken
///
/// A concurrent insert can still claim the code between the existence check
/// and the insert; the unique constraint catches that and the loop draws again.
/// An email collision at insert time means another request registered first.
pub(crate) async fn create_with_unique_code<U>(user_repo: &U, mut user: User) -> AuthResult<User>
where
    U: UserRepository,
{
    for attempt in 1..=MAX_CODE_ATTEMPTS {
        if attempt > 1 {
            user.referral_code = ReferralCode::generate(user.name.as_str());
        }

        if user_repo.exists_by_referral_code(&user.referral_code).await? {
            tracing::debug!(attempt, code = %user.referral_code, "Referral code collision");
            continue;
        }

        match user_repo.create(&user).await {
            Ok(()) => return Ok(user),
            Err(AuthError::Duplicate(UniqueField::ReferralCode)) => {
                tracing::debug!(attempt, "Referral code taken during insert");
            }
            Err(AuthError::Duplicate(UniqueField::Email)) => return Err(AuthError::EmailTaken),
            Err(e) => return Err(e),
        }
    }

    tracing::warn!(
        attempts = MAX_CODE_ATTEMPTS,
        "Could not allocate a unique referral code"
    );
    Err(AuthError::Internal(
        "could not allocate a unique referral code".to_string(),
    ))
}
