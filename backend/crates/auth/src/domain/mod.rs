//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    reset_token::PasswordResetToken,
    user::{BankDetails, ProfileUpdate, User},
};
pub use repository::{AuthStore, ResetTokenRepository, UserRepository};
pub use value_object::{
    email::Email,
    person_name::{PersonName, Phone},
    referral_code::ReferralCode,
    user_id::UserId,
    user_role::UserRole,
};
