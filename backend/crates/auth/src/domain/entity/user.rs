//! User Entity
//!
//! A registered referrer or administrator.

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;

use crate::domain::value_object::{
    email::Email,
    person_name::{PersonName, Phone},
    referral_code::ReferralCode,
    user_id::UserId,
    user_role::UserRole,
};

/// Payout destination; every field optional until the user fills it in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankDetails {
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_name: Option<String>,
}

impl BankDetails {
    /// Build from raw input; blank strings count as absent
    pub fn new(
        bank_name: Option<String>,
        account_number: Option<String>,
        account_name: Option<String>,
    ) -> Self {
        Self {
            bank_name: non_blank(bank_name),
            account_number: non_blank(account_number),
            account_name: non_blank(account_name),
        }
    }

    /// All three fields present
    pub fn is_complete(&self) -> bool {
        self.bank_name.is_some() && self.account_number.is_some() && self.account_name.is_some()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Login identifier (unique, lowercased)
    pub email: Email,
    pub password_hash: HashedPassword,
    pub name: PersonName,
    pub phone: Phone,
    pub role: UserRole,
    pub bank: BankDetails,
    /// Unique, immutable after creation
    pub referral_code: ReferralCode,
    /// Blocked users cannot authenticate and are not credited for referrals
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<PersonName>,
    pub phone: Option<Phone>,
    /// Blank strings clear the field
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_name: Option<String>,
}

impl User {
    pub fn new(
        email: Email,
        password_hash: HashedPassword,
        name: PersonName,
        phone: Phone,
        role: UserRole,
        referral_code: ReferralCode,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            email,
            password_hash,
            name,
            phone,
            role,
            bank: BankDetails::default(),
            referral_code,
            is_blocked: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_bank(mut self, bank: BankDetails) -> Self {
        self.bank = bank;
        self
    }

    /// Apply a profile update
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if update.bank_name.is_some() {
            self.bank.bank_name = non_blank(update.bank_name);
        }
        if update.account_number.is_some() {
            self.bank.account_number = non_blank(update.account_number);
        }
        if update.account_name.is_some() {
            self.bank.account_name = non_blank(update.account_name);
        }
        self.updated_at = Utc::now();
    }

    pub fn set_blocked(&mut self, blocked: bool) {
        self.is_blocked = blocked;
        self.updated_at = Utc::now();
    }

    pub fn set_password(&mut self, password_hash: HashedPassword) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::ClearTextPassword;

    fn user() -> User {
        User::new(
            Email::new("john@example.com").unwrap(),
            ClearTextPassword::new("password123".to_string())
                .unwrap()
                .hash()
                .unwrap(),
            PersonName::new("John Doe").unwrap(),
            Phone::new("08012345678").unwrap(),
            UserRole::User,
            ReferralCode::generate("John Doe"),
        )
    }

    #[test]
    fn test_new_user_defaults() {
        let user = user();
        assert!(!user.is_blocked);
        assert_eq!(user.role, UserRole::User);
        assert!(!user.bank.is_complete());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut user = user();
        user.apply(ProfileUpdate {
            phone: Some(Phone::new("0909").unwrap()),
            bank_name: Some("GTBank".into()),
            account_number: Some("0123456789".into()),
            account_name: Some("John Doe".into()),
            ..Default::default()
        });

        assert_eq!(user.name.as_str(), "John Doe");
        assert_eq!(user.phone.as_str(), "0909");
        assert!(user.bank.is_complete());

        user.apply(ProfileUpdate {
            bank_name: Some("  ".into()),
            ..Default::default()
        });
        assert_eq!(user.bank.bank_name, None);
        assert_eq!(user.bank.account_number.as_deref(), Some("0123456789"));
    }

    #[test]
    fn test_bank_details_blank_is_absent() {
        let bank = BankDetails::new(Some("".into()), Some(" 0123 ".into()), None);
        assert_eq!(bank.bank_name, None);
        assert_eq!(bank.account_number.as_deref(), Some("0123"));
    }
}
