//! Person Name Value Object
//!
//! 表示用の氏名。ログイン識別子ではないため、文字種の制限は設けない。
//!
//! ## 不変条件
//! - NFKC正規化 → 前後の空白除去 → 検証 の順で処理
//! - 長さ: 2〜100文字（正規化後）
//! - 制御文字禁止

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

pub const PERSON_NAME_MIN_LENGTH: usize = 2;
pub const PERSON_NAME_MAX_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName(String);

impl PersonName {
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let normalized: String = raw.as_ref().nfkc().collect();
        let name = normalized.trim();

        if name.is_empty() {
            return Err(AppError::bad_request("name is required"));
        }

        let len = name.chars().count();
        if len < PERSON_NAME_MIN_LENGTH {
            return Err(AppError::bad_request(format!(
                "name must be at least {} characters",
                PERSON_NAME_MIN_LENGTH
            )));
        }
        if len > PERSON_NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "name must be at most {} characters",
                PERSON_NAME_MAX_LENGTH
            )));
        }

        if name.chars().any(char::is_control) {
            return Err(AppError::bad_request("name contains invalid characters"));
        }

        Ok(Self(name.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Contact phone number; free-form but required
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone(String);

pub const PHONE_MAX_LENGTH: usize = 32;

impl Phone {
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let phone = raw.as_ref().trim();
        if phone.is_empty() {
            return Err(AppError::bad_request("phone is required"));
        }
        if phone.chars().count() > PHONE_MAX_LENGTH {
            return Err(AppError::bad_request("phone is too long"));
        }
        Ok(Self(phone.to_string()))
    }

    pub fn from_db(phone: impl Into<String>) -> Self {
        Self(phone.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_trimmed() {
        let name = PersonName::new("  John Doe ").unwrap();
        assert_eq!(name.as_str(), "John Doe");
    }

    #[test]
    fn test_name_nfkc() {
        // 全角英字は半角に正規化される
        let name = PersonName::new("Ｊｏｈｎ").unwrap();
        assert_eq!(name.as_str(), "John");
    }

    #[test]
    fn test_name_length() {
        assert_eq!(PersonName::new("").unwrap_err().message(), "name is required");
        assert_eq!(
            PersonName::new("J").unwrap_err().message(),
            "name must be at least 2 characters"
        );
        assert!(PersonName::new("x".repeat(101)).is_err());
        assert!(PersonName::new("Jo").is_ok());
    }

    #[test]
    fn test_name_control_chars() {
        assert!(PersonName::new("Jo\u{0007}hn").is_err());
    }

    #[test]
    fn test_phone() {
        assert_eq!(Phone::new(" +2348012345678 ").unwrap().as_str(), "+2348012345678");
        assert_eq!(Phone::new("  ").unwrap_err().message(), "phone is required");
        assert!(Phone::new("1".repeat(33)).is_err());
    }
}
