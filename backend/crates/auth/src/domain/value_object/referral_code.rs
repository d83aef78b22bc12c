//! Referral Code Value Object
//!
//! Human-shareable code of the form `XXX-YYYYYY`:
//! - prefix: first three alphanumeric characters of the owner's name,
//!   uppercased (`REF` when the name has fewer than three)
//! - suffix: six uppercase hex characters from the OS RNG
//!
//! Uniqueness is enforced by the repository, not here.

use serde::{Deserialize, Serialize};
use std::fmt;

const PREFIX_LEN: usize = 3;
const FALLBACK_PREFIX: &str = "REF";
/// Random bytes behind the six hex characters
const SUFFIX_BYTES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferralCode(String);

impl ReferralCode {
    /// Generate a fresh candidate code for `name`
    pub fn generate(name: &str) -> Self {
        let prefix = Self::prefix_for(name);
        let suffix = platform::crypto::random_hex(SUFFIX_BYTES).to_uppercase();
        Self(format!("{}-{}", prefix, suffix))
    }

    fn prefix_for(name: &str) -> String {
        let prefix: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(PREFIX_LEN)
            .collect::<String>()
            .to_uppercase();

        if prefix.len() < PREFIX_LEN {
            FALLBACK_PREFIX.to_string()
        } else {
            prefix
        }
    }

    /// Normalize user input for lookup; `None` when blank
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim();
        if code.is_empty() {
            None
        } else {
            Some(Self(code.to_uppercase()))
        }
    }

    /// Create from database value
    pub fn from_db(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferralCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReferralCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
