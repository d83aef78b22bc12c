//! Value Object Module

pub mod email;
pub mod person_name;
pub mod referral_code;
pub mod user_id;
pub mod user_role;
