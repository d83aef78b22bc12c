//! Entity Module

pub mod click;
pub mod payout;
pub mod referral;
pub mod stats;
