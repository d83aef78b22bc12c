//! Infrastructure Layer
//!
//! Database implementations and the bank API client.

pub mod memory;
pub mod paystack;
pub mod postgres;

pub use memory::MemoryReferralRepository;
pub use paystack::{Bank, PaystackClient, ResolvedAccount};
pub use postgres::PgReferralRepository;
