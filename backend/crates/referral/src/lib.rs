//! Referral Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, commission rules, repository traits
//! - `application/` - Use cases, dashboards, notifications
//! - `infra/` - PostgreSQL and in-memory repositories, Paystack client
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! ## Features
//! - Student registration, credited to a referrer by code when one applies
//! - Commission per course (percentage or flat)
//! - Referral link click tracking
//! - Referrer dashboard and payout requests
//! - Admin dashboard (cached), referral decisions, referrer blocking
//!
//! ## Money
//! All amounts are whole naira in `i64`. Rejected referrals earn nothing.
//! A referrer can withdraw pending earnings minus pending payouts.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{PaystackConfig, ReferralConfig};
pub use application::dashboard::StatsCache;
pub use domain::commission::{CommissionPolicy, CourseCatalog};
pub use domain::repository::ReferralStore;
pub use error::{ReferralError, ReferralResult};
pub use infra::{MemoryReferralRepository, PaystackClient, PgReferralRepository};
pub use presentation::handlers::ReferralAppState;
pub use presentation::router::{admin_router, bank_router, student_router, user_router};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::presentation::dto::*;
}
