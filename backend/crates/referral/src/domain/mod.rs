//! Domain Layer
//!
//! Contains entities, commission rules, and repository traits.

pub mod commission;
pub mod entity;
pub mod repository;

// Re-exports
pub use commission::{CommissionPolicy, CourseCatalog};
pub use entity::{
    click::Click,
    payout::{Payout, PayoutRequestOutcome, PayoutStatus},
    referral::{NewStudent, Referral, ReferralRecord, ReferralStatus},
    stats::{PayoutTotals, PlatformStats, ReferrerStats, ReferrerSummary},
};
pub use repository::{
    ClickRepository, PayoutRepository, ReferralRepository, ReferralStore, Transition,
};
