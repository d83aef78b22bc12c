//! Application Layer
//!
//! Use cases and application services.

pub mod admin;
pub mod config;
pub mod dashboard;
pub mod notify;
pub mod payouts;
pub mod register_student;
pub mod track_click;

// Re-exports
pub use admin::{BlockUserUseCase, ReferralAdminUseCase};
pub use config::{PaystackConfig, ReferralConfig};
pub use dashboard::{
    AdminDashboard, AdminDashboardUseCase, StatsCache, UserDashboard, UserDashboardUseCase,
};
pub use payouts::PayoutUseCase;
pub use register_student::{RegisterStudentInput, RegisterStudentOutput, RegisterStudentUseCase};
pub use track_click::{TrackClickInput, TrackClickUseCase};
