//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random tokens, SHA-256)
//! - Password hashing (Argon2id)
//! - Client identification for rate limiting and analytics
//! - Key-value store abstraction (Redis, in-memory)
//! - Fixed-window rate limiting middleware
//! - Outbound mail (SMTP, best effort)

pub mod client;
pub mod crypto;
pub mod kv;
pub mod mail;
pub mod password;
pub mod rate_limit;
