//! Tidyhome Types - Shared domain types
//!
//! This crate contains domain types used across Tidyhome services:
//! - Bookings, payment status and capture eligibility
//! - Recurring cleaning subscriptions and per-visit pricing
//! - Blog articles

pub mod blog;
pub mod booking;
pub mod eligibility;
pub mod error;
pub mod subscription;

pub use blog::*;
pub use booking::*;
pub use eligibility::*;
pub use error::*;
pub use subscription::*;
