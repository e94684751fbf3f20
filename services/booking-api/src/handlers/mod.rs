//! REST API handlers

pub mod blog;
pub mod bookings;
pub mod checkout;
pub mod health;
pub mod shared;
pub mod static_files;
pub mod subscription;
pub mod sweep;
pub mod webhook;

pub use blog::*;
pub use bookings::*;
pub use checkout::*;
pub use health::*;
pub use static_files::*;
pub use subscription::*;
pub use sweep::*;
pub use webhook::*;
