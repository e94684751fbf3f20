//! Common error types

use thiserror::Error;

/// Errors raised while parsing or validating domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Unknown payment status string
    #[error("invalid payment status: {0}")]
    InvalidPaymentStatus(String),

    /// Unknown subscription status string
    #[error("invalid subscription status: {0}")]
    InvalidSubscriptionStatus(String),

    /// Unknown billing frequency
    #[error("invalid frequency: {0}")]
    InvalidFrequency(String),

    /// Pricing input out of range
    #[error("invalid pricing input: {0}")]
    InvalidPricing(&'static str),
}
