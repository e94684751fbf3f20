//! Property-based tests for capture eligibility
//!
//! These pin down the ordering of the capture rules:
//! - Expired holds are never capturable, whatever the flags say
//! - Client confirmation is sufficient inside the hold window
//! - Provider completion alone needs strictly more than 24 hours

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use tidyhome_types::{evaluate_capture, CaptureReason};

// ============================================================================
// Strategies
// ============================================================================

/// Booking times spread over a few years
fn arb_scheduled_at() -> impl Strategy<Value = DateTime<Utc>> {
    (1_600_000_000i64..1_900_000_000i64).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

/// Offsets (seconds) at or after 169 hours
fn arb_expired_offset() -> impl Strategy<Value = i64> {
    (169 * 3600i64)..(169 * 3600 + 365 * 24 * 3600)
}

/// Offsets (seconds) inside the seven-day hold window
fn arb_window_offset() -> impl Strategy<Value = i64> {
    (-48 * 3600i64)..=(168 * 3600)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: nothing is capturable at T+169h or later
    #[test]
    fn prop_expired_never_eligible(
        scheduled in arb_scheduled_at(),
        offset in arb_expired_offset(),
        provider in any::<bool>(),
        client in any::<bool>(),
    ) {
        let decision = evaluate_capture(scheduled, provider, client, scheduled + Duration::seconds(offset));
        prop_assert!(!decision.eligible);
        prop_assert_eq!(decision.reason, CaptureReason::PreauthorizationExpired);
    }

    /// Property: client confirmation inside the window is always eligible
    #[test]
    fn prop_client_confirmed_eligible_in_window(
        scheduled in arb_scheduled_at(),
        offset in arb_window_offset(),
        provider in any::<bool>(),
    ) {
        let decision = evaluate_capture(scheduled, provider, true, scheduled + Duration::seconds(offset));
        prop_assert!(decision.eligible);
        prop_assert_eq!(decision.reason, CaptureReason::ClientConfirmed);
    }

    /// Property: provider-only completion flips exactly after 24 hours
    #[test]
    fn prop_provider_only_needs_more_than_a_day(
        scheduled in arb_scheduled_at(),
        offset in arb_window_offset(),
    ) {
        let decision = evaluate_capture(scheduled, true, false, scheduled + Duration::seconds(offset));
        prop_assert_eq!(decision.eligible, offset > 24 * 3600);
    }

    /// Property: without any completion signal nothing is capturable
    #[test]
    fn prop_no_signal_never_eligible(
        scheduled in arb_scheduled_at(),
        offset in arb_window_offset(),
    ) {
        let decision = evaluate_capture(scheduled, false, false, scheduled + Duration::seconds(offset));
        prop_assert!(!decision.eligible);
        prop_assert_eq!(decision.reason, CaptureReason::ProviderNotCompleted);
    }
}
