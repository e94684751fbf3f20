//! Capture eligibility for pre-authorized payments
//!
//! A hold can be captured once the client confirms the visit, or once the
//! provider has marked it complete and a day has passed without a client
//! response. Card holds lapse after seven days, so nothing is capturable
//! after that.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Card pre-authorizations lapse after this many hours
pub const PREAUTH_EXPIRY_HOURS: i64 = 168;

/// Provider completion auto-confirms after this many hours
pub const AUTO_CONFIRM_HOURS: i64 = 24;

/// Why a booking is (or is not) capturable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureReason {
    PreauthorizationExpired,
    ClientConfirmed,
    AutoConfirmed,
    AwaitingClientConfirmation,
    ProviderNotCompleted,
}

impl CaptureReason {
    /// Human readable explanation
    pub const fn message(&self) -> &'static str {
        match self {
            Self::PreauthorizationExpired => "pre-authorization expired",
            Self::ClientConfirmed => "client confirmed",
            Self::AutoConfirmed => "auto-confirmed",
            Self::AwaitingClientConfirmation => "awaiting client confirmation or 24h delay",
            Self::ProviderNotCompleted => "provider has not marked completion",
        }
    }
}

impl std::fmt::Display for CaptureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of a capture-eligibility evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaptureDecision {
    pub eligible: bool,
    pub reason: CaptureReason,
}

impl CaptureDecision {
    const fn eligible(reason: CaptureReason) -> Self {
        Self {
            eligible: true,
            reason,
        }
    }

    const fn rejected(reason: CaptureReason) -> Self {
        Self {
            eligible: false,
            reason,
        }
    }
}

/// Decide whether a booking's hold may be captured at `now`.
///
/// Elapsed time is measured from `scheduled_at`. Rules apply in order and
/// the first match wins.
pub fn evaluate_capture(
    scheduled_at: DateTime<Utc>,
    provider_completed: bool,
    client_confirmed: bool,
    now: DateTime<Utc>,
) -> CaptureDecision {
    let elapsed = now - scheduled_at;

    if elapsed > Duration::hours(PREAUTH_EXPIRY_HOURS) {
        return CaptureDecision::rejected(CaptureReason::PreauthorizationExpired);
    }
    if client_confirmed {
        return CaptureDecision::eligible(CaptureReason::ClientConfirmed);
    }
    if provider_completed && elapsed > Duration::hours(AUTO_CONFIRM_HOURS) {
        return CaptureDecision::eligible(CaptureReason::AutoConfirmed);
    }
    if provider_completed {
        return CaptureDecision::rejected(CaptureReason::AwaitingClientConfirmation);
    }
    CaptureDecision::rejected(CaptureReason::ProviderNotCompleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_expired_wins_over_confirmation() {
        let now = t0() + Duration::hours(169);
        let decision = evaluate_capture(t0(), true, true, now);
        assert!(!decision.eligible);
        assert_eq!(decision.reason, CaptureReason::PreauthorizationExpired);
    }

    #[test]
    fn test_exactly_seven_days_is_not_expired() {
        let now = t0() + Duration::hours(168);
        let decision = evaluate_capture(t0(), false, true, now);
        assert!(decision.eligible);
    }

    #[test]
    fn test_client_confirmed_is_eligible_immediately() {
        let decision = evaluate_capture(t0(), false, true, t0());
        assert_eq!(decision, CaptureDecision::eligible(CaptureReason::ClientConfirmed));
    }

    #[test]
    fn test_provider_completed_waits_a_day() {
        let at_24h = evaluate_capture(t0(), true, false, t0() + Duration::hours(24));
        assert!(!at_24h.eligible);
        assert_eq!(at_24h.reason, CaptureReason::AwaitingClientConfirmation);

        let after = evaluate_capture(
            t0(),
            true,
            false,
            t0() + Duration::hours(24) + Duration::seconds(1),
        );
        assert!(after.eligible);
        assert_eq!(after.reason, CaptureReason::AutoConfirmed);
    }

    #[test]
    fn test_nothing_done_is_not_eligible() {
        let decision = evaluate_capture(t0(), false, false, t0() + Duration::hours(48));
        assert_eq!(decision.reason, CaptureReason::ProviderNotCompleted);
        assert_eq!(
            decision.reason.to_string(),
            "provider has not marked completion"
        );
    }
}
