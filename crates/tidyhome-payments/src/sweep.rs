//! Scheduled auto-capture sweep
//!
//! Runs from cron. Selection is by local status, but the action is decided
//! by the PaymentIntent's live status at Stripe, so re-running after a crash
//! picks up exactly the bookings that were not finished.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use tidyhome_types::{Booking, PaymentStatus, AUTO_CONFIRM_HOURS};

use crate::{PaymentError, PaymentService};

/// What the sweep did with one booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepAction {
    Captured,
    AlreadyCaptured,
    Cancelled,
    Skipped,
    Failed,
}

/// Per-booking sweep outcome
#[derive(Debug, Clone, Serialize)]
pub struct SweepItem {
    pub booking_id: String,
    pub payment_intent_id: String,
    pub action: SweepAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Sweep summary
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub processed: usize,
    pub captured: usize,
    pub cancelled: usize,
    pub failed: usize,
    pub results: Vec<SweepItem>,
}

impl SweepReport {
    fn push(&mut self, item: SweepItem) {
        self.processed += 1;
        match item.action {
            SweepAction::Captured | SweepAction::AlreadyCaptured => self.captured += 1,
            SweepAction::Cancelled => self.cancelled += 1,
            SweepAction::Failed => self.failed += 1,
            SweepAction::Skipped => {}
        }
        self.results.push(item);
    }
}

impl PaymentService {
    /// Capture every confirmed or auto-confirmable hold, one at a time
    #[instrument(skip(self, now))]
    pub async fn run_auto_capture(&self, now: DateTime<Utc>) -> Result<SweepReport, PaymentError> {
        let cutoff = now - Duration::hours(AUTO_CONFIRM_HOURS);
        let rows = self.bookings.find_capture_candidates(cutoff).await?;
        info!(candidates = rows.len(), "Auto-capture sweep started");

        let mut report = SweepReport::default();
        for row in rows {
            let booking = match Booking::try_from(row) {
                Ok(booking) => booking,
                Err(e) => {
                    error!(error = %e, "Skipping undecodable booking row");
                    continue;
                }
            };
            let Some(pi) = booking.payment_intent_id.clone() else {
                continue;
            };

            let item = match self.sweep_one(&booking, &pi, now).await {
                Ok(action) => SweepItem {
                    booking_id: booking.id.to_string(),
                    payment_intent_id: pi,
                    action,
                    detail: None,
                },
                Err(e) => {
                    warn!(booking_id = %booking.id, error = %e, "Auto-capture failed");
                    SweepItem {
                        booking_id: booking.id.to_string(),
                        payment_intent_id: pi,
                        action: SweepAction::Failed,
                        detail: Some(e.to_string()),
                    }
                }
            };
            report.push(item);
        }

        metrics::counter!("payments_captured_total", "trigger" => "sweep")
            .increment(report.captured as u64);
        info!(
            processed = report.processed,
            captured = report.captured,
            cancelled = report.cancelled,
            failed = report.failed,
            "Auto-capture sweep finished"
        );
        Ok(report)
    }

    async fn sweep_one(
        &self,
        booking: &Booking,
        payment_intent_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SweepAction, PaymentError> {
        let intent = self.provider.retrieve_payment_intent(payment_intent_id).await?;

        match intent.status.as_str() {
            "requires_capture" => {
                if booking.payment_status == PaymentStatus::ProviderCompleted {
                    self.bookings
                        .update_status(booking.id.0, PaymentStatus::AutoConfirmed, now)
                        .await?;
                }
                self.provider.capture_payment_intent(payment_intent_id).await?;
                self.bookings
                    .update_status(booking.id.0, PaymentStatus::Captured, now)
                    .await?;
                Ok(SweepAction::Captured)
            }
            "succeeded" => {
                self.bookings
                    .update_status(booking.id.0, PaymentStatus::Captured, now)
                    .await?;
                Ok(SweepAction::AlreadyCaptured)
            }
            "canceled" => {
                self.bookings
                    .update_status(booking.id.0, PaymentStatus::Cancelled, now)
                    .await?;
                Ok(SweepAction::Cancelled)
            }
            _ => Ok(SweepAction::Skipped),
        }
    }
}
