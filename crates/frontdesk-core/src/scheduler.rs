//! Overdue detection
//!
//! [`scan_overdue`] is the whole algorithm: a single pass over both
//! registries against one `now` sample. [`OverdueScheduler`] is the thin
//! driver that runs it on a fixed period and hands alerts to a sink.

use chrono::{DateTime, Local};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{AlertSink, DeliveryRegistry, FrontDesk, OverdueAlert, StaffRegistry};

/// Default scan period
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(10);

/// Flag and report every entity that became overdue since the last scan.
///
/// Each entity is visited once. Flagged entities are skipped, so an episode
/// yields at most one alert.
pub fn scan_overdue(
    staff: &mut StaffRegistry,
    deliveries: &mut DeliveryRegistry,
    now: DateTime<Local>,
) -> Vec<OverdueAlert> {
    let mut alerts = Vec::new();

    for member in staff.iter_mut() {
        let Some(elapsed_minutes) = member.pending_overdue(now) else {
            continue;
        };
        member.mark_notified();

        warn!(
            staff_id = %member.id,
            elapsed_minutes,
            "Staff member overdue"
        );

        alerts.push(OverdueAlert::Staff {
            staff_id: member.id,
            name: member.full_name(),
            photo_ref: member.photo_ref.clone(),
            elapsed_minutes,
        });
    }

    for delivery in deliveries.iter_mut() {
        if !delivery.is_pending_overdue(now) {
            continue;
        }
        delivery.mark_notified();

        warn!(
            delivery_id = %delivery.id,
            expected_return = %delivery.expected_return_display(),
            "Delivery overdue"
        );

        alerts.push(OverdueAlert::Delivery {
            delivery_id: delivery.id,
            name: delivery.full_name(),
            phone: delivery.phone.clone(),
            address: delivery.address.clone(),
            expected_return_display: delivery.expected_return_display().to_string(),
        });
    }

    alerts
}

/// Periodic driver around [`FrontDesk::tick`]
#[derive(Debug, Clone, Copy)]
pub struct OverdueScheduler {
    period: Duration,
}

impl Default for OverdueScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}

impl OverdueScheduler {
    /// A zero period falls back to the default.
    pub fn new(period: Duration) -> Self {
        let period = if period.is_zero() {
            DEFAULT_TICK_PERIOD
        } else {
            period
        };
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run one scan and deliver its alerts. Returns how many were delivered.
    pub fn fire(&self, desk: &mut FrontDesk, now: DateTime<Local>, sink: &dyn AlertSink) -> usize {
        let alerts = desk.tick(now);
        debug!(alerts = alerts.len(), "Overdue scan complete");

        for alert in &alerts {
            sink.deliver(alert);
        }
        alerts.len()
    }
}
