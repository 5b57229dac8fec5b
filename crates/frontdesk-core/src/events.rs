//! Overdue alerts emitted by the scheduler

use frontdesk_api::EventPayload;
use frontdesk_util::{overdue_message, DeliveryId, StaffId};

/// One overdue notification. At most one is produced per entity per episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverdueAlert {
    Staff {
        staff_id: StaffId,
        name: String,
        photo_ref: String,
        elapsed_minutes: u32,
    },

    Delivery {
        delivery_id: DeliveryId,
        name: String,
        phone: String,
        address: String,
        expected_return_display: String,
    },
}

impl OverdueAlert {
    /// Sentence shown on the notification widget
    pub fn message(&self) -> String {
        match self {
            OverdueAlert::Staff {
                elapsed_minutes, ..
            } => overdue_message(*elapsed_minutes),
            OverdueAlert::Delivery {
                expected_return_display,
                ..
            } => format!("Expected back at {}.", expected_return_display),
        }
    }
}

impl From<OverdueAlert> for EventPayload {
    fn from(alert: OverdueAlert) -> Self {
        let message = alert.message();
        match alert {
            OverdueAlert::Staff {
                staff_id,
                name,
                photo_ref,
                elapsed_minutes,
            } => EventPayload::StaffOverdue {
                staff_id,
                name,
                photo_ref,
                elapsed_minutes,
                message,
            },
            OverdueAlert::Delivery {
                delivery_id,
                name,
                phone,
                address,
                expected_return_display,
            } => EventPayload::DeliveryOverdue {
                delivery_id,
                name,
                phone,
                address,
                expected_return_display,
            },
        }
    }
}

/// Receiver of overdue alerts, typically the notification widget
pub trait AlertSink {
    fn deliver(&self, alert: &OverdueAlert);
}

impl<F> AlertSink for F
where
    F: Fn(&OverdueAlert),
{
    fn deliver(&self, alert: &OverdueAlert) {
        self(alert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn staff_alert_carries_message() {
        let alert = OverdueAlert::Staff {
            staff_id: StaffId::new(),
            name: "Ann Lee".into(),
            photo_ref: "ann.jpg".into(),
            elapsed_minutes: 1,
        };

        match EventPayload::from(alert) {
            EventPayload::StaffOverdue { message, .. } => {
                assert_eq!(message, "Has been out of the office for 1 minute.");
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn closures_are_sinks() {
        let seen = RefCell::new(Vec::new());
        let sink = |alert: &OverdueAlert| seen.borrow_mut().push(alert.clone());

        let alert = OverdueAlert::Delivery {
            delivery_id: DeliveryId::new(),
            name: "Ann Lee".into(),
            phone: "12345".into(),
            address: "1 Main St".into(),
            expected_return_display: "14:40".into(),
        };
        sink.deliver(&alert);

        assert_eq!(seen.borrow().as_slice(), [alert]);
    }
}
