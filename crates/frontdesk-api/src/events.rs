//! Event types for frontdeskd -> client streaming

use chrono::{DateTime, Local};
use frontdesk_util::{DeliveryId, StaffId};
use serde::{Deserialize, Serialize};

use crate::{DeskSnapshot, API_VERSION};

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub api_version: u32,
    pub timestamp: DateTime<Local>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            api_version: API_VERSION,
            timestamp: frontdesk_util::now(),
            payload,
        }
    }
}

/// All possible events from the service to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// A staff member overstayed their expected return (once per absence)
    StaffOverdue {
        staff_id: StaffId,
        name: String,
        photo_ref: String,
        elapsed_minutes: u32,
        message: String,
    },

    /// A delivery run overstayed its expected return (once per delivery)
    DeliveryOverdue {
        delivery_id: DeliveryId,
        name: String,
        phone: String,
        address: String,
        expected_return_display: String,
    },

    /// Board contents changed
    StateChanged(DeskSnapshot),

    /// Service is shutting down
    Shutdown,
}
