//! Command types for the frontdesk protocol

use chrono::{DateTime, Local};
use frontdesk_util::{ClientId, DeliveryId, StaffId};
use serde::{Deserialize, Serialize};

use crate::{ClientRole, DeliveryRequest, DeliveryView, DeskSnapshot, EntityRef, Field, API_VERSION};

/// Request wrapper with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Request ID for correlation
    pub request_id: u64,
    pub api_version: u32,
    pub command: Command,
}

impl Request {
    pub fn new(request_id: u64, command: Command) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            command,
        }
    }
}

/// Response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Corresponding request ID
    pub request_id: u64,
    pub api_version: u32,
    pub result: ResponseResult,
}

impl Response {
    pub fn success(request_id: u64, payload: ResponsePayload) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Ok(payload),
        }
    }

    pub fn error(request_id: u64, error: ErrorInfo) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Err(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseResult {
    Ok(ResponsePayload),
    Err(ErrorInfo),
}

/// Error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
    /// Offending field for `invalid_input`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
}

impl ErrorInfo {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn invalid_field(field: Field, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InvalidInput,
            message: message.into(),
            field: Some(field),
        }
    }
}

/// Error codes for the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed or out-of-range field
    InvalidInput,
    /// Operation requires a selected entity and none (of the right kind) is selected
    NoSelection,
    /// Target entity is not registered
    NotFound,
    InvalidRequest,
    PermissionDenied,
    ConfigError,
    InternalError,
}

/// All possible commands from clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Get the full board
    GetState,

    /// Select an entity; selecting the current selection again clears it
    Select { target: EntityRef },

    /// Drop the current selection
    ClearSelection,

    /// Check the selected staff member out
    CheckOut { duration_minutes: i64 },

    /// Check the selected staff member back in
    CheckIn,

    /// Schedule a new delivery run
    ScheduleDelivery(DeliveryRequest),

    /// Remove the selected delivery
    RemoveSelectedDelivery,

    /// Re-read the roster from the config file (admin only)
    ReloadRoster,

    /// Subscribe to events (returns immediately, events stream separately)
    SubscribeEvents,

    UnsubscribeEvents,

    /// Ping for keepalive
    Ping,
}

/// Response payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePayload {
    State(DeskSnapshot),
    Selection {
        selection: Option<EntityRef>,
    },
    CheckedOut {
        staff_id: StaffId,
        expected_return: DateTime<Local>,
        expected_return_display: String,
    },
    CheckedIn {
        staff_id: StaffId,
    },
    DeliveryScheduled(DeliveryView),
    DeliveryRemoved {
        delivery_id: DeliveryId,
    },
    RosterReloaded {
        staff_count: usize,
    },
    Subscribed {
        client_id: ClientId,
    },
    Unsubscribed,
    Pong,
}

/// Client connection info (set by IPC layer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub client_id: ClientId,
    pub role: ClientRole,
    /// Unix UID if available
    pub uid: Option<u32>,
}

impl ClientInfo {
    pub fn new(role: ClientRole) -> Self {
        Self {
            client_id: ClientId::new(),
            role,
            uid: None,
        }
    }

    pub fn with_uid(mut self, uid: u32) -> Self {
        self.uid = Some(uid);
        self
    }
}
