//! Shared types for the frontdesk API

use chrono::{DateTime, Local};
use frontdesk_util::{DeliveryId, StaffId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Presence state of a staff member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    #[default]
    In,
    Out,
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenceStatus::In => write!(f, "In"),
            PresenceStatus::Out => write!(f, "Out"),
        }
    }
}

/// Vehicle used for a delivery run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleKind {
    Car,
    Motorcycle,
}

impl VehicleKind {
    /// Glyph shown in the transport table
    pub fn icon(&self) -> &'static str {
        match self {
            VehicleKind::Car => "🚗",
            VehicleKind::Motorcycle => "🏍️",
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleKind::Car => write!(f, "car"),
            VehicleKind::Motorcycle => write!(f, "motorcycle"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown vehicle '{0}' (expected car or motorcycle)")]
pub struct UnknownVehicle(pub String);

impl FromStr for VehicleKind {
    type Err = UnknownVehicle;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "car" => Ok(VehicleKind::Car),
            "motorcycle" => Ok(VehicleKind::Motorcycle),
            _ => Err(UnknownVehicle(s.to_string())),
        }
    }
}

/// Input field named by an `invalid_input` failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    VehicleKind,
    FirstName,
    LastName,
    Phone,
    Address,
    DurationMinutes,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::VehicleKind => "vehicle",
            Field::FirstName => "first name",
            Field::LastName => "last name",
            Field::Phone => "telephone",
            Field::Address => "delivery address",
            Field::DurationMinutes => "duration (minutes)",
        };
        f.write_str(name)
    }
}

/// Reference to a selectable entity on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Staff(StaffId),
    Delivery(DeliveryId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Staff(id) => write!(f, "staff:{}", id),
            EntityRef::Delivery(id) => write!(f, "delivery:{}", id),
        }
    }
}

/// One staff record from the roster source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRecord {
    pub first_name: String,
    pub last_name: String,
    pub photo_ref: String,
    pub email: String,
}

/// Raw "schedule transport" input, validated by the core before a delivery
/// exists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub vehicle: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub duration_minutes: i64,
}

/// Staff row as displayed on the reception board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffView {
    pub staff_id: StaffId,
    pub first_name: String,
    pub last_name: String,
    pub photo_ref: String,
    pub email: String,
    pub status: PresenceStatus,
    pub out_at: Option<DateTime<Local>>,
    /// `HH:MM` of `out_at`
    pub out_display: Option<String>,
    /// Requested absence as a phrase, e.g. "1 hour and 30 minutes"
    pub duration_display: Option<String>,
    pub expected_return: Option<DateTime<Local>>,
    /// `HH:MM` of `expected_return`
    pub expected_return_display: Option<String>,
    pub overdue_notified: bool,
}

/// Delivery row as displayed in the transport table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryView {
    pub delivery_id: DeliveryId,
    pub vehicle: VehicleKind,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub duration_display: String,
    pub expected_return: DateTime<Local>,
    pub expected_return_display: String,
    pub overdue_notified: bool,
}

/// Full board snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskSnapshot {
    pub api_version: u32,
    pub taken_at: DateTime<Local>,
    pub staff: Vec<StaffView>,
    pub deliveries: Vec<DeliveryView>,
    pub selection: Option<EntityRef>,
}

/// Role for authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientRole {
    /// Reception UI - can select, check in/out, schedule and remove deliveries
    Shell,
    /// Local admin - can also reload the roster
    Admin,
    /// Read-only observer (wall display, alert watcher)
    Observer,
}

impl ClientRole {
    pub fn can_edit(&self) -> bool {
        matches!(self, ClientRole::Shell | ClientRole::Admin)
    }

    pub fn can_reload_roster(&self) -> bool {
        matches!(self, ClientRole::Admin)
    }
}
