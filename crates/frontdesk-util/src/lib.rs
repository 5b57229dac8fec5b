//! Shared utilities for frontdesk
//!
//! This crate provides:
//! - ID types (StaffId, DeliveryId, ClientId)
//! - Wall-clock helpers: duration phrases, `HH:MM` parsing and rendering
//! - Default paths for the service socket and config file

mod ids;
mod paths;
mod time;

pub use ids::*;
pub use paths::*;
pub use time::*;
