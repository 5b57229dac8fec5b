//! Protocol types for frontdeskd IPC
//!
//! This crate defines the stable API between frontdeskd and its clients:
//! - Commands (requests from the UI layer)
//! - Responses
//! - Events (overdue alerts and state changes, service -> clients)
//! - Board views shared by both sides

mod commands;
mod events;
mod types;

pub use commands::*;
pub use events::*;
pub use types::*;

/// Current API version
pub const API_VERSION: u32 = 1;
