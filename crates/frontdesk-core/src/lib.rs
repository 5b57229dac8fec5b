//! Reception board core for frontdeskd
//!
//! This crate holds all board state and the rules that govern it:
//! - Ordered staff and delivery registries
//! - Presence state machine (In -> Out -> In)
//! - Delivery lifecycle and input validation
//! - Overdue scanning with one alert per episode
//! - `FrontDesk`, which owns the registries and the selection slot

mod delivery;
mod desk;
mod error;
mod events;
mod presence;
mod registry;
mod scheduler;

pub use delivery::*;
pub use desk::*;
pub use error::*;
pub use events::*;
pub use presence::*;
pub use registry::*;
pub use scheduler::*;
