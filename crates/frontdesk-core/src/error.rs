//! Error taxonomy for board operations

use frontdesk_api::{EntityRef, Field};
use std::fmt;
use thiserror::Error;

/// Which table an operation needed a selection from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Staff,
    Delivery,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Staff => f.write_str("staff member"),
            EntityKind::Delivery => f.write_str("delivery"),
        }
    }
}

/// Recoverable failure of a board operation. No variant leaves the board
/// partially mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: Field, reason: String },

    #[error("No {wanted} selected")]
    NoSelection { wanted: EntityKind },

    #[error("Not found: {0}")]
    NotFound(EntityRef),
}

impl CoreError {
    pub fn invalid(field: Field, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
