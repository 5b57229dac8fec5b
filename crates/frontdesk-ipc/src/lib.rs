//! IPC layer for frontdeskd
//!
//! Provides:
//! - Unix domain socket server with per-client reader and writer tasks
//! - NDJSON framing (one JSON document per line)
//! - Role assignment from peer credentials
//! - A small async client used by `frontdesk-ctl` and tests

mod client;
mod codec;
mod server;

pub use client::*;
pub use codec::*;
pub use server::*;

use thiserror::Error;

/// IPC errors
#[derive(Debug, Error)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Server not bound to {0}")]
    NotBound(String),

    #[error("Request rejected: {0}")]
    Rejected(String),
}

pub type IpcResult<T> = Result<T, IpcError>;
