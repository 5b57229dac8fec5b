//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Service settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Roster seed, in board order
    #[serde(default)]
    pub staff: Vec<RawStaff>,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// IPC socket path
    pub socket_path: Option<PathBuf>,

    /// Seconds between overdue scans (default 10)
    pub tick_interval_seconds: Option<u64>,
}

/// One roster record
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawStaff {
    pub first_name: String,
    pub last_name: String,

    /// Photo reference (URL or path, opaque to the service)
    pub photo: Option<String>,

    /// Also used to match people across roster reloads
    pub email: String,
}
