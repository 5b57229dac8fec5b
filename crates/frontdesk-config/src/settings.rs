//! Validated configuration structures

use crate::schema::{RawConfig, RawServiceConfig, RawStaff};
use frontdesk_api::RosterRecord;
use frontdesk_util::socket_path_without_env;
use std::path::PathBuf;
use std::time::Duration;

/// Default period of the overdue scan
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(10);

/// Validated configuration ready for the service
#[derive(Debug, Clone)]
pub struct DeskConfig {
    pub service: ServiceConfig,

    /// Roster seed, in board order
    pub roster: Vec<RosterRecord>,
}

impl DeskConfig {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            service: ServiceConfig::from_raw(raw.service),
            roster: raw.staff.into_iter().map(convert_staff).collect(),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub socket_path: PathBuf,
    pub tick_interval: Duration,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        Self {
            socket_path: raw.socket_path.unwrap_or_else(socket_path_without_env),
            tick_interval: raw
                .tick_interval_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TICK_INTERVAL),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            socket_path: socket_path_without_env(),
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

fn convert_staff(raw: RawStaff) -> RosterRecord {
    RosterRecord {
        first_name: raw.first_name.trim().to_string(),
        last_name: raw.last_name.trim().to_string(),
        photo_ref: raw.photo.unwrap_or_default(),
        email: raw.email.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_names_are_trimmed() {
        let raw = RawConfig {
            config_version: 1,
            service: Default::default(),
            staff: vec![RawStaff {
                first_name: " Ann ".into(),
                last_name: "Lee".into(),
                photo: Some("ann.jpg".into()),
                email: "ann@example.org ".into(),
            }],
        };

        let config = DeskConfig::from_raw(raw);
        assert_eq!(config.roster[0].first_name, "Ann");
        assert_eq!(config.roster[0].email, "ann@example.org");
        assert_eq!(config.roster[0].photo_ref, "ann.jpg");
    }

    #[test]
    fn service_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.tick_interval, DEFAULT_TICK_INTERVAL);
        assert!(config.socket_path.to_string_lossy().ends_with("frontdeskd.sock"));
    }
}
