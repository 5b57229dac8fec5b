//! Default paths for frontdesk components
//!
//! Paths are user-writable by default (no root required):
//! - Socket: `$XDG_RUNTIME_DIR/frontdesk/frontdeskd.sock` or `/tmp/frontdesk-$USER/frontdeskd.sock`
//! - Config: `$XDG_CONFIG_HOME/frontdesk/config.toml` or `~/.config/frontdesk/config.toml`

use std::path::PathBuf;

/// Environment variable for overriding the socket path
pub const FRONTDESK_SOCKET_ENV: &str = "FRONTDESK_SOCKET";

/// Environment variable for overriding the config file path
pub const FRONTDESK_CONFIG_ENV: &str = "FRONTDESK_CONFIG";

const SOCKET_FILENAME: &str = "frontdeskd.sock";
const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR: &str = "frontdesk";

/// Get the default socket path.
///
/// Order of precedence:
/// 1. `$FRONTDESK_SOCKET`
/// 2. `$XDG_RUNTIME_DIR/frontdesk/frontdeskd.sock`
/// 3. `/tmp/frontdesk-$USER/frontdeskd.sock`
pub fn default_socket_path() -> PathBuf {
    if let Ok(path) = std::env::var(FRONTDESK_SOCKET_ENV) {
        return PathBuf::from(path);
    }

    socket_path_without_env()
}

/// Socket path ignoring `$FRONTDESK_SOCKET`; used as the config default.
pub fn socket_path_without_env() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join(APP_DIR).join(SOCKET_FILENAME);
    }

    let username = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    PathBuf::from(format!("/tmp/{}-{}", APP_DIR, username)).join(SOCKET_FILENAME)
}

/// Get the default configuration file path.
///
/// Order of precedence:
/// 1. `$FRONTDESK_CONFIG`
/// 2. `$XDG_CONFIG_HOME/frontdesk/config.toml`
/// 3. `~/.config/frontdesk/config.toml`
/// 4. `/etc/frontdesk/config.toml`
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(FRONTDESK_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_path_names_the_service() {
        let path = socket_path_without_env();
        assert!(path.to_string_lossy().contains("frontdesk"));
        assert!(path.to_string_lossy().ends_with("frontdeskd.sock"));
    }

    #[test]
    fn config_path_is_toml() {
        let path = default_config_path();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("toml"));
    }
}
