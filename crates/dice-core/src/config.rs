//! Process-wide configuration, read once from the environment at startup.
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub store_backend: StoreBackend,
    pub file_store_dir: String,
    pub document_store_url: Option<String>,
    pub jwt_secret: String,
    pub admin_token: Option<String>,
    pub admin_access_mode: AdminAccessMode,
    pub heartbeat_interval: Duration,
    pub heartbeat_timeout: Duration,
    pub turn_watchdog_interval: Duration,
    pub bot_think_interval: Duration,
    pub room_inactivity_timeout: Duration,
    pub audit_retention: Duration,
    pub shutdown_drain: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    File,
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAccessMode {
    Token,
    Role,
    Hybrid,
    Open,
    Disabled,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for environment variable {0}: {1}")]
    Invalid(&'static str, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let store_backend = match env_or("STORE_BACKEND", "file").as_str() {
            "file" => StoreBackend::File,
            "document" => StoreBackend::Document,
            other => return Err(ConfigError::Invalid("STORE_BACKEND", other.to_string())),
        };
        let admin_access_mode = match env_or("ADMIN_ACCESS_MODE", "hybrid").as_str() {
            "token" => AdminAccessMode::Token,
            "role" => AdminAccessMode::Role,
            "hybrid" => AdminAccessMode::Hybrid,
            "open" => AdminAccessMode::Open,
            "disabled" => AdminAccessMode::Disabled,
            other => {
                return Err(ConfigError::Invalid("ADMIN_ACCESS_MODE", other.to_string()));
            }
        };
        if store_backend == StoreBackend::Document && std::env::var("DOCUMENT_STORE_URL").is_err()
        {
            return Err(ConfigError::Missing("DOCUMENT_STORE_URL"));
        }
        Ok(Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:8080"),
            store_backend,
            file_store_dir: env_or("FILE_STORE_DIR", "data"),
            document_store_url: std::env::var("DOCUMENT_STORE_URL").ok(),
            jwt_secret: env_or("JWT_SECRET", "dev-secret-change-me"),
            admin_token: std::env::var("ADMIN_TOKEN").ok(),
            admin_access_mode,
            heartbeat_interval: secs("HEARTBEAT_INTERVAL_SECS", 5),
            heartbeat_timeout: secs("HEARTBEAT_TIMEOUT_SECS", 20),
            turn_watchdog_interval: secs("TURN_WATCHDOG_INTERVAL_SECS", 1),
            bot_think_interval: secs("BOT_THINK_INTERVAL_SECS", 1),
            room_inactivity_timeout: secs("ROOM_INACTIVITY_TIMEOUT_SECS", 900),
            audit_retention: secs("AUDIT_RETENTION_SECS", 30 * 24 * 3600),
            shutdown_drain: secs("SHUTDOWN_DRAIN_SECS", 10),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn secs(key: &str, default: u64) -> Duration {
    let value = std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default);
    Duration::from_secs(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_backend_without_url_is_an_error() {
        // SAFETY: test runs single-threaded within this process's env mutation.
        unsafe {
            std::env::set_var("STORE_BACKEND", "document");
            std::env::remove_var("DOCUMENT_STORE_URL");
        }
        assert!(matches!(Config::from_env(), Err(ConfigError::Missing(_))));
        unsafe {
            std::env::remove_var("STORE_BACKEND");
        }
    }
}
