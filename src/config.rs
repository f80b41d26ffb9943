//! Runtime configuration parsed from environment variables.
//!
//! All variables are optional except `DATABASE_URL` when the Postgres store
//! is selected. `main` loads a `.env` file first if one is present.

use std::path::PathBuf;
use std::time::Duration;

use crate::session::guard::DEFAULT_STORAGE_KEY;
use crate::session::routing::{
    DEFAULT_ENTRY_PATH, DEFAULT_PATIENT_ROOT, DEFAULT_PUBLIC_PREFIX, DEFAULT_STAFF_ROOT, RoutingPolicy, normalize_path,
    within,
};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STORE_PATH: &str = "mediconnect-storage.json";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CLIENT_IDLE_TTL_SECS: u64 = 1800;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
    #[error("{var} is required when SESSION_STORE={store}")]
    Missing { var: &'static str, store: &'static str },
}

/// Where persisted session records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File(PathBuf),
    Postgres { database_url: String, max_connections: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub store: StoreBackend,
    pub storage_key: String,
    /// Seed file replacing the compiled-in directory.
    pub directory_path: Option<PathBuf>,
    pub routing: RoutingPolicy,
    /// Live client guards idle longer than this are dropped from memory.
    pub client_idle_ttl: Duration,
    pub cookie_secure: bool,
}

impl Config {
    /// Build typed config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first variable that fails to
    /// parse or is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_var("PORT", DEFAULT_PORT)?;
        let store = parse_store()?;
        let storage_key = std::env::var("SESSION_STORAGE_KEY").unwrap_or_else(|_| DEFAULT_STORAGE_KEY.to_owned());
        if storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid { var: "SESSION_STORAGE_KEY", value: storage_key });
        }

        let routing = RoutingPolicy {
            entry_path: path_var("PORTAL_ENTRY_PATH", DEFAULT_ENTRY_PATH)?,
            public_prefix: path_var("PORTAL_PUBLIC_PREFIX", DEFAULT_PUBLIC_PREFIX)?,
            patient_root: path_var("PORTAL_PATIENT_ROOT", DEFAULT_PATIENT_ROOT)?,
            staff_root: path_var("PORTAL_STAFF_ROOT", DEFAULT_STAFF_ROOT)?,
        };
        check_portal_layout(&routing)?;

        Ok(Self {
            port,
            store,
            storage_key,
            directory_path: std::env::var("DIRECTORY_PATH").ok().map(PathBuf::from),
            routing,
            client_idle_ttl: Duration::from_secs(parse_var("CLIENT_IDLE_TTL_SECS", DEFAULT_CLIENT_IDLE_TTL_SECS)?),
            cookie_secure: env_bool("COOKIE_SECURE").unwrap_or(false),
        })
    }
}

fn parse_store() -> Result<StoreBackend, ConfigError> {
    let kind = std::env::var("SESSION_STORE").unwrap_or_else(|_| "memory".to_owned());
    match kind.trim().to_ascii_lowercase().as_str() {
        "memory" => Ok(StoreBackend::Memory),
        "file" => {
            let path = std::env::var("SESSION_STORE_PATH").unwrap_or_else(|_| DEFAULT_STORE_PATH.to_owned());
            Ok(StoreBackend::File(PathBuf::from(path)))
        }
        "postgres" => {
            let database_url = std::env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing { var: "DATABASE_URL", store: "postgres" })?;
            let max_connections = parse_var("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
            Ok(StoreBackend::Postgres { database_url, max_connections })
        }
        _ => Err(ConfigError::Invalid { var: "SESSION_STORE", value: kind }),
    }
}

/// Parse `key` as `T`, falling back to `default` when unset. A set but
/// unparseable value is an error rather than a silent default.
fn parse_var<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var: key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Read a portal path; it must be absolute.
fn path_var(key: &'static str, default: &str) -> Result<String, ConfigError> {
    let value = std::env::var(key).unwrap_or_else(|_| default.to_owned());
    if !value.starts_with('/') {
        return Err(ConfigError::Invalid { var: key, value });
    }
    Ok(value)
}

/// Reject layouts where a redirect target is itself redirected: a portal at
/// `/`, nested or equal portals, or an entry point inside a portal.
fn check_portal_layout(routing: &RoutingPolicy) -> Result<(), ConfigError> {
    let invalid = |var: &'static str, value: &str| ConfigError::Invalid { var, value: value.to_owned() };

    for (var, root) in [("PORTAL_PATIENT_ROOT", &routing.patient_root), ("PORTAL_STAFF_ROOT", &routing.staff_root)] {
        if normalize_path(root) == "/" {
            return Err(invalid(var, root.as_str()));
        }
        if within(&routing.entry_path, root) {
            return Err(invalid("PORTAL_ENTRY_PATH", routing.entry_path.as_str()));
        }
    }
    if within(&routing.patient_root, &routing.staff_root) || within(&routing.staff_root, &routing.patient_root) {
        return Err(invalid("PORTAL_STAFF_ROOT", routing.staff_root.as_str()));
    }
    Ok(())
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
