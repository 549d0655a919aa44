use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub validation: ValidationConfig,
}

/// Well-known env keys that identify a profile when prefixed.
const PROFILE_MARKER_KEYS: &[&str] = &["PORT", "RULESET_STORE", "RULESET_DIR", "JSONVALIDATION_ENDPOINT"];

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `JSONGUARD_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("JSONGUARD_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            validation: ValidationConfig::from_env_profiled(p),
        }
    }

    /// Discover available profiles by scanning env vars for `{PREFIX}_{MARKER_KEY}` patterns.
    /// Always includes "default" (the unprefixed config).
    pub fn available_profiles() -> Vec<String> {
        let mut profiles = std::collections::BTreeSet::new();
        profiles.insert("default".to_string());

        for (key, _) in env::vars() {
            for marker in PROFILE_MARKER_KEYS {
                if let Some(prefix) = key.strip_suffix(&format!("_{}", marker)) {
                    if !prefix.is_empty()
                        && prefix.chars().all(|c| c.is_ascii_uppercase() || c == '_')
                    {
                        profiles.insert(prefix.to_string());
                    }
                }
            }
        }

        profiles.into_iter().collect()
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:      {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  endpoint:    {} (enabled={})",
            self.validation.endpoint,
            self.validation.enable_endpoint
        );
        tracing::info!(
            "  store:       {} (dir={})",
            self.validation.store,
            self.validation.rules_dir.display()
        );
    }

    /// Return a view safe for API responses.
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": { "host": self.server.host, "port": self.server.port },
            "validation": {
                "enable_endpoint": self.validation.enable_endpoint,
                "endpoint": self.validation.endpoint,
                "store": self.validation.store.to_string(),
                "rules_dir": self.validation.rules_dir,
                "max_body_bytes": self.validation.max_body_bytes,
            },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 8080),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── Validation ────────────────────────────────────────────────

/// Where rule sets are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    File,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::File => write!(f, "file"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "file" => Ok(StoreBackend::File),
            other => Err(format!("unknown rule set store: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Whether the rule set REST endpoint is mounted.
    pub enable_endpoint: bool,
    /// Base path of the REST endpoint.
    pub endpoint: String,
    pub store: StoreBackend,
    /// Directory used by the file store.
    pub rules_dir: PathBuf,
    /// Upper bound for buffered request bodies.
    pub max_body_bytes: usize,
}

impl ValidationConfig {
    fn from_env_profiled(p: &str) -> Self {
        let store = profiled_env_or(p, "RULESET_STORE", "memory");
        let store = store.parse::<StoreBackend>().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to in-memory rule set store");
            StoreBackend::Memory
        });
        Self {
            enable_endpoint: profiled_env_bool(p, "JSONVALIDATION_ENABLE_ENDPOINT", true),
            endpoint: normalize_endpoint(&profiled_env_or(
                p,
                "JSONVALIDATION_ENDPOINT",
                "/jsonvalidation",
            )),
            store,
            rules_dir: PathBuf::from(profiled_env_or(p, "RULESET_DIR", "data/rulesets")),
            max_body_bytes: profiled_env_usize(p, "MAX_BODY_BYTES", 1024 * 1024),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enable_endpoint: true,
            endpoint: "/jsonvalidation".to_string(),
            store: StoreBackend::Memory,
            rules_dir: PathBuf::from("data/rulesets"),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Leading slash, no trailing slash.
fn normalize_endpoint(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return "/jsonvalidation".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_backend_parses_case_insensitively() {
        assert_eq!("File".parse::<StoreBackend>(), Ok(StoreBackend::File));
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("redis".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn endpoint_is_normalized() {
        assert_eq!(normalize_endpoint("rules/"), "/rules");
        assert_eq!(normalize_endpoint("/jsonvalidation"), "/jsonvalidation");
        assert_eq!(normalize_endpoint("  "), "/jsonvalidation");
    }

    #[test]
    fn unset_profile_uses_defaults() {
        // A profile nobody defines falls through to the unprefixed keys or defaults.
        let config = Config::for_profile("zz_unused_profile_for_tests");
        assert_eq!(config.profile, "ZZ_UNUSED_PROFILE_FOR_TESTS");
        assert!(!config.validation.endpoint.is_empty());
        assert!(config.validation.endpoint.starts_with('/'));
    }
}
