use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::paths::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_ANNOUNCEMENT_INTERVAL_SECS,
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_HOST, DEFAULT_PORT, ENV_JWT_SECRET, TASK_QUEUE_CAPACITY,
};

// =============================================================================
// Eviction Policy Enum
// =============================================================================

/// Cache eviction policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// TinyLFU - LRU eviction + LFU admission (near-optimal hit ratio)
    #[default]
    TinyLfu,
    /// Simple LRU (better for recency-biased workloads)
    Lru,
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::TinyLfu => write!(f, "tinylfu"),
            EvictionPolicy::Lru => write!(f, "lru"),
        }
    }
}

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Authentication configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuthFileConfig {
    pub enabled: Option<bool>,
    pub jwt_secret: Option<String>,
}

/// Cache configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CacheFileConfig {
    pub max_entries: Option<u64>,
    pub eviction_policy: Option<EvictionPolicy>,
}

/// Background task configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TasksFileConfig {
    pub announcement_interval_secs: Option<u64>,
    pub queue_capacity: Option<usize>,
}

/// Root config file structure
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub auth: Option<AuthFileConfig>,
    pub cache: Option<CacheFileConfig>,
    pub tasks: Option<TasksFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(auth) = other.auth {
            let current = self.auth.get_or_insert_with(AuthFileConfig::default);
            if auth.enabled.is_some() {
                tracing::trace!(enabled = ?auth.enabled, "Merging auth.enabled");
                current.enabled = auth.enabled;
            }
            if auth.jwt_secret.is_some() {
                tracing::trace!("Merging auth.jwt_secret");
                current.jwt_secret = auth.jwt_secret;
            }
        }

        if let Some(cache) = other.cache {
            let current = self.cache.get_or_insert_with(CacheFileConfig::default);
            if cache.max_entries.is_some() {
                tracing::trace!(max_entries = ?cache.max_entries, "Merging cache.max_entries");
                current.max_entries = cache.max_entries;
            }
            if cache.eviction_policy.is_some() {
                tracing::trace!(policy = ?cache.eviction_policy, "Merging cache.eviction_policy");
                current.eviction_policy = cache.eviction_policy;
            }
        }

        if let Some(tasks) = other.tasks {
            let current = self.tasks.get_or_insert_with(TasksFileConfig::default);
            if tasks.announcement_interval_secs.is_some() {
                tracing::trace!(
                    interval = ?tasks.announcement_interval_secs,
                    "Merging tasks.announcement_interval_secs"
                );
                current.announcement_interval_secs = tasks.announcement_interval_secs;
            }
            if tasks.queue_capacity.is_some() {
                tracing::trace!(capacity = ?tasks.queue_capacity, "Merging tasks.queue_capacity");
                current.queue_capacity = tasks.queue_capacity;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Authentication configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub enabled: bool,
    /// HS256 secret shared with the identity provider
    pub jwt_secret: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("enabled", &self.enabled)
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}

/// In-memory cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_entries: u64,
    pub eviction_policy: EvictionPolicy,
}

/// Background task configuration
#[derive(Debug, Clone)]
pub struct TasksConfig {
    pub announcement_interval_secs: u64,
    pub queue_capacity: usize,
}

impl TasksConfig {
    pub fn announcement_interval(&self) -> Duration {
        Duration::from_secs(self.announcement_interval_secs)
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
    pub tasks: TasksConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.conference/conference.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Load from profile dir - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_layers(cli, file_config);
        config.validate()?;
        tracing::debug!(config = ?config, "Configuration loaded");
        Ok(config)
    }

    /// Layer defaults -> file config -> CLI/env overrides
    fn from_layers(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_auth = file_config.auth.unwrap_or_default();
        let file_cache = file_config.cache.unwrap_or_default();
        let file_tasks = file_config.tasks.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        // auth.enabled: file config sets default, --no-auth CLI flag disables
        let auth_enabled = if cli.no_auth {
            false
        } else {
            file_auth.enabled.unwrap_or(true)
        };
        let jwt_secret = cli
            .jwt_secret
            .clone()
            .or(file_auth.jwt_secret)
            .unwrap_or_default();

        Self {
            server: ServerConfig { host, port },
            auth: AuthConfig {
                enabled: auth_enabled,
                jwt_secret,
            },
            cache: CacheConfig {
                max_entries: cli
                    .cache_max_entries
                    .or(file_cache.max_entries)
                    .unwrap_or(DEFAULT_CACHE_MAX_ENTRIES),
                eviction_policy: cli
                    .cache_eviction_policy
                    .or(file_cache.eviction_policy)
                    .unwrap_or_default(),
            },
            tasks: TasksConfig {
                announcement_interval_secs: cli
                    .announcement_interval
                    .or(file_tasks.announcement_interval_secs)
                    .unwrap_or(DEFAULT_ANNOUNCEMENT_INTERVAL_SECS),
                queue_capacity: file_tasks.queue_capacity.unwrap_or(TASK_QUEUE_CAPACITY),
            },
        }
    }

    fn validate(&self) -> Result<()> {
        // Host must not be empty
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port must be non-zero (port 0 would cause bind failure)
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if self.auth.enabled && self.auth.jwt_secret.trim().is_empty() {
            anyhow::bail!(
                "Configuration error: auth.jwt_secret is required when authentication is enabled. \
                 Set it via --jwt-secret, {} or the config file, or run with --no-auth.",
                ENV_JWT_SECRET
            );
        }

        if self.cache.max_entries == 0 {
            anyhow::bail!("Configuration error: cache.max_entries must be greater than 0");
        }

        if self.tasks.announcement_interval_secs == 0 {
            anyhow::bail!(
                "Configuration error: tasks.announcement_interval_secs must be greater than 0"
            );
        }

        if self.tasks.queue_capacity == 0 {
            anyhow::bail!("Configuration error: tasks.queue_capacity must be greater than 0");
        }

        if !self.auth.enabled && is_all_interfaces(&self.server.host) {
            tracing::warn!(
                host = %self.server.host,
                "Authentication is disabled while listening on all interfaces"
            );
        }

        Ok(())
    }
}

/// Get the profile config path (~/.conference/conference.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub(crate) fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}
