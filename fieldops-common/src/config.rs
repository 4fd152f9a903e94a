//! Configuration loading and value resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is never fatal: the tools warn and continue with
//! defaults. A TOML file that exists but does not parse is a configuration
//! error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "FIELDOPS_CONFIG";
/// Environment variable overriding the back-office API base URL
pub const API_URL_ENV_VAR: &str = "FIELDOPS_API_URL";
/// Environment variable overriding the back-office API token
pub const API_TOKEN_ENV_VAR: &str = "FIELDOPS_API_TOKEN";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JPEG_QUALITY: u8 = 85;
pub const DEFAULT_WRITE_CONCURRENCY: usize = 4;

/// Contents of `config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Back-office REST API base URL (e.g. `https://backoffice.example/api`)
    pub api_base_url: Option<String>,
    /// Bearer token sent with every request
    pub api_token: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    pub logging: LoggingConfig,
    pub media: MediaConfig,
    pub ledger: LedgerConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            api_token: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            logging: LoggingConfig::default(),
            media: MediaConfig::default(),
            ledger: LedgerConfig::default(),
        }
    }
}

/// `[logging]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// `[media]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Target size as a percentage of the captured image dimensions.
    /// `None` disables downsizing.
    pub resize_percent: Option<u32>,
    /// JPEG quality used when re-encoding a downsized image (1-100)
    pub jpeg_quality: u8,
    /// Directory for local preview files; system temp dir when unset
    pub preview_dir: Option<PathBuf>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            resize_percent: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            preview_dir: None,
        }
    }
}

/// `[ledger]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Maximum number of concurrent item update/delete requests
    pub write_concurrency: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            write_concurrency: DEFAULT_WRITE_CONCURRENCY,
        }
    }
}

/// Resolved settings for the back-office REST API
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

/// Per-user config location, `~/.config/fieldops/config.toml` on Linux
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fieldops").join("config.toml"))
}

/// Locate the config file
///
/// `$FIELDOPS_CONFIG` wins when set (even if the file is missing, so the
/// caller can report it). Otherwise `~/.config/fieldops/config.toml`, then
/// `/etc/fieldops/config.toml` on Linux.
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if is_valid_value(&path) {
            return Some(PathBuf::from(path));
        }
    }

    if let Some(path) = user_config_path() {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/fieldops/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load the config file if one exists, defaults otherwise
///
/// `explicit` (usually a CLI argument) takes priority over the lookup in
/// [`config_file_path`]. An explicit path that does not exist is an error;
/// a missing default location is not.
pub fn load_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        info!("Loading config from {}", path.display());
        return load_toml_config(path);
    }

    match config_file_path() {
        Some(path) if path.exists() => {
            info!("Loading config from {}", path.display());
            load_toml_config(&path)
        }
        Some(path) => {
            warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            );
            Ok(TomlConfig::default())
        }
        None => {
            warn!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Write config atomically (temp file in the same directory, then rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Create a config file at `path`
///
/// An existing file is left alone unless `overwrite` is set.
pub fn init_config(config: &TomlConfig, path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Err(Error::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    write_toml_config(config, path)?;
    info!("Wrote config to {}", path.display());
    Ok(())
}

/// Resolve API settings from CLI → ENV → TOML
///
/// The base URL has no compiled default; failing to find one is a
/// configuration error listing every way to provide it.
pub fn resolve_api_settings(
    cli_url: Option<&str>,
    cli_token: Option<&str>,
    config: &TomlConfig,
) -> Result<ApiSettings> {
    let env_url = std::env::var(API_URL_ENV_VAR).ok();
    let env_token = std::env::var(API_TOKEN_ENV_VAR).ok();

    let base_url = first_valid(&[
        ("command line", cli_url),
        ("environment", env_url.as_deref()),
        ("TOML", config.api_base_url.as_deref()),
    ])
    .ok_or_else(|| {
        Error::Config(format!(
            "API base URL not configured. Provide one of:\n\
             1. Command line: --api-url https://backoffice.example/api\n\
             2. Environment: {}=https://backoffice.example/api\n\
             3. TOML config: api_base_url = \"https://backoffice.example/api\"",
            API_URL_ENV_VAR
        ))
    })?;

    let token = first_valid(&[
        ("command line", cli_token),
        ("environment", env_token.as_deref()),
        ("TOML", config.api_token.as_deref()),
    ]);

    let timeout_secs = if config.request_timeout_secs == 0 {
        warn!("request_timeout_secs = 0 is invalid, using {}", DEFAULT_TIMEOUT_SECS);
        DEFAULT_TIMEOUT_SECS
    } else {
        config.request_timeout_secs
    };

    Ok(ApiSettings {
        base_url: base_url.trim_end_matches('/').to_string(),
        token,
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn first_valid(candidates: &[(&str, Option<&str>)]) -> Option<String> {
    candidates.iter().find_map(|(source, value)| {
        value.filter(|v| is_valid_value(v)).map(|v| {
            tracing::debug!(source, "Resolved configuration value");
            v.to_string()
        })
    })
}

/// Non-empty, non-whitespace
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}
