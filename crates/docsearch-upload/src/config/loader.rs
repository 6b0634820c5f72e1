use std::path::{Path, PathBuf};

use crate::config::schema::{normalize_extension, ClientConfig};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/client-config-v1.json");

pub const ENV_API_URL: &str = "DOCSEARCH_API_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "DOCSEARCH_POLL_INTERVAL_MS";
pub const ENV_ALLOWED_EXTENSIONS: &str = "DOCSEARCH_ALLOWED_EXTENSIONS";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ClientConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<ClientConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: ClientConfig = serde_json::from_value(json_value)?;

    finalize_config(config)
}

/// Loads the config at `path`, or the default location when `None`.
///
/// A missing file at the default location yields the built-in defaults.
/// Environment overrides are applied last in both cases.
pub fn load_or_default(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let config = match path {
        Some(path) => load_config(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => {
                log::info!("Loading config from {}", path.display());
                load_config(&path)?
            }
            _ => {
                log::debug!("No config file found, using defaults");
                ClientConfig::default()
            }
        },
    };

    apply_env_overrides(config)
}

/// `<config dir>/docsearch-upload/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("docsearch-upload").join("config.json"))
}

/// Applies `DOCSEARCH_*` environment variables on top of `config`.
pub fn apply_env_overrides(mut config: ClientConfig) -> Result<ClientConfig, ConfigError> {
    if let Some(url) = read_env(ENV_API_URL) {
        config.api_base_url = url;
    }

    if let Some(raw) = read_env(ENV_POLL_INTERVAL_MS) {
        config.poll_interval_ms = raw.parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::InvalidEnv {
                name: ENV_POLL_INTERVAL_MS.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }
        })?;
    }

    if let Some(raw) = read_env(ENV_ALLOWED_EXTENSIONS) {
        config.allowed_extensions = raw
            .split(',')
            .filter(|ext| !ext.trim().is_empty())
            .map(str::to_string)
            .collect();
    }

    finalize_config(config)
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

/// Normalizes extensions and checks the semantic rules the schema cannot.
pub fn finalize_config(mut config: ClientConfig) -> Result<ClientConfig, ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if let Err(e) = reqwest::Url::parse(&config.api_base_url) {
        return Err(ConfigError::Validation {
            message: format!("Invalid api_base_url '{}': {}", config.api_base_url, e),
        });
    }

    if config.poll_interval_ms == 0 {
        return Err(ConfigError::Validation {
            message: "poll_interval_ms must be greater than zero".to_string(),
        });
    }

    let mut extensions: Vec<String> = Vec::with_capacity(config.allowed_extensions.len());
    for ext in &config.allowed_extensions {
        let normalized = normalize_extension(ext);
        if normalized == "." {
            return Err(ConfigError::Validation {
                message: format!("Invalid extension '{}'", ext),
            });
        }
        if !extensions.contains(&normalized) {
            extensions.push(normalized);
        }
    }
    if extensions.is_empty() {
        return Err(ConfigError::Validation {
            message: "allowed_extensions must not be empty".to_string(),
        });
    }
    config.allowed_extensions = extensions;

    Ok(config)
}
