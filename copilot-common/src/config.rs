//! Bootstrap configuration
//!
//! Settings are resolved in priority order:
//!
//! 1. Command-line arguments (`--config`, `--port`, `--database-url`)
//! 2. Environment variables (`DATABASE_URL`, `OPENAI_API_KEY`, ...)
//! 3. TOML configuration file
//! 4. Compiled defaults
//!
//! Missing credentials are not a startup error. The AI and voice clients
//! report them when they are first used.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::{Error, Result};

pub const ENV_CONFIG_PATH: &str = "COPILOT_CONFIG";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const ENV_RETELL_API_KEY: &str = "RETELL_API_KEY";
pub const ENV_RETELL_AGENT_ID: &str = "RETELL_AGENT_ID";
pub const ENV_RETELL_FROM_NUMBER: &str = "RETELL_FROM_NUMBER";
pub const ENV_VOICE_PROVIDER: &str = "COPILOT_VOICE_PROVIDER";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5780;
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;
const DEFAULT_RETELL_BASE_URL: &str = "https://api.retellai.com";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of the TOML configuration file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub ai: AiSection,
    #[serde(default)]
    pub voice: VoiceSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Write a fixed placeholder instead of failing when enrichment output is empty
    pub enrichment_placeholder: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceSection {
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub agent_id: Option<String>,
    pub from_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides it
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub database_url: Option<String>,
}

/// Which telephony backend starts discovery calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceProvider {
    /// Returns a synthetic call id without network access
    #[default]
    Mock,
    Retell,
}

impl FromStr for VoiceProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(VoiceProvider::Mock),
            "retell" => Ok(VoiceProvider::Retell),
            other => Err(Error::Config(format!(
                "Unknown voice provider '{}' (expected 'mock' or 'retell')",
                other
            ))),
        }
    }
}

impl fmt::Display for VoiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceProvider::Mock => f.write_str("mock"),
            VoiceProvider::Retell => f.write_str("retell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub enrichment_placeholder: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    pub provider: VoiceProvider,
    pub api_key: Option<String>,
    pub base_url: String,
    pub agent_id: Option<String>,
    pub from_number: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub ai: AiConfig,
    pub voice: VoiceConfig,
    pub log_level: String,
    /// TOML file the configuration was read from, if any
    pub config_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from the command line, environment and TOML file
    pub fn load(cli: &CliOverrides) -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok();

        let (path, explicit) = match (&cli.config_path, env(ENV_CONFIG_PATH)) {
            (Some(path), _) => (Some(path.clone()), true),
            (None, Some(path)) if is_valid_key(&path) => (Some(PathBuf::from(path)), true),
            _ => (default_config_path(), false),
        };

        let (toml, config_file) = match path {
            Some(path) if path.exists() => (load_toml_config(&path)?, Some(path)),
            Some(path) if explicit => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            _ => (TomlConfig::default(), None),
        };

        let mut config = Self::from_sources(cli, &toml, env)?;
        config.config_file = config_file;
        Ok(config)
    }

    /// Resolve configuration from explicit sources
    ///
    /// `env` looks up an environment variable; tests pass a closure over a map.
    pub fn from_sources<F>(cli: &CliOverrides, toml: &TomlConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|value| is_valid_key(value));

        let database_url = cli
            .database_url
            .clone()
            .filter(|url| is_valid_key(url))
            .or_else(|| env(ENV_DATABASE_URL))
            .or_else(|| toml.database.url.clone().filter(|url| is_valid_key(url)))
            .unwrap_or_else(default_database_url);

        let timeout_secs = toml.ai.timeout_secs.unwrap_or(DEFAULT_AI_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config("ai.timeout_secs must be greater than 0".to_string()));
        }

        let ai = AiConfig {
            api_key: resolve_secret(
                "OpenAI API key",
                env(ENV_OPENAI_API_KEY),
                toml.ai.api_key.as_deref(),
            ),
            base_url: env(ENV_OPENAI_BASE_URL)
                .or_else(|| toml.ai.base_url.clone())
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: env(ENV_OPENAI_MODEL)
                .or_else(|| toml.ai.model.clone())
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            enrichment_placeholder: toml.ai.enrichment_placeholder.unwrap_or(false),
        };

        let provider = match env(ENV_VOICE_PROVIDER).or_else(|| toml.voice.provider.clone()) {
            Some(name) => name.parse()?,
            None => VoiceProvider::default(),
        };

        let voice = VoiceConfig {
            provider,
            api_key: resolve_secret(
                "Retell API key",
                env(ENV_RETELL_API_KEY),
                toml.voice.api_key.as_deref(),
            ),
            base_url: toml
                .voice
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_RETELL_BASE_URL.to_string()),
            agent_id: env(ENV_RETELL_AGENT_ID).or_else(|| toml.voice.agent_id.clone()),
            from_number: env(ENV_RETELL_FROM_NUMBER).or_else(|| toml.voice.from_number.clone()),
        };

        Ok(Self {
            host: toml
                .server
                .host
                .clone()
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(toml.server.port).unwrap_or(DEFAULT_PORT),
            database_url,
            ai,
            voice,
            log_level: toml.logging.level.clone(),
            config_file: None,
        })
    }
}

/// Resolve a credential from ENV then TOML
///
/// Logs a warning when the credential is set in both places.
pub fn resolve_secret(
    label: &str,
    env_value: Option<String>,
    toml_value: Option<&str>,
) -> Option<String> {
    let env_value = env_value.filter(|key| is_valid_key(key));
    let toml_value = toml_value.filter(|key| is_valid_key(key));

    match (env_value, toml_value) {
        (Some(key), Some(_)) => {
            warn!(
                "{} found in multiple sources: environment, TOML. \
                 Using environment (highest priority).",
                label
            );
            Some(key)
        }
        (Some(key), None) => {
            info!("{} loaded from environment variable", label);
            Some(key)
        }
        (None, Some(key)) => {
            info!("{} loaded from TOML config", label);
            Some(key.to_string())
        }
        (None, None) => None,
    }
}

/// Non-empty, non-whitespace value
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Read and parse a TOML configuration file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// `<config dir>/sales-copilot/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sales-copilot").join("config.toml"))
}

/// `sqlite://<data dir>/sales-copilot/copilot.db`
pub fn default_database_url() -> String {
    let path = dirs::data_dir()
        .map(|dir| dir.join("sales-copilot"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("copilot.db");
    format!("sqlite://{}", path.display())
}
