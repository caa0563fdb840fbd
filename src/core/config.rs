//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.charla/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::RedirectPolicy;
use crate::core::quota::FREE_MESSAGE_LIMIT;
use crate::core::redirect::REDIRECT_DELAY;
use crate::core::state::Routes;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CharlaConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub redirect: RedirectConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub ticker: TickerConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub data_dir: Option<String>,
    pub required_keys: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AssistantConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct QuotaConfig {
    pub free_message_limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RedirectConfig {
    pub delay_ms: Option<u64>,
    pub policy: Option<RedirectPolicy>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RoutesConfig {
    pub sign_in: Option<String>,
    pub pricing: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TickerConfig {
    pub symbols: Option<Vec<String>>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TICKER_SYMBOLS: &[&str] = &[
    "SPX", "NDX", "DJI", "BTCUSD", "ETHUSD", "EURUSD", "AAPL", "NVDA",
];

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful financial assistant. \
    Answer questions about markets, companies and personal finance clearly. \
    Be direct, be honest about uncertainty, and never present speculation as fact.";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub data_dir: PathBuf,
    pub required_keys: Vec<String>,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub system_prompt: String,
    pub free_message_limit: u32,
    pub redirect_delay: Duration,
    pub redirect_policy: RedirectPolicy,
    pub routes: Routes,
    pub ticker_symbols: Vec<String>,
}

impl ResolvedConfig {
    pub fn chats_dir(&self) -> PathBuf {
        self.data_dir.join("chats")
    }

    pub fn profile_path(&self) -> PathBuf {
        self.data_dir.join("profile.json")
    }

    /// Required keys that are not available from the environment.
    /// The API key also counts as present when it was set in the config file.
    pub fn missing_keys(&self) -> Vec<String> {
        missing_keys(&self.required_keys, |key| {
            if key == API_KEY_ENV && self.api_key.is_some() {
                return self.api_key.clone();
            }
            std::env::var(key).ok()
        })
    }
}

/// Returns every key in `required` for which `lookup` yields nothing or a blank value.
pub fn missing_keys(required: &[String], lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
    required
        .iter()
        .filter(|key| lookup(key).is_none_or(|value| value.trim().is_empty()))
        .cloned()
        .collect()
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.charla`.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".charla"))
}

/// Returns the path to `~/.charla/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    default_data_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.charla/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `CharlaConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<CharlaConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(CharlaConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<CharlaConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(CharlaConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: CharlaConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Charla Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# data_dir = "~/.charla"
# required_keys = ["OPENAI_API_KEY"]  # Warned about when unset

# [assistant]
# api_key = "sk-..."                  # Or set OPENAI_API_KEY env var
# base_url = "https://api.openai.com/v1"   # Or CHARLA_BASE_URL
# model = "gpt-4o-mini"               # Or CHARLA_MODEL
# system_prompt = "You are a helpful financial assistant."

# [quota]
# free_message_limit = 3

# [redirect]
# delay_ms = 1500
# policy = "premium-only"             # "premium-only" or "everyone"

# [routes]
# sign_in = "/sign-in"
# pricing = "/pricing"

# [ticker]
# symbols = ["SPX", "NDX", "BTCUSD", "EURUSD"]
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Expand a leading `~/` against the home directory.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_policy` is from the CLI flag (None = not specified).
pub fn resolve(config: &CharlaConfig, cli_policy: Option<RedirectPolicy>) -> ResolvedConfig {
    let data_dir = config
        .general
        .data_dir
        .as_deref()
        .map(expand_home)
        .or_else(default_data_dir)
        .unwrap_or_else(|| PathBuf::from(".charla"));

    let required_keys = config
        .general
        .required_keys
        .clone()
        .unwrap_or_else(|| vec![API_KEY_ENV.to_string()]);

    // API key: env → config
    let api_key = std::env::var(API_KEY_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| config.assistant.api_key.clone());

    // Base URL: env → config → default
    let base_url = std::env::var("CHARLA_BASE_URL")
        .ok()
        .or_else(|| config.assistant.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Model: env → config → default
    let model = std::env::var("CHARLA_MODEL")
        .ok()
        .or_else(|| config.assistant.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    // Redirect policy: CLI → config → default
    let redirect_policy = cli_policy
        .or(config.redirect.policy)
        .unwrap_or_default();

    let defaults = Routes::default();
    let routes = Routes {
        sign_in: config.routes.sign_in.clone().unwrap_or(defaults.sign_in),
        pricing: config.routes.pricing.clone().unwrap_or(defaults.pricing),
        ..defaults
    };

    let ticker_symbols = config.ticker.symbols.clone().unwrap_or_else(|| {
        DEFAULT_TICKER_SYMBOLS
            .iter()
            .map(|s| s.to_string())
            .collect()
    });

    ResolvedConfig {
        data_dir,
        required_keys,
        api_key,
        base_url,
        model,
        system_prompt: config
            .assistant
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        free_message_limit: config.quota.free_message_limit.unwrap_or(FREE_MESSAGE_LIMIT),
        redirect_delay: config
            .redirect
            .delay_ms
            .map(Duration::from_millis)
            .unwrap_or(REDIRECT_DELAY),
        redirect_policy,
        routes,
        ticker_symbols,
    }
}
