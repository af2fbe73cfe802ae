//! # Configuration
//!
//! Manages the loading and parsing of the relay's configuration file (`config.yaml`).
//! Defines the structs for the gateway, the classifier, the backend directory, the bridge and
//! the automation timings. Every section has defaults, so an empty file is a valid config.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "data/config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("environment variable {0} is not set")]
    MissingEnv(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default = "default_backends")]
    pub backends: Vec<BackendDescriptor>,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub automation: AutomationConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub activity: ActivityConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // serde_yaml treats an empty document as null rather than an empty map
        let config: AppConfig = if content.trim().is_empty() {
            serde_yaml::from_str("{}")?
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for backend in &self.backends {
            backend.base_url()?;
        }
        if self.bridge.xdotool_command.is_empty() {
            return Err(ConfigError::Invalid("bridge.xdotool_command must name a program".into()));
        }
        if self.activity.capacity == 0 {
            return Err(ConfigError::Invalid("activity.capacity must be at least 1".into()));
        }
        Ok(())
    }

}

/// Gateway HTTP listener.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_gateway_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassifierConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>, // e.g. "GEMINI_API_KEY"
    #[serde(default)]
    /// Request timeout in seconds.
    pub timeout: Option<u64>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            endpoint: None,
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout: None,
            temperature: None,
        }
    }
}

/// A statically configured candidate execution endpoint.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct BackendDescriptor {
    #[serde(default)]
    pub name: String,
    /// Base URL, e.g. `http://127.0.0.1:5002`.
    pub address: String,
    /// Lower values are tried first.
    #[serde(default)]
    pub priority: u32,
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

impl BackendDescriptor {
    pub fn new(name: &str, address: &str, priority: u32) -> Self {
        Self {
            name: name.to_string(),
            address: address.trim_end_matches('/').to_string(),
            priority,
            health_path: default_health_path(),
        }
    }

    /// The parsed address. Only `http`/`https` URLs with a host are accepted.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: &str| {
            ConfigError::Invalid(format!(
                "backend '{}' address '{}' {reason}",
                self.label(),
                self.address
            ))
        };
        let url = Url::parse(&self.address).map_err(|e| invalid(&format!("is not a URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("must use http or https"));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("has no host"));
        }
        Ok(url)
    }

    pub fn health_url(&self) -> Result<Url, ConfigError> {
        self.endpoint(&self.health_path)
    }

    pub fn execute_url(&self) -> Result<Url, ConfigError> {
        self.endpoint("execute")
    }

    /// Resolves `path` below the address, keeping any path prefix the address has.
    fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
        let mut base = self.base_url()?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|e| ConfigError::Invalid(format!("backend '{}' path '{path}': {e}", self.label())))
    }

    /// Name for logs; falls back to the address.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.address
        } else {
            &self.name
        }
    }
}


#[derive(Debug, Deserialize, Clone)]
pub struct RouterConfig {
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default = "default_execute_timeout_ms")]
    pub execute_timeout_ms: u64,
    #[serde(default = "default_max_result_chars")]
    pub max_result_chars: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: default_probe_timeout_ms(),
            execute_timeout_ms: default_execute_timeout_ms(),
            max_result_chars: default_max_result_chars(),
        }
    }
}

/// Which desktop driver the bridge uses.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DriverKind {
    /// Win32 on Windows, xdotool elsewhere.
    #[default]
    Auto,
    Xdotool,
    Win32,
}

/// Execution backend (bridge) HTTP listener.
#[derive(Debug, Deserialize, Clone)]
pub struct BridgeConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_bridge_port")]
    pub port: u16,
    #[serde(default)]
    pub driver: DriverKind,
    /// Per-call timeout for external driver processes.
    #[serde(default = "default_driver_timeout_ms")]
    pub driver_timeout_ms: u64,
    /// Program and leading arguments used to run xdotool, e.g. `["env", "DISPLAY=:1", "xdotool"]`.
    #[serde(default = "default_xdotool_command")]
    pub xdotool_command: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_bridge_port(),
            driver: DriverKind::default(),
            driver_timeout_ms: default_driver_timeout_ms(),
            xdotool_command: default_xdotool_command(),
        }
    }
}

/// Timings and affordances of the automation target.
#[derive(Debug, Deserialize, Clone)]
pub struct AutomationConfig {
    /// Case-insensitive substring of the target window title.
    #[serde(default = "default_window_marker")]
    pub window_marker: String,
    #[serde(default = "default_chat_hotkey")]
    pub chat_hotkey: String,
    #[serde(default = "default_focus_settle_ms")]
    pub focus_settle_ms: u64,
    #[serde(default = "default_surface_settle_ms")]
    pub surface_settle_ms: u64,
    #[serde(default = "default_clear_settle_ms")]
    pub clear_settle_ms: u64,
    #[serde(default = "default_type_interval_ms")]
    pub type_interval_ms: u64,
    #[serde(default = "default_inject_settle_ms")]
    pub inject_settle_ms: u64,
    /// Upper bound on the wait for a reply when the target has no ready signal.
    #[serde(default = "default_reply_dwell_ms")]
    pub reply_dwell_ms: u64,
    #[serde(default = "default_ready_poll_ms")]
    pub ready_poll_ms: u64,
    #[serde(default = "default_ready_max_polls")]
    pub ready_max_polls: u32,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            window_marker: default_window_marker(),
            chat_hotkey: default_chat_hotkey(),
            focus_settle_ms: default_focus_settle_ms(),
            surface_settle_ms: default_surface_settle_ms(),
            clear_settle_ms: default_clear_settle_ms(),
            type_interval_ms: default_type_interval_ms(),
            inject_settle_ms: default_inject_settle_ms(),
            reply_dwell_ms: default_reply_dwell_ms(),
            ready_poll_ms: default_ready_poll_ms(),
            ready_max_polls: default_ready_max_polls(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectorConfig {
    /// Clipboard text at or below this length is not trusted as a reply.
    #[serde(default = "default_min_plausible_chars")]
    pub min_plausible_chars: usize,
    #[serde(default = "default_tail_chars")]
    pub tail_chars: usize,
    #[serde(default = "default_ack_prefix_chars")]
    pub ack_prefix_chars: usize,
    #[serde(default = "default_copy_settle_ms")]
    pub copy_settle_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            min_plausible_chars: default_min_plausible_chars(),
            tail_chars: default_tail_chars(),
            ack_prefix_chars: default_ack_prefix_chars(),
            copy_settle_ms: default_copy_settle_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ActivityConfig {
    #[serde(default = "default_activity_capacity")]
    pub capacity: usize,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            capacity: default_activity_capacity(),
        }
    }
}

/// Twilio credentials for outbound summaries. When incomplete, summaries are only logged.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct NotifierConfig {
    #[serde(default)]
    pub account_sid: Option<String>,
    #[serde(default)]
    pub account_sid_env: Option<String>,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub auth_token_env: Option<String>,
    #[serde(default)]
    pub from_number: Option<String>,
    #[serde(default)]
    pub from_number_env: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub max_summary_chars: Option<usize>,
}

impl NotifierConfig {
    pub fn summary_limit(&self) -> usize {
        self.max_summary_chars.unwrap_or(320)
    }

    /// Resolves `(account_sid, auth_token, from_number)` from literals or env vars.
    pub fn credentials(&self) -> Option<(String, String, String)> {
        let sid = resolve(&self.account_sid, &self.account_sid_env)?;
        let token = resolve(&self.auth_token, &self.auth_token_env)?;
        let from = resolve(&self.from_number, &self.from_number_env)?;
        Some((sid, token, from))
    }

    pub fn own_number(&self) -> Option<String> {
        resolve(&self.from_number, &self.from_number_env)
    }
}

fn resolve(literal: &Option<String>, env_var: &Option<String>) -> Option<String> {
    literal
        .clone()
        .or_else(|| env_var.as_ref().and_then(|v| std::env::var(v).ok()))
        .filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub directory: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_dir(),
            file_name: None,
            filter: default_log_filter(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_gateway_port() -> u16 {
    5000
}
fn default_bridge_port() -> u16 {
    5002
}
fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_api_key_env() -> Option<String> {
    Some("GEMINI_API_KEY".to_string())
}
fn default_health_path() -> String {
    "/health".to_string()
}
fn default_backends() -> Vec<BackendDescriptor> {
    vec![
        BackendDescriptor::new("ui-bridge", "http://127.0.0.1:5002", 0),
        BackendDescriptor::new("chat-bridge", "http://127.0.0.1:5001", 1),
    ]
}
fn default_probe_timeout_ms() -> u64 {
    5_000
}
fn default_execute_timeout_ms() -> u64 {
    60_000
}
fn default_max_result_chars() -> usize {
    500
}
fn default_driver_timeout_ms() -> u64 {
    10_000
}
fn default_xdotool_command() -> Vec<String> {
    vec!["xdotool".to_string()]
}
fn default_window_marker() -> String {
    "cursor".to_string()
}
fn default_chat_hotkey() -> String {
    "ctrl+l".to_string()
}
fn default_focus_settle_ms() -> u64 {
    1_000
}
fn default_surface_settle_ms() -> u64 {
    2_000
}
fn default_clear_settle_ms() -> u64 {
    500
}
fn default_type_interval_ms() -> u64 {
    20
}
fn default_inject_settle_ms() -> u64 {
    1_000
}
fn default_reply_dwell_ms() -> u64 {
    8_000
}
fn default_ready_poll_ms() -> u64 {
    500
}
fn default_ready_max_polls() -> u32 {
    16
}
fn default_min_plausible_chars() -> usize {
    20
}
fn default_tail_chars() -> usize {
    200
}
fn default_ack_prefix_chars() -> usize {
    30
}
fn default_copy_settle_ms() -> u64 {
    1_000
}
fn default_activity_capacity() -> usize {
    50
}
fn default_log_dir() -> String {
    "data".to_string()
}
fn default_log_filter() -> String {
    "info,hyper=warn,reqwest=warn".to_string()
}
