//! Configuration loading and validation for mcplink.
//!
//! Loads `~/.mcplink/config.toml` (or the file named by `--config` /
//! `MCPLINK_CONFIG`) and applies environment variable overrides. JSON files
//! are accepted too, including the `mcpServers` layout that desktop MCP
//! clients use.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM backend settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// HTTP API settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Tool servers, keyed by name. Loaded in name order.
    #[serde(default, alias = "mcpServers")]
    pub mcp_servers: BTreeMap<String, McpServerConfig>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible backend name ("openai", "ollama", "openrouter", ...)
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Overrides the provider's well-known base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Replaces the built-in system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_max_tokens() -> u32 {
    4096
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            api_url: None,
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            system_prompt: None,
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("system_prompt", &self.system_prompt.as_ref().map(|p| p.len()))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model calls per turn
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Remove '\n' from each fragment when aggregating non-streaming replies
    #[serde(default = "default_true")]
    pub strip_newlines: bool,
}

fn default_max_iterations() -> u32 {
    25
}
fn default_true() -> bool {
    true
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            strip_newlines: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            cors_origins: vec![],
        }
    }
}

/// One stdio tool server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerConfig {
    /// Executable to spawn
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment; values may reference `${VAR}`
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Per-call timeout for this server's tools
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
}

fn default_tool_timeout() -> u64 {
    30
}

impl McpServerConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: vec![],
            env: BTreeMap::new(),
            enabled: true,
            timeout_secs: default_tool_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `explicit`, `MCPLINK_CONFIG`, or the default
    /// path, in that order, then apply environment overrides:
    /// - `MCPLINK_API_KEY`, then `OPENAI_API_KEY` (only when no key is configured)
    /// - `MCPLINK_PROVIDER`
    /// - `MCPLINK_MODEL`
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = Self::resolve_path(explicit);
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Which file `load` reads.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("MCPLINK_CONFIG").map(PathBuf::from))
            .unwrap_or_else(|| Self::config_dir().join("config.toml"))
    }

    /// Load configuration from a specific file path.
    ///
    /// A missing file yields defaults. `.json` files are parsed as JSON,
    /// everything else as TOML.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            serde_json::from_str::<Self>(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str::<Self>(&content).map_err(|e| e.to_string())
        };
        let config = parsed.map_err(|reason| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason,
        })?;

        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            servers = config.mcp_servers.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.llm.api_key.is_none() {
            self.llm.api_key = lookup("MCPLINK_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }
        if let Some(provider) = lookup("MCPLINK_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Some(model) = lookup("MCPLINK_MODEL") {
            self.llm.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".mcplink")
    }

    /// Servers that should be started, in name order.
    pub fn enabled_servers(&self) -> impl Iterator<Item = (&str, &McpServerConfig)> {
        self.mcp_servers
            .iter()
            .filter(|(_, server)| server.enabled)
            .map(|(name, server)| (name.as_str(), server))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::ValidationError(
                "llm.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".into(),
            ));
        }

        if let Some((name, _)) = self
            .enabled_servers()
            .find(|(_, server)| server.command.trim().is_empty())
        {
            return Err(ConfigError::ValidationError(format!(
                "mcp_servers.{name}.command must not be empty"
            )));
        }

        Ok(())
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_config(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.gateway.port, 8000);
        assert_eq!(config.agent.max_iterations, 25);
        assert!(config.agent.strip_newlines);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let mut config = AppConfig::default();
        config
            .mcp_servers
            .insert("fs".into(), McpServerConfig::new("npx"));
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.llm.model, config.llm.model);
        assert_eq!(parsed.mcp_servers["fs"].command, "npx");
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            llm: LlmConfig {
                temperature: 5.0,
                ..LlmConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_iterations_rejected() {
        let config = AppConfig {
            agent: AgentConfig {
                max_iterations: 0,
                strip_newlines: true,
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_command_rejected_only_when_enabled() {
        let mut config = AppConfig::default();
        let mut server = McpServerConfig::new("  ");
        config.mcp_servers.insert("broken".into(), server.clone());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("mcp_servers.broken.command"));

        server.enabled = false;
        config.mcp_servers.insert("broken".into(), server);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.llm.provider, "openai");
        assert!(config.mcp_servers.is_empty());
    }

    #[test]
    fn toml_file_with_servers() {
        let file = write_config(
            ".toml",
            r#"
[llm]
provider = "ollama"
model = "llama3.1"

[agent]
strip_newlines = false

[mcp_servers.weather]
command = "python"
args = ["weather.py"]
env = { API_TOKEN = "${WEATHER_TOKEN}" }
timeout_secs = 5

[mcp_servers.disabled]
command = "nothing"
enabled = false
"#,
        );
        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.llm.provider, "ollama");
        assert!(!config.agent.strip_newlines);
        let weather = &config.mcp_servers["weather"];
        assert_eq!(weather.args, vec!["weather.py"]);
        assert_eq!(weather.env["API_TOKEN"], "${WEATHER_TOKEN}");
        assert_eq!(weather.timeout_secs, 5);

        let enabled: Vec<_> = config.enabled_servers().map(|(name, _)| name).collect();
        assert_eq!(enabled, vec!["weather"]);
    }

    #[test]
    fn json_file_accepts_mcp_servers_key() {
        let file = write_config(
            ".json",
            r#"{
                "mcpServers": {
                    "filesystem": {
                        "command": "npx",
                        "args": ["-y", "@modelcontextprotocol/server-filesystem", "/tmp"]
                    }
                }
            }"#,
        );
        let config = AppConfig::load_from(file.path()).unwrap();
        let fs = &config.mcp_servers["filesystem"];
        assert_eq!(fs.command, "npx");
        assert_eq!(fs.args.len(), 3);
        assert!(fs.enabled);
        assert_eq!(fs.timeout_secs, 30);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let file = write_config(".toml", "[llm\nprovider = ");
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-openai"),
            ("MCPLINK_MODEL", "gpt-4.1"),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-openai"));
        assert_eq!(config.llm.model, "gpt-4.1");
        assert_eq!(config.llm.provider, "openai");
    }

    #[test]
    fn configured_key_wins_over_env() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("from-file".into());
        config.apply_env(|key| (key == "MCPLINK_API_KEY").then(|| "from-env".to_string()));
        assert_eq!(config.llm.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn explicit_path_wins() {
        let path = AppConfig::resolve_path(Some(Path::new("/etc/mcplink.toml")));
        assert_eq!(path, PathBuf::from("/etc/mcplink.toml"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let llm = LlmConfig {
            api_key: Some("sk-secret".into()),
            ..LlmConfig::default()
        };
        let debug = format!("{llm:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
