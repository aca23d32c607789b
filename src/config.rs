use crate::mcp::config::McpServerConfig;
use crate::odin::{API_BASE_URL, DEFAULT_TIMEOUT_SECS};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),

    #[error("Invalid MCP server list in {source_name}: {message}")]
    InvalidMcpServers {
        source_name: &'static str,
        message: String,
    },
}

#[derive(Clone, Deserialize)]
pub struct Config {
    pub discord_token: String,
    pub guild_id: Option<u64>,

    // 0DIN threat feed
    pub odin_api_key: Option<String>,
    pub odin_api_url: String,
    pub odin_timeout_secs: u64,

    // LLM agent
    pub llm_url: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub llm_timeout_secs: u64,
    pub agent_max_iterations: usize,
    pub agent_tool_choice_required: bool,

    pub mcp_servers: Vec<McpServerConfig>,
    pub mcp_timeout_secs: u64,

    pub webpage_max_chars: usize,
    pub log_dir: String,
}

const DEFAULT_LLM_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "o3";
const MCP_SERVERS_FILE: &str = "mcp_servers.toml";
/// URL of an SSE MCP server from older deployments; no longer honoured.
const LEGACY_MCP_URL_VAR: &str = "MCP_DISCORD";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Ok(Self::build()?)
    }

    fn build() -> Result<Self, ConfigError> {
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| ConfigError::MissingVar("DISCORD_TOKEN"))?,
            guild_id: env::var("GUILD_ID").ok().and_then(|id| id.parse().ok()),
            odin_api_key: env::var("ODIN_API_KEY").ok().filter(|key| !key.is_empty()),
            odin_api_url: env::var("ODIN_API_URL").unwrap_or_else(|_| API_BASE_URL.to_string()),
            odin_timeout_secs: parse_or("ODIN_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            llm_url: env::var("LLM_URL").unwrap_or_else(|_| DEFAULT_LLM_URL.to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            llm_api_key: env::var("OPENAI_API_KEY").ok(),
            llm_timeout_secs: parse_or("LLM_TIMEOUT_SECS", 120),
            agent_max_iterations: parse_or("AGENT_MAX_ITERATIONS", 10),
            agent_tool_choice_required: parse_or("AGENT_TOOL_CHOICE_REQUIRED", true),
            mcp_servers: Self::load_mcp_servers()?,
            mcp_timeout_secs: parse_or("MCP_TIMEOUT_SECS", 60),
            webpage_max_chars: parse_or("WEBPAGE_MAX_CHARS", 8000),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        })
    }

    /// `MCP_DISCORD` when it is set but no stdio server is configured, so
    /// startup can point at the migration.
    pub fn legacy_mcp_url(&self) -> Option<String> {
        if !self.mcp_servers.is_empty() {
            return None;
        }
        env::var(LEGACY_MCP_URL_VAR).ok().filter(|url| !url.is_empty())
    }

    pub fn load_mcp_servers() -> Result<Vec<McpServerConfig>, ConfigError> {
        if let Ok(content) = fs::read_to_string(MCP_SERVERS_FILE) {
            #[derive(Deserialize)]
            struct McpWrapper {
                servers: Vec<McpServerConfig>,
            }
            let wrapper: McpWrapper =
                toml::from_str(&content).map_err(|e| ConfigError::InvalidMcpServers {
                    source_name: MCP_SERVERS_FILE,
                    message: e.to_string(),
                })?;
            return Ok(wrapper.servers);
        }

        // Fallback to env variable
        if let Ok(env_servers) = env::var("MCP_SERVERS") {
            let servers =
                serde_json::from_str(&env_servers).map_err(|e| ConfigError::InvalidMcpServers {
                    source_name: "MCP_SERVERS",
                    message: e.to_string(),
                })?;
            return Ok(servers);
        }

        Ok(Vec::new())
    }
}

/// Parse an env var, falling back to `default` when unset or malformed.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("guild_id", &self.guild_id)
            .field(
                "odin_api_key",
                &self.odin_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("odin_api_url", &self.odin_api_url)
            .field("odin_timeout_secs", &self.odin_timeout_secs)
            .field("llm_url", &self.llm_url)
            .field("llm_model", &self.llm_model)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("agent_max_iterations", &self.agent_max_iterations)
            .field(
                "agent_tool_choice_required",
                &self.agent_tool_choice_required,
            )
            .field("mcp_servers", &self.mcp_servers)
            .field("mcp_timeout_secs", &self.mcp_timeout_secs)
            .field("webpage_max_chars", &self.webpage_max_chars)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

/// Discord message limit is 2000 characters
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        discord_token: "test".to_string(),
        guild_id: None,
        odin_api_key: Some("test-key".to_string()),
        odin_api_url: API_BASE_URL.to_string(),
        odin_timeout_secs: DEFAULT_TIMEOUT_SECS,
        llm_url: "http://localhost:1/v1".to_string(),
        llm_model: "test-model".to_string(),
        llm_api_key: None,
        llm_timeout_secs: 5,
        agent_max_iterations: 4,
        agent_tool_choice_required: true,
        mcp_servers: Vec::new(),
        mcp_timeout_secs: 5,
        webpage_max_chars: 100,
        log_dir: "logs".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    // Env vars are process-global; keep every env mutation in this one test.
    #[test]
    fn test_config_logic() {
        // 1. Test missing vars
        env::remove_var("DISCORD_TOKEN");
        let result = Config::build();
        assert!(
            matches!(result, Err(ConfigError::MissingVar("DISCORD_TOKEN"))),
            "Should fail when required vars are missing"
        );

        // 2. Test defaults
        env::set_var("DISCORD_TOKEN", "test_token");
        env::remove_var("ODIN_API_KEY");
        env::set_var("ODIN_TIMEOUT_SECS", "not-a-number");
        let config = Config::build().unwrap();
        assert_eq!(config.discord_token, "test_token");
        assert_eq!(config.odin_api_key, None);
        assert_eq!(config.odin_api_url, "https://0din.ai/api/v1/threatfeed/");
        assert_eq!(config.odin_timeout_secs, 15);
        assert_eq!(config.llm_model, "o3");
        assert_eq!(config.agent_max_iterations, 10);
        assert!(config.agent_tool_choice_required);

        // 3. Empty key counts as unset
        env::set_var("ODIN_API_KEY", "");
        assert_eq!(Config::build().unwrap().odin_api_key, None);

        // 4. Test debug redaction
        env::set_var("ODIN_API_KEY", "secret_odin_key");
        env::set_var("OPENAI_API_KEY", "secret_api_key");
        let config_redacted = Config::build().unwrap();
        let debug_output = format!("{:?}", config_redacted);
        assert!(!debug_output.contains("test_token"));
        assert!(!debug_output.contains("secret_odin_key"));
        assert!(!debug_output.contains("secret_api_key"));
        assert!(debug_output.contains("[REDACTED]"));

        // 5. MCP servers from env
        env::set_var(
            "MCP_SERVERS",
            r#"[{"name":"discord","command":"docker","args":["run","-i","mcp-discord"]}]"#,
        );
        let servers = Config::load_mcp_servers().unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].name, "discord");
        assert_eq!(servers[0].command, "docker");

        env::set_var("MCP_SERVERS", "not json");
        assert!(matches!(
            Config::load_mcp_servers(),
            Err(ConfigError::InvalidMcpServers { source_name: "MCP_SERVERS", .. })
        ));

        // 6. Legacy SSE setting is reported only without stdio servers
        env::remove_var("MCP_SERVERS");
        env::set_var("MCP_DISCORD", "http://mcp-discord:80");
        let legacy = Config::build().unwrap();
        assert_eq!(
            legacy.legacy_mcp_url().as_deref(),
            Some("http://mcp-discord:80")
        );
        let mut with_servers = legacy.clone();
        with_servers.mcp_servers = servers;
        assert_eq!(with_servers.legacy_mcp_url(), None);

        // Cleanup
        env::remove_var("MCP_DISCORD");
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("ODIN_API_KEY");
        env::remove_var("OPENAI_API_KEY");
        env::remove_var("ODIN_TIMEOUT_SECS");
        env::remove_var("MCP_SERVERS");
    }
}
