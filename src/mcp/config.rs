use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A stdio MCP server, typically a container such as
/// `docker run -i --rm -e DISCORD_TOKEN mcp-discord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}
