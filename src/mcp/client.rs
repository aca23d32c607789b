use crate::config::Config;
use crate::mcp::config::McpServerConfig;
use crate::tools::Tool;
use anyhow::{anyhow, Context as _, Result};
use async_trait::async_trait;
use rmcp::{
    model::{CallToolRequestParam, Tool as McpToolInfo},
    service::{RoleClient, RunningService, ServiceExt},
    transport::child_process::TokioChildProcess,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

type McpService = Arc<RunningService<RoleClient, ()>>;

/// Running MCP servers the agent can call into, keyed by server name.
pub struct McpClientManager {
    services: Mutex<BTreeMap<String, McpService>>,
    call_timeout: Duration,
}

impl McpClientManager {
    pub fn new(config: &Config) -> Self {
        Self {
            services: Mutex::new(BTreeMap::new()),
            call_timeout: Duration::from_secs(config.mcp_timeout_secs),
        }
    }

    /// Start every configured server; a server that fails is skipped.
    pub async fn connect_all(&self, servers: &[McpServerConfig]) {
        for server in servers {
            if let Err(e) = self.connect(server).await {
                warn!("Skipping MCP server '{}': {:#}", server.name, e);
            }
        }
    }

    pub async fn connect(&self, server: &McpServerConfig) -> Result<()> {
        let mut services = self.services.lock().await;
        if services.contains_key(&server.name) {
            debug!("MCP server '{}' already running", server.name);
            return Ok(());
        }

        info!(
            "Starting MCP server '{}': {} {}",
            server.name,
            server.command,
            server.args.join(" ")
        );
        let mut cmd = Command::new(&server.command);
        cmd.args(&server.args).envs(&server.env);

        let transport = TokioChildProcess::new(cmd)
            .with_context(|| format!("Failed to spawn `{}`", server.command))?;
        let service = ()
            .serve(transport)
            .await
            .map_err(|e| anyhow!("MCP handshake with '{}' failed: {}", server.name, e))?;

        info!("Connected to MCP server '{}'", server.name);
        services.insert(server.name.clone(), Arc::new(service));
        Ok(())
    }

    pub async fn list_active_servers(&self) -> Vec<String> {
        self.services.lock().await.keys().cloned().collect()
    }

    /// Every tool exposed by the running servers, wrapped for the agent.
    pub async fn list_all_tools(&self) -> Vec<Arc<dyn Tool>> {
        let services = self.services.lock().await;
        let mut tools: Vec<Arc<dyn Tool>> = Vec::new();

        for (server_name, service) in services.iter() {
            let listing = match service.list_tools(Default::default()).await {
                Ok(listing) => listing,
                Err(e) => {
                    warn!("Could not list tools of MCP server '{}': {}", server_name, e);
                    continue;
                }
            };
            debug!(
                "MCP server '{}' exposes {} tool(s)",
                server_name,
                listing.tools.len()
            );
            for info in listing.tools {
                tools.push(Arc::new(McpTool::new(
                    server_name,
                    service.clone(),
                    info,
                    self.call_timeout,
                )));
            }
        }
        tools
    }
}

/// One remote MCP tool seen through the agent's [`Tool`] interface.
pub struct McpTool {
    server_name: String,
    service: McpService,
    name: String,
    description: String,
    input_schema: Value,
    call_timeout: Duration,
}

impl McpTool {
    fn new(server_name: &str, service: McpService, info: McpToolInfo, call_timeout: Duration) -> Self {
        Self {
            server_name: server_name.to_string(),
            service,
            name: info.name.to_string(),
            description: info.description.map(|d| d.to_string()).unwrap_or_default(),
            input_schema: Value::Object((*info.input_schema).clone()),
            call_timeout,
        }
    }
}

/// Tool arguments must be a JSON object; `null` means no arguments.
fn call_arguments(params: Value) -> Result<Option<serde_json::Map<String, Value>>> {
    match params {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => Err(anyhow!("Tool arguments must be an object, got {}", other)),
    }
}

#[async_trait]
impl Tool for McpTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.input_schema.clone()
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        debug!("Calling MCP tool '{}' on '{}'", self.name, self.server_name);
        let request = CallToolRequestParam {
            name: self.name.clone().into(),
            arguments: call_arguments(params)?,
            meta: None,
            task: None,
        };

        let result = tokio::time::timeout(self.call_timeout, self.service.call_tool(request))
            .await
            .map_err(|_| {
                error!(
                    "MCP tool '{}' timed out after {:?}",
                    self.name, self.call_timeout
                );
                anyhow!("MCP tool '{}' timed out after {:?}", self.name, self.call_timeout)
            })??;

        info!("MCP tool '{}' on '{}' finished", self.name, self.server_name);
        Ok(serde_json::to_value(result).unwrap_or_else(|e| json!({ "error": e.to_string() })))
    }
}
