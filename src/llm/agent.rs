use crate::llm::client::LlmClient;
use crate::llm::output::StructuredOutput;
use crate::mcp::client::McpClientManager;
use crate::tools::{Tool, ToolRegistry};
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType, FunctionObjectArgs,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Name of the tool the model calls to hand back its structured answer.
pub const FINAL_ANSWER_TOOL: &str = "final_answer";

/// Everything exchanged during one agent run.
#[derive(Debug, Serialize)]
pub struct AgentTrace {
    pub model: String,
    pub iterations: usize,
    pub messages: Vec<ChatCompletionRequestMessage>,
    pub final_output: Option<StructuredOutput>,
}

pub struct Agent {
    llm: Arc<LlmClient>,
    tools: Arc<ToolRegistry>,
    mcp_manager: Option<Arc<McpClientManager>>,
    max_iterations: usize,
}

impl Agent {
    pub fn new(
        llm: Arc<LlmClient>,
        tools: Arc<ToolRegistry>,
        mcp_manager: Option<Arc<McpClientManager>>,
        max_iterations: usize,
    ) -> Self {
        Self {
            llm,
            tools,
            mcp_manager,
            max_iterations,
        }
    }

    /// Run the tool loop until the model produces a final answer.
    pub async fn run(&self, instructions: &str, prompt: &str) -> anyhow::Result<AgentTrace> {
        let mut trace = AgentTrace {
            model: self.llm.model().to_string(),
            iterations: 0,
            messages: vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(instructions)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ],
            final_output: None,
        };

        // Get all available tools (built-in + MCP)
        let mut all_tools = self.tools.list_tools();
        if let Some(mcp) = &self.mcp_manager {
            all_tools.extend(mcp.list_all_tools().await);
        }
        let tool_definitions = build_tool_definitions(&all_tools)?;

        for i in 0..self.max_iterations {
            trace.iterations = i + 1;
            tracing::info!("Agent iteration {}/{}", i + 1, self.max_iterations);

            let response = self
                .llm
                .chat_with_tools(trace.messages.clone(), tool_definitions.clone())
                .await?;
            let choice = response
                .choices
                .first()
                .ok_or_else(|| anyhow::anyhow!("No response from LLM"))?;
            let assistant_message = &choice.message;

            let Some(tool_calls) = assistant_message.tool_calls.clone().filter(|c| !c.is_empty()) else {
                // Plain text answer: wrap it so callers always see structured output.
                let content = assistant_message.content.clone().unwrap_or_default();
                trace.messages.push(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(content.clone())
                        .build()?
                        .into(),
                );
                if !content.trim().is_empty() {
                    trace.final_output = Some(StructuredOutput::from_text(content));
                }
                tracing::info!("Agent task completed after {} iterations", i + 1);
                return Ok(trace);
            };

            trace.messages.push(
                ChatCompletionRequestAssistantMessageArgs::default()
                    .tool_calls(tool_calls.clone())
                    .build()?
                    .into(),
            );

            tracing::info!("LLM requested {} tool calls", tool_calls.len());
            for tool_call in &tool_calls {
                if tool_call.function.name == FINAL_ANSWER_TOOL {
                    match serde_json::from_str::<StructuredOutput>(&tool_call.function.arguments) {
                        Ok(output) => {
                            tracing::info!("Agent task completed after {} iterations", i + 1);
                            trace.final_output = Some(output);
                            return Ok(trace);
                        }
                        Err(e) => {
                            tracing::warn!("Agent produced an invalid final answer: {}", e);
                            push_tool_result(
                                &mut trace.messages,
                                tool_call,
                                json!({"error": format!("Invalid final answer: {}", e)}),
                            )?;
                            continue;
                        }
                    }
                }

                let result = self.execute_tool_call(tool_call, &all_tools).await;
                push_tool_result(&mut trace.messages, tool_call, result)?;
            }
        }

        tracing::warn!(
            "Agent exceeded max iterations ({}) - potential runaway loop or recursive tool calls",
            self.max_iterations
        );
        Err(anyhow::anyhow!(
            "I've reached my reasoning limit for this task ({} steps). Try breaking your request into smaller, more specific steps.",
            self.max_iterations
        ))
    }

    /// Execute one tool call. Failures are returned to the model as JSON.
    async fn execute_tool_call(
        &self,
        tool_call: &ChatCompletionMessageToolCall,
        available_tools: &[Arc<dyn Tool>],
    ) -> Value {
        let name = &tool_call.function.name;
        let arguments: Value = match serde_json::from_str(&tool_call.function.arguments) {
            Ok(arguments) => arguments,
            Err(e) => {
                tracing::error!("Tool {} called with malformed arguments: {}", name, e);
                return json!({"error": format!("Malformed arguments: {}", e)});
            }
        };

        tracing::info!("Agent executing tool: {} with arguments: {}", name, arguments);

        let Some(tool) = available_tools.iter().find(|t| t.name() == name) else {
            tracing::error!("Tool not found: {}", name);
            return json!({"error": format!("Tool not found: {}", name)});
        };

        match tool.execute(arguments).await {
            Ok(v) => {
                tracing::debug!("Tool {} returned: {}", name, v);
                v
            }
            Err(e) => {
                tracing::error!("Tool {} failed: {}", name, e);
                json!({"error": e.to_string()})
            }
        }
    }
}

fn push_tool_result(
    messages: &mut Vec<ChatCompletionRequestMessage>,
    tool_call: &ChatCompletionMessageToolCall,
    result: Value,
) -> anyhow::Result<()> {
    messages.push(
        ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(tool_call.id.clone())
            .content(result.to_string())
            .build()?
            .into(),
    );
    Ok(())
}

fn build_tool_definitions(tools: &[Arc<dyn Tool>]) -> anyhow::Result<Vec<ChatCompletionTool>> {
    let mut definitions = Vec::with_capacity(tools.len() + 1);
    for tool in tools {
        definitions.push(function_tool(
            tool.name(),
            tool.description(),
            tool.parameters_schema(),
        )?);
    }
    definitions.push(function_tool(
        FINAL_ANSWER_TOOL,
        "Return the final structured answer to the user. Always finish by calling this tool.",
        StructuredOutput::parameters_schema(),
    )?);
    Ok(definitions)
}

fn function_tool(name: &str, description: &str, parameters: Value) -> anyhow::Result<ChatCompletionTool> {
    Ok(ChatCompletionToolArgs::default()
        .r#type(ChatCompletionToolType::Function)
        .function(
            FunctionObjectArgs::default()
                .name(name)
                .description(description)
                .parameters(parameters)
                .build()?,
        )
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::output::AgentOutput;
    use crate::llm::testing::{agent_for, completion, tool_call_message};

    #[tokio::test]
    async fn test_final_answer_ends_the_run() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion(tool_call_message(
                FINAL_ANSWER_TOOL,
                json!({"response": {"type": "agent_response", "response_type": "answer", "message": "Hello!"}}),
            )))
            .create_async()
            .await;

        let trace = agent_for(&server, 3).run("instructions", "hi").await.unwrap();

        mock.assert_async().await;
        assert_eq!(trace.iterations, 1);
        let output = trace.final_output.unwrap();
        assert_eq!(output.format_message(), "Hello!");
    }

    #[tokio::test]
    async fn test_tool_results_are_fed_back() {
        let mut server = mockito::Server::new_async().await;
        // Only the second request carries a tool result.
        let second = server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::Regex(r#""role":"tool""#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion(tool_call_message(
                FINAL_ANSWER_TOOL,
                json!({"response": {
                    "type": "submission_status",
                    "uuid": "u",
                    "submission_status": {"uuid": "u", "status": "processed", "details": "It has been scanned"}
                }}),
            )))
            .create_async()
            .await;
        let first = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion(tool_call_message("get_current_gmt_time", json!({}))))
            .expect(1)
            .create_async()
            .await;

        let trace = agent_for(&server, 3).run("instructions", "status?").await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(trace.iterations, 2);
        assert!(matches!(
            trace.final_output.unwrap().response,
            AgentOutput::SubmissionStatus(_)
        ));
        // system, user, assistant(tool call), tool result, assistant(final)
        assert_eq!(trace.messages.len(), 5);
    }

    #[tokio::test]
    async fn test_plain_text_is_wrapped() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion(json!({"role": "assistant", "content": "Just text"})))
            .create_async()
            .await;

        let trace = agent_for(&server, 3).run("instructions", "hi").await.unwrap();
        assert_eq!(trace.final_output.unwrap().format_message(), "Just text");
    }

    #[tokio::test]
    async fn test_iteration_limit_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion(tool_call_message("no_such_tool", json!({}))))
            .create_async()
            .await;

        let err = agent_for(&server, 2).run("instructions", "loop").await.unwrap_err();
        assert!(err.to_string().contains("reasoning limit"));
    }
}
