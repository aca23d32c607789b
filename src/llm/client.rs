use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionTool, ChatCompletionToolChoiceOption,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
    Client,
};
use crate::config::Config;
use std::time::Duration;

/// OpenAI-compatible chat client used by the agent.
pub struct LlmClient {
    chat_client: Client<OpenAIConfig>,
    chat_model: String,
    tool_choice_required: bool,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(config: &Config) -> Self {
        let mut chat_config = OpenAIConfig::new()
            .with_api_base(&config.llm_url);

        if let Some(key) = &config.llm_api_key {
            chat_config = chat_config.with_api_key(key);
        } else {
            chat_config = chat_config.with_api_key("unused");
        }

        Self {
            chat_client: Client::with_config(chat_config),
            chat_model: config.llm_model.clone(),
            tool_choice_required: config.agent_tool_choice_required,
            timeout: Duration::from_secs(config.llm_timeout_secs),
        }
    }

    pub fn model(&self) -> &str {
        &self.chat_model
    }

    pub async fn chat_with_tools(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        tools: Vec<ChatCompletionTool>,
    ) -> anyhow::Result<CreateChatCompletionResponse> {
        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(&self.chat_model).messages(messages);

        if !tools.is_empty() {
            request.tools(tools);
            if self.tool_choice_required {
                request.tool_choice(ChatCompletionToolChoiceOption::Required);
            }
        }

        let request = request.build()?;
        let response = tokio::time::timeout(self.timeout, self.chat_client.chat().create(request))
            .await
            .map_err(|_| anyhow::anyhow!("LLM request timed out after {}s", self.timeout.as_secs()))??;

        Ok(response)
    }
}
