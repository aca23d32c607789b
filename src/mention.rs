use crate::discord_text::strip_bot_mentions;
use crate::llm::agent::{Agent, AgentTrace};
use crate::llm::output::AgentOutput;
use crate::llm::prompt::build_instructions;
use crate::reply::{ChannelSink, ReplySink};
use crate::summarize::write_daily_summary;
use crate::{Data, Error};
use anyhow::Context as _;
use chrono::{Local, Utc};
use poise::serenity_prelude as serenity;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

pub const HELLO_RESPONSE: &str = "world!";
pub const STARTUP_GREETING: &str = "Hi everyone!";
pub const USAGE_INSTRUCTIONS_MSG: &str =
    "If you want me to check your submission, @ me and write '/check UUID'";
pub const NO_OUTPUT_MSG: &str =
    "I couldn't process your request. Please try again in a few moments.";
pub const AGENT_ERROR_MSG: &str =
    "I encountered an error while processing your request. Please try again in a few moments.";

/// Messages from bots, this one included, are never answered.
pub fn is_ignored_author(author_is_bot: bool, author_id: u64, bot_id: u64) -> bool {
    author_is_bot || author_id == bot_id
}

/// Reply of the plain greeter bot, if any.
pub fn greeting_reply(content: &str, mentions_bot: bool) -> Option<&'static str> {
    if content.to_lowercase() == "hello" {
        Some(HELLO_RESPONSE)
    } else if mentions_bot {
        Some(USAGE_INSTRUCTIONS_MSG)
    } else {
        None
    }
}

pub async fn respond_to_greeting(
    sink: &dyn ReplySink,
    content: &str,
    mentions_bot: bool,
) -> anyhow::Result<bool> {
    let Some(reply) = greeting_reply(content, mentions_bot) else {
        return Ok(false);
    };
    sink.send(reply).await?;
    Ok(true)
}

/// The channel agent together with where it is deployed.
pub struct AgentSession {
    agent: Agent,
    guild_id: u64,
    channel_id: u64,
    log_dir: PathBuf,
}

impl AgentSession {
    pub fn new(agent: Agent, guild_id: u64, channel_id: u64, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            agent,
            guild_id,
            channel_id,
            log_dir: log_dir.into(),
        }
    }

    pub fn channel_id(&self) -> u64 {
        self.channel_id
    }

    /// Run the agent on `prompt` and render its answer. Never fails: errors
    /// become a fixed apology.
    pub async fn answer(&self, prompt: &str) -> String {
        info!("Starting agent processing...");
        let instructions = build_instructions(self.guild_id, self.channel_id, Utc::now());

        let trace = match self.agent.run(&instructions, prompt).await {
            Ok(trace) => trace,
            Err(e) => {
                error!("Error processing message: {:#}", e);
                return AGENT_ERROR_MSG.to_string();
            }
        };
        info!("Agent processing completed successfully");

        match self.save_trace(&trace) {
            Ok(path) => info!("Trace saved to {}", path.display()),
            Err(e) => warn!("Failed to save agent trace: {:#}", e),
        }

        let Some(mut output) = trace.final_output else {
            return NO_OUTPUT_MSG.to_string();
        };

        if let AgentOutput::Summary(summary) = &mut output.response {
            summary.file_path = match write_daily_summary(&self.log_dir, summary) {
                Ok(path) => path.display().to_string(),
                Err(e) => {
                    warn!("Failed to save daily summary: {:#}", e);
                    "(not saved)".to_string()
                }
            };
        }

        output.format_message()
    }

    fn save_trace(&self, trace: &AgentTrace) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.log_dir)
            .with_context(|| format!("Failed to create {}", self.log_dir.display()))?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self.log_dir.join(format!("{}_agent_trace.json", timestamp));
        std::fs::write(&path, serde_json::to_string_pretty(trace)?)?;
        Ok(path)
    }
}

/// Route an incoming message to the greeter or the agent.
pub async fn handle_message(
    ctx: &serenity::Context,
    new_message: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    if is_ignored_author(
        new_message.author.bot,
        new_message.author.id.get(),
        data.bot_id,
    ) {
        return Ok(());
    }

    info!(
        "Received message: \"{}\" from {} in #{}",
        new_message.content, new_message.author.name, new_message.channel_id
    );

    let mentions_bot = new_message.mentions_user_id(data.bot_id);
    let sink = ChannelSink::new(ctx.http.clone(), new_message.channel_id);

    let Some(session) = &data.agent else {
        if respond_to_greeting(&sink, &new_message.content, mentions_bot).await? {
            info!("Responded to {}", new_message.author.name);
        }
        return Ok(());
    };

    let replied_to_bot = new_message
        .referenced_message
        .as_deref()
        .is_some_and(|referenced| referenced.author.id.get() == data.bot_id);
    if !mentions_bot && !replied_to_bot {
        return Ok(());
    }

    let prompt = strip_bot_mentions(&new_message.content, data.bot_id);
    if prompt.is_empty() {
        // Avoid noisy replies when someone only pings the bot.
        return Ok(());
    }
    debug!(
        "Received directed message from {}: {}",
        new_message.author.name, prompt
    );

    let typing = new_message.channel_id.start_typing(&ctx.http);
    let response = session.answer(&prompt).await;
    drop(typing);

    sink.send(&response).await?;
    Ok(())
}
