pub mod cli;
pub mod commands;
pub mod config;
pub mod discord_text;
pub mod llm;
pub mod logging;
pub mod mcp;
pub mod mention;
pub mod odin;
pub mod reply;
pub mod summarize;
pub mod tools;

/// Custom data passed to all commands
pub struct Data {
    pub checker: odin::SubmissionChecker,
    /// Bot's own user ID, used to spot mentions and replies
    pub bot_id: u64,
    /// Present only when running as the channel agent
    pub agent: Option<std::sync::Arc<mention::AgentSession>>,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
