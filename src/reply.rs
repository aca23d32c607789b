//! Outbound replies.
//!
//! Handlers only ever need "send this text"; [`ReplySink`] is that capability
//! so message handling can run against Discord or a test double.

use crate::config::DISCORD_MESSAGE_LIMIT;
use crate::discord_text::reply_chunks;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, text: &str) -> anyhow::Result<()>;
}

/// Sends into a Discord channel, splitting long text across messages.
pub struct ChannelSink {
    http: Arc<serenity::Http>,
    channel_id: serenity::ChannelId,
}

impl ChannelSink {
    pub fn new(http: Arc<serenity::Http>, channel_id: serenity::ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl ReplySink for ChannelSink {
    async fn send(&self, text: &str) -> anyhow::Result<()> {
        for chunk in reply_chunks(text, DISCORD_MESSAGE_LIMIT) {
            self.channel_id.say(&self.http, chunk).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tokio::sync::Mutex;

    /// Records every message instead of sending it.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub(crate) sent: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        pub(crate) async fn messages(&self) -> Vec<String> {
            self.sent.lock().await.clone()
        }
    }

    #[async_trait]
    impl ReplySink for RecordingSink {
        async fn send(&self, text: &str) -> anyhow::Result<()> {
            self.sent.lock().await.push(text.to_string());
            Ok(())
        }
    }
}
