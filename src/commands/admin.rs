use crate::{Context, Error};
use tracing::info;

pub const HEALTH_MSG: &str = "Bot is operational!";

/// Check that the bot is alive
#[poise::command(slash_command)]
pub async fn health(ctx: Context<'_>) -> Result<(), Error> {
    info!("Health check requested by {}", ctx.author().name);
    ctx.say(HEALTH_MSG).await?;
    Ok(())
}
