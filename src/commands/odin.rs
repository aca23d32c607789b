use crate::config::DISCORD_MESSAGE_LIMIT;
use crate::discord_text::reply_chunks;
use crate::odin::feed::format_feed_summary;
use crate::{Context, Error};
use tracing::info;

/// Check whether a 0DIN submission has been scanned
#[poise::command(slash_command)]
pub async fn check(
    ctx: Context<'_>,
    #[description = "Submission UUID (lower-case v4)"] uuid: String,
) -> Result<(), Error> {
    ctx.defer().await?;
    info!("/check {} requested by {}", uuid, ctx.author().name);

    let reply = ctx.data().checker.check(&uuid).await;
    say_chunked(ctx, &reply).await
}

/// Summarise the current 0DIN threat feed
#[poise::command(slash_command)]
pub async fn threatfeed(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    info!("/threatfeed requested by {}", ctx.author().name);

    let feed = ctx.data().checker.fetch_feed().await;
    let reply = match feed.get("error").and_then(|e| e.as_str()) {
        Some(error) => format!("❌ {}", error),
        None => format_feed_summary(&feed),
    };
    say_chunked(ctx, &reply).await
}

async fn say_chunked(ctx: Context<'_>, text: &str) -> Result<(), Error> {
    for chunk in reply_chunks(text, DISCORD_MESSAGE_LIMIT) {
        ctx.say(chunk).await?;
    }
    Ok(())
}
