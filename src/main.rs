use anyhow::Context as _;
use clap::Parser;
use odinbot::cli::{Cli, Commands};
use odinbot::config::Config;
use odinbot::llm::agent::Agent;
use odinbot::llm::LlmClient;
use odinbot::mcp::client::McpClientManager;
use odinbot::mention::{self, AgentSession};
use odinbot::odin::{SubmissionChecker, ThreatFeedClient};
use odinbot::reply::{ChannelSink, ReplySink};
use odinbot::tools::builtin::default_registry;
use odinbot::{commands, logging, Data, Error};
use poise::serenity_prelude as serenity;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // .env has to be loaded before clap reads GUILD_ID / CHANNEL_ID
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };

    let _guard = match logging::init(Path::new(&config.log_dir)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.command, config).await {
        error!("An error occurred: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: Config) -> anyhow::Result<()> {
    info!("Loaded configuration: {:?}", config);

    let http_client = reqwest::Client::new();
    let checker = SubmissionChecker::new(
        ThreatFeedClient::new(
            http_client.clone(),
            config.odin_api_url.clone(),
            Duration::from_secs(config.odin_timeout_secs),
        ),
        config.odin_api_key.clone(),
    );
    info!("Using 0DIN threat feed at {}", checker.client().base_url());

    let (commands, agent) = match command {
        Commands::Bot => (commands::bot_commands(), None),
        Commands::Agent {
            guild_id,
            channel_id,
        } => {
            let session =
                build_agent_session(&config, &checker, http_client, guild_id, channel_id).await;
            (commands::agent_commands(), Some(Arc::new(session)))
        }
    };

    let register_guild = config.guild_id;
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            event_handler: |ctx, event, _framework, data| {
                Box::pin(event_handler(ctx, event, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("{} has connected to Discord!", ready.user.name);

                let commands = &framework.options().commands;
                match register_guild {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            commands,
                            serenity::GuildId::new(guild_id),
                        )
                        .await?;
                        info!("Synced {} command(s) to guild {}", commands.len(), guild_id);
                    }
                    None => {
                        poise::builtins::register_globally(ctx, commands).await?;
                        info!("Synced {} command(s) globally", commands.len());
                    }
                }

                if let Some(session) = &agent {
                    greet_channel(ctx, session.channel_id()).await;
                }

                Ok(Data {
                    checker,
                    bot_id: ready.user.id.get(),
                    agent,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGES;

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .context("Failed to create client")?;

    info!("Starting bot...");
    client.start().await.context("Client error")?;
    Ok(())
}

async fn build_agent_session(
    config: &Config,
    checker: &SubmissionChecker,
    http_client: reqwest::Client,
    guild_id: u64,
    channel_id: u64,
) -> AgentSession {
    let tools = default_registry(
        checker,
        http_client,
        config.webpage_max_chars,
        Duration::from_secs(config.odin_timeout_secs),
    );

    if let Some(url) = config.legacy_mcp_url() {
        warn!(
            "MCP_DISCORD={} is ignored: only stdio MCP servers are supported. \
             Configure the Discord MCP server in mcp_servers.toml \
             (see mcp_servers.example.toml)",
            url
        );
    }

    let mcp_manager = if config.mcp_servers.is_empty() {
        None
    } else {
        let manager = McpClientManager::new(config);
        manager.connect_all(&config.mcp_servers).await;
        info!(
            "Active MCP servers: {:?}",
            manager.list_active_servers().await
        );
        Some(Arc::new(manager))
    };

    let agent = Agent::new(
        Arc::new(LlmClient::new(config)),
        Arc::new(tools),
        mcp_manager,
        config.agent_max_iterations,
    );
    info!(
        "Agent ready for guild {} channel {} (model {})",
        guild_id, channel_id, config.llm_model
    );
    AgentSession::new(agent, guild_id, channel_id, &config.log_dir)
}

async fn greet_channel(ctx: &serenity::Context, channel_id: u64) {
    let sink = ChannelSink::new(ctx.http.clone(), serenity::ChannelId::new(channel_id));
    match sink.send(mention::STARTUP_GREETING).await {
        Ok(()) => info!("Sent greeting to channel {}", channel_id),
        Err(e) => warn!("Could not find channel with ID {}: {:#}", channel_id, e),
    }
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Message { new_message } = event {
        mention::handle_message(ctx, new_message, data).await?;
    }
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
            std::process::exit(1);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}
