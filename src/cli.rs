//! Command-line interface.

use clap::{Parser, Subcommand};

/// 0DIN Discord bot
#[derive(Parser, Debug)]
#[command(name = "odinbot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Greet users and answer /check and /threatfeed
    Bot,

    /// Run the LLM agent in one channel
    Agent {
        /// Guild the agent operates in
        #[arg(long, env = "GUILD_ID")]
        guild_id: u64,

        /// Channel the agent greets and summarises
        #[arg(long, env = "CHANNEL_ID")]
        channel_id: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bot() {
        let cli = Cli::try_parse_from(["odinbot", "bot"]).unwrap();
        assert_eq!(cli.command, Commands::Bot);
    }

    #[test]
    fn test_parse_agent() {
        let cli = Cli::try_parse_from([
            "odinbot",
            "agent",
            "--guild-id",
            "123",
            "--channel-id",
            "456",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Commands::Agent {
                guild_id: 123,
                channel_id: 456
            }
        );
    }

    #[test]
    fn test_rejects_non_numeric_ids() {
        assert!(Cli::try_parse_from([
            "odinbot",
            "agent",
            "--guild-id",
            "abc",
            "--channel-id",
            "456",
        ])
        .is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["odinbot"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
