pub mod admin;
pub mod odin;

use crate::{Data, Error};

/// Commands of the plain greeter bot.
pub fn bot_commands() -> Vec<poise::Command<Data, Error>> {
    vec![odin::check(), odin::threatfeed()]
}

/// Commands of the agent bot.
pub fn agent_commands() -> Vec<poise::Command<Data, Error>> {
    vec![odin::check(), odin::threatfeed(), admin::health()]
}
