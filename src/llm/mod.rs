pub mod agent;
pub mod client;
pub mod output;
pub mod prompt;

pub use client::LlmClient;
