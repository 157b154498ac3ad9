//! Chat adapter: turns inbound messages into replies.
//!
//! The resolver does the work; this layer only parses the invocation,
//! skips messages it should ignore, and renders the outcome.

mod command;
mod console;
mod reply;

pub use command::{CommandParser, Invocation};
pub use console::ConsoleTransport;
pub use reply::{Reply, ReplyField, Response, render};

use crate::error::Result;
use crate::models::BotConfig;
use crate::services::QueryResolver;

/// A message as delivered by the chat transport.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub content: String,
    pub author_is_bot: bool,
}

impl ChatMessage {
    pub fn from_user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author_is_bot: false,
        }
    }
}

/// Handles `!focus` invocations.
#[derive(Clone)]
pub struct BotHandler {
    parser: CommandParser,
    resolver: QueryResolver,
    config: BotConfig,
}

impl BotHandler {
    pub fn new(resolver: QueryResolver, config: BotConfig) -> Result<Self> {
        Ok(Self {
            parser: CommandParser::new(&config.command_prefix)?,
            resolver,
            config,
        })
    }

    /// Status line advertising the command syntax.
    pub fn presence(&self) -> String {
        format!("{} backer name", self.config.command_prefix)
    }

    /// Reply to `message`, or `None` if it isn't for us.
    pub async fn handle(&self, message: &ChatMessage) -> Option<Reply> {
        if message.author_is_bot {
            return None;
        }

        let response = match self.parser.parse(&message.content)? {
            Invocation::Malformed => Response::InvalidFormat,
            Invocation::Lookup(name) => {
                log::info!("Lookup for {:?}", name);
                Response::Resolved(self.resolver.resolve(&name).await)
            }
        };
        Some(render(&response, &self.config))
    }
}
