//! Runtime services and shared state for the stale-pr-bot.

use tracing::{info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::triggers::Triggers,
    service::{chat::ChatClient, github::StaleClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the chat client, and the registered triggers.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The chat client instance.
    pub chat: ChatClient,
    /// The triggers enabled by the configuration.
    pub triggers: Triggers,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Register the triggers.
        let triggers = Triggers::register(&config, |token| StaleClient::github(&config, token))?;

        // Initialize the slack client.
        let chat = ChatClient::slack(&config, triggers.command.clone()).await?;

        Ok(Self { config, chat, triggers })
    }

    /// Start the scheduled broadcast (if any) and serve chat events until shutdown.
    pub async fn start(&self) -> Void {
        if self.triggers.is_empty() {
            warn!("No triggers are registered; the bot will not report stale pull requests.");
        }

        let broadcast = self.triggers.broadcast.as_ref().map(|b| {
            info!("Starting scheduled broadcasts to {} ...", b.channel());
            b.spawn(self.chat.clone())
        });

        let result = self.chat.start().await;

        if let Some(handle) = broadcast {
            handle.abort();
        }

        result
    }
}
