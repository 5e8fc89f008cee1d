//! Chat service integration for stale-pr-bot.
//!
//! This module provides the Slack implementation of `GenericChatClient`:
//! - Receiving messages and app mentions over socket mode
//! - Dispatching stale pull request requests to the command trigger
//! - Sending replies and broadcasts

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::{self, pipeline::Pipeline},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{debug, info, instrument, warn};

use std::sync::Arc;

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    ///
    /// When `command` is `None`, stale pull request requests are acknowledged in the logs only.
    pub async fn slack(config: &Config, command: Option<Pipeline>) -> Res<Self> {
        let client = SlackChatClient::new(config, command).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<SlackChatClient> for ChatClient {
    fn from(client: SlackChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    chat: ChatClient,
    command: Option<Pipeline>,
    bot_user_id: String,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub app_token: SlackApiToken,
    pub bot_token: SlackApiToken,
    pub bot_user_id: String,
    pub client: Arc<FullClient>,
    pub command: Option<Pipeline>,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config, command: Option<Pipeline>) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        Ok(Self {
            app_token,
            bot_token,
            bot_user_id,
            client,
            command,
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    async fn start(&self) -> Void {
        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new().with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState {
            chat: ChatClient::from(self.clone()),
            command: self.command.clone(),
            bot_user_id: self.bot_user_id.clone(),
        }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events.
        socket_mode_listener.listen_for(&self.app_token).await?;

        // Serve until Ctrl-C.
        socket_mode_listener.serve().await;

        Ok(())
    }

    #[instrument(skip(self, text))]
    async fn send_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let mut request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message).with_unfurl_links(false);

        if !thread_ts.is_empty() {
            request = request.with_thread_ts(SlackTs(thread_ts.to_string()));
        }

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }
}

// Socket mode listener callbacks for Slack.

/// Handles push events from Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let event = event_callback.event;
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    match event {
        SlackEventCallbackBody::Message(slack_message_event) => {
            // Ignore bots, which includes our own replies.
            if slack_message_event.sender.bot_id.is_some() {
                return Ok(());
            }

            let channel_id = slack_message_event.origin.channel.as_ref().ok_or(anyhow::anyhow!("Failed to get channel ID"))?.0.to_owned();

            // Outside of direct messages, the bot only answers when mentioned, which the app mention handler covers.
            if !is_direct_message_channel(&channel_id) {
                return Ok(());
            }

            info!("Received direct message event ...");

            let text = slack_message_event.content.as_ref().and_then(|c| c.text.as_deref()).unwrap_or_default();
            let thread_ts = slack_message_event.origin.thread_ts.as_ref().map(|ts| ts.0.clone()).unwrap_or_default();

            dispatch(user_state, channel_id, thread_ts, text);
        }
        SlackEventCallbackBody::AppMention(slack_app_mention_event) => {
            info!("Received app mention event ...");

            let channel_id = slack_app_mention_event.channel.0.to_owned();
            let text = slack_app_mention_event.content.text.as_deref().unwrap_or_default();
            let thread_ts = slack_app_mention_event.origin.thread_ts.as_ref().map(|ts| ts.0.clone()).unwrap_or_default();

            dispatch(user_state, channel_id, thread_ts, text);
        }
        _ => {
            debug!("Received unhandled push event.")
        }
    }

    Ok(())
}

/// Routes a message addressed to the bot to the matching trigger.
fn dispatch(user_state: &SlackUserState, channel_id: String, thread_ts: String, text: &str) {
    let text = text.replace(&format!("<@{}>", user_state.bot_user_id), "");

    if !interaction::stale_command::is_stale_request(&text) {
        debug!("Ignoring message that is not a stale pull request request.");
        return;
    }

    let Some(pipeline) = user_state.command.clone() else {
        warn!("Stale pull request reporting is disabled; ignoring request.");
        return;
    };

    interaction::stale_command::handle_stale_command(channel_id, thread_ts, pipeline, user_state.chat.clone());
}

/// Slack direct message channel IDs start with `D`.
fn is_direct_message_channel(channel_id: &str) -> bool {
    channel_id.starts_with('D')
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_message_channels_are_detected() {
        assert!(is_direct_message_channel("D024BE91L"));
        assert!(!is_direct_message_channel("C024BE91L"));
        assert!(!is_direct_message_channel("G024BE91L"));
    }
}
