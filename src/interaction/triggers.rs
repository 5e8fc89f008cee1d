//! Registration of the delivery triggers from configuration.

use tracing::{error, info, instrument, warn};

use crate::{
    base::{config::Config, types::Res},
    interaction::{pipeline::Pipeline, stale_broadcast::BroadcastTrigger},
    service::{github::StaleClient, schedule::CronSchedule},
};

/// The triggers enabled by the configuration.
///
/// Both triggers share one pipeline, and therefore one cache.
#[derive(Clone, Default)]
pub struct Triggers {
    /// The pipeline behind the chat command, if reporting is enabled.
    pub command: Option<Pipeline>,
    /// The scheduled broadcast, if a channel is configured.
    pub broadcast: Option<BroadcastTrigger>,
}

impl Triggers {
    /// Registers the triggers allowed by `config`.
    ///
    /// `classifier` builds the stale pull request classifier from the GitHub token; it is only
    /// called when a token is configured.
    #[instrument(name = "Triggers::register", skip_all)]
    pub fn register<F>(config: &Config, classifier: F) -> Res<Self>
    where
        F: FnOnce(&str) -> Res<StaleClient>,
    {
        let Some(token) = config.github_token() else {
            error!("No GitHub token specified; stale pull request reporting is disabled.");
            return Ok(Self::default());
        };

        if config.repos.is_empty() {
            warn!("No repositories specified; stale pull request reports will be empty.");
        }

        let pipeline = Pipeline::from_config(config, classifier(token)?);

        let broadcast = match config.broadcast_channel() {
            None => {
                warn!("No broadcast channel specified, therefore not scheduling stale pull request broadcasts.");
                None
            }
            Some(channel) => match CronSchedule::parse(&config.schedule) {
                Ok(schedule) => {
                    info!("Broadcasting stale pull requests to {} on `{}`.", channel, schedule.expression());
                    Some(BroadcastTrigger::new(channel.to_string(), schedule, pipeline.clone()))
                }
                Err(err) => {
                    error!("Not scheduling stale pull request broadcasts: {}", err);
                    None
                }
            },
        };

        Ok(Self {
            command: Some(pipeline),
            broadcast,
        })
    }

    /// Whether no trigger is registered.
    pub fn is_empty(&self) -> bool {
        self.command.is_none() && self.broadcast.is_none()
    }
}
