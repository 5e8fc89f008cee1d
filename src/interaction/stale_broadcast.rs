use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::{
    base::types::Void,
    interaction::pipeline::Pipeline,
    service::{
        chat::ChatClient,
        schedule::{self, CronSchedule},
    },
};

/// Scheduled broadcast of the stale pull request report to a channel.
#[derive(Clone)]
pub struct BroadcastTrigger {
    channel: String,
    schedule: CronSchedule,
    pipeline: Pipeline,
}

impl BroadcastTrigger {
    pub fn new(channel: String, schedule: CronSchedule, pipeline: Pipeline) -> Self {
        Self { channel, schedule, pipeline }
    }

    /// The channel that receives broadcasts.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The next broadcast strictly after `after`.
    pub fn next_run_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.next_after(after)
    }

    /// Starts broadcasting on the schedule.
    ///
    /// A failed cycle is logged and skipped; the next occurrence runs as usual.
    pub fn spawn(&self, chat: ChatClient) -> JoinHandle<()> {
        let channel = self.channel.clone();
        let pipeline = self.pipeline.clone();

        schedule::spawn_recurring("stale-broadcast", self.schedule.clone(), move || {
            let channel = channel.clone();
            let pipeline = pipeline.clone();
            let chat = chat.clone();

            async move {
                if let Err(err) = broadcast_stale(&channel, &pipeline, &chat).await {
                    error!("Skipping stale pull request broadcast: {}", err);
                }
            }
        })
    }
}

/// Posts the stale pull request report to `channel`.
///
/// An empty report is not posted.
#[instrument(skip(pipeline, chat))]
pub async fn broadcast_stale(channel: &str, pipeline: &Pipeline, chat: &ChatClient) -> Void {
    pipeline
        .deliver(move |text| async move {
            if text.is_empty() {
                info!("No stale pull requests; nothing to broadcast.");
                return Ok(());
            }

            chat.send_message(channel, "", &text).await
        })
        .await
}
