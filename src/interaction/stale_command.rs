use std::sync::LazyLock;

use regex::Regex;
use tracing::{Instrument, error, info, instrument};

use crate::{base::types::Void, interaction::pipeline::Pipeline, service::chat::ChatClient};

/// Reply used when no repository has stale pull requests.
pub const NO_STALE_PRS_REPLY: &str = "No stale pull requests.";

static STALE_REQUEST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)what\s+prs\s+are\s+stale").expect("stale request pattern is valid"));

/// Whether `text` asks which pull requests are stale.
pub fn is_stale_request(text: &str) -> bool {
    STALE_REQUEST.is_match(text)
}

#[instrument(skip_all)]
pub fn handle_stale_command(channel_id: String, thread_ts: String, pipeline: Pipeline, chat: ChatClient) {
    tokio::spawn(
        async move {
            // Process the request.
            let result = handle_stale_command_internal(&channel_id, &thread_ts, &pipeline, &chat).await;

            // Log any errors.
            if let Err(err) = &result {
                error!("Error while handling: {}", err);
            }
        }
        .in_current_span(),
    );
}

/// Replies to a stale pull request request in the originating conversation.
///
/// If the report cannot be retrieved, a failure notice is posted instead and the error is returned.
/// A failure to post the report itself is returned without a notice.
#[instrument(skip(pipeline, chat))]
pub async fn handle_stale_command_internal(channel_id: &str, thread_ts: &str, pipeline: &Pipeline, chat: &ChatClient) -> Void {
    info!("Answering stale pull request request ...");

    let report = match pipeline.report().await {
        Ok(report) => report,
        Err(err) => {
            let notice = format!("Sorry, I couldn't retrieve stale pull requests: {err}");
            chat.send_message(channel_id, thread_ts, &notice).await?;
            return Err(err);
        }
    };

    let text = pipeline.render(&report);
    let text = if text.is_empty() { NO_STALE_PRS_REPLY.to_string() } else { text };

    chat.send_message(channel_id, thread_ts, &text).await
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_case_insensitive() {
        assert!(is_stale_request("what prs are stale?"));
        assert!(is_stale_request("What PRs are stale"));
        assert!(is_stale_request("<@U123> WHAT PRS ARE STALE?"));
        assert!(is_stale_request("hey bot, what  prs are stale"));
    }

    #[test]
    fn unrelated_text_is_ignored() {
        assert!(!is_stale_request("what issues are stale?"));
        assert!(!is_stale_request("are prs stale"));
        assert!(!is_stale_request(""));
    }
}
