//! Library root for `stale-pr-bot`.
//!
//! Stale-pr-bot is a Slack assistant that keeps a team aware of pull requests that
//! have been open without activity for too long. It:
//! - Answers `what prs are stale?` when mentioned or messaged directly
//! - Broadcasts the same report to a channel on a cron schedule
//! - Caches the report briefly so both paths share one GitHub round trip
//!
//! The bot integrates with Slack for chat and GitHub for pull request data.
//! The architecture is built around extensible traits that allow for different
//! implementations of each service.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the stale-pr-bot runtime:
/// - Initializes the crypto provider
/// - Registers the triggers and creates the chat client
/// - Starts the scheduled broadcast and the chat event loop
pub async fn start(config: Config) -> Void {
    info!("Starting stale-pr-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install the default crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
