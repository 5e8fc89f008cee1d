//! Event handling and user interactions for stale-pr-bot.
//!
//! This module provides the delivery side of the bot:
//! - The shared fetch-or-cache, format, and send pipeline
//! - The on-demand chat command trigger
//! - The scheduled broadcast trigger
//! - Trigger registration from configuration

pub mod pipeline;
pub mod stale_broadcast;
pub mod stale_command;
pub mod triggers;
