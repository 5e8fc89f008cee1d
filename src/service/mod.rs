//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the stale-pr-bot:
//! - Chat services (e.g., Slack)
//! - Stale pull request classifiers (e.g., GitHub)
//! - A time-limited result cache
//! - A cron-style scheduler for recurring jobs
//!
//! Each external service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod cache;
pub mod chat;
pub mod github;
pub mod schedule;
