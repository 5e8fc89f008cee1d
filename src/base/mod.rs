//! Core components, types, and utilities for the stale-pr-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Report formatting for stale pull request summaries.
//! - Common types and result handling.

pub mod config;
pub mod report;
pub mod types;
