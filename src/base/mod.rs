//! Core components, types, and utilities for lab-reader-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - User-facing message templates.
//! - Common types and result handling.

pub mod config;
pub mod texts;
pub mod types;
