//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for various services used by lab-reader-bot:
//! - Chat services (e.g., Telegram)
//! - Session stores (e.g., SurrealDB)
//! - The Lab Reader API client
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod db;
pub mod lab;
