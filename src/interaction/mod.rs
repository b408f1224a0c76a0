//! Event handling and user interactions for lab-reader-bot.
//!
//! This module provides functionality for handling chat events:
//! - Bot commands that open and close conversations
//! - Keyboard replies that walk the user through task and language choices
//! - Document uploads and the relay to the Lab Reader API

pub mod command;
pub mod conversation;
pub mod document;
