//! Chat service integration for lab-reader-bot.
//!
//! This module provides functionality for interacting with chat platforms like Telegram:
//! - Receiving messages, uploads, and button presses
//! - Sending messages and keyboards
//! - Downloading user files
//!
//! It defines the `GenericChatClient` trait that can be implemented for different
//! chat services, with a default implementation for Telegram.

pub mod telegram;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{Res, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
#[async_trait]
pub trait GenericChatClient {
    /// Start the chat client listener; runs until externally terminated.
    async fn start(&self) -> Void;
    /// Send a plain text message to a chat.
    async fn send_message(&self, chat_id: i64, text: &str) -> Void;
    /// Send a Markdown-formatted message to a chat.
    async fn send_markdown(&self, chat_id: i64, text: &str) -> Void;
    /// Send a message with a one-time reply keyboard; each inner vec is a row of labels.
    async fn prompt_keyboard(&self, chat_id: i64, text: &str, rows: &[Vec<String>]) -> Void;
    /// Send a message with an inline keyboard; each button is a `(label, callback_data)` pair.
    async fn prompt_inline(&self, chat_id: i64, text: &str, rows: &[Vec<(String, String)>]) -> Void;
    /// Send a message and remove any active reply keyboard.
    async fn remove_keyboard(&self, chat_id: i64, text: &str) -> Void;
    /// Replace the text of a previously sent message.
    async fn edit_message(&self, chat_id: i64, message_id: i32, text: &str) -> Void;
    /// Download a user-uploaded file by its platform file id.
    async fn download_file(&self, file_id: &str) -> Res<Vec<u8>>;
}

// Structs.

/// Chat client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient + Send + Sync + 'static>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient + Send + Sync + 'static;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    /// Wrap an existing chat implementation (used by tests to inject mocks).
    pub fn new(inner: Arc<dyn GenericChatClient + Send + Sync + 'static>) -> Self {
        Self { inner }
    }
}
