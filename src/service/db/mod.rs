pub mod surreal;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::base::types::{ConversationState, Res, Void};

// Traits.

/// Generic session store trait that clients must implement.
///
/// This trait defines the core functionality for persisting per-chat
/// conversation state. Implementing this trait allows different storage
/// backends to be used with the bot.
#[async_trait]
pub trait GenericDbClient: Send + Sync + 'static {
    /// Gets the session for a chat, if one exists. No session means the chat is idle.
    async fn get_session(&self, chat_id: i64) -> Res<Option<Session>>;

    /// Creates or replaces the session for a chat.
    async fn put_session(&self, chat_id: i64, session: &Session) -> Void;

    /// Removes the session for a chat, ending the conversation. Removing a
    /// session that does not exist is not an error.
    async fn clear_session(&self, chat_id: i64) -> Void;
}

// Structs.

/// A per-chat conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub state: ConversationState,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Session {
    /// Create a session in the given state, stamped with the current time.
    pub fn new(state: ConversationState) -> Self {
        Self { state, updated_at: chrono::Utc::now() }
    }
}

/// Session store client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct DbClient {
    inner: Arc<dyn GenericDbClient>,
}

impl Deref for DbClient {
    type Target = dyn GenericDbClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl DbClient {
    /// Wrap an existing store implementation (used by tests to inject mocks).
    pub fn new(inner: Arc<dyn GenericDbClient>) -> Self {
        Self { inner }
    }
}
