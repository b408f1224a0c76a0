//! Runtime services and shared state for the lab-reader-bot.

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    service::{chat::ChatClient, db::DbClient, lab::LabClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the session store, the Lab Reader API client, the chat
/// client, and configuration. It is designed to be trivially cloneable,
/// allowing it to be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The session store instance.
    pub db: DbClient,
    /// The Lab Reader API client instance.
    pub lab: LabClient,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the session store.
        let db = DbClient::surreal(&config).await?;

        // Initialize the Lab Reader API client.
        let lab = LabClient::http(&config)?;

        // Initialize the telegram client.
        let chat = ChatClient::telegram(&config, db.clone(), lab.clone()).await?;

        Ok(Self { config, db, lab, chat })
    }

    pub async fn start(&self) -> Void {
        self.chat.start().await
    }
}
