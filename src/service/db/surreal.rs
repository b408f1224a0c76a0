//! SurrealDB implementation of the session store.

use std::sync::Arc;

use async_trait::async_trait;
use surrealdb::{
    Surreal,
    engine::any::{Any, connect},
    opt::auth::Root,
};
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{Res, Void},
};

use super::{DbClient, GenericDbClient, Session};

const SESSION_TABLE: &str = "session";

// Extra methods on `DbClient` applied by the surreal implementation.

impl DbClient {
    /// Creates a session store from the configured endpoint. `mem://` gives an
    /// in-process store; a `ws://` endpoint with credentials gives a shared one.
    pub async fn surreal(config: &Config) -> Res<Self> {
        let client = SurrealDbClient::new(&config.db_endpoint, &config.db_username, &config.db_password).await?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Creates an in-memory session store; used by tests.
    pub async fn surreal_memory() -> Res<Self> {
        let client = SurrealDbClient::new("mem://", "", "").await?;
        Ok(Self::new(Arc::new(client)))
    }
}

// Specific implementations.

/// SurrealDB session store implementation.
#[derive(Clone)]
struct SurrealDbClient {
    db: Surreal<Any>,
}

impl SurrealDbClient {
    /// Connect to the given endpoint and select the bot namespace.
    #[instrument(name = "SurrealDbClient::new", skip_all)]
    async fn new(endpoint: &str, username: &str, password: &str) -> Res<Self> {
        let db = connect(endpoint).await?;

        // Embedded engines have no auth; only sign in when credentials are given.
        if !username.is_empty() {
            db.signin(Root { username, password }).await?;
        }

        db.use_ns("lab_reader").use_db("bot").await?;

        info!("Session store initialized at `{}`.", endpoint);

        Ok(Self { db })
    }
}

#[async_trait]
impl GenericDbClient for SurrealDbClient {
    #[instrument(skip(self))]
    async fn get_session(&self, chat_id: i64) -> Res<Option<Session>> {
        let session: Option<Session> = self.db.select((SESSION_TABLE, chat_id)).await?;

        Ok(session)
    }

    #[instrument(skip(self, session))]
    async fn put_session(&self, chat_id: i64, session: &Session) -> Void {
        let _: Option<Session> = self.db.upsert((SESSION_TABLE, chat_id)).content(session.clone()).await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_session(&self, chat_id: i64) -> Void {
        let _: Option<Session> = self.db.delete((SESSION_TABLE, chat_id)).await?;

        Ok(())
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::types::{ConversationState, Language, StoredFile, TaskKind};

    #[tokio::test]
    async fn session_round_trip() {
        let db = DbClient::surreal_memory().await.unwrap();

        assert!(db.get_session(1).await.unwrap().is_none());

        let session = Session::new(ConversationState::ChoosingLanguage { task: TaskKind::Analysis });
        db.put_session(1, &session).await.unwrap();

        let stored = db.get_session(1).await.unwrap().unwrap();
        assert_eq!(stored.state, session.state);

        db.clear_session(1).await.unwrap();
        assert!(db.get_session(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_session_replaces_existing_state() {
        let db = DbClient::surreal_memory().await.unwrap();

        db.put_session(7, &Session::new(ConversationState::ChoosingTask)).await.unwrap();
        db.put_session(
            7,
            &Session::new(ConversationState::AwaitingUpload {
                task: TaskKind::Medication,
                language: Language::French,
            }),
        )
        .await
        .unwrap();

        let stored = db.get_session(7).await.unwrap().unwrap();
        assert_eq!(
            stored.state,
            ConversationState::AwaitingUpload {
                task: TaskKind::Medication,
                language: Language::French,
            }
        );
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_chat() {
        let db = DbClient::surreal_memory().await.unwrap();

        let file = StoredFile { file_id: "abc".into(), file_name: "report.pdf".into() };
        db.put_session(1, &Session::new(ConversationState::AwaitingChoice { file })).await.unwrap();
        db.put_session(2, &Session::new(ConversationState::ChoosingTask)).await.unwrap();

        db.clear_session(1).await.unwrap();

        assert!(db.get_session(1).await.unwrap().is_none());
        assert!(db.get_session(2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clearing_missing_session_is_ok() {
        let db = DbClient::surreal_memory().await.unwrap();

        db.clear_session(42).await.unwrap();
    }
}
