//! Handlers for the bot commands that open and close conversations.

use tracing::{Instrument, error, instrument};

use crate::{
    base::{
        texts,
        types::{ConversationState, Void},
    },
    service::{
        chat::ChatClient,
        db::{DbClient, Session},
    },
};

/// Handles `/start`: greet the user and ask what to process.
///
/// Spawns a new task to handle the command asynchronously.
#[instrument(skip_all)]
pub fn handle_start(chat_id: i64, db: DbClient, chat: ChatClient) {
    tokio::spawn(async move {
        let result = handle_start_internal(chat_id, &db, &chat).in_current_span().await;

        if let Err(err) = &result {
            error!("Error while handling /start: {}", err);
        }
    });
}

#[instrument(skip_all)]
async fn handle_start_internal(chat_id: i64, db: &DbClient, chat: &ChatClient) -> Void {
    // /start always opens a fresh conversation, discarding any previous state.
    db.put_session(chat_id, &Session::new(ConversationState::ChoosingTask)).await?;

    chat.prompt_keyboard(chat_id, texts::WELCOME, &texts::task_keyboard()).await?;

    Ok(())
}

/// Handles `/cancel`: drop the session and remove any keyboard.
#[instrument(skip_all)]
pub fn handle_cancel(chat_id: i64, db: DbClient, chat: ChatClient) {
    tokio::spawn(async move {
        let result = handle_cancel_internal(chat_id, &db, &chat).in_current_span().await;

        if let Err(err) = &result {
            error!("Error while handling /cancel: {}", err);
        }
    });
}

#[instrument(skip_all)]
async fn handle_cancel_internal(chat_id: i64, db: &DbClient, chat: &ChatClient) -> Void {
    db.clear_session(chat_id).await?;

    chat.remove_keyboard(chat_id, texts::CANCELLED).await?;

    Ok(())
}

/// Handles `/help`.
#[instrument(skip_all)]
pub fn handle_help(chat_id: i64, chat: ChatClient) {
    tokio::spawn(async move {
        let result = chat.send_message(chat_id, texts::HELP).in_current_span().await;

        if let Err(err) = &result {
            error!("Error while handling /help: {}", err);
        }
    });
}
