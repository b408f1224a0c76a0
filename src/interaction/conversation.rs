//! Handlers for keyboard replies in the guided conversation.

use tracing::{Instrument, error, instrument, warn};

use crate::{
    base::{
        texts,
        types::{ConversationState, Language, TaskKind, Void},
    },
    service::{
        chat::ChatClient,
        db::{DbClient, Session},
    },
};

/// Handles a plain text message according to the chat's conversation state.
///
/// Spawns a new task to handle the message asynchronously.
#[instrument(skip_all)]
pub fn handle_text(text: String, chat_id: i64, db: DbClient, chat: ChatClient) {
    tokio::spawn(async move {
        let result = handle_text_internal(&text, chat_id, &db, &chat).in_current_span().await;

        if let Err(err) = &result {
            error!("Error while handling text: {}", err);
        }
    });
}

#[instrument(skip_all)]
async fn handle_text_internal(text: &str, chat_id: i64, db: &DbClient, chat: &ChatClient) -> Void {
    let session = db.get_session(chat_id).await?;

    match session.map(|s| s.state) {
        Some(ConversationState::ChoosingTask) => {
            let Some(task) = TaskKind::parse(text) else {
                warn!("Unrecognized task choice `{}`, re-prompting.", text);
                chat.prompt_keyboard(chat_id, texts::WELCOME, &texts::task_keyboard()).await?;
                return Ok(());
            };

            db.put_session(chat_id, &Session::new(ConversationState::ChoosingLanguage { task })).await?;
            chat.prompt_keyboard(chat_id, &texts::task_chosen(task), &texts::language_keyboard()).await?;
        }
        Some(ConversationState::ChoosingLanguage { task }) => {
            let Some(language) = Language::parse(text) else {
                warn!("Unrecognized language choice `{}`, re-prompting.", text);
                chat.prompt_keyboard(chat_id, &texts::task_chosen(task), &texts::language_keyboard()).await?;
                return Ok(());
            };

            db.put_session(chat_id, &Session::new(ConversationState::AwaitingUpload { task, language })).await?;
            chat.remove_keyboard(chat_id, &texts::upload_instructions(language)).await?;
        }
        Some(ConversationState::AwaitingUpload { language, .. }) => {
            // The user typed instead of uploading; repeat the instructions.
            chat.send_message(chat_id, &texts::upload_instructions(language)).await?;
        }
        Some(ConversationState::AwaitingChoice { .. }) | None => {
            chat.send_message(chat_id, texts::HELP).await?;
        }
    }

    Ok(())
}
