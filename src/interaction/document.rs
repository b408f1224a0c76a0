//! Handlers for document uploads and the relay to the Lab Reader API.

use tracing::{Instrument, error, info, instrument, warn};

use crate::{
    base::{
        config::Config,
        texts,
        types::{ConversationState, Language, Res, StoredFile, TaskKind, Void, parse_callback_choice},
    },
    service::{
        chat::ChatClient,
        db::{DbClient, Session},
        lab::{LabClient, LabError},
    },
};

/// Handles an uploaded photo or document.
///
/// In the guided flow the task and language are already known and the document
/// goes straight to the Lab Reader API. Any other state enters the
/// upload-first flow: the file is remembered and the user picks an option from
/// an inline keyboard.
///
/// Spawns a new task to handle the upload asynchronously.
#[instrument(skip_all)]
pub fn handle_document(file: StoredFile, chat_id: i64, config: Config, db: DbClient, lab: LabClient, chat: ChatClient) {
    tokio::spawn(async move {
        let result = handle_document_internal(file, chat_id, &config, &db, &lab, &chat).in_current_span().await;

        if let Err(err) = &result {
            error!("Error while handling upload: {}", err);
        }
    });
}

#[instrument(skip_all)]
async fn handle_document_internal(file: StoredFile, chat_id: i64, config: &Config, db: &DbClient, lab: &LabClient, chat: &ChatClient) -> Void {
    let session = db.get_session(chat_id).await?;

    match session.map(|s| s.state) {
        Some(ConversationState::AwaitingUpload { task, language }) => {
            chat.send_message(chat_id, texts::PROCESSING).await?;

            process_document(task, language, &file, chat_id, config, lab, chat).await?;

            // The guided conversation ends whether or not the relay succeeded;
            // a new attempt starts over from /start.
            db.clear_session(chat_id).await
        }
        _ => {
            info!("Upload with no pending selection in chat {}, offering choices.", chat_id);

            db.put_session(chat_id, &Session::new(ConversationState::AwaitingChoice { file: file.clone() })).await?;
            chat.prompt_inline(chat_id, &texts::file_received(&file), &texts::choice_buttons()).await
        }
    }
}

/// Handles an inline-keyboard choice from the upload-first flow.
///
/// Spawns a new task to handle the choice asynchronously.
#[instrument(skip_all)]
pub fn handle_choice(data: String, chat_id: i64, message_id: i32, config: Config, db: DbClient, lab: LabClient, chat: ChatClient) {
    tokio::spawn(async move {
        let result = handle_choice_internal(&data, chat_id, message_id, &config, &db, &lab, &chat).in_current_span().await;

        if let Err(err) = &result {
            error!("Error while handling choice: {}", err);
        }
    });
}

#[instrument(skip_all)]
async fn handle_choice_internal(data: &str, chat_id: i64, message_id: i32, config: &Config, db: &DbClient, lab: &LabClient, chat: &ChatClient) -> Void {
    let Some((task, language)) = parse_callback_choice(data) else {
        warn!("Unknown callback data `{}`.", data);
        return Ok(());
    };

    let session = db.get_session(chat_id).await?;

    // The pending file may be gone, e.g. after a restart with an in-memory store.
    let Some(ConversationState::AwaitingChoice { file }) = session.map(|s| s.state) else {
        chat.edit_message(chat_id, message_id, texts::SESSION_EXPIRED).await?;
        return Ok(());
    };

    chat.edit_message(chat_id, message_id, &texts::processing_choice(task, language)).await?;

    // On failure the pending file stays, so the user can pick a button again.
    if process_document(task, language, &file, chat_id, config, lab, chat).await? {
        db.clear_session(chat_id).await?;
    }

    Ok(())
}

/// Download the file from the chat platform, relay it to the Lab Reader API,
/// and reply with the result.
///
/// Returns whether a result was delivered; lab failures are reported to the
/// chat and come back as `Ok(false)` so callers decide what happens to the
/// session.
#[instrument(skip(file, config, lab, chat))]
async fn process_document(
    task: TaskKind,
    language: Language,
    file: &StoredFile,
    chat_id: i64,
    config: &Config,
    lab: &LabClient,
    chat: &ChatClient,
) -> Res<bool> {
    let bytes = chat.download_file(&file.file_id).await?;

    match lab.read_document(task, language, &file.file_name, bytes).await {
        Ok(report) => {
            let chunks = chunk_message(&report, config.message_chunk_limit);

            if chunks.is_empty() {
                chat.send_message(chat_id, texts::NO_ANALYSIS).await?;
            }

            for chunk in chunks {
                // The API writes Markdown, but Telegram rejects unbalanced
                // entities; fall back to plain text rather than losing a chunk.
                if chat.send_markdown(chat_id, &chunk).await.is_err() {
                    warn!("Markdown send failed, retrying chunk as plain text.");
                    chat.send_message(chat_id, &chunk).await?;
                }
            }

            Ok(true)
        }
        Err(LabError::Api { status, detail }) => {
            error!("Lab API rejected the document ({}): {}", status, detail);

            chat.send_message(chat_id, &texts::api_error(&detail)).await?;

            Ok(false)
        }
        Err(err) => {
            error!("Failed to reach the Lab API: {}", err);

            chat.send_message(chat_id, texts::LAB_UNAVAILABLE).await?;

            Ok(false)
        }
    }
}

/// Split a message into chunks of at most `limit` characters.
///
/// Counts characters, not bytes, so a chunk never splits a UTF-8 sequence and
/// never exceeds Telegram's character-based length limit.
pub fn chunk_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        if count == limit {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }

        current.push(ch);
        count += 1;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        assert_eq!(chunk_message("hello", 10), vec!["hello"]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_message("", 10).is_empty());
    }

    #[test]
    fn long_text_is_split_at_the_limit() {
        let text = "a".repeat(25);
        let chunks = chunk_message(&text, 10);

        assert_eq!(chunks, vec!["a".repeat(10), "a".repeat(10), "a".repeat(5)]);
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_chunk() {
        let text = "b".repeat(20);
        let chunks = chunk_message(&text, 10);

        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.chars().count() == 10));
    }

    #[test]
    fn multibyte_characters_are_counted_not_split() {
        let text = "é".repeat(7);
        let chunks = chunk_message(&text, 3);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], "ééé");
        assert_eq!(chunks[2], "é");
    }

    #[test]
    fn limit_of_one_splits_every_character() {
        let chunks = chunk_message("抱歉", 1);

        assert_eq!(chunks, vec!["抱", "歉"]);
    }
}
