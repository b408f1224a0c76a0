//! Telegram client implementation, built on `teloxide`.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::{
    net::Download,
    prelude::*,
    types::{FileId, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, KeyboardRemove, MessageId, ParseMode},
    utils::command::BotCommands,
};
use tracing::{info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{Res, StoredFile, Void},
    },
    interaction,
    service::{db::DbClient, lab::LabClient},
};

use super::{ChatClient, GenericChatClient};

// Extra methods on `ChatClient` applied by the telegram implementation.

impl ChatClient {
    /// Creates a new Telegram chat client.
    pub async fn telegram(config: &Config, db: DbClient, lab: LabClient) -> Res<Self> {
        let client = TelegramChatClient::new(config, db, lab).await?;
        Ok(Self::new(Arc::new(client)))
    }
}

impl From<TelegramChatClient> for ChatClient {
    fn from(client: TelegramChatClient) -> Self {
        Self::new(Arc::new(client))
    }
}

// Structs.

/// Commands the bot understands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
enum Command {
    #[command(description = "begin a new document conversation.")]
    Start,
    #[command(description = "cancel the current conversation.")]
    Cancel,
    #[command(description = "show how the bot works.")]
    Help,
}

/// User state threaded through the dispatcher.
#[derive(Clone)]
struct TelegramUserState {
    config: Config,
    db: DbClient,
    lab: LabClient,
    chat: ChatClient,
}

/// Telegram client implementation.
#[derive(Clone)]
pub struct TelegramChatClient {
    bot: Bot,
    config: Config,
    db: DbClient,
    lab: LabClient,
}

impl TelegramChatClient {
    /// Create a new Telegram chat client.
    #[instrument(name = "TelegramChatClient::new", skip_all)]
    pub async fn new(config: &Config, db: DbClient, lab: LabClient) -> Res<Self> {
        let bot = Bot::new(config.telegram_bot_token.clone());

        // Check the token by resolving the bot's own identity up front.
        let me = bot.get_me().await?;
        info!("Telegram bot username: {}", me.username());

        Ok(Self { bot, config: config.clone(), db, lab })
    }
}

#[async_trait]
impl GenericChatClient for TelegramChatClient {
    async fn start(&self) -> Void {
        // Initialize the dispatcher tree: commands, then plain messages, then
        // inline-keyboard callbacks.

        let handler = dptree::entry()
            .branch(Update::filter_message().filter_command::<Command>().endpoint(handle_command))
            .branch(Update::filter_message().endpoint(handle_message))
            .branch(Update::filter_callback_query().endpoint(handle_callback_query));

        let state = TelegramUserState {
            config: self.config.clone(),
            db: self.db.clone(),
            lab: self.lab.clone(),
            chat: ChatClient::from(self.clone()),
        };

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![state])
            .default_handler(|upd| async move {
                warn!("Unhandled update: {:?}", upd);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }

    #[instrument(skip(self, text))]
    async fn send_message(&self, chat_id: i64, text: &str) -> Void {
        self.bot.send_message(ChatId(chat_id), text.to_string()).await?;

        Ok(())
    }

    #[instrument(skip(self, text))]
    async fn send_markdown(&self, chat_id: i64, text: &str) -> Void {
        self.bot.send_message(ChatId(chat_id), text.to_string()).parse_mode(ParseMode::Markdown).await?;

        Ok(())
    }

    #[instrument(skip(self, text, rows))]
    async fn prompt_keyboard(&self, chat_id: i64, text: &str, rows: &[Vec<String>]) -> Void {
        let rows: Vec<Vec<KeyboardButton>> = rows
            .iter()
            .map(|row| row.iter().map(|label| KeyboardButton::new(label.clone())).collect())
            .collect();

        let markup = KeyboardMarkup::new(rows).resize_keyboard().one_time_keyboard();

        self.bot.send_message(ChatId(chat_id), text.to_string()).reply_markup(markup).await?;

        Ok(())
    }

    #[instrument(skip(self, text, rows))]
    async fn prompt_inline(&self, chat_id: i64, text: &str, rows: &[Vec<(String, String)>]) -> Void {
        let rows: Vec<Vec<InlineKeyboardButton>> = rows
            .iter()
            .map(|row| row.iter().map(|(label, data)| InlineKeyboardButton::callback(label.clone(), data.clone())).collect())
            .collect();

        let markup = InlineKeyboardMarkup::new(rows);

        self.bot.send_message(ChatId(chat_id), text.to_string()).reply_markup(markup).await?;

        Ok(())
    }

    #[instrument(skip(self, text))]
    async fn remove_keyboard(&self, chat_id: i64, text: &str) -> Void {
        self.bot.send_message(ChatId(chat_id), text.to_string()).reply_markup(KeyboardRemove::new()).await?;

        Ok(())
    }

    #[instrument(skip(self, text))]
    async fn edit_message(&self, chat_id: i64, message_id: i32, text: &str) -> Void {
        self.bot.edit_message_text(ChatId(chat_id), MessageId(message_id), text.to_string()).await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn download_file(&self, file_id: &str) -> Res<Vec<u8>> {
        let file = self.bot.get_file(FileId(file_id.to_owned())).await?;

        let mut buf = Vec::with_capacity(file.meta.size as usize);
        self.bot.download_file(&file.path, &mut buf).await?;

        Ok(buf)
    }
}

// Dispatcher endpoints.

/// Handles bot commands.
async fn handle_command(msg: Message, cmd: Command, state: TelegramUserState) -> Void {
    let chat_id = msg.chat.id.0;

    match cmd {
        Command::Start => interaction::command::handle_start(chat_id, state.db.clone(), state.chat.clone()),
        Command::Cancel => interaction::command::handle_cancel(chat_id, state.db.clone(), state.chat.clone()),
        Command::Help => interaction::command::handle_help(chat_id, state.chat.clone()),
    }

    Ok(())
}

/// Handles plain messages: uploads feed the document pipeline, text feeds the
/// guided conversation.
async fn handle_message(msg: Message, state: TelegramUserState) -> Void {
    let chat_id = msg.chat.id.0;

    if let Some(file) = extract_file(&msg) {
        interaction::document::handle_document(file, chat_id, state.config.clone(), state.db.clone(), state.lab.clone(), state.chat.clone());
    } else if let Some(text) = msg.text() {
        interaction::conversation::handle_text(text.to_owned(), chat_id, state.db.clone(), state.chat.clone());
    } else {
        warn!("Ignoring unsupported message in chat {}.", chat_id);
    }

    Ok(())
}

/// Handles inline-keyboard callbacks from the upload-first flow.
async fn handle_callback_query(bot: Bot, q: CallbackQuery, state: TelegramUserState) -> Void {
    // Ack first so the button stops spinning.
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(data) = q.data.clone() else {
        warn!("Callback query without data.");
        return Ok(());
    };

    let Some(message) = q.message.as_ref().and_then(|m| m.regular_message()) else {
        warn!("Callback query without an accessible message.");
        return Ok(());
    };

    interaction::document::handle_choice(data, message.chat.id.0, message.id.0, state.config.clone(), state.db.clone(), state.lab.clone(), state.chat.clone());

    Ok(())
}

/// Pull a file handle out of a message, preferring documents over photos.
fn extract_file(msg: &Message) -> Option<StoredFile> {
    if let Some(document) = msg.document() {
        let file_name = document.file_name.clone().unwrap_or_else(|| "document.pdf".to_string());

        return Some(StoredFile { file_id: document.file.id.0.clone(), file_name });
    }

    if let Some(sizes) = msg.photo() {
        // Telegram sends several sizes; the last one is the largest.
        let photo = sizes.last()?;
        let user_id = msg.from.as_ref().map(|u| u.id.0).unwrap_or_default();

        return Some(StoredFile {
            file_id: photo.file.id.0.clone(),
            file_name: format!("photo_{user_id}.jpg"),
        });
    }

    None
}
