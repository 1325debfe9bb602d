//! Telegram adapter (teloxide).
//!
//! Sends replies over the Telegram Bot API and runs the long-polling
//! dispatcher. Handle lookups and photo downloads live in `dpgrab-mtproto`.

use std::{future::IntoFuture, path::Path};

use async_trait::async_trait;

use teloxide::{prelude::*, types::InputFile, RequestError};

pub mod handlers;
pub mod router;

use dpgrab_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::port::MessagingPort,
    status::ConnectionStatus,
    Result,
};

#[derive(Clone)]
pub struct TelegramClient {
    bot: Bot,
    status: ConnectionStatus,
}

impl TelegramClient {
    pub fn new(bot: Bot, status: ConnectionStatus) -> Self {
        Self { bot, status }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    /// Await a request and keep the connectivity flag in sync with the outcome.
    async fn observe<T, Fut>(&self, req: Fut) -> std::result::Result<T, RequestError>
    where
        T: Send,
        Fut: IntoFuture<Output = std::result::Result<T, RequestError>> + Send,
        Fut::IntoFuture: Send,
    {
        let res = req.await;
        match &res {
            Ok(_) => self.status.set_connected(true),
            Err(RequestError::Network(_)) => self.status.set_connected(false),
            Err(_) => {}
        }
        res
    }
}

/// Map a teloxide error into the core taxonomy.
pub fn map_request_error(e: RequestError) -> Error {
    match e {
        RequestError::Network(e) => Error::Network(e.to_string()),
        e @ RequestError::RetryAfter(_) => Error::Network(e.to_string()),
        RequestError::Api(api) => Error::unexpected("api", api),
        e @ RequestError::Io(_) => Error::unexpected("io", e),
        e => Error::unexpected("telegram", e),
    }
}

#[async_trait]
impl MessagingPort for TelegramClient {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        let msg = self
            .observe(self.bot.send_message(Self::tg_chat(chat_id), text.to_string()))
            .await
            .map_err(map_request_error)?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<MessageRef> {
        let mut req = self
            .bot
            .send_photo(Self::tg_chat(chat_id), InputFile::file(path.to_path_buf()));
        if let Some(c) = caption {
            req = req.caption(c.to_string());
        }
        let msg = self.observe(req).await.map_err(map_request_error)?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }
}
