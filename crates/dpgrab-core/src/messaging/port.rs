use std::path::Path;

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    Result,
};

/// Outbound side of the chat platform.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;

    /// Upload a local image file as a photo message.
    async fn send_photo(
        &self,
        chat_id: ChatId,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<MessageRef>;
}
