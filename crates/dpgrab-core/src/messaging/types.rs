use crate::domain::{ChatId, UserId};

/// Platform-neutral inbound text message.
///
/// Telegram-specific fields stay in the Telegram adapter.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub sender: UserId,
    pub text: String,
    /// True when the bot itself authored the message.
    pub from_self: bool,
}
