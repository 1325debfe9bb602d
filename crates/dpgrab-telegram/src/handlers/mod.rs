//! Telegram update handlers.
//!
//! Each handler converts a teloxide update into the core inbound model and
//! hands it to the [`CommandDispatcher`](dpgrab_core::dispatcher::CommandDispatcher).
//! Handlers never return an error: a failing request must not stop the
//! dispatcher.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use dpgrab_core::{
    dispatcher::Dispatch,
    domain::{ChatId, UserId},
    messaging::types::InboundMessage,
};

use crate::router::AppState;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(inbound) = inbound_from_message(&msg, state.bot_user_id) else {
        return Ok(());
    };

    let chat_id = inbound.chat_id.0;
    match state.dispatcher.dispatch(inbound).await {
        Dispatch::Ignored(reason) => {
            tracing::debug!(chat_id, ?reason, "message ignored");
        }
        Dispatch::Greeted => tracing::info!(chat_id, "greeted"),
        Dispatch::Fetched(outcome) => tracing::info!(chat_id, ?outcome, "request handled"),
    }

    Ok(())
}

/// Convert a Telegram text message. Non-text and sender-less messages yield `None`.
pub fn inbound_from_message(msg: &Message, bot_user_id: Option<u64>) -> Option<InboundMessage> {
    let user = msg.from()?;
    let text = msg.text()?;

    Some(InboundMessage {
        chat_id: ChatId(msg.chat.id.0),
        sender: UserId(user.id.0 as i64),
        text: text.to_string(),
        from_self: bot_user_id == Some(user.id.0),
    })
}
