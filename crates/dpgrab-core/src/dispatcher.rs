//! Routes inbound text messages to the start greeting or the photo fetcher.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    fetcher::{FetchOutcome, PhotoFetcher},
    messaging::{port::MessagingPort, types::InboundMessage},
    pending::PendingInputs,
    utils::parse_command,
};

pub const GREETING: &str =
    "Hi, what's up? Send me a Telegram username (with or without @) to fetch their DPs.";

/// When a plain text message is treated as a username.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    /// Any non-command text is a username.
    Unconditional,
    /// Only the first text after `/start` is a username.
    AfterStart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    FromSelf,
    OtherCommand,
    NotAwaiting,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Greeted,
    Fetched(FetchOutcome),
    Ignored(IgnoreReason),
}

pub struct CommandDispatcher {
    messenger: Arc<dyn MessagingPort>,
    fetcher: Arc<PhotoFetcher>,
    pending: PendingInputs,
    mode: InputMode,
}

impl CommandDispatcher {
    pub fn new(
        messenger: Arc<dyn MessagingPort>,
        fetcher: Arc<PhotoFetcher>,
        mode: InputMode,
    ) -> Self {
        Self {
            messenger,
            fetcher,
            pending: PendingInputs::default(),
            mode,
        }
    }

    pub fn pending(&self) -> &PendingInputs {
        &self.pending
    }

    pub async fn dispatch(&self, msg: InboundMessage) -> Dispatch {
        if msg.from_self {
            return Dispatch::Ignored(IgnoreReason::FromSelf);
        }

        if let Some((cmd, _args)) = parse_command(&msg.text) {
            if cmd == "start" {
                self.handle_start(&msg).await;
                return Dispatch::Greeted;
            }
            debug!(chat_id = msg.chat_id.0, %cmd, "ignoring unknown command");
            return Dispatch::Ignored(IgnoreReason::OtherCommand);
        }

        if self.mode == InputMode::AfterStart && !self.pending.take_awaiting(msg.sender).await {
            return Dispatch::Ignored(IgnoreReason::NotAwaiting);
        }

        Dispatch::Fetched(self.fetcher.fetch_and_relay(msg.chat_id, &msg.text).await)
    }

    async fn handle_start(&self, msg: &InboundMessage) {
        if self.mode == InputMode::AfterStart {
            self.pending.mark_awaiting(msg.sender).await;
        }
        if let Err(e) = self.messenger.send_text(msg.chat_id, GREETING).await {
            warn!(chat_id = msg.chat_id.0, error = %e, "failed to send greeting");
        }
    }
}
