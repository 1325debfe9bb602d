use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::UserId;

/// Per-sender input state for the "username only after /start" mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputState {
    Idle,
    AwaitingUsername,
}

/// Process-local map of senders we asked for a username.
///
/// Absence from the map means `Idle`; a sender is stored at most once.
#[derive(Default)]
pub struct PendingInputs {
    inner: Mutex<HashMap<UserId, InputState>>,
}

impl PendingInputs {
    pub async fn state(&self, user: UserId) -> InputState {
        self.inner
            .lock()
            .await
            .get(&user)
            .copied()
            .unwrap_or(InputState::Idle)
    }

    pub async fn mark_awaiting(&self, user: UserId) {
        self.inner
            .lock()
            .await
            .insert(user, InputState::AwaitingUsername);
    }

    /// Atomically consume the awaiting mark. Returns whether it was set.
    pub async fn take_awaiting(&self, user: UserId) -> bool {
        let mut map = self.inner.lock().await;
        matches!(map.remove(&user), Some(InputState::AwaitingUsername))
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}
