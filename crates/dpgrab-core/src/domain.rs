use std::{any::Any, fmt, sync::Arc};

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Adapter-owned payload carried through the core without inspection.
#[derive(Clone)]
pub struct Opaque(Arc<dyn Any + Send + Sync>);

impl Opaque {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn empty() -> Self {
        Self::new(())
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Opaque(..)")
    }
}

/// Identity returned by a successful handle lookup. Only used to list photos.
#[derive(Clone, Debug)]
pub struct ResolvedUser {
    pub id: UserId,
    pub handle: String,
    pub remote: Opaque,
}

/// Opaque reference to one remote profile photo.
#[derive(Clone, Debug)]
pub struct PhotoRef {
    /// Stable identifier, used for logging.
    pub file_id: String,
    pub remote: Opaque,
}

impl PhotoRef {
    pub fn new(file_id: impl Into<String>, remote: Opaque) -> Self {
        Self {
            file_id: file_id.into(),
            remote,
        }
    }
}
