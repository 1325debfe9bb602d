/// Coarse classification of a failure, used to pick the user-facing reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Resolution,
    Network,
    Transfer,
    Unexpected,
}

/// Core error type.
///
/// Adapter crates map their library errors into this type so handlers can
/// decide between an explanatory reply, a generic network reply, or a
/// category-only "unexpected" reply.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("could not resolve @{handle}: {reason}")]
    Resolution { handle: String, reason: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("transfer error: {0}")]
    Transfer(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{category} error: {detail}")]
    Unexpected { category: String, detail: String },
}

impl Error {
    pub fn unexpected(category: impl Into<String>, detail: impl ToString) -> Self {
        Self::Unexpected {
            category: category.into(),
            detail: detail.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Configuration,
            Error::Resolution { .. } => ErrorKind::Resolution,
            Error::Network(_) => ErrorKind::Network,
            Error::Transfer(_) => ErrorKind::Transfer,
            Error::Io(_) | Error::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    /// Short category name, safe to show to a remote user.
    pub fn category(&self) -> &str {
        match self {
            Error::Config(_) => "configuration",
            Error::Resolution { .. } => "resolution",
            Error::Network(_) => "network",
            Error::Transfer(_) => "transfer",
            Error::Io(_) => "io",
            Error::Unexpected { category, .. } => category,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
