use grammers_client::InvocationError;

use dpgrab_core::{errors::Error, status::ConnectionStatus};

/// Which call failed.
#[derive(Clone, Copy, Debug)]
pub enum Stage<'a> {
    Connect,
    Resolve(&'a str),
    List,
    Download,
}

/// The parts of an [`InvocationError`] the error mapping looks at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Failure {
    /// The server answered with an RPC error.
    Rpc { code: i32, name: String },
    /// Anything below RPC level: dropped request, I/O, framing.
    Transport(String),
}

impl From<&InvocationError> for Failure {
    fn from(e: &InvocationError) -> Self {
        match e {
            InvocationError::Rpc(rpc) => Failure::Rpc {
                code: rpc.code,
                name: rpc.name.clone(),
            },
            other => Failure::Transport(other.to_string()),
        }
    }
}

const NOT_FOUND: &[&str] = &[
    "USERNAME_NOT_OCCUPIED",
    "USERNAME_INVALID",
    "PEER_ID_INVALID",
    "USER_ID_INVALID",
];

impl Failure {
    pub fn into_error(self, stage: Stage<'_>) -> Error {
        match (self, stage) {
            (Failure::Transport(detail), _) => Error::Network(detail),
            (Failure::Rpc { name, .. }, Stage::Resolve(handle)) if NOT_FOUND.contains(&name.as_str()) => {
                Error::Resolution {
                    handle: handle.to_string(),
                    reason: name.to_lowercase().replace('_', " "),
                }
            }
            // FLOOD_WAIT longer than the client's automatic sleep.
            (Failure::Rpc { code: 420, name }, _) => Error::Network(format!("rate limited: {name}")),
            (Failure::Rpc { code, name }, Stage::Download) => {
                Error::Transfer(format!("download rejected ({code}): {name}"))
            }
            (Failure::Rpc { code, name }, _) => Error::unexpected("api", format!("{code} {name}")),
        }
    }
}

/// Map a failure and update connectivity: only transport failures mean the
/// platform is unreachable.
pub(crate) fn observe(status: &ConnectionStatus, failure: Failure, stage: Stage<'_>) -> Error {
    if matches!(failure, Failure::Transport(_)) {
        status.set_connected(false);
    } else {
        status.set_connected(true);
    }
    failure.into_error(stage)
}
