use std::time::Duration;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures of a connection or of a command within a batch.
///
/// Any of these aborts the batch it occurs in; results gathered earlier in
/// that batch are discarded.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("connection to {target} failed")]
    Connection {
        target: String,
        #[source]
        source: BoxError,
    },
    #[error("host key of {target} rejected: {reason}")]
    HostKey { target: String, reason: String },
    #[error("authentication as `{user}` on {target} failed")]
    Authentication {
        target: String,
        user: String,
        #[source]
        source: Option<BoxError>,
    },
    #[error("command `{command}` failed")]
    Execution {
        command: String,
        #[source]
        source: BoxError,
    },
    #[error("command `{command}` exited with status {status}")]
    ExitStatus {
        command: String,
        status: i32,
        output: String,
    },
    #[error("batch on {target} exceeded its {limit:?} deadline at `{command}`")]
    TimedOut {
        target: String,
        command: String,
        limit: Duration,
    },
}

impl RemoteError {
    pub fn connection(target: impl Into<String>, source: impl Into<BoxError>) -> Self {
        RemoteError::Connection {
            target: target.into(),
            source: source.into(),
        }
    }

    pub fn execution(command: impl Into<String>, source: impl Into<BoxError>) -> Self {
        RemoteError::Execution {
            command: command.into(),
            source: source.into(),
        }
    }

    /// True for failures that happened before any command could run.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            RemoteError::Connection { .. }
                | RemoteError::HostKey { .. }
                | RemoteError::Authentication { .. }
        )
    }
}
