//! Remote batch execution.
//!
//! [`RemoteExecutor`] opens one connection per [`RemoteTarget`] and runs an
//! ordered command list over it, one session per command, failing the whole
//! batch on the first error. [`Fleet`] schedules one batch per target over a
//! bounded worker pool and reports outcomes keyed by target.
//!
//! The network layer sits behind the [`Transport`] / [`Connection`] /
//! [`Session`] traits; [`SshTransport`] is the libssh2 implementation.

mod error;
mod executor;
mod fleet;
mod options;
mod result;
#[cfg(feature = "ssh")]
mod ssh;
mod target;
mod transport;

pub use error::{BoxError, RemoteError};
pub use executor::RemoteExecutor;
pub use fleet::{Fleet, FleetError, FleetReport, TargetOutcome};
pub use options::{ConnectOptions, ExitStatusPolicy, HostKeyPolicy};
pub use result::{BatchResult, CommandResult, aggregate};
#[cfg(feature = "ssh")]
pub use ssh::{SshConnection, SshSession, SshTransport};
pub use target::{DEFAULT_PORT, RemoteTarget};
pub use transport::{CapturedOutput, Connection, Deadline, Session, Transport};
