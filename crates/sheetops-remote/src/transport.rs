use std::time::{Duration, Instant};

use crate::error::RemoteError;
use crate::options::ConnectOptions;
use crate::target::RemoteTarget;

/// What one command produced: stdout and stderr merged, plus its exit status.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CapturedOutput {
    pub output: String,
    pub exit_status: i32,
}

/// Wall-clock budget of one batch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    pub fn new(started: Instant, limit: Duration) -> Self {
        Self { started, limit }
    }

    /// A budget of `limit` starting now.
    pub fn starting_now(limit: Duration) -> Self {
        Self::new(Instant::now(), limit)
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Time left; zero once expired.
    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.started.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.started.elapsed() >= self.limit
    }

    /// The error reported when `command` on `target` ran out of budget.
    pub fn exceeded(&self, target: &str, command: &str) -> RemoteError {
        RemoteError::TimedOut {
            target: target.to_string(),
            command: command.to_string(),
            limit: self.limit,
        }
    }
}

/// Dials and authenticates connections.
pub trait Transport {
    type Conn: Connection;

    fn connect(
        &self,
        target: &RemoteTarget,
        options: &ConnectOptions,
    ) -> Result<Self::Conn, RemoteError>;
}

/// An authenticated connection able to host one session per command.
///
/// Dropping the connection closes it.
pub trait Connection {
    type Session: Session;

    fn open_session(&self) -> Result<Self::Session, RemoteError>;
}

/// A single-command session.
pub trait Session {
    /// Run `command` to completion.
    ///
    /// With a `deadline`, a command still running when it expires is
    /// abandoned with [`RemoteError::TimedOut`].
    fn exec(
        &mut self,
        command: &str,
        deadline: Option<Deadline>,
    ) -> Result<CapturedOutput, RemoteError>;

    /// Release the session. Called exactly once, whether `exec` succeeded or not.
    fn close(&mut self) -> Result<(), RemoteError>;
}
