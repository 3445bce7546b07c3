use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::RemoteError;
use crate::options::{ConnectOptions, ExitStatusPolicy};
use crate::result::{BatchResult, CommandResult};
use crate::target::RemoteTarget;
use crate::transport::{Connection, Deadline, Session, Transport};

/// Runs ordered command batches against one target at a time.
#[derive(Clone, Debug)]
pub struct RemoteExecutor<T> {
    transport: T,
    options: ConnectOptions,
}

impl<T: Transport> RemoteExecutor<T> {
    pub fn new(transport: T, options: ConnectOptions) -> Self {
        Self { transport, options }
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Dial and authenticate one connection.
    pub fn connect(&self, target: &RemoteTarget) -> Result<T::Conn, RemoteError> {
        let conn = self.transport.connect(target, &self.options)?;
        info!(remote = %target, "connected");
        Ok(conn)
    }

    /// Run one command in its own session.
    ///
    /// The session is closed before returning on every path; a failure to
    /// close after a successful command is logged, not returned.
    pub fn run_command(
        &self,
        conn: &T::Conn,
        command: &str,
    ) -> Result<CommandResult, RemoteError> {
        self.run_command_within(conn, command, None)
    }

    /// [`run_command`](Self::run_command), abandoning the command once
    /// `deadline` expires.
    pub fn run_command_within(
        &self,
        conn: &T::Conn,
        command: &str,
        deadline: Option<Deadline>,
    ) -> Result<CommandResult, RemoteError> {
        let mut session = conn.open_session()?;
        debug!(command, "executing");
        let outcome = session.exec(command, deadline);
        if let Err(err) = session.close() {
            warn!(command, error = %err, "failed to close session");
        }
        let captured = outcome?;

        let exit_status = match self.options.exit_status {
            ExitStatusPolicy::Ignore => 0,
            ExitStatusPolicy::Record => captured.exit_status,
            ExitStatusPolicy::RequireSuccess if captured.exit_status != 0 => {
                return Err(RemoteError::ExitStatus {
                    command: command.to_string(),
                    status: captured.exit_status,
                    output: captured.output,
                });
            }
            ExitStatusPolicy::RequireSuccess => 0,
        };
        Ok(CommandResult {
            command: command.to_string(),
            exit_status,
            output: captured.output,
        })
    }

    /// Connect once and run `commands` strictly in order.
    ///
    /// The first failure aborts the batch and is returned on its own; results
    /// of commands that already ran are dropped. With a batch deadline, the
    /// budget is checked before and after every command and passed down so a
    /// running command is cut off when it expires.
    pub fn run_batch<S: AsRef<str>>(
        &self,
        target: &RemoteTarget,
        commands: &[S],
    ) -> Result<BatchResult, RemoteError> {
        let started = Instant::now();
        let deadline = self
            .options
            .batch_deadline
            .map(|limit| Deadline::new(started, limit));
        let key = target.key();
        let conn = self.connect(target)?;
        let mut results = Vec::with_capacity(commands.len());
        for command in commands {
            let command = command.as_ref();
            if let Some(deadline) = deadline.filter(Deadline::is_expired) {
                return Err(deadline.exceeded(&key, command));
            }
            let result = self.run_command_within(&conn, command, deadline)?;
            if let Some(deadline) = deadline.filter(Deadline::is_expired) {
                return Err(deadline.exceeded(&key, command));
            }
            results.push(result);
        }
        info!(
            remote = %target,
            commands = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch complete"
        );
        Ok(BatchResult::new(results))
    }
}
