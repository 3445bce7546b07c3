use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use sheetops_remote::{
    CapturedOutput, ConnectOptions, Connection, Deadline, RemoteError, RemoteTarget, Session,
    Transport,
};

#[derive(Clone, Debug)]
enum Reply {
    Output { output: String, status: i32 },
    Fail(String),
}

#[derive(Debug, Default)]
struct Script {
    replies: HashMap<String, Reply>,
    delays: HashMap<String, Duration>,
    refused: HashSet<String>,
}

/// Everything the transport observed, in order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TransportLog {
    /// Target keys, one per successful connect.
    pub connections: Vec<String>,
    /// Target keys, one per dropped connection.
    pub disconnections: Vec<String>,
    pub sessions_opened: usize,
    pub sessions_closed: usize,
    /// `(target key, command)` for every exec attempt.
    pub executed: Vec<(String, String)>,
}

/// In-memory [`Transport`] answering commands from a script.
///
/// Unscripted commands succeed with empty output. Clones share the script
/// and the log, so a test can keep a handle after moving one into an executor.
#[derive(Clone, Debug, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
    log: Arc<Mutex<TransportLog>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, command: &str, output: &str) -> Self {
        self.respond_with_status(command, output, 0)
    }

    pub fn respond_with_status(self, command: &str, output: &str, status: i32) -> Self {
        lock(&self.script).replies.insert(
            command.to_string(),
            Reply::Output {
                output: output.to_string(),
                status,
            },
        );
        self
    }

    /// `command` fails to execute with `message`.
    pub fn fail(self, command: &str, message: &str) -> Self {
        lock(&self.script)
            .replies
            .insert(command.to_string(), Reply::Fail(message.to_string()));
        self
    }

    /// `command` sleeps for `delay` before answering. A batch deadline that
    /// runs out first interrupts it.
    pub fn delay(self, command: &str, delay: Duration) -> Self {
        lock(&self.script).delays.insert(command.to_string(), delay);
        self
    }

    /// Connections to `host` are refused.
    pub fn refuse_host(self, host: &str) -> Self {
        lock(&self.script).refused.insert(host.to_string());
        self
    }

    pub fn log(&self) -> TransportLog {
        lock(&self.log).clone()
    }
}

impl Transport for ScriptedTransport {
    type Conn = ScriptedConnection;

    fn connect(
        &self,
        target: &RemoteTarget,
        _options: &ConnectOptions,
    ) -> Result<ScriptedConnection, RemoteError> {
        if lock(&self.script).refused.contains(&target.host) {
            return Err(RemoteError::connection(target.key(), "connection refused"));
        }
        lock(&self.log).connections.push(target.key());
        Ok(ScriptedConnection {
            key: target.key(),
            script: Arc::clone(&self.script),
            log: Arc::clone(&self.log),
        })
    }
}

pub struct ScriptedConnection {
    key: String,
    script: Arc<Mutex<Script>>,
    log: Arc<Mutex<TransportLog>>,
}

impl Connection for ScriptedConnection {
    type Session = ScriptedSession;

    fn open_session(&self) -> Result<ScriptedSession, RemoteError> {
        lock(&self.log).sessions_opened += 1;
        Ok(ScriptedSession {
            key: self.key.clone(),
            script: Arc::clone(&self.script),
            log: Arc::clone(&self.log),
        })
    }
}

impl Drop for ScriptedConnection {
    fn drop(&mut self) {
        lock(&self.log).disconnections.push(self.key.clone());
    }
}

pub struct ScriptedSession {
    key: String,
    script: Arc<Mutex<Script>>,
    log: Arc<Mutex<TransportLog>>,
}

impl Session for ScriptedSession {
    fn exec(
        &mut self,
        command: &str,
        deadline: Option<Deadline>,
    ) -> Result<CapturedOutput, RemoteError> {
        lock(&self.log)
            .executed
            .push((self.key.clone(), command.to_string()));
        let (reply, delay) = {
            let script = lock(&self.script);
            (
                script.replies.get(command).cloned(),
                script.delays.get(command).copied(),
            )
        };
        if let Some(delay) = delay {
            match deadline {
                Some(d) if d.remaining() < delay => {
                    thread::sleep(d.remaining());
                    return Err(d.exceeded(&self.key, command));
                }
                _ => thread::sleep(delay),
            }
        }
        match reply {
            None => Ok(CapturedOutput::default()),
            Some(Reply::Output { output, status }) => Ok(CapturedOutput {
                output,
                exit_status: status,
            }),
            Some(Reply::Fail(message)) => Err(RemoteError::execution(command, message)),
        }
    }

    fn close(&mut self) -> Result<(), RemoteError> {
        lock(&self.log).sessions_closed += 1;
        Ok(())
    }
}
