use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use ssh2::{CheckResult, ExtendedData, KnownHostFileKind};
use tracing::{debug, warn};

use crate::error::RemoteError;
use crate::options::{ConnectOptions, HostKeyPolicy};
use crate::target::RemoteTarget;
use crate::transport::{CapturedOutput, Connection, Deadline, Session, Transport};

const READ_CHUNK: usize = 8 * 1024;

fn timeout_ms(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

/// Password-authenticated SSH over libssh2.
#[derive(Clone, Copy, Debug, Default)]
pub struct SshTransport;

impl SshTransport {
    fn dial(target: &RemoteTarget, timeout: Duration) -> Result<TcpStream, RemoteError> {
        let addrs = (target.host.as_str(), target.port)
            .to_socket_addrs()
            .map_err(|e| RemoteError::connection(target.key(), e))?;
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    debug!(%addr, error = %e, "dial attempt failed");
                    last_err = Some(e);
                }
            }
        }
        Err(match last_err {
            Some(e) => RemoteError::connection(target.key(), e),
            None => RemoteError::connection(target.key(), "host resolved to no addresses"),
        })
    }

    fn verify_host_key(
        session: &ssh2::Session,
        target: &RemoteTarget,
        policy: &HostKeyPolicy,
    ) -> Result<(), RemoteError> {
        let path = match policy {
            HostKeyPolicy::AcceptAny => {
                debug!(remote = %target, "host key accepted without verification");
                return Ok(());
            }
            HostKeyPolicy::KnownHosts(path) => path,
        };
        let reject = |reason: String| RemoteError::HostKey {
            target: target.key(),
            reason,
        };
        let (key, _) = session
            .host_key()
            .ok_or_else(|| reject("server presented no host key".to_string()))?;
        let mut known = session
            .known_hosts()
            .map_err(|e| RemoteError::connection(target.key(), e))?;
        known
            .read_file(path, KnownHostFileKind::OpenSSH)
            .map_err(|e| reject(format!("cannot read {}: {e}", path.display())))?;
        match known.check_port(&target.host, target.port, key) {
            CheckResult::Match => Ok(()),
            CheckResult::NotFound => Err(reject(format!("no entry in {}", path.display()))),
            CheckResult::Mismatch => Err(reject(format!(
                "key does not match the entry in {}",
                path.display()
            ))),
            CheckResult::Failure => Err(reject("known_hosts check failed".to_string())),
        }
    }
}

impl Transport for SshTransport {
    type Conn = SshConnection;

    fn connect(
        &self,
        target: &RemoteTarget,
        options: &ConnectOptions,
    ) -> Result<SshConnection, RemoteError> {
        let conn_err = |e: ssh2::Error| RemoteError::connection(target.key(), e);

        let tcp = Self::dial(target, options.connect_timeout)?;
        tcp.set_read_timeout(Some(options.io_timeout))
            .and_then(|_| tcp.set_write_timeout(Some(options.io_timeout)))
            .map_err(|e| RemoteError::connection(target.key(), e))?;

        let mut session = ssh2::Session::new().map_err(conn_err)?;
        session.set_tcp_stream(tcp);
        session.set_timeout(timeout_ms(options.io_timeout));
        session.handshake().map_err(conn_err)?;

        Self::verify_host_key(&session, target, &options.host_key_policy)?;

        session
            .userauth_password(&target.user, &target.password)
            .map_err(|e| RemoteError::Authentication {
                target: target.key(),
                user: target.user.clone(),
                source: Some(e.into()),
            })?;
        if !session.authenticated() {
            return Err(RemoteError::Authentication {
                target: target.key(),
                user: target.user.clone(),
                source: None,
            });
        }

        Ok(SshConnection {
            session,
            key: target.key(),
            io_timeout: options.io_timeout,
        })
    }
}

pub struct SshConnection {
    session: ssh2::Session,
    key: String,
    io_timeout: Duration,
}

impl Connection for SshConnection {
    type Session = SshSession;

    fn open_session(&self) -> Result<SshSession, RemoteError> {
        let mut channel = self
            .session
            .channel_session()
            .map_err(|e| RemoteError::connection(self.key.clone(), e))?;
        channel
            .handle_extended_data(ExtendedData::Merge)
            .map_err(|e| RemoteError::connection(self.key.clone(), e))?;
        Ok(SshSession {
            channel,
            session: self.session.clone(),
            key: self.key.clone(),
            io_timeout: self.io_timeout,
            closed: false,
        })
    }
}

impl Drop for SshConnection {
    fn drop(&mut self) {
        if let Err(e) = self.session.disconnect(None, "batch finished", None) {
            debug!(remote = %self.key, error = %e, "disconnect failed");
        }
    }
}

/// One exec channel.
pub struct SshSession {
    channel: ssh2::Channel,
    session: ssh2::Session,
    key: String,
    io_timeout: Duration,
    closed: bool,
}

impl SshSession {
    /// Narrow libssh2's blocking timeout to what is left of the deadline.
    fn arm(&self, deadline: Option<Deadline>) {
        let timeout = match deadline {
            Some(d) => self.io_timeout.min(d.remaining()).max(Duration::from_millis(1)),
            None => self.io_timeout,
        };
        self.session.set_timeout(timeout_ms(timeout));
    }

    fn run(
        &mut self,
        command: &str,
        deadline: Option<Deadline>,
    ) -> Result<CapturedOutput, RemoteError> {
        // Any failure once the budget is gone is reported as the timeout.
        let fail = |deadline: Option<Deadline>, key: &str, source: RemoteError| match deadline {
            Some(d) if d.is_expired() => d.exceeded(key, command),
            _ => source,
        };

        self.arm(deadline);
        self.channel
            .exec(command)
            .map_err(|e| fail(deadline, &self.key, RemoteError::execution(command, e)))?;

        let mut raw = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(d) = deadline.filter(Deadline::is_expired) {
                return Err(d.exceeded(&self.key, command));
            }
            self.arm(deadline);
            match self.channel.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => raw.extend_from_slice(&chunk[..n]),
                Err(e) => {
                    return Err(fail(deadline, &self.key, RemoteError::execution(command, e)));
                }
            }
        }

        self.arm(deadline);
        self.channel
            .wait_close()
            .map_err(|e| fail(deadline, &self.key, RemoteError::execution(command, e)))?;
        self.closed = true;
        let exit_status = self
            .channel
            .exit_status()
            .map_err(|e| RemoteError::execution(command, e))?;

        Ok(CapturedOutput {
            output: String::from_utf8_lossy(&raw).into_owned(),
            exit_status,
        })
    }
}

impl Session for SshSession {
    fn exec(
        &mut self,
        command: &str,
        deadline: Option<Deadline>,
    ) -> Result<CapturedOutput, RemoteError> {
        let outcome = self.run(command, deadline);
        self.session.set_timeout(timeout_ms(self.io_timeout));
        outcome
    }

    fn close(&mut self) -> Result<(), RemoteError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.channel
            .close()
            .and_then(|_| self.channel.wait_close())
            .map_err(|e| {
                warn!(error = %e, "channel close failed");
                RemoteError::execution("<close>", e)
            })
    }
}
