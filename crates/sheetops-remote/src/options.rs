use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the server's host key is checked during the handshake.
///
/// No `Default`: accepting any key must be chosen
/// explicitly.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// Accept whatever key the server presents. Insecure.
    AcceptAny,
    /// Require a matching entry in an OpenSSH `known_hosts` file.
    KnownHosts(PathBuf),
}

/// What to do with a command's exit status.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExitStatusPolicy {
    /// Record every command as status 0, whatever it exited with.
    Ignore,
    /// Record the real status without acting on it.
    Record,
    /// Fail the command, and so the batch, on a non-zero status. Successful
    /// commands are recorded as status 0.
    #[default]
    RequireSuccess,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectOptions {
    pub connect_timeout: Duration,
    /// Applies to every blocking read/write once connected.
    pub io_timeout: Duration,
    /// Wall-clock budget for a whole batch, checked before each command.
    pub batch_deadline: Option<Duration>,
    pub host_key_policy: HostKeyPolicy,
    pub exit_status: ExitStatusPolicy,
}

impl ConnectOptions {
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(host_key_policy: HostKeyPolicy) -> Self {
        Self {
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            io_timeout: Self::DEFAULT_IO_TIMEOUT,
            batch_deadline: None,
            host_key_policy,
            exit_status: ExitStatusPolicy::default(),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    pub fn with_batch_deadline(mut self, deadline: Duration) -> Self {
        self.batch_deadline = Some(deadline);
        self
    }

    pub fn with_exit_status(mut self, policy: ExitStatusPolicy) -> Self {
        self.exit_status = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policies_use_kebab_case_tags() {
        let policy: HostKeyPolicy = serde_yaml::from_str("accept-any").unwrap();
        assert_eq!(policy, HostKeyPolicy::AcceptAny);
        let policy: HostKeyPolicy =
            serde_yaml::from_str("known-hosts: /etc/ssh/ssh_known_hosts").unwrap();
        assert_eq!(
            policy,
            HostKeyPolicy::KnownHosts(PathBuf::from("/etc/ssh/ssh_known_hosts"))
        );
        let exit: ExitStatusPolicy = serde_yaml::from_str("require-success").unwrap();
        assert_eq!(exit, ExitStatusPolicy::RequireSuccess);
    }

    #[test]
    fn builder_overrides_defaults() {
        let opts = ConnectOptions::new(HostKeyPolicy::AcceptAny)
            .with_connect_timeout(Duration::from_secs(3))
            .with_batch_deadline(Duration::from_secs(60))
            .with_exit_status(ExitStatusPolicy::Record);
        assert_eq!(opts.connect_timeout, Duration::from_secs(3));
        assert_eq!(opts.io_timeout, ConnectOptions::DEFAULT_IO_TIMEOUT);
        assert_eq!(opts.batch_deadline, Some(Duration::from_secs(60)));
        assert_eq!(opts.exit_status, ExitStatusPolicy::Record);
    }
}
