use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::schema::{ExtractionRecord, FieldSpec, RecordSchema, SchemaMismatch};

/// Typed view of the host block: an address plus parallel credential lists.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    pub address: String,
    pub logins: Vec<String>,
    pub passwords: Vec<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum EndpointError {
    #[error("host address is empty")]
    Empty,
    #[error("invalid port in address `{0}`")]
    InvalidPort(String),
}

/// Host and port parsed out of an address cell.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Eq, PartialEq)]
pub struct Credential {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl HostRecord {
    pub const ADDRESS: &'static str = "address";
    pub const LOGINS: &'static str = "logins";
    pub const PASSWORDS: &'static str = "passwords";

    /// `address: scalar-string, logins: string-list, passwords: string-list`.
    pub fn schema() -> RecordSchema {
        RecordSchema::from_validated(vec![
            FieldSpec::scalar(Self::ADDRESS),
            FieldSpec::list(Self::LOGINS),
            FieldSpec::list(Self::PASSWORDS),
        ])
    }

    /// Split the address into host and port; `default_port` applies when none is given.
    ///
    /// Accepts `host`, `host:port`, `[v6]` and `[v6]:port`. A bare IPv6
    /// literal (more than one `:`) is taken whole as the host.
    pub fn endpoint(&self, default_port: u16) -> Result<Endpoint, EndpointError> {
        let address = self.address.trim();
        if address.is_empty() {
            return Err(EndpointError::Empty);
        }
        let parse_port = |p: &str| {
            p.parse::<u16>()
                .map_err(|_| EndpointError::InvalidPort(address.to_string()))
        };

        if let Some(rest) = address.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| EndpointError::InvalidPort(address.to_string()))?;
            let port = match tail.strip_prefix(':') {
                Some(p) => parse_port(p)?,
                None if tail.is_empty() => default_port,
                None => return Err(EndpointError::InvalidPort(address.to_string())),
            };
            return Ok(Endpoint {
                host: host.to_string(),
                port,
            });
        }

        match address.split_once(':') {
            Some((host, port)) if !port.contains(':') => Ok(Endpoint {
                host: host.to_string(),
                port: parse_port(port)?,
            }),
            _ => Ok(Endpoint {
                host: address.to_string(),
                port: default_port,
            }),
        }
    }

    /// Login/password pairs, matched by position.
    ///
    /// Entries without a partner in the other list are dropped.
    pub fn credentials(&self) -> Vec<Credential> {
        if self.logins.len() != self.passwords.len() {
            warn!(
                address = %self.address,
                logins = self.logins.len(),
                passwords = self.passwords.len(),
                "credential lists differ in length; unpaired entries are ignored"
            );
        }
        self.logins
            .iter()
            .zip(&self.passwords)
            .map(|(user, password)| Credential {
                user: user.clone(),
                password: password.clone(),
            })
            .collect()
    }
}

impl TryFrom<&ExtractionRecord> for HostRecord {
    type Error = SchemaMismatch;

    fn try_from(record: &ExtractionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            address: record.scalar(Self::ADDRESS)?.to_string(),
            logins: record.list(Self::LOGINS)?.to_vec(),
            passwords: record.list(Self::PASSWORDS)?.to_vec(),
        })
    }
}
