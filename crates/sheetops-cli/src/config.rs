use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use sheetops_extract::RecordSchema;
use sheetops_remote::{ConnectOptions, DEFAULT_PORT, ExitStatusPolicy, HostKeyPolicy};

pub const DEFAULT_CONFIG_PATH: &str = "config/sheetops.yaml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub source: SourceConfig,
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Csv,
    Xlsx,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Relative paths resolve against the directory holding the config file.
    pub path: PathBuf,
    #[serde(default = "default_sheet")]
    pub sheet: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_true")]
    pub pad_rows: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionConfig {
    pub anchor: String,
    pub fields: RecordSchema,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_io_timeout")]
    pub io_timeout_secs: u64,
    #[serde(default)]
    pub target_timeout_secs: Option<u64>,
    pub host_key_policy: HostKeyPolicy,
    #[serde(default)]
    pub exit_status: ExitStatusPolicy,
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_sheet() -> String {
    "Sheet1".to_string()
}

fn default_delimiter() -> char {
    ','
}

fn default_true() -> bool {
    true
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_connect_timeout() -> u64 {
    ConnectOptions::DEFAULT_CONNECT_TIMEOUT.as_secs()
}

fn default_io_timeout() -> u64 {
    ConnectOptions::DEFAULT_IO_TIMEOUT.as_secs()
}

fn default_max_workers() -> usize {
    4
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config = Self::parse(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base);
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            !self.extraction.anchor.is_empty(),
            "extraction.anchor must not be empty"
        );
        ensure!(
            self.source.delimiter.is_ascii(),
            "source.delimiter must be a single ASCII character"
        );
        if let Some(remote) = &self.remote {
            ensure!(remote.max_workers >= 1, "remote.max_workers must be at least 1");
            ensure!(
                remote.connect_timeout_secs > 0 && remote.io_timeout_secs > 0,
                "remote timeouts must be greater than zero"
            );
            ensure!(
                remote.target_timeout_secs != Some(0),
                "remote.target_timeout_secs must be greater than zero"
            );
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        if self.source.path.is_relative() {
            self.source.path = base.join(&self.source.path);
        }
        if let Some(remote) = &mut self.remote {
            if let HostKeyPolicy::KnownHosts(path) = &mut remote.host_key_policy {
                *path = expand_home(path);
            }
        }
    }
}

impl SourceConfig {
    /// Validated to be ASCII on load.
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b',')
    }
}

impl RemoteConfig {
    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.host_key_policy.clone())
            .with_connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .with_io_timeout(Duration::from_secs(self.io_timeout_secs))
            .with_exit_status(self.exit_status);
        if let Some(secs) = self.target_timeout_secs {
            options = options.with_batch_deadline(Duration::from_secs(secs));
        }
        options
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
source: { kind: csv, path: ServerTable.csv }
extraction:
  anchor: "Основная информация"
  fields:
    - { name: address, kind: scalar-string }
    - { name: logins, kind: string-list }
    - { name: passwords, kind: string-list }
remote:
  host_key_policy: { known-hosts: /etc/ssh/known_hosts }
  target_timeout_secs: 120
  exit_status: record
commands: ["uname -a", "uptime"]
logging: { filter: debug, format: json }
"#;

    #[test]
    fn full_config_with_defaults() {
        let config = Config::parse(FULL).unwrap();
        assert_eq!(config.source.kind, SourceKind::Csv);
        assert_eq!(config.source.sheet, "Sheet1");
        assert_eq!(config.source.delimiter_byte(), b',');
        assert!(config.source.pad_rows);
        assert_eq!(config.extraction.fields.len(), 3);
        assert_eq!(config.commands, vec!["uname -a", "uptime"]);
        assert_eq!(config.logging.format, LogFormat::Json);

        let remote = config.remote.unwrap();
        assert_eq!(remote.port, 22);
        assert_eq!(remote.max_workers, 4);
        let options = remote.connect_options();
        assert_eq!(options.connect_timeout, Duration::from_secs(10));
        assert_eq!(options.batch_deadline, Some(Duration::from_secs(120)));
        assert_eq!(options.exit_status, ExitStatusPolicy::Record);
        assert_eq!(
            options.host_key_policy,
            HostKeyPolicy::KnownHosts("/etc/ssh/known_hosts".into())
        );
    }

    #[test]
    fn host_key_policy_is_required() {
        let text = FULL.replace("  host_key_policy: { known-hosts: /etc/ssh/known_hosts }\n", "");
        let err = Config::parse(&text).unwrap_err();
        assert!(format!("{err:#}").contains("host_key_policy"));
    }

    #[test]
    fn rejects_invalid_values() {
        let zero_workers = FULL.replace("exit_status: record", "max_workers: 0");
        assert!(Config::parse(&zero_workers).is_err());

        let bad_schema = FULL.replace(
            "- { name: address, kind: scalar-string }",
            "- { name: address, kind: string-list }",
        );
        let err = Config::parse(&bad_schema).unwrap_err();
        assert!(format!("{err:#}").contains("must be a scalar-string"));

        let unknown_key = FULL.replace("commands:", "comands:");
        assert!(Config::parse(&unknown_key).is_err());

        let no_anchor = FULL.replace("\"Основная информация\"", "\"\"");
        assert!(Config::parse(&no_anchor).is_err());
    }

    #[test]
    fn relative_source_path_follows_config_dir() {
        let mut config = Config::parse(FULL).unwrap();
        config.resolve_paths(Path::new("/srv/ops"));
        assert_eq!(config.source.path, PathBuf::from("/srv/ops/ServerTable.csv"));
    }
}
