use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use sheetops_extract::{ExtractionRecord, FieldValue, Grid, HostRecord, RecordBinder};
use sheetops_io::{CsvOptions, CsvSource, GridSource, export_csv};
use sheetops_remote::{Fleet, RemoteExecutor, SshTransport};
use tracing::{info, warn};

mod config;
mod logging;
mod targets;

use config::{Config, DEFAULT_CONFIG_PATH, RemoteConfig, SourceConfig, SourceKind};

/// Overrides every password read from the sheet.
const PASSWORD_ENV: &str = "SHEETOPS_PASSWORD";

#[derive(Parser, Debug)]
#[command(
    name = "sheetops",
    version,
    about = "Extract host credentials from a spreadsheet and run commands on the host over SSH"
)]
struct Cli {
    /// Path to the YAML configuration.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the configured sheet as tab-separated rows.
    Show,
    /// Bind the host record from the sheet and print it.
    Extract {
        /// Print JSON instead of `name: value` lines.
        #[arg(long)]
        json: bool,
    },
    /// Write a CSV copy of the configured sheet.
    Snapshot {
        #[arg(long)]
        out: PathBuf,
    },
    /// Run the command batch on every login found for the host.
    Run {
        /// Command to run; repeatable. Replaces the configured `commands`.
        #[arg(long = "command")]
        commands: Vec<String>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    logging::init(&config.logging)?;

    match cli.command {
        Command::Show => {
            print!("{}", render_tsv(&load_grid(&config.source)?));
            Ok(ExitCode::SUCCESS)
        }
        Command::Extract { json } => {
            let record = extract(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print!("{}", render_record(&record));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Snapshot { out } => {
            let grid = load_grid(&config.source)?;
            export_csv(&grid, &out)
                .with_context(|| format!("writing snapshot {}", out.display()))?;
            info!(path = %out.display(), rows = grid.height(), "snapshot written");
            Ok(ExitCode::SUCCESS)
        }
        Command::Run { commands } => {
            let commands = if commands.is_empty() {
                config.commands.clone()
            } else {
                commands
            };
            if commands.is_empty() {
                bail!("no commands given; pass --command or set `commands` in the config");
            }
            let Some(remote) = &config.remote else {
                bail!("config has no `remote` section");
            };
            run(&config, remote, &commands)
        }
    }
}

fn load_grid(source: &SourceConfig) -> Result<Grid> {
    let store: Box<dyn GridSource> = match source.kind {
        SourceKind::Csv => {
            let options = CsvOptions {
                delimiter: source.delimiter_byte(),
                pad_rows: source.pad_rows,
            };
            Box::new(CsvSource::open_with_options(&source.path, options)?)
        }
        SourceKind::Xlsx => open_xlsx(&source.path, source.pad_rows)?,
    };
    store
        .rows(&source.sheet)
        .with_context(|| format!("loading sheet `{}` from {}", source.sheet, source.path.display()))
}

#[cfg(feature = "xlsx")]
fn open_xlsx(path: &Path, pad_rows: bool) -> Result<Box<dyn GridSource>> {
    Ok(Box::new(
        sheetops_io::XlsxSource::open(path)?.with_pad_rows(pad_rows),
    ))
}

#[cfg(not(feature = "xlsx"))]
fn open_xlsx(path: &Path, _pad_rows: bool) -> Result<Box<dyn GridSource>> {
    bail!(
        "{} is an xlsx source but sheetops was built without the `xlsx` feature",
        path.display()
    )
}

fn extract(config: &Config) -> Result<ExtractionRecord> {
    let grid = load_grid(&config.source)?;
    let binder = RecordBinder::new(config.extraction.fields.clone());
    match binder.bind(&grid, &config.extraction.anchor) {
        Ok(record) => {
            if record.is_zero() {
                warn!(anchor = %config.extraction.anchor, "anchor block produced no values");
            }
            Ok(record)
        }
        Err(err) => {
            warn!(partial = ?err.partial, "extraction stopped early");
            Err(err).context("extracting record")
        }
    }
}

fn run(config: &Config, remote: &RemoteConfig, commands: &[String]) -> Result<ExitCode> {
    let record = extract(config)?;
    let host = HostRecord::try_from(&record)
        .context("record schema must declare address, logins and passwords")?;
    let password = std::env::var(PASSWORD_ENV).ok();
    let targets = targets::derive(&host, remote.port, password.as_deref())?;

    let executor = RemoteExecutor::new(SshTransport, remote.connect_options());
    let fleet = Fleet::new(executor, remote.max_workers)?;
    let report = fleet.run(&targets, commands);
    print!("{}", report.render());

    let failed = report.failures().count();
    if failed > 0 {
        warn!(failed, total = report.len(), "some targets failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn render_tsv(grid: &Grid) -> String {
    let mut out = String::new();
    for row in grid.rows() {
        let _ = writeln!(out, "{}", row.join("\t"));
    }
    out
}

fn render_record(record: &ExtractionRecord) -> String {
    let mut out = String::new();
    for (spec, value) in record.iter() {
        let text = match value {
            FieldValue::Scalar(s) => s.clone(),
            FieldValue::List(items) => items.join(", "),
        };
        let _ = writeln!(out, "{}: {}", spec.name, text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetops_extract::{FieldSpec, RecordSchema};

    #[test]
    fn record_lines_follow_schema_order() {
        let schema = RecordSchema::new(vec![
            FieldSpec::scalar("address"),
            FieldSpec::list("logins"),
            FieldSpec::list("passwords"),
        ])
        .unwrap();
        let mut record = ExtractionRecord::empty(schema);
        record.assign("address", "10.0.0.1").unwrap();
        record.assign("logins", "root").unwrap();
        record.assign("logins", "admin").unwrap();

        assert_eq!(
            render_record(&record),
            "address: 10.0.0.1\nlogins: root, admin\npasswords: \n"
        );
    }

    #[test]
    fn tsv_keeps_empty_cells() {
        let grid = Grid::from_rows(vec![vec!["Logins", "root"], vec!["", "admin"]]);
        assert_eq!(render_tsv(&grid), "Logins\troot\n\tadmin\n");
    }
}
