use std::collections::HashMap;
use std::fmt::Write as _;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use thiserror::Error;
use tracing::{info_span, warn};

use crate::error::RemoteError;
use crate::executor::RemoteExecutor;
use crate::result::BatchResult;
use crate::target::RemoteTarget;
use crate::transport::Transport;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("failed to start worker pool")]
    Pool(#[from] ThreadPoolBuildError),
}

/// Result of one target's batch.
#[derive(Debug)]
pub struct TargetOutcome {
    pub key: String,
    pub result: Result<BatchResult, RemoteError>,
}

impl TargetOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-target outcomes in the order the targets were given.
///
/// Keys are unique: when the same `user@host:port` is given more than once,
/// later occurrences are keyed `user@host:port#2`, `#3` and so on.
#[derive(Debug, Default)]
pub struct FleetReport {
    outcomes: Vec<TargetOutcome>,
}

impl FleetReport {
    pub fn outcomes(&self) -> &[TargetOutcome] {
        &self.outcomes
    }

    pub fn get(&self, key: &str) -> Option<&TargetOutcome> {
        self.outcomes.iter().find(|o| o.key == key)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(TargetOutcome::is_success)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// One `== key ==` section per target: the aggregated output, or an
    /// `error:` line with the full cause chain.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for outcome in &self.outcomes {
            let _ = writeln!(out, "== {} ==", outcome.key);
            match &outcome.result {
                Ok(batch) => out.push_str(&batch.render()),
                Err(err) => {
                    let _ = writeln!(out, "error: {}", error_chain(err));
                }
            }
        }
        out
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(text, ": {cause}");
        source = cause.source();
    }
    text
}

/// Runs the same batch on many targets, at most `max_workers` at a time.
///
/// Each batch owns its connection and sessions; nothing is shared between
/// targets except the executor's read-only settings.
pub struct Fleet<T> {
    executor: RemoteExecutor<T>,
    pool: ThreadPool,
    max_workers: usize,
}

impl<T> Fleet<T>
where
    T: Transport + Sync,
{
    /// A `max_workers` of zero is treated as one.
    pub fn new(executor: RemoteExecutor<T>, max_workers: usize) -> Result<Self, FleetError> {
        let max_workers = max_workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(max_workers)
            .thread_name(|i| format!("sheetops-worker-{i}"))
            .build()?;
        Ok(Self {
            executor,
            pool,
            max_workers,
        })
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn executor(&self) -> &RemoteExecutor<T> {
        &self.executor
    }

    pub fn run<S>(&self, targets: &[RemoteTarget], commands: &[S]) -> FleetReport
    where
        S: AsRef<str> + Sync,
    {
        let keys = report_keys(targets);
        let outcomes = self.pool.install(|| {
            targets
                .par_iter()
                .zip(keys)
                .map(|(target, key)| {
                    let span = info_span!("batch", remote = %key);
                    let result = span.in_scope(|| self.executor.run_batch(target, commands));
                    if let Err(err) = &result {
                        warn!(remote = %key, error = %err, "target failed");
                    }
                    TargetOutcome { key, result }
                })
                .collect()
        });
        FleetReport { outcomes }
    }
}

fn report_keys(targets: &[RemoteTarget]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    targets
        .iter()
        .map(|target| {
            let key = target.key();
            let count = seen.entry(key.clone()).or_default();
            *count += 1;
            match *count {
                1 => key,
                n => format!("{key}#{n}"),
            }
        })
        .collect()
}
