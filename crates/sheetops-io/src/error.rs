use std::path::PathBuf;

use thiserror::Error;

/// Why a sheet could not be materialised.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("cannot access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("sheet `{sheet}` not found (available: {})", available.join(", "))]
    UnknownSheet {
        sheet: String,
        available: Vec<String>,
    },
    #[error("{backend}: malformed data in {}", path.display())]
    Format {
        backend: &'static str,
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl RetrievalError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RetrievalError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn format(
        backend: &'static str,
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        RetrievalError::Format {
            backend,
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn unknown_sheet(sheet: &str, available: &[String]) -> Self {
        RetrievalError::UnknownSheet {
            sheet: sheet.to_string(),
            available: available.to_vec(),
        }
    }
}
