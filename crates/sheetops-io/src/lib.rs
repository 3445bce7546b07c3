//! Sources that materialise one sheet as a [`Grid`] of display strings.

pub mod backends;
mod error;
mod source;

#[cfg(feature = "csv")]
pub use backends::{CsvOptions, CsvSource, export_csv};
#[cfg(feature = "calamine")]
pub use backends::XlsxSource;
pub use error::RetrievalError;
pub use source::{GridSource, MemorySource};

pub use sheetops_common::Grid;
