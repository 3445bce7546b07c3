#[cfg(feature = "csv")]
mod csv;
#[cfg(feature = "calamine")]
mod xlsx;

#[cfg(feature = "csv")]
pub use csv::{CsvOptions, CsvSource, export_csv};
#[cfg(feature = "calamine")]
pub use xlsx::XlsxSource;
