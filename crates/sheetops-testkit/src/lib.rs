//! Fixtures shared by the sheetops test suites.

mod grid;
mod transport;
mod xlsx;

pub use grid::{GridBuilder, csv_fixture, host_sheet};
pub use transport::{ScriptedConnection, ScriptedSession, ScriptedTransport, TransportLog};
pub use xlsx::xlsx_fixture;
