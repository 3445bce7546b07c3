//! Record extraction over sparse grids.
//!
//! A caller hands a [`Grid`](sheetops_common::Grid) and an anchor label to
//! [`RecordBinder`], which locates the anchor with [`GridIndex`] and then walks
//! the grid field by field, inferring value groups from blank-cell adjacency.
//! The result is an [`ExtractionRecord`] laid out by an explicit
//! [`RecordSchema`]; [`HostRecord`] is the typed view used for remote targets.

mod binder;
mod host;
mod index;
mod predicate;
mod schema;

pub use binder::{BindError, ExtractError, RecordBinder};
pub use host::{Credential, Endpoint, EndpointError, HostRecord};
pub use index::{GridIndex, Scan};
pub use predicate::{Candidate, CellPredicate, Predicate};
pub use schema::{ExtractionRecord, FieldKind, FieldSpec, FieldValue, RecordSchema, SchemaMismatch};

pub use sheetops_common::{Cell, Grid, GridError};
