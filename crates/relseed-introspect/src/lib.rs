//! Marshaling of canonical introspection rows into the relseed table model.

pub mod builder;
pub mod checks;
pub mod error;
pub mod mapper;
pub mod options;
pub mod snapshot;
pub mod source;
pub mod types;

pub use builder::{SchemaBuilder, SchemaGraph, build_schema};
pub use checks::{extract_allowed_values, extract_length_limit};
pub use error::{IntrospectError, Result};
pub use mapper::marshal;
pub use options::MarshalOptions;
pub use snapshot::{
    Engine, IntrospectionSnapshot, RawColumn, RawConstraint, RawEnumColumn, RawEnumType,
    RawForeignKey, RawTable,
};
pub use source::{JsonFileSource, SnapshotSource};
pub use types::{NormalizedType, normalize_type_name};

pub use relseed_core::{Table, TableKey, TableMap};
