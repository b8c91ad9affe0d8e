//! Schema graph analysis for relseed.
//!
//! This crate owns the normalized table model, foreign-key cardinality
//! inference, bridge-table detection, and the dependency orderings used to
//! insert seed rows safely.

pub mod constraints;
pub mod error;
pub mod graph;
pub mod relationships;
pub mod schema;
pub mod types;

#[cfg(test)]
mod test_support;

pub use constraints::{
    Constraint, ConstraintKind, ForeignKey, RelationType, Relationship, RelationshipOrigin,
};
pub use error::{Error, Result};
pub use graph::{
    DependencyGraph, InsertOrder, build_dependency_graph, insert_relationships,
    reorganize_tables_by_relationships, separate_tables_list_by_type, sort_tables_by_in_degree,
    sort_tables_for_insert, topological_sort,
};
pub use relationships::{
    INFERENCE_SWEEPS, analyze_bridge_tables, determine_relationship_type, infer_relationships,
    is_bridge_table,
};
pub use schema::{Column, Table, TableKey, TableMap, TableType};
pub use types::{ColumnType, EnumType, IdentityGeneration, TemporalKind};
