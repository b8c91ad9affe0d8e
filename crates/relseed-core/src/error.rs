use thiserror::Error;

use crate::schema::TableKey;

/// Core error type shared across relseed crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// The strict topological sort found a foreign-key cycle.
    #[error("foreign key cycle between {} (partial order: {})", join(.members), join(.partial_order))]
    CycleDetected {
        /// Tables still waiting on a dependency when the sort stalled.
        members: Vec<TableKey>,
        /// Tables that were ordered before the sort stalled.
        partial_order: Vec<TableKey>,
    },
}

/// Convenience alias for results returned by relseed crates.
pub type Result<T> = std::result::Result<T, Error>;

fn join(keys: &[TableKey]) -> String {
    if keys.is_empty() {
        return "<none>".to_string();
    }
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
