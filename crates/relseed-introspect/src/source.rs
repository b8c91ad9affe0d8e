use std::path::PathBuf;

use crate::error::Result;
use crate::snapshot::IntrospectionSnapshot;

/// Anything that can hand over a canonical introspection snapshot.
pub trait SnapshotSource {
    /// Short description used in logs (a path, a connection label).
    fn describe(&self) -> String;

    fn load(&self) -> Result<IntrospectionSnapshot>;
}

/// A snapshot serialized as JSON on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    pub path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<IntrospectionSnapshot> {
        IntrospectionSnapshot::from_path(&self.path)
    }
}

/// A snapshot already held in memory.
impl SnapshotSource for IntrospectionSnapshot {
    fn describe(&self) -> String {
        format!("in-memory snapshot ({} tables)", self.tables.len())
    }

    fn load(&self) -> Result<IntrospectionSnapshot> {
        Ok(self.clone())
    }
}
