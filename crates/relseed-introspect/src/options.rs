use crate::snapshot::Engine;

/// Options that control how snapshot rows become tables.
#[derive(Debug, Clone)]
pub struct MarshalOptions {
    /// Engine assumed when the snapshot does not name one.
    pub engine: Engine,
    pub include_views: bool,
    /// Restrict analysis to these schemas.
    pub schemas: Option<Vec<String>>,
}

impl Default for MarshalOptions {
    fn default() -> Self {
        Self {
            engine: Engine::Postgres,
            include_views: true,
            schemas: None,
        }
    }
}

impl MarshalOptions {
    pub fn includes_schema(&self, schema: &str) -> bool {
        match &self.schemas {
            Some(list) => list.iter().any(|item| item == schema),
            None => true,
        }
    }
}
