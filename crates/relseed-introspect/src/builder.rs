use relseed_core::{
    DependencyGraph, InsertOrder, Result as CoreResult, Table, TableKey, TableMap,
    analyze_bridge_tables, build_dependency_graph, infer_relationships, sort_tables_for_insert,
    topological_sort,
};
use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::error::Result;
use crate::mapper::marshal;
use crate::options::MarshalOptions;
use crate::snapshot::IntrospectionSnapshot;

/// Owns the table map for one construction call and runs the analysis stages
/// over it in order: relationship inference, bridge detection, insert ordering.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    tables: TableMap,
}

impl SchemaBuilder {
    pub fn new(tables: TableMap) -> Self {
        Self { tables }
    }

    pub fn from_snapshot(snapshot: &IntrospectionSnapshot, opts: &MarshalOptions) -> Result<Self> {
        Ok(Self::new(marshal(snapshot, opts)?))
    }

    pub fn tables(&self) -> &TableMap {
        &self.tables
    }

    pub fn build(mut self) -> SchemaGraph {
        infer_relationships(&mut self.tables);
        analyze_bridge_tables(&mut self.tables);
        let insert_order = sort_tables_for_insert(&self.tables);

        info!(
            tables = self.tables.len(),
            bridges = self.tables.values().filter(|table| table.is_bridge).count(),
            base_tables = insert_order.base_tables.len(),
            views = insert_order.views.len(),
            "schema graph built"
        );

        SchemaGraph {
            tables: self.tables,
            insert_order,
        }
    }
}

/// Finalized tables plus the heuristic insert order.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaGraph {
    #[serde(serialize_with = "tables_as_list")]
    pub tables: TableMap,
    pub insert_order: InsertOrder,
}

impl SchemaGraph {
    pub fn table(&self, key: &TableKey) -> Option<&Table> {
        self.tables.get(key)
    }

    /// Tables in map order, as handed to downstream consumers.
    pub fn table_list(&self) -> Vec<&Table> {
        self.tables.values().collect()
    }

    pub fn dependency_graph(&self) -> DependencyGraph {
        build_dependency_graph(&self.tables)
    }

    /// Strict order; fails when the foreign keys form a cycle.
    pub fn topological_order(&self) -> CoreResult<Vec<TableKey>> {
        let order = topological_sort(&self.tables)?;
        debug!(tables = order.len(), "strict order computed");
        Ok(order)
    }
}

fn tables_as_list<S: Serializer>(tables: &TableMap, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(tables.values())
}

/// Marshal a snapshot and run every analysis stage over it.
pub fn build_schema(snapshot: &IntrospectionSnapshot, opts: &MarshalOptions) -> Result<SchemaGraph> {
    Ok(SchemaBuilder::from_snapshot(snapshot, opts)?.build())
}
