//! Foreign-key dependency graph and the two table orderings built on it.
//!
//! [`topological_sort`] is the strict check: it fails on any cycle.
//! [`sort_tables_for_insert`] is the heuristic insert order: it never fails and
//! repairs an in-degree ordering locally, relationship by relationship.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constraints::{RelationType, Relationship, RelationshipOrigin};
use crate::error::{Error, Result};
use crate::schema::{TableKey, TableMap};

/// Edges and dependency counts derived from foreign keys.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// `edges[a]` lists the target of every foreign key declared on `a`.
    pub edges: BTreeMap<TableKey, Vec<TableKey>>,
    /// Number of foreign keys each table declares, i.e. how many tables it depends on.
    pub in_degree: BTreeMap<TableKey, usize>,
}

impl DependencyGraph {
    /// Reverse adjacency: for each table, the tables that depend on it.
    pub fn dependents(&self) -> BTreeMap<TableKey, Vec<TableKey>> {
        let mut dependents: BTreeMap<TableKey, Vec<TableKey>> = BTreeMap::new();
        for (source, targets) in &self.edges {
            for target in targets {
                dependents
                    .entry(target.clone())
                    .or_default()
                    .push(source.clone());
            }
        }
        dependents
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}

/// Table order split into insertable base tables and views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertOrder {
    pub base_tables: Vec<TableKey>,
    pub views: Vec<TableKey>,
}

impl InsertOrder {
    pub fn base_table_names(&self) -> Vec<&str> {
        self.base_tables.iter().map(|key| key.name.as_str()).collect()
    }

    pub fn view_names(&self) -> Vec<&str> {
        self.views.iter().map(|key| key.name.as_str()).collect()
    }
}

/// Build the dependency graph: one edge per foreign key whose target is present.
pub fn build_dependency_graph(tables: &TableMap) -> DependencyGraph {
    let mut graph = DependencyGraph::default();

    for (key, table) in tables {
        graph.edges.entry(key.clone()).or_default();
        graph.in_degree.entry(key.clone()).or_insert(0);

        for fk in &table.foreign_keys {
            let target = fk.target_key();
            if !tables.contains_key(&target) {
                debug!(table = %key, target = %target, "skipping edge to unknown table");
                continue;
            }
            graph.edges.entry(key.clone()).or_default().push(target);
            *graph.in_degree.entry(key.clone()).or_insert(0) += 1;
        }
    }

    graph
}

/// Strict Kahn's-algorithm ordering, dependencies first.
///
/// Fails with [`Error::CycleDetected`] when any table cannot be ordered. The
/// reported members are every table still waiting on a dependency, which covers
/// the cycle itself and anything that depends on it.
pub fn topological_sort(tables: &TableMap) -> Result<Vec<TableKey>> {
    let graph = build_dependency_graph(tables);
    let dependents = graph.dependents();
    let mut in_degree = graph.in_degree.clone();

    let mut ready: BTreeSet<TableKey> = in_degree
        .iter()
        .filter_map(|(node, count)| {
            if *count == 0 {
                Some(node.clone())
            } else {
                None
            }
        })
        .collect();

    let mut order = Vec::with_capacity(in_degree.len());

    while let Some(node) = ready.pop_first() {
        if let Some(waiting) = dependents.get(&node) {
            for dependent in waiting {
                if let Some(count) = in_degree.get_mut(dependent) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(dependent.clone());
                    }
                }
            }
        }
        order.push(node);
    }

    if order.len() == in_degree.len() {
        Ok(order)
    } else {
        let members = in_degree
            .into_iter()
            .filter_map(|(node, count)| if count > 0 { Some(node) } else { None })
            .collect();
        Err(Error::CycleDetected {
            members,
            partial_order: order,
        })
    }
}

/// Heuristic insert order; never fails, even on cyclic graphs.
pub fn sort_tables_for_insert(tables: &TableMap) -> InsertOrder {
    let graph = build_dependency_graph(tables);
    let sorted = sort_tables_by_in_degree(&graph);
    let relationships = insert_relationships(tables);
    let repaired = reorganize_tables_by_relationships(sorted, &relationships);
    separate_tables_list_by_type(repaired, tables)
}

/// Order tables by `(in_degree, name, schema)` ascending.
pub fn sort_tables_by_in_degree(graph: &DependencyGraph) -> Vec<TableKey> {
    let mut sorted: Vec<(usize, &TableKey)> = graph
        .in_degree
        .iter()
        .map(|(key, degree)| (*degree, key))
        .collect();
    sorted.sort_by(|left, right| {
        left.0
            .cmp(&right.0)
            .then_with(|| left.1.name.cmp(&right.1.name))
            .then_with(|| left.1.schema.cmp(&right.1.schema))
    });
    sorted.into_iter().map(|(_, key)| key.clone()).collect()
}

/// One relationship per physical foreign key, in map order then declaration order.
///
/// Reciprocal and bridge relationships are left out: they point from a referenced
/// table back at its dependents and would undo the repair.
pub fn insert_relationships(tables: &TableMap) -> Vec<Relationship> {
    tables
        .iter()
        .flat_map(|(key, table)| {
            table.foreign_keys.iter().map(move |fk| Relationship {
                table: key.clone(),
                related_table: fk.target_key(),
                relation_type: fk.relation_type.unwrap_or(RelationType::ManyToOne),
                origin: RelationshipOrigin::ForeignKey {
                    constraint_name: fk.constraint_name.clone(),
                },
            })
        })
        .collect()
}

/// Move each referenced table in front of its dependent table.
///
/// Relationships are applied in the order given and each move can shift tables
/// touched by earlier moves, so the result depends on that order and is not
/// guaranteed to be a topological order. Many-to-many links are ignored.
pub fn reorganize_tables_by_relationships(
    mut sorted: Vec<TableKey>,
    relationships: &[Relationship],
) -> Vec<TableKey> {
    for relationship in relationships {
        if relationship.relation_type == RelationType::ManyToMany {
            continue;
        }

        let dependent = sorted
            .iter()
            .position(|key| key == &relationship.table);
        let related = sorted
            .iter()
            .position(|key| key == &relationship.related_table);

        if let (Some(dependent), Some(related)) = (dependent, related) {
            if related > dependent {
                let moved = sorted.remove(related);
                sorted.insert(dependent, moved);
            }
        }
    }
    sorted
}

/// Partition an ordering into base tables and views, keeping relative order.
pub fn separate_tables_list_by_type(order: Vec<TableKey>, tables: &TableMap) -> InsertOrder {
    let mut result = InsertOrder::default();
    for key in order {
        let is_view = tables.get(&key).is_some_and(|table| table.is_view());
        if is_view {
            result.views.push(key);
        } else {
            result.base_tables.push(key);
        }
    }
    result
}
