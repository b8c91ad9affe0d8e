//! Cardinality inference for foreign keys and bridge-table detection.
//!
//! Inference runs as a bounded fixed point: the whole table map is swept
//! [`INFERENCE_SWEEPS`] times. Each sweep first reads the map to compute forward
//! cardinalities and the reciprocal links the target tables are missing, then
//! applies both. The first sweep resolves every edge and queues reciprocals; the
//! second re-reads the map with those reciprocals visible and settles
//! self-referential edges on the type recorded by the first.

use std::collections::BTreeSet;

use tracing::debug;

use crate::constraints::{ForeignKey, RelationType, Relationship, RelationshipOrigin};
use crate::schema::{Table, TableKey, TableMap};

/// Number of full inference sweeps per construction call.
pub const INFERENCE_SWEEPS: usize = 2;

/// Cardinality of the foreign key `source_table.source_col -> target_table.target_col`.
///
/// A column only counts as unique when it is the sole column of a PRIMARY KEY or
/// UNIQUE constraint; membership in a composite key leaves it on the many side.
pub fn determine_relationship_type(
    source_table: &Table,
    target_table: &Table,
    source_col: &str,
    target_col: &str,
) -> RelationType {
    let source_unique = source_table.is_sole_unique(source_col);
    let target_unique = target_table.is_sole_unique(target_col);

    match (source_unique, target_unique) {
        (true, true) => RelationType::OneToOne,
        (false, true) => RelationType::ManyToOne,
        (true, false) => RelationType::OneToMany,
        (false, false) => RelationType::ManyToMany,
    }
}

/// Resolve `relation_type` on every foreign key and synthesize reciprocal links.
pub fn infer_relationships(tables: &mut TableMap) {
    for sweep in 1..=INFERENCE_SWEEPS {
        let plan = plan_sweep(tables);
        debug!(
            sweep,
            resolved = plan.resolved.len(),
            reciprocals = plan.reciprocals.len(),
            "relationship sweep"
        );
        apply_sweep(tables, plan);
    }
}

#[derive(Debug, Default)]
struct SweepPlan {
    resolved: Vec<(TableKey, usize, RelationType)>,
    reciprocals: Vec<Relationship>,
}

fn plan_sweep(tables: &TableMap) -> SweepPlan {
    let mut plan = SweepPlan::default();

    for (key, table) in tables {
        for (index, fk) in table.foreign_keys.iter().enumerate() {
            let target_key = fk.target_key();
            let Some(target) = tables.get(&target_key) else {
                continue;
            };

            let relation_type = if &target_key == key {
                fk.relation_type.unwrap_or_else(|| {
                    determine_relationship_type(table, target, &fk.column, &fk.target_column)
                })
            } else {
                determine_relationship_type(table, target, &fk.column, &fk.target_column)
            };
            plan.resolved.push((key.clone(), index, relation_type));

            if !has_mirror(target, key) {
                plan.reciprocals.push(Relationship {
                    table: target_key,
                    related_table: key.clone(),
                    relation_type: relation_type.inverse(),
                    origin: RelationshipOrigin::Reciprocal {
                        constraint_name: fk.constraint_name.clone(),
                    },
                });
            }
        }
    }

    plan
}

fn apply_sweep(tables: &mut TableMap, plan: SweepPlan) {
    for (key, index, relation_type) in plan.resolved {
        if let Some(fk) = tables
            .get_mut(&key)
            .and_then(|table| table.foreign_keys.get_mut(index))
        {
            fk.relation_type = Some(relation_type);
        }
    }

    for reciprocal in plan.reciprocals {
        let Some(target) = tables.get_mut(&reciprocal.table) else {
            continue;
        };
        // Several foreign keys may have queued a mirror for the same pair.
        if has_mirror(target, &reciprocal.related_table) {
            continue;
        }
        target.relationships.push(reciprocal);
    }
}

/// Whether `table` already links back to `other` through a foreign key or relationship.
fn has_mirror(table: &Table, other: &TableKey) -> bool {
    table.foreign_keys.iter().any(|fk| fk.points_at(other))
        || table
            .relationships
            .iter()
            .any(|relationship| &relationship.related_table == other)
}

/// A bridge table has at least two foreign keys and a primary key made up
/// entirely of two or more foreign-key columns.
pub fn is_bridge_table(table: &Table) -> bool {
    if table.foreign_keys.len() < 2 {
        return false;
    }

    let primary_key: BTreeSet<&str> = table.primary_key().into_iter().collect();
    let fk_columns: BTreeSet<&str> = table
        .foreign_keys
        .iter()
        .map(|fk| fk.column.as_str())
        .collect();
    let dual_role: BTreeSet<&str> = primary_key.intersection(&fk_columns).copied().collect();

    dual_role.len() >= 2 && dual_role == primary_key
}

/// Mark bridge tables, force their foreign keys to many-to-many, and link every
/// pair of tables they connect.
pub fn analyze_bridge_tables(tables: &mut TableMap) {
    let bridges: Vec<TableKey> = tables
        .values()
        .filter(|table| is_bridge_table(table))
        .map(Table::key)
        .collect();

    for bridge_key in bridges {
        let Some(bridge) = tables.get_mut(&bridge_key) else {
            continue;
        };
        bridge.is_bridge = true;
        for fk in &mut bridge.foreign_keys {
            fk.relation_type = Some(RelationType::ManyToMany);
        }
        // Distinct targets only: two keys into the same table link nothing.
        let members: BTreeSet<TableKey> = bridge
            .foreign_keys
            .iter()
            .map(ForeignKey::target_key)
            .collect();
        let members: Vec<TableKey> = members.into_iter().collect();

        debug!(bridge = %bridge_key, members = members.len(), "bridge table detected");

        for (index, left) in members.iter().enumerate() {
            for right in &members[index + 1..] {
                link_many_to_many(tables, left, right, &bridge_key);
                link_many_to_many(tables, right, left, &bridge_key);
            }
        }
    }
}

/// Record `table -> related` as many-to-many through `via`, rewriting any
/// relationship already kept for that pair.
fn link_many_to_many(tables: &mut TableMap, table: &TableKey, related: &TableKey, via: &TableKey) {
    let Some(entry) = tables.get_mut(table) else {
        return;
    };

    let mut linked = false;
    entry.relationships.retain_mut(|relationship| {
        if !relationship.links(table, related) {
            return true;
        }
        if linked {
            return false;
        }
        relationship.relation_type = RelationType::ManyToMany;
        relationship.origin = RelationshipOrigin::Bridge { via: via.clone() };
        linked = true;
        true
    });
    if linked {
        return;
    }

    entry.relationships.push(Relationship {
        table: table.clone(),
        related_table: related.clone(),
        relation_type: RelationType::ManyToMany,
        origin: RelationshipOrigin::Bridge { via: via.clone() },
    });
}
