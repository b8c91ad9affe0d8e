use std::collections::{BTreeMap, BTreeSet};

use relseed_core::{
    Column, ColumnType, Constraint, ConstraintKind, EnumType, Error, ForeignKey,
    IdentityGeneration, Table, TableKey, TableMap, TableType,
};
use tracing::{debug, warn};

use crate::checks::{extract_allowed_values, extract_length_limit};
use crate::error::Result;
use crate::options::MarshalOptions;
use crate::snapshot::{
    Engine, IntrospectionSnapshot, RawColumn, RawConstraint, RawEnumColumn, RawForeignKey,
};
use crate::types::normalize_type_name;

/// Turn snapshot rows into a table map with key flags, enums, and CHECK limits applied.
///
/// The snapshot's own engine wins over `opts.engine`.
pub fn marshal(snapshot: &IntrospectionSnapshot, opts: &MarshalOptions) -> Result<TableMap> {
    validate_names(snapshot)?;
    let engine = snapshot.engine.unwrap_or(opts.engine);
    let mut tables = TableMap::new();
    let mut skipped = BTreeSet::new();

    for raw in &snapshot.tables {
        let key = TableKey::new(&raw.schema, &raw.name);
        let table_type = TableType::from_code(&raw.table_type);
        if !opts.includes_schema(&raw.schema)
            || (table_type == TableType::View && !opts.include_views)
        {
            skipped.insert(key);
            continue;
        }
        tables
            .entry(key)
            .or_insert_with(|| Table::new(&raw.schema, &raw.name, table_type));
    }

    let enums = EnumIndex::new(snapshot);
    map_columns(&mut tables, &skipped, &snapshot.columns, engine, &enums, opts);
    map_enum_columns(&mut tables, &snapshot.enum_columns, &enums);
    map_constraints(&mut tables, &snapshot.constraints);
    map_foreign_keys(&mut tables, &snapshot.foreign_keys);
    drop_dangling_foreign_keys(&mut tables);

    for table in tables.values_mut() {
        derive_key_flags(table);
        apply_check_constraints(table);
    }

    debug!(tables = tables.len(), engine = %engine, "marshaled snapshot");
    Ok(tables)
}

fn validate_names(snapshot: &IntrospectionSnapshot) -> Result<()> {
    let blank_table = snapshot
        .tables
        .iter()
        .map(|raw| (&raw.schema, &raw.name))
        .chain(snapshot.columns.iter().map(|raw| (&raw.schema, &raw.table)))
        .find(|(schema, name)| schema.trim().is_empty() || name.trim().is_empty());
    if let Some((schema, name)) = blank_table {
        return Err(Error::InvalidSchema(format!(
            "table identity must have a schema and a name (got '{schema}.{name}')"
        ))
        .into());
    }
    if let Some(col) = snapshot.columns.iter().find(|col| col.name.trim().is_empty()) {
        return Err(Error::InvalidSchema(format!(
            "column of {}.{} has an empty name",
            col.schema, col.table
        ))
        .into());
    }
    Ok(())
}

fn map_columns(
    tables: &mut TableMap,
    skipped: &BTreeSet<TableKey>,
    raw: &[RawColumn],
    engine: Engine,
    enums: &EnumIndex,
    opts: &MarshalOptions,
) {
    for col in raw {
        let key = TableKey::new(&col.schema, &col.table);
        if skipped.contains(&key) || !opts.includes_schema(&col.schema) {
            continue;
        }
        let table = tables
            .entry(key)
            .or_insert_with(|| Table::new(&col.schema, &col.table, TableType::BaseTable));
        if table.column(&col.name).is_some() {
            debug!(table = %table.key(), column = %col.name, "duplicate column row");
            continue;
        }

        let source = match engine {
            Engine::Postgres if is_udt_placeholder(&col.data_type) => {
                col.udt_name.as_deref().unwrap_or(&col.data_type)
            }
            _ => col.data_type.as_str(),
        };
        let normalized = normalize_type_name(engine, source);

        let enum_type = match &normalized.inline_labels {
            Some(labels) => Some(EnumType {
                schema: col.schema.clone(),
                name: format!("{}_{}", col.table, col.name),
                labels: labels.clone(),
            }),
            None if normalized.element_type.is_none() => enums
                .lookup(
                    normalized.qualifier.as_deref().unwrap_or(&col.schema),
                    &normalized.name,
                )
                .cloned(),
            None => None,
        };

        let mut column = Column::new(
            &col.name,
            ColumnType {
                data_type: col.data_type.clone(),
                native_type: normalized.name,
                element_type: normalized.element_type,
                character_max_length: col.character_max_length,
                numeric_precision: col.numeric_precision,
                numeric_scale: col.numeric_scale,
            },
        );
        column.ordinal_position = col.ordinal_position;
        column.is_nullable = col.is_nullable;
        column.has_default = col.column_default.is_some();
        column.identity = identity_from_text(col.identity_generation.as_deref());
        column.is_generated = col.is_generated;
        column.enum_type = enum_type;
        column.max_length = col
            .character_max_length
            .and_then(|len| u32::try_from(len).ok())
            .filter(|len| *len > 0);
        table.columns.push(column);
    }

    for table in tables.values_mut() {
        table.columns.sort_by_key(|column| column.ordinal_position);
    }
}

fn is_udt_placeholder(data_type: &str) -> bool {
    matches!(
        data_type.trim().to_ascii_uppercase().as_str(),
        "USER-DEFINED" | "ARRAY"
    )
}

fn identity_from_text(value: Option<&str>) -> Option<IdentityGeneration> {
    match value?.trim().to_ascii_uppercase().as_str() {
        "ALWAYS" | "A" => Some(IdentityGeneration::Always),
        "BY DEFAULT" | "D" => Some(IdentityGeneration::ByDefault),
        _ => None,
    }
}

fn map_enum_columns(tables: &mut TableMap, raw: &[RawEnumColumn], enums: &EnumIndex) {
    for mapping in raw {
        let Some(enum_type) = enums.lookup(&mapping.enum_schema, &mapping.enum_name) else {
            warn!(
                enum_type = %format!("{}.{}", mapping.enum_schema, mapping.enum_name),
                "enum mapping references unknown type"
            );
            continue;
        };
        let column = tables
            .get_mut(&TableKey::new(&mapping.schema, &mapping.table))
            .and_then(|table| table.column_mut(&mapping.column));
        if let Some(column) = column {
            column.enum_type = Some(enum_type.clone());
        }
    }
}

fn map_constraints(tables: &mut TableMap, raw: &[RawConstraint]) {
    for rc in raw {
        let Some(kind) = ConstraintKind::from_code(&rc.constraint_type) else {
            warn!(
                constraint = %rc.name,
                code = %rc.constraint_type,
                "skipping constraint with unknown type code"
            );
            continue;
        };
        let Some(table) = tables.get_mut(&TableKey::new(&rc.schema, &rc.table)) else {
            continue;
        };

        match table
            .constraints
            .iter_mut()
            .find(|existing| existing.name == rc.name && existing.kind == kind)
        {
            Some(existing) => {
                for column in &rc.columns {
                    if !existing.columns.contains(column) {
                        existing.columns.push(column.clone());
                    }
                }
                if existing.definition.is_none() {
                    existing.definition = rc.definition.clone();
                }
            }
            None => table.constraints.push(Constraint {
                name: rc.name.clone(),
                kind,
                columns: rc.columns.clone(),
                definition: rc.definition.clone(),
            }),
        }
    }

    for table in tables.values_mut() {
        sort_constraints(&mut table.constraints);
    }
}

fn map_foreign_keys(tables: &mut TableMap, raw: &[RawForeignKey]) {
    for fk in raw {
        let Some(table) = tables.get_mut(&TableKey::new(&fk.schema, &fk.table)) else {
            continue;
        };
        let duplicate = table.foreign_keys.iter().any(|existing| {
            existing.constraint_name == fk.constraint_name && existing.column == fk.column
        });
        if duplicate {
            continue;
        }

        table.foreign_keys.push(ForeignKey {
            constraint_name: fk.constraint_name.clone(),
            column: fk.column.clone(),
            target_schema: fk.foreign_schema.clone(),
            target_table: fk.foreign_table.clone(),
            target_column: fk.foreign_column.clone(),
            relation_type: None,
        });

        match table.constraints.iter_mut().find(|constraint| {
            constraint.kind == ConstraintKind::ForeignKey && constraint.name == fk.constraint_name
        }) {
            Some(constraint) => {
                if !constraint.columns.contains(&fk.column) {
                    constraint.columns.push(fk.column.clone());
                }
            }
            None => table.constraints.push(Constraint {
                name: fk.constraint_name.clone(),
                kind: ConstraintKind::ForeignKey,
                columns: vec![fk.column.clone()],
                definition: None,
            }),
        }
    }
}

/// Remove foreign keys whose target table is outside the analysis set.
fn drop_dangling_foreign_keys(tables: &mut TableMap) {
    let known: BTreeSet<TableKey> = tables.keys().cloned().collect();
    for (key, table) in tables.iter_mut() {
        table.foreign_keys.retain(|fk| {
            let keep = known.contains(&fk.target_key());
            if !keep {
                warn!(
                    table = %key,
                    constraint = %fk.constraint_name,
                    target = %fk.target_key(),
                    "dropping foreign key to table outside the analysis set"
                );
            }
            keep
        });
    }
}

fn derive_key_flags(table: &mut Table) {
    let primary: BTreeSet<String> = table
        .primary_key()
        .into_iter()
        .map(str::to_string)
        .collect();
    let unique: BTreeSet<String> = table
        .constraints
        .iter()
        .filter(|constraint| constraint.kind == ConstraintKind::Unique)
        .flat_map(|constraint| constraint.columns.iter().cloned())
        .collect();
    let foreign: BTreeSet<String> = table
        .foreign_keys
        .iter()
        .map(|fk| fk.column.clone())
        .collect();
    let is_view = table.is_view();

    for column in &mut table.columns {
        column.is_primary = primary.contains(&column.name);
        column.is_unique = !is_view && unique.contains(&column.name);
        column.is_foreign_key = foreign.contains(&column.name);
    }
}

fn apply_check_constraints(table: &mut Table) {
    let checks: Vec<(Vec<String>, String)> = table
        .constraints
        .iter()
        .filter(|constraint| constraint.kind == ConstraintKind::Check)
        .filter_map(|constraint| {
            constraint
                .definition
                .clone()
                .map(|definition| (constraint.columns.clone(), definition))
        })
        .collect();

    for (columns, definition) in checks {
        for column in &mut table.columns {
            if !columns.is_empty() && !columns.contains(&column.name) {
                continue;
            }
            if let Some(limit) = extract_length_limit(&definition, &column.name) {
                column.max_length = Some(column.max_length.map_or(limit, |len| len.min(limit)));
            }
            if column.allowed_values.is_none() {
                column.allowed_values = extract_allowed_values(&definition, &column.name);
            }
        }
    }
}

pub fn sort_constraints(constraints: &mut [Constraint]) {
    constraints.sort_by(|left, right| {
        left.kind
            .cmp(&right.kind)
            .then_with(|| left.name.cmp(&right.name))
    });
}

/// Enum types by `(schema, name)`, with a bare-name fallback.
struct EnumIndex {
    qualified: BTreeMap<(String, String), EnumType>,
    by_name: BTreeMap<String, EnumType>,
}

impl EnumIndex {
    fn new(snapshot: &IntrospectionSnapshot) -> Self {
        let mut qualified = BTreeMap::new();
        let mut by_name = BTreeMap::new();
        for raw in &snapshot.enums {
            let enum_type = EnumType {
                schema: raw.schema.clone(),
                name: raw.name.clone(),
                labels: raw.labels.clone(),
            };
            by_name
                .entry(raw.name.clone())
                .or_insert_with(|| enum_type.clone());
            qualified.insert((raw.schema.clone(), raw.name.clone()), enum_type);
        }
        Self { qualified, by_name }
    }

    fn lookup(&self, schema: &str, name: &str) -> Option<&EnumType> {
        self.qualified
            .get(&(schema.to_string(), name.to_string()))
            .or_else(|| self.by_name.get(name))
    }
}
