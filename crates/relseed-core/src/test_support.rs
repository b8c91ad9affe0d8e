//! Table builders shared by the unit tests.

use crate::constraints::{Constraint, ConstraintKind, ForeignKey};
use crate::schema::{Column, Table, TableKey, TableMap, TableType};
use crate::types::ColumnType;

pub fn key(name: &str) -> TableKey {
    TableKey::new("public", name)
}

pub fn table(name: &str, columns: &[&str]) -> Table {
    let mut table = Table::new("public", name, TableType::BaseTable);
    for (index, column) in columns.iter().enumerate() {
        let mut column = Column::new(*column, ColumnType::plain("integer"));
        column.ordinal_position = index as i32 + 1;
        table.columns.push(column);
    }
    table
}

pub fn view(name: &str) -> Table {
    Table::new("public", name, TableType::View)
}

pub fn with_pk(mut table: Table, columns: &[&str]) -> Table {
    for column in columns {
        if let Some(column) = table.column_mut(column) {
            column.is_primary = true;
            column.is_nullable = false;
        }
    }
    table.constraints.push(Constraint {
        name: format!("{}_pkey", table.name),
        kind: ConstraintKind::PrimaryKey,
        columns: columns.iter().map(|column| column.to_string()).collect(),
        definition: None,
    });
    table
}

pub fn with_unique(mut table: Table, columns: &[&str]) -> Table {
    for column in columns {
        if let Some(column) = table.column_mut(column) {
            column.is_unique = true;
        }
    }
    table.constraints.push(Constraint {
        name: format!("{}_{}_key", table.name, columns.join("_")),
        kind: ConstraintKind::Unique,
        columns: columns.iter().map(|column| column.to_string()).collect(),
        definition: None,
    });
    table
}

pub fn foreign_key(mut table: Table, column: &str, target: &str, target_column: &str) -> Table {
    if let Some(entry) = table.column_mut(column) {
        entry.is_foreign_key = true;
    }
    let constraint_name = format!("{}_{}_fkey", table.name, column);
    table.constraints.push(Constraint {
        name: constraint_name.clone(),
        kind: ConstraintKind::ForeignKey,
        columns: vec![column.to_string()],
        definition: None,
    });
    table.foreign_keys.push(ForeignKey {
        constraint_name,
        column: column.to_string(),
        target_schema: "public".to_string(),
        target_table: target.to_string(),
        target_column: target_column.to_string(),
        relation_type: None,
    });
    table
}

pub fn map(tables: Vec<Table>) -> TableMap {
    tables
        .into_iter()
        .map(|table| (table.key(), table))
        .collect()
}
