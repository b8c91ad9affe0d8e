use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constraints::{Constraint, ConstraintKind, ForeignKey, Relationship};
use crate::types::{ColumnType, EnumType, IdentityGeneration};

/// Tables under analysis, keyed by `(schema, name)`.
pub type TableMap = BTreeMap<TableKey, Table>;

/// Identity of a table within one analysis set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableKey {
    pub schema: String,
    pub name: String,
}

impl TableKey {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Kind of table represented in the analysis set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableType {
    BaseTable,
    View,
}

impl TableType {
    /// Parse the `table_type` reported by introspection; anything that is not a
    /// view is treated as a base table.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_ascii_uppercase();
        if code == "VIEW" || code == "V" || code.ends_with(" VIEW") {
            Self::View
        } else {
            Self::BaseTable
        }
    }
}

/// A table or view with its columns, constraints, and inferred links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub schema: String,
    pub name: String,
    pub table_type: TableType,
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
    pub constraints: Vec<Constraint>,
    pub relationships: Vec<Relationship>,
    pub is_bridge: bool,
}

impl Table {
    pub fn new(schema: impl Into<String>, name: impl Into<String>, table_type: TableType) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            table_type,
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            constraints: Vec::new(),
            relationships: Vec::new(),
            is_bridge: false,
        }
    }

    pub fn key(&self) -> TableKey {
        TableKey::new(&self.schema, &self.name)
    }

    pub fn is_view(&self) -> bool {
        self.table_type == TableType::View
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|column| column.name == name)
    }

    /// Columns of the PRIMARY KEY constraint; always empty for views.
    pub fn primary_key(&self) -> Vec<&str> {
        if self.is_view() {
            return Vec::new();
        }
        self.constraints
            .iter()
            .find(|constraint| constraint.kind == ConstraintKind::PrimaryKey)
            .map(|constraint| constraint.columns.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Columns covered by the primary key or a unique constraint, in column order.
    pub fn unique_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|column| column.is_primary || column.is_unique)
            .collect()
    }

    /// True when `column` alone forms a PRIMARY KEY or UNIQUE constraint.
    pub fn is_sole_unique(&self, column: &str) -> bool {
        self.constraints
            .iter()
            .any(|constraint| constraint.is_sole_key_on(column))
    }
}

/// Column metadata plus the key flags derived from constraint membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub ordinal_position: i32,
    pub name: String,
    pub column_type: ColumnType,
    pub is_nullable: bool,
    pub has_default: bool,
    pub identity: Option<IdentityGeneration>,
    pub is_generated: bool,
    pub is_primary: bool,
    pub is_unique: bool,
    pub is_foreign_key: bool,
    pub enum_type: Option<EnumType>,
    /// Values permitted by a CHECK constraint such as `status IN ('a', 'b')`.
    pub allowed_values: Option<Vec<String>>,
    /// Tightest known length limit (declared length or CHECK-derived).
    pub max_length: Option<u32>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            ordinal_position: 0,
            name: name.into(),
            column_type,
            is_nullable: true,
            has_default: false,
            identity: None,
            is_generated: false,
            is_primary: false,
            is_unique: false,
            is_foreign_key: false,
            enum_type: None,
            allowed_values: None,
            max_length: None,
        }
    }

    pub fn is_key(&self) -> bool {
        self.is_primary || self.is_unique || self.is_foreign_key
    }
}
