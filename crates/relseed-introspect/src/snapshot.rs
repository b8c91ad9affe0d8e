use std::fmt;
use std::path::Path;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::IntrospectError;

/// Database engine the snapshot was captured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Postgres,
    Mysql,
}

impl Engine {
    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Postgres => "postgres",
            Engine::Mysql => "mysql",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = IntrospectError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Engine::Postgres),
            "mysql" | "mariadb" => Ok(Engine::Mysql),
            other => Err(IntrospectError::UnknownEngine(other.to_string())),
        }
    }
}

/// Canonical introspection rows, independent of the engine that produced them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct IntrospectionSnapshot {
    /// Engine that produced the rows; callers supply a default when absent.
    #[serde(default)]
    pub engine: Option<Engine>,
    #[serde(default)]
    pub tables: Vec<RawTable>,
    #[serde(default)]
    pub columns: Vec<RawColumn>,
    #[serde(default)]
    pub constraints: Vec<RawConstraint>,
    #[serde(default)]
    pub foreign_keys: Vec<RawForeignKey>,
    #[serde(default)]
    pub enums: Vec<RawEnumType>,
    #[serde(default)]
    pub enum_columns: Vec<RawEnumColumn>,
}

impl IntrospectionSnapshot {
    pub fn from_json_str(contents: &str) -> Result<Self, IntrospectError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, IntrospectError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

/// A table or view.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawTable {
    pub schema: String,
    pub name: String,
    /// `BASE TABLE` or `VIEW`.
    #[serde(default = "default_table_type")]
    pub table_type: String,
}

/// A column of a table or view.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawColumn {
    pub schema: String,
    pub table: String,
    pub name: String,
    #[serde(default)]
    pub ordinal_position: i32,
    /// Declared type. For MySQL this is the full column type, e.g. `enum('a','b')`.
    pub data_type: String,
    /// Underlying type name, e.g. `_int4` or `mood` for Postgres.
    #[serde(default)]
    pub udt_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_nullable: bool,
    #[serde(default)]
    pub column_default: Option<String>,
    /// `ALWAYS`, `BY DEFAULT`, or absent.
    #[serde(default)]
    pub identity_generation: Option<String>,
    #[serde(default)]
    pub is_generated: bool,
    #[serde(default)]
    pub character_max_length: Option<i32>,
    #[serde(default)]
    pub numeric_precision: Option<i32>,
    #[serde(default)]
    pub numeric_scale: Option<i32>,
}

/// A table constraint; rows sharing a name on the same table are merged.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawConstraint {
    pub schema: String,
    pub table: String,
    pub name: String,
    /// Type code: `p`, `f`, `u`, `c`, `x` or the `information_schema` spelling.
    pub constraint_type: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub definition: Option<String>,
}

/// One column pair of a foreign key.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawForeignKey {
    pub schema: String,
    pub table: String,
    pub constraint_name: String,
    pub column: String,
    pub foreign_schema: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

/// A named enumerated type.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawEnumType {
    pub schema: String,
    pub name: String,
    pub labels: Vec<String>,
}

/// Explicit mapping of a column to an enumerated type.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawEnumColumn {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub enum_schema: String,
    pub enum_name: String,
}

fn default_table_type() -> String {
    "BASE TABLE".to_string()
}

fn default_true() -> bool {
    true
}
