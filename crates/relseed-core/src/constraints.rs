use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::TableKey;

/// Kind of a table-level constraint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    Check,
    Exclude,
    ForeignKey,
}

impl ConstraintKind {
    /// Parse a raw constraint type code.
    ///
    /// Accepts the single-letter catalog codes (`p`, `f`, `u`, `c`, `x`) as well as
    /// the `information_schema` spellings (`PRIMARY KEY`, `FOREIGN KEY`, ...).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().replace('_', " ").as_str() {
            "P" | "PRIMARY KEY" | "PRIMARY" => Some(Self::PrimaryKey),
            "F" | "FOREIGN KEY" => Some(Self::ForeignKey),
            "U" | "UNIQUE" => Some(Self::Unique),
            "C" | "CHECK" => Some(Self::Check),
            "X" | "EXCLUDE" => Some(Self::Exclude),
            _ => None,
        }
    }
}

/// Table-level constraint as reported by introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub columns: Vec<String>,
    /// Free-text definition, only consulted for CHECK extraction.
    pub definition: Option<String>,
}

impl Constraint {
    pub fn is_key(&self) -> bool {
        matches!(self.kind, ConstraintKind::PrimaryKey | ConstraintKind::Unique)
    }

    /// True when this is a PRIMARY KEY or UNIQUE constraint over exactly `column`.
    pub fn is_sole_key_on(&self, column: &str) -> bool {
        self.is_key() && self.columns.len() == 1 && self.columns[0] == column
    }
}

/// Cardinality between the two ends of a relationship.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl RelationType {
    /// Cardinality seen from the other end.
    pub fn inverse(self) -> Self {
        match self {
            Self::OneToMany => Self::ManyToOne,
            Self::ManyToOne => Self::OneToMany,
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneToOne => "ONE_TO_ONE",
            Self::OneToMany => "ONE_TO_MANY",
            Self::ManyToOne => "MANY_TO_ONE",
            Self::ManyToMany => "MANY_TO_MANY",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-column foreign key edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub constraint_name: String,
    pub column: String,
    pub target_schema: String,
    pub target_table: String,
    pub target_column: String,
    /// Unset until the inference engine resolves it.
    pub relation_type: Option<RelationType>,
}

impl ForeignKey {
    pub fn target_key(&self) -> TableKey {
        TableKey::new(&self.target_schema, &self.target_table)
    }

    pub fn points_at(&self, key: &TableKey) -> bool {
        self.target_schema == key.schema && self.target_table == key.name
    }
}

/// Where a relationship record came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelationshipOrigin {
    /// A foreign key declared on `table` itself.
    ForeignKey { constraint_name: String },
    /// Mirror of a foreign key declared on the related table.
    Reciprocal { constraint_name: String },
    /// Link implied by a bridge table.
    Bridge { via: TableKey },
}

/// Table-to-table link not tied to a single physical foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub table: TableKey,
    pub related_table: TableKey,
    pub relation_type: RelationType,
    pub origin: RelationshipOrigin,
}

impl Relationship {
    pub fn links(&self, table: &TableKey, related: &TableKey) -> bool {
        &self.table == table && &self.related_table == related
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_and_information_schema_codes() {
        assert_eq!(ConstraintKind::from_code("p"), Some(ConstraintKind::PrimaryKey));
        assert_eq!(
            ConstraintKind::from_code("FOREIGN KEY"),
            Some(ConstraintKind::ForeignKey)
        );
        assert_eq!(ConstraintKind::from_code("unique"), Some(ConstraintKind::Unique));
        assert_eq!(ConstraintKind::from_code("x"), Some(ConstraintKind::Exclude));
        assert_eq!(ConstraintKind::from_code("t"), None);
    }

    #[test]
    fn inverse_swaps_directional_cardinalities() {
        assert_eq!(RelationType::OneToMany.inverse(), RelationType::ManyToOne);
        assert_eq!(RelationType::ManyToOne.inverse(), RelationType::OneToMany);
        assert_eq!(RelationType::OneToOne.inverse(), RelationType::OneToOne);
        assert_eq!(RelationType::ManyToMany.inverse(), RelationType::ManyToMany);
    }
}
