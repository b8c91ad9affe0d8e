use serde::{Deserialize, Serialize};

/// Source and normalized type metadata for a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnType {
    /// Type as reported by the introspection layer (e.g. `character varying(255)`).
    pub data_type: String,
    /// Engine-independent type name (e.g. `character varying`, `ARRAY`, `mood`).
    pub native_type: String,
    /// Element type for array columns.
    pub element_type: Option<String>,
    pub character_max_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
}

impl ColumnType {
    /// Build a type whose source and normalized names are identical.
    pub fn plain(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            data_type: name.clone(),
            native_type: name,
            element_type: None,
            character_max_length: None,
            numeric_precision: None,
            numeric_scale: None,
        }
    }

    pub fn is_array(&self) -> bool {
        self.element_type.is_some() || self.native_type == "ARRAY"
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.native_type.as_str(), "boolean" | "bool")
    }

    /// Temporal family of the column, if any.
    pub fn temporal_kind(&self) -> Option<TemporalKind> {
        let name = self.native_type.as_str();
        if name.starts_with("timestamp") || name == "datetime" {
            Some(TemporalKind::Timestamp)
        } else if name == "date" {
            Some(TemporalKind::Date)
        } else if name.starts_with("time") {
            Some(TemporalKind::Time)
        } else {
            None
        }
    }
}

/// Temporal families recognized by the seed generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalKind {
    Date,
    Time,
    Timestamp,
}

/// Identity generation strategy for columns using `GENERATED ... AS IDENTITY`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdentityGeneration {
    Always,
    ByDefault,
}

/// Enumerated type attached to a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    pub schema: String,
    pub name: String,
    pub labels: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporal_kind_covers_engine_spellings() {
        assert_eq!(
            ColumnType::plain("timestamp with time zone").temporal_kind(),
            Some(TemporalKind::Timestamp)
        );
        assert_eq!(
            ColumnType::plain("datetime").temporal_kind(),
            Some(TemporalKind::Timestamp)
        );
        assert_eq!(ColumnType::plain("date").temporal_kind(), Some(TemporalKind::Date));
        assert_eq!(
            ColumnType::plain("time without time zone").temporal_kind(),
            Some(TemporalKind::Time)
        );
        assert_eq!(ColumnType::plain("text").temporal_kind(), None);
    }
}
