use chrono::NaiveDate;
use rand::Rng;
use rand::seq::IndexedRandom;
use relseed_core::Column;

use crate::value::SeedValue;

pub mod primitives;
pub mod semantic;

pub use primitives::fallback_for_type;
pub use semantic::NamePattern;

/// Values a column may take when that list is known up front: enum labels,
/// CHECK-allowed values, or the two booleans.
pub fn enumerable_domain(column: &Column) -> Option<Vec<SeedValue>> {
    if let Some(enum_type) = &column.enum_type {
        return Some(
            enum_type
                .labels
                .iter()
                .map(|label| SeedValue::Text(label.clone()))
                .collect(),
        );
    }
    if let Some(values) = &column.allowed_values {
        return Some(values.iter().map(|raw| typed_literal(column, raw)).collect());
    }
    if column.column_type.is_boolean() {
        return Some(vec![SeedValue::Bool(true), SeedValue::Bool(false)]);
    }
    None
}

/// Interpret a CHECK literal in the column's type where that is unambiguous.
fn typed_literal(column: &Column, raw: &str) -> SeedValue {
    let native = column.column_type.native_type.as_str();
    let integer = matches!(
        native,
        "smallint" | "integer" | "int" | "bigint" | "tinyint" | "mediumint"
    );
    if integer {
        if let Ok(value) = raw.parse::<i64>() {
            return SeedValue::Int(value);
        }
    }
    if matches!(native, "real" | "double precision" | "double" | "float") {
        if let Ok(value) = raw.parse::<f64>() {
            return SeedValue::Float(value);
        }
    }
    SeedValue::Text(raw.to_string())
}

/// Produces values for columns that are neither keys nor foreign keys.
#[derive(Debug, Clone)]
pub struct ValueGenerator {
    base_date: NaiveDate,
}

impl Default for ValueGenerator {
    fn default() -> Self {
        Self::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default())
    }
}

impl ValueGenerator {
    pub fn new(base_date: NaiveDate) -> Self {
        Self { base_date }
    }

    pub fn base_date(&self) -> NaiveDate {
        self.base_date
    }

    /// Value lists first, then name patterns, then the column type.
    pub fn generate<R: Rng>(&self, column: &Column, rng: &mut R) -> SeedValue {
        if let Some(domain) = enumerable_domain(column) {
            if let Some(value) = domain.choose(rng) {
                return value.clone();
            }
        }
        if let Some(pattern) = NamePattern::detect(column) {
            return pattern.generate(column, self.base_date, rng);
        }
        fallback_for_type(column, self.base_date, rng)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use relseed_core::{ColumnType, EnumType};

    use super::*;

    #[test]
    fn domains_come_from_enums_checks_and_booleans() {
        let mut mood = Column::new("mood", ColumnType::plain("mood"));
        mood.enum_type = Some(EnumType {
            schema: "public".to_string(),
            name: "mood".to_string(),
            labels: vec!["happy".to_string(), "sad".to_string()],
        });
        assert_eq!(enumerable_domain(&mood).map(|d| d.len()), Some(2));

        let mut priority = Column::new("priority", ColumnType::plain("integer"));
        priority.allowed_values = Some(vec!["1".to_string(), "2".to_string(), "3".to_string()]);
        assert_eq!(
            enumerable_domain(&priority),
            Some(vec![SeedValue::Int(1), SeedValue::Int(2), SeedValue::Int(3)])
        );

        let active = Column::new("active", ColumnType::plain("boolean"));
        assert_eq!(enumerable_domain(&active).map(|d| d.len()), Some(2));

        let free = Column::new("notes", ColumnType::plain("text"));
        assert_eq!(enumerable_domain(&free), None);
    }

    #[test]
    fn allowed_values_take_precedence_over_patterns() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut status = Column::new("email_status", ColumnType::plain("text"));
        status.allowed_values = Some(vec!["sent".to_string(), "bounced".to_string()]);

        let generator = ValueGenerator::default();
        for _ in 0..10 {
            let value = generator.generate(&status, &mut rng);
            assert!(matches!(
                value,
                SeedValue::Text(ref text) if text == "sent" || text == "bounced"
            ));
        }
    }
}
