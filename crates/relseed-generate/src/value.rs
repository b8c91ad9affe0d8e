use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Generated value for a column.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Fixed-point number printed with the given number of decimals.
    Decimal(f64, u32),
    Text(String),
    Uuid(String),
    Json(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Array(Vec<SeedValue>),
}

impl SeedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SeedValue::Null)
    }

    /// Render as a literal ready to splice into an `INSERT` statement.
    pub fn to_sql_literal(&self) -> String {
        match self {
            SeedValue::Null => "NULL".to_string(),
            SeedValue::Bool(value) => value.to_string(),
            SeedValue::Int(value) => value.to_string(),
            SeedValue::Float(value) => value.to_string(),
            SeedValue::Decimal(value, scale) => format!("{value:.prec$}", prec = *scale as usize),
            SeedValue::Text(value) | SeedValue::Uuid(value) | SeedValue::Json(value) => {
                quote(value)
            }
            SeedValue::Date(value) => quote(&value.format("%Y-%m-%d").to_string()),
            SeedValue::Time(value) => quote(&value.format("%H:%M:%S").to_string()),
            SeedValue::Timestamp(value) => quote(&value.format("%Y-%m-%d %H:%M:%S").to_string()),
            SeedValue::Array(items) => {
                let items: Vec<String> = items.iter().map(SeedValue::to_sql_literal).collect();
                format!("ARRAY[{}]", items.join(", "))
            }
        }
    }

    /// Identity used when de-duplicating rows.
    pub fn value_key(&self) -> String {
        match self {
            SeedValue::Null => "<null>".to_string(),
            other => other.to_sql_literal(),
        }
    }

    /// Point in time used to order temporal values of one kind.
    pub fn chronological_key(&self) -> Option<NaiveDateTime> {
        match self {
            SeedValue::Date(value) => Some(value.and_time(NaiveTime::MIN)),
            SeedValue::Time(value) => Some(NaiveDate::MIN.and_time(*value)),
            SeedValue::Timestamp(value) => Some(*value),
            _ => None,
        }
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_follow_sql_quoting() {
        assert_eq!(SeedValue::Null.to_sql_literal(), "NULL");
        assert_eq!(SeedValue::Bool(true).to_sql_literal(), "true");
        assert_eq!(SeedValue::Int(-42).to_sql_literal(), "-42");
        assert_eq!(SeedValue::Decimal(12.5, 2).to_sql_literal(), "12.50");
        assert_eq!(
            SeedValue::Text("O'Brien".to_string()).to_sql_literal(),
            "'O''Brien'"
        );
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap_or_default();
        assert_eq!(SeedValue::Date(date).to_sql_literal(), "'2024-02-29'");
        let stamp = date.and_hms_opt(8, 30, 0).unwrap_or_default();
        assert_eq!(
            SeedValue::Timestamp(stamp).to_sql_literal(),
            "'2024-02-29 08:30:00'"
        );
    }

    #[test]
    fn arrays_render_as_array_constructor() {
        let value = SeedValue::Array(vec![
            SeedValue::Text("a".to_string()),
            SeedValue::Text("b".to_string()),
        ]);
        assert_eq!(value.to_sql_literal(), "ARRAY['a', 'b']");
    }

    #[test]
    fn null_key_differs_from_text_null() {
        assert_ne!(
            SeedValue::Null.value_key(),
            SeedValue::Text("NULL".to_string()).value_key()
        );
    }
}
