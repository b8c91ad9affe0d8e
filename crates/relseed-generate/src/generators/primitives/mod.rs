//! Type-driven values used when no name pattern or value list applies.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::{Rng, RngCore};
use relseed_core::{Column, ColumnType, TemporalKind};
use serde_json::json;

use crate::value::SeedValue;

const DEFAULT_INT_MAX: i64 = 100_000;
const DEFAULT_FLOAT_MAX: f64 = 100_000.0;
const DAYS_SPAN: i64 = 365;

pub fn fallback_for_type<R: Rng>(column: &Column, base_date: NaiveDate, rng: &mut R) -> SeedValue {
    let column_type = &column.column_type;

    if column_type.is_array() {
        let element = ColumnType::plain(column_type.element_type.as_deref().unwrap_or("text"));
        let mut element_column = Column::new(&column.name, element);
        element_column.max_length = column.max_length;
        let count = rng.random_range(1..=3);
        let items = (0..count)
            .map(|_| fallback_for_type(&element_column, base_date, rng))
            .collect();
        return SeedValue::Array(items);
    }
    if let Some(kind) = column_type.temporal_kind() {
        return temporal_value(kind, base_date, DAYS_SPAN, rng);
    }

    match column_type.native_type.as_str() {
        "uuid" => SeedValue::Uuid(random_uuid(rng)),
        "tinyint" => SeedValue::Int(rng.random_range(1..=127)),
        "smallint" => SeedValue::Int(rng.random_range(1..=32_767)),
        "integer" | "int" | "mediumint" | "bigint" => {
            SeedValue::Int(rng.random_range(1..=DEFAULT_INT_MAX))
        }
        "numeric" | "decimal" => numeric_value(column_type, rng),
        "real" | "double precision" | "double" | "float" => {
            SeedValue::Float(rng.random_range(0.0..DEFAULT_FLOAT_MAX))
        }
        "boolean" | "bool" => SeedValue::Bool(rng.random_bool(0.5)),
        "json" | "jsonb" => {
            let document = json!({ "id": rng.random_range(1..=DEFAULT_INT_MAX), "active": rng.random_bool(0.5) });
            SeedValue::Json(document.to_string())
        }
        _ => SeedValue::Text(fallback_text(&column.name, column.max_length, rng)),
    }
}

/// `<name>_<digits>`, shortened from the name side so the random digits
/// survive a tight length limit.
fn fallback_text<R: Rng>(name: &str, max_length: Option<u32>, rng: &mut R) -> String {
    let suffix = format!("{:010}", rng.random::<u32>());
    let Some(limit) = max_length.map(|limit| limit as usize) else {
        return format!("{name}_{suffix}");
    };
    if limit <= suffix.len() {
        return suffix[suffix.len() - limit..].to_string();
    }
    let prefix: String = name.chars().take(limit - suffix.len() - 1).collect();
    format!("{prefix}_{suffix}")
}

/// A value of `kind` within `days` after `base_date`.
pub fn temporal_value<R: Rng>(
    kind: TemporalKind,
    base_date: NaiveDate,
    days: i64,
    rng: &mut R,
) -> SeedValue {
    let date = base_date + Duration::days(rng.random_range(0..=days));
    let time = safe_time_from_seconds(rng.random_range(0..=86_399));
    match kind {
        TemporalKind::Date => SeedValue::Date(date),
        TemporalKind::Time => SeedValue::Time(time),
        TemporalKind::Timestamp => SeedValue::Timestamp(NaiveDateTime::new(date, time)),
    }
}

fn numeric_value<R: Rng>(column_type: &ColumnType, rng: &mut R) -> SeedValue {
    let scale = column_type
        .numeric_scale
        .and_then(|scale| u32::try_from(scale).ok())
        .unwrap_or(0);
    // Integer digits allowed by the declared precision, capped to keep values readable.
    let integer_digits = column_type
        .numeric_precision
        .and_then(|precision| u32::try_from(precision).ok())
        .map(|precision| precision.saturating_sub(scale).min(5))
        .unwrap_or(5);
    let max = 10_i64.pow(integer_digits).saturating_sub(1).max(1);

    if scale == 0 {
        return SeedValue::Int(rng.random_range(0..=max));
    }
    let factor = 10_f64.powi(scale.min(6) as i32);
    let raw = rng.random_range(0.0..max as f64);
    SeedValue::Decimal((raw * factor).round() / factor, scale)
}

pub fn random_uuid<R: RngCore>(rng: &mut R) -> String {
    let mut bytes = [0_u8; 16];
    rng.fill_bytes(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    uuid::Uuid::from_bytes(bytes).to_string()
}

/// Cut `value` to at most `max_length` characters.
pub fn truncate(value: String, max_length: Option<u32>) -> String {
    match max_length {
        Some(limit) if value.chars().count() > limit as usize => {
            value.chars().take(limit as usize).collect()
        }
        _ => value,
    }
}

fn safe_time_from_seconds(seconds: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or_default()
}
