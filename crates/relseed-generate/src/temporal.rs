//! Keeps temporal columns of a row in a plausible order, e.g.
//! `created_at <= updated_at <= deleted_at`.

use std::collections::BTreeMap;

use relseed_core::{Column, TemporalKind};

use crate::value::SeedValue;

/// Position of a temporal column in a row's timeline.
pub fn chronological_rank(name: &str) -> u8 {
    let lowered = name.to_ascii_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect();
    let has = |prefixes: &[&str]| {
        tokens
            .iter()
            .any(|token| prefixes.iter().any(|prefix| token.starts_with(prefix)))
    };

    if has(&["created", "start", "birth"]) {
        0
    } else if has(&["updated", "modified"]) {
        2
    } else if has(&["end", "deleted", "expire"]) {
        3
    } else {
        1
    }
}

/// Reorders values of non-key temporal columns within each row.
///
/// Columns are grouped by temporal kind; groups of two or more get their
/// values sorted and handed out by rank, ties broken by column order. Rows
/// holding a `NULL` (or anything not temporal) in a group are left alone.
pub fn order_temporal_columns(columns: &[&Column], rows: &mut [Vec<SeedValue>]) {
    let mut groups: BTreeMap<TemporalKind, Vec<usize>> = BTreeMap::new();
    for (position, column) in columns.iter().enumerate() {
        if column.is_key() {
            continue;
        }
        if let Some(kind) = column.column_type.temporal_kind() {
            groups.entry(kind).or_default().push(position);
        }
    }

    for positions in groups.values_mut() {
        if positions.len() < 2 {
            continue;
        }
        positions.sort_by_key(|&position| {
            (chronological_rank(&columns[position].name), position)
        });

        for row in rows.iter_mut() {
            let mut values: Vec<SeedValue> = Vec::with_capacity(positions.len());
            for &position in positions.iter() {
                match row.get(position) {
                    Some(value) if value.chronological_key().is_some() => {
                        values.push(value.clone())
                    }
                    _ => break,
                }
            }
            if values.len() != positions.len() {
                continue;
            }
            values.sort_by_key(SeedValue::chronological_key);
            for (&position, value) in positions.iter().zip(values) {
                row[position] = value;
            }
        }
    }
}
