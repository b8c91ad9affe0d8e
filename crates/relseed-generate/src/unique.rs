//! Rows for the primary-key and unique columns of a table.
//!
//! Small enumerable key spaces are emitted exhaustively from a lazy cartesian
//! product; anything larger or unbounded is sampled and de-duplicated.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;
use relseed_core::{Column, ForeignKey, Table};
use tracing::debug;

use crate::generators::{NamePattern, ValueGenerator, enumerable_domain, fallback_for_type};
use crate::memory::ForeignContext;
use crate::model::SeedOptions;
use crate::value::SeedValue;

/// Size of the key space spanned by a table's unique columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinations {
    Finite(u64),
    Unbounded,
}

impl Combinations {
    pub fn fits_within(self, cap: usize) -> bool {
        match self {
            Combinations::Finite(total) => total <= cap as u64,
            Combinations::Unbounded => false,
        }
    }
}

/// Columns that take part in the primary key or a unique constraint, minus
/// generated columns (those never appear in an insert).
pub fn unique_columns(table: &Table) -> Vec<&Column> {
    table
        .unique_columns()
        .into_iter()
        .filter(|column| !column.is_generated)
        .collect()
}

/// Product of the domain sizes of the unique columns; `Unbounded` as soon as
/// one of them has no enumerable domain. Foreign-key columns take their values
/// from the referenced rows, so they never count as enumerable.
pub fn total_possible_combinations(table: &Table) -> Combinations {
    let mut total: u64 = 1;
    for column in unique_columns(table) {
        if foreign_key_of(table, column).is_some() {
            return Combinations::Unbounded;
        }
        match enumerable_domain(column) {
            Some(domain) => total = total.saturating_mul(domain.len() as u64),
            None => return Combinations::Unbounded,
        }
    }
    Combinations::Finite(total)
}

/// Lazy cartesian product over a list of domains, first domain varying slowest.
#[derive(Debug)]
pub struct CartesianProduct<'a> {
    domains: &'a [Vec<SeedValue>],
    indices: Vec<usize>,
    exhausted: bool,
}

impl<'a> CartesianProduct<'a> {
    pub fn new(domains: &'a [Vec<SeedValue>]) -> Self {
        Self {
            domains,
            indices: vec![0; domains.len()],
            exhausted: domains.is_empty() || domains.iter().any(Vec::is_empty),
        }
    }
}

impl Iterator for CartesianProduct<'_> {
    type Item = Vec<SeedValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let item = self
            .indices
            .iter()
            .zip(self.domains)
            .filter_map(|(index, domain)| domain.get(*index).cloned())
            .collect();

        let mut position = self.domains.len();
        loop {
            if position == 0 {
                self.exhausted = true;
                break;
            }
            position -= 1;
            self.indices[position] += 1;
            if self.indices[position] < self.domains[position].len() {
                break;
            }
            self.indices[position] = 0;
        }

        Some(item)
    }
}

/// Unique-column values for each generated row.
#[derive(Debug, Clone, Default)]
pub struct UniqueRows {
    /// Column names, in table column order.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SeedValue>>,
    /// Sampled rows thrown away as duplicates.
    pub rejected: usize,
    /// Foreign-key values that fell back to `NULL`.
    pub null_fallbacks: usize,
}

impl UniqueRows {
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    pub fn value(&self, row: usize, column: usize) -> Option<&SeedValue> {
        self.rows.get(row).and_then(|values| values.get(column))
    }
}

/// Generate rows for the table's unique columns.
///
/// No unique columns gives no rows. A finite key space within `row_cap` is
/// emitted in full. Otherwise a target in `[min_rows, row_cap]` is sampled;
/// generation gives up after `row_cap` rejected duplicates.
pub fn unique_data_rows<C: ForeignContext, R: Rng>(
    table: &Table,
    memory: &C,
    values: &ValueGenerator,
    options: &SeedOptions,
    rng: &mut R,
) -> UniqueRows {
    let columns = unique_columns(table);
    let mut result = UniqueRows {
        columns: columns.iter().map(|column| column.name.clone()).collect(),
        ..UniqueRows::default()
    };
    if columns.is_empty() {
        return result;
    }

    let combinations = total_possible_combinations(table);
    if combinations.fits_within(options.row_cap) {
        let domains: Vec<Vec<SeedValue>> = columns
            .iter()
            .filter_map(|column| enumerable_domain(column))
            .collect();
        result.rows = CartesianProduct::new(&domains)
            .take(options.row_cap)
            .collect();
        debug!(
            table = %table.key(),
            rows = result.rows.len(),
            "unique rows from enumerable domains"
        );
        return result;
    }

    let target = rng.random_range(options.min_rows.min(options.row_cap)..=options.row_cap);
    let mut seen_tuples = HashSet::new();
    let mut key_sets = single_column_keys(table, &result.columns);

    while result.rows.len() < target && result.rejected < options.row_cap {
        let mut null_fallbacks = 0;
        let row: Vec<SeedValue> = columns
            .iter()
            .map(|column| {
                let (value, fell_back) = sample_unique_value(table, column, memory, values, rng);
                if fell_back {
                    null_fallbacks += 1;
                }
                value
            })
            .collect();

        let tuple = sorted_tuple_key(&result.columns, &row);
        let collides = seen_tuples.contains(&tuple)
            || key_sets.iter().any(|(position, seen)| {
                row.get(*position)
                    .is_some_and(|value| seen.contains(&value.value_key()))
            });
        if collides {
            result.rejected += 1;
            continue;
        }

        seen_tuples.insert(tuple);
        for (position, seen) in &mut key_sets {
            if let Some(value) = row.get(*position) {
                seen.insert(value.value_key());
            }
        }
        result.null_fallbacks += null_fallbacks;
        result.rows.push(row);
    }

    if result.rows.len() < target {
        debug!(
            table = %table.key(),
            target,
            produced = result.rows.len(),
            rejected = result.rejected,
            "unique row sampling stopped early"
        );
    }
    result
}

fn sample_unique_value<C: ForeignContext, R: Rng>(
    table: &Table,
    column: &Column,
    memory: &C,
    values: &ValueGenerator,
    rng: &mut R,
) -> (SeedValue, bool) {
    if let Some(fk) = foreign_key_of(table, column) {
        return match memory.pick(&fk.target_key(), &fk.target_column, rng) {
            Some(value) => (value, false),
            None => (SeedValue::Null, true),
        };
    }
    if let Some(domain) = enumerable_domain(column) {
        if let Some(value) = domain.choose(rng) {
            return (value.clone(), false);
        }
    }
    let value = match NamePattern::detect(column) {
        Some(pattern) => pattern.generate(column, values.base_date(), rng),
        None => fallback_for_type(column, values.base_date(), rng),
    };
    (value, false)
}

fn foreign_key_of<'a>(table: &'a Table, column: &Column) -> Option<&'a ForeignKey> {
    table.foreign_keys.iter().find(|fk| fk.column == column.name)
}

/// Row identity: the values ordered by column name.
fn sorted_tuple_key(columns: &[String], row: &[SeedValue]) -> String {
    let mut pairs: Vec<(&str, String)> = columns
        .iter()
        .map(String::as_str)
        .zip(row.iter().map(SeedValue::value_key))
        .collect();
    pairs.sort_by(|left, right| left.0.cmp(right.0));
    pairs
        .into_iter()
        .map(|(_, key)| key)
        .collect::<Vec<_>>()
        .join("|")
}

/// Positions of columns that are a whole PRIMARY KEY or UNIQUE constraint on
/// their own, each with the values already used.
fn single_column_keys(table: &Table, columns: &[String]) -> Vec<(usize, HashSet<String>)> {
    columns
        .iter()
        .enumerate()
        .filter(|(_, name)| table.is_sole_unique(name))
        .map(|(position, _)| (position, HashSet::new()))
        .collect()
}
