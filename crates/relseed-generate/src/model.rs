use std::collections::BTreeMap;

use relseed_core::TableKey;
use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;

/// Upper bound on rows generated for a single table.
pub const ROW_CAP: usize = 200;
/// Lower bound of the random row count for tables sized by sampling.
pub const MIN_ROWS: usize = 10;

/// Options for the seed generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedOptions {
    /// Maximum rows per table, also the number of rejected duplicates tolerated.
    pub row_cap: usize,
    pub min_rows: usize,
    /// Seed for a reproducible run; a fresh one is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            row_cap: ROW_CAP,
            min_rows: MIN_ROWS,
            seed: None,
        }
    }
}

impl SeedOptions {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.row_cap == 0 {
            return Err(GenerationError::InvalidOptions(
                "row_cap must be at least 1".to_string(),
            ));
        }
        if self.min_rows > self.row_cap {
            return Err(GenerationError::InvalidOptions(format!(
                "min_rows ({}) must not exceed row_cap ({})",
                self.min_rows, self.row_cap
            )));
        }
        Ok(())
    }
}

/// Generated rows of one table, every value already an SQL literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSeed {
    pub table: TableKey,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableSeed {
    pub fn name(&self) -> &str {
        &self.table.name
    }

    /// Header row followed by the data rows.
    pub fn grid(&self) -> Vec<Vec<String>> {
        std::iter::once(self.header.clone())
            .chain(self.rows.iter().cloned())
            .collect()
    }

    /// Values of `column` across all rows.
    pub fn column_values(&self, column: &str) -> Vec<&str> {
        let Some(position) = self.header.iter().position(|name| name == column) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| row.get(position).map(String::as_str))
            .collect()
    }
}

/// Seed rows for every base table, in insert order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedData {
    pub tables: Vec<TableSeed>,
}

impl SeedData {
    /// First table with this name in any schema.
    pub fn get(&self, name: &str) -> Option<&TableSeed> {
        self.tables.iter().find(|table| table.table.name == name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(TableSeed::name).collect()
    }

    /// `{table_name: grid}` view of the data.
    pub fn grids(&self) -> BTreeMap<String, Vec<Vec<String>>> {
        self.tables
            .iter()
            .map(|table| (table.table.name.clone(), table.grid()))
            .collect()
    }

    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|table| table.rows.len()).sum()
    }
}

/// Summary of a generated table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    pub schema: String,
    pub table: String,
    pub rows_generated: u64,
    pub null_fallbacks: u64,
    pub unique_rejections: u64,
}

/// Report for a seed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedReport {
    /// Seed the run actually used, so it can be repeated.
    pub seed: u64,
    pub tables: Vec<TableReport>,
    pub null_fallback_count: u64,
    pub empty_tables: Vec<String>,
}

impl SeedReport {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            tables: Vec::new(),
            null_fallback_count: 0,
            empty_tables: Vec::new(),
        }
    }

    pub fn record_table(&mut self, report: TableReport) {
        self.null_fallback_count += report.null_fallbacks;
        if report.rows_generated == 0 {
            self.empty_tables
                .push(format!("{}.{}", report.schema, report.table));
        }
        self.tables.push(report);
    }

    pub fn rows_total(&self) -> u64 {
        self.tables.iter().map(|table| table.rows_generated).sum()
    }
}
