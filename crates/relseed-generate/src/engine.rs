use std::time::Instant;

use chrono::NaiveDate;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use relseed_core::{Column, Table, TableMap, sort_tables_for_insert};
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::generators::ValueGenerator;
use crate::memory::{ForeignContext, ValueMemory};
use crate::model::{SeedData, SeedOptions, SeedReport, TableReport, TableSeed};
use crate::temporal::order_temporal_columns;
use crate::unique::unique_data_rows;
use crate::value::SeedValue;

/// Generates seed rows for a finalized table map.
///
/// One random stream and one value memory live for the whole run, so tables
/// generated later can reference the keys of tables generated earlier.
#[derive(Debug)]
pub struct SeedGenerator {
    options: SeedOptions,
    rng: ChaCha8Rng,
    memory: ValueMemory,
    values: ValueGenerator,
    report: SeedReport,
}

impl SeedGenerator {
    pub fn new(options: SeedOptions) -> Result<Self> {
        options.validate()?;
        let seed = options.seed.unwrap_or_else(|| rand::rng().random());
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            memory: ValueMemory::new(),
            values: ValueGenerator::default(),
            report: SeedReport::new(seed),
            options,
        })
    }

    /// Anchor date for generated temporal values.
    pub fn with_base_date(mut self, base_date: NaiveDate) -> Self {
        self.values = ValueGenerator::new(base_date);
        self
    }

    pub fn seed(&self) -> u64 {
        self.report.seed
    }

    pub fn options(&self) -> &SeedOptions {
        &self.options
    }

    pub fn report(&self) -> &SeedReport {
        &self.report
    }

    pub fn memory(&self) -> &ValueMemory {
        &self.memory
    }

    /// Generate rows for every base table in insert order; views are skipped.
    pub fn generate(&mut self, tables: &TableMap) -> SeedData {
        let start = Instant::now();
        let order = sort_tables_for_insert(tables);
        info!(
            seed = self.report.seed,
            tables = order.base_tables.len(),
            views_skipped = order.views.len(),
            "seed generation started"
        );

        let mut data = SeedData::default();
        for key in &order.base_tables {
            let Some(table) = tables.get(key) else {
                continue;
            };
            data.tables.push(self.generate_table(table));
        }

        info!(
            seed = self.report.seed,
            rows = self.report.rows_total(),
            null_fallbacks = self.report.null_fallback_count,
            empty_tables = self.report.empty_tables.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "seed generation finished"
        );
        data
    }

    fn generate_table(&mut self, table: &Table) -> TableSeed {
        let key = table.key();
        let columns: Vec<&Column> = table
            .columns
            .iter()
            .filter(|column| !column.is_generated)
            .collect();

        let unique = unique_data_rows(
            table,
            &self.memory,
            &self.values,
            &self.options,
            &mut self.rng,
        );
        let row_count = if unique.columns.is_empty() {
            self.rng
                .random_range(self.options.min_rows..=self.options.row_cap)
        } else {
            unique.rows.len()
        };
        if !unique.columns.is_empty() && unique.rows.is_empty() {
            warn!(table = %key, "no unique rows could be generated; table left empty");
        }

        let mut null_fallbacks = unique.null_fallbacks as u64;
        let mut rows: Vec<Vec<SeedValue>> = Vec::with_capacity(row_count);
        for index in 0..row_count {
            let mut row = Vec::with_capacity(columns.len());
            for column in &columns {
                let value = if let Some(position) = unique.position(&column.name) {
                    unique
                        .value(index, position)
                        .cloned()
                        .unwrap_or(SeedValue::Null)
                } else if let Some(fk) = table.foreign_keys.iter().find(|fk| fk.column == column.name)
                {
                    match self
                        .memory
                        .pick(&fk.target_key(), &fk.target_column, &mut self.rng)
                    {
                        Some(value) => value,
                        None => {
                            null_fallbacks += 1;
                            SeedValue::Null
                        }
                    }
                } else {
                    self.values.generate(column, &mut self.rng)
                };
                row.push(value);
            }
            rows.push(row);
        }

        order_temporal_columns(&columns, &mut rows);

        for (position, column) in columns.iter().enumerate() {
            if !column.is_key() {
                continue;
            }
            for row in &rows {
                self.memory.remember(&key, &column.name, &row[position]);
            }
        }
        debug!(table = %key, remembered_slots = self.memory.len(), "key values remembered");

        info!(
            table = %key,
            rows = rows.len(),
            null_fallbacks,
            unique_rejections = unique.rejected,
            "table generated"
        );
        self.report.record_table(TableReport {
            schema: key.schema.clone(),
            table: key.name.clone(),
            rows_generated: rows.len() as u64,
            null_fallbacks,
            unique_rejections: unique.rejected as u64,
        });

        TableSeed {
            table: key,
            header: columns.iter().map(|column| column.name.clone()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(SeedValue::to_sql_literal).collect())
                .collect(),
        }
    }
}

/// Generate seed data for `tables` with a fresh generator.
pub fn generate_seed_data(tables: &TableMap, options: &SeedOptions) -> Result<SeedData> {
    let mut generator = SeedGenerator::new(options.clone())?;
    Ok(generator.generate(tables))
}
