//! Seed data generation for relseed.
//!
//! Walks the base tables of a finalized schema in insert order and produces
//! rows whose key values are unique and whose foreign keys point at rows
//! generated earlier in the same run.

pub mod engine;
pub mod errors;
pub mod generators;
pub mod memory;
pub mod model;
pub mod output;
pub mod temporal;
pub mod unique;
pub mod value;

pub use engine::{SeedGenerator, generate_seed_data};
pub use errors::{GenerationError, Result};
pub use memory::{ForeignContext, ValueMemory};
pub use model::{MIN_ROWS, ROW_CAP, SeedData, SeedOptions, SeedReport, TableReport, TableSeed};
pub use unique::{Combinations, total_possible_combinations, unique_data_rows};
pub use value::SeedValue;
