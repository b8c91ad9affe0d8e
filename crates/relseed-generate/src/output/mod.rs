pub mod sql;

pub use sql::{write_seed_file, write_seed_sql};
