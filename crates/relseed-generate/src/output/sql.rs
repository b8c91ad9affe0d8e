use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::Result;
use crate::model::{SeedData, TableSeed};

/// Name used in the seed file: bare for the default schema, qualified otherwise.
pub fn seed_table_name(table: &TableSeed) -> String {
    let schema = table.table.schema.as_str();
    if schema.is_empty() || schema == "public" {
        table.table.name.clone()
    } else {
        table.table.to_string()
    }
}

/// Write seed data as SQL `INSERT` statements, one block per table.
///
/// Returns the number of bytes written.
pub fn write_seed_sql<W: Write>(writer: W, data: &SeedData) -> Result<u64> {
    let mut writer = CountingWriter::new(writer);

    for table in &data.tables {
        let name = seed_table_name(table);
        writeln!(writer, "-- {name}")?;
        let columns = table.header.join(", ");
        for row in &table.rows {
            writeln!(
                writer,
                "INSERT INTO {name} ({columns}) VALUES ({});",
                row.join(", ")
            )?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(writer.bytes_written())
}

pub fn write_seed_file(path: &Path, data: &SeedData) -> Result<u64> {
    let file = BufWriter::new(File::create(path)?);
    write_seed_sql(file, data)
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
