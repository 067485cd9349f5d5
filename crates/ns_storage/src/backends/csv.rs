//! CSV tables with an always-present header row.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use ::csv::{ReaderBuilder, WriterBuilder};
use ns_core::{require_input, Result};
use tracing::{debug, warn};

use crate::{ensure_parent, RecordStore, TabularRecord};

#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Appends one row, writing the header first if the file is new.
    ///
    /// Appending never deduplicates; re-running a producer accumulates rows.
    pub fn append<T: TabularRecord>(&self, row: &T) -> Result<()> {
        ensure_parent(&self.path)?;
        let file_exists = self.path.exists();
        debug!(path = %self.path.display(), file_exists, "Appending CSV record");

        let file = OpenOptions::new().append(true).create(true).open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if !file_exists {
            writer.write_record(T::HEADERS)?;
        }
        writer.serialize(row)?;
        writer.flush()?;
        Ok(())
    }

    /// Creates the file with only the header row unless it already exists.
    pub fn ensure_header<T: TabularRecord>(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        self.save(&[] as &[T])
    }
}

impl<T: TabularRecord> RecordStore<T> for CsvStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, rows: &[T]) -> Result<()> {
        ensure_parent(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_path(&self.path)?;
        writer.write_record(T::HEADERS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        debug!(path = %self.path.display(), rows = rows.len(), "Wrote CSV table");
        Ok(())
    }

    fn load(&self) -> Result<Vec<T>> {
        require_input(&self.path)?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_path(&self.path)?;
        let mut rows = Vec::new();
        for (index, record) in reader.deserialize::<T>().enumerate() {
            match record {
                Ok(row) => rows.push(row),
                // Header is line 1, so data row `index` sits on line `index + 2`.
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = index + 2,
                    "⚠️ Skipping malformed row: {}",
                    e
                ),
            }
        }
        Ok(rows)
    }
}
