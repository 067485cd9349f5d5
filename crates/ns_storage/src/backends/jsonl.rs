//! Line-delimited JSON: one serialized record per line.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use ns_core::{require_input, Result};
use tracing::{debug, warn};

use crate::{ensure_parent, RecordStore, TabularRecord};

#[derive(Debug, Clone)]
pub struct JsonLinesStore {
    path: PathBuf,
}

impl JsonLinesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl<T: TabularRecord> RecordStore<T> for JsonLinesStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, rows: &[T]) -> Result<()> {
        ensure_parent(&self.path)?;
        let mut writer = BufWriter::new(File::create(&self.path)?);
        for row in rows {
            serde_json::to_writer(&mut writer, row)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        debug!(path = %self.path.display(), rows = rows.len(), "Wrote JSON lines");
        Ok(())
    }

    fn load(&self) -> Result<Vec<T>> {
        require_input(&self.path)?;
        let reader = BufReader::new(File::open(&self.path)?);
        let mut rows = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(&line) {
                Ok(row) => rows.push(row),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    "⚠️ Skipping malformed record: {}",
                    e
                ),
            }
        }
        Ok(rows)
    }
}
