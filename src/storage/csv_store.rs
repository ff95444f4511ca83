use crate::model::{BookRecord, HistoryRow, StorageError};
use crate::utils::parse_stored_price;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const HEADER: [&str; 5] = ["title", "price", "stock", "rating", "date"];

/// Append-only CSV file holding every snapshot ever taken.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The header goes in only when the file is missing or still empty.
    fn needs_header(&self) -> Result<bool, StorageError> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    /// Appends one run's batch and returns the number of rows written.
    ///
    /// Either the whole batch lands in the file or none of it does: the batch
    /// is encoded in memory first, and a failed write or sync truncates the
    /// file back to its previous length before the error is returned.
    pub fn append(&self, records: &[BookRecord]) -> Result<usize, StorageError> {
        let write_header = self.needs_header()?;

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        if write_header {
            writer.write_record(HEADER)?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        let buffer = writer
            .into_inner()
            .map_err(|e| StorageError::Io(e.into_error()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        commit(&mut file, &buffer)?;

        debug!(
            "Appended {} rows to {} (header: {})",
            records.len(),
            self.path.display(),
            write_header
        );
        Ok(records.len())
    }

    /// Reads the whole history back from disk, in file order.
    /// A store that does not exist yet is an empty history.
    pub fn load_history(&self) -> Result<Vec<HistoryRow>, StorageError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);
        let title_idx = column("title");
        let price_idx = column("price");
        let date_idx = column("date");

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable store row #{}: {}", index + 1, e);
                    continue;
                }
            };

            let field = |idx: Option<usize>| idx.and_then(|i| record.get(i));
            rows.push(HistoryRow {
                title: field(title_idx).unwrap_or_default().to_string(),
                price: field(price_idx).and_then(parse_stored_price),
                date: field(date_idx)
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
            });
        }

        Ok(rows)
    }
}

/// A file that can be appended to and rolled back to an earlier length.
trait AppendTarget: Write {
    fn current_len(&self) -> std::io::Result<u64>;
    fn truncate_to(&mut self, len: u64) -> std::io::Result<()>;
    fn sync(&mut self) -> std::io::Result<()>;
}

impl AppendTarget for File {
    fn current_len(&self) -> std::io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len)?;
        self.sync_all()
    }

    fn sync(&mut self) -> std::io::Result<()> {
        self.sync_all()
    }
}

/// Writes and syncs `buffer`, or restores the previous length on failure.
fn commit<T: AppendTarget>(target: &mut T, buffer: &[u8]) -> Result<(), StorageError> {
    let original_len = target.current_len()?;
    let written = target.write_all(buffer).and_then(|_| target.sync());
    if let Err(e) = written {
        if let Err(rollback) = target.truncate_to(original_len) {
            warn!(
                "Could not roll store back to {} bytes: {}",
                original_len, rollback
            );
        }
        return Err(e.into());
    }
    Ok(())
}
