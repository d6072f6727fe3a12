use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::debug;

use crate::error::RunError;
use crate::models::{Posting, PostingId};
use crate::storage::TIMESTAMP_FORMAT;

const HEADER: [&str; 5] = ["Date", "Id", "Name", "Price", "Url"];

/// Append-only CSV log of every posting ever classified as new, one row per
/// posting id. Rows are never rewritten or deleted; the file doubles as an
/// audit trail of first sightings.
pub struct HistoryStore {
    path: PathBuf,
}

/// Only the columns needed for the seen-before check; the remaining columns
/// exist for the human reading the file.
#[derive(Debug, Deserialize)]
struct HistoryRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Id")]
    id: String,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads all persisted records as id -> first-seen timestamp. A missing
    /// file is the first run and yields an empty map; an unreadable or
    /// malformed file is a `StoreCorrupt` error.
    pub fn load(&self) -> Result<HashMap<PostingId, NaiveDateTime>, RunError> {
        if !self.path.exists() {
            debug!("no history file at {}, starting fresh", self.path.display());
            return Ok(HashMap::new());
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| {
            RunError::StoreCorrupt(format!("cannot read {}: {e}", self.path.display()))
        })?;

        let mut records = HashMap::new();
        for row in reader.deserialize() {
            let row: HistoryRow = row.map_err(|e| {
                RunError::StoreCorrupt(format!("bad row in {}: {e}", self.path.display()))
            })?;
            let first_seen =
                NaiveDateTime::parse_from_str(&row.date, TIMESTAMP_FORMAT).map_err(|e| {
                    RunError::StoreCorrupt(format!(
                        "bad timestamp {:?} in {}: {e}",
                        row.date,
                        self.path.display()
                    ))
                })?;
            records.insert(PostingId(row.id), first_seen);
        }
        Ok(records)
    }

    /// Appends one record per posting, in order, all stamped with `at`. The
    /// header row is written only when the file is created fresh. An empty
    /// slice is a no-op and does not touch the file.
    pub fn append(&self, postings: &[Posting], at: NaiveDateTime) -> Result<(), RunError> {
        if postings.is_empty() {
            return Ok(());
        }

        let fresh = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                RunError::StoreCorrupt(format!("cannot open {}: {e}", self.path.display()))
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if fresh {
            writer
                .write_record(HEADER)
                .map_err(|e| RunError::StoreCorrupt(format!("write header: {e}")))?;
        }

        let stamp = at.format(TIMESTAMP_FORMAT).to_string();
        for posting in postings {
            let price = posting.price.to_string();
            let url = posting.direct_url();
            writer
                .write_record([
                    stamp.as_str(),
                    posting.posting_id.0.as_str(),
                    posting.name.as_str(),
                    price.as_str(),
                    url.as_str(),
                ])
                .map_err(|e| RunError::StoreCorrupt(format!("write row: {e}")))?;
        }
        writer
            .flush()
            .map_err(|e| RunError::StoreCorrupt(format!("flush {}: {e}", self.path.display())))?;
        Ok(())
    }
}
