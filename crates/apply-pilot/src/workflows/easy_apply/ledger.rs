use std::collections::{BTreeMap, HashSet};
use std::fs::{File, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::{Outcome, Posting, PostingId};

/// One attempt recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub posting_id: PostingId,
    pub organization: String,
    pub title: String,
    pub outcome: Outcome,
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub detail: String,
}

impl LedgerEntry {
    pub fn for_posting(posting: &Posting, outcome: Outcome, detail: impl Into<String>) -> Self {
        Self {
            posting_id: posting.id.clone(),
            organization: posting.organization.clone(),
            title: posting.title.clone(),
            outcome,
            recorded_at: Utc::now(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to access ledger {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid ledger data: {0}")]
    Csv(#[from] csv::Error),
}

/// Append-only record of every attempt. Also the source of truth for duplicate detection.
#[derive(Debug, Default)]
pub struct ApplicationLedger {
    path: Option<PathBuf>,
    entries: Vec<LedgerEntry>,
    applied: HashSet<PostingId>,
}

impl ApplicationLedger {
    /// Ledger that lives only for the current process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the ledger at `path`, creating nothing until the first append.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let mut ledger = Self {
            path: Some(path.clone()),
            ..Self::default()
        };

        if path.is_file() {
            let file = File::open(&path).map_err(|source| LedgerError::Io {
                path: path.clone(),
                source,
            })?;
            for entry in read_entries(file)? {
                ledger.track(entry);
            }
            info!(
                path = %path.display(),
                entries = ledger.entries.len(),
                applied = ledger.applied.len(),
                "loaded application ledger"
            );
        }

        Ok(ledger)
    }

    pub fn from_entries(entries: impl IntoIterator<Item = LedgerEntry>) -> Self {
        let mut ledger = Self::default();
        for entry in entries {
            ledger.track(entry);
        }
        ledger
    }

    pub fn has_applied(&self, id: &PostingId) -> bool {
        self.applied.contains(id)
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Appends an entry, writing it through to disk before it becomes visible in memory.
    pub fn append(&mut self, entry: LedgerEntry) -> Result<(), LedgerError> {
        if let Some(path) = &self.path {
            write_entry(path, &entry)?;
        }
        debug!(
            posting_id = %entry.posting_id,
            outcome = entry.outcome.label(),
            "ledger entry appended"
        );
        self.track(entry);
        Ok(())
    }

    pub fn totals(&self) -> BTreeMap<Outcome, usize> {
        let mut totals = BTreeMap::new();
        for entry in &self.entries {
            *totals.entry(entry.outcome).or_insert(0) += 1;
        }
        totals
    }

    fn track(&mut self, entry: LedgerEntry) {
        if entry.outcome == Outcome::Applied {
            self.applied.insert(entry.posting_id.clone());
        }
        self.entries.push(entry);
    }
}

pub(crate) fn read_entries<R: Read>(reader: R) -> Result<Vec<LedgerEntry>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader.deserialize().collect()
}

fn write_entry(path: &Path, entry: &LedgerEntry) -> Result<(), LedgerError> {
    let needs_header = std::fs::metadata(path)
        .map(|meta| meta.len() == 0)
        .unwrap_or(true);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LedgerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    writer.serialize(entry)?;
    writer.flush().map_err(|source| LedgerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
