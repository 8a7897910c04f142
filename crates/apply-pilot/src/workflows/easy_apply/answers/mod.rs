mod rules;

pub use rules::{AnswerProfile, AnswerRule, AnswerRules};

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::normalizer::normalize_text;

/// Cached answer together with when it was last written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAnswer {
    pub answer: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnswerRow {
    question: String,
    answer: String,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum AnswerStoreError {
    #[error("failed to access answer store {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid answer store data: {0}")]
    Csv(#[from] csv::Error),
}

/// Normalized question text mapped to the last answer supplied for it.
#[derive(Debug, Default)]
pub struct QuestionAnswerCache {
    path: Option<PathBuf>,
    entries: BTreeMap<String, CachedAnswer>,
}

impl QuestionAnswerCache {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads every stored pair into memory. A missing file is an empty cache.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, AnswerStoreError> {
        let path = path.into();
        let mut cache = Self {
            path: Some(path.clone()),
            entries: BTreeMap::new(),
        };

        if path.is_file() {
            let file = File::open(&path).map_err(|source| AnswerStoreError::Io {
                path: path.clone(),
                source,
            })?;
            let mut reader = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_reader(file);
            for row in reader.deserialize::<AnswerRow>() {
                let row = row?;
                cache.insert(&row.question, row.answer, row.updated_at);
            }
            info!(
                path = %path.display(),
                answers = cache.entries.len(),
                "loaded question-answer cache"
            );
        }

        Ok(cache)
    }

    pub fn lookup(&self, question: &str) -> Option<&str> {
        self.entries
            .get(&normalize_text(question))
            .map(|entry| entry.answer.as_str())
    }

    pub fn entry(&self, question: &str) -> Option<&CachedAnswer> {
        self.entries.get(&normalize_text(question))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores `answer` for the normalized question and flushes the whole cache to disk.
    pub fn record(&mut self, question: &str, answer: &str) -> Result<(), AnswerStoreError> {
        self.record_at(question, answer, Utc::now())
    }

    pub fn record_at(
        &mut self,
        question: &str,
        answer: &str,
        at: DateTime<Utc>,
    ) -> Result<(), AnswerStoreError> {
        self.insert(question, answer.trim().to_string(), at);
        debug!(question = %normalize_text(question), "recorded answer");
        self.flush()
    }

    /// Rewrites the backing file via a sibling temp file so a crash never truncates it.
    pub fn flush(&self) -> Result<(), AnswerStoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let staging = staging_path(path);
        let io_error = |source| AnswerStoreError::Io {
            path: path.clone(),
            source,
        };

        let file = File::create(&staging).map_err(io_error)?;
        let mut writer = csv::Writer::from_writer(file);
        for (question, entry) in &self.entries {
            writer.serialize(AnswerRow {
                question: question.clone(),
                answer: entry.answer.clone(),
                updated_at: entry.updated_at,
            })?;
        }
        writer.flush().map_err(io_error)?;
        drop(writer);

        std::fs::rename(&staging, path).map_err(io_error)?;
        Ok(())
    }

    fn insert(&mut self, question: &str, answer: String, updated_at: DateTime<Utc>) {
        self.entries
            .insert(normalize_text(question), CachedAnswer { answer, updated_at });
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn lookup_ignores_case_and_spacing() {
        let mut cache = QuestionAnswerCache::in_memory();
        cache
            .record("What is your notice period?", "2 weeks")
            .expect("in-memory record");

        assert_eq!(cache.lookup("what is  your NOTICE period?  "), Some("2 weeks"));
        assert_eq!(cache.lookup("What is your salary?"), None);
    }

    #[test]
    fn record_overwrites_and_bumps_timestamp() {
        let mut cache = QuestionAnswerCache::in_memory();
        let first = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap();

        cache.record_at("Relocate?", "No", first).unwrap();
        cache.record_at("relocate?", "Yes", second).unwrap();

        let entry = cache.entry("RELOCATE?").expect("entry present");
        assert_eq!(entry.answer, "Yes");
        assert_eq!(entry.updated_at, second);
        assert_eq!(cache.len(), 1);
    }
}
