use crate::{ArchiveError, Result};
use std::path::{Path, PathBuf};

/// Result of archiving one URL
#[derive(Debug)]
pub struct ArchiveOutcome {
    /// The URL as given
    pub url: String,

    /// Path of the written file, or why none was written
    pub result: Result<PathBuf>,
}

/// Ordered per-URL outcomes of a batch
#[derive(Debug, Default)]
pub struct ArchiveReport {
    pub outcomes: Vec<ArchiveOutcome>,
}

impl ArchiveReport {
    /// Records the outcome for `url`
    pub fn push(&mut self, url: impl Into<String>, result: Result<PathBuf>) {
        self.outcomes.push(ArchiveOutcome {
            url: url.into(),
            result,
        });
    }

    /// Written archive paths, in input order
    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok().map(PathBuf::as_path))
    }

    /// Failed URLs with their errors, in input order
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ArchiveError)> {
        self.outcomes.iter().filter_map(|outcome| {
            outcome
                .result
                .as_ref()
                .err()
                .map(|e| (outcome.url.as_str(), e))
        })
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// True when every URL was archived
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
