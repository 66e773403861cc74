// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reports returned by the administrative operations

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use sv_core::files::safe_join;
use sv_core::{ErrorKind, FileMap, FileSet, SessionStorage, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileGroup {
    Database,
    Downloaded,
}

/// Check result for one stored file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileCheck {
    pub name: String,
    pub group: FileGroup,
    pub size: u64,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
}

/// Outcome of verifying a stored session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrityReport {
    pub session_id: String,
    pub storage_version: Option<String>,
    pub valid: bool,
    pub files: Vec<FileCheck>,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    pub checked_at: DateTime<Utc>,
}

impl IntegrityReport {
    pub(crate) fn new(
        session_id: &str,
        storage: Option<&SessionStorage>,
        checked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: session_id.to_string(),
            storage_version: storage.map(|s| s.version().to_string()),
            valid: true,
            files: Vec::new(),
            issues: Vec::new(),
            suggestions: Vec::new(),
            checked_at,
        }
    }

    /// Report for a session whose files could not be reconstructed
    pub(crate) fn unreadable(mut self, error: &StorageError) -> Self {
        self.valid = false;
        self.issues.push(error.message.clone());
        let suggestion = match error.kind {
            ErrorKind::IncompleteSession => {
                "stored references are missing; re-link the client to rebuild the session"
            }
            ErrorKind::InvalidData => {
                "stored copy is corrupt; store the files again from the client"
            }
            _ => "retry the check once the store is reachable",
        };
        self.suggestions.push(suggestion.to_string());
        self
    }

    /// Fill in per-file checks for a reconstructed file set
    pub(crate) fn with_files(mut self, files: &FileSet, storage: &SessionStorage) -> Self {
        self.check_group(&files.database_files, FileGroup::Database);
        self.check_group(&files.downloaded_files, FileGroup::Downloaded);

        if files.database_files.is_empty() {
            self.valid = false;
            self.issues.push("no database files stored".to_string());
            self.suggestions
                .push("re-link the client to capture its database".to_string());
        }

        match storage {
            SessionStorage::Inline(inline) if inline.integrity_hash.is_none() => {
                self.suggestions
                    .push("store again to record an integrity hash".to_string());
            }
            SessionStorage::Overflow(overflow) if overflow.compressed_size > overflow.original_size => {
                self.suggestions.push(format!(
                    "{} did not shrink this payload; consider another compression type",
                    overflow.compression_type
                ));
            }
            _ => {}
        }
        self
    }

    fn check_group(&mut self, files: &FileMap, group: FileGroup) {
        for (name, contents) in files {
            let issue = safe_join(Path::new("."), name)
                .err()
                .map(|e| e.to_string());
            if issue.is_some() {
                self.valid = false;
            }
            self.files.push(FileCheck {
                name: name.clone(),
                group,
                size: contents.len() as u64,
                valid: issue.is_none(),
                issue,
            });
        }
    }
}

/// Outcome of a cleanup sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanupReport {
    pub scanned: usize,
    pub deleted: Vec<String>,
    pub kept_active: usize,
    pub kept_recent: usize,
    pub failed: Vec<CleanupFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanupFailure {
    pub session_id: String,
    pub error: String,
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
