// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.

use std::fmt;
use sv_core::{ErrorKind, StorageError};

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct SvError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
}

impl SvError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Error for a session that failed verification.
    pub fn verification_failed(session_id: &str, issues: &[String]) -> Self {
        issues.iter().fold(
            SvError::new(format!("session '{session_id}' failed verification")),
            |err, issue| err.with_context(issue.clone()),
        )
    }
}

impl From<StorageError> for SvError {
    fn from(err: StorageError) -> Self {
        let base = SvError::new(err.message.clone()).with_context(format!(
            "{} during {} for session '{}'",
            err.kind, err.operation, err.session_id
        ));
        match err.kind {
            ErrorKind::SessionNotFound => base
                .with_suggestion("check the session id: sv stats")
                .with_suggestion(format!("store it first: sv store {} --db-dir <dir>", err.session_id)),
            ErrorKind::IncompleteSession | ErrorKind::InvalidData => base
                .with_context("the stored copy cannot be reconstructed")
                .with_suggestion(format!("inspect it: sv verify {}", err.session_id))
                .with_suggestion("store the client's files again"),
            ErrorKind::CircuitBreakerOpen | ErrorKind::MaxRetriesExceeded => base
                .with_context("the storage backend kept failing")
                .with_suggestion("check that the data directory is reachable and writable"),
            ErrorKind::AuthenticationFailed => {
                base.with_suggestion("check permissions on the data directory")
            }
            _ => base,
        }
    }
}

impl fmt::Display for SvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for SvError {}
