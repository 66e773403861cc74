// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store-wide commands

use crate::error::SvError;
use crate::output::{self, OutputFormat};
use crate::stores::Vault;
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use sv_adapters::{DocumentStore, StoreError};
use sv_core::sizing::format_bytes;
use sv_core::SessionStorage;
use sv_engine::CleanupReport;

#[derive(Args)]
pub struct CleanupArgs {
    /// Delete sessions not loaded or stored for this long (e.g. "30d", "12h")
    #[arg(long, value_parser = humantime::parse_duration, default_value = "30d")]
    pub max_idle: Duration,
}

#[derive(Serialize)]
#[serde(transparent)]
struct Cleanup(CleanupReport);

impl fmt::Display for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.0;
        writeln!(
            f,
            "Scanned {} session(s): {} deleted, {} active, {} recent",
            r.scanned,
            r.deleted.len(),
            r.kept_active,
            r.kept_recent
        )?;
        for id in &r.deleted {
            writeln!(f, "  deleted {}", id)?;
        }
        for failure in &r.failed {
            writeln!(f, "  failed {}: {}", failure.session_id, failure.error)?;
        }
        Ok(())
    }
}

/// Aggregate view over every stored record
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Stats {
    sessions: usize,
    inline: usize,
    overflow: usize,
    without_files: usize,
    unreadable: usize,
    original_bytes: u64,
    stored_bytes: u64,
    overflow_objects: usize,
}

impl Stats {
    fn add(&mut self, storage: Option<&SessionStorage>) {
        self.sessions += 1;
        match storage {
            None => self.without_files += 1,
            Some(SessionStorage::Inline(inline)) => {
                self.inline += 1;
                self.original_bytes += inline.original_size;
                self.stored_bytes += inline.original_size;
            }
            Some(SessionStorage::Overflow(overflow)) => {
                self.overflow += 1;
                self.original_bytes += overflow.original_size;
                self.stored_bytes += overflow.compressed_size;
                self.overflow_objects += overflow.blob_refs().len();
            }
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sessions: {}", self.sessions)?;
        writeln!(f, "  Inline: {}", self.inline)?;
        writeln!(
            f,
            "  Overflow: {} ({} object(s))",
            self.overflow, self.overflow_objects
        )?;
        if self.without_files > 0 {
            writeln!(f, "  Without files: {}", self.without_files)?;
        }
        if self.unreadable > 0 {
            writeln!(f, "  Unreadable: {}", self.unreadable)?;
        }
        writeln!(
            f,
            "Bytes: {} stored for {} of files",
            format_bytes(self.stored_bytes),
            format_bytes(self.original_bytes)
        )
    }
}

pub async fn cleanup(vault: &Vault, args: CleanupArgs, format: OutputFormat) -> Result<()> {
    let report = vault
        .manager
        .cleanup_inactive(args.max_idle)
        .await
        .map_err(SvError::from)?;
    output::print(&Cleanup(report), format);
    Ok(())
}

pub async fn stats(vault: &Vault, format: OutputFormat) -> Result<()> {
    let mut stats = Stats::default();
    for id in vault.documents.list_ids().await? {
        match vault.documents.get(&id).await {
            Ok(Some(record)) => stats.add(record.storage.as_ref()),
            Ok(None) => tracing::debug!(session_id = %id, "record vanished during scan"),
            Err(StoreError::Serialization(message)) => {
                tracing::warn!(session_id = %id, error = %message, "unreadable record");
                stats.sessions += 1;
                stats.unreadable += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
    output::print(&stats, format);
    Ok(())
}
