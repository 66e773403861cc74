// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session commands

use crate::error::SvError;
use crate::output::{self, OutputFormat};
use crate::stores::Vault;
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use sv_core::sizing::format_bytes;
use sv_core::{FileSet, SessionRecord, SessionStorage};
use sv_engine::IntegrityReport;

#[derive(Args)]
pub struct SessionArg {
    /// Session id
    pub session_id: String,
}

#[derive(Args)]
pub struct StoreArgs {
    /// Session id
    pub session_id: String,
    /// Directory holding the client's database files
    #[arg(long)]
    pub db_dir: PathBuf,
    /// Directory holding the client's downloaded files
    #[arg(long)]
    pub downloads_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct LoadArgs {
    /// Session id
    pub session_id: String,
    /// Where to restore the database files
    #[arg(long)]
    pub db_dir: PathBuf,
    /// Where to restore the downloaded files
    #[arg(long)]
    pub downloads_dir: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Stored {
    session_id: String,
    storage_version: &'static str,
    compression: String,
    original_size: u64,
    stored_size: u64,
    objects: usize,
}

impl Stored {
    fn from_record(record: &SessionRecord) -> Option<Self> {
        let storage = record.storage.as_ref()?;
        let stored_size = match storage {
            SessionStorage::Inline(_) => storage.original_size(),
            SessionStorage::Overflow(o) => o.compressed_size,
        };
        Some(Self {
            session_id: record.id.clone(),
            storage_version: storage.version(),
            compression: storage.compression().to_string(),
            original_size: storage.original_size(),
            stored_size,
            objects: storage.blob_refs().len(),
        })
    }
}

impl fmt::Display for Stored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stored: {}", self.session_id)?;
        writeln!(f, "  Version: {}", self.storage_version)?;
        writeln!(f, "  Size: {}", format_bytes(self.original_size))?;
        if self.objects > 0 {
            writeln!(
                f,
                "  Overflow: {} object(s), {} ({})",
                self.objects,
                format_bytes(self.stored_size),
                self.compression
            )?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Loaded {
    session_id: String,
    database_files: usize,
    downloaded_files: usize,
    bytes: u64,
}

impl fmt::Display for Loaded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Restored {}: {} database file(s), {} downloaded file(s), {}",
            self.session_id,
            self.database_files,
            self.downloaded_files,
            format_bytes(self.bytes)
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Deleted {
    session_id: String,
    deleted: bool,
}

impl fmt::Display for Deleted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.deleted {
            writeln!(f, "Deleted {}", self.session_id)
        } else {
            writeln!(f, "No session {}", self.session_id)
        }
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct Report(IntegrityReport);

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.0;
        writeln!(
            f,
            "Session: {} ({})",
            r.session_id,
            r.storage_version.as_deref().unwrap_or("no files")
        )?;
        writeln!(f, "  Valid: {}", if r.valid { "yes" } else { "no" })?;
        for file in &r.files {
            let mark = if file.valid { "ok" } else { "BAD" };
            writeln!(f, "  {:<4} {:<40} {}", mark, file.name, format_bytes(file.size))?;
        }
        for issue in &r.issues {
            writeln!(f, "  issue: {}", issue)?;
        }
        for suggestion in &r.suggestions {
            writeln!(f, "  hint: {}", suggestion)?;
        }
        Ok(())
    }
}

pub async fn store(vault: &Vault, args: StoreArgs, format: OutputFormat) -> Result<()> {
    let files = FileSet::collect(
        &args.db_dir,
        args.downloads_dir.as_deref(),
        &vault.config.downloads,
    )?;
    let record = vault
        .manager
        .store(&args.session_id, &files)
        .await
        .map_err(SvError::from)?;

    if let Some(stored) = Stored::from_record(&record) {
        output::print(&stored, format);
    }
    Ok(())
}

pub async fn load(vault: &Vault, args: LoadArgs, format: OutputFormat) -> Result<()> {
    let files = vault
        .manager
        .load(&args.session_id)
        .await
        .map_err(SvError::from)?;
    files.restore(&args.db_dir, args.downloads_dir.as_deref())?;

    output::print(
        &Loaded {
            session_id: args.session_id,
            database_files: files.database_files.len(),
            downloaded_files: files.downloaded_files.len(),
            bytes: files.total_size(),
        },
        format,
    );
    Ok(())
}

pub async fn delete(vault: &Vault, arg: SessionArg, format: OutputFormat) -> Result<()> {
    let deleted = vault
        .manager
        .delete(&arg.session_id)
        .await
        .map_err(SvError::from)?;
    output::print(
        &Deleted {
            session_id: arg.session_id,
            deleted,
        },
        format,
    );
    Ok(())
}

/// Print the integrity report; fails if the session is not intact.
pub async fn verify(vault: &Vault, arg: SessionArg, format: OutputFormat) -> Result<()> {
    let report = vault
        .manager
        .verify(&arg.session_id)
        .await
        .map_err(SvError::from)?;
    let valid = report.valid;
    let issues = report.issues.clone();
    output::print(&Report(report), format);

    if !valid {
        return Err(SvError::verification_failed(&arg.session_id, &issues).into());
    }
    Ok(())
}
