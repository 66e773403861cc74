// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manager factory for CLI commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use sv_adapters::{FsBlobStore, FsDocumentStore, TracedBlobStore, TracedDocumentStore};
use sv_core::{StorageConfig, SystemClock};
use sv_engine::{ManagerDeps, SessionStorageManager};

pub const CONFIG_FILE: &str = "config.toml";

pub type Documents = TracedDocumentStore<FsDocumentStore>;
pub type Blobs = TracedBlobStore<FsBlobStore>;
pub type Manager = SessionStorageManager<Documents, Blobs, SystemClock>;

/// Everything a command needs: the manager plus direct record access
pub struct Vault {
    pub manager: Manager,
    pub documents: Documents,
    pub config: StorageConfig,
}

/// `$XDG_DATA_HOME/sv` or the platform equivalent
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("sv"))
        .context("no data directory on this platform; pass --data-dir")
}

/// Open the filesystem stores under `data_dir`.
pub fn open(data_dir: &Path, config_path: &Path) -> Result<Vault> {
    let config = StorageConfig::load(config_path)?;
    let documents = TracedDocumentStore::new(FsDocumentStore::new(data_dir.join("documents")));
    let blobs = TracedBlobStore::new(FsBlobStore::new(data_dir.join("blobs")));

    let manager = SessionStorageManager::new(
        ManagerDeps::new(documents.clone(), blobs),
        config.clone(),
        SystemClock,
    );
    Ok(Vault {
        manager,
        documents,
        config,
    })
}
