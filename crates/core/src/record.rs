// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session record persisted in the document store.
//!
//! One record per client identity. The engine owns only the `storage`
//! field; `profile` carries the client's authentication and configuration
//! fields untouched.

use crate::codec::CompressionType;
use crate::id::BlobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Overflow store namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bucket {
    /// Database file groups
    Session,
    /// Downloaded file groups
    MessageFiles,
}

impl Bucket {
    pub const ALL: [Bucket; 2] = [Bucket::Session, Bucket::MessageFiles];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Session => "session",
            Bucket::MessageFiles => "message-files",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    #[serde(default)]
    pub profile: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<SessionStorage>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            profile: Map::new(),
            storage: None,
            created_at: now,
            last_updated: now,
        }
    }

    pub fn with_profile_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.profile.insert(key.into(), value);
        self
    }

    pub fn shard_enabled(&self) -> bool {
        self.storage.as_ref().is_some_and(SessionStorage::shard_enabled)
    }

    /// Clients flagged active are never reclaimed by cleanup.
    pub fn is_active(&self) -> bool {
        matches!(self.profile.get("active"), Some(Value::Bool(true)))
    }

    /// Serialized size as the document store sees it
    pub fn document_size(&self) -> Result<u64, serde_json::Error> {
        Ok(serde_json::to_vec(self)?.len() as u64)
    }
}

/// Where a record's files live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "storageVersion")]
pub enum SessionStorage {
    #[serde(rename = "v1")]
    Inline(InlineFiles),
    #[serde(rename = "v2")]
    Overflow(OverflowFiles),
}

impl SessionStorage {
    pub fn version(&self) -> &'static str {
        match self {
            SessionStorage::Inline(_) => "v1",
            SessionStorage::Overflow(_) => "v2",
        }
    }

    pub fn shard_enabled(&self) -> bool {
        matches!(self, SessionStorage::Overflow(_))
    }

    pub fn compression(&self) -> CompressionType {
        match self {
            SessionStorage::Inline(_) => CompressionType::None,
            SessionStorage::Overflow(o) => o.compression_type,
        }
    }

    pub fn original_size(&self) -> u64 {
        match self {
            SessionStorage::Inline(i) => i.original_size,
            SessionStorage::Overflow(o) => o.original_size,
        }
    }

    pub fn integrity_hash(&self) -> Option<&str> {
        match self {
            SessionStorage::Inline(i) => i.integrity_hash.as_deref(),
            SessionStorage::Overflow(o) => o.integrity_hash.as_deref(),
        }
    }

    /// Overflow objects referenced by this record; empty for inline storage.
    pub fn blob_refs(&self) -> Vec<(Bucket, BlobId)> {
        match self {
            SessionStorage::Inline(_) => Vec::new(),
            SessionStorage::Overflow(o) => o.blob_refs(),
        }
    }
}

/// `v1`: escaped name -> Base64 maps embedded in the record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineFiles {
    #[serde(default)]
    pub database_files: BTreeMap<String, String>,
    #[serde(default)]
    pub downloaded_files: BTreeMap<String, String>,
    #[serde(default)]
    pub original_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity_hash: Option<String>,
}

/// `v2`: compressed file groups held in the overflow store
///
/// Every field is optional on the wire. A record written by an interrupted
/// or older client still parses; [`OverflowFiles::is_complete`] tells the
/// reader whether it can be reconstructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverflowFiles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_files_ref: Option<BlobId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloaded_files_ref: Option<BlobId>,
    /// Legacy layout: the database stream split across several objects
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shard_refs: Vec<BlobId>,
    #[serde(default = "uncompressed")]
    pub compression_type: CompressionType,
    #[serde(default)]
    pub original_size: u64,
    #[serde(default)]
    pub compressed_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity_hash: Option<String>,
}

fn uncompressed() -> CompressionType {
    CompressionType::None
}

impl OverflowFiles {
    /// compressed / original; 1.0 for an empty payload
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 1.0;
        }
        self.compressed_size as f64 / self.original_size as f64
    }

    /// Has a database reference and a hash to check it against
    pub fn is_complete(&self) -> bool {
        (self.database_files_ref.is_some() || !self.shard_refs.is_empty())
            && self.integrity_hash.is_some()
    }

    pub fn blob_refs(&self) -> Vec<(Bucket, BlobId)> {
        let mut refs: Vec<_> = self
            .database_files_ref
            .iter()
            .chain(&self.shard_refs)
            .map(|id| (Bucket::Session, id.clone()))
            .collect();
        if let Some(id) = &self.downloaded_files_ref {
            refs.push((Bucket::MessageFiles, id.clone()));
        }
        refs
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
