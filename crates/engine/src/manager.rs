// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session storage manager: the store / load / delete lifecycle.
//!
//! Small file sets are embedded in the session record (`v1`); anything at
//! or above the inline threshold is compressed and written to the overflow
//! store with only references kept on the record (`v2`). Overflow objects
//! are staged before the record commits, so a failed store leaves the
//! previous record untouched.

use crate::circuit::CircuitRegistry;
use crate::handler::StorageExceptionHandler;
use crate::monitor::StorageMonitor;
use crate::report::{CleanupFailure, CleanupReport, IntegrityReport};
use std::sync::Arc;
use std::time::Duration;
use sv_adapters::{BlobStore, DocumentStore};
use sv_core::classify::{
    CompressionAction, CompressionFailureAnalysis, DocumentStoreFailureAnalysis, ShardSizeAnalysis,
};
use sv_core::codec::{Codec, CodecError, CompressionType, StandardCodec, DEFAULT_LEVEL};
use sv_core::files::{decode_group, decode_inline, encode_group, encode_inline, integrity_hash};
use sv_core::sizing::{is_safe_encoded_size, DOCUMENT_LIMIT, METADATA_RESERVE};
use sv_core::{
    strategy, BlobId, Bucket, Clock, ErrorKind, FileMap, FileSet, InlineFiles, OverflowFiles,
    SessionRecord, SessionStorage, StorageConfig, StorageError, SystemClock,
};

const DOCUMENT_GET: &str = "document.get";
const DOCUMENT_UPSERT: &str = "document.upsert";
const DOCUMENT_DELETE: &str = "document.delete";
const DOCUMENT_TOUCH: &str = "document.touch";
const DOCUMENT_LIST: &str = "document.list";
const BLOB_WRITE: &str = "blob.write";
const BLOB_READ: &str = "blob.read";
const BLOB_DELETE: &str = "blob.delete";

/// Session id used for calls that span every session
const ALL_SESSIONS: &str = "*";

/// Store drivers and codec used by the manager
pub struct ManagerDeps<D, B, K = StandardCodec> {
    pub documents: D,
    pub blobs: B,
    pub codec: K,
}

impl<D, B> ManagerDeps<D, B> {
    pub fn new(documents: D, blobs: B) -> Self {
        Self {
            documents,
            blobs,
            codec: StandardCodec,
        }
    }
}

impl<D, B, K> ManagerDeps<D, B, K> {
    pub fn with_codec<K2: Codec>(self, codec: K2) -> ManagerDeps<D, B, K2> {
        ManagerDeps {
            documents: self.documents,
            blobs: self.blobs,
            codec,
        }
    }
}

pub struct SessionStorageManager<D, B, C: Clock = SystemClock, K: Codec = StandardCodec> {
    documents: D,
    blobs: B,
    codec: K,
    clock: C,
    config: StorageConfig,
    handler: StorageExceptionHandler<C>,
    monitor: Arc<StorageMonitor>,
}

impl<D, B, C, K> SessionStorageManager<D, B, C, K>
where
    D: DocumentStore,
    B: BlobStore,
    C: Clock,
    K: Codec,
{
    /// Create a manager with its own circuit registry and monitor
    pub fn new(deps: ManagerDeps<D, B, K>, config: StorageConfig, clock: C) -> Self {
        let circuits = Arc::new(CircuitRegistry::new(&config.circuit));
        let monitor = Arc::new(StorageMonitor::new(&config.monitor));
        Self::with_shared(deps, config, clock, circuits, monitor)
    }

    /// Create a manager that shares circuits and metrics with other components
    pub fn with_shared(
        deps: ManagerDeps<D, B, K>,
        config: StorageConfig,
        clock: C,
        circuits: Arc<CircuitRegistry>,
        monitor: Arc<StorageMonitor>,
    ) -> Self {
        let handler = StorageExceptionHandler::new(
            config.retry.clone(),
            circuits,
            Arc::clone(&monitor),
            clock.clone(),
        );
        Self {
            documents: deps.documents,
            blobs: deps.blobs,
            codec: deps.codec,
            clock,
            config,
            handler,
            monitor,
        }
    }

    /// Replace the handler, e.g. to attach a cancellation token
    pub fn with_handler(mut self, handler: StorageExceptionHandler<C>) -> Self {
        self.monitor = Arc::clone(handler.monitor());
        self.handler = handler;
        self
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn handler(&self) -> &StorageExceptionHandler<C> {
        &self.handler
    }

    pub fn monitor(&self) -> &Arc<StorageMonitor> {
        &self.monitor
    }

    pub fn circuits(&self) -> &Arc<CircuitRegistry> {
        self.handler.circuits()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Persist `files` for `session_id` and return the committed record.
    ///
    /// A record is created if none exists yet. On failure the previous
    /// record and the objects it references are left as they were.
    pub async fn store(
        &self,
        session_id: &str,
        files: &FileSet,
    ) -> Result<SessionRecord, StorageError> {
        let now = self.clock.utc_now();
        let existing = self.get_record(session_id).await?;
        let previous = existing.as_ref().and_then(|r| r.storage.clone());

        let mut record = existing.unwrap_or_else(|| SessionRecord::new(session_id, now));
        record.last_updated = now;
        record.storage = None;

        let total = files.total_size();
        let db_stream = encode_group(&files.database_files)
            .map_err(|e| self.fail(StorageError::invalid_data(session_id, "store", e.to_string())))?;
        let hash = integrity_hash(&db_stream);

        if total < self.config.storage.inline_threshold {
            record.storage = self.inline_storage(session_id, files, &hash, &record)?;
        }

        let storage = match record.storage.take() {
            Some(inline) => inline,
            None => SessionStorage::Overflow(
                self.write_overflow(session_id, files, &db_stream, hash)
                    .await?,
            ),
        };
        record.storage = Some(storage.clone());

        if let Err(err) = self.upsert_record(&record).await {
            self.discard_blobs(session_id, &storage.blob_refs()).await;
            return Err(err);
        }

        if let Some(previous) = previous {
            let current = storage.blob_refs();
            let stale: Vec<_> = previous
                .blob_refs()
                .into_iter()
                .filter(|r| !current.contains(r))
                .collect();
            self.discard_blobs(session_id, &stale).await;
        }

        let (stored_size, shards) = match &storage {
            SessionStorage::Inline(_) => (total, 0),
            SessionStorage::Overflow(o) => (o.compressed_size, o.blob_refs().len() as u64),
        };
        self.monitor
            .record_store(session_id, total, stored_size, shards, now);
        tracing::info!(
            session_id,
            version = storage.version(),
            compression = %storage.compression(),
            original_size = total,
            stored_size,
            "session stored"
        );
        Ok(record)
    }

    /// Reconstruct the files stored for `session_id`.
    pub async fn load(&self, session_id: &str) -> Result<FileSet, StorageError> {
        let record = self.require_record(session_id, "load").await?;
        let files = self.read_files(&record).await?;

        let now = self.clock.utc_now();
        match self.touch_record(session_id, now).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!(session_id, "record vanished during load"),
            Err(err) => tracing::warn!(session_id, error = %err, "could not update last-updated"),
        }

        self.monitor
            .record_load(session_id, files.total_size(), now);
        tracing::info!(
            session_id,
            files = files.file_count(),
            bytes = files.total_size(),
            "session loaded"
        );
        Ok(files)
    }

    /// Remove a session and its overflow objects.
    ///
    /// Overflow deletion is best effort; the record is always removed, even
    /// when it can no longer be parsed. Returns `false` if there was no such
    /// session.
    pub async fn delete(&self, session_id: &str) -> Result<bool, StorageError> {
        let record = match self.get_record(session_id).await {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                tracing::debug!(session_id, "nothing to delete");
                return Ok(false);
            }
            Err(err) if err.kind == ErrorKind::InvalidData => {
                tracing::warn!(
                    session_id,
                    error = %err,
                    "record unreadable, overflow objects cannot be released"
                );
                None
            }
            Err(err) => return Err(err),
        };

        if let Some(storage) = record.as_ref().and_then(|r| r.storage.as_ref()) {
            self.discard_blobs(session_id, &storage.blob_refs()).await;
        }
        self.delete_record(session_id).await?;
        self.monitor.remove_session(session_id);

        tracing::info!(session_id, "session deleted");
        Ok(true)
    }

    /// Check that a stored session can be reconstructed intact.
    ///
    /// Corruption and missing references are reported, not returned as
    /// errors; store failures still surface as errors.
    pub async fn verify(&self, session_id: &str) -> Result<IntegrityReport, StorageError> {
        let record = self.require_record(session_id, "verify").await?;
        let report = IntegrityReport::new(session_id, record.storage.as_ref(), self.clock.utc_now());

        match (self.read_files(&record).await, record.storage.as_ref()) {
            (Ok(files), Some(storage)) => Ok(report.with_files(&files, storage)),
            (Ok(_), None) => Ok(report),
            (Err(err), _)
                if matches!(
                    err.kind,
                    ErrorKind::InvalidData | ErrorKind::IncompleteSession
                ) =>
            {
                Ok(report.unreadable(&err))
            }
            (Err(err), _) => Err(err),
        }
    }

    /// Delete sessions idle for longer than `max_idle`, skipping any whose
    /// profile marks them active. Records that no longer parse are deleted
    /// regardless of age.
    pub async fn cleanup_inactive(&self, max_idle: Duration) -> Result<CleanupReport, StorageError> {
        let now = self.clock.utc_now();
        let ids = self.list_ids().await?;
        let mut report = CleanupReport {
            scanned: ids.len(),
            ..CleanupReport::default()
        };

        let Some(cutoff) = chrono::Duration::from_std(max_idle)
            .ok()
            .and_then(|idle| now.checked_sub_signed(idle))
        else {
            report.kept_recent = ids.len();
            return Ok(report);
        };

        for id in ids {
            let record = match self.get_record(&id).await {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(err) if err.kind == ErrorKind::InvalidData => {
                    self.sweep(&id, &mut report).await;
                    continue;
                }
                Err(err) => {
                    report.failed.push(CleanupFailure {
                        session_id: id,
                        error: err.to_string(),
                    });
                    continue;
                }
            };

            if record.is_active() {
                report.kept_active += 1;
            } else if record.last_updated >= cutoff {
                report.kept_recent += 1;
            } else {
                self.sweep(&id, &mut report).await;
            }
        }

        tracing::info!(
            scanned = report.scanned,
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "cleanup finished"
        );
        Ok(report)
    }

    async fn sweep(&self, session_id: &str, report: &mut CleanupReport) {
        match self.delete(session_id).await {
            Ok(_) => report.deleted.push(session_id.to_string()),
            Err(err) => report.failed.push(CleanupFailure {
                session_id: session_id.to_string(),
                error: err.to_string(),
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Tiers
    // -------------------------------------------------------------------------

    /// Build `v1` storage, or `None` if the record would not fit a document.
    fn inline_storage(
        &self,
        session_id: &str,
        files: &FileSet,
        hash: &str,
        record: &SessionRecord,
    ) -> Result<Option<SessionStorage>, StorageError> {
        let storage = SessionStorage::Inline(InlineFiles {
            database_files: encode_inline(&files.database_files),
            downloaded_files: encode_inline(&files.downloaded_files),
            original_size: files.total_size(),
            integrity_hash: Some(hash.to_string()),
        });

        let candidate = SessionRecord {
            storage: Some(storage),
            ..record.clone()
        };
        let size = candidate
            .document_size()
            .map_err(|e| self.fail(StorageError::invalid_data(session_id, "store", e.to_string())))?;

        if is_safe_encoded_size(size) {
            return Ok(candidate.storage);
        }

        let advice =
            ShardSizeAnalysis::new(session_id, size, DOCUMENT_LIMIT - METADATA_RESERVE).handling_strategy();
        tracing::warn!(session_id, size, advice = %advice, "inline record too large, using overflow");
        self.monitor
            .record_oversize(session_id, size, &advice.to_string());
        Ok(None)
    }

    /// Compress and write both file groups. Nothing is left behind on error.
    async fn write_overflow(
        &self,
        session_id: &str,
        files: &FileSet,
        db_stream: &[u8],
        integrity_hash: String,
    ) -> Result<OverflowFiles, StorageError> {
        let plan = strategy::analyze(db_stream, self.config.storage.compression);
        tracing::debug!(
            session_id,
            data_type = %plan.data_type,
            estimated_ratio = plan.estimated_ratio,
            shard_size = plan.shard_size,
            shard_count = plan.shard_count,
            "overflow plan"
        );

        let dl_stream = if files.downloaded_files.is_empty() {
            None
        } else {
            Some(encode_group(&files.downloaded_files).map_err(|e| {
                self.fail(StorageError::invalid_data(session_id, "store", e.to_string()))
            })?)
        };

        let mut streams = vec![db_stream];
        streams.extend(dl_stream.as_deref());
        let (compression, payloads) = self.compress_streams(session_id, &streams);
        let compressed_size = payloads.iter().map(|p| p.len() as u64).sum();

        let mut payloads = payloads.into_iter();
        let db_payload = payloads.next().unwrap_or_default();
        let db_id = self
            .write_blob(session_id, Bucket::Session, &db_payload)
            .await?;

        let downloaded_files_ref = match payloads.next() {
            Some(payload) => match self
                .write_blob(session_id, Bucket::MessageFiles, &payload)
                .await
            {
                Ok(id) => Some(id),
                Err(err) => {
                    self.discard_blobs(session_id, &[(Bucket::Session, db_id)])
                        .await;
                    return Err(err);
                }
            },
            None => None,
        };

        Ok(OverflowFiles {
            database_files_ref: Some(db_id),
            downloaded_files_ref,
            shard_refs: Vec::new(),
            compression_type: compression,
            original_size: files.total_size(),
            compressed_size,
            integrity_hash: Some(integrity_hash),
        })
    }

    /// Compress every stream with one algorithm, falling back as the
    /// compression classifier advises and finally to no compression.
    fn compress_streams(
        &self,
        session_id: &str,
        streams: &[&[u8]],
    ) -> (CompressionType, Vec<Vec<u8>>) {
        let configured = self.config.storage.compression;
        let err = match self.compress_all(streams, configured, DEFAULT_LEVEL) {
            Ok(payloads) => return (configured, payloads),
            Err(err) => err,
        };

        let size = streams.iter().map(|s| s.len() as u64).sum();
        self.monitor
            .record_compression_failure(session_id, configured, size, &err.to_string());
        let advice =
            CompressionFailureAnalysis::new(session_id, configured, size, err.to_string()).handling_strategy();
        tracing::warn!(session_id, advice = %advice, "compression failed");

        let second_try = match advice.action {
            CompressionAction::LowerLevel => Some((configured, 1)),
            CompressionAction::SwitchAlgorithm { to } => Some((to, DEFAULT_LEVEL)),
            CompressionAction::SkipCompression | CompressionAction::FallbackUncompressed => None,
        };
        if let Some((algorithm, level)) = second_try {
            match self.compress_all(streams, algorithm, level) {
                Ok(payloads) => return (algorithm, payloads),
                Err(err) => tracing::warn!(session_id, error = %err, "fallback compression failed"),
            }
        }

        (
            CompressionType::None,
            streams.iter().map(|s| s.to_vec()).collect(),
        )
    }

    fn compress_all(
        &self,
        streams: &[&[u8]],
        algorithm: CompressionType,
        level: u32,
    ) -> Result<Vec<Vec<u8>>, CodecError> {
        streams
            .iter()
            .map(|s| self.codec.compress(s, algorithm, level))
            .collect()
    }

    async fn read_files(&self, record: &SessionRecord) -> Result<FileSet, StorageError> {
        let session_id = record.id.as_str();
        match &record.storage {
            None => Err(self.fail(StorageError::incomplete(
                session_id,
                "session has no stored files",
            ))),
            Some(SessionStorage::Inline(inline)) => self.read_inline(session_id, inline),
            Some(SessionStorage::Overflow(overflow)) => {
                self.read_overflow(session_id, overflow).await
            }
        }
    }

    fn read_inline(&self, session_id: &str, inline: &InlineFiles) -> Result<FileSet, StorageError> {
        let database_files = decode_inline(&inline.database_files)
            .map_err(|e| self.fail(StorageError::invalid_data(session_id, "load", e.to_string())))?;

        if let Some(expected) = &inline.integrity_hash {
            let stream = encode_group(&database_files).map_err(|e| {
                self.fail(StorageError::invalid_data(session_id, "load", e.to_string()))
            })?;
            self.check_hash(session_id, expected, &stream)?;
        }

        let downloaded_files = decode_inline(&inline.downloaded_files).unwrap_or_else(|e| {
            tracing::warn!(session_id, error = %e, "dropping unreadable downloaded files");
            FileMap::new()
        });

        Ok(FileSet {
            database_files,
            downloaded_files,
        })
    }

    async fn read_overflow(
        &self,
        session_id: &str,
        overflow: &OverflowFiles,
    ) -> Result<FileSet, StorageError> {
        let Some(expected) = overflow.integrity_hash.as_deref() else {
            return Err(self.fail(StorageError::incomplete(
                session_id,
                "v2 record has no integrity hash",
            )));
        };

        let payload = if let Some(id) = &overflow.database_files_ref {
            self.read_required(session_id, id).await?
        } else if !overflow.shard_refs.is_empty() {
            let mut joined = Vec::new();
            for id in &overflow.shard_refs {
                joined.extend(self.read_required(session_id, id).await?);
            }
            joined
        } else {
            return Err(self.fail(StorageError::incomplete(
                session_id,
                "v2 record has no database files reference",
            )));
        };

        let stream = self
            .codec
            .decompress(&payload, overflow.compression_type)
            .map_err(|e| self.fail(StorageError::invalid_data(session_id, "load", e.to_string())))?;
        self.check_hash(session_id, expected, &stream)?;
        let database_files = decode_group(&stream)
            .map_err(|e| self.fail(StorageError::invalid_data(session_id, "load", e.to_string())))?;

        let downloaded_files = match &overflow.downloaded_files_ref {
            Some(id) => {
                self.read_downloads(session_id, id, overflow.compression_type)
                    .await
            }
            None => FileMap::new(),
        };

        Ok(FileSet {
            database_files,
            downloaded_files,
        })
    }

    /// A database object that must exist for the session to be usable
    async fn read_required(&self, session_id: &str, id: &BlobId) -> Result<Vec<u8>, StorageError> {
        self.read_blob(session_id, Bucket::Session, id)
            .await?
            .ok_or_else(|| {
                self.fail(StorageError::incomplete(
                    session_id,
                    format!("database files object {id} is missing"),
                ))
            })
    }

    /// Downloaded files are best effort: any failure yields an empty group.
    async fn read_downloads(
        &self,
        session_id: &str,
        id: &BlobId,
        compression: CompressionType,
    ) -> FileMap {
        let payload = match self.read_blob(session_id, Bucket::MessageFiles, id).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                tracing::warn!(session_id, blob_id = %id, "downloaded files object missing");
                return FileMap::new();
            }
            Err(err) => {
                tracing::warn!(session_id, error = %err, "downloaded files unavailable");
                return FileMap::new();
            }
        };

        let decoded = self
            .codec
            .decompress(&payload, compression)
            .map_err(|e| e.to_string())
            .and_then(|stream| decode_group(&stream).map_err(|e| e.to_string()));
        decoded.unwrap_or_else(|error| {
            tracing::warn!(session_id, blob_id = %id, error = %error, "dropping unreadable downloaded files");
            FileMap::new()
        })
    }

    fn check_hash(&self, session_id: &str, expected: &str, stream: &[u8]) -> Result<(), StorageError> {
        let actual = integrity_hash(stream);
        if actual == expected {
            return Ok(());
        }
        Err(self.fail(StorageError::invalid_data(
            session_id,
            "load",
            format!("integrity hash mismatch: expected {expected}, found {actual}"),
        )))
    }

    async fn discard_blobs(&self, session_id: &str, refs: &[(Bucket, BlobId)]) {
        for (bucket, id) in refs {
            match self.delete_blob(session_id, *bucket, id).await {
                Ok(true) => {}
                Ok(false) => tracing::debug!(session_id, %bucket, blob_id = %id, "object already gone"),
                Err(err) => tracing::warn!(
                    session_id,
                    %bucket,
                    blob_id = %id,
                    error = %err,
                    "overflow object left behind"
                ),
            }
        }
    }

    /// Record a failure raised by the manager itself.
    fn fail(&self, err: StorageError) -> StorageError {
        tracing::error!(
            session_id = %err.session_id,
            operation = %err.operation,
            kind = %err.kind,
            "{}",
            err.message
        );
        self.monitor.record_failure(&err, None);
        err
    }

    // -------------------------------------------------------------------------
    // Store calls, each through the exception handler
    // -------------------------------------------------------------------------

    async fn require_record(
        &self,
        session_id: &str,
        operation: &str,
    ) -> Result<SessionRecord, StorageError> {
        self.get_record(session_id)
            .await?
            .ok_or_else(|| self.fail(StorageError::not_found(session_id, operation)))
    }

    async fn get_record(&self, session_id: &str) -> Result<Option<SessionRecord>, StorageError> {
        let documents = &self.documents;
        let result = self
            .handler
            .execute(DOCUMENT_GET, session_id, move || async move {
                documents
                    .get(session_id)
                    .await
                    .map_err(|e| e.at(session_id, DOCUMENT_GET))
            })
            .await;
        self.advise_on_document_failure(result)
    }

    async fn upsert_record(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let documents = &self.documents;
        let session_id = record.id.as_str();
        let result = self
            .handler
            .execute(DOCUMENT_UPSERT, session_id, move || async move {
                documents
                    .upsert(record)
                    .await
                    .map_err(|e| e.at(session_id, DOCUMENT_UPSERT))
            })
            .await;
        self.advise_on_document_failure(result)
    }

    async fn delete_record(&self, session_id: &str) -> Result<bool, StorageError> {
        let documents = &self.documents;
        let result = self
            .handler
            .execute(DOCUMENT_DELETE, session_id, move || async move {
                documents
                    .delete(session_id)
                    .await
                    .map_err(|e| e.at(session_id, DOCUMENT_DELETE))
            })
            .await;
        self.advise_on_document_failure(result)
    }

    async fn touch_record(
        &self,
        session_id: &str,
        at: chrono::DateTime<chrono::Utc>,
    ) -> Result<bool, StorageError> {
        let documents = &self.documents;
        self.handler
            .execute(DOCUMENT_TOUCH, session_id, move || async move {
                documents
                    .touch(session_id, at)
                    .await
                    .map_err(|e| e.at(session_id, DOCUMENT_TOUCH))
            })
            .await
    }

    async fn list_ids(&self) -> Result<Vec<String>, StorageError> {
        let documents = &self.documents;
        let result = self
            .handler
            .execute(DOCUMENT_LIST, ALL_SESSIONS, move || async move {
                documents
                    .list_ids()
                    .await
                    .map_err(|e| e.at(ALL_SESSIONS, DOCUMENT_LIST))
            })
            .await;
        self.advise_on_document_failure(result)
    }

    async fn write_blob(
        &self,
        session_id: &str,
        bucket: Bucket,
        data: &[u8],
    ) -> Result<BlobId, StorageError> {
        let blobs = &self.blobs;
        self.handler
            .execute(BLOB_WRITE, session_id, move || async move {
                blobs
                    .write(bucket, data)
                    .await
                    .map_err(|e| e.at(session_id, BLOB_WRITE))
            })
            .await
    }

    async fn read_blob(
        &self,
        session_id: &str,
        bucket: Bucket,
        id: &BlobId,
    ) -> Result<Option<Vec<u8>>, StorageError> {
        let blobs = &self.blobs;
        self.handler
            .execute(BLOB_READ, session_id, move || async move {
                blobs
                    .read(bucket, id)
                    .await
                    .map_err(|e| e.at(session_id, BLOB_READ))
            })
            .await
    }

    async fn delete_blob(
        &self,
        session_id: &str,
        bucket: Bucket,
        id: &BlobId,
    ) -> Result<bool, StorageError> {
        let blobs = &self.blobs;
        self.handler
            .execute(BLOB_DELETE, session_id, move || async move {
                blobs
                    .delete(bucket, id)
                    .await
                    .map_err(|e| e.at(session_id, BLOB_DELETE))
            })
            .await
    }

    /// Attach the document-store classifier's advice to surfaced failures.
    fn advise_on_document_failure<T>(
        &self,
        result: Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        if let Err(err) = &result {
            let advice =
                DocumentStoreFailureAnalysis::new(&err.session_id, &err.operation, &err.message)
                    .handling_strategy();
            tracing::warn!(
                session_id = %err.session_id,
                operation = %err.operation,
                advice = %advice,
                "document store failure"
            );
        }
        result
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
