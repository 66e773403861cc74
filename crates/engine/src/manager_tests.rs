// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use sv_adapters::{BlobOp, DocumentOp, FakeBlobStore, FakeDocumentStore, FsDocumentStore, StoreError};
use sv_core::{codec, FakeClock};

struct Harness<K: Codec = StandardCodec> {
    manager: SessionStorageManager<FakeDocumentStore, FakeBlobStore, FakeClock, K>,
    documents: FakeDocumentStore,
    blobs: FakeBlobStore,
    clock: FakeClock,
}

fn harness_with(config: StorageConfig) -> Harness {
    harness_with_codec(config, StandardCodec)
}

fn harness_with_codec<K: Codec>(config: StorageConfig, codec: K) -> Harness<K> {
    let documents = FakeDocumentStore::new();
    let blobs = FakeBlobStore::new();
    let clock = FakeClock::new();
    let manager = SessionStorageManager::new(
        ManagerDeps::new(documents.clone(), blobs.clone()).with_codec(codec),
        config,
        clock.clone(),
    );
    Harness {
        manager,
        documents,
        blobs,
        clock,
    }
}

/// Inline threshold of 1 KiB so overflow is cheap to exercise
fn harness() -> Harness {
    let mut config = StorageConfig::for_testing();
    config.storage.inline_threshold = 1024;
    harness_with(config)
}

fn small_set() -> FileSet {
    FileSet::new().with_database_file("creds.json", br#"{"me":"15550100"}"#.to_vec())
}

fn large_set() -> FileSet {
    FileSet::new()
        .with_database_file("databases/msgstore.db", b"row,".repeat(2048))
        .with_database_file("empty", Vec::new())
        .with_downloaded_file("media/a.jpg", vec![7u8; 512])
}

/// Manager over on-disk records, for records no manager would write
fn disk_manager(
    dir: &std::path::Path,
) -> SessionStorageManager<FsDocumentStore, FakeBlobStore, FakeClock> {
    let mut config = StorageConfig::for_testing();
    config.storage.inline_threshold = 1024;
    SessionStorageManager::new(
        ManagerDeps::new(FsDocumentStore::new(dir), FakeBlobStore::new()),
        config,
        FakeClock::new(),
    )
}

const BARE_V2: &str = r#"{"id":"half","createdAt":"2026-01-01T00:00:00Z","lastUpdated":"2026-01-01T00:00:00Z","storage":{"storageVersion":"v2"}}"#;

/// Fails one algorithm with `cause`, optionally only above `max_level`
#[derive(Clone)]
struct FailingCodec {
    algorithm: CompressionType,
    max_level: Option<u32>,
    cause: &'static str,
    attempts: Arc<AtomicUsize>,
}

impl FailingCodec {
    fn new(algorithm: CompressionType, max_level: Option<u32>, cause: &'static str) -> Self {
        Self {
            algorithm,
            max_level,
            cause,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Codec for FailingCodec {
    fn compress(
        &self,
        data: &[u8],
        algorithm: CompressionType,
        level: u32,
    ) -> Result<Vec<u8>, CodecError> {
        if algorithm == self.algorithm {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            match self.max_level {
                Some(max) if level <= max => {}
                _ => {
                    return Err(CodecError::Compress {
                        algorithm,
                        source: std::io::Error::other(self.cause),
                    })
                }
            }
        }
        StandardCodec.compress(data, algorithm, level)
    }

    fn decompress(&self, data: &[u8], algorithm: CompressionType) -> Result<Vec<u8>, CodecError> {
        StandardCodec.decompress(data, algorithm)
    }
}

fn gzip_harness(codec: FailingCodec) -> Harness<FailingCodec> {
    let mut config = StorageConfig::for_testing();
    config.storage.inline_threshold = 1024;
    config.storage.compression = CompressionType::Gzip;
    harness_with_codec(config, codec)
}

fn overflow_of(record: &SessionRecord) -> OverflowFiles {
    match &record.storage {
        Some(SessionStorage::Overflow(o)) => o.clone(),
        other => panic!("expected overflow storage, got {other:?}"),
    }
}

// =============================================================================
// store / load
// =============================================================================

#[tokio::test]
async fn small_sets_are_stored_inline() {
    let h = harness();
    let record = h.manager.store("s1", &small_set()).await.unwrap();

    let Some(SessionStorage::Inline(inline)) = &record.storage else {
        panic!("expected inline storage");
    };
    assert!(inline.database_files.contains_key("creds%2Ejson"));
    assert!(inline.integrity_hash.is_some());
    assert!(!record.shard_enabled());
    assert!(h.blobs.is_empty());

    assert_eq!(h.manager.load("s1").await.unwrap(), small_set());
}

#[tokio::test]
async fn large_sets_overflow_with_compression() {
    let h = harness();
    let files = large_set();
    let record = h.manager.store("s1", &files).await.unwrap();

    let overflow = overflow_of(&record);
    assert_eq!(overflow.compression_type, CompressionType::Gzip);
    assert!(overflow.compressed_size < overflow.original_size);
    assert_eq!(overflow.original_size, files.total_size());
    assert!(overflow.downloaded_files_ref.is_some());
    assert_eq!(h.blobs.len(), 2);

    let stream = encode_group(&files.database_files).unwrap();
    assert_eq!(overflow.integrity_hash, Some(integrity_hash(&stream)));
    assert_eq!(h.manager.load("s1").await.unwrap(), files);
}

#[tokio::test]
async fn every_compression_type_round_trips() {
    for compression in CompressionType::ALL {
        let mut config = StorageConfig::for_testing();
        config.storage.inline_threshold = 1024;
        config.storage.compression = compression;
        let h = harness_with(config);

        let record = h.manager.store("s", &large_set()).await.unwrap();
        assert_eq!(overflow_of(&record).compression_type, compression);
        assert_eq!(h.manager.load("s").await.unwrap(), large_set(), "{compression}");
    }
}

#[tokio::test]
async fn out_of_memory_retries_at_a_lower_level() {
    let h = gzip_harness(FailingCodec::new(
        CompressionType::Gzip,
        Some(1),
        "out of memory",
    ));

    let record = h.manager.store("s", &large_set()).await.unwrap();

    assert_eq!(overflow_of(&record).compression_type, CompressionType::Gzip);
    assert_eq!(h.manager.monitor().snapshot().compression_failures, 1);
    assert_eq!(h.manager.load("s").await.unwrap(), large_set());
}

#[tokio::test]
async fn corrupt_compressor_output_skips_compression() {
    let codec = FailingCodec::new(CompressionType::Gzip, None, "corrupt dictionary");
    let attempts = Arc::clone(&codec.attempts);
    let h = gzip_harness(codec);

    let record = h.manager.store("s", &large_set()).await.unwrap();

    let overflow = overflow_of(&record);
    assert_eq!(overflow.compression_type, CompressionType::None);
    let files = large_set();
    let raw = encode_group(&files.database_files).unwrap().len()
        + encode_group(&files.downloaded_files).unwrap().len();
    assert_eq!(overflow.compressed_size, raw as u64);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(h.manager.monitor().snapshot().compression_failures, 1);
    assert_eq!(h.manager.load("s").await.unwrap(), large_set());
}

#[tokio::test]
async fn timed_out_compressor_switches_algorithm() {
    let h = gzip_harness(FailingCodec::new(
        CompressionType::Gzip,
        None,
        "deadline exceeded",
    ));

    let record = h.manager.store("s", &large_set()).await.unwrap();

    assert_eq!(overflow_of(&record).compression_type, CompressionType::Lz4);
    assert_eq!(h.manager.monitor().snapshot().compression_failures, 1);
    assert_eq!(h.manager.load("s").await.unwrap(), large_set());
}

#[tokio::test]
async fn unrecognized_compressor_failure_stores_uncompressed() {
    let h = gzip_harness(FailingCodec::new(
        CompressionType::Gzip,
        None,
        "disk quota reached",
    ));

    let record = h.manager.store("s", &large_set()).await.unwrap();

    assert_eq!(overflow_of(&record).compression_type, CompressionType::None);
    assert_eq!(h.manager.monitor().snapshot().compression_failures, 1);
    assert_eq!(h.manager.load("s").await.unwrap(), large_set());
}

#[tokio::test]
async fn failed_lower_level_retry_stores_uncompressed() {
    let codec = FailingCodec::new(CompressionType::Gzip, None, "out of memory");
    let attempts = Arc::clone(&codec.attempts);
    let h = gzip_harness(codec);

    let record = h.manager.store("s", &large_set()).await.unwrap();

    assert_eq!(overflow_of(&record).compression_type, CompressionType::None);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(h.manager.monitor().snapshot().compression_failures, 1);
    assert_eq!(h.manager.load("s").await.unwrap(), large_set());
}

#[tokio::test]
async fn threshold_boundary_goes_to_overflow() {
    let h = harness();
    let at_threshold = FileSet::new().with_database_file("edge", vec![1u8; 1024]);
    let below = FileSet::new().with_database_file("edge", vec![1u8; 1023]);

    let record = h.manager.store("at", &at_threshold).await.unwrap();
    assert!(record.shard_enabled());
    let record = h.manager.store("below", &below).await.unwrap();
    assert!(!record.shard_enabled());
}

#[tokio::test]
async fn oversized_inline_record_moves_to_overflow() {
    let mut config = StorageConfig::for_testing();
    config.storage.inline_threshold = 64 * 1024 * 1024;
    let h = harness_with(config);
    let files = FileSet::new().with_database_file("big.db", vec![0xAB; 12 * 1024 * 1024]);

    let record = h.manager.store("s", &files).await.unwrap();

    assert!(record.shard_enabled());
    assert_eq!(h.manager.monitor().snapshot().oversize_shards, 1);
    assert_eq!(h.manager.load("s").await.unwrap(), files);
}

#[tokio::test]
async fn new_record_keeps_profile_of_existing() {
    let h = harness();
    h.documents.insert(
        SessionRecord::new("s1", h.clock.utc_now()).with_profile_field("phone", json!("+1555")),
    );

    let record = h.manager.store("s1", &small_set()).await.unwrap();
    assert_eq!(record.profile["phone"], "+1555");
    assert_eq!(h.documents.record("s1").unwrap(), record);
}

#[tokio::test]
async fn restoring_releases_superseded_objects() {
    let h = harness();
    let first = overflow_of(&h.manager.store("s", &large_set()).await.unwrap());
    let second = overflow_of(&h.manager.store("s", &large_set()).await.unwrap());

    assert_eq!(h.blobs.len(), 2);
    for (bucket, id) in first.blob_refs() {
        assert!(h.blobs.object(bucket, &id).is_none());
    }
    for (bucket, id) in second.blob_refs() {
        assert!(h.blobs.object(bucket, &id).is_some());
    }

    h.manager.store("s", &small_set()).await.unwrap();
    assert!(h.blobs.is_empty());
}

#[tokio::test]
async fn failed_commit_keeps_previous_record_and_discards_staged_objects() {
    let h = harness();
    let before = h.manager.store("s", &small_set()).await.unwrap();
    h.documents.fail_always(
        DocumentOp::Upsert,
        StoreError::Unauthorized("token revoked".into()),
    );

    let err = h.manager.store("s", &large_set()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::AuthenticationFailed);
    assert_eq!(h.documents.record("s").unwrap(), before);
    assert!(h.blobs.is_empty());
    assert_eq!(h.blobs.call_count(BlobOp::Delete), 2);
}

#[tokio::test]
async fn failed_blob_write_creates_no_record() {
    let h = harness();
    h.blobs
        .fail_always(BlobOp::Write, StoreError::Unauthorized("bucket denied".into()));

    let err = h.manager.store("s", &large_set()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::AuthenticationFailed);
    assert!(h.documents.is_empty());
}

#[tokio::test]
async fn transient_blob_failures_are_retried() {
    let h = harness();
    h.blobs
        .fail_next(BlobOp::Write, StoreError::Unavailable("reset".into()));

    h.manager.store("s", &large_set()).await.unwrap();

    assert_eq!(h.blobs.call_count(BlobOp::Write), 3);
    assert_eq!(h.manager.monitor().failures(), 0);
}

#[tokio::test]
async fn load_missing_session_is_not_found() {
    let h = harness();
    let err = h.manager.load("ghost").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::SessionNotFound);
    assert_eq!(h.manager.monitor().failures(), 1);
}

#[tokio::test]
async fn record_without_files_is_incomplete() {
    let h = harness();
    h.documents.insert(SessionRecord::new("s", h.clock.utc_now()));
    let err = h.manager.load("s").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::IncompleteSession);
}

#[tokio::test]
async fn lost_database_object_is_incomplete() {
    let h = harness();
    let record = h.manager.store("s", &large_set()).await.unwrap();
    let overflow = overflow_of(&record);
    let Some(db_ref) = overflow.database_files_ref else {
        panic!("missing database ref");
    };
    h.blobs.lose(Bucket::Session, &db_ref);

    let err = h.manager.load("s").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::IncompleteSession);
    assert!(err.message.contains(db_ref.as_str()));
}

#[tokio::test]
async fn v2_record_without_references_is_incomplete() {
    let h = harness();
    let mut record = SessionRecord::new("s", h.clock.utc_now());
    record.storage = Some(SessionStorage::Overflow(OverflowFiles {
        database_files_ref: None,
        downloaded_files_ref: None,
        shard_refs: Vec::new(),
        compression_type: CompressionType::Gzip,
        original_size: 10,
        compressed_size: 5,
        integrity_hash: Some("00".to_string()),
    }));
    h.documents.insert(record);

    let err = h.manager.load("s").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::IncompleteSession);
}

#[tokio::test]
async fn v2_record_without_hash_is_incomplete() {
    let h = harness();
    let mut overflow = overflow_of(&h.manager.store("s", &large_set()).await.unwrap());
    overflow.integrity_hash = None;
    let mut record = h.documents.record("s").unwrap();
    record.storage = Some(SessionStorage::Overflow(overflow));
    h.documents.insert(record);

    let err = h.manager.load("s").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::IncompleteSession);
}

#[tokio::test]
async fn bare_v2_record_on_disk_is_incomplete() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("half.json"), BARE_V2).unwrap();
    let manager = disk_manager(dir.path());

    let err = manager.load("half").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::IncompleteSession);

    let report = manager.verify("half").await.unwrap();
    assert!(!report.valid);
    assert!(report.suggestions[0].contains("re-link"));
}

#[tokio::test]
async fn substituted_object_fails_integrity_check() {
    let h = harness();
    let overflow = overflow_of(&h.manager.store("s", &large_set()).await.unwrap());
    let Some(db_ref) = overflow.database_files_ref else {
        panic!("missing database ref");
    };

    let other = FileSet::new().with_database_file("databases/msgstore.db", b"evil".to_vec());
    let stream = encode_group(&other.database_files).unwrap();
    let payload = codec::compress(&stream, CompressionType::Gzip).unwrap();
    h.blobs.put(Bucket::Session, db_ref, payload);

    let err = h.manager.load("s").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidData);
    assert!(err.message.contains("integrity hash mismatch"));
}

#[tokio::test]
async fn garbage_object_is_invalid_data() {
    let h = harness();
    let overflow = overflow_of(&h.manager.store("s", &large_set()).await.unwrap());
    let Some(db_ref) = overflow.database_files_ref else {
        panic!("missing database ref");
    };
    h.blobs.put(Bucket::Session, db_ref, b"not gzip at all".to_vec());

    let err = h.manager.load("s").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidData);
}

#[tokio::test]
async fn tampered_inline_record_is_invalid_data() {
    let h = harness();
    let mut record = h.manager.store("s", &small_set()).await.unwrap();
    if let Some(SessionStorage::Inline(inline)) = &mut record.storage {
        inline
            .database_files
            .insert("creds%2Ejson".to_string(), "dGFtcGVyZWQ=".to_string());
    }
    h.documents.insert(record);

    let err = h.manager.load("s").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidData);
}

#[tokio::test]
async fn lost_downloads_are_best_effort() {
    let h = harness();
    let files = large_set();
    let overflow = overflow_of(&h.manager.store("s", &files).await.unwrap());
    let Some(dl_ref) = overflow.downloaded_files_ref else {
        panic!("missing downloads ref");
    };
    h.blobs.lose(Bucket::MessageFiles, &dl_ref);

    let loaded = h.manager.load("s").await.unwrap();
    assert_eq!(loaded.database_files, files.database_files);
    assert!(loaded.downloaded_files.is_empty());
}

#[tokio::test]
async fn legacy_shard_refs_are_concatenated() {
    let h = harness();
    let files = large_set();
    let stream = encode_group(&files.database_files).unwrap();
    let payload = codec::compress(&stream, CompressionType::Deflate).unwrap();
    let (head, tail) = payload.split_at(payload.len() / 2);
    h.blobs
        .put(Bucket::Session, BlobId::new("part-1"), head.to_vec());
    h.blobs
        .put(Bucket::Session, BlobId::new("part-2"), tail.to_vec());

    let mut record = SessionRecord::new("legacy", h.clock.utc_now());
    record.storage = Some(SessionStorage::Overflow(OverflowFiles {
        database_files_ref: None,
        downloaded_files_ref: None,
        shard_refs: vec![BlobId::new("part-1"), BlobId::new("part-2")],
        compression_type: CompressionType::Deflate,
        original_size: files.database_size(),
        compressed_size: payload.len() as u64,
        integrity_hash: Some(integrity_hash(&stream)),
    }));
    h.documents.insert(record);

    let loaded = h.manager.load("legacy").await.unwrap();
    assert_eq!(loaded.database_files, files.database_files);
}

#[tokio::test]
async fn load_updates_last_updated() {
    let h = harness();
    let stored = h.manager.store("s", &small_set()).await.unwrap();
    h.clock.advance(Duration::from_secs(3600));

    h.manager.load("s").await.unwrap();

    let record = h.documents.record("s").unwrap();
    assert_eq!(record.last_updated, h.clock.utc_now());
    assert!(record.last_updated > stored.last_updated);
}

// =============================================================================
// delete
// =============================================================================

#[tokio::test]
async fn delete_removes_record_and_objects() {
    let h = harness();
    h.manager.store("s", &large_set()).await.unwrap();

    assert!(h.manager.delete("s").await.unwrap());
    assert!(h.documents.is_empty());
    assert!(h.blobs.is_empty());
    assert!(h.manager.monitor().session("s").is_none());
}

#[tokio::test]
async fn delete_is_idempotent() {
    let h = harness();
    h.manager.store("s", &small_set()).await.unwrap();

    assert!(h.manager.delete("s").await.unwrap());
    assert!(!h.manager.delete("s").await.unwrap());
    assert!(!h.manager.delete("never-existed").await.unwrap());
}

#[tokio::test]
async fn overflow_delete_failure_does_not_block_record_delete() {
    let h = harness();
    h.manager.store("s", &large_set()).await.unwrap();
    h.blobs
        .fail_always(BlobOp::Delete, StoreError::Unauthorized("no delete".into()));

    assert!(h.manager.delete("s").await.unwrap());
    assert!(h.documents.is_empty());
    assert_eq!(h.blobs.len(), 2);
}

#[tokio::test]
async fn unparseable_record_is_still_deleted() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("junk.json"), b"{ not json").unwrap();
    let manager = disk_manager(dir.path());

    assert_eq!(
        manager.load("junk").await.unwrap_err().kind,
        ErrorKind::InvalidData
    );
    assert!(manager.delete("junk").await.unwrap());
    assert!(!dir.path().join("junk.json").exists());
    assert!(!manager.delete("junk").await.unwrap());
}

#[tokio::test]
async fn bare_v2_record_is_deleted() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("half.json"), BARE_V2).unwrap();
    let manager = disk_manager(dir.path());

    assert!(manager.delete("half").await.unwrap());
    assert!(!dir.path().join("half.json").exists());
}

// =============================================================================
// verify / cleanup
// =============================================================================

#[tokio::test]
async fn verify_reports_healthy_session() {
    let h = harness();
    h.manager.store("s", &large_set()).await.unwrap();

    let report = h.manager.verify("s").await.unwrap();
    assert!(report.valid, "{report:?}");
    assert_eq!(report.storage_version.as_deref(), Some("v2"));
    assert_eq!(report.files.len(), 3);
}

#[tokio::test]
async fn verify_reports_corruption_instead_of_failing() {
    let h = harness();
    let overflow = overflow_of(&h.manager.store("s", &large_set()).await.unwrap());
    let Some(db_ref) = overflow.database_files_ref else {
        panic!("missing database ref");
    };
    h.blobs.lose(Bucket::Session, &db_ref);

    let report = h.manager.verify("s").await.unwrap();
    assert!(!report.valid);
    assert!(report.issues[0].contains("missing"));
}

#[tokio::test]
async fn verify_missing_session_is_an_error() {
    let h = harness();
    let err = h.manager.verify("ghost").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::SessionNotFound);
}

#[tokio::test]
async fn cleanup_deletes_only_idle_inactive_sessions() {
    let h = harness();
    h.manager.store("idle", &large_set()).await.unwrap();
    h.documents.insert(
        SessionRecord::new("active", h.clock.utc_now()).with_profile_field("active", json!(true)),
    );
    h.clock.advance(Duration::from_secs(3 * 24 * 3600));
    h.manager.store("recent", &small_set()).await.unwrap();

    let report = h
        .manager
        .cleanup_inactive(Duration::from_secs(24 * 3600))
        .await
        .unwrap();

    assert_eq!(report.scanned, 3);
    assert_eq!(report.deleted, vec!["idle"]);
    assert_eq!(report.kept_active, 1);
    assert_eq!(report.kept_recent, 1);
    assert!(report.failed.is_empty());
    assert!(h.blobs.is_empty());
    assert!(h.documents.record("active").is_some());
}

#[tokio::test]
async fn cleanup_removes_unparseable_records() {
    let dir = tempfile::tempdir().unwrap();
    let manager = disk_manager(dir.path());
    manager.store("fine", &small_set()).await.unwrap();
    std::fs::write(dir.path().join("junk.json"), b"[1, 2").unwrap();

    let report = manager
        .cleanup_inactive(Duration::from_secs(24 * 3600))
        .await
        .unwrap();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.deleted, vec!["junk"]);
    assert_eq!(report.kept_recent, 1);
    assert!(report.failed.is_empty());
    assert!(!dir.path().join("junk.json").exists());
}

// =============================================================================
// resilience
// =============================================================================

#[tokio::test]
async fn repeated_outages_open_the_circuit() {
    let mut config = StorageConfig::for_testing();
    config.circuit.failure_threshold = 2;
    let h = harness_with(config);
    h.documents
        .fail_always(DocumentOp::Get, StoreError::Unavailable("primary down".into()));

    for _ in 0..2 {
        let err = h.manager.load("s").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::MaxRetriesExceeded);
    }
    let calls_before = h.documents.call_count(DocumentOp::Get);

    let err = h.manager.load("s").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::CircuitBreakerOpen);
    assert_eq!(h.documents.call_count(DocumentOp::Get), calls_before);

    h.documents.heal();
    h.clock.advance(Duration::from_secs(61));
    h.manager.store("s", &small_set()).await.unwrap();
    assert_eq!(h.manager.load("s").await.unwrap(), small_set());
}

#[tokio::test]
async fn monitor_tracks_session_metrics() {
    let h = harness();
    h.manager.store("s", &large_set()).await.unwrap();
    h.manager.load("s").await.unwrap();

    let metrics = h.manager.monitor().session("s").unwrap();
    assert_eq!(metrics.shard_count, 2);
    assert_eq!(metrics.size, large_set().total_size());
    assert!(metrics.compression_ratio < 1.0);

    let snapshot = h.manager.monitor().snapshot();
    assert_eq!(snapshot.active_shards, 2);
    assert!(snapshot.total_operations >= 4);
    assert_eq!(snapshot.success_rate, 1.0);
}
