//! End-to-end store / load scenarios.

use crate::prelude::*;
use sv_core::files::{encode_group, escape_key, integrity_hash};
use sv_core::CompressionType;

#[tokio::test]
async fn small_config_is_stored_inline() {
    let vault = Vault::with_defaults();
    let b1 = text(500 * 1000);
    let files = FileSet::new().with_database_file("config.json", b1.clone());

    let record = vault.manager.store("S", &files).await.unwrap();

    assert_eq!(record.storage.as_ref().unwrap().version(), "v1");
    assert!(vault.blobs.is_empty());
    let loaded = vault.manager.load("S").await.unwrap();
    assert_eq!(loaded.database_files.len(), 1);
    assert_eq!(loaded.database_files["config.json"], b1);
}

#[tokio::test]
async fn large_text_overflows_compressed() {
    let vault = Vault::with_defaults();
    let files = FileSet::new()
        .with_database_file("databases/a.db", text(20 * 1024 * 1024))
        .with_database_file("databases/b.db", text(20 * 1024 * 1024));

    let record = vault.manager.store("S2", &files).await.unwrap();

    let Some(SessionStorage::Overflow(overflow)) = &record.storage else {
        panic!("expected overflow storage");
    };
    assert_ne!(overflow.compression_type, CompressionType::None);
    assert!(overflow.compressed_size < overflow.original_size);
    let db_ref = overflow.database_files_ref.clone().unwrap();
    assert!(vault.blobs.object(sv_core::Bucket::Session, &db_ref).is_some());

    let loaded = vault.manager.load("S2").await.unwrap();
    assert_eq!(loaded.total_size(), 40 * 1024 * 1024);
    assert!(loaded == files);
}

#[tokio::test]
async fn mixed_set_round_trips_byte_for_byte() {
    let mut config = StorageConfig::for_testing();
    let threshold = 8 * 1024 * 1024;
    config.storage.inline_threshold = threshold;
    let vault = Vault::new(config);

    let files = FileSet::new()
        .with_database_file("readme.txt", text(1024))
        .with_database_file("media.bin", binary(20 * 1024 * 1024))
        .with_database_file("empty", Vec::new())
        .with_database_file("databases/nested/app.db", text(300))
        .with_database_file("boundary.bin", binary(threshold as usize));

    let record = vault.manager.store("mixed", &files).await.unwrap();
    let expected_hash = integrity_hash(&encode_group(&files.database_files).unwrap());
    assert_eq!(
        record.storage.as_ref().unwrap().integrity_hash(),
        Some(expected_hash.as_str())
    );

    let loaded = vault.manager.load("mixed").await.unwrap();
    assert!(loaded == files, "loaded files differ from stored files");
    assert_eq!(
        integrity_hash(&encode_group(&loaded.database_files).unwrap()),
        expected_hash
    );
}

#[tokio::test]
async fn mixed_set_below_threshold_round_trips_inline() {
    let mut config = StorageConfig::for_testing();
    let threshold = 64 * 1024;
    config.storage.inline_threshold = threshold;
    let vault = Vault::new(config);

    let rest = FileSet::new()
        .with_database_file("readme.txt", text(1024))
        .with_database_file("media.bin", binary(16 * 1024))
        .with_database_file("empty", Vec::new())
        .with_database_file("databases/nested/app.db", text(300));
    let fill = threshold - rest.total_size() - 1;
    let files = rest
        .clone()
        .with_database_file("boundary.bin", binary(fill as usize));
    assert_eq!(files.total_size(), threshold - 1);

    let record = vault.manager.store("mixed-inline", &files).await.unwrap();

    let Some(SessionStorage::Inline(inline)) = &record.storage else {
        panic!("expected inline storage");
    };
    assert!(vault.blobs.is_empty());
    assert_eq!(inline.database_files.len(), 5);
    for name in files.database_files.keys() {
        assert!(inline.database_files.contains_key(&escape_key(name)), "{name}");
    }
    assert!(!inline.database_files.contains_key("readme.txt"));
    assert!(!inline.database_files.contains_key("databases/nested/app.db"));

    let loaded = vault.manager.load("mixed-inline").await.unwrap();
    assert!(loaded == files, "loaded files differ from stored files");

    let over = rest.with_database_file("boundary.bin", binary(fill as usize + 1));
    let record = vault.manager.store("mixed-inline", &over).await.unwrap();
    assert_eq!(record.storage.as_ref().unwrap().version(), "v2");
    assert!(vault.manager.load("mixed-inline").await.unwrap() == over);
}

#[tokio::test]
async fn sessions_move_between_tiers() {
    let mut config = StorageConfig::for_testing();
    config.storage.inline_threshold = 4096;
    let vault = Vault::new(config);

    let small = FileSet::new().with_database_file("a", text(100));
    let large = FileSet::new().with_database_file("a", text(10_000));

    vault.manager.store("s", &small).await.unwrap();
    vault.manager.store("s", &large).await.unwrap();
    assert_eq!(vault.blobs.len(), 1);
    assert_eq!(vault.manager.load("s").await.unwrap(), large);

    vault.manager.store("s", &small).await.unwrap();
    assert!(vault.blobs.is_empty());
    assert_eq!(vault.manager.load("s").await.unwrap(), small);
}
