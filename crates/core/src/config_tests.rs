// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

#[test]
fn empty_document_is_all_defaults() {
    let config = StorageConfig::parse("").unwrap();
    assert_eq!(config, StorageConfig::default());
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.circuit.failure_threshold, 10);
    assert_eq!(config.circuit.recovery_timeout, Duration::from_secs(60));
    assert_eq!(config.monitor.history_size, 100);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let config = StorageConfig::parse(
        r#"
        [storage]
        compression = "lz4"

        [retry]
        base_delay = "250ms"
        max_delay = "2s"
        "#,
    )
    .unwrap();

    assert_eq!(config.storage.compression, CompressionType::Lz4);
    assert_eq!(config.storage.inline_threshold, 5 * 1024 * 1024);
    assert_eq!(config.retry.base_delay, Duration::from_millis(250));
    assert_eq!(config.retry.max_delay, Duration::from_secs(2));
    assert_eq!(config.retry.max_attempts, 3);
}

#[test]
fn rejects_zero_attempts() {
    let err = StorageConfig::parse("[retry]\nmax_attempts = 0").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("max_attempts")));
}

#[test]
fn rejects_shrinking_multiplier() {
    let err = StorageConfig::parse("[retry]\nmultiplier = 0.5").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn rejects_unknown_compression() {
    let err = StorageConfig::parse("[storage]\ncompression = \"brotli\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn backoff_grows_and_caps() {
    let retry = RetryConfig {
        base_delay: Duration::from_millis(100),
        max_delay: Duration::from_millis(350),
        multiplier: 2.0,
        ..RetryConfig::default()
    };
    assert_eq!(retry.delay_for(1), Duration::from_millis(100));
    assert_eq!(retry.delay_for(2), Duration::from_millis(200));
    assert_eq!(retry.delay_for(3), Duration::from_millis(350));
    assert_eq!(retry.delay_for(40), Duration::from_millis(350));
}

#[test]
fn load_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, StorageConfig::default());
}

#[test]
fn load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[circuit]\nfailure_threshold = 4\nrecovery_timeout = \"5s\"").unwrap();
    let config = StorageConfig::load(file.path()).unwrap();
    assert_eq!(config.circuit.failure_threshold, 4);
    assert_eq!(config.circuit.recovery_timeout, Duration::from_secs(5));
}

#[test]
fn testing_config_is_valid() {
    StorageConfig::for_testing().validate().unwrap();
}
