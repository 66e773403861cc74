// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sv-core: pure domain for the session blob storage engine
//!
//! This crate provides:
//! - Shard sizing against the 16 MiB document ceiling
//! - Data-type detection and compression-ratio estimation
//! - Compression codecs and the canonical file-group encodings
//! - The storage error taxonomy and advisory failure classifiers
//! - The persisted session record and its configuration

pub mod clock;
pub mod id;

pub mod classify;
pub mod codec;
pub mod config;
pub mod error;
pub mod files;
pub mod record;
pub mod sizing;
pub mod strategy;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use codec::{Codec, CodecError, CompressionType, StandardCodec};
pub use config::{
    CircuitConfig, ConfigError, DownloadLimits, MonitorConfig, RetryConfig, StorageConfig,
    TierConfig,
};
pub use error::{ErrorKind, RetryPolicy, StorageError};
pub use files::{FileMap, FileSet, FileSetError};
pub use id::{BlobId, IdGen, SequentialIdGen, UuidIdGen};
pub use record::{Bucket, InlineFiles, OverflowFiles, SessionRecord, SessionStorage};
pub use sizing::SizingError;
pub use strategy::{DataType, ShardPlan};
