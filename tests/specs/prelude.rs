//! Shared fixtures for behavioral specs.

#![allow(dead_code)]

pub use sv_adapters::{BlobOp, DocumentOp, FakeBlobStore, FakeDocumentStore, StoreError};
pub use sv_core::{FakeClock, FileSet, SessionStorage, StorageConfig};
pub use sv_engine::{ManagerDeps, SessionStorageManager};

pub type Manager = SessionStorageManager<FakeDocumentStore, FakeBlobStore, FakeClock>;

pub struct Vault {
    pub manager: Manager,
    pub documents: FakeDocumentStore,
    pub blobs: FakeBlobStore,
    pub clock: FakeClock,
}

impl Vault {
    pub fn new(config: StorageConfig) -> Self {
        let documents = FakeDocumentStore::new();
        let blobs = FakeBlobStore::new();
        let clock = FakeClock::new();
        let manager = SessionStorageManager::new(
            ManagerDeps::new(documents.clone(), blobs.clone()),
            config,
            clock.clone(),
        );
        Self {
            manager,
            documents,
            blobs,
            clock,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(StorageConfig::for_testing())
    }
}

/// Low-entropy text of exactly `len` bytes
pub fn text(len: usize) -> Vec<u8> {
    let line = b"the quick brown fox jumps over the lazy dog\n";
    line.iter().copied().cycle().take(len).collect()
}

/// Deterministic high-entropy bytes of exactly `len` bytes
pub fn binary(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x1234_5678;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        })
        .collect()
}
