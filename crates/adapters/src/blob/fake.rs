// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory blob store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::BlobStore;
use crate::StoreError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use sv_core::{BlobId, Bucket, IdGen, SequentialIdGen};

/// Blob store operations, used to target injected faults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobOp {
    Write,
    Read,
    Delete,
}

/// Recorded blob store call
#[derive(Debug, Clone, PartialEq)]
pub enum BlobCall {
    Write { bucket: Bucket, len: usize },
    Read { bucket: Bucket, id: BlobId },
    Delete { bucket: Bucket, id: BlobId },
}

impl BlobCall {
    pub fn op(&self) -> BlobOp {
        match self {
            BlobCall::Write { .. } => BlobOp::Write,
            BlobCall::Read { .. } => BlobOp::Read,
            BlobCall::Delete { .. } => BlobOp::Delete,
        }
    }
}

#[derive(Default)]
struct Faults {
    queued: HashMap<BlobOp, VecDeque<StoreError>>,
    sticky: HashMap<BlobOp, StoreError>,
}

/// Fake blob store for testing
#[derive(Clone, Default)]
pub struct FakeBlobStore {
    objects: Arc<Mutex<HashMap<(Bucket, BlobId), Vec<u8>>>>,
    calls: Arc<Mutex<Vec<BlobCall>>>,
    faults: Arc<Mutex<Faults>>,
    id_gen: SequentialIdGen,
}

impl FakeBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<BlobCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self, op: BlobOp) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|c| c.op() == op)
            .count()
    }

    /// Peek at an object without recording a call
    pub fn object(&self, bucket: Bucket, id: &BlobId) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(bucket, id.clone()))
            .cloned()
    }

    /// Store an object under a caller-chosen id
    pub fn put(&self, bucket: Bucket, id: BlobId, data: Vec<u8>) {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((bucket, id), data);
    }

    /// Drop an object behind the engine's back
    pub fn lose(&self, bucket: Bucket, id: &BlobId) {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&(bucket, id.clone()));
    }

    /// Number of stored objects across all buckets
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fail_next(&self, op: BlobOp, error: StoreError) {
        self.faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .queued
            .entry(op)
            .or_default()
            .push_back(error);
    }

    pub fn fail_always(&self, op: BlobOp, error: StoreError) {
        self.faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .sticky
            .insert(op, error);
    }

    pub fn heal(&self) {
        let mut faults = self.faults.lock().unwrap_or_else(|e| e.into_inner());
        faults.queued.clear();
        faults.sticky.clear();
    }

    fn enter(&self, call: BlobCall) -> Result<(), StoreError> {
        let op = call.op();
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);

        let mut faults = self.faults.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(error) = faults.queued.get_mut(&op).and_then(VecDeque::pop_front) {
            return Err(error);
        }
        match faults.sticky.get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn write(&self, bucket: Bucket, data: &[u8]) -> Result<BlobId, StoreError> {
        self.enter(BlobCall::Write {
            bucket,
            len: data.len(),
        })?;
        let id = self.id_gen.next();
        self.put(bucket, id.clone(), data.to_vec());
        Ok(id)
    }

    async fn read(&self, bucket: Bucket, id: &BlobId) -> Result<Option<Vec<u8>>, StoreError> {
        self.enter(BlobCall::Read {
            bucket,
            id: id.clone(),
        })?;
        Ok(self.object(bucket, id))
    }

    async fn delete(&self, bucket: Bucket, id: &BlobId) -> Result<bool, StoreError> {
        self.enter(BlobCall::Delete {
            bucket,
            id: id.clone(),
        })?;
        Ok(self
            .objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&(bucket, id.clone()))
            .is_some())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
