// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Session storage engine: tier selection, resilience, and metrics

mod circuit;
mod handler;
mod manager;
mod monitor;
mod report;

pub use circuit::{CircuitRegistry, CircuitState, CircuitStatus};
pub use handler::StorageExceptionHandler;
pub use manager::{ManagerDeps, SessionStorageManager};
pub use monitor::{ExceptionRecord, MonitorSnapshot, SessionMetrics, StorageMonitor};
pub use report::{CleanupFailure, CleanupReport, FileCheck, FileGroup, IntegrityReport};
