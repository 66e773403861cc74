//! Retry, circuit breaker, and delete idempotence.

use crate::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use sv_core::{CircuitConfig, ErrorKind, MonitorConfig, StorageError};
use sv_engine::{CircuitRegistry, StorageExceptionHandler, StorageMonitor};

fn handler(threshold: u32, clock: &FakeClock) -> StorageExceptionHandler<FakeClock> {
    let circuits = Arc::new(CircuitRegistry::new(&CircuitConfig {
        failure_threshold: threshold,
        recovery_timeout: Duration::from_secs(30),
    }));
    StorageExceptionHandler::new(
        StorageConfig::for_testing().retry,
        circuits,
        Arc::new(StorageMonitor::new(&MonitorConfig::default())),
        clock.clone(),
    )
}

#[tokio::test]
async fn circuit_opens_after_threshold_and_recovers() {
    let clock = FakeClock::new();
    let handler = handler(3, &clock);
    let attempts = AtomicU32::new(0);
    let counter = &attempts;

    let failing = move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Err::<(), _>(StorageError::new(ErrorKind::Network, "s", "blob.read", "reset"))
    };

    for _ in 0..3 {
        let err = handler.execute("blob.read", "s", failing).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::MaxRetriesExceeded);
    }
    let before = attempts.load(Ordering::SeqCst);

    let err = handler.execute("blob.read", "s", failing).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::CircuitBreakerOpen);
    assert_eq!(attempts.load(Ordering::SeqCst), before);

    clock.advance(Duration::from_secs(31));
    let value = handler
        .execute("blob.read", "s", || async { Ok::<_, StorageError>(7) })
        .await
        .unwrap();
    assert_eq!(value, 7);
}

#[tokio::test]
async fn circuits_are_independent_per_operation() {
    let clock = FakeClock::new();
    let handler = handler(1, &clock);

    let err = handler
        .execute("document.get", "s", || async {
            Err::<(), _>(StorageError::new(ErrorKind::Timeout, "s", "document.get", "slow"))
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::MaxRetriesExceeded);

    let ok = handler
        .execute("blob.write", "s", || async { Ok::<_, StorageError>(()) })
        .await;
    assert!(ok.is_ok());
}

#[tokio::test]
async fn deleting_unknown_and_twice_is_safe() {
    let vault = Vault::with_defaults();
    assert!(!vault.manager.delete("nobody").await.unwrap());

    vault
        .manager
        .store("s", &FileSet::new().with_database_file("a", text(100)))
        .await
        .unwrap();
    assert!(vault.manager.delete("s").await.unwrap());
    assert!(!vault.manager.delete("s").await.unwrap());
    assert!(vault.documents.is_empty());
}

#[tokio::test]
async fn transient_document_outage_is_absorbed() {
    let vault = Vault::with_defaults();
    vault
        .documents
        .fail_next(DocumentOp::Upsert, StoreError::Busy("lock wait".into()));

    vault
        .manager
        .store("s", &FileSet::new().with_database_file("a", text(100)))
        .await
        .unwrap();

    assert_eq!(vault.documents.call_count(DocumentOp::Upsert), 2);
    assert!(vault.documents.record("s").is_some());
}
