//! Document store failure classification.

use std::time::Duration;
use sv_core::classify::{DocumentStoreAction, DocumentStoreFailureAnalysis};

fn action_for(cause: &str) -> DocumentStoreAction {
    DocumentStoreFailureAnalysis::new("s", "document.upsert", cause)
        .handling_strategy()
        .action
}

#[test]
fn canned_causes_map_to_actions() {
    assert!(matches!(
        action_for("connect ECONNREFUSED: connection refused"),
        DocumentStoreAction::DelayedRetry { delay } if delay > Duration::ZERO
    ));
    assert_eq!(action_for("operation timed out"), DocumentStoreAction::ImmediateRetry);
    assert_eq!(action_for("401 Unauthorized"), DocumentStoreAction::Reject);
    assert_eq!(action_for("document too large"), DocumentStoreAction::Reject);
    assert_eq!(action_for("disk full on primary"), DocumentStoreAction::FallbackToLocal);
}

#[test]
fn classification_ignores_case() {
    assert_eq!(action_for("DISK FULL"), DocumentStoreAction::FallbackToLocal);
}
