//! Tests for rib error types.

use std::any::Any;

use ribs::error::extract_panic_message;
use ribs::{BundleError, LifecycleEvent, LifecycleState, RibError};

#[test]
fn test_extract_panic_message_str() {
    let panic: Box<dyn Any + Send> = Box::new("detach exploded");
    assert_eq!(extract_panic_message(&panic), "detach exploded");
}

#[test]
fn test_extract_panic_message_string() {
    let panic: Box<dyn Any + Send> = Box::new(String::from("detach exploded"));
    assert_eq!(extract_panic_message(&panic), "detach exploded");
}

#[test]
fn test_extract_panic_message_unknown() {
    let panic: Box<dyn Any + Send> = Box::new(7u8);
    assert_eq!(extract_panic_message(&panic), "Unknown panic");
}

#[test]
fn test_invalid_transition_display() {
    let error = RibError::InvalidTransition {
        rib: "LoggedIn".to_string(),
        event: LifecycleEvent::AttachView,
        state: LifecycleState::Created,
    };
    let display = error.to_string();
    assert!(display.contains("LoggedIn"));
    assert!(display.contains("attach a view"));
    assert!(display.contains("created"));
    assert!(error.is_misuse());
    assert!(!error.is_cleanup_failure());
}

#[test]
fn test_cleanup_failure_classification() {
    let error = RibError::CleanupFailed {
        rib: "Game".to_string(),
        message: "boom".to_string(),
    };
    assert!(error.is_cleanup_failure());
    assert!(!error.is_misuse());
    assert!(error.to_string().contains("boom"));
}

#[test]
fn test_bundle_error_converts() {
    let error: RibError = BundleError::WrongKind("score".to_string()).into();
    assert!(matches!(error, RibError::Bundle(_)));
    assert!(error.to_string().contains("score"));
}
