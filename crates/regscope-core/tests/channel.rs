//! Tests for the operation channel's failure paths

mod support;

use std::thread;
use std::time::Duration;

use regscope_core::channel::OperationChannel;
use regscope_core::error::{CorruptionKind, RegscopeError};
use regscope_core::types::ThreadId;
use support::ScriptedBackend;

#[test]
fn test_timeout_does_not_block_caller()
{
    let backend = ScriptedBackend::new(&["eax"]).values_delay(Duration::from_millis(300));
    let channel = OperationChannel::spawn(backend, Duration::from_millis(50)).unwrap();

    match channel.register_values(ThreadId(1)) {
        Err(RegscopeError::Timeout { operation, after }) => {
            assert_eq!(operation, "register-values (thread 1)");
            assert_eq!(after, Duration::from_millis(50));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[test]
fn test_channel_recovers_after_timeout()
{
    let backend = ScriptedBackend::new(&["eax"]).values_delay(Duration::from_millis(200));
    let calls = backend.calls();
    let channel = OperationChannel::spawn(backend, Duration::from_millis(50)).unwrap();

    assert!(channel.register_values(ThreadId(1)).is_err());
    // Let the worker finish the abandoned request
    thread::sleep(Duration::from_millis(400));

    assert_eq!(channel.register_names().unwrap(), vec!["eax"]);
    assert_eq!(calls.values(), 1);
    assert!(!channel.is_closed());
}

#[test]
fn test_backend_error_is_ordinary()
{
    let backend = ScriptedBackend::new(&["eax"]).unknown_thread(ThreadId(7));
    let channel = OperationChannel::spawn(backend, Duration::from_secs(5)).unwrap();

    let err = channel.register_values(ThreadId(7)).unwrap_err();
    assert!(!err.is_corrupting());
    assert_eq!(err.describe(), err.to_string());
    // The worker keeps serving
    assert!(channel.register_values(ThreadId(1)).is_ok());
}

#[test]
fn test_backend_panic_is_corrupting()
{
    let backend = ScriptedBackend::new(&["eax"]).panic_on(ThreadId(9));
    let channel = OperationChannel::spawn(backend, Duration::from_secs(5)).unwrap();

    let err = channel.register_values(ThreadId(9)).unwrap_err();
    match &err {
        RegscopeError::Corrupted { kind, origin, message } => {
            assert_eq!(*kind, CorruptionKind::IndexOutOfBounds);
            assert!(origin.contains("register-values (thread 9)"), "{origin}");
            assert!(message.contains("index out of bounds"), "{message}");
        }
        other => panic!("expected corruption, got {other:?}"),
    }
    assert!(err.is_corrupting());
    let description = err.describe();
    assert!(description.contains("index-out-of-bounds"), "{description}");
    assert!(description.contains("regscope-backend"), "{description}");
}

#[test]
fn test_channel_stops_after_panic()
{
    let backend = ScriptedBackend::new(&["eax"]).panic_on(ThreadId(3));
    let calls = backend.calls();
    let channel = OperationChannel::spawn(backend, Duration::from_secs(5)).unwrap();

    assert!(channel.register_values(ThreadId(3)).unwrap_err().is_corrupting());
    assert!(matches!(channel.register_names(), Err(RegscopeError::Disconnected)));
    assert!(matches!(channel.register_values(ThreadId(1)), Err(RegscopeError::Disconnected)));
    assert!(channel.is_closed());
    assert_eq!(calls.names(), 0);
}
