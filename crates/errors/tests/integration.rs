//! Integration tests for error types

use pkgrelay_errors::{CapabilityError, Error, InstallError};

#[test]
fn domain_errors_convert_into_the_root_enum() {
    let install_err = InstallError::MultipleBaseFiles {
        package: "com.example.app".into(),
    };
    let err: Error = install_err.into();
    assert!(matches!(err, Error::Install(_)));

    let cap_err = CapabilityError::ElevatedContextDead;
    let err: Error = cap_err.into();
    assert!(matches!(err, Error::Capability(_)));
}

#[test]
fn error_display_carries_the_detail() {
    let err = InstallError::CommitTimeout { seconds: 5 };
    assert_eq!(err.to_string(), "no install result within 5s");

    let err = CapabilityError::PermissionDenied {
        operation: "owner lookup".into(),
    };
    assert_eq!(err.to_string(), "permission denied: owner lookup");
}

#[test]
fn errors_clone_across_task_boundaries() {
    let err = InstallError::StreamUnavailable {
        name: "split1.apk".into(),
    };
    let cloned = err.clone();
    assert_eq!(err.to_string(), cloned.to_string());
}

#[test]
fn io_errors_convert_with_kind_preserved() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: Error = io_err.into();
    match err {
        Error::Io { kind, .. } => assert_eq!(kind, std::io::ErrorKind::PermissionDenied),
        other => panic!("unexpected error: {other}"),
    }
}
