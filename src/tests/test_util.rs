use std::sync::Once;
use uuid::Uuid;

use crate::analysis::{FileKind, SourceDocument};
use crate::core::config::AnalysisConfig;

static INIT: Once = Once::new();

/// One-time logger setup shared by unit tests.
pub fn setup() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// A loaded document with a fresh id, as the storage layer would return it.
pub fn source_document(filename: &str, kind: FileKind, data: &[u8]) -> SourceDocument {
    SourceDocument {
        id: Uuid::new_v4(),
        filename: filename.to_string(),
        kind,
        data: data.to_vec(),
    }
}

/// Default limits with the allow-list narrowed to `extensions`.
pub fn analysis_config_allowing(extensions: &[&str]) -> AnalysisConfig {
    AnalysisConfig {
        allowed_extensions: extensions.iter().map(|e| e.to_string()).collect(),
        ..AnalysisConfig::default()
    }
}

#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(err) => panic!("Expected Ok, got Err: {:?}", err),
        }
    };
}

/// Unwraps an `ApiResult` error, failing the test on `Ok`.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(val) => panic!("Expected Err, got Ok: {:?}", val),
            Err(err) => err,
        }
    };
}

/// Asserts an `ApiResult` failed as a 400 with exactly `message`.
#[macro_export]
macro_rules! assert_validation_err {
    ($expr:expr, $message:expr) => {{
        let err = $crate::assert_err!($expr);
        assert!(
            matches!(err, $crate::core::shared::error::ApiError::Validation(_)),
            "Expected a validation error, got {:?}",
            err
        );
        assert_eq!(err.to_string(), $message);
    }};
}
