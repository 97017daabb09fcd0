use aws_sdk_dynamodb::error::{self as sdk_error, ProvideErrorMetadata};
use std::fmt;
use thiserror::Error;

/// Result type alias using the crate [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error codes the store reports for transient conditions.
const RETRYABLE_CODES: &[&str] = &[
    "InternalServerError",
    "LimitExceededException",
    "ProvisionedThroughputExceededException",
    "RequestLimitExceeded",
    "ServiceUnavailable",
    "Throttling",
    "ThrottlingException",
    "TooManyRequestsException",
];

/// Crate error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The table configuration is structurally invalid. Never retried.
    #[error("invalid table schema: {0}")]
    Configuration(#[from] ConfigurationError),
    /// A store call failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A value could not be converted to or from attribute values.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_dynamo::Error),
    /// A request could not be assembled.
    #[error("failed to build request: {0}")]
    Build(#[from] sdk_error::BuildError),
    /// A key is missing its hash or range component.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Every violation found while building a schema.
#[derive(Clone, Debug, Default, Eq, Error, PartialEq)]
#[error("{}", .violations.join("; "))]
pub struct ConfigurationError {
    /// Human readable description of each violation, in discovery order.
    pub violations: Vec<String>,
}

/// Failure reported by a [`crate::client::StoreClient`].
///
/// The `retryable` flag drives the pagination loop: retryable failures are
/// reissued unchanged, anything else aborts the batch call.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("store error{}: {message}", .code.as_deref().map(|code| format!(" ({code})")).unwrap_or_default())]
pub struct StoreError {
    /// Whether reissuing the same request may succeed.
    pub retryable: bool,
    /// Service error code, when the store reported one.
    pub code: Option<String>,
    /// Error description.
    pub message: String,
}

impl StoreError {
    /// Transient failure such as throttling.
    pub fn retryable(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            retryable: true,
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Permanent failure such as a validation error or denied access.
    pub fn fatal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            retryable: false,
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Classify an SDK error by its variant and service error code.
    pub fn from_sdk<E, R>(err: sdk_error::SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: fmt::Debug,
    {
        let message = sdk_error::DisplayErrorContext(&err).to_string();
        match &err {
            sdk_error::SdkError::TimeoutError(_) => Self {
                retryable: true,
                code: None,
                message,
            },
            sdk_error::SdkError::DispatchFailure(dispatch) => Self {
                retryable: dispatch.is_timeout() || dispatch.is_io(),
                code: None,
                message,
            },
            sdk_error::SdkError::ServiceError(service) => {
                let code = service.err().code().map(str::to_string);
                let retryable = code
                    .as_deref()
                    .is_some_and(|code| RETRYABLE_CODES.contains(&code));
                Self {
                    retryable,
                    code,
                    message,
                }
            }
            _ => Self {
                retryable: false,
                code: None,
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::single(
        vec!["hash key is required".to_string()],
        "invalid table schema: hash key is required"
    )]
    #[case::many(
        vec![
            "hash key is required".to_string(),
            "index `a` must declare a range key".to_string(),
        ],
        "invalid table schema: hash key is required; index `a` must declare a range key"
    )]
    fn test_configuration_error_display(#[case] violations: Vec<String>, #[case] expected: &str) {
        let configuration = ConfigurationError { violations };
        assert_eq!(
            Some(configuration.to_string().as_str()),
            expected.strip_prefix("invalid table schema: ")
        );
        let error: Error = configuration.into();
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::retryable(
        StoreError::retryable("ThrottlingException", "slow down"),
        true,
        "store error (ThrottlingException): slow down"
    )]
    #[case::fatal(
        StoreError::fatal("ValidationException", "bad key"),
        false,
        "store error (ValidationException): bad key"
    )]
    fn test_store_error(
        #[case] error: StoreError,
        #[case] retryable: bool,
        #[case] expected: &str,
    ) {
        assert_eq!(error.retryable, retryable);
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_unbuildable_request_is_fatal() {
        let err = sdk_error::SdkError::<
            aws_sdk_dynamodb::operation::batch_write_item::BatchWriteItemError,
            (),
        >::construction_failure(sdk_error::BuildError::missing_field(
            "request_items",
            "request items are required",
        ));
        let error = StoreError::from_sdk(err);
        assert!(!error.retryable);
        assert_eq!(error.code, None);
    }
}
