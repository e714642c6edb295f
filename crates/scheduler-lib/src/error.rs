//! Error types for the scheduler

use thiserror::Error;

/// Result alias used across the scheduler
pub type Result<T, E = SchedulerError> = std::result::Result<T, E>;

/// Request rejected before any provider call is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("\"tag key\": \"{0}\" is not a valid value")]
    UnknownTagKey(String),

    #[error("\"tag value\": \"{0}\" is not a valid value")]
    UnknownTagValue(String),

    #[error("no action for automation \"{automation}\" on resource \"{resource}\"")]
    UnsupportedAction { automation: String, resource: String },
}

/// Error reported by a provider API call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Scaling sizes that do not form a valid capacity triple
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("maxSize {max_size} is below minSize {min_size}")]
    MaxBelowMin { min_size: u32, max_size: u32 },

    #[error("desiredSize {desired_size} is outside [{min_size}, {max_size}]")]
    DesiredOutOfRange {
        min_size: u32,
        max_size: u32,
        desired_size: u32,
    },

    #[error("negative size {0}")]
    Negative(i32),
}

/// Failure decoding a stored scaling tag
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("tag value is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded tag value is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("decoded tag value is not a scaling config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that abort an invocation
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("tag search for {key}={value} on {resource_type} failed: {source}")]
    Lookup {
        key: String,
        value: String,
        resource_type: &'static str,
        #[source]
        source: ProviderError,
    },

    #[error("unrecognised {resource_type} ARN: {arn}")]
    MalformedArn {
        resource_type: &'static str,
        arn: String,
    },

    #[error("{operation} failed for {resource}: {source}")]
    Provider {
        operation: &'static str,
        resource: String,
        #[source]
        source: ProviderError,
    },

    #[error("scaling tag on node group {resource} cannot be decoded: {source}")]
    Descriptor {
        resource: String,
        #[source]
        source: CodecError,
    },
}

impl SchedulerError {
    pub fn provider(
        operation: &'static str,
        resource: impl Into<String>,
        source: ProviderError,
    ) -> Self {
        SchedulerError::Provider {
            operation,
            resource: resource.into(),
            source,
        }
    }
}
