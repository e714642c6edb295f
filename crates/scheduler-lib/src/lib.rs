//! Tag-driven power scheduler for cloud resources
//!
//! This crate provides the core functionality for:
//! - Locating EC2 instances, RDS instances and EKS node groups by schedule tag
//! - Skipping resources already in (or unable to reach) the requested state
//! - Starting and stopping them, preserving node group capacity in a tag
//! - Validating and routing invocations into a uniform result envelope

pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod filter;
pub mod locator;
pub mod models;
pub mod observability;
pub mod provider;

pub use codec::{decode, encode, EncodedDescriptor};
pub use config::SchedulerConfig;
pub use dispatcher::Dispatcher;
pub use error::{
    CodecError, DescriptorError, ProviderError, Result, SchedulerError, ValidationError,
};
pub use models::*;
pub use observability::StructuredLogger;
pub use provider::{AwsProvider, Clients};
