//! Cloud provider seam
//!
//! Each control-plane service the scheduler talks to sits behind its own
//! trait so executors can be driven by a fake in tests. [`AwsProvider`]
//! implements all of them on top of the AWS SDK.

mod aws;

pub use aws::AwsProvider;

use crate::error::ProviderError;
use crate::models::{NodeGroupRef, ScalingDescriptor, TagSelector};
use std::collections::HashMap;
use std::sync::Arc;

pub use async_trait::async_trait;

/// One status record returned by an instance status query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceStatus {
    pub instance_id: String,
    /// Instance state name (`running`, `stopping`, ...)
    pub state: Option<String>,
}

/// Live description of a database instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbInstance {
    pub identifier: String,
    pub status: String,
    pub engine: String,
    pub multi_az: bool,
}

/// Live description of a managed node group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeGroup {
    pub name: String,
    pub arn: String,
    pub scaling: ScalingDescriptor,
    pub tags: HashMap<String, String>,
}

/// Tag search across resource types
#[async_trait]
pub trait TaggingApi: Send + Sync {
    /// ARNs of resources of `resource_type` carrying the selector's tag,
    /// limited to the first page of `per_page` matches
    async fn get_resources(
        &self,
        selector: &TagSelector,
        resource_type: &str,
        per_page: i32,
    ) -> Result<Vec<String>, ProviderError>;
}

/// Virtual machine instances
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Status records for one instance; empty when the instance is not running
    async fn describe_instance_status(
        &self,
        instance_id: &str,
    ) -> Result<Vec<InstanceStatus>, ProviderError>;

    /// Ids the provider reports as starting
    async fn start_instances(&self, instance_ids: &[String]) -> Result<Vec<String>, ProviderError>;

    /// Ids the provider reports as stopping
    async fn stop_instances(&self, instance_ids: &[String]) -> Result<Vec<String>, ProviderError>;
}

/// Managed database instances
#[async_trait]
pub trait DatabaseApi: Send + Sync {
    async fn describe_db_instance(&self, identifier: &str) -> Result<DbInstance, ProviderError>;

    /// Returns the identifier echoed by the provider
    async fn start_db_instance(&self, identifier: &str) -> Result<String, ProviderError>;

    /// Returns the identifier echoed by the provider
    async fn stop_db_instance(&self, identifier: &str) -> Result<String, ProviderError>;
}

/// Managed Kubernetes node groups
#[async_trait]
pub trait NodeGroupApi: Send + Sync {
    async fn describe_nodegroup(&self, nodegroup: &NodeGroupRef) -> Result<NodeGroup, ProviderError>;

    /// Create or overwrite a single tag on a resource
    async fn tag_resource(&self, arn: &str, key: &str, value: &str) -> Result<(), ProviderError>;

    async fn update_scaling_config(
        &self,
        nodegroup: &NodeGroupRef,
        scaling: ScalingDescriptor,
    ) -> Result<(), ProviderError>;
}

/// Provider clients handed to the scheduler at construction
#[derive(Clone)]
pub struct Clients {
    pub tagging: Arc<dyn TaggingApi>,
    pub compute: Arc<dyn ComputeApi>,
    pub database: Arc<dyn DatabaseApi>,
    pub nodegroups: Arc<dyn NodeGroupApi>,
}

impl Clients {
    /// Use one provider value for every service
    pub fn from_provider<P>(provider: Arc<P>) -> Self
    where
        P: TaggingApi + ComputeApi + DatabaseApi + NodeGroupApi + 'static,
    {
        Self {
            tagging: provider.clone(),
            compute: provider.clone(),
            database: provider.clone(),
            nodegroups: provider,
        }
    }
}
