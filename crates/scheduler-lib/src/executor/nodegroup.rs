//! EKS node group start/stop
//!
//! Stopping a node group scales it to zero, which would lose its capacity.
//! The live scaling config is therefore written to the `nodegroup_scaling`
//! tag first, and starting reads it back. A node group without that tag is
//! never started.

use super::{async_trait, Pipeline};
use crate::codec::{self, EncodedDescriptor};
use crate::error::{ProviderError, Result, SchedulerError};
use crate::locator::ResourceLocator;
use crate::models::{
    Automation, NodeGroupRef, ResourceCategory, ResourceRef, ScalingDescriptor, TagSelector,
    SCALING_TAG_KEY,
};
use crate::observability::StructuredLogger;
use crate::provider::{NodeGroup, NodeGroupApi};
use std::sync::Arc;

pub struct NodeGroupPipeline {
    locator: ResourceLocator,
    nodegroups: Arc<dyn NodeGroupApi>,
    logger: StructuredLogger,
}

impl NodeGroupPipeline {
    pub fn new(
        locator: ResourceLocator,
        nodegroups: Arc<dyn NodeGroupApi>,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            locator,
            nodegroups,
            logger,
        }
    }

    /// Restore each node group to the capacity stored in its scaling tag
    pub async fn start(&self, nodegroups: Vec<NodeGroupRef>) -> Result<Vec<NodeGroupRef>> {
        let mut started = Vec::with_capacity(nodegroups.len());

        for nodegroup in nodegroups {
            let described = self.describe(&nodegroup).await?;

            let token = match described.tags.get(SCALING_TAG_KEY) {
                Some(value) if !value.is_empty() => EncodedDescriptor::from_tag(value.as_str()),
                _ => {
                    self.logger.log_descriptor_missing(&nodegroup);
                    continue;
                }
            };

            let scaling = codec::decode(&token).map_err(|source| SchedulerError::Descriptor {
                resource: nodegroup.to_string(),
                source,
            })?;

            self.nodegroups
                .update_scaling_config(&nodegroup, scaling)
                .await
                .map_err(|e| self.failed("UpdateNodegroupConfig", &nodegroup, e))?;

            self.logger
                .log_nodegroup_scaled(Automation::Start, &nodegroup, &scaling);
            started.push(nodegroup);
        }

        Ok(started)
    }

    /// Record each node group's live capacity on its scaling tag, then scale
    /// it to zero
    pub async fn stop(&self, nodegroups: Vec<NodeGroupRef>) -> Result<Vec<NodeGroupRef>> {
        let mut stopped = Vec::with_capacity(nodegroups.len());

        for nodegroup in nodegroups {
            let described = self.describe(&nodegroup).await?;

            // The tag write must succeed before capacity is removed
            self.save_descriptor(&nodegroup, &described).await?;

            self.nodegroups
                .update_scaling_config(&nodegroup, ScalingDescriptor::STOPPED)
                .await
                .map_err(|e| self.failed("UpdateNodegroupConfig", &nodegroup, e))?;

            self.logger
                .log_nodegroup_scaled(Automation::Stop, &nodegroup, &ScalingDescriptor::STOPPED);
            stopped.push(nodegroup);
        }

        Ok(stopped)
    }

    async fn describe(&self, nodegroup: &NodeGroupRef) -> Result<NodeGroup> {
        self.nodegroups
            .describe_nodegroup(nodegroup)
            .await
            .map_err(|e| self.failed("DescribeNodegroup", nodegroup, e))
    }

    async fn save_descriptor(&self, nodegroup: &NodeGroupRef, described: &NodeGroup) -> Result<()> {
        let token = codec::encode(&described.scaling);
        let replaced = described.tags.contains_key(SCALING_TAG_KEY);

        self.nodegroups
            .tag_resource(&described.arn, SCALING_TAG_KEY, token.as_str())
            .await
            .map_err(|e| self.failed("TagResource", nodegroup, e))?;

        self.logger
            .log_descriptor_saved(nodegroup, &described.scaling, token.as_str(), replaced);
        Ok(())
    }

    fn failed(
        &self,
        operation: &'static str,
        nodegroup: &NodeGroupRef,
        source: ProviderError,
    ) -> SchedulerError {
        let resource = nodegroup.to_string();
        self.logger.log_provider_error(operation, &resource, &source);
        SchedulerError::provider(operation, resource, source)
    }
}

#[async_trait]
impl Pipeline for NodeGroupPipeline {
    fn category(&self) -> ResourceCategory {
        ResourceCategory::Eks
    }

    async fn run(&self, automation: Automation, selector: &TagSelector) -> Result<Vec<ResourceRef>> {
        let nodegroups = self.locator.locate_nodegroups(selector).await?;

        let affected = match automation {
            Automation::Start => self.start(nodegroups).await?,
            Automation::Stop => self.stop(nodegroups).await?,
        };

        Ok(affected.into_iter().map(ResourceRef::NodeGroup).collect())
    }
}
