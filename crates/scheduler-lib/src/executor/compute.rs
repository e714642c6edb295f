//! EC2 instance start/stop

use super::{async_trait, Pipeline};
use crate::error::{ProviderError, Result, SchedulerError};
use crate::filter::{self, Verdict};
use crate::locator::ResourceLocator;
use crate::models::{Automation, ResourceCategory, ResourceRef, TagSelector};
use crate::observability::StructuredLogger;
use crate::provider::{ComputeApi, InstanceStatus};
use std::sync::Arc;

/// Starts and stops instances with one batched call per invocation
pub struct ComputePipeline {
    locator: ResourceLocator,
    compute: Arc<dyn ComputeApi>,
    logger: StructuredLogger,
}

impl ComputePipeline {
    pub fn new(
        locator: ResourceLocator,
        compute: Arc<dyn ComputeApi>,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            locator,
            compute,
            logger,
        }
    }

    /// Start every instance that is not already running
    pub async fn start(&self, instance_ids: Vec<String>) -> Result<Vec<String>> {
        let pending = self
            .select(instance_ids, filter::instance_start_verdict)
            .await?;
        if pending.is_empty() {
            self.logger
                .log_transitioned(Automation::Start, ResourceCategory::Ec2, &[]);
            return Ok(Vec::new());
        }

        let started = self
            .compute
            .start_instances(&pending)
            .await
            .map_err(|e| self.failed("StartInstances", pending.join(","), e))?;

        self.logger
            .log_transitioned(Automation::Start, ResourceCategory::Ec2, &started);
        Ok(started)
    }

    /// Stop every instance that is still running
    pub async fn stop(&self, instance_ids: Vec<String>) -> Result<Vec<String>> {
        let pending = self
            .select(instance_ids, filter::instance_stop_verdict)
            .await?;
        if pending.is_empty() {
            self.logger
                .log_transitioned(Automation::Stop, ResourceCategory::Ec2, &[]);
            return Ok(Vec::new());
        }

        let stopped = self
            .compute
            .stop_instances(&pending)
            .await
            .map_err(|e| self.failed("StopInstances", pending.join(","), e))?;

        self.logger
            .log_transitioned(Automation::Stop, ResourceCategory::Ec2, &stopped);
        Ok(stopped)
    }

    /// Describe each instance in turn and keep those the verdict applies to
    async fn select(
        &self,
        instance_ids: Vec<String>,
        verdict: fn(&[InstanceStatus]) -> Verdict,
    ) -> Result<Vec<String>> {
        let mut pending = Vec::with_capacity(instance_ids.len());

        for instance_id in instance_ids {
            let statuses = self
                .compute
                .describe_instance_status(&instance_id)
                .await
                .map_err(|e| self.failed("DescribeInstanceStatus", instance_id.clone(), e))?;

            match verdict(&statuses) {
                Verdict::Apply => pending.push(instance_id),
                Verdict::Skip(reason) => self.logger.log_skipped(&instance_id, &reason),
            }
        }

        Ok(pending)
    }

    fn failed(
        &self,
        operation: &'static str,
        resource: String,
        source: ProviderError,
    ) -> SchedulerError {
        self.logger.log_provider_error(operation, &resource, &source);
        SchedulerError::provider(operation, resource, source)
    }
}

#[async_trait]
impl Pipeline for ComputePipeline {
    fn category(&self) -> ResourceCategory {
        ResourceCategory::Ec2
    }

    async fn run(&self, automation: Automation, selector: &TagSelector) -> Result<Vec<ResourceRef>> {
        let instance_ids = self.locator.locate_instances(selector).await?;

        let affected = match automation {
            Automation::Start => self.start(instance_ids).await?,
            Automation::Stop => self.stop(instance_ids).await?,
        };

        Ok(affected.into_iter().map(ResourceRef::Instance).collect())
    }
}
