//! Structured logging for scheduler events
//!
//! Every significant step of an invocation is emitted as a tracing event with
//! an `event` field, so the JSON log lines can be filtered per occurrence.

use crate::error::{ProviderError, ValidationError};
use crate::filter::SkipReason;
use crate::models::{Automation, EventDetails, NodeGroupRef, ResourceCategory, ScalingDescriptor};
use crate::provider::DbInstance;
use tracing::{error, info, warn};

/// Structured logger for scheduler events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    region: String,
}

impl StructuredLogger {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Log an inbound request before validation
    pub fn log_invocation(&self, details: &EventDetails) {
        info!(
            event = "invocation_received",
            region = %self.region,
            automation = %details.automation,
            resource = %details.resource,
            tag_key = %details.tag_key,
            tag_value = %details.tag_value,
            "Invocation received"
        );
    }

    /// Log a request rejected by validation
    pub fn log_rejected(&self, details: &EventDetails, reason: &ValidationError) {
        warn!(
            event = "invocation_rejected",
            region = %self.region,
            automation = %details.automation,
            resource = %details.resource,
            reason = %reason,
            "Event is not valid"
        );
    }

    pub fn log_lookup_failed(&self, tag_value: &str, resource_type: &str, err: &ProviderError) {
        error!(
            event = "lookup_failed",
            region = %self.region,
            tag_value = %tag_value,
            resource_type = %resource_type,
            code = %err.code,
            message = %err.message,
            "Couldn't search with the tag"
        );
    }

    pub fn log_located(&self, category: ResourceCategory, count: usize) {
        info!(
            event = "resources_located",
            region = %self.region,
            resource = %category,
            count = count,
            "Tagged resources located"
        );
    }

    pub fn log_skipped(&self, resource: &str, reason: &SkipReason) {
        info!(
            event = "resource_skipped",
            region = %self.region,
            resource_id = %resource,
            reason = %reason,
            "Resource left untouched"
        );
    }

    /// Descriptive metadata of a database, logged whether or not it is acted on
    pub fn log_db_inspected(&self, db: &DbInstance) {
        info!(
            event = "db_instance_inspected",
            region = %self.region,
            db = %db.identifier,
            status = %db.status,
            engine = %db.engine,
            multi_az = db.multi_az,
            "Inspected DB instance"
        );
    }

    pub fn log_provider_error(&self, operation: &str, resource: &str, err: &ProviderError) {
        error!(
            event = "provider_call_failed",
            region = %self.region,
            operation = %operation,
            resource_id = %resource,
            code = %err.code,
            message = %err.message,
            "Provider call failed"
        );
    }

    pub fn log_transitioned(
        &self,
        automation: Automation,
        category: ResourceCategory,
        resources: &[String],
    ) {
        if resources.is_empty() {
            info!(
                event = "resources_transitioned",
                region = %self.region,
                automation = %automation,
                resource = %category,
                count = 0,
                "No resources required a transition"
            );
        } else {
            info!(
                event = "resources_transitioned",
                region = %self.region,
                automation = %automation,
                resource = %category,
                count = resources.len(),
                resource_ids = ?resources,
                "Transition requested"
            );
        }
    }

    pub fn log_descriptor_saved(
        &self,
        nodegroup: &NodeGroupRef,
        scaling: &ScalingDescriptor,
        token: &str,
        replaced: bool,
    ) {
        info!(
            event = "descriptor_saved",
            region = %self.region,
            nodegroup = %nodegroup,
            scaling = %scaling,
            token = %token,
            replaced = replaced,
            "Scaling config recorded on node group tag"
        );
    }

    pub fn log_descriptor_missing(&self, nodegroup: &NodeGroupRef) {
        warn!(
            event = "descriptor_missing",
            region = %self.region,
            nodegroup = %nodegroup,
            "Node group has no scaling config tag, not starting it"
        );
    }

    pub fn log_nodegroup_scaled(
        &self,
        automation: Automation,
        nodegroup: &NodeGroupRef,
        scaling: &ScalingDescriptor,
    ) {
        info!(
            event = "nodegroup_scaled",
            region = %self.region,
            automation = %automation,
            nodegroup = %nodegroup,
            scaling = %scaling,
            "Node group scaling config updated"
        );
    }

    pub fn log_completed(&self, action: &str, affected: usize) {
        info!(
            event = "invocation_completed",
            region = %self.region,
            action = %action,
            affected = affected,
            "Invocation completed"
        );
    }

    /// Log handler cold start
    pub fn log_startup(&self, version: &str, page_size: i32) {
        info!(
            event = "handler_started",
            region = %self.region,
            version = %version,
            page_size = page_size,
            "Scheduler handler started"
        );
    }

    /// Log an invocation that ended in a propagated error
    pub fn log_invocation_error(&self, err: &dyn std::fmt::Display) {
        error!(
            event = "invocation_failed",
            region = %self.region,
            error = %err,
            "Invocation failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("ap-southeast-3");
        assert_eq!(logger.region(), "ap-southeast-3");
    }
}
