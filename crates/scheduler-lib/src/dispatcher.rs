//! Request validation, routing and result rendering
//!
//! A request is validated against the tag vocabulary before anything talks
//! to the provider; a rejected request yields a `Failed` envelope. Accepted
//! requests are routed by (automation, resource) to a pipeline. Provider
//! failures are not turned into envelopes; they propagate to the caller.

use crate::config::SchedulerConfig;
use crate::error::{Result, ValidationError};
use crate::executor::{ComputePipeline, DatabasePipeline, NodeGroupPipeline, Pipeline};
use crate::locator::ResourceLocator;
use crate::models::{ActionRequest, ActionResult, Automation, InvocationEvent, ResourceCategory};
use crate::observability::StructuredLogger;
use crate::provider::Clients;
use std::collections::HashMap;
use std::sync::Arc;

/// Route table: every supported (automation, resource) pair and its label
const ROUTES: [(Automation, ResourceCategory, &str); 6] = [
    (Automation::Stop, ResourceCategory::Ec2, "Stop EC2 instance"),
    (Automation::Start, ResourceCategory::Ec2, "Start EC2 instance"),
    (Automation::Stop, ResourceCategory::Rds, "Stop RDS"),
    (Automation::Start, ResourceCategory::Rds, "Start RDS"),
    (Automation::Stop, ResourceCategory::Eks, "Stop EKS node group"),
    (Automation::Start, ResourceCategory::Eks, "Start EKS node group"),
];

/// Label plus the pipeline serving it
#[derive(Clone)]
pub struct Route {
    pub label: &'static str,
    pub pipeline: Arc<dyn Pipeline>,
}

pub struct Dispatcher {
    routes: HashMap<(Automation, ResourceCategory), Route>,
    logger: StructuredLogger,
}

impl Dispatcher {
    /// Build the standard pipelines over the given provider clients
    pub fn new(clients: Clients, config: &SchedulerConfig) -> Self {
        let logger = StructuredLogger::new(config.region.as_str());
        let locator = ResourceLocator::new(clients.tagging, config.page_size(), logger.clone());

        let pipelines: Vec<Arc<dyn Pipeline>> = vec![
            Arc::new(ComputePipeline::new(
                locator.clone(),
                clients.compute,
                logger.clone(),
            )),
            Arc::new(DatabasePipeline::new(
                locator.clone(),
                clients.database,
                logger.clone(),
            )),
            Arc::new(NodeGroupPipeline::new(
                locator,
                clients.nodegroups,
                logger.clone(),
            )),
        ];

        Self::with_pipelines(pipelines, logger)
    }

    /// Route every known (automation, resource) pair to the pipeline serving
    /// that resource; pairs without a pipeline are rejected at dispatch
    pub fn with_pipelines(pipelines: Vec<Arc<dyn Pipeline>>, logger: StructuredLogger) -> Self {
        let by_category: HashMap<ResourceCategory, Arc<dyn Pipeline>> = pipelines
            .into_iter()
            .map(|pipeline| (pipeline.category(), pipeline))
            .collect();

        let routes = ROUTES
            .iter()
            .filter_map(|&(automation, category, label)| {
                by_category.get(&category).map(|pipeline| {
                    (
                        (automation, category),
                        Route {
                            label,
                            pipeline: pipeline.clone(),
                        },
                    )
                })
            })
            .collect();

        Self { routes, logger }
    }

    pub fn route(&self, automation: Automation, category: ResourceCategory) -> Option<&Route> {
        self.routes.get(&(automation, category))
    }

    /// Handle one invocation on behalf of `account_id`
    pub async fn dispatch(&self, event: &InvocationEvent, account_id: &str) -> Result<ActionResult> {
        self.logger.log_invocation(&event.details);

        let request = match ActionRequest::from_details(&event.details) {
            Ok(request) => request,
            Err(reason) => {
                self.logger.log_rejected(&event.details, &reason);
                return Ok(ActionResult::failed(account_id));
            }
        };

        let Some(route) = self.route(request.automation, request.resource) else {
            let reason = ValidationError::UnsupportedAction {
                automation: event.details.automation.clone(),
                resource: event.details.resource.clone(),
            };
            self.logger.log_rejected(&event.details, &reason);
            return Ok(ActionResult::failed(account_id));
        };

        let affected = route
            .pipeline
            .run(request.automation, &request.selector)
            .await?;

        self.logger.log_completed(route.label, affected.len());
        Ok(ActionResult::successful(account_id, route.label, affected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_labels_are_unique() {
        let mut labels: Vec<_> = ROUTES.iter().map(|(_, _, label)| *label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), ROUTES.len());
    }

    #[test]
    fn test_every_pair_has_a_route() {
        for category in ResourceCategory::ALL {
            for automation in [Automation::Start, Automation::Stop] {
                assert!(ROUTES
                    .iter()
                    .any(|&(a, c, _)| a == automation && c == category));
            }
        }
    }

    #[test]
    fn test_dispatcher_without_pipelines_has_no_routes() {
        let dispatcher = Dispatcher::with_pipelines(Vec::new(), StructuredLogger::new("ap-east-1"));
        assert!(dispatcher
            .route(Automation::Stop, ResourceCategory::Ec2)
            .is_none());
    }
}
