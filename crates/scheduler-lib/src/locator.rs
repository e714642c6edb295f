//! Resource discovery through the tagging API
//!
//! Only the first page of matches is read. Resources past the page size
//! are silently left out of the invocation.

use crate::error::{Result, SchedulerError};
use crate::models::{NodeGroupRef, ResourceCategory, ResourceRef, TagSelector};
use crate::observability::StructuredLogger;
use crate::provider::TaggingApi;
use std::sync::Arc;

/// Finds tagged resources of one category
#[derive(Clone)]
pub struct ResourceLocator {
    tagging: Arc<dyn TaggingApi>,
    page_size: i32,
    logger: StructuredLogger,
}

impl ResourceLocator {
    pub fn new(tagging: Arc<dyn TaggingApi>, page_size: i32, logger: StructuredLogger) -> Self {
        Self {
            tagging,
            page_size,
            logger,
        }
    }

    /// Locate resources of `category` carrying the selector's tag
    pub async fn locate(
        &self,
        selector: &TagSelector,
        category: ResourceCategory,
    ) -> Result<Vec<ResourceRef>> {
        match category {
            ResourceCategory::Ec2 => Ok(self
                .locate_instances(selector)
                .await?
                .into_iter()
                .map(ResourceRef::Instance)
                .collect()),
            ResourceCategory::Rds => Ok(self
                .locate_db_instances(selector)
                .await?
                .into_iter()
                .map(ResourceRef::DbInstance)
                .collect()),
            ResourceCategory::Eks => Ok(self
                .locate_nodegroups(selector)
                .await?
                .into_iter()
                .map(ResourceRef::NodeGroup)
                .collect()),
        }
    }

    pub async fn locate_instances(&self, selector: &TagSelector) -> Result<Vec<String>> {
        self.search(selector, ResourceCategory::Ec2, parse_instance_arn)
            .await
    }

    pub async fn locate_db_instances(&self, selector: &TagSelector) -> Result<Vec<String>> {
        self.search(selector, ResourceCategory::Rds, parse_db_arn).await
    }

    pub async fn locate_nodegroups(&self, selector: &TagSelector) -> Result<Vec<NodeGroupRef>> {
        self.search(selector, ResourceCategory::Eks, parse_nodegroup_arn)
            .await
    }

    async fn search<T>(
        &self,
        selector: &TagSelector,
        category: ResourceCategory,
        parse: fn(&str) -> Option<T>,
    ) -> Result<Vec<T>> {
        let resource_type = category.resource_type();

        let arns = match self
            .tagging
            .get_resources(selector, resource_type, self.page_size)
            .await
        {
            Ok(arns) => arns,
            Err(source) => {
                self.logger
                    .log_lookup_failed(&selector.value, resource_type, &source);
                return Err(SchedulerError::Lookup {
                    key: selector.key.clone(),
                    value: selector.value.clone(),
                    resource_type,
                    source,
                });
            }
        };

        let located = arns
            .iter()
            .map(|arn| {
                parse(arn).ok_or_else(|| SchedulerError::MalformedArn {
                    resource_type,
                    arn: arn.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.logger.log_located(category, located.len());
        Ok(located)
    }
}

fn non_empty(segment: &str) -> Option<&str> {
    Some(segment).filter(|s| !s.is_empty())
}

/// `arn:aws:ec2:<region>:<account>:instance/<instance-id>`
pub fn parse_instance_arn(arn: &str) -> Option<String> {
    let (_, id) = arn.split_once("instance/")?;
    non_empty(id).map(str::to_string)
}

/// `arn:aws:rds:<region>:<account>:db:<identifier>`
pub fn parse_db_arn(arn: &str) -> Option<String> {
    let (_, identifier) = arn.split_once(":db:")?;
    non_empty(identifier).map(str::to_string)
}

/// `arn:aws:eks:<region>:<account>:nodegroup/<cluster>/<nodegroup>/<uuid>`
pub fn parse_nodegroup_arn(arn: &str) -> Option<NodeGroupRef> {
    let (_, path) = arn.split_once(":nodegroup/")?;
    let mut segments = path.split('/');
    let cluster = non_empty(segments.next()?)?;
    let nodegroup = non_empty(segments.next()?)?;
    Some(NodeGroupRef::new(cluster, nodegroup))
}
