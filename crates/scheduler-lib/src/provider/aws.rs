//! AWS SDK backed provider

use super::{
    async_trait, ComputeApi, DatabaseApi, DbInstance, InstanceStatus, NodeGroup, NodeGroupApi,
    TaggingApi,
};
use crate::error::ProviderError;
use crate::models::{NodeGroupRef, ScalingDescriptor, TagSelector};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_eks::types::NodegroupScalingConfig;
use aws_sdk_resourcegroupstagging::types::TagFilter;
use tracing::debug;

/// Clients for every service the scheduler uses, all bound to one region
#[derive(Debug, Clone)]
pub struct AwsProvider {
    region: String,
    tagging: aws_sdk_resourcegroupstagging::Client,
    ec2: aws_sdk_ec2::Client,
    rds: aws_sdk_rds::Client,
    eks: aws_sdk_eks::Client,
    sts: aws_sdk_sts::Client,
}

impl AwsProvider {
    /// Load credentials from the default chain (or a named profile) for `region`.
    ///
    /// Credentials are exchanged against the regional endpoint, so each
    /// deployment only manages resources in its own region.
    pub async fn connect(region: &str, profile: Option<&str>) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let sdk_config = loader.load().await;

        debug!(region = %region, profile = ?profile, "AWS session created");
        Self::from_sdk_config(region, &sdk_config)
    }

    pub fn from_sdk_config(region: &str, sdk_config: &SdkConfig) -> Self {
        Self {
            region: region.to_string(),
            tagging: aws_sdk_resourcegroupstagging::Client::new(sdk_config),
            ec2: aws_sdk_ec2::Client::new(sdk_config),
            rds: aws_sdk_rds::Client::new(sdk_config),
            eks: aws_sdk_eks::Client::new(sdk_config),
            sts: aws_sdk_sts::Client::new(sdk_config),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Account of the credentials in use
    pub async fn caller_account(&self) -> Result<String, ProviderError> {
        let output = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .map_err(provider_error)?;

        output
            .account()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::new("MissingAccount", "caller identity has no account"))
    }
}

/// Carry the service error code and message over, falling back to the full
/// error chain when the service sent none (transport failures)
fn provider_error<E, R>(err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().unwrap_or("Unknown").to_string();
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    ProviderError { code, message }
}

fn signed(size: u32) -> i32 {
    i32::try_from(size).unwrap_or(i32::MAX)
}

#[async_trait]
impl TaggingApi for AwsProvider {
    async fn get_resources(
        &self,
        selector: &TagSelector,
        resource_type: &str,
        per_page: i32,
    ) -> Result<Vec<String>, ProviderError> {
        let filter = TagFilter::builder()
            .key(selector.key.as_str())
            .values(selector.value.as_str())
            .build();

        let output = self
            .tagging
            .get_resources()
            .tag_filters(filter)
            .resource_type_filters(resource_type)
            .resources_per_page(per_page)
            .send()
            .await
            .map_err(provider_error)?;

        Ok(output
            .resource_tag_mapping_list()
            .iter()
            .filter_map(|mapping| mapping.resource_arn().map(str::to_string))
            .collect())
    }
}

#[async_trait]
impl ComputeApi for AwsProvider {
    async fn describe_instance_status(
        &self,
        instance_id: &str,
    ) -> Result<Vec<InstanceStatus>, ProviderError> {
        let output = self
            .ec2
            .describe_instance_status()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(provider_error)?;

        Ok(output
            .instance_statuses()
            .iter()
            .map(|status| InstanceStatus {
                instance_id: status.instance_id().unwrap_or(instance_id).to_string(),
                state: status
                    .instance_state()
                    .and_then(|state| state.name())
                    .map(|name| name.as_str().to_string()),
            })
            .collect())
    }

    async fn start_instances(&self, instance_ids: &[String]) -> Result<Vec<String>, ProviderError> {
        let output = self
            .ec2
            .start_instances()
            .set_instance_ids(Some(instance_ids.to_vec()))
            .send()
            .await
            .map_err(provider_error)?;

        Ok(output
            .starting_instances()
            .iter()
            .filter_map(|change| change.instance_id().map(str::to_string))
            .collect())
    }

    async fn stop_instances(&self, instance_ids: &[String]) -> Result<Vec<String>, ProviderError> {
        let output = self
            .ec2
            .stop_instances()
            .set_instance_ids(Some(instance_ids.to_vec()))
            .send()
            .await
            .map_err(provider_error)?;

        Ok(output
            .stopping_instances()
            .iter()
            .filter_map(|change| change.instance_id().map(str::to_string))
            .collect())
    }
}

#[async_trait]
impl DatabaseApi for AwsProvider {
    async fn describe_db_instance(&self, identifier: &str) -> Result<DbInstance, ProviderError> {
        let output = self
            .rds
            .describe_db_instances()
            .db_instance_identifier(identifier)
            .send()
            .await
            .map_err(provider_error)?;

        let db = output.db_instances().first().ok_or_else(|| {
            ProviderError::new(
                "DBInstanceNotFound",
                format!("no description returned for {}", identifier),
            )
        })?;

        Ok(DbInstance {
            identifier: db.db_instance_identifier().unwrap_or(identifier).to_string(),
            status: db.db_instance_status().unwrap_or_default().to_string(),
            engine: db.engine().unwrap_or_default().to_string(),
            multi_az: db.multi_az().unwrap_or(false),
        })
    }

    async fn start_db_instance(&self, identifier: &str) -> Result<String, ProviderError> {
        let output = self
            .rds
            .start_db_instance()
            .db_instance_identifier(identifier)
            .send()
            .await
            .map_err(provider_error)?;

        Ok(output
            .db_instance()
            .and_then(|db| db.db_instance_identifier())
            .unwrap_or(identifier)
            .to_string())
    }

    async fn stop_db_instance(&self, identifier: &str) -> Result<String, ProviderError> {
        let output = self
            .rds
            .stop_db_instance()
            .db_instance_identifier(identifier)
            .send()
            .await
            .map_err(provider_error)?;

        Ok(output
            .db_instance()
            .and_then(|db| db.db_instance_identifier())
            .unwrap_or(identifier)
            .to_string())
    }
}

#[async_trait]
impl NodeGroupApi for AwsProvider {
    async fn describe_nodegroup(&self, nodegroup: &NodeGroupRef) -> Result<NodeGroup, ProviderError> {
        let output = self
            .eks
            .describe_nodegroup()
            .cluster_name(nodegroup.cluster.as_str())
            .nodegroup_name(nodegroup.nodegroup.as_str())
            .send()
            .await
            .map_err(provider_error)?;

        let described = output.nodegroup().ok_or_else(|| {
            ProviderError::new(
                "ResourceNotFoundException",
                format!("no description returned for {}", nodegroup),
            )
        })?;

        let config = described.scaling_config().ok_or_else(|| {
            ProviderError::new(
                "MissingScalingConfig",
                format!("{} has no scaling config", nodegroup),
            )
        })?;
        let scaling = ScalingDescriptor::from_provider(
            config.min_size().unwrap_or(0),
            config.max_size().unwrap_or(0),
            config.desired_size().unwrap_or(0),
        )
        .map_err(|e| ProviderError::new("InvalidScalingConfig", e.to_string()))?;

        Ok(NodeGroup {
            name: described
                .nodegroup_name()
                .unwrap_or(nodegroup.nodegroup.as_str())
                .to_string(),
            arn: described.nodegroup_arn().unwrap_or_default().to_string(),
            scaling,
            tags: described.tags().cloned().unwrap_or_default(),
        })
    }

    async fn tag_resource(&self, arn: &str, key: &str, value: &str) -> Result<(), ProviderError> {
        self.eks
            .tag_resource()
            .resource_arn(arn)
            .tags(key, value)
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }

    async fn update_scaling_config(
        &self,
        nodegroup: &NodeGroupRef,
        scaling: ScalingDescriptor,
    ) -> Result<(), ProviderError> {
        let config = NodegroupScalingConfig::builder()
            .min_size(signed(scaling.min_size()))
            .max_size(signed(scaling.max_size()))
            .desired_size(signed(scaling.desired_size()))
            .build();

        self.eks
            .update_nodegroup_config()
            .cluster_name(nodegroup.cluster.as_str())
            .nodegroup_name(nodegroup.nodegroup.as_str())
            .scaling_config(config)
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }
}
