//! In-memory provider used by the integration tests
//!
//! Resources are registered up front; every API call is recorded in order so
//! tests can assert what was (and was not) sent to the provider.

#![allow(dead_code)]

use async_trait::async_trait;
use scheduler_lib::provider::{
    ComputeApi, DatabaseApi, DbInstance, InstanceStatus, NodeGroup, NodeGroupApi, TaggingApi,
};
use scheduler_lib::{
    Clients, Dispatcher, NodeGroupRef, ProviderError, ScalingDescriptor, SchedulerConfig,
    TagSelector,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const ACCOUNT_ID: &str = "123456789012";
pub const REGION: &str = "ap-southeast-1";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetResources { resource_type: String, tag_value: String },
    DescribeInstanceStatus(String),
    StartInstances(Vec<String>),
    StopInstances(Vec<String>),
    DescribeDbInstance(String),
    StartDbInstance(String),
    StopDbInstance(String),
    DescribeNodegroup(NodeGroupRef),
    TagResource { arn: String, key: String, value: String },
    UpdateScalingConfig(NodeGroupRef, ScalingDescriptor),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::StartInstances(_)
                | Call::StopInstances(_)
                | Call::StartDbInstance(_)
                | Call::StopDbInstance(_)
                | Call::TagResource { .. }
                | Call::UpdateScalingConfig(..)
        )
    }
}

#[derive(Default)]
struct FakeState {
    /// (resource type, tag value) -> ARNs
    tagged: HashMap<(String, String), Vec<String>>,
    running: HashSet<String>,
    dbs: HashMap<String, DbInstance>,
    nodegroups: HashMap<NodeGroupRef, NodeGroup>,
    failures: HashMap<&'static str, ProviderError>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct FakeCloud {
    state: Mutex<FakeState>,
}

pub fn instance_arn(id: &str) -> String {
    format!("arn:aws:ec2:{}:{}:instance/{}", REGION, ACCOUNT_ID, id)
}

pub fn db_arn(identifier: &str) -> String {
    format!("arn:aws:rds:{}:{}:db:{}", REGION, ACCOUNT_ID, identifier)
}

pub fn nodegroup_arn(nodegroup: &NodeGroupRef) -> String {
    format!(
        "arn:aws:eks:{}:{}:nodegroup/{}/{}/0ec4a1f2-0000-1111-2222-333344445555",
        REGION, ACCOUNT_ID, nodegroup.cluster, nodegroup.nodegroup
    )
}

pub fn scaling(min: u32, max: u32, desired: u32) -> ScalingDescriptor {
    ScalingDescriptor::new(min, max, desired).unwrap()
}

impl FakeCloud {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn tag(&self, resource_type: &str, tag_value: &str, arn: String) {
        self.state
            .lock()
            .unwrap()
            .tagged
            .entry((resource_type.to_string(), tag_value.to_string()))
            .or_default()
            .push(arn);
    }

    pub fn add_instance(&self, id: &str, tag_value: &str, running: bool) {
        self.tag("ec2:instance", tag_value, instance_arn(id));
        if running {
            self.state.lock().unwrap().running.insert(id.to_string());
        }
    }

    pub fn add_db(&self, identifier: &str, tag_value: &str, status: &str, engine: &str, multi_az: bool) {
        self.tag("rds:db", tag_value, db_arn(identifier));
        self.state.lock().unwrap().dbs.insert(
            identifier.to_string(),
            DbInstance {
                identifier: identifier.to_string(),
                status: status.to_string(),
                engine: engine.to_string(),
                multi_az,
            },
        );
    }

    pub fn add_nodegroup(
        &self,
        nodegroup: &NodeGroupRef,
        tag_value: &str,
        live: ScalingDescriptor,
        tags: &[(&str, &str)],
    ) {
        let arn = nodegroup_arn(nodegroup);
        self.tag("eks:nodegroup", tag_value, arn.clone());
        self.state.lock().unwrap().nodegroups.insert(
            nodegroup.clone(),
            NodeGroup {
                name: nodegroup.nodegroup.clone(),
                arn,
                scaling: live,
                tags: tags
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            },
        );
    }

    /// Register a raw ARN, e.g. one the locator cannot parse
    pub fn add_raw_arn(&self, resource_type: &str, tag_value: &str, arn: &str) {
        self.tag(resource_type, tag_value, arn.to_string());
    }

    /// Make every call of `operation` fail
    pub fn fail_on(&self, operation: &'static str, code: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(operation, ProviderError::new(code, format!("{} rejected", operation)));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn is_running(&self, id: &str) -> bool {
        self.state.lock().unwrap().running.contains(id)
    }

    pub fn db_status(&self, identifier: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .dbs
            .get(identifier)
            .map(|db| db.status.clone())
    }

    pub fn nodegroup(&self, nodegroup: &NodeGroupRef) -> Option<NodeGroup> {
        self.state.lock().unwrap().nodegroups.get(nodegroup).cloned()
    }

    /// Record the call and return the configured failure, if any
    fn record(&self, operation: &'static str, call: Call) -> Result<(), ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.failures.get(operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaggingApi for FakeCloud {
    async fn get_resources(
        &self,
        selector: &TagSelector,
        resource_type: &str,
        per_page: i32,
    ) -> Result<Vec<String>, ProviderError> {
        self.record(
            "GetResources",
            Call::GetResources {
                resource_type: resource_type.to_string(),
                tag_value: selector.value.clone(),
            },
        )?;

        let state = self.state.lock().unwrap();
        Ok(state
            .tagged
            .get(&(resource_type.to_string(), selector.value.clone()))
            .map(|arns| arns.iter().take(per_page as usize).cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ComputeApi for FakeCloud {
    async fn describe_instance_status(
        &self,
        instance_id: &str,
    ) -> Result<Vec<InstanceStatus>, ProviderError> {
        self.record(
            "DescribeInstanceStatus",
            Call::DescribeInstanceStatus(instance_id.to_string()),
        )?;

        let state = self.state.lock().unwrap();
        if state.running.contains(instance_id) {
            Ok(vec![InstanceStatus {
                instance_id: instance_id.to_string(),
                state: Some("running".to_string()),
            }])
        } else {
            Ok(Vec::new())
        }
    }

    async fn start_instances(&self, instance_ids: &[String]) -> Result<Vec<String>, ProviderError> {
        self.record("StartInstances", Call::StartInstances(instance_ids.to_vec()))?;

        let mut state = self.state.lock().unwrap();
        for id in instance_ids {
            state.running.insert(id.clone());
        }
        Ok(instance_ids.to_vec())
    }

    async fn stop_instances(&self, instance_ids: &[String]) -> Result<Vec<String>, ProviderError> {
        self.record("StopInstances", Call::StopInstances(instance_ids.to_vec()))?;

        let mut state = self.state.lock().unwrap();
        for id in instance_ids {
            state.running.remove(id);
        }
        Ok(instance_ids.to_vec())
    }
}

#[async_trait]
impl DatabaseApi for FakeCloud {
    async fn describe_db_instance(&self, identifier: &str) -> Result<DbInstance, ProviderError> {
        self.record(
            "DescribeDBInstances",
            Call::DescribeDbInstance(identifier.to_string()),
        )?;

        self.state
            .lock()
            .unwrap()
            .dbs
            .get(identifier)
            .cloned()
            .ok_or_else(|| ProviderError::new("DBInstanceNotFound", identifier))
    }

    async fn start_db_instance(&self, identifier: &str) -> Result<String, ProviderError> {
        self.record("StartDBInstance", Call::StartDbInstance(identifier.to_string()))?;

        if let Some(db) = self.state.lock().unwrap().dbs.get_mut(identifier) {
            db.status = "starting".to_string();
        }
        Ok(identifier.to_string())
    }

    async fn stop_db_instance(&self, identifier: &str) -> Result<String, ProviderError> {
        self.record("StopDBInstance", Call::StopDbInstance(identifier.to_string()))?;

        if let Some(db) = self.state.lock().unwrap().dbs.get_mut(identifier) {
            db.status = "stopping".to_string();
        }
        Ok(identifier.to_string())
    }
}

#[async_trait]
impl NodeGroupApi for FakeCloud {
    async fn describe_nodegroup(&self, nodegroup: &NodeGroupRef) -> Result<NodeGroup, ProviderError> {
        self.record("DescribeNodegroup", Call::DescribeNodegroup(nodegroup.clone()))?;

        self.state
            .lock()
            .unwrap()
            .nodegroups
            .get(nodegroup)
            .cloned()
            .ok_or_else(|| ProviderError::new("ResourceNotFoundException", nodegroup.to_string()))
    }

    async fn tag_resource(&self, arn: &str, key: &str, value: &str) -> Result<(), ProviderError> {
        self.record(
            "TagResource",
            Call::TagResource {
                arn: arn.to_string(),
                key: key.to_string(),
                value: value.to_string(),
            },
        )?;

        let mut state = self.state.lock().unwrap();
        if let Some(nodegroup) = state.nodegroups.values_mut().find(|ng| ng.arn == arn) {
            nodegroup.tags.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn update_scaling_config(
        &self,
        nodegroup: &NodeGroupRef,
        scaling: ScalingDescriptor,
    ) -> Result<(), ProviderError> {
        self.record(
            "UpdateNodegroupConfig",
            Call::UpdateScalingConfig(nodegroup.clone(), scaling),
        )?;

        if let Some(described) = self.state.lock().unwrap().nodegroups.get_mut(nodegroup) {
            described.scaling = scaling;
        }
        Ok(())
    }
}

/// Dispatcher wired to the fake for every service
pub fn dispatcher(cloud: &Arc<FakeCloud>) -> Dispatcher {
    Dispatcher::new(
        Clients::from_provider(cloud.clone()),
        &SchedulerConfig::new(REGION),
    )
}
