//! Core data models for the scheduler

use crate::error::{DescriptorError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The only tag key the scheduler acts on
pub const SCHEDULE_TAG_KEY: &str = "DCP/AutoStartStop";

/// Tag holding the encoded scaling config of a stopped node group
pub const SCALING_TAG_KEY: &str = "nodegroup_scaling";

/// Timestamp format used in the result envelope
pub const TIME_FORMAT: &str = "%d %b %Y - %H:%M";

/// Requested power transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Automation {
    Start,
    Stop,
}

impl Automation {
    /// Parse case-insensitively, `None` for anything unrecognised
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "start" => Some(Automation::Start),
            "stop" => Some(Automation::Stop),
            _ => None,
        }
    }
}

impl fmt::Display for Automation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Automation::Start => write!(f, "start"),
            Automation::Stop => write!(f, "stop"),
        }
    }
}

/// Category of resource a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    /// EC2 virtual machine instances
    Ec2,
    /// RDS database instances
    Rds,
    /// EKS managed node groups
    Eks,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 3] = [
        ResourceCategory::Ec2,
        ResourceCategory::Rds,
        ResourceCategory::Eks,
    ];

    /// Matches the request field exactly (`ec2`, `rds`, `eks`)
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ec2" => Some(ResourceCategory::Ec2),
            "rds" => Some(ResourceCategory::Rds),
            "eks" => Some(ResourceCategory::Eks),
            _ => None,
        }
    }

    /// Resource type filter understood by the tagging API
    pub fn resource_type(&self) -> &'static str {
        match self {
            ResourceCategory::Ec2 => "ec2:instance",
            ResourceCategory::Rds => "rds:db",
            ResourceCategory::Eks => "eks:nodegroup",
        }
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceCategory::Ec2 => write!(f, "ec2"),
            ResourceCategory::Rds => write!(f, "rds"),
            ResourceCategory::Eks => write!(f, "eks"),
        }
    }
}

/// Named time-window policies recognised as schedule tag values.
///
/// The windows themselves are enforced by the external trigger; the scheduler
/// only needs the names to validate requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchedulePolicy {
    OfficeHour,
    ExtendedOfficeHour1,
    ExtendedOfficeHour2,
    UpperHalf,
    LowerHalf,
    RecurringStop,
}

impl SchedulePolicy {
    pub const ALL: [SchedulePolicy; 6] = [
        SchedulePolicy::OfficeHour,
        SchedulePolicy::ExtendedOfficeHour1,
        SchedulePolicy::ExtendedOfficeHour2,
        SchedulePolicy::UpperHalf,
        SchedulePolicy::LowerHalf,
        SchedulePolicy::RecurringStop,
    ];

    /// Tag value as written on resources
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulePolicy::OfficeHour => "OfficeHour",
            SchedulePolicy::ExtendedOfficeHour1 => "ExtendedOfficeHour1",
            SchedulePolicy::ExtendedOfficeHour2 => "ExtendedOfficeHour2",
            SchedulePolicy::UpperHalf => "UpperHalf",
            SchedulePolicy::LowerHalf => "LowerHalf",
            SchedulePolicy::RecurringStop => "RecurringStop",
        }
    }

    /// Human-readable running window (UTC+8)
    pub fn window(&self) -> &'static str {
        match self {
            SchedulePolicy::OfficeHour => "08:30 - 18:30 on weekdays",
            SchedulePolicy::ExtendedOfficeHour1 => "08:30 - 21:30 on weekdays",
            SchedulePolicy::ExtendedOfficeHour2 => "08:30 - 23:59 on weekdays",
            SchedulePolicy::UpperHalf => "08:30 - 14:30 on weekdays",
            SchedulePolicy::LowerHalf => "12:00 - 18:30 on weekdays",
            SchedulePolicy::RecurringStop => {
                "start 01:00, stop 03:00 every Saturday (re-stops auto-started RDS)"
            }
        }
    }
}

impl FromStr for SchedulePolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SchedulePolicy::ALL
            .into_iter()
            .find(|policy| policy.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownTagValue(s.to_string()))
    }
}

impl fmt::Display for SchedulePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag filter used to locate resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagSelector {
    pub key: String,
    pub value: String,
}

impl TagSelector {
    /// Build a selector, rejecting keys and values outside the vocabulary
    pub fn new(key: &str, value: &str) -> Result<Self, ValidationError> {
        if key != SCHEDULE_TAG_KEY {
            return Err(ValidationError::UnknownTagKey(key.to_string()));
        }
        let policy: SchedulePolicy = value.parse()?;

        Ok(Self {
            key: key.to_string(),
            value: policy.as_str().to_string(),
        })
    }

    /// Selector for one of the recognised policies
    pub fn for_policy(policy: SchedulePolicy) -> Self {
        Self {
            key: SCHEDULE_TAG_KEY.to_string(),
            value: policy.as_str().to_string(),
        }
    }
}

/// Cluster and name of an EKS managed node group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeGroupRef {
    pub cluster: String,
    #[serde(rename = "nodegroupname")]
    pub nodegroup: String,
}

impl NodeGroupRef {
    pub fn new(cluster: impl Into<String>, nodegroup: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            nodegroup: nodegroup.into(),
        }
    }
}

impl fmt::Display for NodeGroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cluster, self.nodegroup)
    }
}

/// A located resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ResourceRef {
    /// EC2 instance id
    Instance(String),
    /// RDS DB instance identifier
    DbInstance(String),
    NodeGroup(NodeGroupRef),
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceRef::Instance(id) | ResourceRef::DbInstance(id) => f.write_str(id),
            ResourceRef::NodeGroup(nodegroup) => write!(f, "{}", nodegroup),
        }
    }
}

/// Node group capacity triple.
///
/// Always satisfies `min <= desired <= max`; deserialization goes through
/// the same check as [`ScalingDescriptor::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawScaling")]
pub struct ScalingDescriptor {
    min_size: u32,
    max_size: u32,
    desired_size: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScaling {
    min_size: u32,
    max_size: u32,
    desired_size: u32,
}

impl TryFrom<RawScaling> for ScalingDescriptor {
    type Error = DescriptorError;

    fn try_from(raw: RawScaling) -> Result<Self, Self::Error> {
        ScalingDescriptor::new(raw.min_size, raw.max_size, raw.desired_size)
    }
}

impl ScalingDescriptor {
    /// Capacity applied when a node group is stopped
    pub const STOPPED: ScalingDescriptor = ScalingDescriptor {
        min_size: 0,
        max_size: 1,
        desired_size: 0,
    };

    pub fn new(min_size: u32, max_size: u32, desired_size: u32) -> Result<Self, DescriptorError> {
        if max_size < min_size {
            return Err(DescriptorError::MaxBelowMin { min_size, max_size });
        }
        if desired_size < min_size || desired_size > max_size {
            return Err(DescriptorError::DesiredOutOfRange {
                min_size,
                max_size,
                desired_size,
            });
        }

        Ok(Self {
            min_size,
            max_size,
            desired_size,
        })
    }

    /// Build from the signed sizes reported by the provider
    pub fn from_provider(
        min_size: i32,
        max_size: i32,
        desired_size: i32,
    ) -> Result<Self, DescriptorError> {
        let unsigned = |value: i32| u32::try_from(value).map_err(|_| DescriptorError::Negative(value));
        Self::new(unsigned(min_size)?, unsigned(max_size)?, unsigned(desired_size)?)
    }

    pub fn min_size(&self) -> u32 {
        self.min_size
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    pub fn desired_size(&self) -> u32 {
        self.desired_size
    }
}

impl fmt::Display for ScalingDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min={} max={} desired={}",
            self.min_size, self.max_size, self.desired_size
        )
    }
}

/// Raw `details` block of an invocation event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDetails {
    pub automation: String,
    pub resource: String,
    #[serde(rename = "tag key")]
    pub tag_key: String,
    #[serde(rename = "tag value")]
    pub tag_value: String,
}

/// Inbound invocation payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvocationEvent {
    pub details: EventDetails,
}

impl InvocationEvent {
    pub fn new(
        automation: impl Into<String>,
        resource: impl Into<String>,
        tag_key: impl Into<String>,
        tag_value: impl Into<String>,
    ) -> Self {
        Self {
            details: EventDetails {
                automation: automation.into(),
                resource: resource.into(),
                tag_key: tag_key.into(),
                tag_value: tag_value.into(),
            },
        }
    }
}

/// A validated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub automation: Automation,
    pub resource: ResourceCategory,
    pub selector: TagSelector,
}

impl ActionRequest {
    /// Validate raw event details against the recognised vocabulary
    pub fn from_details(details: &EventDetails) -> Result<Self, ValidationError> {
        let selector = TagSelector::new(&details.tag_key, &details.tag_value)?;

        let unsupported = || ValidationError::UnsupportedAction {
            automation: details.automation.clone(),
            resource: details.resource.clone(),
        };
        let automation = Automation::parse(&details.automation).ok_or_else(unsupported)?;
        let resource = ResourceCategory::parse(&details.resource).ok_or_else(unsupported)?;

        Ok(Self {
            automation,
            resource,
            selector,
        })
    }
}

/// Envelope status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationStatus {
    Successful,
    Failed,
}

impl fmt::Display for InvocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationStatus::Successful => write!(f, "Successful"),
            InvocationStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Result envelope returned to the trigger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    #[serde(rename = "Status")]
    pub status: InvocationStatus,
    #[serde(rename = "AWS_ID")]
    pub account_id: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Action", skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(rename = "ResourceList", skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<ResourceRef>>,
}

impl ActionResult {
    pub fn successful(
        account_id: impl Into<String>,
        action: impl Into<String>,
        resources: Vec<ResourceRef>,
    ) -> Self {
        Self {
            status: InvocationStatus::Successful,
            account_id: account_id.into(),
            time: now_formatted(),
            action: Some(action.into()),
            resources: Some(resources),
        }
    }

    pub fn failed(account_id: impl Into<String>) -> Self {
        Self {
            status: InvocationStatus::Failed,
            account_id: account_id.into(),
            time: now_formatted(),
            action: None,
            resources: None,
        }
    }
}

fn now_formatted() -> String {
    chrono::Utc::now().format(TIME_FORMAT).to_string()
}

/// Account id from an ARN such as `arn:aws:lambda:<region>:<account>:function:<name>`
pub fn account_id_from_arn(arn: &str) -> Option<&str> {
    arn.split(':').nth(4).filter(|account| !account.is_empty())
}
