// ABOUTME: Snapshot value types returned by the RDS gateway.
// ABOUTME: Plain data decoupled from the AWS SDK's generated shapes.

use crate::types::{DbInstanceId, DeploymentId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Apply status RDS reports for a parameter group that matches the instance.
pub const PARAMETER_APPLY_IN_SYNC: &str = "in-sync";

/// Instance status strings the control loop cares about.
pub const INSTANCE_AVAILABLE: &str = "available";
pub const INSTANCE_DELETING: &str = "deleting";

/// A DB instance as described by RDS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbInstance {
    pub identifier: DbInstanceId,
    pub arn: String,
    pub status: String,
    pub deletion_protection: bool,
    pub backup_retention_period: i32,
    pub engine: String,
    pub engine_version: String,
    pub instance_class: String,
    pub storage_type: Option<String>,
    pub storage_throughput: Option<i32>,
    pub allocated_storage: Option<i32>,
    pub iops: Option<i32>,
    pub parameter_groups: Vec<ParameterGroupStatus>,
}

impl DbInstance {
    pub fn is_available(&self) -> bool {
        self.status == INSTANCE_AVAILABLE
    }

    pub fn is_deleting(&self) -> bool {
        self.status == INSTANCE_DELETING
    }

    /// The first attached parameter group, which RDS treats as the primary one.
    pub fn primary_parameter_group(&self) -> Option<&ParameterGroupStatus> {
        self.parameter_groups.first()
    }
}

/// Parameter group attached to an instance, with its apply status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterGroupStatus {
    pub name: String,
    pub apply_status: String,
}

impl ParameterGroupStatus {
    pub fn is_in_sync(&self) -> bool {
        self.apply_status == PARAMETER_APPLY_IN_SYNC
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbParameterGroup {
    pub name: String,
    pub family: Option<String>,
}

/// A Blue/Green deployment. Members reference instances by ARN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlueGreenDeployment {
    pub identifier: DeploymentId,
    pub name: String,
    pub status: String,
    pub members: Vec<DeploymentMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentMember {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeTarget {
    pub is_major_version_upgrade: bool,
}

/// Engine version -> upgrade classification, ordered for stable error text.
pub type UpgradeTargets = BTreeMap<String, UpgradeTarget>;

/// A resource tag in the shape RDS expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// Sparse CreateBlueGreenDeployment request. Unset target fields are omitted
/// so RDS keeps the source instance's current values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateDeploymentRequest {
    #[serde(rename = "BlueGreenDeploymentName")]
    pub name: String,

    #[serde(rename = "Source")]
    pub source_arn: String,

    #[serde(rename = "TargetAllocatedStorage", skip_serializing_if = "Option::is_none")]
    pub allocated_storage: Option<i32>,

    #[serde(rename = "TargetEngineVersion", skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,

    #[serde(rename = "TargetDBInstanceClass", skip_serializing_if = "Option::is_none")]
    pub instance_class: Option<String>,

    #[serde(rename = "TargetIops", skip_serializing_if = "Option::is_none")]
    pub iops: Option<i32>,

    #[serde(
        rename = "TargetDBParameterGroupName",
        skip_serializing_if = "Option::is_none"
    )]
    pub parameter_group_name: Option<String>,

    #[serde(
        rename = "TargetStorageThroughput",
        skip_serializing_if = "Option::is_none"
    )]
    pub storage_throughput: Option<i32>,

    #[serde(rename = "TargetStorageType", skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<String>,

    #[serde(rename = "Tags", skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

impl CreateDeploymentRequest {
    pub fn new(name: impl Into<String>, source_arn: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_arn: source_arn.into(),
            allocated_storage: None,
            engine_version: None,
            instance_class: None,
            iops: None,
            parameter_group_name: None,
            storage_throughput: None,
            storage_type: None,
            tags: None,
        }
    }

    /// Attach tags; an empty map leaves the request untagged.
    pub fn with_tags(mut self, tags: &BTreeMap<String, String>) -> Self {
        self.tags = if tags.is_empty() {
            None
        } else {
            Some(
                tags.iter()
                    .map(|(k, v)| Tag {
                        key: k.clone(),
                        value: v.clone(),
                    })
                    .collect(),
            )
        };
        self
    }
}
