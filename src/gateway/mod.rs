// ABOUTME: Narrow interface over the RDS API used by the control loop.
// ABOUTME: RdsOps trait, snapshot types, gateway errors and the AWS SDK implementation.

mod aws;
mod error;
mod types;

pub use aws::AwsRds;
pub use error::{ApiSnafu, GatewayError, GatewayErrorKind, InvalidRequestSnafu, MissingFieldSnafu};
pub use types::{
    BlueGreenDeployment, CreateDeploymentRequest, DbInstance, DbParameterGroup, DeploymentMember,
    INSTANCE_AVAILABLE, INSTANCE_DELETING, PARAMETER_APPLY_IN_SYNC, ParameterGroupStatus, Tag,
    UpgradeTarget, UpgradeTargets,
};

use crate::types::{DbInstanceId, DeploymentId};
use async_trait::async_trait;
use std::time::Duration;

/// Read and mutating RDS operations.
///
/// Lookups of a single resource return `Ok(None)` when RDS reports it as not
/// found; every other failure is an error.
#[async_trait]
pub trait RdsOps: Send + Sync {
    /// Describe an instance by identifier or ARN.
    async fn describe_db_instance(&self, id: &str) -> Result<Option<DbInstance>, GatewayError>;

    /// Describe the Blue/Green deployment with the given name.
    async fn describe_blue_green_deployment(
        &self,
        name: &str,
    ) -> Result<Option<BlueGreenDeployment>, GatewayError>;

    async fn describe_db_parameter_group(
        &self,
        name: &str,
    ) -> Result<Option<DbParameterGroup>, GatewayError>;

    /// Versions reachable from `engine_version`, including itself as a
    /// non-major target.
    async fn describe_valid_upgrade_targets(
        &self,
        engine: &str,
        engine_version: &str,
    ) -> Result<UpgradeTargets, GatewayError>;

    /// Current value of a single parameter in a parameter group.
    async fn describe_db_parameter(
        &self,
        group: &str,
        parameter: &str,
    ) -> Result<Option<String>, GatewayError>;

    async fn create_blue_green_deployment(
        &self,
        request: &CreateDeploymentRequest,
    ) -> Result<DeploymentId, GatewayError>;

    async fn switchover_blue_green_deployment(
        &self,
        id: &DeploymentId,
        timeout: Option<Duration>,
    ) -> Result<(), GatewayError>;

    /// `delete_target` is omitted from the request when `None`.
    async fn delete_blue_green_deployment(
        &self,
        id: &DeploymentId,
        delete_target: Option<bool>,
    ) -> Result<(), GatewayError>;

    /// Delete an instance without a final snapshot.
    async fn delete_db_instance(&self, id: &DbInstanceId) -> Result<(), GatewayError>;
}
