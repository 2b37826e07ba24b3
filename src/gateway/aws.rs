// ABOUTME: RdsOps implementation backed by the AWS SDK for RDS.
// ABOUTME: Maps SDK shapes to snapshot types and not-found faults to None.

use super::error::{ApiSnafu, GatewayError, MissingFieldSnafu};
use super::types::{
    BlueGreenDeployment, CreateDeploymentRequest, DbInstance, DbParameterGroup, DeploymentMember,
    ParameterGroupStatus, UpgradeTarget, UpgradeTargets,
};
use super::RdsOps;
use crate::types::{DbInstanceId, DeploymentId};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_rds::Client;
use aws_sdk_rds::error::{DisplayErrorContext, SdkError};
use aws_sdk_rds::types::{self as sdk, Filter};
use snafu::OptionExt;
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

/// RDS gateway talking to the real service.
#[derive(Debug, Clone)]
pub struct AwsRds {
    client: Client,
}

impl AwsRds {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Load credentials and settings from the environment, pinned to `region`.
    pub async fn from_env(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self::new(Client::new(&config))
    }
}

fn api_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> GatewayError
where
    E: std::error::Error + 'static,
    R: Debug,
{
    ApiSnafu {
        operation,
        message: DisplayErrorContext(&err).to_string(),
    }
    .build()
}

fn filter(operation: &'static str, name: &str, values: Vec<String>) -> Result<Filter, GatewayError> {
    // `Filter::build()` is infallible in aws-sdk-rds 1.x (no required fields).
    let _ = operation;
    Ok(Filter::builder()
        .name(name)
        .set_values(Some(values))
        .build())
}

fn convert_instance(db: &sdk::DbInstance) -> Result<DbInstance, GatewayError> {
    const OP: &str = "DescribeDBInstances";

    let identifier = db.db_instance_identifier().context(MissingFieldSnafu {
        operation: OP,
        field: "DBInstanceIdentifier",
    })?;
    let arn = db.db_instance_arn().context(MissingFieldSnafu {
        operation: OP,
        field: "DBInstanceArn",
    })?;
    let backup_retention_period = db.backup_retention_period().context(MissingFieldSnafu {
        operation: OP,
        field: "BackupRetentionPeriod",
    })?;

    Ok(DbInstance {
        identifier: DbInstanceId::new(identifier),
        arn: arn.to_string(),
        status: db.db_instance_status().unwrap_or_default().to_string(),
        deletion_protection: db.deletion_protection().unwrap_or(false),
        backup_retention_period,
        engine: db.engine().unwrap_or_default().to_string(),
        engine_version: db.engine_version().unwrap_or_default().to_string(),
        instance_class: db.db_instance_class().unwrap_or_default().to_string(),
        storage_type: db.storage_type().map(str::to_string),
        storage_throughput: db.storage_throughput(),
        allocated_storage: db.allocated_storage(),
        iops: db.iops(),
        parameter_groups: db
            .db_parameter_groups()
            .iter()
            .map(|pg| ParameterGroupStatus {
                name: pg.db_parameter_group_name().unwrap_or_default().to_string(),
                apply_status: pg.parameter_apply_status().unwrap_or_default().to_string(),
            })
            .collect(),
    })
}

fn convert_deployment(bg: &sdk::BlueGreenDeployment) -> Result<BlueGreenDeployment, GatewayError> {
    const OP: &str = "DescribeBlueGreenDeployments";

    let identifier = bg
        .blue_green_deployment_identifier()
        .context(MissingFieldSnafu {
            operation: OP,
            field: "BlueGreenDeploymentIdentifier",
        })?;
    let status = bg.status().context(MissingFieldSnafu {
        operation: OP,
        field: "Status",
    })?;

    Ok(BlueGreenDeployment {
        identifier: DeploymentId::new(identifier),
        name: bg.blue_green_deployment_name().unwrap_or_default().to_string(),
        status: status.to_string(),
        members: bg
            .switchover_details()
            .iter()
            .filter_map(|detail| {
                Some(DeploymentMember {
                    source: detail.source_member()?.to_string(),
                    target: detail.target_member()?.to_string(),
                })
            })
            .collect(),
    })
}

#[async_trait]
impl RdsOps for AwsRds {
    async fn describe_db_instance(&self, id: &str) -> Result<Option<DbInstance>, GatewayError> {
        let result = self
            .client
            .describe_db_instances()
            .db_instance_identifier(id)
            .send()
            .await;

        match result {
            Ok(output) => output
                .db_instances()
                .first()
                .map(convert_instance)
                .transpose(),
            Err(SdkError::ServiceError(err)) if err.err().is_db_instance_not_found_fault() => {
                debug!(id, "db instance not found");
                Ok(None)
            }
            Err(err) => Err(api_error("DescribeDBInstances", err)),
        }
    }

    async fn describe_blue_green_deployment(
        &self,
        name: &str,
    ) -> Result<Option<BlueGreenDeployment>, GatewayError> {
        const OP: &str = "DescribeBlueGreenDeployments";

        let result = self
            .client
            .describe_blue_green_deployments()
            .filters(filter(OP, "blue-green-deployment-name", vec![name.to_string()])?)
            .send()
            .await;

        match result {
            Ok(output) => output
                .blue_green_deployments()
                .first()
                .map(convert_deployment)
                .transpose(),
            Err(SdkError::ServiceError(err))
                if err.err().is_blue_green_deployment_not_found_fault() =>
            {
                Ok(None)
            }
            Err(err) => Err(api_error(OP, err)),
        }
    }

    async fn describe_db_parameter_group(
        &self,
        name: &str,
    ) -> Result<Option<DbParameterGroup>, GatewayError> {
        let result = self
            .client
            .describe_db_parameter_groups()
            .db_parameter_group_name(name)
            .send()
            .await;

        match result {
            Ok(output) => Ok(output.db_parameter_groups().first().map(|pg| {
                DbParameterGroup {
                    name: pg.db_parameter_group_name().unwrap_or(name).to_string(),
                    family: pg.db_parameter_group_family().map(str::to_string),
                }
            })),
            Err(SdkError::ServiceError(err))
                if err.err().is_db_parameter_group_not_found_fault() =>
            {
                Ok(None)
            }
            Err(err) => Err(api_error("DescribeDBParameterGroups", err)),
        }
    }

    async fn describe_valid_upgrade_targets(
        &self,
        engine: &str,
        engine_version: &str,
    ) -> Result<UpgradeTargets, GatewayError> {
        const OP: &str = "DescribeDBEngineVersions";

        let output = self
            .client
            .describe_db_engine_versions()
            .engine(engine)
            .engine_version(engine_version)
            .include_all(true)
            .send()
            .await
            .map_err(|e| api_error(OP, e))?;

        let mut candidates = UpgradeTargets::new();
        candidates.insert(
            engine_version.to_string(),
            UpgradeTarget {
                is_major_version_upgrade: false,
            },
        );
        for version in output.db_engine_versions() {
            for target in version.valid_upgrade_target() {
                if let Some(v) = target.engine_version() {
                    candidates.insert(
                        v.to_string(),
                        UpgradeTarget {
                            is_major_version_upgrade: target
                                .is_major_version_upgrade()
                                .unwrap_or(false),
                        },
                    );
                }
            }
        }

        // Upgrade targets can reference versions RDS no longer offers.
        let versions: Vec<String> = candidates.keys().cloned().collect();
        let available = self
            .client
            .describe_db_engine_versions()
            .engine(engine)
            .filters(filter(OP, "engine-version", versions)?)
            .send()
            .await
            .map_err(|e| api_error(OP, e))?;

        let offered: Vec<&str> = available
            .db_engine_versions()
            .iter()
            .filter_map(|v| v.engine_version())
            .collect();
        candidates.retain(|version, _| offered.contains(&version.as_str()));

        Ok(candidates)
    }

    async fn describe_db_parameter(
        &self,
        group: &str,
        parameter: &str,
    ) -> Result<Option<String>, GatewayError> {
        const OP: &str = "DescribeDBParameters";

        let mut marker: Option<String> = None;
        loop {
            let output = self
                .client
                .describe_db_parameters()
                .db_parameter_group_name(group)
                .filters(filter(OP, "parameter-name", vec![parameter.to_string()])?)
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| api_error(OP, e))?;

            if let Some(found) = output
                .parameters()
                .iter()
                .find(|p| p.parameter_name() == Some(parameter))
            {
                return Ok(found.parameter_value().map(str::to_string));
            }

            match output.marker() {
                Some(next) => marker = Some(next.to_string()),
                None => return Ok(None),
            }
        }
    }

    async fn create_blue_green_deployment(
        &self,
        request: &CreateDeploymentRequest,
    ) -> Result<DeploymentId, GatewayError> {
        const OP: &str = "CreateBlueGreenDeployment";

        let tags = request.tags.as_ref().map(|tags| {
            tags.iter()
                .map(|t| sdk::Tag::builder().key(&t.key).value(&t.value).build())
                .collect::<Vec<_>>()
        });

        let output = self
            .client
            .create_blue_green_deployment()
            .blue_green_deployment_name(&request.name)
            .source(&request.source_arn)
            .set_target_allocated_storage(request.allocated_storage)
            .set_target_engine_version(request.engine_version.clone())
            .set_target_db_instance_class(request.instance_class.clone())
            .set_target_iops(request.iops)
            .set_target_db_parameter_group_name(request.parameter_group_name.clone())
            .set_target_storage_throughput(request.storage_throughput)
            .set_target_storage_type(request.storage_type.clone())
            .set_tags(tags)
            .send()
            .await
            .map_err(|e| api_error(OP, e))?;

        let identifier = output
            .blue_green_deployment()
            .and_then(|bg| bg.blue_green_deployment_identifier())
            .context(MissingFieldSnafu {
                operation: OP,
                field: "BlueGreenDeploymentIdentifier",
            })?;

        Ok(DeploymentId::new(identifier))
    }

    async fn switchover_blue_green_deployment(
        &self,
        id: &DeploymentId,
        timeout: Option<Duration>,
    ) -> Result<(), GatewayError> {
        let timeout_secs = timeout.map(|t| i32::try_from(t.as_secs()).unwrap_or(i32::MAX));

        self.client
            .switchover_blue_green_deployment()
            .blue_green_deployment_identifier(id.as_str())
            .set_switchover_timeout(timeout_secs)
            .send()
            .await
            .map_err(|e| api_error("SwitchoverBlueGreenDeployment", e))?;

        Ok(())
    }

    async fn delete_blue_green_deployment(
        &self,
        id: &DeploymentId,
        delete_target: Option<bool>,
    ) -> Result<(), GatewayError> {
        self.client
            .delete_blue_green_deployment()
            .blue_green_deployment_identifier(id.as_str())
            .set_delete_target(delete_target)
            .send()
            .await
            .map_err(|e| api_error("DeleteBlueGreenDeployment", e))?;

        Ok(())
    }

    async fn delete_db_instance(&self, id: &DbInstanceId) -> Result<(), GatewayError> {
        self.client
            .delete_db_instance()
            .db_instance_identifier(id.as_str())
            .skip_final_snapshot(true)
            .send()
            .await
            .map_err(|e| api_error("DeleteDBInstance", e))?;

        Ok(())
    }
}
