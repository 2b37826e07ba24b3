// ABOUTME: Shared fixtures for Blue/Green integration tests.
// ABOUTME: A default postgres instance, upgrade targets, deployments and configs.

use rds_bluegreen::config::{BlueGreenConfig, Config, TargetSpec, WaitConfig};
use rds_bluegreen::gateway::{
    BlueGreenDeployment, DbInstance, DeploymentMember, ParameterGroupStatus, UpgradeTarget,
    UpgradeTargets,
};
use rds_bluegreen::types::{DbInstanceId, DeploymentId};
use rds_bluegreen::wait::{WaitOptions, Waiter, shutdown_channel};
use std::collections::BTreeMap;
use std::time::Duration;

pub const IDENTIFIER: &str = "test-rds";
pub const SOURCE_ARN: &str = "some-arn";
pub const TARGET_ARN: &str = "some-arn-new";
pub const DEPLOYMENT_ID: &str = "some-bg-id";

pub fn default_instance() -> DbInstance {
    DbInstance {
        identifier: DbInstanceId::new(IDENTIFIER),
        arn: SOURCE_ARN.to_string(),
        status: "available".to_string(),
        deletion_protection: false,
        backup_retention_period: 7,
        engine: "postgres".to_string(),
        engine_version: "15.7".to_string(),
        instance_class: "db.t4g.micro".to_string(),
        storage_type: Some("gp3".to_string()),
        storage_throughput: Some(125),
        allocated_storage: Some(20),
        iops: Some(3000),
        parameter_groups: vec![ParameterGroupStatus {
            name: "test-rds-pg15".to_string(),
            apply_status: "in-sync".to_string(),
        }],
    }
}

/// The green instance created by a deployment of the default instance.
pub fn target_instance() -> DbInstance {
    DbInstance {
        identifier: DbInstanceId::new("test-rds-new"),
        arn: TARGET_ARN.to_string(),
        ..default_instance()
    }
}

/// The old blue instance after a switchover renamed it.
pub fn old_source_instance() -> DbInstance {
    DbInstance {
        identifier: DbInstanceId::new("test-rds-old"),
        ..default_instance()
    }
}

pub fn upgrade_target(major: bool) -> UpgradeTarget {
    UpgradeTarget {
        is_major_version_upgrade: major,
    }
}

pub fn default_targets() -> UpgradeTargets {
    UpgradeTargets::from([
        ("15.7".to_string(), upgrade_target(false)),
        ("15.8".to_string(), upgrade_target(false)),
        ("16.3".to_string(), upgrade_target(true)),
    ])
}

pub fn deployment(status: &str) -> BlueGreenDeployment {
    BlueGreenDeployment {
        identifier: DeploymentId::new(DEPLOYMENT_ID),
        name: IDENTIFIER.to_string(),
        status: status.to_string(),
        members: vec![DeploymentMember {
            source: SOURCE_ARN.to_string(),
            target: TARGET_ARN.to_string(),
        }],
    }
}

pub fn blue_green(switchover: bool, delete: bool, target: Option<TargetSpec>) -> BlueGreenConfig {
    BlueGreenConfig {
        enabled: true,
        switchover,
        delete,
        target,
    }
}

pub fn config(blue_green: Option<BlueGreenConfig>) -> Config {
    Config {
        identifier: DbInstanceId::new(IDENTIFIER),
        region: "us-east-1".to_string(),
        deletion_protection: None,
        tags: BTreeMap::from([("app".to_string(), "foo".to_string())]),
        blue_green_deployment: blue_green,
        wait: fast_wait(),
    }
}

pub fn fast_wait() -> WaitConfig {
    WaitConfig {
        interval: Duration::from_secs(1),
        timeout: Some(Duration::from_secs(30)),
        switchover_timeout: None,
    }
}

/// A waiter polling every second with a 30s timeout and no shutdown source.
pub fn waiter() -> Waiter {
    let (_trigger, shutdown) = shutdown_channel();
    Waiter::new(WaitOptions::from(&fast_wait()), shutdown)
}
