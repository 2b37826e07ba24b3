// ABOUTME: Deployment model built from configuration and a live RDS snapshot.
// ABOUTME: Validates preconditions, derives lifecycle state and exposes planning inputs.

use super::error::DeployError;
use super::state::{DeploymentStatus, State};
use super::validate::{self, Candidate, PendingPrepare};
use crate::config::{BlueGreenConfig, Config, TargetSpec};
use crate::gateway::{BlueGreenDeployment, DbInstance, DbParameterGroup, UpgradeTargets};
use crate::types::DbInstanceId;
use std::collections::BTreeMap;

/// Live RDS state fetched once per pass.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub instance: Option<DbInstance>,
    pub target_parameter_group: Option<DbParameterGroup>,
    pub deployment: Option<BlueGreenDeployment>,
    pub valid_upgrade_targets: UpgradeTargets,
    /// Resolvable source members; missing members are already gone.
    pub source_instances: Vec<DbInstance>,
    pub target_instances: Vec<DbInstance>,
    /// Value of `rds.logical_replication` on the source parameter group.
    pub logical_replication: Option<String>,
}

/// Validated view of one Blue/Green deployment.
///
/// Read-only after construction except for `state`, which the orchestrator
/// advances as actions complete.
#[derive(Debug, Clone)]
pub struct DeploymentModel {
    state: State,
    identifier: DbInstanceId,
    config: BlueGreenConfig,
    tags: BTreeMap<String, String>,
    instance: DbInstance,
    deployment: Option<BlueGreenDeployment>,
    source_instances: Vec<DbInstance>,
    pending_prepares: Vec<PendingPrepare>,
}

impl DeploymentModel {
    /// Validate `snapshot` against `config` and derive the current state.
    pub fn new(config: &Config, snapshot: Snapshot) -> Result<Self, DeployError> {
        let Snapshot {
            instance,
            target_parameter_group,
            deployment,
            valid_upgrade_targets,
            source_instances,
            target_instances,
            logical_replication,
        } = snapshot;

        let instance =
            instance.ok_or_else(|| DeployError::InstanceNotFound(config.identifier.clone()))?;
        let blue_green = config.blue_green();

        let state = derive_state(deployment.as_ref(), &source_instances, &target_instances)?;

        let candidate = Candidate {
            state,
            config: &blue_green,
            desired_deletion_protection: config.deletion_protection,
            instance: &instance,
            target_parameter_group_found: target_parameter_group.is_some(),
            valid_upgrade_targets: &valid_upgrade_targets,
            logical_replication: logical_replication.as_deref(),
        };
        let pending_prepares = validate::run(&candidate)?;

        let mut model = Self {
            state,
            identifier: config.identifier.clone(),
            config: blue_green,
            tags: config.tags.clone(),
            instance,
            deployment,
            source_instances,
            pending_prepares,
        };
        // Prepares only block a pass that would go on to create.
        if model.state == State::Init
            && !model.pending_prepares.is_empty()
            && !model.is_cleanup_only()
        {
            model.state = State::PendingPrepare;
        }
        Ok(model)
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Record that an action reaching `next` has been applied.
    pub(crate) fn advance(&mut self, next: State) {
        self.state = next;
    }

    pub fn identifier(&self) -> &DbInstanceId {
        &self.identifier
    }

    pub fn config(&self) -> &BlueGreenConfig {
        &self.config
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn instance(&self) -> &DbInstance {
        &self.instance
    }

    pub fn deployment(&self) -> Option<&BlueGreenDeployment> {
        self.deployment.as_ref()
    }

    pub fn source_instances(&self) -> &[DbInstance] {
        &self.source_instances
    }

    pub fn pending_prepares(&self) -> &[PendingPrepare] {
        &self.pending_prepares
    }

    /// True when every explicitly set target field already matches the
    /// live instance.
    pub fn no_changes(&self) -> bool {
        let Some(target) = self.config.target.as_ref() else {
            return true;
        };
        target_matches(target, &self.instance)
    }

    /// True when `init` routes straight to no-op instead of creating.
    pub fn is_cleanup_only(&self) -> bool {
        self.config.delete && (!self.config.switchover || self.no_changes())
    }
}

fn target_matches(target: &TargetSpec, instance: &DbInstance) -> bool {
    fn same<T: PartialEq + ?Sized>(desired: Option<&T>, current: Option<&T>) -> bool {
        desired.is_none_or(|d| current == Some(d))
    }

    let current_group = instance.primary_parameter_group().map(|pg| pg.name.as_str());

    same(target.parameter_group_name(), current_group)
        && same(target.iops.as_ref(), instance.iops.as_ref())
        && same(
            target.engine_version.as_deref(),
            Some(instance.engine_version.as_str()),
        )
        && same(
            target.instance_class.as_deref(),
            Some(instance.instance_class.as_str()),
        )
        && same(
            target.storage_throughput.as_ref(),
            instance.storage_throughput.as_ref(),
        )
        && same(target.storage_type.as_deref(), instance.storage_type.as_deref())
        && same(
            target.allocated_storage.as_ref(),
            instance.allocated_storage.as_ref(),
        )
}

/// True once the deployment reports available and every green member is too.
/// The deployment flips to available before replicas finish storage work.
pub fn is_deployment_available(
    deployment: Option<&BlueGreenDeployment>,
    target_instances: &[DbInstance],
) -> Result<bool, DeployError> {
    let Some(deployment) = deployment else {
        return Ok(false);
    };
    Ok(
        DeploymentStatus::parse(&deployment.status)? == DeploymentStatus::Available
            && target_instances.iter().all(DbInstance::is_available),
    )
}

/// Lifecycle state implied by the deployment and its members.
pub fn derive_state(
    deployment: Option<&BlueGreenDeployment>,
    source_instances: &[DbInstance],
    target_instances: &[DbInstance],
) -> Result<State, DeployError> {
    let Some(current) = deployment else {
        return Ok(State::Init);
    };

    let state = match DeploymentStatus::parse(&current.status)? {
        DeploymentStatus::Provisioning => State::Provisioning,
        DeploymentStatus::Available => {
            if is_deployment_available(deployment, target_instances)? {
                State::Available
            } else {
                State::Provisioning
            }
        }
        DeploymentStatus::SwitchoverInProgress => State::SwitchoverInProgress,
        DeploymentStatus::SwitchoverCompleted => {
            if source_instances.is_empty() {
                State::SourceDbInstancesDeleted
            } else if source_instances.iter().any(DbInstance::is_deleting) {
                State::DeletingSourceDbInstances
            } else {
                State::SwitchoverCompleted
            }
        }
        DeploymentStatus::Deleting => State::Deleting,
    };
    Ok(state)
}
