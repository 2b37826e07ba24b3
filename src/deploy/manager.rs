// ABOUTME: Orchestrates one reconciliation pass of a Blue/Green deployment.
// ABOUTME: Fetches the snapshot, plans, then applies actions (or only logs them in dry-run).

use super::action::{Action, ActionKind};
use super::error::DeployError;
use super::model::{DeploymentModel, Snapshot, is_deployment_available};
use super::state::{DeploymentStatus, State};
use super::validate::{self, LOGICAL_REPLICATION_PARAMETER, PendingPrepare};
use crate::config::Config;
use crate::gateway::{BlueGreenDeployment, CreateDeploymentRequest, DbInstance, RdsOps};
use crate::rerun::{RerunError, RerunInfo, RerunMarker};
use crate::types::DeploymentId;
use crate::wait::Waiter;
use serde::Serialize;
use std::time::Duration;
use tracing::{Instrument, debug, info, info_span, warn};

/// Result of a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Final state; in dry-run this is the derived state before any action.
    pub state: State,
    pub actions: Vec<Action>,
    pub pending_prepares: Vec<PendingPrepare>,
    pub dry_run: bool,
}

/// Runs reconciliation passes against an RDS gateway.
pub struct BlueGreenManager<'a, G: RdsOps + ?Sized> {
    gateway: &'a G,
    waiter: Waiter,
    switchover_timeout: Option<Duration>,
    dry_run: bool,
    rerun: Option<RerunMarker>,
}

impl<G: RdsOps + ?Sized> std::fmt::Debug for BlueGreenManager<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlueGreenManager")
            .field("waiter", &self.waiter)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl<'a, G: RdsOps + ?Sized> BlueGreenManager<'a, G> {
    pub fn new(gateway: &'a G, waiter: Waiter, dry_run: bool) -> Self {
        Self {
            gateway,
            waiter,
            switchover_timeout: None,
            dry_run,
            rerun: None,
        }
    }

    pub fn with_switchover_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.switchover_timeout = timeout;
        self
    }

    /// Where to request a rerun when preconditions are pending.
    pub fn with_rerun_marker(mut self, marker: RerunMarker) -> Self {
        self.rerun = Some(marker);
        self
    }

    /// Run one reconciliation pass.
    pub async fn run(&self, config: &Config) -> Result<Outcome, DeployError> {
        let span = info_span!(
            "reconcile",
            identifier = %config.identifier,
            dry_run = self.dry_run
        );
        self.run_inner(config).instrument(span).await
    }

    async fn run_inner(&self, config: &Config) -> Result<Outcome, DeployError> {
        if !config.is_blue_green_enabled() {
            info!("Blue/Green Deployment not enabled, continue to normal flow.");
            return Ok(Outcome {
                state: State::NotEnabled,
                actions: Vec::new(),
                pending_prepares: Vec::new(),
                dry_run: self.dry_run,
            });
        }

        let snapshot = self.snapshot(config).await?;
        let mut model = DeploymentModel::new(config, snapshot)?;
        let actions = model.plan_actions()?;

        if actions.is_empty() {
            self.report_idle(&mut model)?;
        }

        for action in &actions {
            if self.dry_run {
                self.announce(&model, action);
                continue;
            }
            self.apply(&model, action).await?;
            model.advance(action.next_state);
        }

        Ok(Outcome {
            state: model.state(),
            actions,
            pending_prepares: model.pending_prepares().to_vec(),
            dry_run: self.dry_run,
        })
    }

    /// Fetch everything the model needs, in a fixed order.
    pub async fn snapshot(&self, config: &Config) -> Result<Snapshot, DeployError> {
        let name = config.identifier.as_str();

        let Some(instance) = self.gateway.describe_db_instance(name).await? else {
            return Ok(Snapshot::default());
        };
        let blue_green = config.blue_green();

        let valid_upgrade_targets = self
            .gateway
            .describe_valid_upgrade_targets(&instance.engine, &instance.engine_version)
            .await?;

        let target_parameter_group = match blue_green
            .target
            .as_ref()
            .and_then(|t| t.parameter_group_name())
        {
            Some(group) => self.gateway.describe_db_parameter_group(group).await?,
            None => None,
        };

        let deployment = self.gateway.describe_blue_green_deployment(name).await?;
        let (source_instances, target_instances) = self.members(deployment.as_ref()).await?;

        let logical_replication = match instance.primary_parameter_group() {
            Some(group)
                if validate::requires_logical_replication(
                    &blue_green,
                    &instance,
                    &valid_upgrade_targets,
                ) =>
            {
                self.gateway
                    .describe_db_parameter(&group.name, LOGICAL_REPLICATION_PARAMETER)
                    .await?
            }
            _ => None,
        };

        Ok(Snapshot {
            instance: Some(instance),
            target_parameter_group,
            deployment,
            valid_upgrade_targets,
            source_instances,
            target_instances,
            logical_replication,
        })
    }

    /// Resolve member ARNs to instances; members that no longer exist are dropped.
    async fn members(
        &self,
        deployment: Option<&BlueGreenDeployment>,
    ) -> Result<(Vec<DbInstance>, Vec<DbInstance>), DeployError> {
        let mut sources = Vec::new();
        let mut targets = Vec::new();
        let Some(deployment) = deployment else {
            return Ok((sources, targets));
        };

        for member in &deployment.members {
            if let Some(source) = self.gateway.describe_db_instance(&member.source).await? {
                sources.push(source);
            }
            if let Some(target) = self.gateway.describe_db_instance(&member.target).await? {
                targets.push(target);
            }
        }
        Ok((sources, targets))
    }

    /// Log why nothing is planned and handle pending prepares.
    fn report_idle(&self, model: &mut DeploymentModel) -> Result<(), DeployError> {
        match (model.state(), model.deployment()) {
            // Init only plans nothing when it routed straight to no-op.
            (State::Init, _) => {
                info!("No changes for Blue/Green Deployment, continue to normal flow.");
                model.advance(State::NoOp);
            }
            (State::PendingPrepare, _) => {
                let pending: Vec<String> =
                    model.pending_prepares().iter().map(|p| p.to_string()).collect();
                let reason = format!("pending prepares: {}", pending.join(", "));
                warn!("Blue/Green Deployment {}: {reason}", model.identifier());
                if !self.dry_run {
                    self.request_rerun(model.identifier().as_str(), &reason)?;
                }
            }
            (_, Some(deployment)) => {
                info!(
                    "Blue/Green Deployment {} Status: {}",
                    deployment.name,
                    deployment.status.to_ascii_uppercase()
                );
            }
            (_, None) => info!("Blue/Green Deployment {} not found", model.identifier()),
        }
        Ok(())
    }

    fn request_rerun(&self, identifier: &str, reason: &str) -> Result<(), DeployError> {
        let marker = self.rerun.as_ref().ok_or(RerunError::WorkNotSet)?;
        let path = marker.mark(&RerunInfo::new(identifier, reason))?;
        info!(path = %path.display(), "rerun requested");
        Ok(())
    }

    /// Log a planned action without touching RDS.
    fn announce(&self, model: &DeploymentModel, action: &Action) {
        let name = model.identifier().as_str();
        let identifier = model.deployment().map(|d| &d.identifier);

        match &action.kind {
            ActionKind::Create(request) => log_create(request),
            ActionKind::DeleteSourceDbInstance => {
                for source in model.source_instances().iter().filter(|s| !s.is_deleting()) {
                    info!("Action: DeleteSourceDBInstance, identifier: {}", source.identifier);
                }
            }
            kind => info!("{}", describe(kind, name, identifier)),
        }
    }

    async fn apply(&self, model: &DeploymentModel, action: &Action) -> Result<(), DeployError> {
        let name = model.identifier().as_str();

        match &action.kind {
            ActionKind::NoOp => {}
            ActionKind::Create(request) => {
                log_create(request);
                let id = self.gateway.create_blue_green_deployment(request).await?;
                debug!(identifier = %id, "blue/green deployment created");
            }
            ActionKind::WaitForAvailable => {
                info!("{}", describe(&action.kind, name, None));
                self.waiter.until(|| self.is_available(name)).await?;
            }
            ActionKind::Switchover => {
                let deployment = self.require_deployment(name).await?;
                info!("{}", describe(&action.kind, name, Some(&deployment.identifier)));
                self.gateway
                    .switchover_blue_green_deployment(&deployment.identifier, self.switchover_timeout)
                    .await?;
            }
            ActionKind::WaitForSwitchoverCompleted => {
                info!("{}", describe(&action.kind, name, None));
                self.waiter.until(|| self.is_switchover_completed(name)).await?;
            }
            ActionKind::DeleteSourceDbInstance => {
                for source in self.current_sources(name).await? {
                    if source.is_deleting() {
                        continue;
                    }
                    info!("Action: DeleteSourceDBInstance, identifier: {}", source.identifier);
                    self.gateway.delete_db_instance(&source.identifier).await?;
                }
            }
            ActionKind::WaitForSourceDbInstancesDeleted => {
                info!("{}", describe(&action.kind, name, None));
                self.waiter.until(|| self.are_sources_deleted(name)).await?;
            }
            ActionKind::DeleteWithoutSwitchover | ActionKind::Delete => {
                let deployment = self.require_deployment(name).await?;
                info!("{}", describe(&action.kind, name, Some(&deployment.identifier)));
                // RDS rejects DeleteTarget once a switchover has completed.
                let delete_target =
                    (action.kind == ActionKind::DeleteWithoutSwitchover).then_some(true);
                self.gateway
                    .delete_blue_green_deployment(&deployment.identifier, delete_target)
                    .await?;
            }
            ActionKind::WaitForDeleted => {
                info!("{}", describe(&action.kind, name, None));
                self.waiter.until(|| self.is_deleted(name)).await?;
            }
        }
        Ok(())
    }

    async fn require_deployment(&self, name: &str) -> Result<BlueGreenDeployment, DeployError> {
        self.gateway
            .describe_blue_green_deployment(name)
            .await?
            .ok_or_else(|| DeployError::DeploymentNotFound(name.to_string()))
    }

    async fn current_sources(&self, name: &str) -> Result<Vec<DbInstance>, DeployError> {
        let deployment = self.gateway.describe_blue_green_deployment(name).await?;
        let (sources, _) = self.members(deployment.as_ref()).await?;
        Ok(sources)
    }

    // Conditions polled by the wait handlers.

    async fn is_available(&self, name: &str) -> Result<bool, DeployError> {
        let deployment = self.gateway.describe_blue_green_deployment(name).await?;
        let (_, targets) = self.members(deployment.as_ref()).await?;
        is_deployment_available(deployment.as_ref(), &targets)
    }

    async fn is_switchover_completed(&self, name: &str) -> Result<bool, DeployError> {
        let deployment = self.require_deployment(name).await?;
        Ok(DeploymentStatus::parse(&deployment.status)? == DeploymentStatus::SwitchoverCompleted)
    }

    async fn are_sources_deleted(&self, name: &str) -> Result<bool, DeployError> {
        Ok(self.current_sources(name).await?.is_empty())
    }

    async fn is_deleted(&self, name: &str) -> Result<bool, DeployError> {
        Ok(self
            .gateway
            .describe_blue_green_deployment(name)
            .await?
            .is_none())
    }
}

fn log_create(request: &CreateDeploymentRequest) {
    let payload = serde_json::to_string(request).unwrap_or_else(|_| format!("{request:?}"));
    info!("Action: CreateBlueGreenDeployment, {payload}");
}

/// Action log line for kinds addressed by deployment name. Only the calls
/// that take a deployment identifier log it.
fn describe(kind: &ActionKind, name: &str, identifier: Option<&DeploymentId>) -> String {
    let addresses_deployment = matches!(
        kind,
        ActionKind::Switchover | ActionKind::DeleteWithoutSwitchover | ActionKind::Delete
    );
    match identifier.filter(|_| addresses_deployment) {
        Some(id) => format!("Action: {}, name: {name}, identifier: {id}", kind.operation()),
        None => format!("Action: {}, name: {name}", kind.operation()),
    }
}
