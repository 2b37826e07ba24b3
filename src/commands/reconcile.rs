// ABOUTME: Reconcile command implementation.
// ABOUTME: Loads the input, wires gateway, waiter and shutdown, and runs one pass.

use super::exit_code;
use rds_bluegreen::config::Config;
use rds_bluegreen::deploy::BlueGreenManager;
use rds_bluegreen::error::Result;
use rds_bluegreen::gateway::AwsRds;
use rds_bluegreen::output::Output;
use rds_bluegreen::rerun::RerunMarker;
use rds_bluegreen::wait::{WaitOptions, Waiter, forward_shutdown_signals, shutdown_channel};
use std::path::Path;
use tracing::debug;

/// Run one reconciliation pass and return the exit code for its final state.
pub async fn reconcile(input: &Path, dry_run: bool, mut output: Output) -> Result<i32> {
    output.start_timer();
    let config = Config::load(input)?;

    output.progress(&format!(
        "Reconciling Blue/Green deployment for {}{}",
        config.identifier,
        if dry_run { " (dry-run)" } else { "" }
    ));

    let gateway = AwsRds::from_env(&config.region).await;

    let (trigger, shutdown) = shutdown_channel();
    let signals = tokio::spawn(forward_shutdown_signals(trigger));
    let waiter = Waiter::new(WaitOptions::from(&config.wait), shutdown);

    let mut manager = BlueGreenManager::new(&gateway, waiter, dry_run)
        .with_switchover_timeout(config.wait.switchover_timeout);
    match RerunMarker::from_env() {
        Ok(marker) => manager = manager.with_rerun_marker(marker),
        Err(e) => debug!("rerun marker unavailable: {e}"),
    }

    let result = manager.run(&config).await;
    signals.abort();

    let outcome = result?;
    output.outcome(&outcome);
    Ok(exit_code(outcome.state))
}
