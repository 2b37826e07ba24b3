// ABOUTME: Polling configuration for long-running RDS operations.
// ABOUTME: Interval, optional overall timeout, and the switchover timeout.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WaitConfig {
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// No timeout means poll until the pipeline's own deadline kills us.
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Passed through to SwitchoverBlueGreenDeployment.
    #[serde(default, with = "humantime_serde")]
    pub switchover_timeout: Option<Duration>,
}

fn default_interval() -> Duration {
    Duration::from_secs(60)
}

impl Default for WaitConfig {
    fn default() -> Self {
        WaitConfig {
            interval: default_interval(),
            timeout: None,
            switchover_timeout: None,
        }
    }
}
