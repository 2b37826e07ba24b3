// ABOUTME: Post-run command implementation.
// ABOUTME: Fails the job when an earlier step requested a rerun.

use super::{EXIT_ERROR, EXIT_OK};
use rds_bluegreen::error::Result;
use rds_bluegreen::output::Output;
use rds_bluegreen::rerun::should_rerun;
use tracing::info;

pub fn post_run(output: &Output) -> Result<i32> {
    if should_rerun()? {
        info!("rerun marker exists, exiting with error");
        Ok(EXIT_ERROR)
    } else {
        output.success("run completed successfully");
        Ok(EXIT_OK)
    }
}
