// ABOUTME: Command module aggregator for the rds-bluegreen CLI.
// ABOUTME: Re-exports reconcile and post-run handlers and the exit-code mapping.

mod post_run;
mod reconcile;

pub use post_run::post_run;
pub use reconcile::reconcile;

use rds_bluegreen::deploy::State;

pub const EXIT_OK: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
/// Tells the pipeline to skip its remaining steps for this invocation.
pub const EXIT_SKIP: i32 = 42;

/// Map the final state of a pass to the process exit code.
pub fn exit_code(state: State) -> i32 {
    if state.lets_pipeline_continue() {
        EXIT_OK
    } else {
        EXIT_SKIP
    }
}
