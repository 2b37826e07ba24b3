// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Phantom-typed RDS identifiers and engine version parsing.

mod engine_version;
mod id;

pub use engine_version::{EngineVersion, ParseEngineVersionError};
pub use id::{DbInstanceId, DeploymentId, Id};
