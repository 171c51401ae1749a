//! @ai:module:intent Compile-run-verify pipeline for contest solutions
//! @ai:module:layer application
//! @ai:module:public_api Engine, ExecutionResult, TestOutcome, verify

pub mod artifact;
pub mod pipeline;
pub mod process;
pub mod verify;

pub use artifact::{executable_path, ArtifactGuard};
pub use pipeline::{Engine, ExecutionResult, Stage};
pub use verify::{verify, TestOutcome};
